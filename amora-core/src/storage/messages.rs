// SPDX-FileCopyrightText: 2026 Amora Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Message cache operations.
//!
//! Messages are keyed by ID and, for optimistic sends, by a unique temp-id.
//! A temp-id has at most one live row: confirming a send swaps the pending
//! row for the server copy, and a late optimistic write never resurrects a
//! row that was already confirmed.

use rusqlite::{params, Connection, OptionalExtension};

use crate::message::{Message, MessageStatus};

use super::conversations::{repoint_conversation, touch_conversation};
use super::{Storage, StorageError};

const MESSAGE_COLUMNS: &str =
    "id, conversation_id, sender_id, content, message_type, timestamp, status, temp_id, media_url";

/// Reference point for cursor pagination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageCursor {
    /// Start from the newest message.
    Latest,
    /// Messages strictly older than this message's timestamp.
    BeforeMessage(String),
    /// Messages strictly older than this Unix millisecond timestamp.
    BeforeTimestamp(i64),
}

impl Storage {
    // === Message Operations ===

    /// Saves a message, inserting or replacing by ID.
    ///
    /// Updates the conversation's latest-message pointer when the message is
    /// at least as new as the current one. Returns false when the write was
    /// dropped because a confirmed copy with the same temp-id already exists.
    pub fn save_message(&self, message: &Message) -> Result<bool, StorageError> {
        let tx = self.begin()?;
        let stored = upsert_message(&tx, message)?;
        if stored {
            touch_conversation(&tx, message)?;
        }
        tx.commit()?;
        Ok(stored)
    }

    /// Gets a page of messages strictly older than the cursor message, newest first.
    ///
    /// `cursor` is a message ID; `None` starts from the newest message.
    pub fn get_messages(
        &self,
        conversation_id: &str,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Message>, StorageError> {
        let cursor = match cursor {
            Some(id) => MessageCursor::BeforeMessage(id.to_string()),
            None => MessageCursor::Latest,
        };
        self.get_messages_page(conversation_id, &cursor, limit)
    }

    /// Gets a page of messages strictly older than a timestamp, newest first.
    pub fn get_messages_before(
        &self,
        conversation_id: &str,
        before: i64,
        limit: usize,
    ) -> Result<Vec<Message>, StorageError> {
        self.get_messages_page(conversation_id, &MessageCursor::BeforeTimestamp(before), limit)
    }

    /// Gets a page of messages for any cursor kind.
    pub fn get_messages_page(
        &self,
        conversation_id: &str,
        cursor: &MessageCursor,
        limit: usize,
    ) -> Result<Vec<Message>, StorageError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let before = match cursor {
            MessageCursor::Latest => i64::MAX,
            MessageCursor::BeforeTimestamp(ts) => *ts,
            MessageCursor::BeforeMessage(id) => self
                .conn
                .query_row(
                    "SELECT timestamp FROM messages WHERE id = ?1 AND conversation_id = ?2",
                    params![id, conversation_id],
                    |row| row.get::<_, i64>(0),
                )
                .optional()?
                .ok_or_else(|| StorageError::NotFound(format!("cursor message {}", id)))?,
        };

        let sql = format!(
            "SELECT {} FROM messages
             WHERE conversation_id = ?1 AND timestamp < ?2
             ORDER BY timestamp DESC, row_id DESC
             LIMIT ?3",
            MESSAGE_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![conversation_id, before, limit as i64],
            row_to_message,
        )?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(StorageError::Database)
    }

    /// Gets a single message by ID.
    pub fn get_message(&self, id: &str) -> Result<Option<Message>, StorageError> {
        find_message(&self.conn, "id", id)
    }

    /// Gets the message linked to a temp-id, whether still pending or confirmed.
    pub fn get_message_by_temp_id(&self, temp_id: &str) -> Result<Option<Message>, StorageError> {
        find_message(&self.conn, "temp_id", temp_id)
    }

    /// Atomically swaps an optimistic message for its server-confirmed copy.
    ///
    /// The confirmed row keeps the temp-id so a repeated confirmation or a
    /// late optimistic write resolves to the same row. Calling this when the
    /// pending row is already gone stores the server copy once.
    pub fn replace_optimistic(
        &self,
        temp_id: &str,
        server_message: &Message,
    ) -> Result<Message, StorageError> {
        let tx = self.begin()?;
        let confirmed = replace_optimistic_in(&tx, temp_id, server_message)?;
        tx.commit()?;
        Ok(confirmed)
    }

    /// Updates the delivery status of a message.
    pub fn update_message_status(
        &self,
        id: &str,
        status: MessageStatus,
    ) -> Result<bool, StorageError> {
        let rows_affected = self.conn.execute(
            "UPDATE messages SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Deletes a message by ID.
    pub fn delete_message(&self, id: &str) -> Result<bool, StorageError> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM messages WHERE id = ?1", params![id])?;
        Ok(rows_affected > 0)
    }

    /// Deletes every cached message of a conversation.
    ///
    /// Returns the number of deleted messages.
    pub fn delete_conversation_messages(
        &self,
        conversation_id: &str,
    ) -> Result<usize, StorageError> {
        let rows_affected = self.conn.execute(
            "DELETE FROM messages WHERE conversation_id = ?1",
            params![conversation_id],
        )?;
        Ok(rows_affected)
    }

    /// Counts cached messages of a conversation.
    pub fn count_messages(&self, conversation_id: &str) -> Result<usize, StorageError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM messages WHERE conversation_id = ?1",
            params![conversation_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

/// Inserts or updates a message, resolving temp-id collisions.
pub(crate) fn upsert_message(conn: &Connection, message: &Message) -> Result<bool, StorageError> {
    if let Some(temp_id) = &message.temp_id {
        if let Some(existing) = find_message(conn, "temp_id", temp_id)? {
            if existing.id != message.id {
                if existing.status.is_confirmed() && !message.status.is_confirmed() {
                    return Ok(false);
                }
                conn.execute("DELETE FROM messages WHERE id = ?1", params![existing.id])?;
                repoint_conversation(conn, &existing.id, message)?;
            }
        }
    }

    conn.execute(
        "INSERT INTO messages
         (id, conversation_id, sender_id, content, message_type, timestamp, status, temp_id, media_url)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(id) DO UPDATE SET
            conversation_id = excluded.conversation_id,
            sender_id = excluded.sender_id,
            content = excluded.content,
            message_type = excluded.message_type,
            timestamp = excluded.timestamp,
            status = excluded.status,
            temp_id = COALESCE(excluded.temp_id, messages.temp_id),
            media_url = excluded.media_url",
        params![
            message.id,
            message.conversation_id,
            message.sender_id,
            message.content,
            message.message_type.as_str(),
            message.timestamp,
            message.status.as_str(),
            message.temp_id,
            message.media_url,
        ],
    )?;

    Ok(true)
}

/// Replacement body shared with the outbox completion path.
pub(crate) fn replace_optimistic_in(
    conn: &Connection,
    temp_id: &str,
    server_message: &Message,
) -> Result<Message, StorageError> {
    let mut confirmed = server_message.clone();
    confirmed.temp_id = Some(temp_id.to_string());
    if confirmed.status == MessageStatus::Pending {
        confirmed.status = MessageStatus::Sent;
    }

    // The confirmed copy carries the temp-id, so the upsert swaps out the
    // pending row and re-points the conversation.
    if !upsert_message(conn, &confirmed)? {
        return find_message(conn, "temp_id", temp_id)?
            .ok_or_else(|| StorageError::NotFound(format!("message for {}", temp_id)));
    }
    touch_conversation(conn, &confirmed)?;
    Ok(confirmed)
}

fn find_message(conn: &Connection, column: &str, value: &str) -> Result<Option<Message>, StorageError> {
    let sql = format!(
        "SELECT {} FROM messages WHERE {} = ?1",
        MESSAGE_COLUMNS, column
    );
    conn.query_row(&sql, params![value], row_to_message)
        .optional()
        .map_err(StorageError::Database)
}

/// Converts database row to Message.
fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let message_type: String = row.get(4)?;
    let status: String = row.get(6)?;

    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        sender_id: row.get(2)?,
        content: row.get(3)?,
        message_type: message_type.parse().unwrap_or_default(),
        timestamp: row.get(5)?,
        status: MessageStatus::from_db(&status),
        temp_id: row.get(7)?,
        media_url: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageType;

    fn message(id: &str, conversation_id: &str, timestamp: i64) -> Message {
        Message {
            id: id.to_string(),
            conversation_id: conversation_id.to_string(),
            sender_id: "user-a".to_string(),
            content: format!("body of {}", id),
            message_type: MessageType::Text,
            timestamp,
            status: MessageStatus::Sent,
            temp_id: None,
            media_url: None,
        }
    }

    #[test]
    fn test_save_and_get_message() {
        let storage = Storage::in_memory().unwrap();
        let msg = message("m1", "c1", 100);

        assert!(storage.save_message(&msg).unwrap());
        assert_eq!(storage.get_message("m1").unwrap(), Some(msg));
    }

    #[test]
    fn test_save_is_upsert() {
        let storage = Storage::in_memory().unwrap();
        let mut msg = message("m1", "c1", 100);
        storage.save_message(&msg).unwrap();

        msg.content = "edited".to_string();
        storage.save_message(&msg).unwrap();

        assert_eq!(storage.count_messages("c1").unwrap(), 1);
        assert_eq!(storage.get_message("m1").unwrap().unwrap().content, "edited");
    }

    #[test]
    fn test_page_equal_timestamp_excluded() {
        let storage = Storage::in_memory().unwrap();
        storage.save_message(&message("a", "c1", 100)).unwrap();
        storage.save_message(&message("b", "c1", 100)).unwrap();
        storage.save_message(&message("c", "c1", 90)).unwrap();

        let page = storage.get_messages("c1", Some("b"), 10).unwrap();
        let ids: Vec<_> = page.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["c"]);
    }

    #[test]
    fn test_unknown_cursor_is_not_found() {
        let storage = Storage::in_memory().unwrap();
        let result = storage.get_messages("c1", Some("missing"), 10);
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_zero_limit_returns_empty() {
        let storage = Storage::in_memory().unwrap();
        storage.save_message(&message("a", "c1", 100)).unwrap();
        assert!(storage.get_messages("c1", None, 0).unwrap().is_empty());
    }

    #[test]
    fn test_row_with_unknown_type_reads_as_text() {
        let storage = Storage::in_memory().unwrap();
        storage.save_message(&message("a", "c1", 100)).unwrap();
        storage
            .conn
            .execute("UPDATE messages SET message_type = 'sticker' WHERE id = 'a'", [])
            .unwrap();

        let msg = storage.get_message("a").unwrap().unwrap();
        assert_eq!(msg.message_type, MessageType::Text);
    }
}
