// SPDX-FileCopyrightText: 2026 Amora Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Conversation storage operations.

use rusqlite::{params, Connection, OptionalExtension};

use crate::message::{Conversation, Message, MessageStatus};

use super::{Storage, StorageError};

impl Storage {
    // === Conversation Operations ===

    /// Saves a conversation summary as received from the backend.
    ///
    /// The unread counter is always taken from the summary. The latest-message
    /// pointer and activity time only move forward, so an older summary never
    /// hides a newer local message.
    pub fn save_conversation(&self, conversation: &Conversation) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO conversations
             (id, last_message_id, last_message_preview, last_activity, unread_count)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                last_message_id = CASE
                    WHEN excluded.last_activity >= conversations.last_activity
                    THEN COALESCE(excluded.last_message_id, conversations.last_message_id)
                    ELSE conversations.last_message_id END,
                last_message_preview = CASE
                    WHEN excluded.last_activity >= conversations.last_activity
                    THEN COALESCE(excluded.last_message_preview, conversations.last_message_preview)
                    ELSE conversations.last_message_preview END,
                last_activity = MAX(excluded.last_activity, conversations.last_activity),
                unread_count = excluded.unread_count",
            params![
                conversation.id,
                conversation.last_message_id,
                conversation.last_message_preview,
                conversation.last_activity,
                conversation.unread_count,
            ],
        )?;
        Ok(())
    }

    /// Gets a conversation by ID.
    pub fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, StorageError> {
        self.conn
            .query_row(
                "SELECT id, last_message_id, last_message_preview, last_activity, unread_count
                 FROM conversations WHERE id = ?1",
                params![id],
                row_to_conversation,
            )
            .optional()
            .map_err(StorageError::Database)
    }

    /// Lists conversations, most recently active first.
    pub fn list_conversations(&self) -> Result<Vec<Conversation>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, last_message_id, last_message_preview, last_activity, unread_count
             FROM conversations ORDER BY last_activity DESC, id",
        )?;

        let rows = stmt.query_map([], row_to_conversation)?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(StorageError::Database)
    }

    /// Increments the unread counter of a conversation.
    pub fn increment_unread(&self, conversation_id: &str) -> Result<bool, StorageError> {
        let rows_affected = self.conn.execute(
            "UPDATE conversations SET unread_count = unread_count + 1 WHERE id = ?1",
            params![conversation_id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Marks everything not sent by `reader_id` as read and clears the unread counter.
    ///
    /// Returns the number of messages whose status changed.
    pub fn mark_conversation_read(
        &self,
        conversation_id: &str,
        reader_id: &str,
    ) -> Result<usize, StorageError> {
        let tx = self.begin()?;
        let changed = tx.execute(
            "UPDATE messages SET status = ?1
             WHERE conversation_id = ?2 AND sender_id != ?3 AND status IN (?4, ?5)",
            params![
                MessageStatus::Read.as_str(),
                conversation_id,
                reader_id,
                MessageStatus::Sent.as_str(),
                MessageStatus::Delivered.as_str(),
            ],
        )?;
        tx.execute(
            "UPDATE conversations SET unread_count = 0 WHERE id = ?1",
            params![conversation_id],
        )?;
        tx.commit()?;
        Ok(changed)
    }

    /// Deletes a conversation and its cached messages.
    pub fn delete_conversation(&self, id: &str) -> Result<bool, StorageError> {
        let tx = self.begin()?;
        tx.execute(
            "DELETE FROM messages WHERE conversation_id = ?1",
            params![id],
        )?;
        let rows_affected = tx.execute("DELETE FROM conversations WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(rows_affected > 0)
    }
}

/// Points the conversation at `message` unless it already holds a newer one.
///
/// Creates the conversation row on first contact.
pub(crate) fn touch_conversation(conn: &Connection, message: &Message) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO conversations (id, last_message_id, last_message_preview, last_activity, unread_count)
         VALUES (?1, ?2, ?3, ?4, 0)
         ON CONFLICT(id) DO UPDATE SET
            last_message_id = excluded.last_message_id,
            last_message_preview = excluded.last_message_preview,
            last_activity = excluded.last_activity
         WHERE excluded.last_activity >= conversations.last_activity",
        params![
            message.conversation_id,
            message.id,
            message.preview(),
            message.timestamp,
        ],
    )?;
    Ok(())
}

/// Moves a pointer at a replaced row over to its successor.
pub(crate) fn repoint_conversation(
    conn: &Connection,
    replaced_id: &str,
    successor: &Message,
) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE conversations SET last_message_id = ?1, last_message_preview = ?2
         WHERE id = ?3 AND last_message_id = ?4",
        params![
            successor.id,
            successor.preview(),
            successor.conversation_id,
            replaced_id,
        ],
    )?;
    Ok(())
}

/// Converts database row to Conversation.
fn row_to_conversation(row: &rusqlite::Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        last_message_id: row.get(1)?,
        last_message_preview: row.get(2)?,
        last_activity: row.get(3)?,
        unread_count: row.get::<_, i64>(4)? as u32,
    })
}
