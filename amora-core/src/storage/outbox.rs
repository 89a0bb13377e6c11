// SPDX-FileCopyrightText: 2026 Amora Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Offline outbox storage operations.
//!
//! Entries are keyed by temp-id. The retry ceiling is supplied by the caller
//! on every read; an entry at or over the ceiling is never handed out again
//! and only leaves the table through an explicit cleanup.

use rusqlite::{params, OptionalExtension};

use crate::message::{now_millis, Message, MessageStatus, OutboxEntry};

use super::conversations::touch_conversation;
use super::messages::{replace_optimistic_in, upsert_message};
use super::{Storage, StorageError};

const OUTBOX_COLUMNS: &str =
    "temp_id, conversation_id, payload, created_at, retry_count, last_error, last_retry_at";

impl Storage {
    // === Outbox Operations ===

    /// Adds an entry to the outbox.
    pub fn enqueue_outbox(&self, entry: &OutboxEntry) -> Result<(), StorageError> {
        insert_entry(&self.conn, entry)
    }

    /// Saves an optimistic message and its outbox entry in one transaction.
    ///
    /// Fails with `AlreadyExists` if the temp-id was already confirmed by the
    /// server or is already queued; nothing is written in either case.
    pub fn enqueue_optimistic(
        &self,
        message: &Message,
        entry: &OutboxEntry,
    ) -> Result<(), StorageError> {
        let tx = self.begin()?;
        if !upsert_message(&tx, message)? {
            return Err(StorageError::AlreadyExists(format!(
                "confirmed message for {}",
                entry.temp_id
            )));
        }
        touch_conversation(&tx, message)?;
        insert_entry(&tx, entry)?;
        tx.commit()?;
        Ok(())
    }

    /// Gets entries still under the retry ceiling, oldest first.
    pub fn dequeue_pending(&self, max_retries: u32) -> Result<Vec<OutboxEntry>, StorageError> {
        let sql = format!(
            "SELECT {} FROM outbox WHERE retry_count < ?1 ORDER BY created_at, seq",
            OUTBOX_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![max_retries], row_to_outbox_entry)?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(StorageError::Database)
    }

    /// Gets entries that reached the retry ceiling, oldest first.
    pub fn get_exhausted_entries(
        &self,
        max_retries: u32,
    ) -> Result<Vec<OutboxEntry>, StorageError> {
        let sql = format!(
            "SELECT {} FROM outbox WHERE retry_count >= ?1 ORDER BY created_at, seq",
            OUTBOX_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![max_retries], row_to_outbox_entry)?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(StorageError::Database)
    }

    /// Gets a single outbox entry.
    pub fn get_outbox_entry(&self, temp_id: &str) -> Result<Option<OutboxEntry>, StorageError> {
        let sql = format!("SELECT {} FROM outbox WHERE temp_id = ?1", OUTBOX_COLUMNS);
        self.conn
            .query_row(&sql, params![temp_id], row_to_outbox_entry)
            .optional()
            .map_err(StorageError::Database)
    }

    /// Records a failed send attempt.
    ///
    /// Increments the retry counter and stores the error and attempt time.
    /// Returns false if no entry exists for the temp-id.
    pub fn mark_outbox_failed(&self, temp_id: &str, error: &str) -> Result<bool, StorageError> {
        let rows_affected = self.conn.execute(
            "UPDATE outbox SET retry_count = retry_count + 1, last_error = ?1, last_retry_at = ?2
             WHERE temp_id = ?3",
            params![error, now_millis(), temp_id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Removes an entry after a confirmed send.
    pub fn remove_outbox_entry(&self, temp_id: &str) -> Result<bool, StorageError> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM outbox WHERE temp_id = ?1", params![temp_id])?;
        Ok(rows_affected > 0)
    }

    /// Confirms a send: replaces the optimistic message and drops its outbox entry.
    pub fn complete_send(
        &self,
        temp_id: &str,
        server_message: &Message,
    ) -> Result<Message, StorageError> {
        let tx = self.begin()?;
        let confirmed = replace_optimistic_in(&tx, temp_id, server_message)?;
        tx.execute("DELETE FROM outbox WHERE temp_id = ?1", params![temp_id])?;
        tx.commit()?;
        Ok(confirmed)
    }

    /// Clears the retry counter so the entry is picked up by the next sweep.
    pub fn reset_outbox_retries(&self, temp_id: &str) -> Result<bool, StorageError> {
        let tx = self.begin()?;
        let rows_affected = tx.execute(
            "UPDATE outbox SET retry_count = 0, last_error = NULL WHERE temp_id = ?1",
            params![temp_id],
        )?;
        if rows_affected > 0 {
            tx.execute(
                "UPDATE messages SET status = ?1 WHERE temp_id = ?2 AND status = ?3",
                params![
                    MessageStatus::Pending.as_str(),
                    temp_id,
                    MessageStatus::Failed.as_str(),
                ],
            )?;
        }
        tx.commit()?;
        Ok(rows_affected > 0)
    }

    /// Deletes entries at or over the retry ceiling.
    ///
    /// Their optimistic messages stay in the cache marked as failed.
    /// Returns the removed entries.
    pub fn cleanup_exhausted(&self, max_retries: u32) -> Result<Vec<OutboxEntry>, StorageError> {
        let exhausted = self.get_exhausted_entries(max_retries)?;
        if exhausted.is_empty() {
            return Ok(exhausted);
        }

        let tx = self.begin()?;
        for entry in &exhausted {
            tx.execute(
                "UPDATE messages SET status = ?1 WHERE temp_id = ?2 AND status = ?3",
                params![
                    MessageStatus::Failed.as_str(),
                    entry.temp_id,
                    MessageStatus::Pending.as_str(),
                ],
            )?;
            tx.execute(
                "DELETE FROM outbox WHERE temp_id = ?1",
                params![entry.temp_id],
            )?;
        }
        tx.commit()?;

        Ok(exhausted)
    }

    /// Counts all outbox entries, exhausted ones included.
    pub fn count_outbox_entries(&self) -> Result<usize, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM outbox", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Deletes every outbox entry.
    ///
    /// Returns the number of deleted entries.
    pub fn clear_outbox(&self) -> Result<usize, StorageError> {
        let rows_affected = self.conn.execute("DELETE FROM outbox", [])?;
        Ok(rows_affected)
    }
}

fn insert_entry(conn: &rusqlite::Connection, entry: &OutboxEntry) -> Result<(), StorageError> {
    let result = conn.execute(
        "INSERT INTO outbox
         (temp_id, conversation_id, payload, created_at, retry_count, last_error, last_retry_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            entry.temp_id,
            entry.conversation_id,
            entry.payload,
            entry.created_at,
            entry.retry_count,
            entry.last_error,
            entry.last_retry_at,
        ],
    );

    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(StorageError::AlreadyExists(format!(
                "outbox entry {}",
                entry.temp_id
            )))
        }
        Err(e) => Err(StorageError::Database(e)),
    }
}

/// Converts database row to OutboxEntry.
fn row_to_outbox_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<OutboxEntry> {
    Ok(OutboxEntry {
        temp_id: row.get(0)?,
        conversation_id: row.get(1)?,
        payload: row.get(2)?,
        created_at: row.get(3)?,
        retry_count: row.get::<_, i64>(4)? as u32,
        last_error: row.get(5)?,
        last_retry_at: row.get(6)?,
    })
}
