// SPDX-FileCopyrightText: 2026 Amora Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Key-value cache operations.
//!
//! Holds small JSON blobs (profile snapshots, last sync markers) with an
//! optional expiry in Unix milliseconds.

use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Storage, StorageError};

impl Storage {
    // === Cache Operations ===

    /// Stores a value, replacing any previous one.
    pub fn cache_put(
        &self,
        key: &str,
        value: &str,
        expires_at: Option<i64>,
    ) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO cache_entries (key, value, expires_at) VALUES (?1, ?2, ?3)",
            params![key, value, expires_at],
        )?;
        Ok(())
    }

    /// Reads a value unless it expired at or before `now`.
    pub fn cache_get(&self, key: &str, now: i64) -> Result<Option<String>, StorageError> {
        self.conn
            .query_row(
                "SELECT value FROM cache_entries
                 WHERE key = ?1 AND (expires_at IS NULL OR expires_at > ?2)",
                params![key, now],
                |row| row.get(0),
            )
            .optional()
            .map_err(StorageError::Database)
    }

    /// Stores a value serialized as JSON.
    pub fn cache_put_json<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        expires_at: Option<i64>,
    ) -> Result<(), StorageError> {
        let json =
            serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.cache_put(key, &json, expires_at)
    }

    /// Reads a JSON value written by [`Storage::cache_put_json`].
    pub fn cache_get_json<T: DeserializeOwned>(
        &self,
        key: &str,
        now: i64,
    ) -> Result<Option<T>, StorageError> {
        match self.cache_get(key, now)? {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| StorageError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    /// Removes a value.
    pub fn cache_remove(&self, key: &str) -> Result<bool, StorageError> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM cache_entries WHERE key = ?1", params![key])?;
        Ok(rows_affected > 0)
    }

    /// Deletes entries that expired at or before `now`.
    ///
    /// Returns the number of deleted entries.
    pub fn purge_expired_cache(&self, now: i64) -> Result<usize, StorageError> {
        let rows_affected = self.conn.execute(
            "DELETE FROM cache_entries WHERE expires_at IS NOT NULL AND expires_at <= ?1",
            params![now],
        )?;
        Ok(rows_affected)
    }
}
