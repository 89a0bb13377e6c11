// SPDX-FileCopyrightText: 2026 Amora Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Persistent Storage Module
//!
//! Local SQLite cache for messages and conversations, the offline outbox,
//! and a small key-value cache. Secure token storage lives in [`secure`].

#[cfg(feature = "testing")]
pub mod cache;
#[cfg(not(feature = "testing"))]
mod cache;

#[cfg(feature = "testing")]
pub mod conversations;
#[cfg(not(feature = "testing"))]
mod conversations;

#[cfg(feature = "testing")]
pub mod error;
#[cfg(not(feature = "testing"))]
mod error;

#[cfg(feature = "testing")]
pub mod messages;
#[cfg(not(feature = "testing"))]
mod messages;

#[cfg(feature = "testing")]
pub mod outbox;
#[cfg(not(feature = "testing"))]
mod outbox;

pub mod migration;
pub mod secure;

pub use error::StorageError;
pub use messages::MessageCursor;
pub use secure::{MemorySecureStorage, SecureStorage};

#[cfg(feature = "secure-storage")]
pub use secure::PlatformKeyring;

use rusqlite::{Connection, Transaction};
use std::path::Path;

/// SQLite-based storage implementation.
///
/// One connection per instance. `Storage` is `Send` but not `Sync`; callers
/// sharing it across threads wrap it in a mutex.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Opens or creates a storage database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        let storage = Storage { conn };
        storage.run_migrations()?;
        Ok(storage)
    }

    /// Creates an in-memory storage (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let storage = Storage { conn };
        storage.run_migrations()?;
        Ok(storage)
    }

    /// Runs all pending schema migrations.
    fn run_migrations(&self) -> Result<(), StorageError> {
        let migrations = migration::all_migrations();
        migration::MigrationRunner::run(&self.conn, &migrations)
    }

    /// Returns the current schema version.
    pub fn schema_version(&self) -> Result<u32, StorageError> {
        migration::MigrationRunner::current_version(&self.conn)
    }

    /// Starts a transaction on the shared connection.
    ///
    /// Nested calls fail with a database error; the store operations below
    /// only open one transaction per call.
    pub(crate) fn begin(&self) -> Result<Transaction<'_>, StorageError> {
        Ok(self.conn.unchecked_transaction()?)
    }
}
