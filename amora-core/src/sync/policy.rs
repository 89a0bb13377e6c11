// SPDX-FileCopyrightText: 2026 Amora Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Outbox limits.

use serde::{Deserialize, Serialize};

use crate::message::OutboxEntry;
use crate::storage::{Storage, StorageError};

/// Attempts allowed per entry before it needs an explicit cleanup.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Entries the outbox holds before new sends are refused.
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 500;

/// Retry ceiling and capacity of the offline outbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutboxPolicy {
    pub max_retries: u32,
    pub max_queue_size: usize,
}

impl Default for OutboxPolicy {
    fn default() -> Self {
        OutboxPolicy {
            max_retries: DEFAULT_MAX_RETRIES,
            max_queue_size: DEFAULT_MAX_QUEUE_SIZE,
        }
    }
}

/// Snapshot of the outbox contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutboxStatus {
    /// Entries the next sweep will attempt.
    pub pending: usize,
    /// Entries over the ceiling, waiting for cleanup.
    pub exhausted: usize,
}

impl OutboxPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_max_queue_size(mut self, max_queue_size: usize) -> Self {
        self.max_queue_size = max_queue_size;
        self
    }

    /// Returns true once the entry may no longer be retried automatically.
    pub fn is_exhausted(&self, entry: &OutboxEntry) -> bool {
        entry.is_exhausted(self.max_retries)
    }

    /// Returns true if the outbox holds `max_queue_size` entries or more.
    pub fn is_full(&self, storage: &Storage) -> Result<bool, StorageError> {
        Ok(storage.count_outbox_entries()? >= self.max_queue_size)
    }

    /// Returns true if another send can be queued.
    pub fn can_enqueue(&self, storage: &Storage) -> Result<bool, StorageError> {
        Ok(!self.is_full(storage)?)
    }

    /// Number of sends that can still be queued.
    pub fn remaining_capacity(&self, storage: &Storage) -> Result<usize, StorageError> {
        Ok(self
            .max_queue_size
            .saturating_sub(storage.count_outbox_entries()?))
    }

    /// Counts pending and exhausted entries.
    pub fn status(&self, storage: &Storage) -> Result<OutboxStatus, StorageError> {
        let total = storage.count_outbox_entries()?;
        let exhausted = storage.get_exhausted_entries(self.max_retries)?.len();
        Ok(OutboxStatus {
            pending: total - exhausted,
            exhausted,
        })
    }
}
