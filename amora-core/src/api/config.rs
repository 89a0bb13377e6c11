// SPDX-FileCopyrightText: 2026 Amora Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration Types
//!
//! Settings for the messenger. Every field has a default, so hosts can pass
//! a partial JSON document or use the builder methods.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::sync::OutboxPolicy;

use super::error::{MessengerError, MessengerResult};

/// Messages returned per page when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 30;

/// Upper bound accepted for `page_size`.
pub const MAX_PAGE_SIZE: usize = 200;

/// Main messenger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessengerConfig {
    /// Path to the SQLite cache file.
    pub storage_path: PathBuf,

    /// ID of the signed-in user; outgoing messages carry it as sender.
    pub user_id: String,

    /// Messages per page for `load_messages`.
    pub page_size: usize,

    /// Outbox retry ceiling and capacity.
    pub outbox: OutboxPolicy,
}

impl Default for MessengerConfig {
    fn default() -> Self {
        MessengerConfig {
            storage_path: PathBuf::from("./amora_data/amora.db"),
            user_id: String::new(),
            page_size: DEFAULT_PAGE_SIZE,
            outbox: OutboxPolicy::default(),
        }
    }
}

impl MessengerConfig {
    /// Parses a JSON configuration document.
    pub fn from_json(json: &str) -> MessengerResult<Self> {
        let config: MessengerConfig = serde_json::from_str(json)
            .map_err(|e| MessengerError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the storage path.
    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = path.into();
        self
    }

    /// Sets the signed-in user.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.outbox.max_retries = max_retries;
        self
    }

    pub fn with_max_queue_size(mut self, max_queue_size: usize) -> Self {
        self.outbox.max_queue_size = max_queue_size;
        self
    }

    /// Checks that the values are usable.
    pub fn validate(&self) -> MessengerResult<()> {
        if self.user_id.trim().is_empty() {
            return Err(MessengerError::Configuration("user_id is empty".into()));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(MessengerError::Configuration(format!(
                "page_size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        if self.outbox.max_retries == 0 {
            return Err(MessengerError::Configuration(
                "max_retries must be at least 1".into(),
            ));
        }
        if self.outbox.max_queue_size == 0 {
            return Err(MessengerError::Configuration(
                "max_queue_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
