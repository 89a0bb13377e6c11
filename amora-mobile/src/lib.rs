// SPDX-FileCopyrightText: 2026 Amora Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Amora Mobile Bindings
//!
//! UniFFI bindings for Android and iOS platforms.
//! Exposes a simplified, mobile-friendly API on top of amora-core.
//!
//! The platform owns the network: it reads `pending_outbox()`, posts each
//! payload, then reports the outcome with `confirm_sent` or `mark_failed`.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use amora_core::wire::WireMessage;
use amora_core::{Messenger, MessengerConfig};

// === Modules ===

mod error;
mod types;

// Re-export public types
pub use error::MobileError;
pub use types::{
    MobileConversation, MobileMessage, MobileMessageStatus, MobileMessageType, MobileOutboxEntry,
    MobileOutboxStatus,
};

uniffi::setup_scaffolding!();

/// File name of the cache inside the data directory.
const DATABASE_FILE: &str = "amora.db";

/// Returns true if `id` is a client-generated temp-id.
#[uniffi::export]
pub fn is_temp_id(id: String) -> bool {
    amora_core::is_temp_id(&id)
}

// === Main Interface ===

/// Main Amora interface for mobile platforms.
///
/// The messenger holds a single SQLite connection; calls are serialized
/// through a mutex.
#[derive(uniffi::Object)]
pub struct AmoraMobile {
    messenger: Mutex<Messenger>,
}

impl AmoraMobile {
    fn open(data_dir: &str, config: MessengerConfig) -> Result<Arc<Self>, MobileError> {
        let data_path = PathBuf::from(data_dir);
        std::fs::create_dir_all(&data_path)
            .map_err(|e| MobileError::StorageError(e.to_string()))?;

        let config = config.with_storage_path(data_path.join(DATABASE_FILE));
        let messenger = Messenger::open(config)?;
        info!(data_dir, "mobile messenger ready");

        Ok(Arc::new(AmoraMobile {
            messenger: Mutex::new(messenger),
        }))
    }
}

#[uniffi::export]
impl AmoraMobile {
    /// Opens (or creates) the cache in `data_dir` for the signed-in user.
    #[uniffi::constructor]
    pub fn new(data_dir: String, user_id: String) -> Result<Arc<Self>, MobileError> {
        Self::open(&data_dir, MessengerConfig::default().with_user_id(user_id))
    }

    /// Opens the cache with settings from a JSON document.
    ///
    /// `storage_path` in the document is ignored; the cache always lives in
    /// `data_dir`.
    #[uniffi::constructor]
    pub fn with_config(data_dir: String, config_json: String) -> Result<Arc<Self>, MobileError> {
        let config = MessengerConfig::from_json(&config_json)?;
        Self::open(&data_dir, config)
    }

    // === Sending ===

    /// Stores an optimistic message and queues it for delivery.
    pub fn send_message(
        &self,
        conversation_id: String,
        content: String,
        message_type: MobileMessageType,
        media_url: Option<String>,
    ) -> Result<MobileMessage, MobileError> {
        let messenger = self.messenger.lock();
        let message = messenger.send_message(
            &conversation_id,
            &content,
            message_type.into(),
            media_url.as_deref(),
        )?;
        Ok(MobileMessage::from(&message))
    }

    /// Applies the backend's response to a send request.
    pub fn confirm_sent(
        &self,
        temp_id: String,
        response_json: String,
    ) -> Result<MobileMessage, MobileError> {
        let messenger = self.messenger.lock();
        let confirmed = messenger.confirm_sent_json(&temp_id, &response_json)?;
        Ok(MobileMessage::from(&confirmed))
    }

    /// Records a failed send. Returns true once the retry ceiling is reached.
    pub fn mark_failed(&self, temp_id: String, error: String) -> Result<bool, MobileError> {
        Ok(self.messenger.lock().mark_failed(&temp_id, &error)?)
    }

    /// Entries to send now, oldest first.
    pub fn pending_outbox(&self) -> Result<Vec<MobileOutboxEntry>, MobileError> {
        let entries = self.messenger.lock().pending_outbox()?;
        Ok(entries.iter().map(MobileOutboxEntry::from).collect())
    }

    pub fn outbox_status(&self) -> Result<MobileOutboxStatus, MobileError> {
        Ok(self.messenger.lock().outbox_status()?.into())
    }

    /// Abandons exhausted entries. Returns their temp-ids.
    pub fn cleanup_failed(&self) -> Result<Vec<String>, MobileError> {
        Ok(self.messenger.lock().cleanup_failed()?)
    }

    /// Gives a failed message a fresh set of retries.
    pub fn retry_message(&self, temp_id: String) -> Result<(), MobileError> {
        Ok(self.messenger.lock().retry_message(&temp_id)?)
    }

    // === Receiving ===

    /// Stores a message pushed over the socket (a bare message object).
    pub fn receive_message(&self, message_json: String) -> Result<MobileMessage, MobileError> {
        let wire: WireMessage = serde_json::from_str(&message_json)?;
        let message = wire.into_message()?;
        let stored = self.messenger.lock().receive_message(&message)?;
        Ok(MobileMessage::from(&stored))
    }

    /// Stores a page of history from an enveloped response.
    pub fn ingest_history(&self, envelope_json: String) -> Result<u32, MobileError> {
        let stored = self.messenger.lock().ingest_envelope(&envelope_json)?;
        Ok(stored.len() as u32)
    }

    /// Stores the conversation list from an enveloped response.
    pub fn ingest_conversations(&self, envelope_json: String) -> Result<u32, MobileError> {
        Ok(self.messenger.lock().ingest_conversations(&envelope_json)? as u32)
    }

    // === Reading ===

    /// One page of messages strictly older than `cursor`, newest first.
    pub fn load_messages(
        &self,
        conversation_id: String,
        cursor: Option<String>,
    ) -> Result<Vec<MobileMessage>, MobileError> {
        let page = self
            .messenger
            .lock()
            .load_messages(&conversation_id, cursor.as_deref())?;
        Ok(page.iter().map(MobileMessage::from).collect())
    }

    pub fn list_conversations(&self) -> Result<Vec<MobileConversation>, MobileError> {
        let conversations = self.messenger.lock().list_conversations()?;
        Ok(conversations.iter().map(MobileConversation::from).collect())
    }

    /// Marks a conversation read. Returns the number of messages updated.
    pub fn mark_read(&self, conversation_id: String) -> Result<u32, MobileError> {
        Ok(self.messenger.lock().mark_read(&conversation_id)? as u32)
    }
}
