// SPDX-FileCopyrightText: 2026 Amora Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Messenger Orchestrator
//!
//! Main entry point for the app: optimistic sends through the outbox,
//! incoming messages, cached history pages and conversation state.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::message::{Conversation, Message, MessageType, OutboxEntry};
use crate::storage::{MessageCursor, Storage, StorageError};
use crate::sync::{DrainReport, MessageTransport, OutboxPolicy, OutboxStatus, OutboxSweeper};
use crate::wire::{parse_envelope, OutboxPayload, WireConversation, WireMessage};

use super::config::MessengerConfig;
use super::error::{MessengerError, MessengerResult};
use super::events::{EventDispatcher, EventHandler, MessengerEvent};

/// Main messenger orchestrator.
///
/// # Example
///
/// ```ignore
/// use amora_core::api::{Messenger, MessengerConfig};
/// use amora_core::message::MessageType;
///
/// let config = MessengerConfig::default()
///     .with_storage_path("/data/amora.db")
///     .with_user_id("user-1");
/// let mut messenger = Messenger::open(config)?;
///
/// // Shown immediately, delivered by the next sweep.
/// let pending = messenger.send_message("conv-1", "hey!", MessageType::Text, None)?;
///
/// let report = messenger.flush_outbox(&mut transport)?;
/// ```
pub struct Messenger {
    config: MessengerConfig,
    storage: Storage,
    events: Arc<EventDispatcher>,
}

impl Messenger {
    /// Opens the cache at `config.storage_path`, creating directories as needed.
    pub fn open(config: MessengerConfig) -> MessengerResult<Self> {
        config.validate()?;

        if let Some(parent) = config.storage_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| MessengerError::Configuration(e.to_string()))?;
            }
        }

        let storage = Storage::open(&config.storage_path)?;
        info!(path = %config.storage_path.display(), "message cache opened");

        Ok(Messenger {
            config,
            storage,
            events: Arc::new(EventDispatcher::new()),
        })
    }

    /// Creates a messenger over in-memory storage (for testing).
    pub fn in_memory(user_id: &str) -> MessengerResult<Self> {
        Self::in_memory_with(MessengerConfig::default().with_user_id(user_id))
    }

    /// Creates a messenger over in-memory storage with a custom configuration.
    pub fn in_memory_with(config: MessengerConfig) -> MessengerResult<Self> {
        config.validate()?;
        Ok(Messenger {
            config,
            storage: Storage::in_memory()?,
            events: Arc::new(EventDispatcher::new()),
        })
    }

    // === Sending ===

    /// Stores an optimistic message and queues it for delivery.
    ///
    /// The returned message is keyed by its temp-id and can be shown right
    /// away. Text messages need non-blank content; media messages need a
    /// media URL.
    pub fn send_message(
        &self,
        conversation_id: &str,
        content: &str,
        message_type: MessageType,
        media_url: Option<&str>,
    ) -> MessengerResult<Message> {
        if conversation_id.trim().is_empty() {
            return Err(MessengerError::InvalidInput(
                "conversation_id is empty".into(),
            ));
        }
        match (message_type.is_media(), media_url) {
            (false, _) if content.trim().is_empty() => {
                return Err(MessengerError::InvalidInput("message is empty".into()));
            }
            (true, None) => {
                return Err(MessengerError::InvalidInput(format!(
                    "{} message without media_url",
                    message_type
                )));
            }
            _ => {}
        }

        let policy = self.policy();
        if policy.is_full(&self.storage)? {
            warn!(
                conversation_id,
                max = policy.max_queue_size,
                "outbox full, refusing send"
            );
            return Err(MessengerError::OutboxFull(policy.max_queue_size));
        }

        let mut message =
            Message::optimistic(conversation_id, &self.config.user_id, content, message_type);
        if let Some(url) = media_url {
            message = message.with_media_url(url);
        }

        let payload = OutboxPayload::from_message(&message)?;
        let entry = OutboxEntry::new(
            &message.id,
            conversation_id,
            payload.to_json()?,
            message.timestamp,
        );
        self.storage.enqueue_optimistic(&message, &entry)?;

        info!(temp_id = %message.id, conversation_id, "message queued");
        self.events.dispatch(MessengerEvent::MessageQueued {
            conversation_id: conversation_id.to_string(),
            temp_id: message.id.clone(),
        });

        Ok(message)
    }

    /// Applies a server confirmation for a queued message.
    ///
    /// Swaps the optimistic copy for `server_message` and removes the outbox
    /// entry. Confirming twice leaves exactly one stored message.
    pub fn confirm_sent(&self, temp_id: &str, server_message: &Message) -> MessengerResult<Message> {
        if server_message.id.trim().is_empty() {
            return Err(MessengerError::InvalidInput("server message has no id".into()));
        }

        let confirmed = self.storage.complete_send(temp_id, server_message)?;

        info!(temp_id, id = %confirmed.id, "message confirmed");
        self.events.dispatch(MessengerEvent::MessageSent {
            conversation_id: confirmed.conversation_id.clone(),
            temp_id: temp_id.to_string(),
            message_id: confirmed.id.clone(),
        });

        Ok(confirmed)
    }

    /// Applies a confirmation given as the backend's send response.
    pub fn confirm_sent_json(&self, temp_id: &str, response: &str) -> MessengerResult<Message> {
        let wire: WireMessage = parse_envelope(response)?;
        let server_message = wire.into_message()?;
        self.confirm_sent(temp_id, &server_message)
    }

    /// Records a send failure reported by the host outside a sweep.
    ///
    /// Returns true if the entry has now reached the retry ceiling.
    pub fn mark_failed(&self, temp_id: &str, error: &str) -> MessengerResult<bool> {
        if !self.storage.mark_outbox_failed(temp_id, error)? {
            return Err(MessengerError::NotFound(format!("outbox entry {}", temp_id)));
        }

        let exhausted = self
            .storage
            .get_outbox_entry(temp_id)?
            .is_some_and(|entry| self.policy().is_exhausted(&entry));

        debug!(temp_id, error, exhausted, "send failure recorded");
        self.events.dispatch(MessengerEvent::MessageFailed {
            temp_id: temp_id.to_string(),
            error: error.to_string(),
            exhausted,
        });

        Ok(exhausted)
    }

    /// Sends every pending outbox entry through `transport`.
    ///
    /// Does nothing while the transport is offline.
    pub fn flush_outbox<T>(&self, transport: &mut T) -> MessengerResult<DrainReport>
    where
        T: MessageTransport + ?Sized,
    {
        let report = OutboxSweeper::new(&self.storage, self.policy()).drain(transport)?;

        for message in &report.sent {
            self.events.dispatch(MessengerEvent::MessageSent {
                conversation_id: message.conversation_id.clone(),
                temp_id: message.temp_id.clone().unwrap_or_default(),
                message_id: message.id.clone(),
            });
        }
        for (temp_id, error) in &report.failed {
            self.events.dispatch(MessengerEvent::MessageFailed {
                temp_id: temp_id.clone(),
                error: error.clone(),
                exhausted: report.exhausted.contains(temp_id),
            });
        }

        if report.attempted() > 0 {
            info!(
                sent = report.sent.len(),
                failed = report.failed.len(),
                exhausted = report.exhausted.len(),
                "outbox flushed"
            );
        }

        Ok(report)
    }

    /// Abandons entries that reached the retry ceiling.
    ///
    /// Their messages stay in the cache as failed. Returns the temp-ids removed.
    pub fn cleanup_failed(&self) -> MessengerResult<Vec<String>> {
        let removed = self.storage.cleanup_exhausted(self.config.outbox.max_retries)?;

        for entry in &removed {
            self.events.dispatch(MessengerEvent::MessageAbandoned {
                conversation_id: entry.conversation_id.clone(),
                temp_id: entry.temp_id.clone(),
            });
        }
        if !removed.is_empty() {
            warn!(count = removed.len(), "abandoned undeliverable messages");
        }

        Ok(removed.into_iter().map(|entry| entry.temp_id).collect())
    }

    /// Gives an entry a fresh set of retries ("tap to retry").
    pub fn retry_message(&self, temp_id: &str) -> MessengerResult<()> {
        if !self.storage.reset_outbox_retries(temp_id)? {
            return Err(MessengerError::NotFound(format!("outbox entry {}", temp_id)));
        }
        debug!(temp_id, "retries reset");
        Ok(())
    }

    /// Entries the next sweep will attempt, oldest first.
    pub fn pending_outbox(&self) -> MessengerResult<Vec<OutboxEntry>> {
        Ok(self.storage.dequeue_pending(self.config.outbox.max_retries)?)
    }

    /// Counts pending and exhausted outbox entries.
    pub fn outbox_status(&self) -> MessengerResult<OutboxStatus> {
        Ok(self.policy().status(&self.storage)?)
    }

    // === Receiving ===

    /// Stores a message pushed by the backend.
    ///
    /// An echo of one of our queued sends counts as its confirmation. A new
    /// message from someone else bumps the unread counter; redelivery of a
    /// known message changes nothing but its stored fields.
    pub fn receive_message(&self, message: &Message) -> MessengerResult<Message> {
        if message.id.trim().is_empty() || message.conversation_id.trim().is_empty() {
            return Err(MessengerError::InvalidInput(
                "message needs an id and a conversation_id".into(),
            ));
        }

        if let Some(confirmed) = self.confirm_if_queued(message)? {
            return Ok(confirmed);
        }

        let known = self.storage.get_message(&message.id)?.is_some();
        let stored = self.storage.save_message(message)?;

        if stored && !known {
            if message.sender_id != self.config.user_id {
                self.storage.increment_unread(&message.conversation_id)?;
            }
            debug!(id = %message.id, conversation_id = %message.conversation_id, "message received");
            self.events.dispatch(MessengerEvent::MessageReceived {
                conversation_id: message.conversation_id.clone(),
                message_id: message.id.clone(),
            });
        }

        Ok(message.clone())
    }

    /// Stores a page of history from a backend envelope.
    ///
    /// History does not touch unread counters. A server copy of a send that
    /// is still queued confirms it. Returns the stored messages.
    pub fn ingest_envelope(&self, json: &str) -> MessengerResult<Vec<Message>> {
        let wire: Vec<WireMessage> = parse_envelope(json)?;

        let mut stored = Vec::with_capacity(wire.len());
        for item in wire {
            let message = item.into_message()?;
            if let Some(confirmed) = self.confirm_if_queued(&message)? {
                stored.push(confirmed);
            } else if self.storage.save_message(&message)? {
                stored.push(message);
            }
        }

        debug!(count = stored.len(), "history page cached");
        Ok(stored)
    }

    /// Stores the conversation list from a backend envelope.
    ///
    /// Returns the number of conversations stored.
    pub fn ingest_conversations(&self, json: &str) -> MessengerResult<usize> {
        let wire: Vec<WireConversation> = parse_envelope(json)?;
        let count = wire.len();

        for item in wire {
            let (conversation, last_message) = item.into_parts()?;
            if let Some(message) = last_message {
                if self.confirm_if_queued(&message)?.is_none() {
                    self.storage.save_message(&message)?;
                }
            }
            self.storage.save_conversation(&conversation)?;
        }

        debug!(count, "conversation list cached");
        Ok(count)
    }

    // === Reading ===

    /// Loads one page of cached messages strictly older than `cursor`.
    ///
    /// `cursor` is the ID of the oldest message already shown; `None` loads
    /// the newest page.
    pub fn load_messages(
        &self,
        conversation_id: &str,
        cursor: Option<&str>,
    ) -> MessengerResult<Vec<Message>> {
        let cursor = match cursor {
            Some(id) => MessageCursor::BeforeMessage(id.to_string()),
            None => MessageCursor::Latest,
        };
        self.load_page(conversation_id, &cursor)
    }

    /// Loads one page of cached messages for any cursor kind.
    pub fn load_page(
        &self,
        conversation_id: &str,
        cursor: &MessageCursor,
    ) -> MessengerResult<Vec<Message>> {
        match self
            .storage
            .get_messages_page(conversation_id, cursor, self.config.page_size)
        {
            Ok(page) => Ok(page),
            Err(StorageError::NotFound(what)) => Err(MessengerError::NotFound(what)),
            Err(e) => Err(e.into()),
        }
    }

    /// Gets a message by server ID or temp-id.
    pub fn get_message(&self, id: &str) -> MessengerResult<Option<Message>> {
        if let Some(message) = self.storage.get_message(id)? {
            return Ok(Some(message));
        }
        Ok(self.storage.get_message_by_temp_id(id)?)
    }

    /// Lists conversations, most recently active first.
    pub fn list_conversations(&self) -> MessengerResult<Vec<Conversation>> {
        Ok(self.storage.list_conversations()?)
    }

    /// Gets a conversation by ID.
    pub fn get_conversation(&self, id: &str) -> MessengerResult<Option<Conversation>> {
        Ok(self.storage.get_conversation(id)?)
    }

    /// Marks a conversation read for the signed-in user.
    ///
    /// Returns the number of messages that changed to read.
    pub fn mark_read(&self, conversation_id: &str) -> MessengerResult<usize> {
        let updated = self
            .storage
            .mark_conversation_read(conversation_id, &self.config.user_id)?;

        self.events.dispatch(MessengerEvent::ConversationRead {
            conversation_id: conversation_id.to_string(),
            updated,
        });
        Ok(updated)
    }

    // === Event Operations ===

    /// Adds an event handler.
    pub fn add_event_handler(&mut self, handler: Arc<dyn EventHandler>) {
        if let Some(events) = Arc::get_mut(&mut self.events) {
            events.add_handler(handler);
        }
    }

    /// Clears all event handlers.
    pub fn clear_event_handlers(&mut self) {
        if let Some(events) = Arc::get_mut(&mut self.events) {
            events.clear_handlers();
        }
    }

    // === Configuration ===

    pub fn config(&self) -> &MessengerConfig {
        &self.config
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    fn policy(&self) -> OutboxPolicy {
        self.config.outbox
    }

    /// Confirms the queued send `message` answers, if any.
    fn confirm_if_queued(&self, message: &Message) -> MessengerResult<Option<Message>> {
        let Some(temp_id) = message.temp_id.as_deref() else {
            return Ok(None);
        };
        if self.storage.get_outbox_entry(temp_id)?.is_none() {
            return Ok(None);
        }
        self.confirm_sent(temp_id, message).map(Some)
    }
}
