// SPDX-FileCopyrightText: 2026 Amora Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Common Test Utilities
//!
//! Shared helpers and proptest strategies used across test modules.

#![allow(dead_code)]

pub mod strategies;

use amora_core::message::{Message, MessageStatus, MessageType, OutboxEntry};
use amora_core::storage::Storage;
use amora_core::wire::OutboxPayload;

pub const ME: &str = "user-me";
pub const THEM: &str = "user-them";

/// Fresh in-memory storage with the full schema.
pub fn test_storage() -> Storage {
    Storage::in_memory().unwrap()
}

/// A confirmed message from the other participant.
pub fn incoming(id: &str, conversation_id: &str, timestamp: i64) -> Message {
    Message {
        id: id.to_string(),
        conversation_id: conversation_id.to_string(),
        sender_id: THEM.to_string(),
        content: format!("message {}", id),
        message_type: MessageType::Text,
        timestamp,
        status: MessageStatus::Delivered,
        temp_id: None,
        media_url: None,
    }
}

/// Saves an optimistic text message plus its outbox entry.
pub fn queue_text(storage: &Storage, conversation_id: &str, content: &str) -> Message {
    let message = Message::optimistic(conversation_id, ME, content, MessageType::Text);
    queue(storage, &message);
    message
}

/// Saves `message` and an outbox entry built from it.
pub fn queue(storage: &Storage, message: &Message) {
    let payload = OutboxPayload::from_message(message).unwrap();
    let entry = OutboxEntry::new(
        &message.id,
        &message.conversation_id,
        payload.to_json().unwrap(),
        message.timestamp,
    );
    storage.enqueue_optimistic(message, &entry).unwrap();
}

/// The server copy of an optimistic message.
pub fn confirmation(pending: &Message, server_id: &str) -> Message {
    Message {
        id: server_id.to_string(),
        status: MessageStatus::Sent,
        ..pending.clone()
    }
}

/// Installs a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
