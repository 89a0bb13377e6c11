// SPDX-FileCopyrightText: 2026 Amora Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Amora Core Library
//!
//! Client-side data layer for the Amora chat: a SQLite message cache with
//! cursor pagination, optimistic sends replaced by server confirmations, and
//! a durable offline outbox with a bounded retry counter.

pub mod api;
pub mod message;
pub mod storage;
pub mod sync;
pub mod wire;

pub use api::{
    CallbackHandler, EventHandler, Messenger, MessengerConfig, MessengerError, MessengerEvent,
    MessengerResult,
};
pub use message::{
    generate_temp_id, is_temp_id, Conversation, Message, MessageStatus, MessageType, OutboxEntry,
};
pub use storage::{MessageCursor, SecureStorage, Storage, StorageError};
pub use sync::{
    DrainReport, MessageTransport, MockMessageTransport, OutboxPolicy, OutboxStatus,
    OutboxSweeper, TransportError,
};
pub use wire::{ApiEnvelope, OutboxPayload, WireConversation, WireError, WireMessage};
