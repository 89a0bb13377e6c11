// SPDX-FileCopyrightText: 2026 Amora Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mobile-friendly data types.
//!
//! These types are wrappers around amora-core types that are compatible
//! with UniFFI for cross-language bindings.

use amora_core::{Conversation, Message, MessageStatus, MessageType, OutboxEntry, OutboxStatus};

/// Mobile-friendly message type enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum MobileMessageType {
    Text,
    Image,
    Audio,
    Video,
}

impl From<MessageType> for MobileMessageType {
    fn from(mt: MessageType) -> Self {
        match mt {
            MessageType::Text => MobileMessageType::Text,
            MessageType::Image => MobileMessageType::Image,
            MessageType::Audio => MobileMessageType::Audio,
            MessageType::Video => MobileMessageType::Video,
        }
    }
}

impl From<MobileMessageType> for MessageType {
    fn from(mmt: MobileMessageType) -> Self {
        match mmt {
            MobileMessageType::Text => MessageType::Text,
            MobileMessageType::Image => MessageType::Image,
            MobileMessageType::Audio => MessageType::Audio,
            MobileMessageType::Video => MessageType::Video,
        }
    }
}

/// Mobile-friendly delivery status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum MobileMessageStatus {
    /// Shown optimistically, not confirmed by the server yet.
    Pending,
    Sent,
    Delivered,
    Read,
    /// Gave up after the retry ceiling.
    Failed,
}

impl From<MessageStatus> for MobileMessageStatus {
    fn from(status: MessageStatus) -> Self {
        match status {
            MessageStatus::Pending => MobileMessageStatus::Pending,
            MessageStatus::Sent => MobileMessageStatus::Sent,
            MessageStatus::Delivered => MobileMessageStatus::Delivered,
            MessageStatus::Read => MobileMessageStatus::Read,
            MessageStatus::Failed => MobileMessageStatus::Failed,
        }
    }
}

/// Mobile-friendly message.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct MobileMessage {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    pub message_type: MobileMessageType,
    /// Unix milliseconds.
    pub timestamp: i64,
    pub status: MobileMessageStatus,
    pub temp_id: Option<String>,
    pub media_url: Option<String>,
    pub is_optimistic: bool,
}

impl From<&Message> for MobileMessage {
    fn from(message: &Message) -> Self {
        MobileMessage {
            id: message.id.clone(),
            conversation_id: message.conversation_id.clone(),
            sender_id: message.sender_id.clone(),
            content: message.content.clone(),
            message_type: message.message_type.into(),
            timestamp: message.timestamp,
            status: message.status.into(),
            temp_id: message.temp_id.clone(),
            media_url: message.media_url.clone(),
            is_optimistic: message.is_optimistic(),
        }
    }
}

/// Mobile-friendly outbox entry.
///
/// `payload` is the JSON body to POST to the send endpoint.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct MobileOutboxEntry {
    pub temp_id: String,
    pub conversation_id: String,
    pub payload: String,
    pub created_at: i64,
    pub retry_count: u32,
    pub last_error: Option<String>,
    pub last_retry_at: Option<i64>,
}

impl From<&OutboxEntry> for MobileOutboxEntry {
    fn from(entry: &OutboxEntry) -> Self {
        MobileOutboxEntry {
            temp_id: entry.temp_id.clone(),
            conversation_id: entry.conversation_id.clone(),
            payload: entry.payload.clone(),
            created_at: entry.created_at,
            retry_count: entry.retry_count,
            last_error: entry.last_error.clone(),
            last_retry_at: entry.last_retry_at,
        }
    }
}

/// Mobile-friendly conversation summary.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct MobileConversation {
    pub id: String,
    pub last_message_id: Option<String>,
    pub last_message_preview: Option<String>,
    pub last_activity: i64,
    pub unread_count: u32,
}

impl From<&Conversation> for MobileConversation {
    fn from(conversation: &Conversation) -> Self {
        MobileConversation {
            id: conversation.id.clone(),
            last_message_id: conversation.last_message_id.clone(),
            last_message_preview: conversation.last_message_preview.clone(),
            last_activity: conversation.last_activity,
            unread_count: conversation.unread_count,
        }
    }
}

/// Outbox counters for a badge or banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Record)]
pub struct MobileOutboxStatus {
    pub pending: u32,
    pub exhausted: u32,
}

impl From<OutboxStatus> for MobileOutboxStatus {
    fn from(status: OutboxStatus) -> Self {
        MobileOutboxStatus {
            pending: status.pending as u32,
            exhausted: status.exhausted as u32,
        }
    }
}
