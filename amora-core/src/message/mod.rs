// SPDX-FileCopyrightText: 2026 Amora Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Message Model
//!
//! Local representations of chat messages, conversations and outbox entries.
//! These are the shapes stored in the SQLite cache; the backend JSON shapes
//! live in [`crate::wire`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix for client-generated temporary message IDs.
pub const TEMP_ID_PREFIX: &str = "tmp_";

/// Generates a new temporary ID for an optimistic message.
pub fn generate_temp_id() -> String {
    format!("{}{}", TEMP_ID_PREFIX, Uuid::new_v4())
}

/// Returns true if the ID was minted locally for an optimistic send.
pub fn is_temp_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

/// Current Unix time in milliseconds.
pub fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Kind of content carried by a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Text,
    Image,
    #[serde(alias = "voice")]
    Audio,
    Video,
}

impl MessageType {
    /// Database/wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Text => "text",
            MessageType::Image => "image",
            MessageType::Audio => "audio",
            MessageType::Video => "video",
        }
    }

    /// True for types whose content is a reference to uploaded media.
    pub fn is_media(&self) -> bool {
        !matches!(self, MessageType::Text)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(MessageType::Text),
            "image" => Ok(MessageType::Image),
            "audio" | "voice" => Ok(MessageType::Audio),
            "video" => Ok(MessageType::Video),
            other => Err(format!("unknown message type '{}'", other)),
        }
    }
}

/// Delivery progression of a message.
///
/// `Pending` is only ever held by optimistic messages that the server has
/// not confirmed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Pending,
    #[default]
    Sent,
    Delivered,
    Read,
    Failed,
}

impl MessageStatus {
    /// Database/wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Pending => "pending",
            MessageStatus::Sent => "sent",
            MessageStatus::Delivered => "delivered",
            MessageStatus::Read => "read",
            MessageStatus::Failed => "failed",
        }
    }

    /// Parses the database representation, treating unknown values as `Sent`.
    pub fn from_db(s: &str) -> Self {
        match s {
            "pending" => MessageStatus::Pending,
            "delivered" => MessageStatus::Delivered,
            "read" => MessageStatus::Read,
            "failed" => MessageStatus::Failed,
            _ => MessageStatus::Sent,
        }
    }

    /// True once the server has accepted the message.
    pub fn is_confirmed(&self) -> bool {
        matches!(
            self,
            MessageStatus::Sent | MessageStatus::Delivered | MessageStatus::Read
        )
    }
}

/// A chat message as held in the local cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Server ID, or the temp-id while the message is optimistic.
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    pub message_type: MessageType,
    /// Unix milliseconds.
    pub timestamp: i64,
    pub status: MessageStatus,
    /// Client-generated ID linking an optimistic send to its confirmation.
    pub temp_id: Option<String>,
    pub media_url: Option<String>,
}

impl Message {
    /// Creates an optimistic message keyed by a fresh temp-id.
    pub fn optimistic(
        conversation_id: &str,
        sender_id: &str,
        content: &str,
        message_type: MessageType,
    ) -> Self {
        let temp_id = generate_temp_id();
        Message {
            id: temp_id.clone(),
            conversation_id: conversation_id.to_string(),
            sender_id: sender_id.to_string(),
            content: content.to_string(),
            message_type,
            timestamp: now_millis(),
            status: MessageStatus::Pending,
            temp_id: Some(temp_id),
            media_url: None,
        }
    }

    /// Attaches a media reference.
    pub fn with_media_url(mut self, media_url: impl Into<String>) -> Self {
        self.media_url = Some(media_url.into());
        self
    }

    /// True while the message awaits server confirmation.
    pub fn is_optimistic(&self) -> bool {
        self.status == MessageStatus::Pending && is_temp_id(&self.id)
    }

    /// Short text suitable for a conversation list preview.
    pub fn preview(&self) -> String {
        match self.message_type {
            MessageType::Text => self.content.chars().take(PREVIEW_CHARS).collect(),
            MessageType::Image => "[image]".to_string(),
            MessageType::Audio => "[voice message]".to_string(),
            MessageType::Video => "[video]".to_string(),
        }
    }
}

/// Maximum characters kept in a conversation preview.
pub const PREVIEW_CHARS: usize = 120;

/// A conversation with a denormalized pointer to its latest message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub last_message_id: Option<String>,
    pub last_message_preview: Option<String>,
    /// Unix milliseconds of the latest message.
    pub last_activity: i64,
    pub unread_count: u32,
}

impl Conversation {
    /// Creates an empty conversation record.
    pub fn new(id: &str) -> Self {
        Conversation {
            id: id.to_string(),
            last_message_id: None,
            last_message_preview: None,
            last_activity: 0,
            unread_count: 0,
        }
    }
}

/// A queued send awaiting network delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxEntry {
    pub temp_id: String,
    pub conversation_id: String,
    /// JSON body of the send request.
    pub payload: String,
    /// Unix milliseconds.
    pub created_at: i64,
    pub retry_count: u32,
    pub last_error: Option<String>,
    pub last_retry_at: Option<i64>,
}

impl OutboxEntry {
    /// Creates a fresh entry with no attempts recorded.
    pub fn new(temp_id: &str, conversation_id: &str, payload: String, created_at: i64) -> Self {
        OutboxEntry {
            temp_id: temp_id.to_string(),
            conversation_id: conversation_id.to_string(),
            payload,
            created_at,
            retry_count: 0,
            last_error: None,
            last_retry_at: None,
        }
    }

    /// Returns true once the entry may no longer be retried automatically.
    pub fn is_exhausted(&self, max_retries: u32) -> bool {
        self.retry_count >= max_retries
    }
}
