// SPDX-FileCopyrightText: 2026 Amora Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Backend Wire Format
//!
//! JSON shapes exchanged with the chat backend. Every REST response is
//! wrapped in an [`ApiEnvelope`]; message and conversation bodies convert
//! into the local cache models.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::message::{Conversation, Message, MessageStatus, MessageType};

/// Wire format errors.
#[derive(Error, Debug)]
pub enum WireError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request rejected by server: {0}")]
    Rejected(String),

    #[error("response has no data")]
    MissingData,

    #[error("invalid field '{0}'")]
    InvalidField(&'static str),
}

/// Standard response wrapper: `{ "success": bool, "data": T, "message": "..." }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Wraps a successful payload.
    pub fn ok(data: T) -> Self {
        ApiEnvelope {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// Unwraps the payload, turning `success: false` into an error.
    pub fn into_result(self) -> Result<T, WireError> {
        if !self.success {
            return Err(WireError::Rejected(
                self.message.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        self.data.ok_or(WireError::MissingData)
    }
}

/// Parses an envelope and unwraps its payload.
pub fn parse_envelope<T: DeserializeOwned>(json: &str) -> Result<T, WireError> {
    let envelope: ApiEnvelope<T> = serde_json::from_str(json)?;
    envelope.into_result()
}

/// A message as the backend sends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "type", default)]
    pub message_type: MessageType,
    /// Unix milliseconds.
    pub created_at: i64,
    #[serde(default)]
    pub status: MessageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
}

impl WireMessage {
    /// Converts into a cache model, rejecting blank identifiers.
    pub fn into_message(self) -> Result<Message, WireError> {
        if self.id.trim().is_empty() {
            return Err(WireError::InvalidField("id"));
        }
        if self.conversation_id.trim().is_empty() {
            return Err(WireError::InvalidField("conversation_id"));
        }

        Ok(Message {
            id: self.id,
            conversation_id: self.conversation_id,
            sender_id: self.sender_id,
            content: self.content,
            message_type: self.message_type,
            timestamp: self.created_at,
            status: self.status,
            temp_id: self.temp_id,
            media_url: self.media_url,
        })
    }
}

impl From<&Message> for WireMessage {
    fn from(message: &Message) -> Self {
        WireMessage {
            id: message.id.clone(),
            conversation_id: message.conversation_id.clone(),
            sender_id: message.sender_id.clone(),
            content: message.content.clone(),
            message_type: message.message_type,
            created_at: message.timestamp,
            status: message.status,
            temp_id: message.temp_id.clone(),
            media_url: message.media_url.clone(),
        }
    }
}

/// A conversation summary as the backend sends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireConversation {
    pub id: String,
    #[serde(default)]
    pub last_message: Option<WireMessage>,
    /// Unix milliseconds.
    pub updated_at: i64,
    #[serde(default)]
    pub unread_count: u32,
}

impl WireConversation {
    /// Splits into the conversation record and its latest message, if any.
    pub fn into_parts(self) -> Result<(Conversation, Option<Message>), WireError> {
        let last_message = self.last_message.map(WireMessage::into_message).transpose()?;

        let conversation = Conversation {
            id: self.id,
            last_message_id: last_message.as_ref().map(|m| m.id.clone()),
            last_message_preview: last_message.as_ref().map(Message::preview),
            last_activity: last_message
                .as_ref()
                .map_or(self.updated_at, |m| m.timestamp.max(self.updated_at)),
            unread_count: self.unread_count,
        };

        Ok((conversation, last_message))
    }
}

/// Body of a send request, stored verbatim in the outbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboxPayload {
    pub conversation_id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub temp_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
}

impl OutboxPayload {
    /// Builds the request body for an optimistic message.
    pub fn from_message(message: &Message) -> Result<Self, WireError> {
        let temp_id = message
            .temp_id
            .clone()
            .ok_or(WireError::InvalidField("temp_id"))?;

        Ok(OutboxPayload {
            conversation_id: message.conversation_id.clone(),
            content: message.content.clone(),
            message_type: message.message_type,
            temp_id,
            media_url: message.media_url.clone(),
        })
    }

    pub fn to_json(&self) -> Result<String, WireError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, WireError> {
        Ok(serde_json::from_str(json)?)
    }
}
