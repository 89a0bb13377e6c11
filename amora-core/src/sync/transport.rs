// SPDX-FileCopyrightText: 2026 Amora Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Transport seam between the outbox and the backend.

use std::collections::{HashMap, VecDeque};

use thiserror::Error;

use crate::message::{now_millis, Message, MessageStatus};
use crate::wire::OutboxPayload;

/// Errors a send attempt can end with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// No connectivity. The sweep stops without charging a retry.
    #[error("offline")]
    Offline,

    #[error("rejected by server: {0}")]
    Rejected(String),

    #[error("request timed out")]
    Timeout,

    #[error("unexpected response: {0}")]
    Protocol(String),
}

/// Sends queued messages to the backend.
///
/// Implemented by the host app over its HTTP client or socket. `send` returns
/// the server-confirmed copy of the message.
pub trait MessageTransport: Send {
    /// Returns true if a send is worth attempting.
    fn is_online(&self) -> bool;

    /// Sends one queued message.
    fn send(&mut self, payload: &OutboxPayload) -> Result<Message, TransportError>;
}

/// Scriptable in-process transport for tests and previews.
///
/// Confirms every send with a sequential `srv-N` ID unless a failure was
/// scripted for that temp-id or queued for the next call.
pub struct MockMessageTransport {
    sender_id: String,
    online: bool,
    next_id: u64,
    queued_failures: VecDeque<TransportError>,
    failures_by_temp_id: HashMap<String, TransportError>,
    sent: Vec<OutboxPayload>,
}

impl Default for MockMessageTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMessageTransport {
    pub fn new() -> Self {
        Self::for_user("local-user")
    }

    /// Creates a transport that stamps confirmations with `sender_id`.
    pub fn for_user(sender_id: &str) -> Self {
        MockMessageTransport {
            sender_id: sender_id.to_string(),
            online: true,
            next_id: 1,
            queued_failures: VecDeque::new(),
            failures_by_temp_id: HashMap::new(),
            sent: Vec::new(),
        }
    }

    pub fn set_online(&mut self, online: bool) {
        self.online = online;
    }

    /// Fails the next call with `error`.
    pub fn fail_next(&mut self, error: TransportError) {
        self.queued_failures.push_back(error);
    }

    /// Fails every send of `temp_id` with `error`.
    pub fn fail_for(&mut self, temp_id: &str, error: TransportError) {
        self.failures_by_temp_id.insert(temp_id.to_string(), error);
    }

    /// Stops failing sends of `temp_id`.
    pub fn clear_failure(&mut self, temp_id: &str) {
        self.failures_by_temp_id.remove(temp_id);
    }

    /// Payloads of every attempted send, in order.
    pub fn sent(&self) -> &[OutboxPayload] {
        &self.sent
    }

    /// Number of attempts made for one temp-id.
    pub fn attempts_for(&self, temp_id: &str) -> usize {
        self.sent.iter().filter(|p| p.temp_id == temp_id).count()
    }
}

impl MessageTransport for MockMessageTransport {
    fn is_online(&self) -> bool {
        self.online
    }

    fn send(&mut self, payload: &OutboxPayload) -> Result<Message, TransportError> {
        if !self.online {
            return Err(TransportError::Offline);
        }

        self.sent.push(payload.clone());

        if let Some(error) = self.queued_failures.pop_front() {
            return Err(error);
        }
        if let Some(error) = self.failures_by_temp_id.get(&payload.temp_id) {
            return Err(error.clone());
        }

        let id = format!("srv-{}", self.next_id);
        self.next_id += 1;

        Ok(Message {
            id,
            conversation_id: payload.conversation_id.clone(),
            sender_id: self.sender_id.clone(),
            content: payload.content.clone(),
            message_type: payload.message_type,
            timestamp: now_millis(),
            status: MessageStatus::Sent,
            temp_id: Some(payload.temp_id.clone()),
            media_url: payload.media_url.clone(),
        })
    }
}
