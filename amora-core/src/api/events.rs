// SPDX-FileCopyrightText: 2026 Amora Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Event System
//!
//! Callbacks for messenger events, so the UI can refresh without polling.

use std::sync::Arc;

/// Events emitted by the messenger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessengerEvent {
    /// An optimistic message was stored and queued for sending.
    MessageQueued {
        conversation_id: String,
        temp_id: String,
    },

    /// The server confirmed a queued message.
    MessageSent {
        conversation_id: String,
        temp_id: String,
        /// Server-assigned message ID.
        message_id: String,
    },

    /// A send attempt failed and was charged a retry.
    MessageFailed {
        temp_id: String,
        error: String,
        /// True once the entry will not be retried automatically.
        exhausted: bool,
    },

    /// An exhausted entry was removed and its message marked failed.
    MessageAbandoned {
        conversation_id: String,
        temp_id: String,
    },

    /// An incoming message was stored.
    MessageReceived {
        conversation_id: String,
        message_id: String,
    },

    /// A conversation was marked read.
    ConversationRead {
        conversation_id: String,
        /// Messages that changed to read.
        updated: usize,
    },
}

/// Event handler trait.
///
/// Implement this trait to receive messenger events.
pub trait EventHandler: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: MessengerEvent);
}

/// Simple callback-based event handler.
pub struct CallbackHandler<F>
where
    F: Fn(MessengerEvent) + Send + Sync,
{
    callback: F,
}

impl<F> CallbackHandler<F>
where
    F: Fn(MessengerEvent) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        CallbackHandler { callback }
    }
}

impl<F> EventHandler for CallbackHandler<F>
where
    F: Fn(MessengerEvent) + Send + Sync,
{
    fn on_event(&self, event: MessengerEvent) {
        (self.callback)(event);
    }
}

/// Fans events out to registered handlers.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        EventDispatcher {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    pub fn clear_handlers(&mut self) {
        self.handlers.clear();
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Dispatches an event to all handlers, in registration order.
    pub fn dispatch(&self, event: MessengerEvent) {
        for handler in &self.handlers {
            handler.on_event(event.clone());
        }
    }
}
