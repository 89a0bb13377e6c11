// SPDX-FileCopyrightText: 2026 Amora Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Messenger API Layer
//!
//! High-level API the app talks to.
//!
//! # Overview
//!
//! The API layer coordinates:
//! - Optimistic sends and the offline outbox
//! - Incoming messages and backend history pages
//! - Cursor-paginated reads from the local cache
//! - Event handling
//!
//! # Example
//!
//! ```ignore
//! use amora_core::api::{Messenger, MessengerConfig};
//! use amora_core::message::MessageType;
//!
//! let messenger = Messenger::open(MessengerConfig::default().with_user_id("user-1"))?;
//! messenger.send_message("conv-1", "hi", MessageType::Text, None)?;
//!
//! let newest = messenger.load_messages("conv-1", None)?;
//! let older = messenger.load_messages("conv-1", newest.last().map(|m| m.id.as_str()))?;
//! ```
//!
//! # Module Structure
//!
//! - [`error`] - Error types for the API layer
//! - [`config`] - Configuration types
//! - [`events`] - Event system for callbacks
//! - [`messenger`] - Main orchestrator

#[cfg(feature = "testing")]
pub mod config;
#[cfg(not(feature = "testing"))]
mod config;

#[cfg(feature = "testing")]
pub mod error;
#[cfg(not(feature = "testing"))]
mod error;

#[cfg(feature = "testing")]
pub mod events;
#[cfg(not(feature = "testing"))]
mod events;

#[cfg(feature = "testing")]
pub mod messenger;
#[cfg(not(feature = "testing"))]
mod messenger;

// Error types
pub use error::{MessengerError, MessengerResult};

// Configuration
pub use config::{MessengerConfig, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

// Events
pub use events::{CallbackHandler, EventDispatcher, EventHandler, MessengerEvent};

// Messenger
pub use messenger::Messenger;
