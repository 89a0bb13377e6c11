// SPDX-FileCopyrightText: 2026 Amora Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Outbox Sync Module
//!
//! Drains the offline outbox through a [`MessageTransport`] when the device
//! is online. Each sweep tries every entry under the retry ceiling once,
//! oldest first; failures bump the entry's retry counter.

mod policy;
mod sweeper;
mod transport;

pub use policy::{OutboxPolicy, OutboxStatus, DEFAULT_MAX_QUEUE_SIZE, DEFAULT_MAX_RETRIES};
pub use sweeper::{DrainReport, OutboxSweeper};
pub use transport::{MessageTransport, MockMessageTransport, TransportError};
