// SPDX-FileCopyrightText: 2026 Amora Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Outbox drain sweep.

use tracing::{debug, info, warn};

use crate::message::Message;
use crate::storage::{Storage, StorageError};
use crate::wire::OutboxPayload;

use super::policy::OutboxPolicy;
use super::transport::{MessageTransport, TransportError};

/// Result of a drain sweep.
#[derive(Debug, Default)]
pub struct DrainReport {
    /// Server-confirmed messages that replaced their optimistic copies.
    pub sent: Vec<Message>,
    /// Failed attempts as (temp_id, error).
    pub failed: Vec<(String, String)>,
    /// Entries that reached the retry ceiling during this sweep.
    pub exhausted: Vec<String>,
    /// True if the sweep stopped (or never started) for lack of connectivity.
    pub offline: bool,
}

impl DrainReport {
    /// Number of send attempts made.
    pub fn attempted(&self) -> usize {
        self.sent.len() + self.failed.len()
    }
}

/// Drains the outbox through a transport.
pub struct OutboxSweeper<'a> {
    storage: &'a Storage,
    policy: OutboxPolicy,
}

impl<'a> OutboxSweeper<'a> {
    pub fn new(storage: &'a Storage, policy: OutboxPolicy) -> Self {
        OutboxSweeper { storage, policy }
    }

    /// Attempts every entry under the retry ceiling once, oldest first.
    ///
    /// A confirmed send replaces the optimistic message and removes the
    /// entry. Any other outcome except going offline charges one retry.
    /// Storage errors abort the sweep.
    pub fn drain<T>(&self, transport: &mut T) -> Result<DrainReport, StorageError>
    where
        T: MessageTransport + ?Sized,
    {
        let mut report = DrainReport::default();

        if !transport.is_online() {
            debug!("outbox drain skipped: offline");
            report.offline = true;
            return Ok(report);
        }

        let pending = self.storage.dequeue_pending(self.policy.max_retries)?;
        if pending.is_empty() {
            return Ok(report);
        }
        debug!(count = pending.len(), "draining outbox");

        for entry in pending {
            let outcome = OutboxPayload::from_json(&entry.payload)
                .map_err(|e| TransportError::Protocol(format!("unreadable payload: {}", e)))
                .and_then(|payload| transport.send(&payload));

            match outcome {
                Ok(server_message) => {
                    let confirmed = self.storage.complete_send(&entry.temp_id, &server_message)?;
                    debug!(temp_id = %entry.temp_id, id = %confirmed.id, "outbox entry sent");
                    report.sent.push(confirmed);
                }
                Err(TransportError::Offline) => {
                    info!(temp_id = %entry.temp_id, "connectivity lost during outbox drain");
                    report.offline = true;
                    break;
                }
                Err(e) => {
                    let error = e.to_string();
                    self.storage.mark_outbox_failed(&entry.temp_id, &error)?;

                    if entry.retry_count + 1 >= self.policy.max_retries {
                        warn!(
                            temp_id = %entry.temp_id,
                            attempts = entry.retry_count + 1,
                            error = %error,
                            "outbox entry exhausted its retries"
                        );
                        report.exhausted.push(entry.temp_id.clone());
                    } else {
                        debug!(temp_id = %entry.temp_id, error = %error, "outbox send failed");
                    }
                    report.failed.push((entry.temp_id, error));
                }
            }
        }

        Ok(report)
    }
}
