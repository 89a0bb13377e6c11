// SPDX-FileCopyrightText: 2026 Amora Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Property-Based Tests
//!
//! Uses proptest to check the cache and outbox guarantees over generated
//! histories instead of hand-picked cases.

mod common;

use std::collections::HashSet;

use proptest::prelude::*;

use amora_core::message::{Conversation, Message, MessageType};
use amora_core::sync::{MockMessageTransport, OutboxPolicy, OutboxSweeper, TransportError};

use common::strategies::{
    content_strategy, conversation_ops_strategy, history_strategy, max_retries_strategy,
    message_type_strategy, page_size_strategy, timestamp_strategy,
};
use common::{confirmation, incoming, queue, test_storage, ME};

proptest! {
    /// Property: every message of a page is strictly older than the cursor.
    #[test]
    fn prop_page_strictly_before_cursor(
        timestamps in history_strategy(40),
        cursor_index in any::<prop::sample::Index>(),
        limit in page_size_strategy(),
    ) {
        let storage = test_storage();
        for (i, ts) in timestamps.iter().enumerate() {
            storage.save_message(&incoming(&format!("m{}", i), "conv", *ts)).unwrap();
        }

        let cursor_pos = cursor_index.index(timestamps.len());
        let cursor_id = format!("m{}", cursor_pos);
        let bound = timestamps[cursor_pos];

        let page = storage.get_messages("conv", Some(&cursor_id), limit).unwrap();

        prop_assert!(page.len() <= limit);
        for message in &page {
            prop_assert!(message.timestamp < bound);
        }
        for pair in page.windows(2) {
            prop_assert!(pair[0].timestamp >= pair[1].timestamp);
        }
    }

    /// Property: walking pages back from the newest never returns a message twice.
    #[test]
    fn prop_pages_never_repeat(
        timestamps in history_strategy(40),
        limit in page_size_strategy(),
    ) {
        let storage = test_storage();
        for (i, ts) in timestamps.iter().enumerate() {
            storage.save_message(&incoming(&format!("m{}", i), "conv", *ts)).unwrap();
        }

        let mut seen = HashSet::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = storage.get_messages("conv", cursor.as_deref(), limit).unwrap();
            let Some(last) = page.last() else { break };
            for message in &page {
                prop_assert!(seen.insert(message.id.clone()));
            }
            cursor = Some(last.id.clone());
        }
        prop_assert!(seen.len() <= timestamps.len());
    }

    /// Property: however confirmations and late optimistic writes interleave,
    /// one temp-id ends up as exactly one stored message.
    #[test]
    fn prop_one_message_per_temp_id(
        content in content_strategy(),
        message_type in message_type_strategy(),
        ops in prop::collection::vec(0u8..3u8, 1..12),
    ) {
        let storage = test_storage();
        let pending = Message::optimistic("conv", ME, &content, message_type);
        queue(&storage, &pending);
        let server = confirmation(&pending, "srv-1");

        for op in ops {
            match op {
                0 => { storage.replace_optimistic(&pending.id, &server).unwrap(); }
                1 => { storage.save_message(&pending).unwrap(); }
                _ => { storage.save_message(&server).unwrap(); }
            }
        }

        prop_assert_eq!(storage.count_messages("conv").unwrap(), 1);
    }

    /// Property: an always-failing entry is attempted exactly `max_retries` times.
    #[test]
    fn prop_never_retried_past_ceiling(
        max_retries in max_retries_strategy(),
        sweeps in 1usize..10usize,
    ) {
        let storage = test_storage();
        let pending = Message::optimistic("conv", ME, "hi", MessageType::Text);
        queue(&storage, &pending);

        let mut transport = MockMessageTransport::for_user(ME);
        transport.fail_for(&pending.id, TransportError::Timeout);
        let sweeper = OutboxSweeper::new(&storage, OutboxPolicy::new().with_max_retries(max_retries));

        for _ in 0..sweeps {
            sweeper.drain(&mut transport).unwrap();
        }

        let expected = sweeps.min(max_retries as usize);
        prop_assert_eq!(transport.attempts_for(&pending.id), expected);
        let entry = storage.get_outbox_entry(&pending.id).unwrap().unwrap();
        prop_assert!(entry.retry_count <= max_retries);
    }

    /// Property: the conversation pointer only moves forward in time.
    #[test]
    fn prop_pointer_never_moves_back(timestamps in prop::collection::vec(timestamp_strategy(), 1..20)) {
        let storage = test_storage();
        let mut newest = i64::MIN;

        for (i, ts) in timestamps.iter().enumerate() {
            storage.save_message(&incoming(&format!("m{}", i), "conv", *ts)).unwrap();
            newest = newest.max(*ts);

            let conversation = storage.get_conversation("conv").unwrap().unwrap();
            prop_assert_eq!(conversation.last_activity, newest);
        }
    }

    /// Property: across sends, confirmations, incoming messages and list
    /// refreshes the pointer never moves back and always names a stored row.
    #[test]
    fn prop_pointer_names_stored_message(ops in conversation_ops_strategy()) {
        let storage = test_storage();
        let mut queued: Vec<Message> = Vec::new();
        let mut last_activity = i64::MIN;

        for (i, (kind, ts)) in ops.into_iter().enumerate() {
            match kind {
                0 => {
                    storage.save_message(&incoming(&format!("m{}", i), "conv", ts)).unwrap();
                }
                1 => {
                    let pending = Message {
                        timestamp: ts,
                        ..Message::optimistic("conv", ME, "hi", MessageType::Text)
                    };
                    queue(&storage, &pending);
                    queued.push(pending);
                }
                2 => {
                    if let Some(pending) = queued.pop() {
                        let server = Message {
                            timestamp: ts,
                            ..confirmation(&pending, &format!("srv{}", i))
                        };
                        storage.complete_send(&pending.id, &server).unwrap();
                    }
                }
                _ => {
                    let latest = incoming(&format!("s{}", i), "conv", ts);
                    storage.save_message(&latest).unwrap();
                    storage
                        .save_conversation(&Conversation {
                            id: "conv".into(),
                            last_message_id: Some(latest.id.clone()),
                            last_message_preview: Some(latest.preview()),
                            last_activity: ts,
                            unread_count: 0,
                        })
                        .unwrap();
                }
            }

            if let Some(conversation) = storage.get_conversation("conv").unwrap() {
                prop_assert!(conversation.last_activity >= last_activity);
                last_activity = conversation.last_activity;
                if let Some(pointer) = conversation.last_message_id {
                    prop_assert!(storage.get_message(&pointer).unwrap().is_some());
                }
            }
        }
    }
}
