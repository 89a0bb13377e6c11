// SPDX-FileCopyrightText: 2026 Amora Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Proptest Strategies
//!
//! Reusable proptest strategies for property-based testing.

use proptest::prelude::*;

use amora_core::message::MessageType;

/// Strategy for generating non-blank message text.
pub fn content_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 !?.]{1,80}".prop_filter("non-blank", |s| !s.trim().is_empty())
}

/// Strategy for generating millisecond timestamps.
pub fn timestamp_strategy() -> impl Strategy<Value = i64> {
    1_600_000_000_000i64..1_900_000_000_000i64
}

/// Strategy for generating conversation histories (timestamps may repeat).
pub fn history_strategy(max: usize) -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(0i64..50i64, 1..max)
}

/// Strategy for generating cache operations as (kind, timestamp) pairs.
///
/// Kinds: 0 incoming, 1 optimistic send, 2 confirm latest send, 3 list refresh.
pub fn conversation_ops_strategy() -> impl Strategy<Value = Vec<(u8, i64)>> {
    prop::collection::vec((0u8..4u8, 0i64..50i64), 1..24)
}

/// Strategy for generating page sizes.
pub fn page_size_strategy() -> impl Strategy<Value = usize> {
    1usize..12usize
}

/// Strategy for generating retry ceilings.
pub fn max_retries_strategy() -> impl Strategy<Value = u32> {
    1u32..6u32
}

/// Strategy for generating random MessageType values.
pub fn message_type_strategy() -> impl Strategy<Value = MessageType> {
    prop_oneof![
        Just(MessageType::Text),
        Just(MessageType::Image),
        Just(MessageType::Audio),
        Just(MessageType::Video),
    ]
}
