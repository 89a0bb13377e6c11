// SPDX-FileCopyrightText: 2026 Amora Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for the local message cache: pagination, optimistic replacement
//! and the conversation pointer.

mod common;

use amora_core::message::{Conversation, Message, MessageStatus, MessageType};
use amora_core::storage::{MessageCursor, StorageError};

use common::{confirmation, incoming, queue_text, test_storage, ME};

fn ids(page: &[Message]) -> Vec<&str> {
    page.iter().map(|m| m.id.as_str()).collect()
}

// === Pagination Tests ===

#[test]
fn test_first_page_is_newest_first() {
    let storage = test_storage();
    for (i, ts) in [100, 300, 200].iter().enumerate() {
        storage
            .save_message(&incoming(&format!("m{}", i), "conv", *ts))
            .unwrap();
    }

    let page = storage.get_messages("conv", None, 10).unwrap();
    assert_eq!(ids(&page), vec!["m1", "m2", "m0"]);
}

#[test]
fn test_pages_walk_back_without_overlap() {
    let storage = test_storage();
    for i in 0..7 {
        storage
            .save_message(&incoming(&format!("m{}", i), "conv", 1000 + i * 10))
            .unwrap();
    }

    let first = storage.get_messages("conv", None, 3).unwrap();
    assert_eq!(ids(&first), vec!["m6", "m5", "m4"]);

    let second = storage
        .get_messages("conv", Some(&first[2].id), 3)
        .unwrap();
    assert_eq!(ids(&second), vec!["m3", "m2", "m1"]);

    let third = storage
        .get_messages("conv", Some(&second[2].id), 3)
        .unwrap();
    assert_eq!(ids(&third), vec!["m0"]);

    let end = storage.get_messages("conv", Some("m0"), 3).unwrap();
    assert!(end.is_empty());
}

#[test]
fn test_page_excludes_other_conversations() {
    let storage = test_storage();
    storage.save_message(&incoming("a", "conv-a", 10)).unwrap();
    storage.save_message(&incoming("b", "conv-b", 20)).unwrap();

    let page = storage.get_messages("conv-a", None, 10).unwrap();
    assert_eq!(ids(&page), vec!["a"]);
}

#[test]
fn test_cursor_from_other_conversation_is_not_found() {
    let storage = test_storage();
    storage.save_message(&incoming("a", "conv-a", 10)).unwrap();

    let result = storage.get_messages("conv-b", Some("a"), 10);
    assert!(matches!(result, Err(StorageError::NotFound(_))));
}

#[test]
fn test_timestamp_cursor_is_strict() {
    let storage = test_storage();
    storage.save_message(&incoming("a", "conv", 100)).unwrap();
    storage.save_message(&incoming("b", "conv", 200)).unwrap();

    let page = storage.get_messages_before("conv", 200, 10).unwrap();
    assert_eq!(ids(&page), vec!["a"]);

    let page = storage
        .get_messages_page("conv", &MessageCursor::BeforeTimestamp(201), 10)
        .unwrap();
    assert_eq!(ids(&page), vec!["b", "a"]);
}

#[test]
fn test_equal_timestamps_ordered_by_insertion() {
    let storage = test_storage();
    storage.save_message(&incoming("first", "conv", 50)).unwrap();
    storage.save_message(&incoming("second", "conv", 50)).unwrap();

    let page = storage.get_messages("conv", None, 10).unwrap();
    assert_eq!(ids(&page), vec!["second", "first"]);
}

// === Optimistic Replacement Tests ===

#[test]
fn test_replace_optimistic_swaps_rows() {
    let storage = test_storage();
    let pending = queue_text(&storage, "conv", "hello");

    let confirmed = storage
        .replace_optimistic(&pending.id, &confirmation(&pending, "srv-1"))
        .unwrap();

    assert_eq!(confirmed.id, "srv-1");
    assert_eq!(confirmed.temp_id.as_deref(), Some(pending.id.as_str()));
    assert!(storage.get_message(&pending.id).unwrap().is_none());
    assert_eq!(storage.count_messages("conv").unwrap(), 1);

    let by_temp = storage.get_message_by_temp_id(&pending.id).unwrap().unwrap();
    assert_eq!(by_temp.id, "srv-1");
    assert_eq!(by_temp.status, MessageStatus::Sent);
}

#[test]
fn test_replace_twice_keeps_one_message() {
    let storage = test_storage();
    let pending = queue_text(&storage, "conv", "hello");
    let server = confirmation(&pending, "srv-1");

    storage.replace_optimistic(&pending.id, &server).unwrap();
    storage.replace_optimistic(&pending.id, &server).unwrap();

    assert_eq!(storage.count_messages("conv").unwrap(), 1);
}

#[test]
fn test_late_optimistic_write_after_confirmation_is_dropped() {
    let storage = test_storage();
    let pending = queue_text(&storage, "conv", "hello");
    storage
        .replace_optimistic(&pending.id, &confirmation(&pending, "srv-1"))
        .unwrap();

    let stored = storage.save_message(&pending).unwrap();

    assert!(!stored);
    assert_eq!(storage.count_messages("conv").unwrap(), 1);
    assert_eq!(
        storage.get_message_by_temp_id(&pending.id).unwrap().unwrap().id,
        "srv-1"
    );
}

#[test]
fn test_server_copy_with_temp_id_replaces_pending_on_save() {
    let storage = test_storage();
    let pending = queue_text(&storage, "conv", "hello");

    storage.save_message(&confirmation(&pending, "srv-9")).unwrap();

    assert_eq!(storage.count_messages("conv").unwrap(), 1);
    assert!(storage.get_message(&pending.id).unwrap().is_none());
}

#[test]
fn test_replace_without_pending_row_stores_server_copy() {
    let storage = test_storage();
    let server = Message {
        temp_id: None,
        ..incoming("srv-5", "conv", 10)
    };

    let confirmed = storage.replace_optimistic("tmp_gone", &server).unwrap();

    assert_eq!(confirmed.temp_id.as_deref(), Some("tmp_gone"));
    assert_eq!(storage.count_messages("conv").unwrap(), 1);
}

// === Conversation Pointer Tests ===

#[test]
fn test_conversation_created_on_first_message() {
    let storage = test_storage();
    storage.save_message(&incoming("m1", "conv", 10)).unwrap();

    let conversation = storage.get_conversation("conv").unwrap().unwrap();
    assert_eq!(conversation.last_message_id.as_deref(), Some("m1"));
    assert_eq!(conversation.last_activity, 10);
}

#[test]
fn test_older_message_does_not_move_pointer_back() {
    let storage = test_storage();
    storage.save_message(&incoming("new", "conv", 500)).unwrap();
    storage.save_message(&incoming("old", "conv", 100)).unwrap();

    let conversation = storage.get_conversation("conv").unwrap().unwrap();
    assert_eq!(conversation.last_message_id.as_deref(), Some("new"));
    assert_eq!(conversation.last_activity, 500);
}

#[test]
fn test_pointer_follows_confirmation() {
    let storage = test_storage();
    let pending = queue_text(&storage, "conv", "hello");

    let conversation = storage.get_conversation("conv").unwrap().unwrap();
    assert_eq!(conversation.last_message_id.as_deref(), Some(pending.id.as_str()));

    storage
        .replace_optimistic(&pending.id, &confirmation(&pending, "srv-1"))
        .unwrap();

    let conversation = storage.get_conversation("conv").unwrap().unwrap();
    assert_eq!(conversation.last_message_id.as_deref(), Some("srv-1"));
}

#[test]
fn test_older_server_copy_repoints_conversation() {
    let storage = test_storage();
    let pending = queue_text(&storage, "conv", "hello");
    let server = Message {
        timestamp: pending.timestamp - 5,
        ..confirmation(&pending, "srv-1")
    };

    storage.save_message(&server).unwrap();

    let conversation = storage.get_conversation("conv").unwrap().unwrap();
    assert_eq!(conversation.last_message_id.as_deref(), Some("srv-1"));
    assert!(storage.get_message("srv-1").unwrap().is_some());
}

#[test]
fn test_older_summary_keeps_newer_pointer() {
    let storage = test_storage();
    storage.save_message(&incoming("fresh", "conv", 900)).unwrap();

    storage
        .save_conversation(&Conversation {
            id: "conv".into(),
            last_message_id: Some("stale".into()),
            last_message_preview: Some("stale".into()),
            last_activity: 100,
            unread_count: 4,
        })
        .unwrap();

    let conversation = storage.get_conversation("conv").unwrap().unwrap();
    assert_eq!(conversation.last_message_id.as_deref(), Some("fresh"));
    assert_eq!(conversation.last_activity, 900);
    assert_eq!(conversation.unread_count, 4);
}

#[test]
fn test_newer_summary_moves_pointer() {
    let storage = test_storage();
    storage.save_message(&incoming("old", "conv", 100)).unwrap();
    storage.save_message(&incoming("new", "conv", 900)).unwrap();

    storage
        .save_conversation(&Conversation {
            id: "conv".into(),
            last_message_id: Some("new".into()),
            last_message_preview: Some("message new".into()),
            last_activity: 950,
            unread_count: 0,
        })
        .unwrap();

    let conversation = storage.get_conversation("conv").unwrap().unwrap();
    assert_eq!(conversation.last_message_id.as_deref(), Some("new"));
    assert_eq!(conversation.last_activity, 950);
}

#[test]
fn test_media_preview() {
    let storage = test_storage();
    let photo = Message {
        message_type: MessageType::Image,
        media_url: Some("https://cdn/p.jpg".into()),
        ..incoming("p", "conv", 10)
    };
    storage.save_message(&photo).unwrap();

    let conversation = storage.get_conversation("conv").unwrap().unwrap();
    assert_eq!(conversation.last_message_preview.as_deref(), Some("[image]"));
}

#[test]
fn test_list_conversations_by_activity() {
    let storage = test_storage();
    storage.save_message(&incoming("a", "quiet", 10)).unwrap();
    storage.save_message(&incoming("b", "busy", 90)).unwrap();

    let list = storage.list_conversations().unwrap();
    let order: Vec<_> = list.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(order, vec!["busy", "quiet"]);
}

// === Status Tests ===

#[test]
fn test_mark_read_skips_own_messages() {
    let storage = test_storage();
    storage.save_message(&incoming("theirs", "conv", 10)).unwrap();
    let mine = Message {
        sender_id: ME.to_string(),
        status: MessageStatus::Sent,
        ..incoming("mine", "conv", 20)
    };
    storage.save_message(&mine).unwrap();
    storage.increment_unread("conv").unwrap();

    let changed = storage.mark_conversation_read("conv", ME).unwrap();

    assert_eq!(changed, 1);
    assert_eq!(
        storage.get_message("theirs").unwrap().unwrap().status,
        MessageStatus::Read
    );
    assert_eq!(
        storage.get_message("mine").unwrap().unwrap().status,
        MessageStatus::Sent
    );
    assert_eq!(storage.get_conversation("conv").unwrap().unwrap().unread_count, 0);
}

#[test]
fn test_update_status_and_delete() {
    let storage = test_storage();
    storage.save_message(&incoming("m", "conv", 10)).unwrap();

    assert!(storage
        .update_message_status("m", MessageStatus::Read)
        .unwrap());
    assert!(!storage
        .update_message_status("missing", MessageStatus::Read)
        .unwrap());

    assert!(storage.delete_message("m").unwrap());
    assert!(!storage.delete_message("m").unwrap());
}

#[test]
fn test_delete_conversation_removes_messages() {
    let storage = test_storage();
    storage.save_message(&incoming("a", "conv", 10)).unwrap();
    storage.save_message(&incoming("b", "conv", 20)).unwrap();

    assert!(storage.delete_conversation("conv").unwrap());
    assert_eq!(storage.count_messages("conv").unwrap(), 0);
    assert!(storage.get_conversation("conv").unwrap().is_none());
}
