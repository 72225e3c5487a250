// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::Utc;
use uuid::Uuid;

use super::*;
use crate::pool::connect;

fn append(event_id: Option<Uuid>, event_type: &str) -> EventAppend {
    EventAppend { event_id, ts: Utc::now(), event_type: event_type.to_owned(), payload: serde_json::json!({}) }
}

#[tokio::test]
async fn append_batch_assigns_increasing_seq() {
    let pool = connect("sqlite::memory:").await.unwrap();
    let store = EventStore::new(pool);
    let session_id = Uuid::new_v4();

    let appended = store.append_batch(session_id, vec![append(None, "a"), append(None, "b")]).await.unwrap();
    assert_eq!(appended[0].seq, 1);
    assert_eq!(appended[1].seq, 2);
}

#[tokio::test]
async fn redelivering_the_same_event_id_is_a_no_op() {
    let pool = connect("sqlite::memory:").await.unwrap();
    let store = EventStore::new(pool);
    let session_id = Uuid::new_v4();
    let event_id = Uuid::new_v4();

    store.append_batch(session_id, vec![append(Some(event_id), "a")]).await.unwrap();
    let second = store.append_batch(session_id, vec![append(Some(event_id), "a")]).await.unwrap();
    assert!(second.is_empty());

    let all = store.list_for_session(session_id, 0, 100).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn list_for_session_respects_since_seq_cursor() {
    let pool = connect("sqlite::memory:").await.unwrap();
    let store = EventStore::new(pool);
    let session_id = Uuid::new_v4();
    store.append_batch(session_id, vec![append(None, "a"), append(None, "b"), append(None, "c")]).await.unwrap();

    let page = store.list_for_session(session_id, 1, 100).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].seq, 2);
}

#[tokio::test]
async fn separate_sessions_have_independent_sequences() {
    let pool = connect("sqlite::memory:").await.unwrap();
    let store = EventStore::new(pool);
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    store.append_batch(a, vec![append(None, "a")]).await.unwrap();
    let appended_b = store.append_batch(b, vec![append(None, "b")]).await.unwrap();
    assert_eq!(appended_b[0].seq, 1);
}
