// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use uuid::Uuid;

use super::*;
use crate::pool::connect;

#[tokio::test]
async fn upsert_replaces_the_prior_snapshot() {
    let pool = connect("sqlite::memory:").await.unwrap();
    let store = SnapshotStore::new(pool);
    let session_id = Uuid::new_v4();

    store.upsert(&Snapshot::new(session_id, "first".to_owned(), Utc::now())).await.unwrap();
    store.upsert(&Snapshot::new(session_id, "second".to_owned(), Utc::now())).await.unwrap();

    let snapshot = store.get(session_id).await.unwrap();
    assert_eq!(snapshot.capture_text, "second");
}

#[tokio::test]
async fn get_latest_bulk_returns_only_requested_sessions() {
    let pool = connect("sqlite::memory:").await.unwrap();
    let store = SnapshotStore::new(pool);
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let c = Uuid::new_v4();
    store.upsert(&Snapshot::new(a, "a".to_owned(), Utc::now())).await.unwrap();
    store.upsert(&Snapshot::new(b, "b".to_owned(), Utc::now())).await.unwrap();
    store.upsert(&Snapshot::new(c, "c".to_owned(), Utc::now())).await.unwrap();

    let bulk = store.get_latest_bulk(&[a, b]).await.unwrap();
    assert_eq!(bulk.len(), 2);
    assert_eq!(bulk[&a].capture_text, "a");
}

#[tokio::test]
async fn get_latest_bulk_with_no_ids_returns_empty() {
    let pool = connect("sqlite::memory:").await.unwrap();
    let store = SnapshotStore::new(pool);
    assert!(store.get_latest_bulk(&[]).await.unwrap().is_empty());
}
