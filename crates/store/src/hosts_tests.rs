// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use agent_commander_types::host::HostCapabilities;
use chrono::Utc;

use super::*;
use crate::pool::connect;

#[tokio::test]
async fn upsert_then_get_round_trips_capabilities() {
    let pool = connect("sqlite::memory:").await.unwrap();
    let store = HostStore::new(pool);
    let caps = HostCapabilities { tmux: true, spawn: true, ..Default::default() };
    store.upsert(&"H1".to_owned(), "devbox", None, None, &caps, Some("1.0.0"), Utc::now()).await.unwrap();

    let host = store.get("H1").await.unwrap();
    assert_eq!(host.name, "devbox");
    assert!(host.capabilities.tmux);
    assert!(!host.capabilities.terminal);
}

#[tokio::test]
async fn upsert_is_idempotent_on_reconnect() {
    let pool = connect("sqlite::memory:").await.unwrap();
    let store = HostStore::new(pool);
    let caps = HostCapabilities::default();
    store.upsert(&"H1".to_owned(), "devbox", None, None, &caps, None, Utc::now()).await.unwrap();
    store.upsert(&"H1".to_owned(), "devbox-renamed", None, None, &caps, None, Utc::now()).await.unwrap();

    let hosts = store.list().await.unwrap();
    assert_eq!(hosts.len(), 1);
    assert_eq!(hosts[0].name, "devbox-renamed");
}

#[tokio::test]
async fn record_ack_updates_last_acked_seq() {
    let pool = connect("sqlite::memory:").await.unwrap();
    let store = HostStore::new(pool);
    store.upsert(&"H1".to_owned(), "devbox", None, None, &HostCapabilities::default(), None, Utc::now()).await.unwrap();
    store.record_ack("H1", 42).await.unwrap();
    assert_eq!(store.get("H1").await.unwrap().last_acked_seq, 42);
}

#[tokio::test]
async fn get_missing_host_is_not_found() {
    let pool = connect("sqlite::memory:").await.unwrap();
    let store = HostStore::new(pool);
    assert!(matches!(store.get("missing").await, Err(crate::error::StoreError::NotFound)));
}
