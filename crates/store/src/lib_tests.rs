// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn connect_wires_every_repository_against_one_pool() {
    let store = Store::connect("sqlite::memory:").await.unwrap();
    store.hosts.list().await.unwrap();
    store.groups.list_for_host("H1").await.unwrap();
    let filter = SessionListFilter::default();
    store.sessions.list(&filter).await.unwrap();
    store.agent_tokens.resolve("nonexistent").await.unwrap();
}
