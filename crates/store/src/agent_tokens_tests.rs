// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::Utc;

use super::*;
use crate::hosts::HostStore;
use crate::pool::connect;

async fn seeded_store() -> (SqlitePool, AgentTokenStore) {
    let pool = connect("sqlite::memory:").await.unwrap();
    HostStore::new(pool.clone()).upsert(&"H1".to_owned(), "devbox", None, None, &Default::default(), None, Utc::now()).await.unwrap();
    (pool.clone(), AgentTokenStore::new(pool))
}

#[tokio::test]
async fn issued_token_resolves_to_its_host() {
    let (_pool, store) = seeded_store().await;
    let token = store.issue(&"H1".to_owned(), Utc::now()).await.unwrap();

    assert_eq!(store.resolve(&token).await.unwrap(), Some("H1".to_owned()));
}

#[tokio::test]
async fn unknown_token_resolves_to_none() {
    let (_pool, store) = seeded_store().await;
    assert_eq!(store.resolve("nonexistent").await.unwrap(), None);
}

#[tokio::test]
async fn revoked_token_no_longer_resolves() {
    let (_pool, store) = seeded_store().await;
    let token = store.issue(&"H1".to_owned(), Utc::now()).await.unwrap();
    store.revoke(&token, Utc::now()).await.unwrap();

    assert_eq!(store.resolve(&token).await.unwrap(), None);
}

#[tokio::test]
async fn rotating_a_host_keeps_the_prior_token_live() {
    let (_pool, store) = seeded_store().await;
    let first = store.issue(&"H1".to_owned(), Utc::now()).await.unwrap();
    let second = store.issue(&"H1".to_owned(), Utc::now()).await.unwrap();

    assert_eq!(store.resolve(&first).await.unwrap(), Some("H1".to_owned()));
    assert_eq!(store.resolve(&second).await.unwrap(), Some("H1".to_owned()));
}
