// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::Utc;
use uuid::Uuid;

use super::*;
use crate::pool::connect;

fn report(session_id: SessionId, input: u64, output: u64) -> ProviderUsage {
    ProviderUsage { session_id, provider: Provider::ClaudeCode, ts: Utc::now(), input_tokens: input, output_tokens: output, cache_read_tokens: 0, cache_write_tokens: 0 }
}

#[tokio::test]
async fn totals_accumulate_across_reports() {
    let pool = connect("sqlite::memory:").await.unwrap();
    let store = UsageStore::new(pool);
    let session_id = Uuid::new_v4();
    store.record(&report(session_id, 100, 20)).await.unwrap();
    store.record(&report(session_id, 50, 10)).await.unwrap();

    let totals = store.totals(session_id).await.unwrap();
    assert_eq!(totals.input_tokens, 150);
    assert_eq!(totals.output_tokens, 30);
}

#[tokio::test]
async fn totals_for_unreported_session_is_zero() {
    let pool = connect("sqlite::memory:").await.unwrap();
    let store = UsageStore::new(pool);
    let totals = store.totals(Uuid::new_v4()).await.unwrap();
    assert_eq!(totals.input_tokens, 0);
}

#[tokio::test]
async fn list_for_session_orders_most_recent_first() {
    let pool = connect("sqlite::memory:").await.unwrap();
    let store = UsageStore::new(pool);
    let session_id = Uuid::new_v4();
    store.record(&report(session_id, 1, 1)).await.unwrap();
    store.record(&report(session_id, 2, 2)).await.unwrap();

    let list = store.list_for_session(session_id, 10).await.unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].input_tokens, 2);
}
