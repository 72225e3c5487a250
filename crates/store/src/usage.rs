// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use agent_commander_types::ids::SessionId;
use agent_commander_types::session::Provider;
use agent_commander_types::usage::{ProviderUsage, SessionUsageTotals};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::StoreResult;

#[derive(Clone)]
pub struct UsageStore {
    pool: SqlitePool,
}

impl UsageStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn record(&self, usage: &ProviderUsage) -> StoreResult<()> {
        let provider = serde_json::to_value(usage.provider).unwrap_or_default();
        sqlx::query(
            r#"
            INSERT INTO provider_usage (session_id, provider, ts, input_tokens, output_tokens, cache_read_tokens, cache_write_tokens)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(usage.session_id)
        .bind(provider.as_str())
        .bind(usage.ts)
        .bind(usage.input_tokens as i64)
        .bind(usage.output_tokens as i64)
        .bind(usage.cache_read_tokens as i64)
        .bind(usage.cache_write_tokens as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Sum every usage report for a session into its running totals (spec
    /// §4.10's `session_usage.updated` frame).
    pub async fn totals(&self, session_id: SessionId) -> StoreResult<SessionUsageTotals> {
        let row: (Option<i64>, Option<i64>, Option<i64>, Option<i64>) = sqlx::query_as(
            r#"
            SELECT SUM(input_tokens), SUM(output_tokens), SUM(cache_read_tokens), SUM(cache_write_tokens)
            FROM provider_usage WHERE session_id = ?1
            "#,
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(SessionUsageTotals {
            input_tokens: row.0.unwrap_or(0) as u64,
            output_tokens: row.1.unwrap_or(0) as u64,
            cache_read_tokens: row.2.unwrap_or(0) as u64,
            cache_write_tokens: row.3.unwrap_or(0) as u64,
        })
    }

    pub async fn list_for_session(&self, session_id: SessionId, limit: i64) -> StoreResult<Vec<ProviderUsageRow>> {
        let rows: Vec<ProviderUsageRawRow> = sqlx::query_as(
            "SELECT provider, ts, input_tokens, output_tokens, cache_read_tokens, cache_write_tokens FROM provider_usage WHERE session_id = ?1 ORDER BY ts DESC LIMIT ?2",
        )
        .bind(session_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|row| {
                let provider: Provider = serde_json::from_value(serde_json::Value::String(row.provider))
                    .map_err(|e| crate::error::StoreError::CorruptRow(format!("provider: {e}")))?;
                Ok(ProviderUsageRow {
                    provider,
                    ts: row.ts,
                    input_tokens: row.input_tokens as u64,
                    output_tokens: row.output_tokens as u64,
                    cache_read_tokens: row.cache_read_tokens as u64,
                    cache_write_tokens: row.cache_write_tokens as u64,
                })
            })
            .collect()
    }
}

#[derive(sqlx::FromRow)]
struct ProviderUsageRawRow {
    provider: String,
    ts: DateTime<Utc>,
    input_tokens: i64,
    output_tokens: i64,
    cache_read_tokens: i64,
    cache_write_tokens: i64,
}

/// A single historical usage report, decoded for display (distinct from
/// `ProviderUsage` which also carries `session_id`, already known by caller).
#[derive(Debug, Clone)]
pub struct ProviderUsageRow {
    pub provider: Provider,
    pub ts: DateTime<Utc>,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_tokens: u64,
    pub cache_write_tokens: u64,
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "usage_tests.rs"]
mod tests;
