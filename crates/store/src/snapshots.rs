// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;

use agent_commander_types::ids::SessionId;
use agent_commander_types::snapshot::Snapshot;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::{not_found_on_empty, StoreResult};

#[derive(sqlx::FromRow)]
struct SnapshotRow {
    session_id: SessionId,
    created_at: DateTime<Utc>,
    capture_hash: String,
    capture_text: String,
}

impl From<SnapshotRow> for Snapshot {
    fn from(row: SnapshotRow) -> Self {
        Snapshot { session_id: row.session_id, created_at: row.created_at, capture_hash: row.capture_hash, capture_text: row.capture_text }
    }
}

/// Holds only the single latest snapshot per session — older captures are
/// not retained (spec §4.3's `sessions.snapshot` is a full replace, not an
/// append).
#[derive(Clone)]
pub struct SnapshotStore {
    pool: SqlitePool,
}

impl SnapshotStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, snapshot: &Snapshot) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO snapshots (session_id, created_at, capture_hash, capture_text)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (session_id) DO UPDATE SET
                created_at = excluded.created_at,
                capture_hash = excluded.capture_hash,
                capture_text = excluded.capture_text
            "#,
        )
        .bind(snapshot.session_id)
        .bind(snapshot.created_at)
        .bind(&snapshot.capture_hash)
        .bind(&snapshot.capture_text)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get(&self, session_id: SessionId) -> StoreResult<Snapshot> {
        let row: SnapshotRow = sqlx::query_as("SELECT * FROM snapshots WHERE session_id = ?1")
            .bind(session_id)
            .fetch_one(&self.pool)
            .await
            .map_err(not_found_on_empty)?;
        Ok(row.into())
    }

    /// Bulk-load the latest snapshot for every requested session in one
    /// round trip — used by the orchestrator when ranking a whole host's
    /// worth of sessions (spec §4.7).
    pub async fn get_latest_bulk(&self, session_ids: &[SessionId]) -> StoreResult<HashMap<SessionId, Snapshot>> {
        if session_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let placeholders = vec!["?"; session_ids.len()].join(", ");
        let sql = format!("SELECT * FROM snapshots WHERE session_id IN ({placeholders})");
        let mut query = sqlx::query_as::<_, SnapshotRow>(&sql);
        for id in session_ids {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|row| (row.session_id, Snapshot::from(row))).collect())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "snapshots_tests.rs"]
mod tests;
