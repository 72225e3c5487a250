// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use agent_commander_types::ids::{GroupId, HostId};
use agent_commander_types::session::SessionGroup;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{not_found_on_empty, StoreResult};

#[derive(sqlx::FromRow)]
struct GroupRow {
    id: Uuid,
    host_id: String,
    name: String,
    created_at: chrono::DateTime<Utc>,
}

impl From<GroupRow> for SessionGroup {
    fn from(row: GroupRow) -> Self {
        SessionGroup { id: row.id, host_id: row.host_id, name: row.name, created_at: row.created_at }
    }
}

#[derive(Clone)]
pub struct GroupStore {
    pool: SqlitePool,
}

impl GroupStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Resolve a tmux-session-name-derived group to its id, creating it the
    /// first time a host/name pair is seen (spec §11 — group auto-creation).
    pub async fn resolve_or_create(&self, host_id: &HostId, name: &str) -> StoreResult<GroupId> {
        // `INSERT OR IGNORE` makes the create half idempotent under races;
        // the id only matters on the subsequent read.
        sqlx::query("INSERT OR IGNORE INTO session_groups (id, host_id, name, created_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(Uuid::new_v4())
            .bind(host_id)
            .bind(name)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        let row: GroupRow = sqlx::query_as("SELECT * FROM session_groups WHERE host_id = ?1 AND name = ?2")
            .bind(host_id)
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(not_found_on_empty)?;
        Ok(row.id)
    }

    pub async fn get(&self, id: GroupId) -> StoreResult<SessionGroup> {
        let row: GroupRow =
            sqlx::query_as("SELECT * FROM session_groups WHERE id = ?1").bind(id).fetch_one(&self.pool).await.map_err(not_found_on_empty)?;
        Ok(row.into())
    }

    pub async fn list_for_host(&self, host_id: &str) -> StoreResult<Vec<SessionGroup>> {
        let rows: Vec<GroupRow> =
            sqlx::query_as("SELECT * FROM session_groups WHERE host_id = ?1 ORDER BY name").bind(host_id).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(SessionGroup::from).collect())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "groups_tests.rs"]
mod tests;
