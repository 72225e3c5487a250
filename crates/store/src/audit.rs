// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Audit trail (spec §6.5 names `audit_logs`; this crate owns its shape —
//! every privileged write the dispatcher performs records one row here:
//! approval decisions, dispatched commands, bulk operations).

use agent_commander_types::ids::{HostId, SessionId};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::StoreResult;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuditLogEntry {
    pub id: i64,
    pub ts: DateTime<Utc>,
    pub actor: String,
    pub action: String,
    pub session_id: Option<SessionId>,
    pub host_id: Option<HostId>,
    pub details: Option<String>,
}

#[derive(Clone)]
pub struct AuditLogStore {
    pool: SqlitePool,
}

impl AuditLogStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn record(
        &self,
        ts: DateTime<Utc>,
        actor: &str,
        action: &str,
        session_id: Option<SessionId>,
        host_id: Option<&str>,
        details: Option<&serde_json::Value>,
    ) -> StoreResult<()> {
        let details_json = details.map(|d| serde_json::to_string(d).unwrap_or_else(|_| "null".to_owned()));
        sqlx::query("INSERT INTO audit_logs (ts, actor, action, session_id, host_id, details) VALUES (?1, ?2, ?3, ?4, ?5, ?6)")
            .bind(ts)
            .bind(actor)
            .bind(action)
            .bind(session_id)
            .bind(host_id)
            .bind(details_json)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list_for_session(&self, session_id: SessionId, limit: i64) -> StoreResult<Vec<AuditLogEntry>> {
        let rows = sqlx::query_as("SELECT * FROM audit_logs WHERE session_id = ?1 ORDER BY ts DESC LIMIT ?2")
            .bind(session_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
