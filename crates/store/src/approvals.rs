// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use agent_commander_types::approval::{Approval, ApprovalType, Decision};
use agent_commander_types::ids::{ApprovalId, SessionId};
use agent_commander_types::session::Provider;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::{not_found_on_empty, StoreError, StoreResult};

#[derive(sqlx::FromRow)]
struct ApprovalRow {
    id: ApprovalId,
    session_id: SessionId,
    provider: String,
    ts_requested: DateTime<Utc>,
    ts_decided: Option<DateTime<Utc>>,
    decision: Option<String>,
    timed_out_at: Option<DateTime<Utc>>,
    requested_payload: String,
    decided_payload: Option<String>,
    approval_type: String,
}

impl TryFrom<ApprovalRow> for Approval {
    type Error = StoreError;

    fn try_from(row: ApprovalRow) -> Result<Self, Self::Error> {
        let provider: Provider = serde_json::from_value(serde_json::Value::String(row.provider))
            .map_err(|e| StoreError::CorruptRow(format!("provider: {e}")))?;
        let approval_type: ApprovalType = serde_json::from_value(serde_json::Value::String(row.approval_type))
            .map_err(|e| StoreError::CorruptRow(format!("approval_type: {e}")))?;
        let decision = row
            .decision
            .map(|d| serde_json::from_value(serde_json::Value::String(d)))
            .transpose()
            .map_err(|e: serde_json::Error| StoreError::CorruptRow(format!("decision: {e}")))?;
        let requested_payload =
            serde_json::from_str(&row.requested_payload).map_err(|e| StoreError::CorruptRow(format!("requested_payload: {e}")))?;
        let decided_payload = row
            .decided_payload
            .map(|p| serde_json::from_str(&p))
            .transpose()
            .map_err(|e: serde_json::Error| StoreError::CorruptRow(format!("decided_payload: {e}")))?;

        Ok(Approval {
            id: row.id,
            session_id: row.session_id,
            provider,
            ts_requested: row.ts_requested,
            ts_decided: row.ts_decided,
            decision,
            timed_out_at: row.timed_out_at,
            requested_payload,
            decided_payload,
            approval_type,
        })
    }
}

#[derive(Clone)]
pub struct ApprovalStore {
    pool: SqlitePool,
}

impl ApprovalStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, approval: &Approval) -> StoreResult<()> {
        let provider = serde_json::to_value(approval.provider).unwrap_or_default();
        let approval_type = serde_json::to_value(approval.approval_type).unwrap_or_default();
        let requested_payload = serde_json::to_string(&approval.requested_payload).unwrap_or_else(|_| "null".to_owned());

        sqlx::query(
            r#"
            INSERT INTO approvals (id, session_id, provider, ts_requested, requested_payload, approval_type)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(approval.id)
        .bind(approval.session_id)
        .bind(provider.as_str())
        .bind(approval.ts_requested)
        .bind(requested_payload)
        .bind(approval_type.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get(&self, id: ApprovalId) -> StoreResult<Approval> {
        let row: ApprovalRow =
            sqlx::query_as("SELECT * FROM approvals WHERE id = ?1").bind(id).fetch_one(&self.pool).await.map_err(not_found_on_empty)?;
        row.try_into()
    }

    /// Record a decision. Fails the idempotency check at the caller
    /// (dispatcher) if `get` shows `ts_decided.is_some()` already — this
    /// method always (over)writes, by design, so replays from the same
    /// decision are cheap no-ops once the caller has checked.
    pub async fn decide(
        &self,
        id: ApprovalId,
        decision: Decision,
        decided_payload: Option<serde_json::Value>,
        ts_decided: DateTime<Utc>,
    ) -> StoreResult<()> {
        let decision_str = serde_json::to_value(decision).unwrap_or_default();
        let decided_payload_json = decided_payload.map(|p| serde_json::to_string(&p).unwrap_or_else(|_| "null".to_owned()));

        sqlx::query(
            "UPDATE approvals SET decision = ?2, decided_payload = ?3, ts_decided = ?4 WHERE id = ?1",
        )
        .bind(id)
        .bind(decision_str.as_str())
        .bind(decided_payload_json)
        .bind(ts_decided)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn mark_timed_out(&self, id: ApprovalId, timed_out_at: DateTime<Utc>) -> StoreResult<()> {
        sqlx::query("UPDATE approvals SET timed_out_at = ?2 WHERE id = ?1").bind(id).bind(timed_out_at).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn list_pending_for_session(&self, session_id: SessionId) -> StoreResult<Vec<Approval>> {
        let rows: Vec<ApprovalRow> = sqlx::query_as(
            "SELECT * FROM approvals WHERE session_id = ?1 AND decision IS NULL ORDER BY ts_requested",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Approval::try_from).collect()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "approvals_tests.rs"]
mod tests;
