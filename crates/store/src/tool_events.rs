// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use agent_commander_types::ids::SessionId;
use agent_commander_types::session::Provider;
use agent_commander_types::tool_event::ToolEvent;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{not_found_on_empty, StoreError, StoreResult};

#[derive(sqlx::FromRow)]
struct ToolEventRow {
    id: Uuid,
    session_id: SessionId,
    provider: String,
    tool_name: String,
    tool_input: Option<String>,
    tool_output: Option<String>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    success: Option<bool>,
    duration_ms: Option<i64>,
}

impl TryFrom<ToolEventRow> for ToolEvent {
    type Error = StoreError;

    fn try_from(row: ToolEventRow) -> Result<Self, Self::Error> {
        let provider: Provider = serde_json::from_value(serde_json::Value::String(row.provider))
            .map_err(|e| StoreError::CorruptRow(format!("provider: {e}")))?;
        let tool_input = row.tool_input.map(|v| serde_json::from_str(&v)).transpose().map_err(|e: serde_json::Error| {
            StoreError::CorruptRow(format!("tool_input: {e}"))
        })?;
        let tool_output = row.tool_output.map(|v| serde_json::from_str(&v)).transpose().map_err(|e: serde_json::Error| {
            StoreError::CorruptRow(format!("tool_output: {e}"))
        })?;

        Ok(ToolEvent {
            id: row.id,
            session_id: row.session_id,
            provider,
            tool_name: row.tool_name,
            tool_input,
            tool_output,
            started_at: row.started_at,
            completed_at: row.completed_at,
            success: row.success,
            duration_ms: row.duration_ms.map(|ms| ms as u64),
        })
    }
}

#[derive(Clone)]
pub struct ToolEventStore {
    pool: SqlitePool,
}

impl ToolEventStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn started(
        &self,
        id: Uuid,
        session_id: SessionId,
        provider: Provider,
        tool_name: &str,
        tool_input: Option<&serde_json::Value>,
        started_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let provider_value = serde_json::to_value(provider).unwrap_or_default();
        let input_json = tool_input.map(|v| serde_json::to_string(v).unwrap_or_else(|_| "null".to_owned()));
        sqlx::query(
            "INSERT INTO tool_events (id, session_id, provider, tool_name, tool_input, started_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(id)
        .bind(session_id)
        .bind(provider_value.as_str())
        .bind(tool_name)
        .bind(input_json)
        .bind(started_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn completed(
        &self,
        id: Uuid,
        tool_output: Option<&serde_json::Value>,
        success: bool,
        completed_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let output_json = tool_output.map(|v| serde_json::to_string(v).unwrap_or_else(|_| "null".to_owned()));
        let row: (DateTime<Utc>,) =
            sqlx::query_as("SELECT started_at FROM tool_events WHERE id = ?1").bind(id).fetch_one(&self.pool).await.map_err(not_found_on_empty)?;
        let duration_ms = (completed_at - row.0).num_milliseconds().max(0);

        sqlx::query(
            "UPDATE tool_events SET tool_output = ?2, success = ?3, completed_at = ?4, duration_ms = ?5 WHERE id = ?1",
        )
        .bind(id)
        .bind(output_json)
        .bind(success)
        .bind(completed_at)
        .bind(duration_ms)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> StoreResult<ToolEvent> {
        let row: ToolEventRow =
            sqlx::query_as("SELECT * FROM tool_events WHERE id = ?1").bind(id).fetch_one(&self.pool).await.map_err(not_found_on_empty)?;
        row.try_into()
    }

    pub async fn list_for_session(&self, session_id: SessionId, limit: i64) -> StoreResult<Vec<ToolEvent>> {
        let rows: Vec<ToolEventRow> = sqlx::query_as("SELECT * FROM tool_events WHERE session_id = ?1 ORDER BY started_at DESC LIMIT ?2")
            .bind(session_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(ToolEvent::try_from).collect()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "tool_events_tests.rs"]
mod tests;
