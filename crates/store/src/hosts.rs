// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use agent_commander_types::host::{Host, HostCapabilities};
use agent_commander_types::ids::HostId;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::{not_found_on_empty, StoreResult};

#[derive(sqlx::FromRow)]
struct HostRow {
    id: String,
    name: String,
    network_name: Option<String>,
    network_ip: Option<String>,
    capabilities: String,
    agent_version: Option<String>,
    last_seen: DateTime<Utc>,
    last_acked_seq: i64,
}

impl TryFrom<HostRow> for Host {
    type Error = crate::error::StoreError;

    fn try_from(row: HostRow) -> Result<Self, Self::Error> {
        let capabilities: HostCapabilities = serde_json::from_str(&row.capabilities)
            .map_err(|e| crate::error::StoreError::CorruptRow(e.to_string()))?;
        Ok(Host {
            id: row.id,
            name: row.name,
            network_name: row.network_name,
            network_ip: row.network_ip,
            capabilities,
            agent_version: row.agent_version,
            last_seen: row.last_seen,
            last_acked_seq: row.last_acked_seq as u64,
        })
    }
}

#[derive(Clone)]
pub struct HostStore {
    pool: SqlitePool,
}

impl HostStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Upsert a host from `agent.hello` — creates the record on first
    /// contact, otherwise refreshes every field but the primary key.
    pub async fn upsert(
        &self,
        id: &HostId,
        name: &str,
        network_name: Option<&str>,
        network_ip: Option<&str>,
        capabilities: &HostCapabilities,
        agent_version: Option<&str>,
        last_seen: DateTime<Utc>,
    ) -> StoreResult<()> {
        let capabilities_json = serde_json::to_string(capabilities).unwrap_or_else(|_| "{}".to_owned());
        sqlx::query(
            r#"
            INSERT INTO hosts (id, name, network_name, network_ip, capabilities, agent_version, last_seen, last_acked_seq)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0)
            ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                network_name = excluded.network_name,
                network_ip = excluded.network_ip,
                capabilities = excluded.capabilities,
                agent_version = excluded.agent_version,
                last_seen = excluded.last_seen
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(network_name)
        .bind(network_ip)
        .bind(capabilities_json)
        .bind(agent_version)
        .bind(last_seen)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn record_ack(&self, id: &str, ack_seq: u64) -> StoreResult<()> {
        sqlx::query("UPDATE hosts SET last_acked_seq = ?2 WHERE id = ?1")
            .bind(id)
            .bind(ack_seq as i64)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn get(&self, id: &str) -> StoreResult<Host> {
        let row: HostRow =
            sqlx::query_as("SELECT * FROM hosts WHERE id = ?1").bind(id).fetch_one(&self.pool).await.map_err(not_found_on_empty)?;
        row.try_into()
    }

    pub async fn list(&self) -> StoreResult<Vec<Host>> {
        let rows: Vec<HostRow> = sqlx::query_as("SELECT * FROM hosts ORDER BY id").fetch_all(&self.pool).await?;
        rows.into_iter().map(Host::try_from).collect()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "hosts_tests.rs"]
mod tests;
