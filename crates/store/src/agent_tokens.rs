// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bearer tokens agents present at `/v1/agent/connect` (spec §6.1, §6.5's
//! `agent_tokens` table). Issuance is a thin wrapper the REST layer calls
//! from `POST /hosts/:id/token`; resolution is what the agent handshake
//! calls on every connect attempt.

use agent_commander_types::ids::HostId;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::StoreResult;

#[derive(Clone)]
pub struct AgentTokenStore {
    pool: SqlitePool,
}

impl AgentTokenStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Mint a new opaque token for `host_id`. Existing tokens for the same
    /// host are left live — rotation is additive, revocation is explicit.
    pub async fn issue(&self, host_id: &HostId, now: DateTime<Utc>) -> StoreResult<String> {
        let token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        sqlx::query("INSERT INTO agent_tokens (token, host_id, created_at) VALUES (?1, ?2, ?3)")
            .bind(&token)
            .bind(host_id)
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(token)
    }

    /// Resolve a bearer token to the host it was issued for. `None` for an
    /// unknown or revoked token.
    pub async fn resolve(&self, token: &str) -> StoreResult<Option<HostId>> {
        let row: Option<(HostId,)> =
            sqlx::query_as("SELECT host_id FROM agent_tokens WHERE token = ?1 AND revoked_at IS NULL")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(host_id,)| host_id))
    }

    pub async fn revoke(&self, token: &str, now: DateTime<Utc>) -> StoreResult<()> {
        sqlx::query("UPDATE agent_tokens SET revoked_at = ?2 WHERE token = ?1").bind(token).bind(now).execute(&self.pool).await?;
        Ok(())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "agent_tokens_tests.rs"]
mod tests;
