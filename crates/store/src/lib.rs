// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed persistence for the control plane (spec §4.8). One
//! connection pool, one repository struct per entity family — mirroring how
//! a single storage backend in this codebase is split into narrow,
//! single-purpose clients rather than one catch-all data-access object.

pub mod agent_tokens;
pub mod approvals;
pub mod audit;
pub mod error;
pub mod events;
pub mod groups;
pub mod hosts;
pub mod pool;
pub mod sessions;
pub mod snapshots;
pub mod tool_events;
pub mod usage;

use std::sync::Arc;

use sqlx::SqlitePool;

pub use agent_tokens::AgentTokenStore;
pub use approvals::ApprovalStore;
pub use audit::AuditLogStore;
pub use error::{StoreError, StoreResult};
pub use events::EventStore;
pub use groups::GroupStore;
pub use hosts::HostStore;
pub use sessions::{SessionListFilter, SessionStore};
pub use snapshots::SnapshotStore;
pub use tool_events::ToolEventStore;
pub use usage::UsageStore;

/// Entry point: open the database, run migrations, and hand back one
/// repository per entity family sharing the same connection pool.
pub struct Store {
    pub hosts: HostStore,
    pub groups: GroupStore,
    pub sessions: SessionStore,
    pub snapshots: SnapshotStore,
    pub events: EventStore,
    pub approvals: ApprovalStore,
    pub tool_events: ToolEventStore,
    pub usage: UsageStore,
    pub audit_logs: AuditLogStore,
    pub agent_tokens: AgentTokenStore,
}

impl Store {
    pub async fn connect(database_url: &str) -> StoreResult<Arc<Self>> {
        let pool = pool::connect(database_url).await?;
        Ok(Arc::new(Self::from_pool(pool)))
    }

    fn from_pool(pool: SqlitePool) -> Self {
        Self {
            hosts: HostStore::new(pool.clone()),
            groups: GroupStore::new(pool.clone()),
            sessions: SessionStore::new(pool.clone()),
            snapshots: SnapshotStore::new(pool.clone()),
            events: EventStore::new(pool.clone()),
            approvals: ApprovalStore::new(pool.clone()),
            tool_events: ToolEventStore::new(pool.clone()),
            usage: UsageStore::new(pool.clone()),
            audit_logs: AuditLogStore::new(pool.clone()),
            agent_tokens: AgentTokenStore::new(pool),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
