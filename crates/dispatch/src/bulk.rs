// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bulk session operations (spec §4.4, `POST /sessions/bulk`): apply one of
//! `{delete, archive, unarchive, assign_group, idle, unidle, terminate}` to a
//! list of session ids. Per-id failures are collected rather than aborting
//! the whole batch; the ids that did succeed are reported back so the
//! caller can emit a single `sessions.changed` broadcast for them.

use std::sync::Arc;

use agent_commander_bus::Bus;
use agent_commander_store::Store;
use agent_commander_types::error::CommanderError;
use agent_commander_types::ids::{HostId, SessionId};
use agent_commander_types::protocol::command::{BulkOperationError, BulkOperationKind, BulkOperationRequest, BulkOperationResponse};
use agent_commander_types::protocol::ui::{ServerToUiMessage, SessionsChanged};
use chrono::Utc;

use crate::dispatcher::CommandDispatcher;

pub struct BulkOperations {
    store: Arc<Store>,
    dispatcher: CommandDispatcher,
    bus: Arc<Bus>,
}

impl BulkOperations {
    pub fn new(store: Arc<Store>, dispatcher: CommandDispatcher, bus: Arc<Bus>) -> Self {
        Self { store, dispatcher, bus }
    }

    pub async fn apply(&self, request: &BulkOperationRequest) -> BulkOperationResponse {
        let mut response = BulkOperationResponse::default();
        for &session_id in &request.session_ids {
            match self.apply_one(request.operation, session_id, request.group_id).await {
                Ok(()) => response.succeeded.push(session_id),
                Err(err) => response.errors.push(BulkOperationError { session_id, error: err.to_string() }),
            }
        }
        if !response.succeeded.is_empty() {
            self.publish_changed(request.operation, &response.succeeded).await;
        }
        response
    }

    /// Emit one atomic `sessions.changed` frame covering every id that
    /// actually succeeded (spec §5 — bulk ops are observed as a single
    /// frame, never one per session).
    async fn publish_changed(&self, operation: BulkOperationKind, succeeded: &[SessionId]) {
        if operation == BulkOperationKind::Delete {
            self.bus.publish(ServerToUiMessage::SessionsChanged(SessionsChanged { sessions: Vec::new(), deleted: succeeded.to_vec() }));
            return;
        }
        let mut sessions = Vec::with_capacity(succeeded.len());
        for &id in succeeded {
            match self.store.sessions.get(id).await {
                Ok(session) => sessions.push(session),
                Err(err) => tracing::warn!(%id, %err, "session vanished before bulk-op broadcast"),
            }
        }
        self.bus.publish(ServerToUiMessage::SessionsChanged(SessionsChanged { sessions, deleted: Vec::new() }));
    }

    async fn apply_one(&self, operation: BulkOperationKind, session_id: SessionId, group_id: Option<agent_commander_types::ids::GroupId>) -> Result<(), CommanderError> {
        let now = Utc::now();
        match operation {
            BulkOperationKind::Delete => self.store.sessions.delete(session_id).await.map_err(CommanderError::from),
            BulkOperationKind::Archive => self.store.sessions.set_archived(session_id, true, now).await.map_err(CommanderError::from),
            BulkOperationKind::Unarchive => self.store.sessions.set_archived(session_id, false, now).await.map_err(CommanderError::from),
            BulkOperationKind::AssignGroup => self.store.sessions.assign_group(session_id, group_id, now).await.map_err(CommanderError::from),
            BulkOperationKind::Idle => self.store.sessions.set_idled(session_id, true, now).await.map_err(CommanderError::from),
            BulkOperationKind::Unidle => self.store.sessions.set_idled(session_id, false, now).await.map_err(CommanderError::from),
            BulkOperationKind::Terminate => self.terminate(session_id).await,
        }
    }

    /// `terminate` dispatches `kill_session` to the owning agent, then
    /// archives the session row directly (spec §4.4: "per-session
    /// kill_session is dispatched, then archived").
    async fn terminate(&self, session_id: SessionId) -> Result<(), CommanderError> {
        let session = self.store.sessions.get(session_id).await.map_err(CommanderError::from)?;
        let host_id: HostId = session.host_id.clone();
        let command = serde_json::json!({ "type": "kill_session" });
        self.dispatcher.dispatch(&host_id, session_id, command, session.provider).await?;
        self.store.sessions.set_archived(session_id, true, Utc::now()).await.map_err(CommanderError::from)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "bulk_tests.rs"]
mod tests;
