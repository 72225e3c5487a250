// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stateful orchestrator engine: ingests streaming bus frames and maintains
//! the current set of [`OrchestratorItem`]s (spec §4.7). Single-threaded by
//! design — the dashboard instance that owns this struct serializes bus
//! frames onto it itself, the same way it owns the WebSocket connection.

use std::collections::HashMap;
use std::time::Duration;

use agent_commander_types::approval::{Approval, ApprovalType};
use agent_commander_types::ids::{ApprovalId, SessionId};
use agent_commander_types::session::SessionStatus;
use agent_commander_types::snapshot::capture_hash;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::analyzer::{self, DetectedAction};
use crate::item::{Action, ActionType, OrchestratorItem, Source};
use crate::ranking::{rank_items, RankedLists};

/// Minimum interval between re-running the analyzer on a session's snapshot
/// stream (spec §4.7).
pub const ANALYSIS_THROTTLE: Duration = Duration::from_millis(3000);
/// Grace window an approval can be missing from the authoritative pending
/// list before its item is pruned (spec §4.7, §9 open question (b)).
pub const APPROVAL_PRUNE_GRACE: Duration = Duration::from_secs(60);

/// Tool names whose approval produces a non-blocking text prompt rather than
/// a decisive yes/no or menu (spec §4.7).
const NON_BLOCKING_TOOLS: [&str; 3] = ["askuserquestion", "exitplanmode", "enterplanmode"];

#[derive(Debug, Clone)]
struct SnapshotState {
    last_hash: String,
    last_detected_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct Orchestrator {
    items: HashMap<Uuid, OrchestratorItem>,
    session_snapshot: HashMap<SessionId, Uuid>,
    session_status: HashMap<SessionId, Uuid>,
    approval_index: HashMap<ApprovalId, Uuid>,
    approval_payloads: HashMap<ApprovalId, serde_json::Value>,
    approval_absent_since: HashMap<ApprovalId, DateTime<Utc>>,
    snapshot_state: HashMap<SessionId, SnapshotState>,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest one `snapshots.updated` frame (spec §4.7 — snapshot ingestion).
    pub fn on_snapshot(&mut self, session_id: SessionId, capture_text: &str, now: DateTime<Utc>) {
        let hash = capture_hash(capture_text);
        if let Some(state) = self.snapshot_state.get(&session_id) {
            if state.last_hash == hash {
                return;
            }
            if now.signed_duration_since(state.last_detected_at).to_std().unwrap_or(Duration::ZERO) < ANALYSIS_THROTTLE {
                return;
            }
        }
        self.snapshot_state.insert(session_id, SnapshotState { last_hash: hash.clone(), last_detected_at: now });

        match analyzer::analyze(capture_text) {
            Some(detected) => self.supersede_with_detection(session_id, detected, hash, capture_text, now),
            None => {
                self.remove_snapshot_item(session_id);
            }
        }
    }

    fn supersede_with_detection(&mut self, session_id: SessionId, detected: DetectedAction, hash: String, capture_text: &str, now: DateTime<Utc>) {
        self.remove_status_item(session_id);
        self.remove_snapshot_item(session_id);

        let context = Some(agent_commander_types::ansi::last_lines_stripped(capture_text, 60));
        let item = OrchestratorItem {
            id: Uuid::new_v4(),
            session_id,
            source: Source::Snapshot,
            action: detected.into_action(context),
            approval_id: None,
            created_at: now,
            dismissed_at: None,
            idled_at: None,
            capture_hash: Some(hash),
            summary: None,
        };
        self.session_snapshot.insert(session_id, item.id);
        self.items.insert(item.id, item);
    }

    /// Reconcile a session's current status against its status item (spec
    /// §4.7 — status items).
    pub fn on_session_status(&mut self, session_id: SessionId, status: SessionStatus, now: DateTime<Utc>) {
        if !status.needs_attention() {
            self.remove_status_item(session_id);
            return;
        }
        if self.session_snapshot.contains_key(&session_id) || self.has_approval_item_for(session_id) {
            return;
        }
        if self.session_status.contains_key(&session_id) {
            return;
        }
        let item = OrchestratorItem {
            id: Uuid::new_v4(),
            session_id,
            source: Source::Status,
            action: Action { action_type: ActionType::NeedsAttention, question: None, options: None, context: None, confidence: 0.5 },
            approval_id: None,
            created_at: now,
            dismissed_at: None,
            idled_at: None,
            capture_hash: None,
            summary: None,
        };
        self.session_status.insert(session_id, item.id);
        self.items.insert(item.id, item);
    }

    /// Ingest `approvals.created` (spec §4.7 — approval items).
    pub fn on_approval_created(&mut self, approval: &Approval, snapshot_context: Option<String>, now: DateTime<Utc>) {
        let action_type = approval_action_type(approval);
        let question = approval.requested_payload.get("question").and_then(|v| v.as_str()).map(str::to_owned);
        let options = approval
            .requested_payload
            .get("input_schema")
            .and_then(|s| s.get("options"))
            .and_then(|o| o.as_array())
            .map(|values| values.iter().filter_map(|v| v.as_str().map(str::to_owned)).collect());

        let item = OrchestratorItem {
            id: Uuid::new_v4(),
            session_id: approval.session_id,
            source: Source::Approval,
            action: Action { action_type, question, options, context: snapshot_context, confidence: 1.0 },
            approval_id: Some(approval.id),
            created_at: now,
            dismissed_at: None,
            idled_at: None,
            capture_hash: None,
            summary: None,
        };
        self.approval_index.insert(approval.id, item.id);
        self.approval_payloads.insert(approval.id, approval.requested_payload.clone());
        self.approval_absent_since.remove(&approval.id);
        self.items.insert(item.id, item);
        self.remove_status_item(approval.session_id);
    }

    /// Ingest `approvals.updated` (a decision was made): remove the item
    /// immediately (spec §4.7).
    pub fn on_approval_updated(&mut self, approval_id: ApprovalId) {
        if let Some(item_id) = self.approval_index.remove(&approval_id) {
            self.items.remove(&item_id);
        }
        self.approval_payloads.remove(&approval_id);
        self.approval_absent_since.remove(&approval_id);
    }

    /// Prune approval items absent from the authoritative pending list for
    /// more than [`APPROVAL_PRUNE_GRACE`] (spec §4.7, §9 open question (b):
    /// preserved as-is, do not tighten the window).
    pub fn prune_approvals(&mut self, pending_ids: &[ApprovalId], now: DateTime<Utc>) {
        let tracked: Vec<ApprovalId> = self.approval_index.keys().copied().collect();
        for approval_id in tracked {
            if pending_ids.contains(&approval_id) {
                self.approval_absent_since.remove(&approval_id);
                continue;
            }
            let absent_since = *self.approval_absent_since.entry(approval_id).or_insert(now);
            if now.signed_duration_since(absent_since).to_std().unwrap_or(Duration::ZERO) >= APPROVAL_PRUNE_GRACE {
                self.on_approval_updated(approval_id);
            }
        }
    }

    /// Mark (or clear) every non-dismissed item for `session_id` as idled,
    /// mirroring the session's own `idled_at` (spec §4.7 — idled set).
    pub fn set_session_idled(&mut self, session_id: SessionId, idled: bool, now: DateTime<Utc>) {
        for item in self.items.values_mut().filter(|item| item.session_id == session_id && !item.is_dismissed()) {
            item.idled_at = if idled { Some(now) } else { None };
        }
    }

    pub fn dismiss(&mut self, item_id: Uuid, now: DateTime<Utc>) {
        if let Some(item) = self.items.get_mut(&item_id) {
            item.dismissed_at = Some(now);
        }
    }

    /// Rank current items into `active` / `waiting` / `idled` (spec §4.7).
    /// `status_of` and `session_status` together disjointly cover every
    /// non-dismissed item (spec §8 invariant).
    pub fn rank<F>(&self, now: DateTime<Utc>, status_of: F) -> RankedLists
    where
        F: Fn(SessionId) -> SessionStatus,
    {
        let approval_payloads = &self.approval_payloads;
        rank_items(self.items.values().cloned().collect(), now, status_of, |item| {
            item.approval_id.and_then(|id| approval_payloads.get(&id).cloned())
        })
    }

    fn has_approval_item_for(&self, session_id: SessionId) -> bool {
        self.items.values().any(|item| item.session_id == session_id && item.source == Source::Approval && !item.is_dismissed())
    }

    fn remove_snapshot_item(&mut self, session_id: SessionId) {
        if let Some(item_id) = self.session_snapshot.remove(&session_id) {
            self.items.remove(&item_id);
        }
    }

    fn remove_status_item(&mut self, session_id: SessionId) {
        if let Some(item_id) = self.session_status.remove(&session_id) {
            self.items.remove(&item_id);
        }
    }
}

fn approval_action_type(approval: &Approval) -> ActionType {
    let base = match approval.approval_type {
        ApprovalType::Binary => ActionType::YesNo,
        ApprovalType::TextInput => ActionType::TextInput,
        ApprovalType::MultiChoice => ActionType::MultiChoice,
        ApprovalType::PlanReview => ActionType::PlanReview,
    };
    let tool = approval.requested_payload.get("tool").and_then(|v| v.as_str()).unwrap_or_default().to_lowercase();
    if NON_BLOCKING_TOOLS.contains(&tool.as_str()) {
        ActionType::TextInput
    } else {
        base
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
