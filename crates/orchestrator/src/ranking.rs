// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Actionability and ranking (spec §4.7).

use agent_commander_types::session::SessionStatus;
use chrono::{DateTime, Utc};

use crate::item::{ActionType, OrchestratorItem, Source};

/// Whether the approval payload names something the user can actually
/// decide on (rule (c) — payload includes command/path/args/url).
fn payload_is_decisive(payload: &serde_json::Value) -> bool {
    ["command", "path", "args", "url"].iter().any(|key| payload.get(key).is_some())
}

/// Rule (c) from spec §4.7: an approval item whose action type produces a
/// decisive input, whose payload names something concrete, while the
/// session is still waiting on it.
pub fn approval_is_actionable(item: &OrchestratorItem, session_status: SessionStatus, requested_payload: &serde_json::Value) -> bool {
    item.source == Source::Approval
        && item.action.action_type.is_decisive()
        && payload_is_decisive(requested_payload)
        && session_status == SessionStatus::WaitingForApproval
}

/// Full actionability predicate (spec §4.7 rules a-d). `approval_payload` is
/// `Some` only for approval-sourced items; snapshot/status items pass `None`.
pub fn is_actionable(item: &OrchestratorItem, session_status: SessionStatus, approval_payload: Option<&serde_json::Value>) -> bool {
    if session_status == SessionStatus::Error {
        return true;
    }
    if item.action.action_type == ActionType::Error {
        return true;
    }
    if let Some(payload) = approval_payload {
        if approval_is_actionable(item, session_status, payload) {
            return true;
        }
    }
    !matches!(item.action.action_type, ActionType::TextInput | ActionType::NeedsAttention) && item.action.confidence >= 0.75
}

fn status_weight(status: SessionStatus) -> u32 {
    match status {
        SessionStatus::Error => 20,
        SessionStatus::WaitingForApproval => 15,
        SessionStatus::WaitingForInput => 10,
        _ => 0,
    }
}

/// Score = action-type weight + status weight + source weight +
/// min(wait_minutes, 30) (spec §4.7).
pub fn score(item: &OrchestratorItem, session_status: SessionStatus, now: DateTime<Utc>) -> u32 {
    let wait_minutes = (now - item.created_at).num_minutes().max(0) as u32;
    item.action.action_type.weight() + status_weight(session_status) + item.source.weight() + wait_minutes.min(30)
}

/// Sort items newest-`created_at`-first as a rank tiebreak.
pub fn tiebreak_newer_first(a: &OrchestratorItem, b: &OrchestratorItem) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at)
}

#[derive(Debug, Clone)]
pub struct RankedItem {
    pub item: OrchestratorItem,
    pub score: u32,
}

/// Partition non-dismissed items into `active` (actionable), `waiting`
/// (non-actionable), and `idled` (any non-dismissed item with `idled_at`
/// set), each sorted by descending score with newer-first tiebreak. The
/// three sets are disjoint and cover every non-dismissed item (spec §8).
pub struct RankedLists {
    pub active: Vec<RankedItem>,
    pub waiting: Vec<RankedItem>,
    pub idled: Vec<RankedItem>,
}

pub fn rank_items<F, G>(items: Vec<OrchestratorItem>, now: DateTime<Utc>, status_of: F, payload_of: G) -> RankedLists
where
    F: Fn(agent_commander_types::ids::SessionId) -> SessionStatus,
    G: Fn(&OrchestratorItem) -> Option<serde_json::Value>,
{
    let mut active = Vec::new();
    let mut waiting = Vec::new();
    let mut idled = Vec::new();

    for item in items {
        if item.is_dismissed() {
            continue;
        }
        let status = status_of(item.session_id);
        let ranked = RankedItem { score: score(&item, status, now), item };

        if ranked.item.is_idled() {
            idled.push(ranked);
            continue;
        }
        let payload = payload_of(&ranked.item);
        if is_actionable(&ranked.item, status, payload.as_ref()) {
            active.push(ranked);
        } else {
            waiting.push(ranked);
        }
    }

    let by_score_then_recency = |a: &RankedItem, b: &RankedItem| b.score.cmp(&a.score).then_with(|| tiebreak_newer_first(&a.item, &b.item));
    active.sort_by(by_score_then_recency);
    waiting.sort_by(by_score_then_recency);
    idled.sort_by(by_score_then_recency);

    RankedLists { active, waiting, idled }
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "ranking_tests.rs"]
mod tests;
