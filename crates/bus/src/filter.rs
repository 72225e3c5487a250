// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Topic-filter evaluation — whether a single entity matches a subscriber's
//! `TopicFilter`, and how a collection frame (`sessions.changed`) narrows to
//! the subset a given subscriber is entitled to see.

use agent_commander_types::protocol::ui::TopicFilter;
use agent_commander_types::{Approval, Event, Session, SessionId, Snapshot, ToolEvent};

/// Evaluate `filter` against a single session. `None` passes everything.
pub fn matches_session(filter: Option<&TopicFilter>, session: &Session) -> bool {
    let Some(filter) = filter else { return true };

    if let Some(session_id) = filter.session_id {
        if session_id != session.id {
            return false;
        }
    }
    if let Some(ids) = &filter.session_ids {
        if !ids.contains(&session.id) {
            return false;
        }
    }
    if !filter.status_values().is_empty() {
        let values = filter.status_values();
        if !values.iter().any(|v| *v == session.status.as_str()) {
            return false;
        }
    }
    if filter.include_archived != Some(true) && session.is_archived() {
        return false;
    }
    if let Some(group_id) = filter.group_id {
        if session.group_id != Some(group_id) {
            return false;
        }
    }
    if let Some(host_id) = &filter.host_id {
        if &session.host_id != host_id {
            return false;
        }
    }
    true
}

/// Evaluate `filter` against a bare session id (used for `deleted` entries,
/// where only `session_id`/`session_ids` are checkable — the session no
/// longer exists to test status/group/host against).
pub fn matches_session_id(filter: Option<&TopicFilter>, session_id: SessionId) -> bool {
    let Some(filter) = filter else { return true };
    if let Some(id) = filter.session_id {
        if id != session_id {
            return false;
        }
    }
    if let Some(ids) = &filter.session_ids {
        if !ids.contains(&session_id) {
            return false;
        }
    }
    true
}

pub fn matches_event(filter: Option<&TopicFilter>, event: &Event) -> bool {
    session_id_only(filter, event.session_id)
}

pub fn matches_approval(filter: Option<&TopicFilter>, approval: &Approval) -> bool {
    session_id_only(filter, approval.session_id)
}

pub fn matches_snapshot(filter: Option<&TopicFilter>, snapshot: &Snapshot) -> bool {
    session_id_only(filter, snapshot.session_id)
}

pub fn matches_tool_event(filter: Option<&TopicFilter>, tool_event: &ToolEvent) -> bool {
    session_id_only(filter, tool_event.session_id)
}

pub fn matches_console(filter: Option<&TopicFilter>, session_id: SessionId) -> bool {
    session_id_only(filter, session_id)
}

fn session_id_only(filter: Option<&TopicFilter>, session_id: SessionId) -> bool {
    let Some(filter) = filter else { return true };
    if let Some(id) = filter.session_id {
        if id != session_id {
            return false;
        }
    }
    if let Some(ids) = &filter.session_ids {
        if !ids.contains(&session_id) {
            return false;
        }
    }
    true
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
