// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{EventId, SessionId};

/// An append-only, monotonic-per-session record pushed by an agent via
/// `events.append`. No update or delete exists for this entity (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: EventId,
    pub session_id: SessionId,
    /// Monotonic sequence number scoped to `session_id`, assigned by the
    /// store at insert time (distinct from the connection-level `seq`).
    pub seq: u64,
    pub ts: DateTime<Utc>,
    #[serde(rename = "type")]
    pub event_type: String,
    pub payload: serde_json::Value,
}

/// A single event inside an `events.append` batch, as received from an
/// agent. `event_id` is optional and supplied by the agent for idempotent
/// replay; when absent the store generates one.
#[derive(Debug, Clone, Deserialize)]
pub struct EventAppend {
    #[serde(default)]
    pub event_id: Option<EventId>,
    pub ts: DateTime<Utc>,
    #[serde(rename = "type")]
    pub event_type: String,
    pub payload: serde_json::Value,
}

/// Event type tags with dedicated handling beyond plain persistence.
pub mod event_type {
    pub const APPROVAL_REQUESTED: &str = "approval.requested";
    pub const COMMAND_COMPLETED: &str = "command.completed";
}
