// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ids::SessionId;
use crate::session::Provider;

/// A tool invocation inside a session, correlated across `tool.event.started`
/// and `tool.event.completed` by `event_id` (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolEvent {
    pub id: Uuid,
    pub session_id: SessionId,
    pub provider: Provider,
    pub tool_name: String,
    pub tool_input: Option<serde_json::Value>,
    pub tool_output: Option<serde_json::Value>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub success: Option<bool>,
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolEventStarted {
    pub event_id: Uuid,
    pub session_id: SessionId,
    pub tool_name: String,
    #[serde(default)]
    pub tool_input: Option<serde_json::Value>,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolEventCompleted {
    pub event_id: Uuid,
    pub session_id: SessionId,
    #[serde(default)]
    pub tool_output: Option<serde_json::Value>,
    pub success: bool,
    pub completed_at: DateTime<Utc>,
}
