// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! UI WebSocket wire protocol — `/v1/ui/ws` (spec §6.2).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::approval::Approval;
use crate::event::Event;
use crate::ids::{GroupId, HostId, SessionId};
use crate::session::Session;
use crate::snapshot::Snapshot;
use crate::tool_event::ToolEvent;
use crate::usage::SessionUsageTotals;

/// The seven topic kinds a UI subscriber can register interest in
/// (spec §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicKind {
    Sessions,
    Approvals,
    Events,
    Console,
    Snapshots,
    ToolEvents,
    SessionUsage,
}

impl TopicKind {
    pub const ALL: [TopicKind; 7] = [
        TopicKind::Sessions,
        TopicKind::Approvals,
        TopicKind::Events,
        TopicKind::Console,
        TopicKind::Snapshots,
        TopicKind::ToolEvents,
        TopicKind::SessionUsage,
    ];
}

/// Per-topic filter. Shallow key-equality plus the reserved `session_ids`
/// array and `status` CSV list (spec §4.1, §6.2).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TopicFilter {
    #[serde(default)]
    pub session_id: Option<SessionId>,
    #[serde(default)]
    pub session_ids: Option<Vec<SessionId>>,
    /// Comma-separated status list, e.g. `"RUNNING,IDLE"`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub include_archived: Option<bool>,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    #[serde(default)]
    pub host_id: Option<HostId>,
}

impl TopicFilter {
    /// Parse the `status` CSV field into its component values.
    pub fn status_values(&self) -> Vec<&str> {
        self.status.as_deref().map(|s| s.split(',').map(str::trim).filter(|s| !s.is_empty()).collect()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicSubscription {
    #[serde(rename = "type")]
    pub kind: TopicKind,
    #[serde(default)]
    pub filter: Option<TopicFilter>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiSubscribeRequest {
    pub topics: Vec<TopicSubscription>,
}

/// UI→server frame envelope (only `ui.subscribe` carries a typed payload
/// today; unsubscribe and console control reuse the same tagged shape).
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum UiMessage {
    #[serde(rename = "ui.subscribe")]
    Subscribe(UiSubscribeRequest),
    #[serde(rename = "ui.unsubscribe")]
    Unsubscribe(UiUnsubscribeRequest),
    #[serde(rename = "console.subscribe")]
    ConsoleSubscribe(ConsoleSubscribeRequest),
    #[serde(rename = "console.unsubscribe")]
    ConsoleUnsubscribe(ConsoleUnsubscribeRequest),
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiUnsubscribeRequest {
    #[serde(rename = "type")]
    pub kind: TopicKind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleSubscribeRequest {
    pub session_id: SessionId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleUnsubscribeRequest {
    pub subscription_id: Uuid,
}

/// Server→UI frames (spec §6.2).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerToUiMessage {
    #[serde(rename = "sessions.changed")]
    SessionsChanged(SessionsChanged),
    #[serde(rename = "approvals.created")]
    ApprovalsCreated(Approval),
    #[serde(rename = "approvals.updated")]
    ApprovalsUpdated(Approval),
    #[serde(rename = "events.appended")]
    EventsAppended(Event),
    #[serde(rename = "console.chunk")]
    ConsoleChunk(ConsoleChunkOut),
    #[serde(rename = "snapshots.updated")]
    SnapshotsUpdated(Snapshot),
    #[serde(rename = "tool_event.started")]
    ToolEventStarted(ToolEvent),
    #[serde(rename = "tool_event.completed")]
    ToolEventCompleted(ToolEvent),
    #[serde(rename = "session_usage.updated")]
    SessionUsageUpdated(SessionUsageUpdated),
}

/// `sessions.changed` is atomic over both fields (spec §5 — subscribers
/// observe one frame covering every successful id in a bulk op).
#[derive(Debug, Clone, Serialize)]
pub struct SessionsChanged {
    pub sessions: Vec<Session>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deleted: Vec<SessionId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsoleChunkOut {
    pub session_id: SessionId,
    pub subscription_id: Uuid,
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionUsageUpdated {
    pub session_id: SessionId,
    pub totals: SessionUsageTotals,
}

impl ServerToUiMessage {
    /// The topic kind subscribers must be registered for to receive this
    /// frame (spec §4.1's topic→frame mapping).
    pub fn topic_kind(&self) -> TopicKind {
        match self {
            Self::SessionsChanged(_) => TopicKind::Sessions,
            Self::ApprovalsCreated(_) | Self::ApprovalsUpdated(_) => TopicKind::Approvals,
            Self::EventsAppended(_) => TopicKind::Events,
            Self::ConsoleChunk(_) => TopicKind::Console,
            Self::SnapshotsUpdated(_) => TopicKind::Snapshots,
            Self::ToolEventStarted(_) | Self::ToolEventCompleted(_) => TopicKind::ToolEvents,
            Self::SessionUsageUpdated(_) => TopicKind::SessionUsage,
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "ui_tests.rs"]
mod tests;
