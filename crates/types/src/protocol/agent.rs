// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent WebSocket wire protocol — `/v1/agent/connect` (spec §6.1).
//!
//! Agent→server frames carry a strictly increasing `seq`; server→agent
//! frames omit it. Both directions use an adjacently-tagged envelope
//! (`type` selects the variant, `payload` carries its body), matching the
//! dispatch-table shape of `ws_msg.rs`'s `ServerMessage`/`ClientMessage`
//! pair in the teacher crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::approval::ApprovalType;
use crate::event::EventAppend;
use crate::host::HostCapabilities;
use crate::ids::SessionId;
use crate::session::{Provider, SessionKind, SessionMetadata, SessionStatus};
use crate::tool_event::{ToolEventCompleted, ToolEventStarted};
use crate::usage::ProviderUsage;

/// Envelope for an agent→server frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEnvelope {
    pub v: u8,
    pub ts: DateTime<Utc>,
    pub seq: u64,
    #[serde(flatten)]
    pub message: AgentMessage,
}

/// Every payload an agent may send, tagged by `type` with its body nested
/// under `payload` (adjacently tagged, mirroring the wire format in §6.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum AgentMessage {
    #[serde(rename = "agent.hello")]
    AgentHello(AgentHello),
    #[serde(rename = "sessions.upsert")]
    SessionsUpsert(SessionsUpsert),
    #[serde(rename = "sessions.prune")]
    SessionsPrune(SessionsPrune),
    #[serde(rename = "sessions.snapshot")]
    SessionsSnapshot(SessionsSnapshot),
    #[serde(rename = "events.append")]
    EventsAppend(EventsAppend),
    #[serde(rename = "commands.result")]
    CommandsResult(CommandsResult),
    #[serde(rename = "console.chunk")]
    ConsoleChunk(ConsoleChunk),
    #[serde(rename = "terminal.output")]
    TerminalOutput(TerminalOutput),
    #[serde(rename = "terminal.attached")]
    TerminalAttached(TerminalStatusPayload),
    #[serde(rename = "terminal.detached")]
    TerminalDetached(TerminalStatusPayload),
    #[serde(rename = "terminal.error")]
    TerminalError(TerminalStatusPayload),
    #[serde(rename = "terminal.readonly")]
    TerminalReadonly(TerminalStatusPayload),
    #[serde(rename = "terminal.control")]
    TerminalControl(TerminalStatusPayload),
    #[serde(rename = "tool.event.started")]
    ToolEventStarted(ToolEventStarted),
    #[serde(rename = "tool.event.completed")]
    ToolEventCompleted(ToolEventCompleted),
    #[serde(rename = "provider.usage")]
    ProviderUsage(ProviderUsage),
    #[serde(rename = "session.usage")]
    SessionUsage(SessionUsageReport),
    /// Any `mcp.*` message. The dispatch table treats this family as an
    /// opaque passthrough acked `ok` without dedicated handling.
    #[serde(rename = "mcp.event")]
    Mcp(serde_json::Value),
}

impl AgentMessage {
    /// The `type` tag this message serializes under, for logging.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::AgentHello(_) => "agent.hello",
            Self::SessionsUpsert(_) => "sessions.upsert",
            Self::SessionsPrune(_) => "sessions.prune",
            Self::SessionsSnapshot(_) => "sessions.snapshot",
            Self::EventsAppend(_) => "events.append",
            Self::CommandsResult(_) => "commands.result",
            Self::ConsoleChunk(_) => "console.chunk",
            Self::TerminalOutput(_) => "terminal.output",
            Self::TerminalAttached(_) => "terminal.attached",
            Self::TerminalDetached(_) => "terminal.detached",
            Self::TerminalError(_) => "terminal.error",
            Self::TerminalReadonly(_) => "terminal.readonly",
            Self::TerminalControl(_) => "terminal.control",
            Self::ToolEventStarted(_) => "tool.event.started",
            Self::ToolEventCompleted(_) => "tool.event.completed",
            Self::ProviderUsage(_) => "provider.usage",
            Self::SessionUsage(_) => "session.usage",
            Self::Mcp(_) => "mcp.*",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentHello {
    pub host: AgentHelloHost,
    #[serde(default)]
    pub resume: ResumeInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentHelloHost {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub network_name: Option<String>,
    #[serde(default)]
    pub network_ip: Option<String>,
    #[serde(default)]
    pub capabilities: HostCapabilities,
    #[serde(default)]
    pub agent_version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeInfo {
    #[serde(default)]
    pub last_acked_seq: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUpsert {
    pub id: SessionId,
    pub kind: SessionKind,
    pub provider: Provider,
    pub status: SessionStatus,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub repo_root: Option<String>,
    #[serde(default)]
    pub git_branch: Option<String>,
    #[serde(default)]
    pub git_remote: Option<String>,
    #[serde(default)]
    pub tmux_target: Option<String>,
    #[serde(default)]
    pub tmux_pane_id: Option<String>,
    #[serde(default)]
    pub forked_from: Option<SessionId>,
    #[serde(default)]
    pub fork_depth: u32,
    #[serde(default)]
    pub metadata: SessionMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsUpsert {
    pub sessions: Vec<SessionUpsert>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsPrune {
    pub session_ids: Vec<SessionId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsSnapshot {
    pub session_id: SessionId,
    pub capture_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsAppend {
    pub session_id: SessionId,
    pub events: Vec<EventAppend>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandsResult {
    pub cmd_id: String,
    #[serde(default)]
    pub session_id: Option<SessionId>,
    pub ok: bool,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleChunk {
    pub subscription_id: Uuid,
    pub session_id: SessionId,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalOutput {
    pub channel_id: Uuid,
    pub data: String,
    #[serde(default)]
    pub encoding: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TerminalStatusPayload {
    pub channel_id: Uuid,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUsageReport {
    pub session_id: SessionId,
    pub totals: crate::usage::SessionUsageTotals,
}

/// Server→agent ack for one processed (or replayed) `seq`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentAck {
    pub ack_seq: u64,
    pub status: AckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckStatus {
    Ok,
    Error,
}

/// Server→agent frame — a command dispatch, an approval decision push, or
/// an ack. Omits `seq` (spec §6.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerToAgentMessage {
    #[serde(rename = "agent.ack")]
    Ack(AgentAck),
    #[serde(rename = "commands.dispatch")]
    CommandsDispatch(CommandsDispatch),
    #[serde(rename = "approvals.decision")]
    ApprovalsDecision(ApprovalsDecisionPush),
    #[serde(rename = "console.subscribe")]
    ConsoleSubscribe(ConsoleSubscribePush),
    #[serde(rename = "terminal.attach")]
    TerminalAttach(TerminalAttachPush),
    #[serde(rename = "terminal.input")]
    TerminalInput(TerminalInputPush),
    #[serde(rename = "terminal.resize")]
    TerminalResize(TerminalResizePush),
    #[serde(rename = "terminal.control")]
    TerminalControl(TerminalControlPush),
    #[serde(rename = "terminal.detach")]
    TerminalDetach(TerminalDetachPush),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandsDispatch {
    pub cmd_id: String,
    pub session_id: SessionId,
    pub command: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalsDecisionPush {
    pub approval_id: Uuid,
    pub session_id: SessionId,
    pub decision: crate::approval::Decision,
    pub mode: crate::approval::DecisionMode,
    pub payload: crate::approval::ApprovalDecisionPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleSubscribePush {
    pub subscription_id: Uuid,
    pub session_id: SessionId,
    pub pane_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalAttachPush {
    pub channel_id: Uuid,
    pub session_id: SessionId,
    pub pane_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalInputPush {
    pub channel_id: Uuid,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalResizePush {
    pub channel_id: Uuid,
    pub cols: u16,
    pub rows: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalControlPush {
    pub channel_id: Uuid,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalDetachPush {
    pub channel_id: Uuid,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Approval type metadata echoed alongside `approval.requested` events for
/// clients that want it without re-deriving from `requested_payload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalKindHint {
    pub approval_type: ApprovalType,
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
