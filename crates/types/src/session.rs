// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{GroupId, HostId, SessionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    TmuxPane,
    Job,
    Service,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    ClaudeCode,
    Codex,
    GeminiCli,
    Opencode,
    Shell,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Starting,
    Running,
    Idle,
    WaitingForInput,
    WaitingForApproval,
    Error,
    Done,
}

impl SessionStatus {
    /// Statuses that, absent a snapshot/approval item, generate a status
    /// item in the orchestrator (spec §4.7).
    pub fn needs_attention(&self) -> bool {
        matches!(self, Self::WaitingForInput | Self::WaitingForApproval | Self::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starting => "STARTING",
            Self::Running => "RUNNING",
            Self::Idle => "IDLE",
            Self::WaitingForInput => "WAITING_FOR_INPUT",
            Self::WaitingForApproval => "WAITING_FOR_APPROVAL",
            Self::Error => "ERROR",
            Self::Done => "DONE",
        }
    }
}

/// `git_status.*` carried in session metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GitStatus {
    #[serde(default)]
    pub ahead: u32,
    #[serde(default)]
    pub behind: u32,
    #[serde(default)]
    pub staged: u32,
    #[serde(default)]
    pub unstaged: u32,
    #[serde(default)]
    pub untracked: u32,
    #[serde(default)]
    pub unmerged: u32,
    pub upstream: Option<String>,
}

/// `tmux.*` carried in session metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TmuxMeta {
    pub session_name: Option<String>,
    pub window_name: Option<String>,
}

/// `approval.*` carried in session metadata — a denormalized summary of the
/// session's current pending approval, distinct from the `Approval` record
/// itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ApprovalMeta {
    pub summary: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionMetadata {
    pub status_detail: Option<String>,
    #[serde(default)]
    pub approval: ApprovalMeta,
    #[serde(default)]
    pub tmux: TmuxMeta,
    #[serde(default)]
    pub git_status: GitStatus,
    /// Catch-all for agent-specific fields not yet promoted to a typed field.
    #[serde(default, flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A tracked unit of work on a host — the canonical entity of the system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub id: SessionId,
    pub host_id: HostId,
    pub kind: SessionKind,
    pub provider: Provider,
    pub status: SessionStatus,
    pub title: Option<String>,
    pub cwd: Option<String>,
    pub repo_root: Option<String>,
    pub git_branch: Option<String>,
    pub git_remote: Option<String>,
    pub tmux_target: Option<String>,
    pub tmux_pane_id: Option<String>,
    pub group_id: Option<GroupId>,
    pub forked_from: Option<SessionId>,
    pub fork_depth: u32,
    pub archived_at: Option<DateTime<Utc>>,
    pub idled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub metadata: SessionMetadata,
}

impl Session {
    /// Archived sessions are terminal: agent upserts after archival may
    /// still append trailing events, but must not alter `status` (spec §4.3).
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    /// `idled_at` is an orthogonal manual flag independent of `status`.
    pub fn is_idled(&self) -> bool {
        self.idled_at.is_some()
    }
}

/// A named grouping of sessions, auto-created from a tmux session name or
/// explicitly via `assign_group` bulk operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionGroup {
    pub id: GroupId,
    pub host_id: HostId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
