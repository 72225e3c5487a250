// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `OrchestratorItem` and its constituent `Action` type (spec §3, §4.7).

use agent_commander_types::ids::{ApprovalId, SessionId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    YesNo,
    MultiChoice,
    TextInput,
    PlanReview,
    NeedsAttention,
    Error,
}

impl ActionType {
    /// Ranking weight for this action type (spec §4.7 weight table).
    pub fn weight(self) -> u32 {
        match self {
            Self::Error => 50,
            Self::PlanReview => 40,
            Self::YesNo => 30,
            Self::MultiChoice => 25,
            Self::TextInput => 20,
            Self::NeedsAttention => 10,
        }
    }

    /// Action types that count as "decisive input" for approval actionability
    /// rule (c) (spec §4.7).
    pub fn is_decisive(self) -> bool {
        matches!(self, Self::YesNo | Self::MultiChoice | Self::PlanReview)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub question: Option<String>,
    pub options: Option<Vec<String>>,
    pub context: Option<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Snapshot,
    Approval,
    Status,
}

impl Source {
    /// Ranking weight for this source (spec §4.7 weight table).
    pub fn weight(self) -> u32 {
        match self {
            Self::Approval => 15,
            Self::Snapshot => 5,
            Self::Status => 0,
        }
    }
}

/// Derived dashboard-side entity representing something needing user
/// attention, built from sessions, approvals, and snapshots (spec §3).
#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorItem {
    pub id: Uuid,
    pub session_id: SessionId,
    pub source: Source,
    pub action: Action,
    pub approval_id: Option<ApprovalId>,
    pub created_at: DateTime<Utc>,
    pub dismissed_at: Option<DateTime<Utc>>,
    pub idled_at: Option<DateTime<Utc>>,
    pub capture_hash: Option<String>,
    pub summary: Option<String>,
}

impl OrchestratorItem {
    pub fn is_dismissed(&self) -> bool {
        self.dismissed_at.is_some()
    }

    pub fn is_idled(&self) -> bool {
        self.idled_at.is_some()
    }
}
