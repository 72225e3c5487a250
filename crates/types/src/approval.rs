// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ApprovalId, SessionId};
use crate::session::Provider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalType {
    Binary,
    TextInput,
    MultiChoice,
    PlanReview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Deny,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionMode {
    Hook,
    Keystroke,
    Both,
}

/// A permission request raised by an agent, decided once by a dashboard
/// user. Created on `approval.requested`; idempotent after decision
/// (spec §3, §4.6).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Approval {
    pub id: ApprovalId,
    pub session_id: SessionId,
    pub provider: Provider,
    pub ts_requested: DateTime<Utc>,
    pub ts_decided: Option<DateTime<Utc>>,
    pub decision: Option<Decision>,
    pub timed_out_at: Option<DateTime<Utc>>,
    pub requested_payload: serde_json::Value,
    pub decided_payload: Option<serde_json::Value>,
    pub approval_type: ApprovalType,
}

impl Approval {
    pub fn is_decided(&self) -> bool {
        self.decision.is_some()
    }
}

/// Body of a `decide` REST/bus call.
#[derive(Debug, Clone, Deserialize)]
pub struct ApprovalDecisionRequest {
    pub decision: Decision,
    pub mode: DecisionMode,
    pub payload: ApprovalDecisionPayload,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApprovalDecisionPayload {
    pub updated_input: Option<serde_json::Value>,
}
