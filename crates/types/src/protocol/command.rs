// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command dispatch and bulk-operation request/response types (spec §4.4, §6.4).

use serde::{Deserialize, Serialize};

use crate::ids::{CommandId, GroupId, SessionId};

/// Body of `POST /sessions/:id/commands` — an opaque command forwarded
/// verbatim to the owning agent as `commands.dispatch.command`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRequest {
    #[serde(rename = "type")]
    pub command_type: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchResponse {
    pub cmd_id: CommandId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandsResultBody {
    pub cmd_id: CommandId,
    #[serde(default)]
    pub session_id: Option<SessionId>,
    pub ok: bool,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyMode {
    LineRange,
    LastNLines,
    Full,
}

/// Body of `POST /sessions/:id/copy-to` (spec §4.4 — cross-host copy).
#[derive(Debug, Clone, Deserialize)]
pub struct CopyToRequest {
    pub target_session_id: SessionId,
    pub mode: CopyMode,
    #[serde(default)]
    pub line_start: Option<u32>,
    #[serde(default)]
    pub line_end: Option<u32>,
    #[serde(default)]
    pub last_n_lines: Option<u32>,
    #[serde(default)]
    pub strip_ansi: bool,
    #[serde(default)]
    pub prepend_text: Option<String>,
    #[serde(default)]
    pub append_text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkOperationKind {
    Delete,
    Archive,
    Unarchive,
    AssignGroup,
    Idle,
    Unidle,
    Terminate,
}

/// Body of `POST /sessions/bulk` (spec §4.4).
#[derive(Debug, Clone, Deserialize)]
pub struct BulkOperationRequest {
    pub operation: BulkOperationKind,
    pub session_ids: Vec<SessionId>,
    #[serde(default)]
    pub group_id: Option<GroupId>,
}

/// Response to a bulk operation: per-id error list plus which ids actually
/// succeeded (used to build the single atomic `sessions.changed` frame).
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkOperationResponse {
    pub succeeded: Vec<SessionId>,
    pub errors: Vec<BulkOperationError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkOperationError {
    pub session_id: SessionId,
    pub error: String,
}

/// Body of `PATCH /sessions/:id`.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionPatchRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub idle: Option<bool>,
}
