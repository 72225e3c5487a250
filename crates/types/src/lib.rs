// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared data model and wire protocol for the Agent Commander control
//! plane: the types that cross a process boundary (agent↔server,
//! server↔UI) live here so every other crate speaks the same vocabulary.

pub mod ansi;
pub mod approval;
pub mod error;
pub mod event;
pub mod host;
pub mod ids;
pub mod protocol;
pub mod session;
pub mod snapshot;
pub mod tool_event;
pub mod usage;

pub use approval::{Approval, ApprovalDecisionRequest, ApprovalType, Decision, DecisionMode};
pub use error::{CommanderError, ErrorBody, ErrorResponse};
pub use event::{Event, EventAppend};
pub use host::{Host, HostCapabilities};
pub use ids::{ApprovalId, CommandId, EventId, GroupId, HostId, SessionId, HOST_LEVEL_SESSION_ID};
pub use session::{GitStatus, Provider, Session, SessionGroup, SessionKind, SessionMetadata, SessionStatus};
pub use snapshot::Snapshot;
pub use tool_event::ToolEvent;
pub use usage::{ProviderUsage, SessionUsageTotals};
