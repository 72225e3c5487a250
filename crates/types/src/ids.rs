// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use uuid::Uuid;

/// Host identifiers are agent-chosen opaque strings (e.g. a machine name),
/// not UUIDs — the agent asserts its own identity at `agent.hello`.
pub type HostId = String;

/// Sessions are identified by a server- or agent-assigned UUID.
pub type SessionId = Uuid;

/// The synthetic session id used for host-level commands (directory
/// listing, adopt-panes) that are not scoped to any tracked session.
pub const HOST_LEVEL_SESSION_ID: Uuid = Uuid::nil();

pub type ApprovalId = Uuid;
pub type EventId = Uuid;
pub type GroupId = Uuid;

/// Monotonic command id, a lexicographically sortable ULID rendered as text.
pub type CommandId = String;
