// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::HostId;

/// A developer host running an agent process.
///
/// Lifecycle: created on first admin provisioning, updated on every
/// `agent.hello`, never destroyed — a host is "offline" only by the absence
/// of a recent `last_seen`, never by a delete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Host {
    pub id: HostId,
    pub name: String,
    pub network_name: Option<String>,
    pub network_ip: Option<String>,
    pub capabilities: HostCapabilities,
    pub agent_version: Option<String>,
    pub last_seen: DateTime<Utc>,
    pub last_acked_seq: u64,
}

/// Open record of what an agent host can do. Booleans are closed (the
/// protocol names exactly these); `directory_roots` is the allow-list
/// enforced by `DirectoryNotAllowed`/`HiddenNotAllowed`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HostCapabilities {
    #[serde(default)]
    pub tmux: bool,
    #[serde(default)]
    pub spawn: bool,
    #[serde(default)]
    pub kill: bool,
    #[serde(default)]
    pub console_stream: bool,
    #[serde(default)]
    pub terminal: bool,
    #[serde(default)]
    pub list_directory: bool,
    #[serde(default)]
    pub directory_roots: Vec<String>,
}

impl Host {
    /// A host is considered online if its `agent.hello`/upsert was seen
    /// within `within`. This is a read-time judgment, never stored.
    pub fn is_online(&self, now: DateTime<Utc>, within: chrono::Duration) -> bool {
        now.signed_duration_since(self.last_seen) <= within
    }
}
