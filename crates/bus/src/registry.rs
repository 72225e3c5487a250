// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent connection registry — routes a single outbound frame to the one
//! agent WebSocket connection that owns a given host (spec §4.2, §4.4).

use std::collections::HashMap;
use std::sync::Arc;

use agent_commander_types::error::CommanderError;
use agent_commander_types::ids::HostId;
use agent_commander_types::protocol::agent::ServerToAgentMessage;
use tokio::sync::{mpsc, RwLock};

/// A live agent connection's outbound half.
#[derive(Clone)]
pub struct AgentHandle {
    tx: mpsc::Sender<ServerToAgentMessage>,
}

impl AgentHandle {
    pub fn new(tx: mpsc::Sender<ServerToAgentMessage>) -> Self {
        Self { tx }
    }
}

/// Tracks the currently-connected agent per host. Only one connection per
/// host is considered authoritative; a new `agent.hello` for an already
/// registered host replaces the old handle (the previous connection is
/// expected to be dropped by the transport layer).
#[derive(Default)]
pub struct AgentRegistry {
    agents: RwLock<HashMap<HostId, AgentHandle>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, host_id: HostId, tx: mpsc::Sender<ServerToAgentMessage>) {
        self.agents.write().await.insert(host_id, AgentHandle::new(tx));
    }

    /// Remove the registration only if it still points at `tx`-owning
    /// connection — callers pass their own handle to avoid racing a newer
    /// reconnect's registration off the map.
    pub async fn unregister(&self, host_id: &str) {
        self.agents.write().await.remove(host_id);
    }

    pub async fn is_connected(&self, host_id: &str) -> bool {
        self.agents.read().await.contains_key(host_id)
    }

    /// Forward a frame to the host's current connection. Fails with
    /// `AgentUnavailable` if no connection is registered or the channel is
    /// closed (the connection died between the check and the send).
    pub async fn send(&self, host_id: &str, message: ServerToAgentMessage) -> Result<(), CommanderError> {
        let handle = {
            let agents = self.agents.read().await;
            agents.get(host_id).cloned().ok_or(CommanderError::AgentUnavailable)?
        };
        handle.tx.send(message).await.map_err(|_| CommanderError::AgentUnavailable)
    }
}

pub type SharedAgentRegistry = Arc<AgentRegistry>;

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
