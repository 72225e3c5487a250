// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PubSub bus: the fan-out hub between persisted state changes and the
//! WebSocket connections that care about them (spec §4.1). One broadcast
//! channel carries every `ServerToUiMessage`; each UI connection narrows it
//! through its own [`subscription::UiSubscriptionState`] before forwarding,
//! the same edge-filtering shape as an aggregated event stream. Agent-bound
//! traffic is point-to-point instead, routed through [`registry::AgentRegistry`].

pub mod console;
pub mod filter;
pub mod registry;
pub mod subscription;

use std::sync::Arc;

use agent_commander_types::error::CommanderError;
use agent_commander_types::protocol::agent::ServerToAgentMessage;
use agent_commander_types::protocol::ui::ServerToUiMessage;
use tokio::sync::broadcast;

pub use console::{ConsoleSubscriptionManager, SharedConsoleSubscriptionManager};
pub use registry::{AgentRegistry, SharedAgentRegistry};
pub use subscription::UiSubscriptionState;

/// Bounded so a single catastrophically slow UI connection lags instead of
/// unbounded-growing the channel; lag is surfaced to that connection only,
/// every other subscriber is unaffected (broadcast semantics).
const UI_BROADCAST_CAPACITY: usize = 4096;

pub struct Bus {
    pub agents: SharedAgentRegistry,
    pub console_subscriptions: SharedConsoleSubscriptionManager,
    ui_tx: broadcast::Sender<ServerToUiMessage>,
}

impl Bus {
    pub fn new() -> Arc<Self> {
        let (ui_tx, _) = broadcast::channel(UI_BROADCAST_CAPACITY);
        Arc::new(Self {
            agents: Arc::new(AgentRegistry::new()),
            console_subscriptions: Arc::new(ConsoleSubscriptionManager::new()),
            ui_tx,
        })
    }

    /// Register interest in the UI broadcast stream. Callers narrow what
    /// they receive through their own `UiSubscriptionState`.
    pub fn subscribe_ui(&self) -> broadcast::Receiver<ServerToUiMessage> {
        self.ui_tx.subscribe()
    }

    /// Publish a change to every UI connection. A send with no receivers is
    /// not an error — it just means no dashboard is currently open.
    pub fn publish(&self, message: ServerToUiMessage) {
        let _ = self.ui_tx.send(message);
    }

    pub async fn send_to_agent(&self, host_id: &str, message: ServerToAgentMessage) -> Result<(), CommanderError> {
        self.agents.send(host_id, message).await
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
