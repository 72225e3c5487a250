// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Console subscription manager (spec §4.9): tracks which tmux panes a UI
//! client is streaming via `console.subscribe`, and replays the subscription
//! to the owning agent whenever that agent reconnects — an agent restart or
//! network blip must not silently end a console stream the UI still wants.

use std::collections::HashMap;
use std::sync::Arc;

use agent_commander_types::ids::{HostId, SessionId};
use agent_commander_types::protocol::agent::{ConsoleSubscribePush, ServerToAgentMessage};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct ConsoleSubscription {
    host_id: HostId,
    session_id: SessionId,
    pane_id: String,
}

/// Registry of active console subscriptions, keyed by `subscription_id`.
#[derive(Default)]
pub struct ConsoleSubscriptionManager {
    subscriptions: RwLock<HashMap<Uuid, ConsoleSubscription>>,
}

impl ConsoleSubscriptionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new subscription, returning the push frame to send to the
    /// owning agent immediately.
    pub async fn subscribe(
        &self,
        subscription_id: Uuid,
        host_id: HostId,
        session_id: SessionId,
        pane_id: String,
    ) -> ServerToAgentMessage {
        let push = ConsoleSubscribePush { subscription_id, session_id, pane_id: pane_id.clone() };
        self.subscriptions.write().await.insert(subscription_id, ConsoleSubscription { host_id, session_id, pane_id });
        ServerToAgentMessage::ConsoleSubscribe(push)
    }

    pub async fn unsubscribe(&self, subscription_id: Uuid) {
        self.subscriptions.write().await.remove(&subscription_id);
    }

    /// Drop every subscription belonging to a UI connection that disconnected
    /// without explicitly unsubscribing.
    pub async fn unsubscribe_all(&self, subscription_ids: &[Uuid]) {
        let mut subs = self.subscriptions.write().await;
        for id in subscription_ids {
            subs.remove(id);
        }
    }

    /// Build the replay frames for every subscription currently pointed at
    /// `host_id` — called once the host's `agent.hello` handshake completes.
    pub async fn replay_frames_for_host(&self, host_id: &str) -> Vec<ServerToAgentMessage> {
        self.subscriptions
            .read()
            .await
            .iter()
            .filter(|(_, sub)| sub.host_id == host_id)
            .map(|(subscription_id, sub)| {
                ServerToAgentMessage::ConsoleSubscribe(ConsoleSubscribePush {
                    subscription_id: *subscription_id,
                    session_id: sub.session_id,
                    pane_id: sub.pane_id.clone(),
                })
            })
            .collect()
    }
}

pub type SharedConsoleSubscriptionManager = Arc<ConsoleSubscriptionManager>;

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "console_tests.rs"]
mod tests;
