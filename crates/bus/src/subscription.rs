// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-connection subscription state for a UI WebSocket client. Each
//! `/v1/ui/ws` connection owns one of these; it is local to that connection
//! (not shared in the registry) because narrowing happens at receive time,
//! mirroring the aggregated-mux filter-at-the-edge design.

use std::collections::HashMap;

use agent_commander_types::protocol::ui::{ServerToUiMessage, SessionsChanged, TopicFilter, TopicKind, TopicSubscription};

use crate::filter;

#[derive(Default)]
pub struct UiSubscriptionState {
    topics: HashMap<TopicKind, Option<TopicFilter>>,
}

impl UiSubscriptionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a `ui.subscribe` frame — replaces any existing filter for a
    /// topic already subscribed, adds new topics, leaves others untouched.
    pub fn subscribe(&mut self, topics: Vec<TopicSubscription>) {
        for topic in topics {
            self.topics.insert(topic.kind, topic.filter);
        }
    }

    pub fn unsubscribe_topic(&mut self, kind: TopicKind) {
        self.topics.remove(&kind);
    }

    pub fn is_subscribed(&self, kind: TopicKind) -> bool {
        self.topics.contains_key(&kind)
    }

    /// Narrow a broadcast frame to what this subscriber is entitled to see.
    /// Returns `None` when the subscriber isn't on this topic at all, or
    /// (for collection frames) when filtering leaves nothing to report.
    pub fn narrow(&self, message: &ServerToUiMessage) -> Option<ServerToUiMessage> {
        let kind = message.topic_kind();
        let filter = self.topics.get(&kind)?;

        match message {
            ServerToUiMessage::SessionsChanged(changed) => {
                let sessions: Vec<_> =
                    changed.sessions.iter().filter(|s| filter::matches_session(filter.as_ref(), s)).cloned().collect();
                let deleted: Vec<_> = changed
                    .deleted
                    .iter()
                    .copied()
                    .filter(|id| filter::matches_session_id(filter.as_ref(), *id))
                    .collect();
                if sessions.is_empty() && deleted.is_empty() {
                    None
                } else {
                    Some(ServerToUiMessage::SessionsChanged(SessionsChanged { sessions, deleted }))
                }
            }
            ServerToUiMessage::ApprovalsCreated(a) | ServerToUiMessage::ApprovalsUpdated(a) => {
                filter::matches_approval(filter.as_ref(), a).then(|| message.clone())
            }
            ServerToUiMessage::EventsAppended(e) => filter::matches_event(filter.as_ref(), e).then(|| message.clone()),
            ServerToUiMessage::ConsoleChunk(c) => {
                filter::matches_console(filter.as_ref(), c.session_id).then(|| message.clone())
            }
            ServerToUiMessage::SnapshotsUpdated(s) => {
                filter::matches_snapshot(filter.as_ref(), s).then(|| message.clone())
            }
            ServerToUiMessage::ToolEventStarted(t) | ServerToUiMessage::ToolEventCompleted(t) => {
                filter::matches_tool_event(filter.as_ref(), t).then(|| message.clone())
            }
            ServerToUiMessage::SessionUsageUpdated(u) => {
                filter::matches_console(filter.as_ref(), u.session_id).then(|| message.clone())
            }
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "subscription_tests.rs"]
mod tests;
