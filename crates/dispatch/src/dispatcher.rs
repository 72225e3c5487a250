// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command dispatcher (spec §4.4): allocates a monotonic `cmd_id`, sends a
//! `commands.dispatch` frame to the owning agent, and correlates the
//! eventual `commands.result` reply back to whoever is waiting on it.

use std::sync::Arc;
use std::time::Duration;

use agent_commander_bus::Bus;
use agent_commander_store::Store;
use agent_commander_types::error::CommanderError;
use agent_commander_types::ids::{CommandId, HostId, SessionId, HOST_LEVEL_SESSION_ID};
use agent_commander_types::protocol::agent::{CommandsDispatch, ServerToAgentMessage};
use agent_commander_types::protocol::command::CommandsResultBody;
use agent_commander_types::session::Provider;
use chrono::Utc;
use ulid::Ulid;

use crate::pending::{PendingResultTable, DEFAULT_COMMAND_TIMEOUT, HOST_LEVEL_COMMAND_TIMEOUT};

/// Event type recorded for a completed command (spec §4.10, §8's
/// idempotence law — one audit row per dispatched `cmd_id`).
pub const EVENT_TYPE_COMMAND_COMPLETED: &str = "command.completed";

#[derive(Clone)]
pub struct CommandDispatcher {
    bus: Arc<Bus>,
    store: Arc<Store>,
    pending: Arc<PendingResultTable>,
}

impl CommandDispatcher {
    pub fn new(bus: Arc<Bus>, store: Arc<Store>) -> Self {
        Self { bus, store, pending: PendingResultTable::new() }
    }

    fn timeout_for(session_id: SessionId) -> Duration {
        if session_id == HOST_LEVEL_SESSION_ID {
            HOST_LEVEL_COMMAND_TIMEOUT
        } else {
            DEFAULT_COMMAND_TIMEOUT
        }
    }

    /// Register, send, and await one command, without spawning any
    /// background persistence. Used by callers (cross-host copy) that need
    /// the actual result synchronously to build a follow-up command.
    pub async fn dispatch_and_wait(
        &self,
        host_id: &HostId,
        session_id: SessionId,
        command: serde_json::Value,
        timeout: Duration,
    ) -> Result<CommandsResultBody, CommanderError> {
        let cmd_id = Ulid::new().to_string();
        let rx = self.pending.register(cmd_id.clone()).await;

        let frame = ServerToAgentMessage::CommandsDispatch(CommandsDispatch { cmd_id: cmd_id.clone(), session_id, command });
        if let Err(err) = self.bus.send_to_agent(host_id, frame).await {
            self.pending.cancel(&cmd_id).await;
            return Err(err);
        }

        self.pending.await_result(&cmd_id, rx, timeout).await
    }

    /// Fire-and-forget dispatch for `POST /sessions/:id/commands` (spec §6.4
    /// scenario 3): returns `cmd_id` immediately; the eventual result is
    /// persisted as a `command.completed` event in the background.
    pub async fn dispatch(
        &self,
        host_id: &HostId,
        session_id: SessionId,
        command: serde_json::Value,
        provider: Provider,
    ) -> Result<CommandId, CommanderError> {
        let cmd_id = Ulid::new().to_string();
        let rx = self.pending.register(cmd_id.clone()).await;

        let frame =
            ServerToAgentMessage::CommandsDispatch(CommandsDispatch { cmd_id: cmd_id.clone(), session_id, command: command.clone() });
        if let Err(err) = self.bus.send_to_agent(host_id, frame).await {
            self.pending.cancel(&cmd_id).await;
            return Err(err);
        }

        self.store
            .audit_logs
            .record(Utc::now(), "dispatcher", "command.dispatch", Some(session_id), Some(host_id), Some(&command))
            .await
            .map_err(CommanderError::from)?;

        let timeout = Self::timeout_for(session_id);
        let pending = Arc::clone(&self.pending);
        let store = Arc::clone(&self.store);
        let awaited_cmd_id = cmd_id.clone();
        tokio::spawn(async move {
            let outcome = pending.await_result(&awaited_cmd_id, rx, timeout).await;
            if session_id == HOST_LEVEL_SESSION_ID {
                // Host-level commands are never persisted as a session event.
                return;
            }
            let payload = match outcome {
                Ok(result) => serde_json::json!({
                    "cmd_id": awaited_cmd_id,
                    "ok": result.ok,
                    "result": result.result,
                    "error": result.error,
                }),
                Err(_) => serde_json::json!({ "cmd_id": awaited_cmd_id, "ok": false, "error": "timed out" }),
            };
            let append = agent_commander_types::event::EventAppend {
                event_id: None,
                ts: Utc::now(),
                event_type: EVENT_TYPE_COMMAND_COMPLETED.to_owned(),
                payload,
            };
            if let Err(err) = store.events.append_batch(session_id, vec![append]).await {
                tracing::warn!(%session_id, %err, "failed to persist command.completed event");
            }
        });

        Ok(cmd_id)
    }

    /// Resolve a pending entry from an agent's `commands.result` reply.
    /// Called by the agent-session handler for `commands.result` frames.
    pub async fn complete(&self, result: CommandsResultBody) -> bool {
        self.pending.resolve(result).await
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
