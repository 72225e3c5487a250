// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory pending-command table (spec §3's `CommandResultPromise`, §4.4,
//! §5). Never persisted: an agent disconnect does not cancel an entry, it
//! simply never resolves and the timer fires `CommandTimedOut` (spec §5 —
//! "Agent close does not cancel pending command promises").

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use agent_commander_types::error::CommanderError;
use agent_commander_types::ids::CommandId;
use agent_commander_types::protocol::command::CommandsResultBody;
use tokio::sync::{oneshot, Mutex};

/// Default timeout for a session-scoped command (spec §4.4).
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);
/// Timeout for host-level commands (directory listing, adopt-panes).
pub const HOST_LEVEL_COMMAND_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Default)]
pub struct PendingResultTable {
    inner: Mutex<HashMap<CommandId, oneshot::Sender<CommandsResultBody>>>,
}

impl PendingResultTable {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a waiter for `cmd_id` before the command is actually sent,
    /// so a reply racing the send can never be dropped.
    pub async fn register(&self, cmd_id: CommandId) -> oneshot::Receiver<CommandsResultBody> {
        let (tx, rx) = oneshot::channel();
        self.inner.lock().await.insert(cmd_id, tx);
        rx
    }

    /// Drop a registration without resolving it — used when the send to
    /// the agent itself failed (`AgentUnavailable`), so the entry never
    /// lingers until its timeout.
    pub async fn cancel(&self, cmd_id: &str) {
        self.inner.lock().await.remove(cmd_id);
    }

    /// Await a previously `register`ed receiver for up to `timeout`,
    /// cleaning up the table entry regardless of outcome.
    pub async fn await_result(
        &self,
        cmd_id: &str,
        rx: oneshot::Receiver<CommandsResultBody>,
        timeout: Duration,
    ) -> Result<CommandsResultBody, CommanderError> {
        let outcome = tokio::time::timeout(timeout, rx).await;
        self.cancel(cmd_id).await;
        match outcome {
            Ok(Ok(body)) => Ok(body),
            Ok(Err(_)) | Err(_) => Err(CommanderError::CommandTimedOut),
        }
    }

    /// Resolve a pending entry from an agent's `commands.result` frame.
    /// Returns `true` if a waiter was actually registered for this id — a
    /// stray or already-timed-out `cmd_id` resolves to `false` without
    /// error; the agent is still acked `ok` either way.
    pub async fn resolve(&self, result: CommandsResultBody) -> bool {
        if let Some(tx) = self.inner.lock().await.remove(&result.cmd_id) {
            tx.send(result).is_ok()
        } else {
            false
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "pending_tests.rs"]
mod tests;
