// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-host copy orchestrator (spec §4.4): captures text from a source
//! session and injects it as input into a target session, bridging hosts
//! when the two sessions don't share one.

use std::time::Duration;

use agent_commander_store::Store;
use agent_commander_types::ansi::strip_ansi;
use agent_commander_types::error::CommanderError;
use agent_commander_types::protocol::command::CopyToRequest;
use agent_commander_types::session::Session;
use agent_commander_types::SessionId;

use crate::dispatcher::CommandDispatcher;
use crate::pending::DEFAULT_COMMAND_TIMEOUT;

/// Separator the spec's combined-text algorithm inserts between
/// `prepend_text` / captured content / `append_text`, omitted on whichever
/// side is empty (spec §4.4, §8 boundary behavior).
const SEPARATOR: &str = "\n\n---\n\n";

pub struct CrossHostCopy {
    dispatcher: CommandDispatcher,
    store: std::sync::Arc<Store>,
}

impl CrossHostCopy {
    pub fn new(dispatcher: CommandDispatcher, store: std::sync::Arc<Store>) -> Self {
        Self { dispatcher, store }
    }

    pub async fn execute(&self, source_id: SessionId, request: &CopyToRequest) -> Result<(), CommanderError> {
        let source = self.store.sessions.get(source_id).await.map_err(CommanderError::from)?;
        let target = self.store.sessions.get(request.target_session_id).await.map_err(CommanderError::from)?;

        if source.host_id == target.host_id {
            self.copy_same_host(&source, &target, request).await
        } else {
            self.copy_cross_host(&source, &target, request).await
        }
    }

    /// Both sessions share a host: the agent handles the whole thing as one
    /// local operation.
    async fn copy_same_host(&self, source: &Session, target: &Session, request: &CopyToRequest) -> Result<(), CommanderError> {
        let command = serde_json::json!({
            "type": "copy_to_session",
            "payload": {
                "source_session_id": source.id,
                "target_session_id": target.id,
                "mode": request.mode,
                "line_start": request.line_start,
                "line_end": request.line_end,
                "last_n_lines": request.last_n_lines,
                "strip_ansi": request.strip_ansi,
                "prepend_text": request.prepend_text,
                "append_text": request.append_text,
            },
        });
        self.dispatcher
            .dispatch_and_wait(&source.host_id, source.id, command, DEFAULT_COMMAND_TIMEOUT)
            .await
            .and_then(|result| if result.ok { Ok(()) } else { Err(CommanderError::InternalError) })
    }

    /// Sessions live on different hosts: capture on the source host first
    /// (leg 1), then send the decorated text as input on the target host
    /// (leg 2). Each leg has its own `cmd_id` and timeout; a leg-1 failure
    /// surfaces as a source error without ever attempting leg 2.
    async fn copy_cross_host(&self, source: &Session, target: &Session, request: &CopyToRequest) -> Result<(), CommanderError> {
        let capture_command = serde_json::json!({
            "type": "capture_pane",
            "payload": {
                "mode": request.mode,
                "line_start": request.line_start,
                "line_end": request.line_end,
                "last_n_lines": request.last_n_lines,
            },
        });
        let capture_result = self
            .dispatcher
            .dispatch_and_wait(&source.host_id, source.id, capture_command, DEFAULT_COMMAND_TIMEOUT)
            .await?;
        if !capture_result.ok {
            return Err(CommanderError::InternalError);
        }
        let mut captured = capture_result
            .result
            .as_ref()
            .and_then(|v| v.get("text"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_owned();
        if request.strip_ansi {
            captured = strip_ansi(&captured);
        }

        let combined = combine(request.prepend_text.as_deref(), &captured, request.append_text.as_deref());

        let send_input_command = serde_json::json!({
            "type": "send_input",
            "payload": { "text": combined, "enter": true },
        });
        let send_timeout = Duration::from_secs(30);
        let send_result = self.dispatcher.dispatch_and_wait(&target.host_id, target.id, send_input_command, send_timeout).await?;
        if send_result.ok {
            Ok(())
        } else {
            Err(CommanderError::InternalError)
        }
    }
}

/// Concatenate `prepend + SEPARATOR + captured + SEPARATOR + append`,
/// dropping a separator on whichever side is empty (spec §4.4, §8).
fn combine(prepend: Option<&str>, captured: &str, append: Option<&str>) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(3);
    if let Some(p) = prepend.filter(|s| !s.is_empty()) {
        parts.push(p);
    }
    parts.push(captured);
    if let Some(a) = append.filter(|s| !s.is_empty()) {
        parts.push(a);
    }
    parts.join(SEPARATOR)
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "copy_tests.rs"]
mod tests;
