// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal proxy (spec §4.5, §6.3). At most one live terminal channel per
//! session id; opening a second evicts the first with `terminal.detached`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use agent_commander_types::ids::{HostId, SessionId};
use agent_commander_types::protocol::agent::{
    ServerToAgentMessage, TerminalAttachPush, TerminalControlPush, TerminalDetachPush, TerminalInputPush,
    TerminalResizePush,
};
use axum::extract::ws::{CloseFrame, Message, WebSocket};
use axum::extract::{Path, Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::auth::Role;
use crate::state::ServerState;

struct TerminalChannel {
    channel_id: Uuid,
    host_id: HostId,
    ui_tx: mpsc::Sender<Message>,
}

/// Process-wide table of live terminal channels, keyed by session id.
#[derive(Default)]
pub struct TerminalChannelTable {
    channels: RwLock<HashMap<SessionId, TerminalChannel>>,
}

impl TerminalChannelTable {
    /// Register a new channel for `session_id`, evicting and returning any
    /// channel it replaces so the caller can notify the displaced UI.
    async fn attach(&self, session_id: SessionId, channel_id: Uuid, host_id: HostId, ui_tx: mpsc::Sender<Message>) -> Option<mpsc::Sender<Message>> {
        let mut channels = self.channels.write().await;
        let evicted = channels.insert(session_id, TerminalChannel { channel_id, host_id, ui_tx });
        evicted.map(|c| c.ui_tx)
    }

    /// Remove the channel for `session_id` only if `channel_id` is still the
    /// live one (a stale teardown from an already-replaced channel is a
    /// no-op).
    async fn remove_if_current(&self, session_id: SessionId, channel_id: Uuid) {
        let mut channels = self.channels.write().await;
        if channels.get(&session_id).is_some_and(|c| c.channel_id == channel_id) {
            channels.remove(&session_id);
        }
    }

    /// Forward a frame to whichever UI currently owns `channel_id`, if any.
    pub async fn forward_by_channel_id(&self, channel_id: Uuid, message: Message) {
        let sender = {
            let channels = self.channels.read().await;
            channels.values().find(|c| c.channel_id == channel_id).map(|c| c.ui_tx.clone())
        };
        if let Some(sender) = sender {
            let _ = sender.send(message).await;
        }
    }

    /// Remove whichever session entry currently holds `channel_id`, if any.
    /// Used when tearing down from the agent side, which only knows the
    /// channel id, not the session id it was opened for.
    async fn remove_by_channel_id(&self, channel_id: Uuid) {
        let mut channels = self.channels.write().await;
        channels.retain(|_, c| c.channel_id != channel_id);
    }
}

#[derive(Debug, Deserialize)]
pub struct TerminalQuery {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TerminalClientFrame {
    Input { data: String },
    Resize { cols: u16, rows: u16 },
    Control { #[serde(default)] data: serde_json::Value },
    Detach,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TerminalServerFrame<'a> {
    Output { data: &'a str, #[serde(skip_serializing_if = "Option::is_none")] encoding: Option<&'a str> },
    Attached { #[serde(skip_serializing_if = "Option::is_none")] message: Option<&'a str> },
    Detached { #[serde(skip_serializing_if = "Option::is_none")] message: Option<&'a str> },
    Error { #[serde(skip_serializing_if = "Option::is_none")] message: Option<&'a str> },
    Readonly { #[serde(skip_serializing_if = "Option::is_none")] message: Option<&'a str> },
    Control { #[serde(skip_serializing_if = "Option::is_none")] message: Option<&'a str> },
    IdleTimeout,
}

fn close_with(code: u16, reason: &'static str) -> Message {
    Message::Close(Some(CloseFrame { code, reason: reason.into() }))
}

/// `GET /v1/ui/terminal/:session_id` — WebSocket upgrade for the terminal proxy.
pub async fn terminal_ws_handler(
    State(state): State<Arc<ServerState>>,
    Path(session_id_raw): Path<String>,
    Query(query): Query<TerminalQuery>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_terminal_connection(state, session_id_raw, query.token, socket))
}

async fn handle_terminal_connection(state: Arc<ServerState>, session_id_raw: String, token: Option<String>, mut socket: WebSocket) {
    let Ok(session_id) = session_id_raw.parse::<SessionId>() else {
        let _ = socket.send(close_with(4001, "invalid session id")).await;
        return;
    };

    let Some(token) = token else {
        let _ = socket.send(close_with(4002, "missing token")).await;
        return;
    };

    let Some(principal) = state.token_resolver.resolve(&token).await else {
        let _ = socket.send(close_with(4003, "invalid token")).await;
        return;
    };
    if principal.role < Role::Operator {
        let _ = socket.send(close_with(4003, "invalid token")).await;
        return;
    }

    let session = match state.store.sessions.get(session_id).await {
        Ok(session) => session,
        Err(_) => {
            let _ = socket.send(close_with(4004, "session not found")).await;
            return;
        }
    };

    let Some(pane_id) = session.tmux_pane_id.clone() else {
        let _ = socket.send(close_with(4005, "no pane")).await;
        return;
    };

    if !state.bus.agents.is_connected(&session.host_id).await {
        let _ = socket.send(close_with(4006, "agent not connected")).await;
        return;
    }

    let channel_id = Uuid::new_v4();
    let host_id = session.host_id.clone();
    let (ui_tx, mut ui_rx) = mpsc::channel::<Message>(64);

    if let Some(evicted_tx) = state.terminal_channels.attach(session_id, channel_id, host_id.clone(), ui_tx).await {
        let frame = TerminalServerFrame::Detached { message: Some("Replaced by a new terminal viewer") };
        if let Ok(json) = serde_json::to_string(&frame) {
            let _ = evicted_tx.send(Message::Text(json.into())).await;
        }
        let _ = evicted_tx.send(Message::Close(None)).await;
    }

    let attach_push = ServerToAgentMessage::TerminalAttach(TerminalAttachPush { channel_id, session_id, pane_id });
    if let Err(err) = state.bus.send_to_agent(&host_id, attach_push).await {
        debug!(%session_id, %err, "terminal attach dispatch failed");
        state.terminal_channels.remove_if_current(session_id, channel_id).await;
        let _ = socket.send(close_with(4007, "attach failed")).await;
        return;
    }

    let (mut ws_tx, mut ws_rx) = socket.split();
    let idle_timeout = state.config.terminal_idle_timeout();

    loop {
        tokio::select! {
            _ = tokio::time::sleep(idle_timeout) => {
                let frame = TerminalServerFrame::IdleTimeout;
                if let Ok(json) = serde_json::to_string(&frame) {
                    let _ = ws_tx.send(Message::Text(json.into())).await;
                }
                break;
            }
            forwarded = ui_rx.recv() => {
                match forwarded {
                    Some(message) => {
                        let is_close = matches!(message, Message::Close(_));
                        if ws_tx.send(message).await.is_err() || is_close {
                            break;
                        }
                    }
                    None => break,
                }
            }
            incoming = ws_rx.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if !forward_client_frame(&state, &host_id, session_id, channel_id, &text).await {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    state.terminal_channels.remove_if_current(session_id, channel_id).await;
    let detach_push = ServerToAgentMessage::TerminalDetach(TerminalDetachPush { channel_id, reason: Some("ui_closed".to_owned()) });
    let _ = state.bus.send_to_agent(&host_id, detach_push).await;
}

/// Parse one UI→server discriminated frame and forward it to the owning
/// agent. Returns `false` if the connection should be torn down (explicit
/// `detach`).
async fn forward_client_frame(state: &ServerState, host_id: &HostId, session_id: SessionId, channel_id: Uuid, text: &str) -> bool {
    let Ok(frame) = serde_json::from_str::<TerminalClientFrame>(text) else {
        return true;
    };
    let push = match frame {
        TerminalClientFrame::Input { data } => ServerToAgentMessage::TerminalInput(TerminalInputPush { channel_id, data }),
        TerminalClientFrame::Resize { cols, rows } => ServerToAgentMessage::TerminalResize(TerminalResizePush { channel_id, cols, rows }),
        TerminalClientFrame::Control { data } => ServerToAgentMessage::TerminalControl(TerminalControlPush { channel_id, data }),
        TerminalClientFrame::Detach => {
            let _ = state.bus.send_to_agent(host_id, ServerToAgentMessage::TerminalDetach(TerminalDetachPush { channel_id, reason: None })).await;
            return false;
        }
    };
    let _ = state.bus.send_to_agent(host_id, push).await;
    true
}

/// Called from the agent WebSocket handler for `terminal.output` frames.
pub async fn relay_output(state: &ServerState, channel_id: Uuid, data: &str, encoding: Option<&str>) {
    let frame = TerminalServerFrame::Output { data, encoding };
    if let Ok(json) = serde_json::to_string(&frame) {
        state.terminal_channels.forward_by_channel_id(channel_id, Message::Text(json.into())).await;
    }
}

/// Called from the agent WebSocket handler for `terminal.{attached,detached,error,readonly,control}`.
/// `detached`/`error` additionally tear down the channel (spec §4.5).
pub async fn relay_status(state: &ServerState, channel_id: Uuid, status: &str, message: Option<&str>) {
    let frame = match status {
        "attached" => TerminalServerFrame::Attached { message },
        "detached" => TerminalServerFrame::Detached { message },
        "error" => TerminalServerFrame::Error { message },
        "readonly" => TerminalServerFrame::Readonly { message },
        _ => TerminalServerFrame::Control { message },
    };
    if let Ok(json) = serde_json::to_string(&frame) {
        state.terminal_channels.forward_by_channel_id(channel_id, Message::Text(json.into())).await;
    }
    if matches!(status, "detached" | "error") {
        state.terminal_channels.forward_by_channel_id(channel_id, Message::Close(None)).await;
        state.terminal_channels.remove_by_channel_id(channel_id).await;
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "terminal_tests.rs"]
mod tests;
