// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent WebSocket session (spec §4.2, §6.1). One connection per host;
//! `agent.hello` must be the first frame. Every later frame carries a
//! strictly increasing `seq` and is acked, idempotently, against
//! `last_processed_seq`.

use std::sync::Arc;

use agent_commander_types::event::event_type;
use agent_commander_types::ids::{GroupId, HostId, SessionId};
use agent_commander_types::protocol::agent::{
    AckStatus, AgentAck, AgentEnvelope, AgentHello, AgentMessage, ApprovalKindHint, CommandsResult, ConsoleChunk,
    ServerToAgentMessage, SessionUpsert, TerminalStatusPayload,
};
use agent_commander_types::protocol::command::CommandsResultBody;
use agent_commander_types::protocol::ui::{ConsoleChunkOut, ServerToUiMessage, SessionUsageUpdated, SessionsChanged};
use agent_commander_types::snapshot::Snapshot;
use agent_commander_types::{Approval, Session};
use axum::extract::ws::{CloseFrame, Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use chrono::Utc;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::auth::bearer_token;
use crate::state::ServerState;
use crate::terminal;

fn close_with(code: u16, reason: &'static str) -> Message {
    Message::Close(Some(CloseFrame { code, reason: reason.into() }))
}

/// `GET /v1/agent/connect` — WebSocket upgrade for the agent protocol.
pub async fn agent_ws_handler(State(state): State<Arc<ServerState>>, headers: HeaderMap, ws: WebSocketUpgrade) -> impl IntoResponse {
    let token = bearer_token(&headers).map(str::to_owned);
    ws.on_upgrade(move |socket| handle_agent_connection(state, token, socket))
}

async fn handle_agent_connection(state: Arc<ServerState>, token: Option<String>, mut socket: WebSocket) {
    let Some(token) = token else {
        let _ = socket.send(close_with(4001, "missing token")).await;
        return;
    };

    let claimed_host_id = match state.store.agent_tokens.resolve(&token).await {
        Ok(Some(host_id)) => host_id,
        Ok(None) => {
            let _ = socket.send(close_with(4003, "invalid token")).await;
            return;
        }
        Err(err) => {
            warn!(%err, "agent token resolution failed");
            let _ = socket.send(close_with(4003, "invalid token")).await;
            return;
        }
    };

    let (ws_tx_channel, mut ws_rx_channel) = mpsc::channel::<ServerToAgentMessage>(256);
    let (mut ws_tx, mut ws_rx) = socket.split();

    let mut host_id: Option<HostId> = None;
    let mut last_processed_seq: u64 = 0;

    loop {
        tokio::select! {
            outbound = ws_rx_channel.recv() => {
                match outbound {
                    Some(frame) => {
                        if let Ok(json) = serde_json::to_string(&frame) {
                            if ws_tx.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                    None => break,
                }
            }
            incoming = ws_rx.next() => {
                let text = match incoming {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => continue,
                };

                let envelope: AgentEnvelope = match serde_json::from_str(&text) {
                    Ok(e) => e,
                    Err(_) => {
                        let ack = ServerToAgentMessage::Ack(AgentAck { ack_seq: 0, status: AckStatus::Error, error: Some("Invalid message format".to_owned()) });
                        if let Ok(json) = serde_json::to_string(&ack) {
                            if ws_tx.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                        continue;
                    }
                };

                if host_id.is_none() {
                    let AgentMessage::AgentHello(hello) = &envelope.message else {
                        let _ = ws_tx.send(close_with(4003, "first message must be agent.hello")).await;
                        break;
                    };
                    if hello.host.id != claimed_host_id {
                        let _ = ws_tx.send(close_with(4003, "host id mismatch")).await;
                        break;
                    }

                    let existing_last_acked = state.store.hosts.get(&claimed_host_id).await.map(|h| h.last_acked_seq).unwrap_or(0);
                    last_processed_seq = existing_last_acked.max(hello.resume.last_acked_seq.unwrap_or(0));

                    if envelope.seq <= last_processed_seq {
                        send_ack(&mut ws_tx, envelope.seq, Ok(())).await;
                        continue;
                    }

                    if let Err(err) = apply_hello(&state, hello).await {
                        warn!(%err, host_id = %claimed_host_id, "agent hello failed");
                        send_ack(&mut ws_tx, envelope.seq, Err(err)).await;
                        last_processed_seq = envelope.seq;
                        continue;
                    }

                    host_id = Some(claimed_host_id.clone());
                    state.bus.agents.register(claimed_host_id.clone(), ws_tx_channel.clone()).await;
                    for frame in state.bus.console_subscriptions.replay_frames_for_host(&claimed_host_id).await {
                        let _ = ws_tx_channel.send(frame).await;
                    }

                    last_processed_seq = envelope.seq;
                    let _ = state.store.hosts.record_ack(&claimed_host_id, last_processed_seq).await;
                    send_ack(&mut ws_tx, envelope.seq, Ok(())).await;
                    continue;
                }

                let Some(host_id_ref) = host_id.as_ref() else {
                    continue;
                };

                if envelope.seq <= last_processed_seq {
                    send_ack(&mut ws_tx, envelope.seq, Ok(())).await;
                    continue;
                }

                let outcome = handle_message(&state, host_id_ref, envelope.message, envelope.ts).await;
                last_processed_seq = envelope.seq;
                let _ = state.store.hosts.record_ack(host_id_ref, last_processed_seq).await;
                send_ack(&mut ws_tx, envelope.seq, outcome).await;
            }
        }
    }

    if let Some(host_id) = host_id {
        state.bus.agents.unregister(&host_id).await;
    }
}

async fn send_ack(ws_tx: &mut SplitSink<WebSocket, Message>, seq: u64, outcome: Result<(), String>) {
    let ack = match outcome {
        Ok(()) => AgentAck { ack_seq: seq, status: AckStatus::Ok, error: None },
        Err(error) => AgentAck { ack_seq: seq, status: AckStatus::Error, error: Some(error) },
    };
    if let Ok(json) = serde_json::to_string(&ServerToAgentMessage::Ack(ack)) {
        let _ = ws_tx.send(Message::Text(json.into())).await;
    }
}

async fn apply_hello(state: &ServerState, hello: &AgentHello) -> Result<(), String> {
    state
        .store
        .hosts
        .upsert(
            &hello.host.id,
            &hello.host.name,
            hello.host.network_name.as_deref(),
            hello.host.network_ip.as_deref(),
            &hello.host.capabilities,
            hello.host.agent_version.as_deref(),
            Utc::now(),
        )
        .await
        .map_err(|err| err.to_string())
}

/// Dispatch table for every agent→server message type once the connection
/// is past its handshake (spec §4.2's dispatch table, minus `agent.hello`
/// which is handled entirely during the handshake above).
async fn handle_message(state: &ServerState, host_id: &HostId, message: AgentMessage, ts: chrono::DateTime<Utc>) -> Result<(), String> {
    match message {
        AgentMessage::AgentHello(hello) => apply_hello(state, &hello).await,
        AgentMessage::SessionsUpsert(body) => handle_sessions_upsert(state, host_id, body.sessions).await,
        AgentMessage::SessionsPrune(body) => handle_sessions_prune(state, host_id, body.session_ids).await,
        AgentMessage::SessionsSnapshot(body) => {
            let snapshot = Snapshot::new(body.session_id, body.capture_text, ts);
            state.store.snapshots.upsert(&snapshot).await.map_err(|e| e.to_string())?;
            state.bus.publish(ServerToUiMessage::SnapshotsUpdated(snapshot));
            Ok(())
        }
        AgentMessage::EventsAppend(body) => handle_events_append(state, body.session_id, body.events).await,
        AgentMessage::CommandsResult(body) => {
            handle_commands_result(state, body).await;
            Ok(())
        }
        AgentMessage::ConsoleChunk(chunk) => {
            handle_console_chunk(state, chunk);
            Ok(())
        }
        AgentMessage::TerminalOutput(out) => {
            terminal::relay_output(state, out.channel_id, &out.data, out.encoding.as_deref()).await;
            Ok(())
        }
        AgentMessage::TerminalAttached(status) => {
            relay_terminal_status(state, "attached", status).await;
            Ok(())
        }
        AgentMessage::TerminalDetached(status) => {
            relay_terminal_status(state, "detached", status).await;
            Ok(())
        }
        AgentMessage::TerminalError(status) => {
            relay_terminal_status(state, "error", status).await;
            Ok(())
        }
        AgentMessage::TerminalReadonly(status) => {
            relay_terminal_status(state, "readonly", status).await;
            Ok(())
        }
        AgentMessage::TerminalControl(status) => {
            relay_terminal_status(state, "control", status).await;
            Ok(())
        }
        AgentMessage::ToolEventStarted(started) => {
            let session = state.store.sessions.get(started.session_id).await.map_err(|e| e.to_string())?;
            state
                .store
                .tool_events
                .started(started.event_id, started.session_id, session.provider, &started.tool_name, started.tool_input.as_ref(), started.started_at)
                .await
                .map_err(|e| e.to_string())?;
            let tool_event = state.store.tool_events.get(started.event_id).await.map_err(|e| e.to_string())?;
            state.bus.publish(ServerToUiMessage::ToolEventStarted(tool_event));
            Ok(())
        }
        AgentMessage::ToolEventCompleted(completed) => {
            state
                .store
                .tool_events
                .completed(completed.event_id, completed.tool_output.as_ref(), completed.success, completed.completed_at)
                .await
                .map_err(|e| e.to_string())?;
            let tool_event = state.store.tool_events.get(completed.event_id).await.map_err(|e| e.to_string())?;
            state.bus.publish(ServerToUiMessage::ToolEventCompleted(tool_event));
            Ok(())
        }
        AgentMessage::ProviderUsage(usage) => {
            state.store.usage.record(&usage).await.map_err(|e| e.to_string())?;
            let totals = state.store.usage.totals(usage.session_id).await.map_err(|e| e.to_string())?;
            state.bus.publish(ServerToUiMessage::SessionUsageUpdated(SessionUsageUpdated { session_id: usage.session_id, totals }));
            Ok(())
        }
        AgentMessage::SessionUsage(report) => {
            state.bus.publish(ServerToUiMessage::SessionUsageUpdated(SessionUsageUpdated { session_id: report.session_id, totals: report.totals }));
            Ok(())
        }
        AgentMessage::Mcp(_) => Ok(()),
    }
}

async fn relay_terminal_status(state: &ServerState, status: &str, payload: TerminalStatusPayload) {
    terminal::relay_status(state, payload.channel_id, status, payload.message.as_deref()).await;
}

async fn resolve_group(
    state: &ServerState,
    host_id: &HostId,
    upsert: &SessionUpsert,
    existing: Option<&Session>,
) -> Result<Option<GroupId>, String> {
    // Auto-grouping only applies to a session's first upsert (spec §4.3):
    // once a session already exists, its group is left alone so a later
    // operator reassignment via bulk assign_group isn't clobbered.
    if existing.is_some_and(|s| s.group_id.is_some()) {
        return Ok(None);
    }
    let Some(session_name) = upsert.metadata.tmux.session_name.as_deref() else {
        return Ok(None);
    };
    state.store.groups.resolve_or_create(host_id, session_name).await.map(Some).map_err(|e| e.to_string())
}

async fn handle_sessions_upsert(state: &ServerState, host_id: &HostId, sessions: Vec<SessionUpsert>) -> Result<(), String> {
    let now = Utc::now();
    let mut changed = Vec::with_capacity(sessions.len());
    for mut upsert in sessions {
        let existing = state.store.sessions.get(upsert.id).await.ok();
        // Archived sessions are terminal: a trailing upsert may still land
        // (trailing events are expected), but it must not resurrect status.
        if let Some(existing) = &existing {
            if existing.is_archived() {
                upsert.status = existing.status;
            }
        }
        let group_id = resolve_group(state, host_id, &upsert, existing.as_ref()).await?;
        state.store.sessions.upsert(host_id, &upsert, group_id, now).await.map_err(|e| e.to_string())?;
        let session = state.store.sessions.get(upsert.id).await.map_err(|e| e.to_string())?;
        changed.push(session);
    }
    if !changed.is_empty() {
        state.bus.publish(ServerToUiMessage::SessionsChanged(SessionsChanged { sessions: changed, deleted: Vec::new() }));
    }
    Ok(())
}

async fn handle_sessions_prune(state: &ServerState, host_id: &HostId, session_ids: Vec<SessionId>) -> Result<(), String> {
    let pruned = state.store.sessions.prune(host_id, &session_ids).await.map_err(|e| e.to_string())?;
    if !pruned.is_empty() {
        state.bus.publish(ServerToUiMessage::SessionsChanged(SessionsChanged { sessions: Vec::new(), deleted: pruned }));
    }
    Ok(())
}

async fn handle_events_append(state: &ServerState, session_id: SessionId, events: Vec<agent_commander_types::EventAppend>) -> Result<(), String> {
    let appended = state.store.events.append_batch(session_id, events).await.map_err(|e| e.to_string())?;
    for event in appended {
        if event.event_type == event_type::APPROVAL_REQUESTED {
            if let Err(err) = create_approval_from_event(state, &event).await {
                warn!(%err, %session_id, "failed to record approval.requested");
            }
        }
        state.bus.publish(ServerToUiMessage::EventsAppended(event));
    }
    Ok(())
}

async fn create_approval_from_event(state: &ServerState, event: &agent_commander_types::Event) -> Result<(), String> {
    let hint: ApprovalKindHint = serde_json::from_value(event.payload.clone()).map_err(|e| e.to_string())?;
    let session = state.store.sessions.get(event.session_id).await.map_err(|e| e.to_string())?;

    let approval = Approval {
        id: event.id,
        session_id: event.session_id,
        provider: session.provider,
        ts_requested: event.ts,
        ts_decided: None,
        decision: None,
        timed_out_at: None,
        requested_payload: event.payload.clone(),
        decided_payload: None,
        approval_type: hint.approval_type,
    };
    state.store.approvals.create(&approval).await.map_err(|e| e.to_string())?;
    state.bus.publish(ServerToUiMessage::ApprovalsCreated(approval));
    Ok(())
}

async fn handle_commands_result(state: &ServerState, body: CommandsResult) {
    let result = CommandsResultBody { cmd_id: body.cmd_id, session_id: body.session_id, ok: body.ok, result: body.result, error: body.error };
    if !state.dispatcher.complete(result).await {
        debug!("commands.result for unknown or already-resolved cmd_id");
    }
}

fn handle_console_chunk(state: &ServerState, chunk: ConsoleChunk) {
    state.bus.publish(ServerToUiMessage::ConsoleChunk(ConsoleChunkOut {
        session_id: chunk.session_id,
        subscription_id: chunk.subscription_id,
        data: chunk.data,
    }));
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
