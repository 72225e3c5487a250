// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! UI WebSocket session (spec §4.1, §6.2). One connection per dashboard
//! client; every connection narrows the shared broadcast bus through its
//! own [`UiSubscriptionState`] and may additionally open console streams
//! against specific agent panes.

use std::sync::Arc;

use agent_commander_bus::UiSubscriptionState;
use agent_commander_types::protocol::ui::UiMessage;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::auth::Role;
use crate::state::ServerState;

#[derive(Debug, Deserialize)]
pub struct UiQuery {
    pub token: Option<String>,
}

fn close_unauthorized() -> Message {
    Message::Close(Some(axum::extract::ws::CloseFrame { code: 4003, reason: "invalid token".into() }))
}

/// `GET /v1/ui/ws` — WebSocket upgrade for the UI pub/sub stream.
pub async fn ui_ws_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<UiQuery>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ui_connection(state, query.token, socket))
}

async fn handle_ui_connection(state: Arc<ServerState>, token: Option<String>, mut socket: WebSocket) {
    let principal = match &token {
        Some(token) => state.token_resolver.resolve(token).await,
        None => None,
    };
    let Some(principal) = principal else {
        let _ = socket.send(close_unauthorized()).await;
        return;
    };

    let mut subscription = UiSubscriptionState::new();
    let mut ui_rx = state.bus.subscribe_ui();
    let mut console_subscription_ids: Vec<Uuid> = Vec::new();

    loop {
        tokio::select! {
            received = ui_rx.recv() => {
                match received {
                    Ok(message) => {
                        if let Some(narrowed) = subscription.narrow(&message) {
                            if let Ok(json) = serde_json::to_string(&narrowed) {
                                if socket.send(Message::Text(json.into())).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            incoming = socket.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if !handle_client_frame(&state, principal.role, &mut subscription, &mut console_subscription_ids, &text).await {
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

    if !console_subscription_ids.is_empty() {
        state.bus.console_subscriptions.unsubscribe_all(&console_subscription_ids).await;
    }
}

/// Handle one UI→server frame. Returns `false` if the connection should
/// close (reserved for future fatal protocol errors; currently always
/// `true` — malformed frames are ignored rather than torn down, since a
/// misbehaving dashboard tab shouldn't kill the whole session).
async fn handle_client_frame(
    state: &ServerState,
    role: Role,
    subscription: &mut UiSubscriptionState,
    console_subscription_ids: &mut Vec<Uuid>,
    text: &str,
) -> bool {
    let Ok(message) = serde_json::from_str::<UiMessage>(text) else {
        return true;
    };

    match message {
        UiMessage::Subscribe(req) => {
            subscription.subscribe(req.topics);
        }
        UiMessage::Unsubscribe(req) => {
            subscription.unsubscribe_topic(req.kind);
        }
        UiMessage::ConsoleSubscribe(req) => {
            if role < Role::Operator {
                return true;
            }
            let Ok(session) = state.store.sessions.get(req.session_id).await else {
                return true;
            };
            let Some(pane_id) = session.tmux_pane_id.clone() else {
                return true;
            };
            let subscription_id = Uuid::new_v4();
            let push = state.bus.console_subscriptions.subscribe(subscription_id, session.host_id.clone(), req.session_id, pane_id).await;
            console_subscription_ids.push(subscription_id);
            let _ = state.bus.send_to_agent(&session.host_id, push).await;
        }
        UiMessage::ConsoleUnsubscribe(req) => {
            state.bus.console_subscriptions.unsubscribe(req.subscription_id).await;
            console_subscription_ids.retain(|id| *id != req.subscription_id);
        }
    }
    true
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "ui_tests.rs"]
mod tests;
