// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Route table: every WebSocket upgrade plus the REST surface, wired
//! against one shared [`ServerState`] (spec §6).

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::agent::agent_ws_handler;
use crate::rest;
use crate::state::ServerState;
use crate::terminal::terminal_ws_handler;
use crate::ui::ui_ws_handler;

/// Build the axum `Router` with every route the control plane serves.
pub fn build_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/v1/health", get(rest::health))
        .route("/v1/agent/connect", get(agent_ws_handler))
        .route("/v1/ui/ws", get(ui_ws_handler))
        .route("/v1/ui/terminal/{session_id}", get(terminal_ws_handler))
        .route("/v1/sessions", get(rest::list_sessions))
        .route("/v1/sessions/spawn", post(rest::spawn_session))
        .route("/v1/sessions/bulk", post(rest::bulk_operation))
        .route("/v1/sessions/{id}", get(rest::get_session).patch(rest::patch_session).delete(rest::delete_session))
        .route("/v1/sessions/{id}/events", get(rest::get_session_events))
        .route("/v1/sessions/{id}/commands", post(rest::dispatch_command))
        .route("/v1/sessions/{id}/copy-to", post(rest::copy_to))
        .route("/v1/sessions/{id}/fork", post(rest::fork_session))
        .route("/v1/sessions/{id}/approvals", get(rest::list_pending_approvals))
        .route("/v1/approvals/{id}/decide", post(rest::decide_approval))
        .route("/v1/hosts", get(rest::list_hosts).post(rest::register_host))
        .route("/v1/hosts/{id}/token", post(rest::issue_host_token))
        .route("/v1/hosts/{id}/orphan-panes", get(rest::list_orphan_panes))
        .route("/v1/hosts/{id}/adopt-panes", post(rest::adopt_panes))
        .route("/v1/hosts/{id}/directories", get(rest::list_directory))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
