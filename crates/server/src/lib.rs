// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent Commander control plane: the WebSocket hub agents and dashboards
//! both connect to, backed by a SQLite store (spec §1–§6).

pub mod agent;
pub mod auth;
pub mod config;
pub mod policy;
pub mod rest;
pub mod state;
pub mod terminal;
pub mod transport;
pub mod ui;

use std::sync::Arc;

use agent_commander_bus::Bus;
use agent_commander_store::Store;
use tokio::net::TcpListener;

use crate::auth::StaticTokenResolver;
use crate::config::ServerConfig;
use crate::state::ServerState;
use crate::transport::build_router;

/// Run the control plane until its listener is closed.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let addr = config.bind_addr();
    let store = Store::connect(&config.database_url).await?;
    let bus = Bus::new();
    let resolver = Arc::new(StaticTokenResolver::from_config(&config));
    let state = ServerState::new(store, bus, config, resolver);

    tracing::info!("agent-commander-server listening on {addr}");
    let router = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
