// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Integration tests for the control plane's HTTP surface.
//!
//! Uses `axum_test::TestServer` — no real TCP needed.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use agent_commander_bus::Bus;
use agent_commander_server::auth::StaticTokenResolver;
use agent_commander_server::config::ServerConfig;
use agent_commander_server::state::ServerState;
use agent_commander_server::transport::build_router;
use agent_commander_store::Store;
use axum_test::TestServer;

fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_owned(),
        port: 0,
        database_url: "sqlite::memory:".to_owned(),
        ui_token: Some("ui-secret".to_owned()),
        admin_token: Some("admin-secret".to_owned()),
        read_only_token: Some("ro-secret".to_owned()),
        terminal_idle_ms: 1,
        directory_roots: Vec::new(),
    }
}

async fn test_server() -> TestServer {
    let store = Store::connect("sqlite::memory:").await.unwrap();
    let bus = Bus::new();
    let config = test_config();
    let resolver = Arc::new(StaticTokenResolver::from_config(&config));
    let state = ServerState::new(store, bus, config, resolver);
    TestServer::new(build_router(state)).expect("failed to create test server")
}

#[tokio::test]
async fn unauthenticated_sessions_list_is_rejected() {
    let server = test_server().await;
    let response = server.get("/v1/sessions").await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn authenticated_sessions_list_starts_empty() {
    let server = test_server().await;
    let response = server.get("/v1/sessions").authorization_bearer("ro-secret").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn registering_a_host_requires_admin() {
    let server = test_server().await;
    let body = serde_json::json!({ "id": "host-a", "name": "devbox" });

    let rejected = server.post("/v1/hosts").authorization_bearer("ui-secret").json(&body).await;
    rejected.assert_status(axum::http::StatusCode::FORBIDDEN);

    let accepted = server.post("/v1/hosts").authorization_bearer("admin-secret").json(&body).await;
    accepted.assert_status_ok();
    let host: serde_json::Value = accepted.json();
    assert_eq!(host["id"], "host-a");
}

#[tokio::test]
async fn issuing_a_host_token_requires_admin_and_returns_an_opaque_token() {
    let server = test_server().await;
    let body = serde_json::json!({ "id": "host-a", "name": "devbox" });
    server.post("/v1/hosts").authorization_bearer("admin-secret").json(&body).await.assert_status_ok();

    let response = server.post("/v1/hosts/host-a/token").authorization_bearer("admin-secret").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["token"].as_str().unwrap().len() > 10);
}

#[tokio::test]
async fn directory_listing_outside_the_allow_list_is_rejected() {
    let server = test_server().await;
    let body = serde_json::json!({ "id": "host-a", "name": "devbox" });
    server.post("/v1/hosts").authorization_bearer("admin-secret").json(&body).await.assert_status_ok();

    let response =
        server.get("/v1/hosts/host-a/directories").authorization_bearer("admin-secret").add_query_param("path", "/etc").await;
    response.assert_status(axum::http::StatusCode::FORBIDDEN);
}
