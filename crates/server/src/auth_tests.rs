// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::config::ServerConfig;

fn config_with(admin: Option<&str>, ui: Option<&str>, read_only: Option<&str>) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_owned(),
        port: 0,
        database_url: "sqlite::memory:".to_owned(),
        ui_token: ui.map(str::to_owned),
        admin_token: admin.map(str::to_owned),
        read_only_token: read_only.map(str::to_owned),
        terminal_idle_ms: 1,
        directory_roots: Vec::new(),
    }
}

#[tokio::test]
async fn no_tokens_configured_grants_admin_to_anything() {
    let resolver = StaticTokenResolver::from_config(&config_with(None, None, None));
    let principal = resolver.resolve("whatever").await.unwrap();
    assert_eq!(principal.role, Role::Admin);
}

#[tokio::test]
async fn each_configured_token_resolves_to_its_role() {
    let resolver = StaticTokenResolver::from_config(&config_with(Some("a"), Some("o"), Some("r")));
    assert_eq!(resolver.resolve("a").await.unwrap().role, Role::Admin);
    assert_eq!(resolver.resolve("o").await.unwrap().role, Role::Operator);
    assert_eq!(resolver.resolve("r").await.unwrap().role, Role::ReadOnly);
}

#[tokio::test]
async fn unknown_token_resolves_to_none_once_auth_is_enabled() {
    let resolver = StaticTokenResolver::from_config(&config_with(Some("a"), None, None));
    assert!(resolver.resolve("nope").await.is_none());
}
