// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use agent_commander_bus::Bus;
use agent_commander_store::Store;
use agent_commander_types::approval::{ApprovalType, Decision, DecisionMode};
use agent_commander_types::protocol::agent::{ServerToAgentMessage, SessionUpsert};
use agent_commander_types::session::{Provider, SessionKind, SessionMetadata, SessionStatus};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use super::*;
use crate::auth::StaticTokenResolver;
use crate::config::ServerConfig;

fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_owned(),
        port: 0,
        database_url: "sqlite::memory:".to_owned(),
        ui_token: None,
        admin_token: Some("admin-secret".to_owned()),
        read_only_token: Some("ro-secret".to_owned()),
        terminal_idle_ms: 1,
        directory_roots: vec!["/srv".to_owned()],
    }
}

async fn test_state() -> Arc<ServerState> {
    let store = Store::connect("sqlite::memory:").await.unwrap();
    let bus = Bus::new();
    let config = test_config();
    let resolver = Arc::new(StaticTokenResolver::from_config(&config));
    ServerState::new(store, bus, config, resolver)
}

fn auth(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(axum::http::header::AUTHORIZATION, format!("Bearer {token}").parse().unwrap());
    headers
}

fn sample_upsert(id: SessionId) -> SessionUpsert {
    SessionUpsert {
        id,
        kind: SessionKind::TmuxPane,
        provider: Provider::ClaudeCode,
        status: SessionStatus::Running,
        title: Some("fix bug".to_owned()),
        cwd: None,
        repo_root: None,
        git_branch: None,
        git_remote: None,
        tmux_target: Some("main:0.0".to_owned()),
        tmux_pane_id: Some("%3".to_owned()),
        forked_from: None,
        fork_depth: 0,
        metadata: SessionMetadata::default(),
    }
}

async fn seed_host_and_session(state: &ServerState) -> SessionId {
    state.store.hosts.upsert(&"host-a".to_owned(), "devbox", None, None, &Default::default(), None, Utc::now()).await.unwrap();
    let id = Uuid::new_v4();
    state.store.sessions.upsert(&"host-a".to_owned(), &sample_upsert(id), None, Utc::now()).await.unwrap();
    id
}

#[tokio::test]
async fn list_sessions_requires_a_token() {
    let state = test_state().await;
    let err = list_sessions(State(state), HeaderMap::new(), Query(SessionsQuery {
        host_id: None,
        group_id: None,
        ungrouped: false,
        status: None,
        provider: None,
        needs_attention: false,
        include_archived: false,
        archived_only: false,
        q: None,
        cursor: None,
        limit: None,
        offset: None,
    }))
    .await
    .unwrap_err();
    assert!(matches!(err, CommanderError::AuthMissing));
}

#[tokio::test]
async fn list_sessions_returns_seeded_rows_for_a_read_only_token() {
    let state = test_state().await;
    seed_host_and_session(&state).await;

    let Json(page) = list_sessions(State(Arc::clone(&state)), auth("ro-secret"), Query(SessionsQuery {
        host_id: None,
        group_id: None,
        ungrouped: false,
        status: None,
        provider: None,
        needs_attention: false,
        include_archived: false,
        archived_only: false,
        q: None,
        cursor: None,
        limit: None,
        offset: None,
    }))
    .await
    .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.sessions.len(), 1);
}

#[tokio::test]
async fn patch_session_updates_title_and_broadcasts() {
    let state = test_state().await;
    let id = seed_host_and_session(&state).await;
    let mut ui_rx = state.bus.subscribe_ui();

    let body = SessionPatchRequest { title: Some("renamed".to_owned()), idle: None };
    let Json(session) = patch_session(State(Arc::clone(&state)), auth("admin-secret"), Path(id), Json(body)).await.unwrap();

    assert_eq!(session.title.as_deref(), Some("renamed"));
    let ServerToUiMessage::SessionsChanged(changed) = ui_rx.try_recv().unwrap() else {
        panic!("expected sessions.changed")
    };
    assert_eq!(changed.sessions[0].title.as_deref(), Some("renamed"));
}

#[tokio::test]
async fn patch_session_is_forbidden_for_read_only_tokens() {
    let state = test_state().await;
    let id = seed_host_and_session(&state).await;

    let body = SessionPatchRequest { title: Some("renamed".to_owned()), idle: None };
    let err = patch_session(State(state), auth("ro-secret"), Path(id), Json(body)).await.unwrap_err();
    assert!(matches!(err, CommanderError::Forbidden));
}

#[tokio::test]
async fn delete_session_removes_the_row_and_broadcasts_deleted_id() {
    let state = test_state().await;
    let id = seed_host_and_session(&state).await;
    let mut ui_rx = state.bus.subscribe_ui();

    delete_session(State(Arc::clone(&state)), auth("admin-secret"), Path(id)).await.unwrap();

    assert!(state.store.sessions.get(id).await.is_err());
    let ServerToUiMessage::SessionsChanged(changed) = ui_rx.try_recv().unwrap() else {
        panic!("expected sessions.changed")
    };
    assert_eq!(changed.deleted, vec![id]);
}

#[tokio::test]
async fn dispatch_command_returns_a_cmd_id_when_the_agent_is_connected() {
    let state = test_state().await;
    let id = seed_host_and_session(&state).await;
    let (tx, mut rx) = tokio::sync::mpsc::channel(4);
    state.bus.agents.register("host-a".to_owned(), tx).await;

    let body = CommandRequest { command_type: "send_input".to_owned(), payload: serde_json::json!({"text": "ls\n"}) };
    let Json(response) = dispatch_command(State(Arc::clone(&state)), auth("admin-secret"), Path(id), Json(body)).await.unwrap();

    assert!(!response.cmd_id.is_empty());
    let pushed = rx.recv().await.unwrap();
    assert!(matches!(pushed, ServerToAgentMessage::CommandsDispatch(_)));
}

#[tokio::test]
async fn dispatch_command_surfaces_agent_unavailable_when_the_host_is_not_connected() {
    let state = test_state().await;
    let id = seed_host_and_session(&state).await;

    let body = CommandRequest { command_type: "send_input".to_owned(), payload: serde_json::json!({}) };
    let err = dispatch_command(State(state), auth("admin-secret"), Path(id), Json(body)).await.unwrap_err();
    assert!(matches!(err, CommanderError::AgentUnavailable));
}

#[tokio::test]
async fn list_directory_rejects_paths_outside_the_configured_roots() {
    let state = test_state().await;
    state.store.hosts.upsert(&"host-a".to_owned(), "devbox", None, None, &Default::default(), None, Utc::now()).await.unwrap();

    let err = list_directory(
        State(state),
        auth("admin-secret"),
        Path("host-a".to_owned()),
        Query(DirectoryQuery { path: "/etc/shadow".to_owned(), show_hidden: false }),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CommanderError::DirectoryNotAllowed));
}

#[tokio::test]
async fn decide_approval_is_idempotent_for_a_repeated_identical_decision() {
    let state = test_state().await;
    let session_id = seed_host_and_session(&state).await;
    let approval_id = Uuid::new_v4();
    let approval = agent_commander_types::approval::Approval {
        id: approval_id,
        session_id,
        provider: Provider::ClaudeCode,
        ts_requested: Utc::now(),
        ts_decided: None,
        decision: None,
        timed_out_at: None,
        requested_payload: serde_json::json!({"summary": "rm -rf /tmp/scratch"}),
        decided_payload: None,
        approval_type: ApprovalType::Binary,
    };
    state.store.approvals.create(&approval).await.unwrap();

    let decision_body = ApprovalDecisionRequest { decision: Decision::Allow, mode: DecisionMode::Hook, payload: Default::default() };
    let Json(first) =
        decide_approval(State(Arc::clone(&state)), auth("admin-secret"), Path(approval_id), Json(decision_body.clone())).await.unwrap();
    assert_eq!(first.decision, Some(Decision::Allow));

    let Json(second) =
        decide_approval(State(Arc::clone(&state)), auth("admin-secret"), Path(approval_id), Json(decision_body)).await.unwrap();
    assert_eq!(second.decision, Some(Decision::Allow));
}

#[tokio::test]
async fn decide_approval_rejects_a_divergent_second_decision() {
    let state = test_state().await;
    let session_id = seed_host_and_session(&state).await;
    let approval_id = Uuid::new_v4();
    let approval = agent_commander_types::approval::Approval {
        id: approval_id,
        session_id,
        provider: Provider::ClaudeCode,
        ts_requested: Utc::now(),
        ts_decided: None,
        decision: None,
        timed_out_at: None,
        requested_payload: serde_json::json!({}),
        decided_payload: None,
        approval_type: ApprovalType::Binary,
    };
    state.store.approvals.create(&approval).await.unwrap();

    let allow = ApprovalDecisionRequest { decision: Decision::Allow, mode: DecisionMode::Hook, payload: Default::default() };
    decide_approval(State(Arc::clone(&state)), auth("admin-secret"), Path(approval_id), Json(allow)).await.unwrap();

    let deny = ApprovalDecisionRequest { decision: Decision::Deny, mode: DecisionMode::Hook, payload: Default::default() };
    let err = decide_approval(State(state), auth("admin-secret"), Path(approval_id), Json(deny)).await.unwrap_err();
    assert!(matches!(err, CommanderError::AlreadyDecided));
}
