// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use agent_commander_store::Store;
use agent_commander_types::protocol::agent::SessionUpsert;
use agent_commander_types::protocol::command::BulkOperationKind;
use agent_commander_types::protocol::ui::ServerToUiMessage;
use agent_commander_types::session::{Provider, SessionKind, SessionMetadata, SessionStatus};
use chrono::Utc;
use uuid::Uuid;

use super::*;
use crate::dispatcher::CommandDispatcher;

fn upsert_for(id: SessionId) -> SessionUpsert {
    SessionUpsert {
        id,
        kind: SessionKind::TmuxPane,
        provider: Provider::ClaudeCode,
        status: SessionStatus::Running,
        title: None,
        cwd: None,
        repo_root: None,
        git_branch: None,
        git_remote: None,
        tmux_target: None,
        tmux_pane_id: None,
        forked_from: None,
        fork_depth: 0,
        metadata: SessionMetadata::default(),
    }
}

async fn seed_session(store: &Store, id: SessionId) {
    store.hosts.upsert(&"host-a".to_owned(), "devbox", None, None, &Default::default(), None, Utc::now()).await.expect("seed host");
    store.sessions.upsert(&"host-a".to_owned(), &upsert_for(id), None, Utc::now()).await.expect("seed session");
}

async fn new_bulk_ops() -> (BulkOperations, Arc<Bus>, Arc<Store>) {
    let store = Store::connect("sqlite::memory:").await.expect("connect store");
    let bus = Bus::new();
    let dispatcher = CommandDispatcher::new(Arc::clone(&bus), Arc::clone(&store));
    (BulkOperations::new(Arc::clone(&store), dispatcher, Arc::clone(&bus)), bus, store)
}

#[tokio::test]
async fn archive_marks_session_and_broadcasts_sessions_changed() {
    let (ops, bus, store) = new_bulk_ops().await;
    let id = Uuid::new_v4();
    seed_session(&store, id).await;

    let mut ui_rx = bus.subscribe_ui();
    let request =
        BulkOperationRequest { operation: BulkOperationKind::Archive, session_ids: vec![id], group_id: None };
    let response = ops.apply(&request).await;

    assert_eq!(response.succeeded, vec![id]);
    assert!(response.errors.is_empty());
    assert!(store.sessions.get(id).await.expect("session").is_archived());

    let ServerToUiMessage::SessionsChanged(changed) = ui_rx.try_recv().expect("broadcast") else { panic!("wrong frame") };
    assert_eq!(changed.sessions.len(), 1);
    assert!(changed.deleted.is_empty());
}

#[tokio::test]
async fn delete_reports_deleted_ids_not_full_sessions() {
    let (ops, bus, store) = new_bulk_ops().await;
    let id = Uuid::new_v4();
    seed_session(&store, id).await;

    let mut ui_rx = bus.subscribe_ui();
    let request = BulkOperationRequest { operation: BulkOperationKind::Delete, session_ids: vec![id], group_id: None };
    let response = ops.apply(&request).await;

    assert_eq!(response.succeeded, vec![id]);
    assert!(store.sessions.get(id).await.is_err());

    let ServerToUiMessage::SessionsChanged(changed) = ui_rx.try_recv().expect("broadcast") else { panic!("wrong frame") };
    assert!(changed.sessions.is_empty());
    assert_eq!(changed.deleted, vec![id]);
}

#[tokio::test]
async fn unknown_session_id_is_reported_as_a_per_id_error() {
    let (ops, _bus, _store) = new_bulk_ops().await;
    let missing = Uuid::new_v4();

    let request = BulkOperationRequest { operation: BulkOperationKind::Archive, session_ids: vec![missing], group_id: None };
    let response = ops.apply(&request).await;

    assert!(response.succeeded.is_empty());
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].session_id, missing);
}
