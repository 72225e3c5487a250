// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use agent_commander_bus::Bus;
use agent_commander_store::Store;
use agent_commander_types::protocol::agent::{ServerToAgentMessage, SessionUpsert};
use agent_commander_types::protocol::command::{CommandsResultBody, CopyMode, CopyToRequest};
use agent_commander_types::session::{Provider, SessionKind, SessionMetadata, SessionStatus};
use chrono::Utc;
use tokio::sync::mpsc;
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

async fn seed_session(store: &Store, host_id: &str, id: SessionId) {
    store.hosts.upsert(&host_id.to_owned(), "devbox", None, None, &Default::default(), None, Utc::now()).await.expect("seed host");
    store.sessions.upsert(&host_id.to_owned(), &upsert_for(id), None, Utc::now()).await.expect("seed session");
}

#[tokio::test]
async fn same_host_copy_sends_one_combined_command() {
    let store = Store::connect("sqlite::memory:").await.expect("connect store");
    let source_id = Uuid::new_v4();
    let target_id = Uuid::new_v4();
    seed_session(&store, "host-a", source_id).await;
    seed_session(&store, "host-a", target_id).await;

    let bus = Bus::new();
    let (tx, mut rx) = mpsc::channel(16);
    bus.agents.register("host-a".to_owned(), tx).await;
    let dispatcher = CommandDispatcher::new(Arc::clone(&bus), Arc::clone(&store));
    let copier = CrossHostCopy::new(dispatcher.clone(), Arc::clone(&store));

    let request = CopyToRequest {
        target_session_id: target_id,
        mode: CopyMode::Full,
        line_start: None,
        line_end: None,
        last_n_lines: None,
        strip_ansi: false,
        prepend_text: None,
        append_text: None,
    };

    let responder = tokio::spawn(async move {
        let frame = rx.recv().await.expect("command frame");
        let ServerToAgentMessage::CommandsDispatch(dispatch) = frame else { panic!("expected dispatch") };
        assert_eq!(dispatch.command["type"], "copy_to_session");
        dispatcher
            .complete(CommandsResultBody { cmd_id: dispatch.cmd_id, session_id: Some(source_id), ok: true, result: None, error: None })
            .await
    });

    copier.execute(source_id, &request).await.expect("same-host copy should succeed");
    assert!(responder.await.expect("responder"));
}

#[tokio::test]
async fn cross_host_copy_captures_then_sends_combined_text() {
    let store = Store::connect("sqlite::memory:").await.expect("connect store");
    let source_id = Uuid::new_v4();
    let target_id = Uuid::new_v4();
    seed_session(&store, "host-src", source_id).await;
    seed_session(&store, "host-dst", target_id).await;

    let bus = Bus::new();
    let (src_tx, mut src_rx) = mpsc::channel(16);
    let (dst_tx, mut dst_rx) = mpsc::channel(16);
    bus.agents.register("host-src".to_owned(), src_tx).await;
    bus.agents.register("host-dst".to_owned(), dst_tx).await;
    let dispatcher = CommandDispatcher::new(Arc::clone(&bus), Arc::clone(&store));
    let copier = CrossHostCopy::new(dispatcher.clone(), Arc::clone(&store));

    let request = CopyToRequest {
        target_session_id: target_id,
        mode: CopyMode::LastNLines,
        line_start: None,
        line_end: None,
        last_n_lines: Some(10),
        strip_ansi: false,
        prepend_text: Some("before".to_owned()),
        append_text: Some("after".to_owned()),
    };

    let capture_dispatcher = dispatcher.clone();
    let capture_responder = tokio::spawn(async move {
        let frame = src_rx.recv().await.expect("capture frame");
        let ServerToAgentMessage::CommandsDispatch(dispatch) = frame else { panic!("expected dispatch") };
        assert_eq!(dispatch.command["type"], "capture_pane");
        capture_dispatcher
            .complete(CommandsResultBody {
                cmd_id: dispatch.cmd_id,
                session_id: Some(source_id),
                ok: true,
                result: Some(serde_json::json!({ "text": "captured output" })),
                error: None,
            })
            .await
    });

    let send_dispatcher = dispatcher.clone();
    let send_responder = tokio::spawn(async move {
        let frame = dst_rx.recv().await.expect("send_input frame");
        let ServerToAgentMessage::CommandsDispatch(dispatch) = frame else { panic!("expected dispatch") };
        assert_eq!(dispatch.command["type"], "send_input");
        let text = dispatch.command["payload"]["text"].as_str().unwrap_or_default().to_owned();
        assert_eq!(text, "before\n\n---\n\ncaptured output\n\n---\n\nafter");
        send_dispatcher
            .complete(CommandsResultBody { cmd_id: dispatch.cmd_id, session_id: Some(target_id), ok: true, result: None, error: None })
            .await
    });

    copier.execute(source_id, &request).await.expect("cross-host copy should succeed");
    assert!(capture_responder.await.expect("capture responder"));
    assert!(send_responder.await.expect("send responder"));
}

#[test]
fn combine_omits_separators_for_empty_sides() {
    assert_eq!(combine(None, "middle", None), "middle");
    assert_eq!(combine(Some("pre"), "middle", None), "pre\n\n---\n\nmiddle");
    assert_eq!(combine(None, "middle", Some("post")), "middle\n\n---\n\npost");
    assert_eq!(combine(Some("pre"), "middle", Some("post")), "pre\n\n---\n\nmiddle\n\n---\n\npost");
}
