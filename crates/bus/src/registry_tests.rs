// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use agent_commander_types::protocol::agent::{AgentAck, AckStatus};
use tokio::sync::mpsc;

use super::*;

#[tokio::test]
async fn send_to_unregistered_host_is_agent_unavailable() {
    let registry = AgentRegistry::new();
    let ack = ServerToAgentMessage::Ack(AgentAck { ack_seq: 1, status: AckStatus::Ok, error: None });
    let err = registry.send("H1", ack).await.unwrap_err();
    assert_eq!(err, CommanderError::AgentUnavailable);
}

#[tokio::test]
async fn registered_host_receives_forwarded_message() {
    let registry = AgentRegistry::new();
    let (tx, mut rx) = mpsc::channel(4);
    registry.register("H1".to_owned(), tx).await;
    assert!(registry.is_connected("H1").await);

    let ack = ServerToAgentMessage::Ack(AgentAck { ack_seq: 7, status: AckStatus::Ok, error: None });
    registry.send("H1", ack).await.unwrap();

    let received = rx.recv().await.unwrap();
    match received {
        ServerToAgentMessage::Ack(ack) => assert_eq!(ack.ack_seq, 7),
        other => panic!("unexpected message: {other:?}"),
    }
}

#[tokio::test]
async fn reconnect_replaces_prior_handle() {
    let registry = AgentRegistry::new();
    let (tx1, _rx1) = mpsc::channel(4);
    let (tx2, mut rx2) = mpsc::channel(4);
    registry.register("H1".to_owned(), tx1).await;
    registry.register("H1".to_owned(), tx2).await;

    let ack = ServerToAgentMessage::Ack(AgentAck { ack_seq: 1, status: AckStatus::Ok, error: None });
    registry.send("H1", ack).await.unwrap();
    assert!(rx2.recv().await.is_some());
}

#[tokio::test]
async fn unregister_removes_the_host() {
    let registry = AgentRegistry::new();
    let (tx, _rx) = mpsc::channel(4);
    registry.register("H1".to_owned(), tx).await;
    registry.unregister("H1").await;
    assert!(!registry.is_connected("H1").await);
}
