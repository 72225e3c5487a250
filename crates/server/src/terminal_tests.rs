// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn attaching_a_second_channel_evicts_the_first() {
    let table = TerminalChannelTable::default();
    let session_id = SessionId::new_v4();
    let (tx1, _rx1) = mpsc::channel(4);
    let (tx2, _rx2) = mpsc::channel(4);

    let evicted = table.attach(session_id, Uuid::new_v4(), "host-a".to_owned(), tx1).await;
    assert!(evicted.is_none());

    let evicted = table.attach(session_id, Uuid::new_v4(), "host-a".to_owned(), tx2).await;
    assert!(evicted.is_some());
}

#[tokio::test]
async fn remove_if_current_is_a_no_op_for_a_stale_channel_id() {
    let table = TerminalChannelTable::default();
    let session_id = SessionId::new_v4();
    let (tx, mut rx) = mpsc::channel(4);
    let channel_id = Uuid::new_v4();
    table.attach(session_id, channel_id, "host-a".to_owned(), tx).await;

    table.remove_if_current(session_id, Uuid::new_v4()).await;
    table.forward_by_channel_id(channel_id, Message::Text("still alive".into())).await;
    assert!(rx.recv().await.is_some());
}

#[tokio::test]
async fn forward_by_channel_id_is_silent_when_nothing_is_registered() {
    let table = TerminalChannelTable::default();
    table.forward_by_channel_id(Uuid::new_v4(), Message::Text("noop".into())).await;
}
