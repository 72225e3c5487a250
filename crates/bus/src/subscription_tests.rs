// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use agent_commander_types::protocol::ui::{ConsoleChunkOut, SessionsChanged};
use uuid::Uuid;

use super::*;

#[test]
fn unsubscribed_topic_yields_none() {
    let state = UiSubscriptionState::new();
    let msg = ServerToUiMessage::SessionsChanged(SessionsChanged { sessions: vec![], deleted: vec![] });
    assert!(state.narrow(&msg).is_none());
}

#[test]
fn subscribing_without_filter_passes_everything_through() {
    let mut state = UiSubscriptionState::new();
    state.subscribe(vec![TopicSubscription { kind: TopicKind::Console, filter: None }]);
    let msg = ServerToUiMessage::ConsoleChunk(ConsoleChunkOut {
        session_id: Uuid::new_v4(),
        subscription_id: Uuid::new_v4(),
        data: "hi".to_owned(),
    });
    assert!(state.narrow(&msg).is_some());
}

#[test]
fn console_filtered_to_a_different_session_is_dropped() {
    let mut state = UiSubscriptionState::new();
    let wanted = Uuid::new_v4();
    state.subscribe(vec![TopicSubscription {
        kind: TopicKind::Console,
        filter: Some(TopicFilter { session_id: Some(wanted), ..Default::default() }),
    }]);
    let msg = ServerToUiMessage::ConsoleChunk(ConsoleChunkOut {
        session_id: Uuid::new_v4(),
        subscription_id: Uuid::new_v4(),
        data: "hi".to_owned(),
    });
    assert!(state.narrow(&msg).is_none());
}

#[test]
fn unsubscribe_topic_stops_future_frames() {
    let mut state = UiSubscriptionState::new();
    state.subscribe(vec![TopicSubscription { kind: TopicKind::Sessions, filter: None }]);
    state.unsubscribe_topic(TopicKind::Sessions);
    let msg = ServerToUiMessage::SessionsChanged(SessionsChanged { sessions: vec![], deleted: vec![] });
    assert!(state.narrow(&msg).is_none());
}
