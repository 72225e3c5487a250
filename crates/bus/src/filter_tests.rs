// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::Utc;
use uuid::Uuid;

use super::*;
use agent_commander_types::{Provider, SessionKind, SessionMetadata, SessionStatus};

fn sample_session() -> Session {
    let now = Utc::now();
    Session {
        id: Uuid::new_v4(),
        host_id: "H1".to_owned(),
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
        group_id: None,
        forked_from: None,
        fork_depth: 0,
        archived_at: None,
        idled_at: None,
        created_at: now,
        updated_at: now,
        last_activity_at: now,
        metadata: SessionMetadata::default(),
    }
}

#[test]
fn no_filter_matches_everything() {
    assert!(matches_session(None, &sample_session()));
}

#[test]
fn status_filter_rejects_non_matching_status() {
    let filter = TopicFilter { status: Some("IDLE,WAITING_FOR_INPUT".to_owned()), ..Default::default() };
    assert!(!matches_session(Some(&filter), &sample_session()));
}

#[test]
fn archived_sessions_excluded_unless_opted_in() {
    let mut session = sample_session();
    session.archived_at = Some(Utc::now());
    assert!(!matches_session(None, &session));

    let filter = TopicFilter { include_archived: Some(true), ..Default::default() };
    assert!(matches_session(Some(&filter), &session));
}

#[test]
fn host_filter_scopes_to_one_host() {
    let filter = TopicFilter { host_id: Some("H2".to_owned()), ..Default::default() };
    assert!(!matches_session(Some(&filter), &sample_session()));
}

#[test]
fn session_id_filter_applies_to_deleted_ids() {
    let id = Uuid::new_v4();
    let filter = TopicFilter { session_id: Some(id), ..Default::default() };
    assert!(matches_session_id(Some(&filter), id));
    assert!(!matches_session_id(Some(&filter), Uuid::new_v4()));
}
