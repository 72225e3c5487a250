// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn identical_captures_hash_identically() {
    assert_eq!(capture_hash("line1\nline2"), capture_hash("line1\nline2"));
}

#[test]
fn different_captures_hash_differently() {
    assert_ne!(capture_hash("line1"), capture_hash("line2"));
}

#[test]
fn new_snapshot_derives_hash_from_text() {
    let snap = Snapshot::new(SessionId::nil(), "hello".to_owned(), Utc::now());
    assert_eq!(snap.capture_hash, capture_hash("hello"));
}
