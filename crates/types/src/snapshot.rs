// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::ids::SessionId;

/// A content-addressed text capture of a pane's visible buffer.
///
/// `(session_id, capture_hash)` is unique; duplicate inserts are no-ops
/// (spec §3, §7 — "snapshot insert conflicts are treated as success").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub session_id: SessionId,
    pub created_at: DateTime<Utc>,
    pub capture_hash: String,
    pub capture_text: String,
}

/// Compute the content address for a raw capture. Hex-encoded SHA-256,
/// matching the hashing idiom already used for credential persistence
/// fingerprints elsewhere in this workspace.
pub fn capture_hash(capture_text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(capture_text.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl Snapshot {
    pub fn new(session_id: SessionId, capture_text: String, created_at: DateTime<Utc>) -> Self {
        let capture_hash = capture_hash(&capture_text);
        Self { session_id, created_at, capture_hash, capture_text }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
