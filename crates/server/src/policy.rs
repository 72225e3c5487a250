// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directory allow-list policy (spec §6.4/§7 `DirectoryNotAllowed`,
//! `HiddenNotAllowed`). A host's `capabilities.directory_roots` is the
//! authoritative allow-list; `ServerConfig::directory_roots` additionally
//! scopes every host server-wide, so an operator can lock listing down even
//! if an agent misreports its own roots.

use std::path::{Component, Path};

use agent_commander_types::error::CommanderError;
use agent_commander_types::host::HostCapabilities;

/// Reject `..`/absolute-escape traversal attempts outright; everything else
/// is checked against the allow-lists below.
fn has_traversal(path: &str) -> bool {
    Path::new(path).components().any(|c| matches!(c, Component::ParentDir))
}

fn is_within_root(path: &str, root: &str) -> bool {
    let path = Path::new(path);
    let root = Path::new(root);
    path == root || path.starts_with(root)
}

/// Check `path` against both the host's own allow-list and the server-wide
/// one. `DirectoryNotAllowed` if it falls outside every configured root (an
/// empty combined allow-list means nothing is permitted).
pub fn check_directory_allowed(
    path: &str,
    host_roots: &[String],
    server_roots: &[String],
) -> Result<(), CommanderError> {
    if has_traversal(path) {
        return Err(CommanderError::DirectoryNotAllowed);
    }
    let allowed = host_roots.iter().chain(server_roots.iter()).any(|root| is_within_root(path, root));
    if allowed {
        Ok(())
    } else {
        Err(CommanderError::DirectoryNotAllowed)
    }
}

/// `HiddenNotAllowed`: dotfiles are only listed when the caller explicitly
/// asked for them via `show_hidden`.
pub fn check_hidden_allowed(entry_name: &str, show_hidden: bool) -> Result<(), CommanderError> {
    if !show_hidden && entry_name.starts_with('.') {
        Err(CommanderError::HiddenNotAllowed)
    } else {
        Ok(())
    }
}

pub fn capabilities_allow_listing(capabilities: &HostCapabilities) -> bool {
    capabilities.list_directory
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
