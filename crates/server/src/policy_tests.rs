// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn path_under_a_configured_root_is_allowed() {
    let host_roots = vec!["/home/agent/projects".to_owned()];
    assert!(check_directory_allowed("/home/agent/projects/repo", &host_roots, &[]).is_ok());
}

#[test]
fn path_outside_every_root_is_rejected() {
    let host_roots = vec!["/home/agent/projects".to_owned()];
    let err = check_directory_allowed("/etc", &host_roots, &[]).unwrap_err();
    assert_eq!(err, CommanderError::DirectoryNotAllowed);
}

#[test]
fn empty_allow_list_rejects_everything() {
    let err = check_directory_allowed("/home/agent/projects", &[], &[]).unwrap_err();
    assert_eq!(err, CommanderError::DirectoryNotAllowed);
}

#[test]
fn parent_dir_traversal_is_rejected_even_under_a_root() {
    let host_roots = vec!["/home/agent/projects".to_owned()];
    let err = check_directory_allowed("/home/agent/projects/../../etc", &host_roots, &[]).unwrap_err();
    assert_eq!(err, CommanderError::DirectoryNotAllowed);
}

#[test]
fn server_wide_root_extends_the_host_allow_list() {
    let server_roots = vec!["/srv/shared".to_owned()];
    assert!(check_directory_allowed("/srv/shared/notes", &[], &server_roots).is_ok());
}

#[test]
fn hidden_entries_require_show_hidden() {
    assert!(check_hidden_allowed(".git", false).is_err());
    assert!(check_hidden_allowed(".git", true).is_ok());
    assert!(check_hidden_allowed("src", false).is_ok());
}
