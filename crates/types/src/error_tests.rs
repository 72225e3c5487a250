// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    auth_missing = { CommanderError::AuthMissing, 401 },
    auth_invalid = { CommanderError::AuthInvalid, 401 },
    forbidden = { CommanderError::Forbidden, 403 },
    directory_not_allowed = { CommanderError::DirectoryNotAllowed, 403 },
    hidden_not_allowed = { CommanderError::HiddenNotAllowed, 403 },
    bad_request = { CommanderError::BadRequest, 400 },
    not_found = { CommanderError::NotFound, 404 },
    agent_unavailable = { CommanderError::AgentUnavailable, 503 },
    command_timed_out = { CommanderError::CommandTimedOut, 503 },
    already_decided = { CommanderError::AlreadyDecided, 409 },
    already_archived = { CommanderError::AlreadyArchived, 409 },
    internal_error = { CommanderError::InternalError, 500 },
)]
fn http_status_matches_spec(error: CommanderError, expected: u16) {
    assert_eq!(error.http_status(), expected);
}

#[yare::parameterized(
    auth_missing = { CommanderError::AuthMissing, 4001 },
    auth_invalid = { CommanderError::AuthInvalid, 4003 },
    forbidden = { CommanderError::Forbidden, 4003 },
    agent_unavailable = { CommanderError::AgentUnavailable, 4006 },
    not_found = { CommanderError::NotFound, 4003 },
)]
fn ws_close_code_matches_spec(error: CommanderError, expected: u16) {
    assert_eq!(error.ws_close_code(), expected);
}

#[test]
fn error_body_round_trips_through_json() {
    let body = CommanderError::NotFound.to_error_body("session S1 not found");
    let json = serde_json::to_string(&body).unwrap();
    let back: ErrorBody = serde_json::from_str(&json).unwrap();
    assert_eq!(back.code, "NOT_FOUND");
    assert_eq!(back.message, "session S1 not found");
    assert!(back.details.is_none());
}
