// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Unified error kinds for the control plane, shared across WebSocket close
/// codes, REST responses, and internal `Result` plumbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommanderError {
    AuthMissing,
    AuthInvalid,
    Forbidden,
    BadRequest,
    NotFound,
    AgentUnavailable,
    CommandTimedOut,
    AlreadyDecided,
    AlreadyArchived,
    DirectoryNotAllowed,
    HiddenNotAllowed,
    InternalError,
}

impl CommanderError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::AuthMissing | Self::AuthInvalid => 401,
            Self::Forbidden | Self::DirectoryNotAllowed | Self::HiddenNotAllowed => 403,
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::AgentUnavailable | Self::CommandTimedOut => 503,
            Self::AlreadyDecided | Self::AlreadyArchived => 409,
            Self::InternalError => 500,
        }
    }

    /// Close code to use when this error terminates a WebSocket connection.
    pub fn ws_close_code(&self) -> u16 {
        match self {
            Self::AuthMissing => 4001,
            Self::AuthInvalid | Self::Forbidden => 4003,
            Self::AgentUnavailable => 4006,
            _ => 4003,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthMissing => "AUTH_MISSING",
            Self::AuthInvalid => "AUTH_INVALID",
            Self::Forbidden => "FORBIDDEN",
            Self::BadRequest => "BAD_REQUEST",
            Self::NotFound => "NOT_FOUND",
            Self::AgentUnavailable => "AGENT_UNAVAILABLE",
            Self::CommandTimedOut => "COMMAND_TIMED_OUT",
            Self::AlreadyDecided => "ALREADY_DECIDED",
            Self::AlreadyArchived => "ALREADY_ARCHIVED",
            Self::DirectoryNotAllowed => "DIRECTORY_NOT_ALLOWED",
            Self::HiddenNotAllowed => "HIDDEN_NOT_ALLOWED",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    pub fn to_error_body(&self, message: impl Into<String>) -> ErrorBody {
        ErrorBody { code: self.as_str().to_owned(), message: message.into(), details: None }
    }

    pub fn to_http_response(&self, message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
        let status = StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse { error: self.to_error_body(message) }))
    }

    /// Attach structured `details` (used for `BadRequest` schema failures).
    pub fn to_http_response_with_details(
        &self,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> (StatusCode, Json<ErrorResponse>) {
        let status = StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut body = self.to_error_body(message);
        body.details = Some(details);
        (status, Json(ErrorResponse { error: body }))
    }
}

impl fmt::Display for CommanderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IntoResponse for CommanderError {
    fn into_response(self) -> Response {
        self.to_http_response(self.as_str()).into_response()
    }
}

/// Top-level error response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error body with machine-readable code and human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
