// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal WebSocket wire protocol — `/v1/ui/terminal/:session_id` (spec §6.3).

use serde::{Deserialize, Serialize};

/// UI→server frames, discriminated by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TerminalClientMessage {
    Input { data: String },
    Resize { cols: u16, rows: u16 },
    Control,
    Detach,
}

/// Server→UI frames.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TerminalServerMessage {
    Output {
        data: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        encoding: Option<String>,
    },
    Attached {
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Detached {
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Readonly {
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Control {
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    IdleTimeout {
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

/// Close codes enumerated in spec §6.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalCloseCode {
    InvalidSessionId = 4001,
    MissingToken = 4002,
    InvalidToken = 4003,
    SessionNotFound = 4004,
    NoPane = 4005,
    AgentNotConnected = 4006,
    AttachFailed = 4007,
}

impl TerminalCloseCode {
    pub fn code(self) -> u16 {
        self as u16
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_input_frame() {
        let json = serde_json::json!({"type": "input", "data": "ls\n"});
        let msg: TerminalClientMessage = serde_json::from_value(json).unwrap();
        assert!(matches!(msg, TerminalClientMessage::Input { data } if data == "ls\n"));
    }

    #[test]
    fn parses_resize_frame() {
        let json = serde_json::json!({"type": "resize", "cols": 80, "rows": 24});
        let msg: TerminalClientMessage = serde_json::from_value(json).unwrap();
        match msg {
            TerminalClientMessage::Resize { cols, rows } => {
                assert_eq!(cols, 80);
                assert_eq!(rows, 24);
            }
            other => panic!("expected Resize, got {other:?}"),
        }
    }

    #[test]
    fn close_codes_match_spec_values() {
        assert_eq!(TerminalCloseCode::InvalidSessionId.code(), 4001);
        assert_eq!(TerminalCloseCode::AttachFailed.code(), 4007);
    }

    #[test]
    fn output_frame_serializes_with_tag() {
        let msg = TerminalServerMessage::Output { data: "hi".into(), encoding: None };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "output");
        assert_eq!(value["data"], "hi");
        assert!(value.get("encoding").is_none());
    }
}
