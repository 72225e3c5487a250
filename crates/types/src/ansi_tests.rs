// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn strip_ansi_removes_color_codes() {
    let raw = "\x1b[31mhello\x1b[0m";
    assert_eq!(strip_ansi(raw), "hello");
}

#[test]
fn strip_ansi_preserves_plain_text() {
    assert_eq!(strip_ansi("line one\nline two"), "line one\nline two");
}

#[test]
fn last_lines_stripped_truncates_to_n() {
    let text = (1..=100).map(|i| format!("line{i}")).collect::<Vec<_>>().join("\n");
    let tail = last_lines_stripped(&text, 5);
    let lines: Vec<&str> = tail.lines().collect();
    assert_eq!(lines, vec!["line96", "line97", "line98", "line99", "line100"]);
}

#[test]
fn last_lines_stripped_returns_all_when_fewer_than_n() {
    let text = "a\nb\nc";
    assert_eq!(last_lines_stripped(text, 60), "a\nb\nc");
}
