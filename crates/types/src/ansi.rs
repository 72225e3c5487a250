// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ANSI-aware text helpers shared by the cross-host copy pipeline (strip
//! before injecting as input) and the orchestrator's approval-context
//! enrichment (last N lines, stripped, for display).
//!
//! Feeds raw capture bytes through an `avt::Vt` scratch terminal the same
//! way the agent side renders live screens, so "what a human would read"
//! stays consistent between a live pane and a persisted `capture_text`.

/// Strip ANSI escape sequences from `text`, returning plain lines joined by
/// `\n`. Wide enough (999 cols) that no real capture wraps during the pass.
pub fn strip_ansi(text: &str) -> String {
    let cols = line_width(text).max(1);
    let rows = text.lines().count().max(1);
    let mut vt = avt::Vt::new(cols, rows);
    let _ = vt.feed_str(text);
    vt.view().map(|line| line.text().trim_end().to_owned()).collect::<Vec<_>>().join("\n")
}

/// Return the last `n` lines of `text`, ANSI-stripped. Used for approval
/// context enrichment (spec §4.7 — "last 60 lines, ANSI-stripped").
pub fn last_lines_stripped(text: &str, n: usize) -> String {
    let stripped = strip_ansi(text);
    let lines: Vec<&str> = stripped.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

fn line_width(text: &str) -> usize {
    text.lines().map(|l| l.chars().count()).max().unwrap_or(80).min(2000)
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "ansi_tests.rs"]
mod tests;
