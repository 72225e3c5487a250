// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot analyzer: turns a pane's ANSI-stripped text into zero or one
//! [`DetectedAction`] (spec §4.7). Heuristic and best-effort — a missed or
//! spurious detection degrades to the session's status item, it never blocks
//! anything.

use crate::item::{Action, ActionType};

#[derive(Debug, Clone)]
pub struct DetectedAction {
    pub action_type: ActionType,
    pub question: Option<String>,
    pub options: Option<Vec<String>>,
    pub confidence: f64,
}

impl DetectedAction {
    pub fn into_action(self, context: Option<String>) -> Action {
        Action { action_type: self.action_type, question: self.question, options: self.options, context, confidence: self.confidence }
    }
}

const ERROR_MARKERS: [&str; 4] = ["Traceback (most recent call last)", "panicked at", "Error:", "fatal:"];

/// Analyze ANSI-stripped pane text and return the single most relevant
/// detected action, if any. Only the tail of the buffer is considered —
/// prompts and errors are a tail phenomenon, not a buried one.
pub fn analyze(stripped_text: &str) -> Option<DetectedAction> {
    let lines: Vec<&str> = stripped_text.lines().rev().take(20).collect();
    let tail: Vec<&str> = lines.iter().rev().copied().collect();

    if tail.iter().any(|line| ERROR_MARKERS.iter().any(|marker| line.contains(marker))) {
        let question = tail.iter().rev().find(|line| ERROR_MARKERS.iter().any(|m| line.contains(m))).map(|s| s.trim().to_owned());
        return Some(DetectedAction { action_type: ActionType::Error, question, options: None, confidence: 0.9 });
    }

    let last_nonblank = tail.iter().rev().find(|line| !line.trim().is_empty())?;
    let trimmed = last_nonblank.trim();

    if let Some(options) = multi_choice_options(&tail) {
        return Some(DetectedAction { action_type: ActionType::MultiChoice, question: Some(trimmed.to_owned()), options: Some(options), confidence: 0.8 });
    }

    if is_yes_no_prompt(trimmed) {
        return Some(DetectedAction {
            action_type: ActionType::YesNo,
            question: Some(trimmed.to_owned()),
            options: Some(vec!["yes".to_owned(), "no".to_owned()]),
            confidence: 0.85,
        });
    }

    if trimmed.ends_with('>') || trimmed.ends_with(':') || trimmed.to_lowercase().contains("enter ") {
        return Some(DetectedAction { action_type: ActionType::TextInput, question: Some(trimmed.to_owned()), options: None, confidence: 0.6 });
    }

    None
}

fn is_yes_no_prompt(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.ends_with("(y/n)") || lower.ends_with("[y/n]") || lower.ends_with("(y/n)?") || lower.ends_with("[y/n]?") || lower.ends_with("(yes/no)")
}

/// Detect a menu of numbered options in the buffer's tail, e.g. consecutive
/// `1) ...` / `2) ...` lines immediately preceding the prompt.
fn multi_choice_options(tail: &[&str]) -> Option<Vec<String>> {
    let mut options = Vec::new();
    for line in tail {
        let trimmed = line.trim();
        if let Some(rest) = strip_numbered_prefix(trimmed) {
            options.push(rest.to_owned());
        }
    }
    if options.len() >= 2 {
        Some(options)
    } else {
        None
    }
}

fn strip_numbered_prefix(line: &str) -> Option<&str> {
    let mut chars = line.char_indices();
    let mut digit_end = 0;
    for (idx, ch) in chars.by_ref() {
        if ch.is_ascii_digit() {
            digit_end = idx + ch.len_utf8();
        } else {
            break;
        }
    }
    if digit_end == 0 {
        return None;
    }
    let rest = &line[digit_end..];
    let rest = rest.strip_prefix(')').or_else(|| rest.strip_prefix('.'))?;
    Some(rest.trim())
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "analyzer_tests.rs"]
mod tests;
