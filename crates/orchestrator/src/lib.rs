// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator detection and ranking engine (spec §4.7): the client-side
//! core that turns a stream of `snapshots.updated` / `sessions.changed` /
//! `approvals.*` frames into a ranked list of attention items. Pure state,
//! no I/O — the dashboard shell owns the WebSocket and feeds frames in.

pub mod analyzer;
pub mod item;
pub mod orchestrator;
pub mod ranking;

pub use analyzer::DetectedAction;
pub use item::{Action, ActionType, OrchestratorItem, Source};
pub use orchestrator::{Orchestrator, ANALYSIS_THROTTLE, APPROVAL_PRUNE_GRACE};
pub use ranking::{is_actionable, rank_items, score, RankedItem, RankedLists};
