// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::SessionId;
use crate::session::Provider;

/// Token usage reported by a provider for one turn, pushed via
/// `provider.usage`. Persisted append-only in `provider_usage` (spec §6.5).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderUsage {
    pub session_id: SessionId,
    pub provider: Provider,
    pub ts: DateTime<Utc>,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_tokens: u64,
    pub cache_write_tokens: u64,
}

/// Cumulative per-session usage, recomputed on `session_usage.updated`
/// broadcast (derived, not separately persisted beyond the raw
/// `provider_usage` rows it is summed from).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionUsageTotals {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_tokens: u64,
    pub cache_write_tokens: u64,
}

impl SessionUsageTotals {
    pub fn add(&mut self, usage: &ProviderUsage) {
        self.input_tokens += usage.input_tokens;
        self.output_tokens += usage.output_tokens;
        self.cache_read_tokens += usage.cache_read_tokens;
        self.cache_write_tokens += usage.cache_write_tokens;
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_accumulate_across_multiple_reports() {
        let mut totals = SessionUsageTotals::default();
        let usage = ProviderUsage {
            session_id: SessionId::nil(),
            provider: Provider::ClaudeCode,
            ts: Utc::now(),
            input_tokens: 100,
            output_tokens: 50,
            cache_read_tokens: 10,
            cache_write_tokens: 5,
        };
        totals.add(&usage);
        totals.add(&usage);
        assert_eq!(totals.input_tokens, 200);
        assert_eq!(totals.output_tokens, 100);
        assert_eq!(totals.cache_read_tokens, 20);
        assert_eq!(totals.cache_write_tokens, 10);
    }
}
