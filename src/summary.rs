// SPDX-License-Identifier: PMPL-1.0-or-later
//! Severity summary and process exit status.

use crate::finding::{Level, RunResult};
use serde::Serialize;

/// Highest exit status used for finding counts. Larger counts are clamped;
/// the exact number stays available on the [`RunResult`].
pub const MAX_FINDINGS_STATUS: i32 = 100;

/// Finding counts per level for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub notices: usize,
    pub partial: bool,
}

impl Summary {
    pub fn of(result: &RunResult) -> Self {
        let mut summary = Summary {
            partial: result.is_partial(),
            ..Summary::default()
        };
        for finding in result.findings() {
            match finding.level {
                Level::Error => summary.errors += 1,
                Level::Warning => summary.warnings += 1,
                Level::Notice => summary.notices += 1,
            }
        }
        summary
    }

    /// The outward pass/fail signal: zero means clean
    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.notices
    }

    /// Exit status for a completed run
    pub fn exit_status(&self) -> i32 {
        exit_status_for(self.errors)
    }
}

/// Clamp an error count into the findings status range
pub fn exit_status_for(error_count: usize) -> i32 {
    error_count.min(MAX_FINDINGS_STATUS as usize) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::{Finding, ResultAggregator};

    fn result_with(levels: &[Level]) -> RunResult {
        let mut agg = ResultAggregator::new();
        agg.append_batch(
            levels
                .iter()
                .map(|&level| Finding::new("r", level, "m", "<p>"))
                .collect(),
        );
        agg.freeze()
    }

    #[test]
    fn test_counts_per_level() {
        let summary = Summary::of(&result_with(&[
            Level::Error,
            Level::Notice,
            Level::Error,
            Level::Warning,
        ]));
        assert_eq!(summary.error_count(), 2);
        assert_eq!(summary.warnings, 1);
        assert_eq!(summary.notices, 1);
        assert_eq!(summary.total(), 4);
        assert_eq!(summary.exit_status(), 2);
    }

    #[test]
    fn test_clean_run_exits_zero() {
        let summary = Summary::of(&result_with(&[Level::Warning, Level::Notice]));
        assert_eq!(summary.exit_status(), 0);
    }

    #[test]
    fn test_exit_status_clamped() {
        assert_eq!(exit_status_for(0), 0);
        assert_eq!(exit_status_for(100), 100);
        assert_eq!(exit_status_for(300), MAX_FINDINGS_STATUS);
        let summary = Summary::of(&result_with(&vec![Level::Error; 257]));
        assert_eq!(summary.error_count(), 257);
        assert_eq!(summary.exit_status(), MAX_FINDINGS_STATUS);
    }
}
