// SPDX-License-Identifier: PMPL-1.0-or-later
//! Findings and run results.
//!
//! A [`Finding`] is one reported instance of a rule's condition. Findings are
//! collected by the [`ResultAggregator`] during a run and exposed afterwards
//! as a frozen [`RunResult`].

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Severity of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Fails the run
    Error,
    /// Should be addressed
    Warning,
    /// Informational
    Notice,
}

impl Level {
    /// Lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Notice => "notice",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Error => write!(f, "ERROR"),
            Level::Warning => write!(f, "WARNING"),
            Level::Notice => write!(f, "NOTICE"),
        }
    }
}

impl std::str::FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Level::Error),
            "warning" => Ok(Level::Warning),
            "notice" => Ok(Level::Notice),
            other => Err(format!("Unknown level: {}", other)),
        }
    }
}

/// A single accessibility finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Identifier of the rule that produced this finding
    pub code: String,
    /// Severity
    pub level: Level,
    /// Human-readable message
    pub message: String,
    /// Serialized markup that triggered the finding
    pub evidence: String,
}

impl Finding {
    /// Create a new finding
    pub fn new(code: &str, level: Level, message: &str, evidence: &str) -> Self {
        Self {
            code: code.to_string(),
            level,
            message: message.to_string(),
            evidence: evidence.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }
}

/// A rule that did not complete within the configured bound
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTimeout {
    pub rule_id: String,
    /// The bound that was exceeded, in milliseconds
    pub after_ms: u64,
}

impl RuleTimeout {
    pub fn new(rule_id: &str, after: Duration) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            after_ms: after.as_millis() as u64,
        }
    }
}

/// The frozen outcome of one run over one document.
///
/// Findings are ordered by rule resolution order, then by the order each rule
/// reported them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    findings: Vec<Finding>,
    timed_out: Vec<RuleTimeout>,
    cancelled: bool,
    rules_completed: usize,
}

impl RunResult {
    /// All findings in canonical order
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Get findings by level
    pub fn by_level(&self, level: Level) -> Vec<&Finding> {
        self.findings.iter().filter(|f| f.level == level).collect()
    }

    /// Get findings reported by a single rule
    pub fn by_code(&self, code: &str) -> Vec<&Finding> {
        self.findings.iter().filter(|f| f.code == code).collect()
    }

    /// Get all errors
    pub fn errors(&self) -> Vec<&Finding> {
        self.by_level(Level::Error)
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(Finding::is_error)
    }

    /// Rules abandoned after exceeding the per-rule timeout
    pub fn timed_out(&self) -> &[RuleTimeout] {
        &self.timed_out
    }

    /// Whether dispatch stopped early because of cancellation
    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Number of rules that ran to completion
    pub fn rules_completed(&self) -> usize {
        self.rules_completed
    }

    /// True if some selected rule did not contribute to this result
    pub fn is_partial(&self) -> bool {
        self.cancelled || !self.timed_out.is_empty()
    }

    /// Total count
    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// Is empty
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Append-only collection written by the engine during a run.
///
/// Findings arrive one completed rule at a time, so a rule's batch is never
/// interleaved with another's.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    result: RunResult,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the findings of one completed rule
    pub fn append_batch(&mut self, findings: Vec<Finding>) {
        self.result.findings.extend(findings);
        self.result.rules_completed += 1;
    }

    /// Record a rule that never completed
    pub fn record_timeout(&mut self, timeout: RuleTimeout) {
        self.result.timed_out.push(timeout);
    }

    /// Mark the run as cancelled before all rules were dispatched
    pub fn mark_cancelled(&mut self) {
        self.result.cancelled = true;
    }

    /// Findings collected so far
    pub fn len(&self) -> usize {
        self.result.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.result.findings.is_empty()
    }

    /// Close the aggregator and expose the read-only result
    pub fn freeze(self) -> RunResult {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(code: &str, level: Level) -> Finding {
        Finding::new(code, level, "message", "<img>")
    }

    #[test]
    fn test_aggregator_preserves_batch_order() {
        let mut agg = ResultAggregator::new();
        agg.append_batch(vec![finding("b", Level::Error), finding("b", Level::Warning)]);
        agg.append_batch(vec![]);
        agg.append_batch(vec![finding("a", Level::Notice)]);

        let result = agg.freeze();
        let codes: Vec<&str> = result.findings().iter().map(|f| f.code.as_str()).collect();
        assert_eq!(codes, vec!["b", "b", "a"]);
        assert_eq!(result.rules_completed(), 3);
        assert!(!result.is_partial());
    }

    #[test]
    fn test_no_deduplication() {
        let mut agg = ResultAggregator::new();
        agg.append_batch(vec![finding("a", Level::Error), finding("a", Level::Error)]);
        assert_eq!(agg.freeze().len(), 2);
    }

    #[test]
    fn test_timeout_marks_partial() {
        let mut agg = ResultAggregator::new();
        agg.record_timeout(RuleTimeout::new("slow", Duration::from_millis(250)));
        let result = agg.freeze();
        assert!(result.is_partial());
        assert!(!result.was_cancelled());
        assert_eq!(result.timed_out()[0].after_ms, 250);
    }

    #[test]
    fn test_by_level_and_errors() {
        let mut agg = ResultAggregator::new();
        agg.append_batch(vec![
            finding("a", Level::Error),
            finding("b", Level::Warning),
            finding("c", Level::Error),
        ]);
        let result = agg.freeze();
        assert_eq!(result.errors().len(), 2);
        assert_eq!(result.by_level(Level::Warning).len(), 1);
        assert_eq!(result.by_code("c").len(), 1);
        assert!(result.has_errors());
    }

    #[test]
    fn test_level_parse_and_serde() {
        assert_eq!("warning".parse::<Level>().unwrap(), Level::Warning);
        assert_eq!("NOTICE".parse::<Level>().unwrap(), Level::Notice);
        assert!("fatal".parse::<Level>().is_err());
        assert_eq!(serde_json::to_string(&Level::Error).unwrap(), "\"error\"");
    }
}
