// SPDX-License-Identifier: PMPL-1.0-or-later
//! Error types for wcagbot

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Exit status for selection failures (unknown suite or rule)
pub const EXIT_SELECTION: i32 = 101;
/// Exit status when the document could not be loaded
pub const EXIT_DOCUMENT: i32 = 102;
/// Exit status when a rule body failed mid-run
pub const EXIT_RULE_EXECUTION: i32 = 103;
/// Exit status for configuration, suite-format and I/O failures
pub const EXIT_INTERNAL: i32 = 104;

/// Fatal errors surfaced to the caller of a run
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown suite: {0}")]
    UnknownSuite(String),

    #[error("Unknown rule: {0}")]
    UnknownRule(String),

    #[error("Document unavailable: {0}")]
    DocumentUnavailable(String),

    #[error("Rule {rule_id} failed: {cause}")]
    RuleExecution {
        rule_id: String,
        cause: RuleError,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid suite file {path}: {message}")]
    SuiteFormat { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Process exit status for this error.
    ///
    /// Always above [`crate::summary::MAX_FINDINGS_STATUS`] so a tool failure
    /// can never be read as a finding count.
    pub fn exit_status(&self) -> i32 {
        match self {
            Error::UnknownSuite(_) | Error::UnknownRule(_) => EXIT_SELECTION,
            Error::DocumentUnavailable(_) => EXIT_DOCUMENT,
            Error::RuleExecution { .. } => EXIT_RULE_EXECUTION,
            Error::Config(_) | Error::SuiteFormat { .. } | Error::Io(_) | Error::Json(_) => {
                EXIT_INTERNAL
            }
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// Defects raised by a rule body. These are never findings.
#[derive(Error, Debug)]
pub enum RuleError {
    #[error("invalid selector `{query}`: {reason}")]
    Selector { query: String, reason: String },

    #[error("{0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::MAX_FINDINGS_STATUS;

    #[test]
    fn test_fatal_statuses_are_outside_findings_range() {
        let errors = vec![
            Error::UnknownSuite("x".into()),
            Error::UnknownRule("x".into()),
            Error::DocumentUnavailable("x".into()),
            Error::RuleExecution {
                rule_id: "x".into(),
                cause: RuleError::Failed("boom".into()),
            },
            Error::Config("x".into()),
        ];
        for err in errors {
            assert!(err.exit_status() > MAX_FINDINGS_STATUS, "{err}");
        }
    }

    #[test]
    fn test_rule_execution_message_names_rule() {
        let err = Error::RuleExecution {
            rule_id: "wcag-1.1.1-h37".into(),
            cause: RuleError::Failed("boom".into()),
        };
        assert_eq!(err.to_string(), "Rule wcag-1.1.1-h37 failed: boom");
    }
}
