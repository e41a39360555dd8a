// SPDX-License-Identifier: PMPL-1.0-or-later
//! wcagbot - WCAG rule-suite runner for HTML documents
//!
//! Evaluates one parsed document against a selected set of accessibility
//! rules and produces an ordered, severity-classified list of findings.
//!
//! ## Pipeline
//!
//! 1. **Suites** ([`suite`]): named rule lists such as `wcag2aa`
//! 2. **Selection** ([`selector`]): suite or explicit rules, minus ignores
//! 3. **Execution** ([`engine`]): each rule awaited in order under a timeout
//! 4. **Results** ([`finding`]): frozen findings plus timeout/cancel markers
//! 5. **Summary** ([`summary`]): error count and exit status
//! 6. **Reporting** ([`report`]): cli, json or csv output
//!
//! ## Rules
//!
//! - **Text alternatives** (1.1.1): H30, H36, H37, H67
//! - **Form labels** (1.3.1): H44
//! - **Page title** (2.4.2): H25
//! - **Headings** (2.4.6): G130
//! - **Link purpose** (2.4.9): G91
//! - **Page language** (3.1.1): H57

pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod finding;
pub mod report;
pub mod rules;
pub mod selector;
pub mod suite;
pub mod summary;

pub use document::{DocumentModel, DocumentSource};
pub use engine::{CancelHandle, Engine};
pub use error::{Error, Result, RuleError};
pub use finding::{Finding, Level, RunResult};
pub use rules::{Rule, RuleCatalog, RuleConfig};
pub use selector::{RunOptions, Selection};
pub use suite::SuiteRegistry;
pub use summary::Summary;
