// SPDX-License-Identifier: PMPL-1.0-or-later
//! Accessibility rules implementing WCAG techniques.
//!
//! Each module groups the techniques for one area. Every rule implements
//! [`Rule`] and is registered in the static [`RuleCatalog::builtin`] table,
//! keyed by its identifier.

pub mod alt_text;
pub mod forms;
pub mod language;
pub mod structure;

use crate::document::DocumentModel;
use crate::error::{Error, Result, RuleError};
use crate::finding::{Finding, Level};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Trait implemented by all rules
///
/// Completion is the returned future resolving. Returning `Err` is a defect
/// in the rule and aborts the whole run; conditions found in the document are
/// reported through the sink instead.
#[async_trait(?Send)]
pub trait Rule: Send + Sync {
    /// Unique identifier, also used as the code of every finding
    fn id(&self) -> &str;

    /// Short description of what this rule checks
    fn description(&self) -> &str;

    /// Level used when the run does not override it
    fn default_level(&self) -> Level {
        Level::Error
    }

    /// Inspect the document and report findings
    async fn evaluate(
        &self,
        document: &DocumentModel,
        sink: &mut FindingSink,
    ) -> std::result::Result<(), RuleError>;
}

/// Per-rule configuration carried by suites
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Overrides the level of every finding this rule reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
}

impl RuleConfig {
    pub fn with_level(level: Level) -> Self {
        Self { level: Some(level) }
    }
}

/// Collects the findings of one rule invocation.
///
/// The sink stamps every finding with the invoking rule's identifier, so a
/// rule cannot report under another rule's code.
#[derive(Debug)]
pub struct FindingSink {
    rule_id: String,
    default_level: Level,
    level_override: Option<Level>,
    findings: Vec<Finding>,
}

impl FindingSink {
    pub fn new(rule: &dyn Rule, config: &RuleConfig) -> Self {
        Self {
            rule_id: rule.id().to_string(),
            default_level: rule.default_level(),
            level_override: config.level,
            findings: Vec::new(),
        }
    }

    /// Report at the rule's default level
    pub fn report(&mut self, message: &str, evidence: &str) {
        self.report_as(self.default_level, message, evidence);
    }

    /// Report at a specific level; a configured override still wins
    pub fn report_as(&mut self, level: Level, message: &str, evidence: &str) {
        let level = self.level_override.unwrap_or(level);
        self.findings
            .push(Finding::new(&self.rule_id, level, message, evidence));
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Hand the collected findings to the aggregator
    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }
}

/// Table of every rule known to the process, in registration order
#[derive(Clone, Default)]
pub struct RuleCatalog {
    rules: Vec<Arc<dyn Rule>>,
    index: HashMap<String, usize>,
}

impl RuleCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in WCAG technique rules
    pub fn builtin() -> Self {
        let rules: Vec<Arc<dyn Rule>> = vec![
            Arc::new(alt_text::ImageInAnchorAlt),
            Arc::new(alt_text::ImageInputAlt),
            Arc::new(alt_text::ImageAlt),
            Arc::new(alt_text::TitledImageAlt),
            Arc::new(forms::ControlLabel),
            Arc::new(structure::PageTitle),
            Arc::new(language::PageLanguage),
            Arc::new(structure::EmptyHeading),
            Arc::new(structure::GenericLinkText),
        ];

        let mut catalog = Self::new();
        for rule in rules {
            let registered = catalog.register(rule);
            debug_assert!(registered.is_ok(), "built-in rule ids must be unique");
        }
        catalog
    }

    /// Add a rule. Fails if the identifier is already taken.
    pub fn register(&mut self, rule: Arc<dyn Rule>) -> Result<()> {
        let id = rule.id().to_string();
        if self.index.contains_key(&id) {
            return Err(Error::Config(format!("Duplicate rule id: {}", id)));
        }
        self.index.insert(id, self.rules.len());
        self.rules.push(rule);
        Ok(())
    }

    /// Look up a rule by identifier
    pub fn get(&self, id: &str) -> Option<&Arc<dyn Rule>> {
        self.index.get(id).map(|&i| &self.rules[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All rules in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Rule>> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl std::fmt::Debug for RuleCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|r| r.id()))
            .finish()
    }
}

/// True when an attribute value is absent or contains only whitespace
pub(crate) fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Run a rule directly and return what it reported. Test helper.
#[cfg(test)]
pub(crate) async fn run_rule(
    rule: &dyn Rule,
    html: &str,
    config: RuleConfig,
) -> Vec<Finding> {
    let document = DocumentModel::parse(html);
    let mut sink = FindingSink::new(rule, &config);
    rule.evaluate(&document, &mut sink)
        .await
        .expect("rule should not fail");
    sink.into_findings()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ids_are_unique() {
        let catalog = RuleCatalog::builtin();
        let ids: std::collections::HashSet<&str> = catalog.iter().map(|r| r.id()).collect();
        assert_eq!(ids.len(), 9);
        assert_eq!(catalog.len(), 9);
        assert!(catalog.contains("wcag-1.1.1-h37"));
        assert!(catalog.get("wcag-9.9.9-nope").is_none());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut catalog = RuleCatalog::builtin();
        let err = catalog.register(Arc::new(alt_text::ImageAlt)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_sink_stamps_code_and_override() {
        let rule = alt_text::ImageAlt;
        let mut sink = FindingSink::new(&rule, &RuleConfig::with_level(Level::Warning));
        sink.report("m", "<img>");
        sink.report_as(Level::Notice, "m", "<img>");
        let findings = sink.into_findings();
        assert!(findings.iter().all(|f| f.code == "wcag-1.1.1-h37"));
        assert!(findings.iter().all(|f| f.level == Level::Warning));
    }

    #[test]
    fn test_rule_config_from_toml() {
        let config: RuleConfig = toml::from_str("level = \"notice\"").unwrap();
        assert_eq!(config.level, Some(Level::Notice));
        let config: RuleConfig = toml::from_str("").unwrap();
        assert_eq!(config, RuleConfig::default());
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(None));
        assert!(is_blank(Some("  ")));
        assert!(!is_blank(Some(" x ")));
    }
}
