// SPDX-License-Identifier: PMPL-1.0-or-later
//! Rule selection: turns run options into the ordered list of rules to run.

use crate::error::{Error, Result};
use crate::rules::{RuleCatalog, RuleConfig};
use crate::suite::{SuiteRegistry, DEFAULT_SUITE};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// What the caller asked to run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Rules subtracted from the base set
    #[serde(default)]
    pub ignore: Vec<String>,
    /// Explicit rule list; when non-empty the suite is not consulted
    #[serde(default)]
    pub rules: Vec<String>,
    /// Suite supplying the base set when no explicit rules are given
    pub suite: Option<String>,
    /// Recorded for reporting only
    pub user_agent: Option<String>,
}

impl RunOptions {
    pub fn with_suite(suite: &str) -> Self {
        Self {
            suite: Some(suite.to_string()),
            ..Self::default()
        }
    }

    pub fn with_rules<S: AsRef<str>>(rules: &[S]) -> Self {
        Self {
            rules: rules.iter().map(|r| r.as_ref().to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn ignoring<S: AsRef<str>>(mut self, ignore: &[S]) -> Self {
        self.ignore = ignore.iter().map(|r| r.as_ref().to_string()).collect();
        self
    }
}

/// One resolved rule and the configuration it runs with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedRule {
    pub id: String,
    pub config: RuleConfig,
}

/// The ordered rule list for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    rules: Vec<SelectedRule>,
}

impl Selection {
    pub fn rules(&self) -> &[SelectedRule] {
        &self.rules
    }

    pub fn ids(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Resolve `options` against the registry and catalog.
///
/// An explicit rule list wins over the suite; otherwise the named suite (or
/// [`DEFAULT_SUITE`]) is used. Ignored rules are then removed. The base
/// order is kept as declared.
pub fn resolve(
    options: &RunOptions,
    suites: &SuiteRegistry,
    catalog: &RuleCatalog,
) -> Result<Selection> {
    resolve_with_default(options, suites, catalog, DEFAULT_SUITE)
}

/// As [`resolve`], with a configurable fallback suite
pub fn resolve_with_default(
    options: &RunOptions,
    suites: &SuiteRegistry,
    catalog: &RuleCatalog,
    default_suite: &str,
) -> Result<Selection> {
    for id in options.rules.iter().chain(options.ignore.iter()) {
        ensure_known(id, catalog)?;
    }

    let base: Vec<SelectedRule> = if !options.rules.is_empty() {
        options
            .rules
            .iter()
            .map(|id| SelectedRule {
                id: id.clone(),
                config: RuleConfig::default(),
            })
            .collect()
    } else {
        let name = options.suite.as_deref().unwrap_or(default_suite);
        let suite = suites.resolve_suite(name)?;
        debug!("Using suite {} ({} rules)", name, suite.rules.len());
        suite
            .rules
            .iter()
            .map(|rule| {
                ensure_known(&rule.id, catalog)?;
                Ok(SelectedRule {
                    id: rule.id.clone(),
                    config: rule.config,
                })
            })
            .collect::<Result<Vec<_>>>()?
    };

    let ignored: HashSet<&str> = options.ignore.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    let rules: Vec<SelectedRule> = base
        .into_iter()
        .filter(|rule| !ignored.contains(rule.id.as_str()))
        .filter(|rule| seen.insert(rule.id.clone()))
        .collect();

    debug!("Selected {} rule(s)", rules.len());
    Ok(Selection { rules })
}

fn ensure_known(id: &str, catalog: &RuleCatalog) -> Result<()> {
    if catalog.contains(id) {
        Ok(())
    } else {
        Err(Error::UnknownRule(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::Level;
    use crate::suite::Suite;

    fn fixtures() -> (SuiteRegistry, RuleCatalog) {
        (SuiteRegistry::builtin().unwrap(), RuleCatalog::builtin())
    }

    #[test]
    fn test_default_suite_minus_ignore() {
        let (suites, catalog) = fixtures();
        let options = RunOptions::default().ignoring(&["wcag-1.1.1-h37"]);
        let selection = resolve(&options, &suites, &catalog).unwrap();

        let expected: Vec<&str> = suites
            .resolve_suite(DEFAULT_SUITE)
            .unwrap()
            .rule_ids()
            .filter(|id| *id != "wcag-1.1.1-h37")
            .collect();
        assert_eq!(selection.ids(), expected);
    }

    #[test]
    fn test_explicit_rules_win_over_suite_and_keep_order() {
        let (suites, catalog) = fixtures();
        let options = RunOptions {
            rules: vec!["wcag-3.1.1-h57".into(), "wcag-1.1.1-h37".into()],
            suite: Some("wcag2aaa".into()),
            ..RunOptions::default()
        };
        let selection = resolve(&options, &suites, &catalog).unwrap();
        assert_eq!(selection.ids(), vec!["wcag-3.1.1-h57", "wcag-1.1.1-h37"]);
    }

    #[test]
    fn test_duplicate_explicit_rules_keep_first_position() {
        let (suites, catalog) = fixtures();
        let options = RunOptions::with_rules(&["wcag-1.1.1-h37", "wcag-3.1.1-h57", "wcag-1.1.1-h37"]);
        let selection = resolve(&options, &suites, &catalog).unwrap();
        assert_eq!(selection.ids(), vec!["wcag-1.1.1-h37", "wcag-3.1.1-h57"]);
    }

    #[test]
    fn test_ignoring_known_rule_outside_base_is_fine() {
        let (suites, catalog) = fixtures();
        let options = RunOptions::with_suite("wcag2a").ignoring(&["wcag-2.4.9-g91"]);
        let selection = resolve(&options, &suites, &catalog).unwrap();
        assert_eq!(selection.len(), 7);
    }

    #[test]
    fn test_unknown_ignore_entry_fails() {
        let (suites, catalog) = fixtures();
        let options = RunOptions::default().ignoring(&["wcag-1.1.1-h99"]);
        let err = resolve(&options, &suites, &catalog).unwrap_err();
        assert!(matches!(err, Error::UnknownRule(ref id) if id == "wcag-1.1.1-h99"));
    }

    #[test]
    fn test_unknown_explicit_rule_fails() {
        let (suites, catalog) = fixtures();
        let options = RunOptions::with_rules(&["wcag-1.1.1-h37", "h37"]);
        assert!(matches!(
            resolve(&options, &suites, &catalog),
            Err(Error::UnknownRule(_))
        ));
    }

    #[test]
    fn test_unknown_suite_fails() {
        let (suites, catalog) = fixtures();
        let options = RunOptions::with_suite("section508");
        assert!(matches!(
            resolve(&options, &suites, &catalog),
            Err(Error::UnknownSuite(_))
        ));
    }

    #[test]
    fn test_suite_with_unknown_rule_fails() {
        let (mut suites, catalog) = fixtures();
        suites.insert(
            Suite::from_toml("broken", "[[rule]]\nid = \"wcag-0.0.0-x\"\n", "broken.toml").unwrap(),
        );
        let options = RunOptions::with_suite("broken");
        assert!(matches!(
            resolve(&options, &suites, &catalog),
            Err(Error::UnknownRule(_))
        ));
    }

    #[test]
    fn test_suite_config_carried_through() {
        let (mut suites, catalog) = fixtures();
        suites.insert(
            Suite::from_toml(
                "quiet",
                "[[rule]]\nid = \"wcag-1.1.1-h37\"\nlevel = \"notice\"\n",
                "quiet.toml",
            )
            .unwrap(),
        );
        let selection = resolve(&RunOptions::with_suite("quiet"), &suites, &catalog).unwrap();
        assert_eq!(selection.rules()[0].config.level, Some(Level::Notice));
    }

    #[test]
    fn test_configurable_default_suite() {
        let (suites, catalog) = fixtures();
        let selection =
            resolve_with_default(&RunOptions::default(), &suites, &catalog, "test").unwrap();
        assert_eq!(selection.ids(), vec!["wcag-1.1.1-h37"]);
    }
}
