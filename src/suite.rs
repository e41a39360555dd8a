// SPDX-License-Identifier: PMPL-1.0-or-later
//! Suite registry.
//!
//! A suite is a named, ordered list of rule identifiers with optional
//! per-rule configuration. The built-in suites are embedded at compile time;
//! more can be loaded from a directory of `*.toml` files. The registry is
//! built once at startup and only read afterwards.

use crate::error::{Error, Result};
use crate::finding::Level;
use crate::rules::RuleConfig;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Suite used when a run names neither rules nor a suite
pub const DEFAULT_SUITE: &str = "wcag2aa";

/// Suites that exist for testing and are never listed
pub const RESERVED_SUITES: &[&str] = &["test"];

const BUILTIN_SUITES: &[(&str, &str)] = &[
    ("wcag2a", include_str!("../suites/wcag2a.toml")),
    ("wcag2aa", include_str!("../suites/wcag2aa.toml")),
    ("wcag2aaa", include_str!("../suites/wcag2aaa.toml")),
    ("test", include_str!("../suites/test.toml")),
];

/// One rule entry of a suite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteRule {
    pub id: String,
    pub config: RuleConfig,
}

/// A named set of rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suite {
    pub name: String,
    pub description: String,
    /// Rules in declaration order
    pub rules: Vec<SuiteRule>,
}

impl Suite {
    /// Parse a suite from its TOML form
    pub fn from_toml(name: &str, content: &str, origin: &str) -> Result<Self> {
        let file: SuiteFile = toml::from_str(content).map_err(|e| Error::SuiteFormat {
            path: origin.to_string(),
            message: e.to_string(),
        })?;

        let rules = file
            .rules
            .into_iter()
            .map(|entry| SuiteRule {
                id: entry.id,
                config: RuleConfig { level: entry.level },
            })
            .collect();

        Ok(Self {
            name: name.to_string(),
            description: file.description.unwrap_or_default(),
            rules,
        })
    }

    /// Rule identifiers in declaration order
    pub fn rule_ids(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.id.as_str())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SuiteFile {
    description: Option<String>,
    #[serde(default, rename = "rule")]
    rules: Vec<SuiteFileRule>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SuiteFileRule {
    id: String,
    level: Option<Level>,
}

/// All suites known to the process
#[derive(Debug, Clone, Default)]
pub struct SuiteRegistry {
    suites: BTreeMap<String, Suite>,
}

impl SuiteRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the embedded suites
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();
        for (name, content) in BUILTIN_SUITES {
            registry.insert(Suite::from_toml(name, content, &format!("<builtin:{}>", name))?);
        }
        Ok(registry)
    }

    /// Add or replace a suite
    pub fn insert(&mut self, suite: Suite) {
        debug!("Registered suite {} ({} rules)", suite.name, suite.rules.len());
        self.suites.insert(suite.name.clone(), suite);
    }

    /// Load every `*.toml` file below `dir`; the file stem is the suite name.
    ///
    /// Returns how many suites were loaded.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            return Err(Error::Config(format!(
                "Suite directory not found: {}",
                dir.display()
            )));
        }

        let mut loaded = 0;
        for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::Config(e.to_string()))?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some("toml")
            {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let content = std::fs::read_to_string(path)?;
            self.insert(Suite::from_toml(name, &content, &path.display().to_string())?);
            loaded += 1;
        }

        info!("Loaded {} suite(s) from {}", loaded, dir.display());
        Ok(loaded)
    }

    /// Public suite names, sorted; reserved names are hidden
    pub fn list_suite_names(&self) -> Vec<String> {
        self.suites
            .keys()
            .filter(|name| !RESERVED_SUITES.contains(&name.as_str()))
            .cloned()
            .collect()
    }

    /// Look up a suite by name
    pub fn resolve_suite(&self, name: &str) -> Result<&Suite> {
        self.suites
            .get(name)
            .ok_or_else(|| Error::UnknownSuite(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.suites.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.suites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }
}
