// SPDX-License-Identifier: PMPL-1.0-or-later
//! Engine configuration
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file, then `WCAGBOT_*` environment variables. Command-line flags are
//! applied on top by the binary.

use crate::engine::DEFAULT_RULE_TIMEOUT;
use crate::error::{Error, Result};
use crate::suite::{SuiteRegistry, DEFAULT_SUITE};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_RULE_TIMEOUT_MS: &str = "WCAGBOT_RULE_TIMEOUT_MS";
pub const ENV_DEFAULT_SUITE: &str = "WCAGBOT_DEFAULT_SUITE";
pub const ENV_SUITES_DIR: &str = "WCAGBOT_SUITES_DIR";

/// Resolved engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Bound on a single rule's run time
    pub rule_timeout: Duration,
    /// Suite used when a run names neither rules nor a suite
    pub default_suite: String,
    /// Extra suite definitions loaded on top of the built-in ones
    pub suites_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rule_timeout: DEFAULT_RULE_TIMEOUT,
            default_suite: DEFAULT_SUITE.to_string(),
            suites_dir: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    rule_timeout_ms: Option<u64>,
    default_suite: Option<String>,
    suites_dir: Option<PathBuf>,
}

impl EngineConfig {
    /// Defaults, then `path` if given, then the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(path) = path {
            config.apply_file(path)?;
        }
        config.apply_env(std::env::vars())?;
        Ok(config)
    }

    /// Merge a TOML config file
    pub fn apply_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let file: ConfigFile = toml::from_str(&content)?;

        if let Some(ms) = file.rule_timeout_ms {
            self.rule_timeout = timeout_from_ms(ms)?;
        }
        if let Some(suite) = file.default_suite {
            self.default_suite = suite;
        }
        if let Some(dir) = file.suites_dir {
            // Relative paths are taken from the config file's directory
            self.suites_dir = Some(match path.parent() {
                Some(base) if dir.is_relative() => base.join(dir),
                _ => dir,
            });
        }
        Ok(())
    }

    /// Merge `WCAGBOT_*` variables from an iterator of `(name, value)` pairs
    pub fn apply_env<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            match name.as_str() {
                ENV_RULE_TIMEOUT_MS => {
                    let ms = value.trim().parse::<u64>().map_err(|_| {
                        Error::Config(format!("{} must be a number, got {:?}", name, value))
                    })?;
                    self.rule_timeout = timeout_from_ms(ms)?;
                }
                ENV_DEFAULT_SUITE if !value.trim().is_empty() => {
                    self.default_suite = value.trim().to_string();
                }
                ENV_SUITES_DIR if !value.trim().is_empty() => {
                    self.suites_dir = Some(PathBuf::from(value));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Built-in suites plus those found in `suites_dir`
    pub fn suites(&self) -> Result<SuiteRegistry> {
        let mut registry = SuiteRegistry::builtin()?;
        if let Some(dir) = &self.suites_dir {
            registry.load_dir(dir)?;
        }
        Ok(registry)
    }
}

/// Convert a millisecond setting, rejecting zero
pub fn timeout_from_ms(ms: u64) -> Result<Duration> {
    if ms == 0 {
        return Err(Error::Config("rule timeout must be greater than zero".to_string()));
    }
    Ok(Duration::from_millis(ms))
}
