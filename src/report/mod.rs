// SPDX-License-Identifier: PMPL-1.0-or-later
//! Report generation for run results.
//!
//! Supports multiple output formats:
//! - Cli: human-readable findings in result order, prefixed by level
//! - Json: run metadata and findings for programmatic consumption
//! - Csv: one row per finding for spreadsheets

use crate::finding::RunResult;
use crate::selector::RunOptions;
use crate::summary::Summary;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::{self, Write};

/// Describes the run a report is about
#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    pub tool_name: String,
    pub tool_version: String,
    /// The file, markup or URL that was tested
    pub context: String,
    pub options: RunOptions,
    pub started_at: DateTime<Utc>,
}

impl RunMetadata {
    /// Metadata for this build of the tool
    pub fn new(context: &str, options: RunOptions) -> Self {
        Self {
            tool_name: env!("CARGO_PKG_NAME").to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            context: context.to_string(),
            options,
            started_at: Utc::now(),
        }
    }
}

/// Renders a run result
pub trait Reporter {
    fn report(&self, meta: &RunMetadata, out: &mut dyn Write, result: &RunResult) -> io::Result<()>;
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Cli,
    /// Structured JSON
    Json,
    /// Comma-separated values
    Csv,
}

impl OutputFormat {
    pub fn reporter(&self) -> Box<dyn Reporter> {
        match self {
            OutputFormat::Cli => Box::new(CliReporter),
            OutputFormat::Json => Box::new(JsonReporter),
            OutputFormat::Csv => Box::new(CsvReporter),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Cli => write!(f, "cli"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cli" | "text" => Ok(OutputFormat::Cli),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("Unknown reporter: {}", other)),
        }
    }
}

/// Render a report into a string
pub fn generate_report(meta: &RunMetadata, result: &RunResult, format: OutputFormat) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail
    let _ = format.reporter().report(meta, &mut buf, result);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Human-readable text report
pub struct CliReporter;

impl Reporter for CliReporter {
    fn report(&self, meta: &RunMetadata, out: &mut dyn Write, result: &RunResult) -> io::Result<()> {
        writeln!(out, "=== {} {} ===", meta.tool_name, meta.tool_version)?;
        writeln!(out, "Results for {}", display_context(&meta.context))?;
        writeln!(out)?;

        let summary = Summary::of(result);

        if result.is_empty() {
            writeln!(out, "No accessibility issues found.")?;
        } else {
            writeln!(
                out,
                "Found {} issue(s): {} error(s), {} warning(s), {} notice(s)",
                summary.total(),
                summary.errors,
                summary.warnings,
                summary.notices
            )?;
            writeln!(out)?;

            for finding in result.findings() {
                writeln!(out, "{} [{}] {}", finding.level, finding.code, finding.message)?;
                writeln!(out, "  Evidence: {}", finding.evidence)?;
                writeln!(out)?;
            }
        }

        for timeout in result.timed_out() {
            writeln!(
                out,
                "SKIPPED: {} did not finish within {}ms",
                timeout.rule_id, timeout.after_ms
            )?;
        }
        if result.was_cancelled() {
            writeln!(out, "CANCELLED: not every selected rule was run")?;
        }

        if summary.errors > 0 {
            writeln!(out, "RESULT: FAIL ({} error(s))", summary.errors)?;
        } else if result.is_partial() {
            writeln!(out, "RESULT: INCOMPLETE")?;
        } else if summary.total() > 0 {
            writeln!(out, "RESULT: PASS WITH WARNINGS")?;
        } else {
            writeln!(out, "RESULT: PASS")?;
        }
        Ok(())
    }
}

/// Long inline markup is shortened for the heading line
fn display_context(context: &str) -> String {
    const MAX: usize = 60;
    let flat = context.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > MAX {
        format!("{}...", flat.chars().take(MAX).collect::<String>())
    } else {
        flat
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    meta: &'a RunMetadata,
    summary: Summary,
    #[serde(flatten)]
    result: &'a RunResult,
}

/// Structured JSON report
pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn report(&self, meta: &RunMetadata, out: &mut dyn Write, result: &RunResult) -> io::Result<()> {
        let report = JsonReport {
            meta,
            summary: Summary::of(result),
            result,
        };
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)
    }
}

/// CSV report, one finding per row
pub struct CsvReporter;

impl Reporter for CsvReporter {
    fn report(&self, _meta: &RunMetadata, out: &mut dyn Write, result: &RunResult) -> io::Result<()> {
        writeln!(out, "\"code\",\"level\",\"message\",\"evidence\"")?;
        for finding in result.findings() {
            writeln!(
                out,
                "{},{},{},{}",
                csv_field(&finding.code),
                csv_field(finding.level.as_str()),
                csv_field(&finding.message),
                csv_field(&finding.evidence)
            )?;
        }
        Ok(())
    }
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::{Finding, Level, ResultAggregator, RuleTimeout};
    use std::time::Duration;

    fn sample_result() -> RunResult {
        let mut agg = ResultAggregator::new();
        agg.append_batch(vec![
            Finding::new(
                "wcag-1.1.1-h37",
                Level::Error,
                "Images must have an `alt` attribute",
                r#"<img src="a.png">"#,
            ),
            Finding::new("wcag-2.4.6-g130", Level::Warning, "Empty heading", "<h2></h2>"),
        ]);
        agg.freeze()
    }

    fn meta() -> RunMetadata {
        RunMetadata::new("index.html", RunOptions::with_suite("wcag2aa"))
    }

    #[test]
    fn test_cli_report_empty() {
        let report = generate_report(&meta(), &RunResult::default(), OutputFormat::Cli);
        assert!(report.contains("No accessibility issues found"));
        assert!(report.contains("RESULT: PASS"));
    }

    #[test]
    fn test_cli_report_with_findings() {
        let report = generate_report(&meta(), &sample_result(), OutputFormat::Cli);
        assert!(report.contains("Results for index.html"));
        assert!(report.contains("ERROR [wcag-1.1.1-h37]"));
        assert!(report.contains("WARNING [wcag-2.4.6-g130] Empty heading"));
        assert!(report.contains("RESULT: FAIL (1 error(s))"));
    }

    #[test]
    fn test_cli_report_keeps_result_order() {
        let mut agg = ResultAggregator::new();
        agg.append_batch(vec![
            Finding::new("wcag-2.4.9-g91", Level::Notice, "Generic link", "<a>more</a>"),
            Finding::new("wcag-1.1.1-h37", Level::Error, "Missing alt", "<img>"),
            Finding::new("wcag-2.4.6-g130", Level::Warning, "Empty heading", "<h2></h2>"),
        ]);
        let report = generate_report(&meta(), &agg.freeze(), OutputFormat::Cli);

        let notice = report.find("NOTICE [wcag-2.4.9-g91]").unwrap();
        let error = report.find("ERROR [wcag-1.1.1-h37]").unwrap();
        let warning = report.find("WARNING [wcag-2.4.6-g130]").unwrap();
        assert!(notice < error && error < warning);
    }

    #[test]
    fn test_cli_report_marks_skipped_rules() {
        let mut agg = ResultAggregator::new();
        agg.record_timeout(RuleTimeout::new("wcag-1.1.1-h37", Duration::from_millis(10)));
        let report = generate_report(&meta(), &agg.freeze(), OutputFormat::Cli);
        assert!(report.contains("SKIPPED: wcag-1.1.1-h37"));
        assert!(report.contains("RESULT: INCOMPLETE"));
    }

    #[test]
    fn test_json_report() {
        let report = generate_report(&meta(), &sample_result(), OutputFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&report).expect("valid JSON");
        assert_eq!(parsed["tool_name"], "wcagbot");
        assert_eq!(parsed["context"], "index.html");
        assert_eq!(parsed["options"]["suite"], "wcag2aa");
        assert_eq!(parsed["summary"]["errors"], 1);
        assert_eq!(parsed["findings"][0]["code"], "wcag-1.1.1-h37");
        assert_eq!(parsed["findings"][1]["level"], "warning");
        assert_eq!(parsed["cancelled"], false);
    }

    #[test]
    fn test_csv_report_escapes_quotes() {
        let report = generate_report(&meta(), &sample_result(), OutputFormat::Csv);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "\"code\",\"level\",\"message\",\"evidence\"");
        assert!(lines[1].ends_with(r#""<img src=""a.png"">""#));
        assert!(lines[2].starts_with("\"wcag-2.4.6-g130\",\"warning\""));
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("cli".parse::<OutputFormat>().unwrap(), OutputFormat::Cli);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert!("sarif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_display_context_shortens_markup() {
        let long = format!("<p>{}</p>", "x".repeat(100));
        assert!(display_context(&long).ends_with("..."));
        assert_eq!(display_context("page.html"), "page.html");
    }
}
