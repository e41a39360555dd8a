// SPDX-License-Identifier: PMPL-1.0-or-later
//! wcagbot CLI - run WCAG rule suites against an HTML document

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wcagbot::config::{timeout_from_ms, EngineConfig};
use wcagbot::error::EXIT_INTERNAL;
use wcagbot::report::{OutputFormat, RunMetadata};
use wcagbot::{selector, CancelHandle, DocumentSource, Engine, RuleCatalog, RunOptions, Summary};

/// Run WCAG accessibility rules against an HTML document
#[derive(Parser)]
#[command(name = "wcagbot")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Test a document; exits with the number of errors found
    Check {
        /// File path or HTML string to test (stdin if omitted or `-`)
        context: Option<String>,

        /// Comma-separated rules to ignore
        #[arg(short, long, value_delimiter = ',')]
        ignore: Vec<String>,

        /// Comma-separated rules to run instead of a suite
        #[arg(short, long, value_delimiter = ',', conflicts_with = "suite")]
        rules: Vec<String>,

        /// Suite to take rules from
        #[arg(short, long)]
        suite: Option<String>,

        /// User agent recorded with the results
        #[arg(short = 'u', long = "useragent")]
        user_agent: Option<String>,

        /// Output format
        #[arg(short = 'R', long, default_value = "cli")]
        reporter: FormatArg,

        /// Per-rule timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// List available suites
    Suites {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// List available rules
    Rules {
        /// Enable verbose logging
        #[arg(long, short)]
        verbose: bool,
    },
}

#[derive(clap::Args)]
struct CommonArgs {
    /// Directory of additional suite files
    #[arg(long)]
    suites_dir: Option<PathBuf>,

    /// Configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short)]
    verbose: bool,
}

/// Output format CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Human-readable text
    Cli,
    /// Structured JSON
    Json,
    /// Comma-separated values
    Csv,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Cli => OutputFormat::Cli,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Csv => OutputFormat::Csv,
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("wcagbot=debug")
    } else {
        EnvFilter::new("wcagbot=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let status = match run(cli).await {
        Ok(status) => status,
        Err(err) => {
            eprintln!("{}", format!("Error: {:#}", err).red());
            err.downcast_ref::<wcagbot::Error>()
                .map_or(EXIT_INTERNAL, wcagbot::Error::exit_status)
        }
    };

    std::process::exit(status);
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Commands::Check {
            context,
            ignore,
            rules,
            suite,
            user_agent,
            reporter,
            timeout_ms,
            common,
        } => {
            init_logging(common.verbose);
            let mut config = load_config(&common)?;
            if let Some(ms) = timeout_ms {
                config.rule_timeout = timeout_from_ms(ms)?;
            }

            let options = RunOptions {
                ignore,
                rules,
                suite,
                user_agent,
            };
            check(context, options, reporter.into(), &config).await
        }

        Commands::Suites { common } => {
            init_logging(common.verbose);
            let config = load_config(&common)?;
            for name in config.suites()?.list_suite_names() {
                println!("{}", name);
            }
            Ok(0)
        }

        Commands::Rules { verbose } => {
            init_logging(verbose);
            for rule in RuleCatalog::builtin().iter() {
                println!("{:<18} {}", rule.id(), rule.description());
            }
            Ok(0)
        }
    }
}

fn load_config(common: &CommonArgs) -> anyhow::Result<EngineConfig> {
    let mut config = EngineConfig::load(common.config.as_deref())?;
    if let Some(dir) = &common.suites_dir {
        config.suites_dir = Some(dir.clone());
    }
    Ok(config)
}

async fn check(
    context: Option<String>,
    options: RunOptions,
    format: OutputFormat,
    config: &EngineConfig,
) -> anyhow::Result<i32> {
    let suites = config.suites()?;
    let engine = Engine::new(Arc::new(RuleCatalog::builtin())).with_rule_timeout(config.rule_timeout);

    // Selection errors are reported before the document is touched
    let selection =
        selector::resolve_with_default(&options, &suites, engine.catalog(), &config.default_suite)?;

    let source = DocumentSource::classify(context.as_deref());
    let document = source.load()?;

    let cancel = CancelHandle::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let meta = RunMetadata::new(context.as_deref().unwrap_or("-"), options);
    let result = engine.run_with_cancel(&document, &selection, &cancel).await?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    format
        .reporter()
        .report(&meta, &mut out, &result)
        .context("failed to write report")?;

    let summary = Summary::of(&result);
    info!(
        "{} error(s), {} warning(s), {} notice(s)",
        summary.errors, summary.warnings, summary.notices
    );
    Ok(summary.exit_status())
}
