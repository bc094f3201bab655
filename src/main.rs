//! Zentinel SQL Guard CLI
//!
//! Command-line interface for structural SQL injection detection.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use zentinel_sqlguard::{compare, HarnessConfig, Report};

/// Version information
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit code when a checked query diverges from its template
const EXIT_INJECTION: u8 = 2;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "sqlguard", version)]
#[command(about = "Detect SQL injection by comparing query skeletons against static templates")]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true, env = "SQLGUARD_VERBOSE")]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true, env = "SQLGUARD_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the detection report over a template and attack catalog
    Report {
        /// Path to a JSON harness config (built-in catalog if omitted)
        #[arg(short, long, env = "SQLGUARD_CONFIG")]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Discarded detections before each timed one (overrides the config)
        #[arg(long)]
        warmup: Option<u32>,
    },

    /// Check a single runtime query against a template
    Check {
        /// Static query template
        #[arg(short, long)]
        template: String,

        /// Runtime query to check
        #[arg(short, long)]
        query: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn init_tracing(args: &Args) {
    let log_level = if args.verbose { "debug" } else { "info" };
    let filter = format!(
        "{}={},zentinel_sqlguard={}",
        env!("CARGO_CRATE_NAME"),
        log_level,
        log_level
    );

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if args.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run_report(config: Option<PathBuf>, format: OutputFormat, warmup: Option<u32>) -> Result<()> {
    let mut config = match config {
        Some(path) => HarnessConfig::from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => HarnessConfig::default(),
    };
    if let Some(warmup) = warmup {
        config.warmup_iterations = warmup;
    }

    info!(
        attacks = config.attacks.len(),
        warmup_iterations = config.warmup_iterations,
        "Configuration loaded"
    );

    let report = Report::run(&config);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Text => report.write_text(&mut out)?,
        OutputFormat::Json => writeln!(out, "{}", report.to_json()?)?,
    }

    Ok(())
}

fn run_check<W: Write>(out: &mut W, template: &str, query: &str) -> Result<bool> {
    let comparison = compare(template, query);

    writeln!(out, "Template skeleton: {}", comparison.template)?;
    writeln!(out, "Runtime skeleton:  {}", comparison.runtime)?;
    match comparison.divergence {
        Some(at) => writeln!(out, "RESULT: SQL injection detected! (divergence at byte {})", at)?,
        None => writeln!(out, "RESULT: No SQL injection detected.")?,
    }

    Ok(comparison.is_injection())
}

/// Process exit status for a `check` verdict
fn check_status(detected: bool) -> u8 {
    if detected {
        EXIT_INJECTION
    } else {
        0
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args);

    info!(version = VERSION, "Starting sqlguard");

    let result = match args.command {
        Command::Report {
            config,
            format,
            warmup,
        } => run_report(config, format, warmup).map(|()| ExitCode::SUCCESS),
        Command::Check { template, query } => {
            let stdout = std::io::stdout();
            run_check(&mut stdout.lock(), &template, &query)
                .map(|detected| ExitCode::from(check_status(detected)))
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "sqlguard failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
