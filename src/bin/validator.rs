//! Schema Validator CLI
//!
//! Validates the rows of an exported worksheet against a table schema and
//! logs every offending value.
//!
//! Usage:
//!   schema-validator --schema stocks_schema.json --worksheet daily_stocks_summary.json
//!   schema-validator --help

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sheet_schemas::config::{LoggingConfig, OutputFormat};
use sheet_schemas::{
    row, Checksum, CollectingSink, Schema, TracingSink, ValidationReport, Validator, ValidatorConfig,
};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-validator")]
#[command(about = "Validate worksheet rows against a table schema")]
struct Cli {
    /// Schema file (JSON, tables in column order)
    #[arg(short, long)]
    schema: PathBuf,

    /// Exported worksheet rows (JSON array of rows)
    #[arg(short, long)]
    worksheet: PathBuf,

    /// Config file to load on top of the defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the date-named log file
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Leave the first row (worksheet header) unchecked
    #[arg(long)]
    skip_header: bool,

    /// Summary output on stdout
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Write the JSON report to a file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Exit with status 2 when any violation is found
    #[arg(long)]
    fail_on_violations: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match cli.config.as_deref() {
        Some(path) => ValidatorConfig::load_from(Some(path)),
        None => ValidatorConfig::load(),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            return ExitCode::from(1);
        }
    };
    if let Some(dir) = &cli.log_dir {
        config.logging.dir = dir.clone();
    }

    let _guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            return ExitCode::from(1);
        }
    };

    match run(&cli, &config) {
        Ok(has_violations) => {
            if has_violations && (cli.fail_on_violations || config.validation.fail_on_violations) {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

/// Log to a file named by today's date, and to stderr unless disabled
fn init_logging(logging: &LoggingConfig) -> Result<WorkerGuard> {
    fs::create_dir_all(&logging.dir)
        .with_context(|| format!("cannot create log directory {}", logging.dir.display()))?;

    let file_name = logging.file_name(chrono::Local::now().date_naive());
    let file_appender = tracing_appender::rolling::never(&logging.dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level))
    };

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(non_blocking)
        .with_filter(filter());

    let stderr_layer = logging.stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(filter())
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(guard)
}

fn run(cli: &Cli, config: &ValidatorConfig) -> Result<bool> {
    info!("Loading schema from {}", cli.schema.display());
    let schema = Schema::load(&cli.schema)
        .with_context(|| format!("cannot load schema {}", cli.schema.display()))?;
    info!(
        checksum = schema.checksum().map(Checksum::short).unwrap_or("-"),
        tables = schema.len(),
        "Schema loaded"
    );
    if schema.is_empty() {
        warn!("Schema defines no tables, nothing will be checked");
    }

    info!("Reading worksheet rows from {}", cli.worksheet.display());
    let rows = row::load_rows(&cli.worksheet)
        .with_context(|| format!("cannot read worksheet {}", cli.worksheet.display()))?;

    let skip_rows = if cli.skip_header {
        1
    } else {
        config.validation.skip_header_rows
    };

    let mut sink = (TracingSink, CollectingSink::default());
    let summary = Validator::new(&schema)
        .skip_header_rows(skip_rows)
        .run(&rows, &mut sink);

    let report = ValidationReport::new(schema.checksum().cloned(), sink.1);
    let pretty = config.report.output_format == OutputFormat::Pretty;

    if let Some(path) = &cli.output {
        write_report(&report, path, pretty)?;
    }

    match cli.format {
        Format::Json => println!("{}", report.to_json(pretty)?),
        Format::Text => {
            let marker = if report.has_violations() { "❌" } else { "✅" };
            println!(
                "{} {} violation(s) in {} row(s) across {} table(s), {} row fault(s)",
                marker,
                summary.violations,
                summary.rows_checked,
                summary.tables_checked,
                summary.row_faults
            );
        }
    }

    Ok(report.has_violations())
}

fn write_report(report: &ValidationReport, path: &Path, pretty: bool) -> Result<()> {
    report
        .write_to(path, pretty)
        .with_context(|| format!("cannot write report {}", path.display()))?;
    info!("Report written to {}", path.display());
    Ok(())
}
