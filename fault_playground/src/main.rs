//! # Fault Playground
//!
//! Builds a demonstration error chain and reports it through the chosen
//! formatter and logger.

use clap::{Parser, ValueEnum};
use fault_core::catalog::{self, CODE_ERROR};
use fault_core::class::{ErrorClass, BASE};
use fault_core::{ErrorArg, ErrorRecord, FaultResult, Severity};
use fault_report::install::{self, FormatterFeature, FORMATTERS};
use fault_report::{LoggingService, ReportPreferences};
use serde_json::json;
use std::path::PathBuf;

static PLAYGROUND: ErrorClass = ErrorClass::derive("PlaygroundError", &BASE);
static PLAYGROUND_CODED: ErrorClass = ErrorClass::derive("PlaygroundCodedError", &CODE_ERROR);

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Ansi,
    Html,
    Json,
}

impl Format {
    fn key(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Ansi => "ansi",
            Self::Html => "html",
            Self::Json => "json",
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "fault-playground", version, about = "Build and report error chains")]
struct Cli {
    /// Output format for the chain
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Minimum severity that gets logged
    #[arg(long, value_parser = parse_severity)]
    min_severity: Option<Severity>,

    /// Catalog file (.json or .toml) for code-driven errors
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Catalog code for the outermost error; requires --catalog
    #[arg(long, requires = "catalog")]
    code: Option<String>,

    /// Number of records in the generated chain
    #[arg(long, default_value_t = 3)]
    depth: usize,

    /// Log as JSON lines
    #[arg(long)]
    structured: bool,
}

fn parse_severity(value: &str) -> Result<Severity, String> {
    value.parse::<Severity>().map_err(|e| e.to_string())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let mut preferences = ReportPreferences::default();
    if let Some(min_severity) = cli.min_severity {
        preferences.min_severity = min_severity;
    }
    preferences.use_structured_logging |= cli.structured;
    fault_report::config::validate_preferences(&preferences)?;
    log::debug!("{}", fault_report::config::get_config_summary(&preferences));

    install::register_defaults(&PLAYGROUND, &preferences)?;
    install::register_defaults(&PLAYGROUND_CODED, &preferences)?;

    let mut head = build_chain(cli.depth.max(1))?;
    if let (Some(path), Some(code)) = (&cli.catalog, &cli.code) {
        PLAYGROUND_CODED.register_dictionary(catalog::load_dictionary(path)?)?;
        head = ErrorRecord::from_code(
            &PLAYGROUND_CODED,
            code,
            vec![
                json!({"depth": cli.depth, "user": "playground"}).into(),
                head.into(),
            ],
        )?;
        log::info!("built code-driven error {}", code);
    }

    let formatter = head.feature::<FormatterFeature>(FORMATTERS, cli.format.key())?;
    println!("{}", formatter.format_chain()?);

    LoggingService::from_preferences(&preferences).log_most_severe(&head);
    Ok(())
}

/// A chain of `depth` records rooted in an I/O error
fn build_chain(depth: usize) -> FaultResult<ErrorRecord> {
    let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset by peer");
    let mut current = ErrorRecord::construct(
        &PLAYGROUND,
        "upstream request failed",
        vec![
            "NET001".into(),
            json!({"host": "db.internal", "port": 5432}).into(),
            ErrorArg::error(io),
        ],
    )?;

    let severities = [
        Severity::Critical,
        Severity::Warning,
        Severity::Info,
        Severity::Error,
    ];
    for level in 1..depth {
        current = ErrorRecord::builder(format!("layer {} could not recover", level))
            .class(&PLAYGROUND)
            .severity(severities[level % severities.len()])
            .meta("layer", level)
            .cause(current)
            .build()?;
    }
    Ok(current)
}
