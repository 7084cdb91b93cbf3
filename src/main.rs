//! `fastnorm` - normalize every row of a comma-separated matrix with one of
//! four inverse square root strategies and report resource usage.

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use clap::error::ErrorKind;
use tracing_subscriber::EnvFilter;

use fastnorm::{Method, ReportFormat, RunConfig};

const METHOD_HELP: &str =
    "Method: 1 for Lookup Table, 2 for Quake III, 3 for hardware rsqrt and any other number to default";

/// Benchmark inverse square root strategies by L2-normalizing matrix rows
#[derive(Parser)]
#[command(name = "fastnorm")]
#[command(version)]
#[command(after_help = METHOD_HELP)]
struct Cli {
    /// Strategy code: 1 lookup, 2 Quake III, 3 hardware, anything else exact
    #[arg(allow_hyphen_values = true)]
    method: String,

    /// Comma-separated feature file, one row per line
    path: PathBuf,

    /// Optional configuration file (toml, yaml or json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter directive; overrides the configuration file
    #[arg(long)]
    log_level: Option<String>,

    /// Write the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = parse_cli();

    let mut config = RunConfig::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config = config.with_log_level(level);
    }
    if cli.json {
        config = config.with_report_format(ReportFormat::Json);
    }
    config.validate()?;
    init_tracing(&config)?;

    let method = Method::from_arg(&cli.method);
    tracing::debug!(
        method = method.name(),
        hardware_rsqrt = fastnorm::hardware_rsqrt_available(),
        "selected strategy"
    );

    let report = fastnorm::run(method, &cli.path)
        .with_context(|| format!("failed to process {}", cli.path.display()))?;

    let mut out = BufWriter::new(io::stdout().lock());
    match config.report_format {
        ReportFormat::Text => write!(out, "{report}")?,
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &report.to_json())?;
            writeln!(out)?;
        }
    }
    out.flush()?;

    Ok(())
}

/// Usage errors go to stdout with exit status 1; help and version behave as usual.
fn parse_cli() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            print!("{}", err.render());
            println!("{METHOD_HELP}");
            std::process::exit(1);
        }
    }
}

/// Logs go to stderr so stdout carries only the report.
fn init_tracing(config: &RunConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&config.log_level)
        .with_context(|| format!("invalid log level {:?}", config.log_level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);

    if config.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}
