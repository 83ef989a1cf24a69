use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

mod config;
mod format;
mod paths;
mod registry;
mod runner;
mod summary;

use anyhow::Context;
use log::{error, info};

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "esper-run")]
#[command(about = "Run one Esper benchmark query with a timeout", long_about = None)]
struct Cli {
    /// Query name, e.g. vwap, query3, serverload.
    query: String,

    /// Results sample frequency.
    #[arg(short, long, default_value_t = config::DEFAULT_SAMPLE,
          value_parser = clap::value_parser!(u32).range(1..), value_name = "#RESULTS")]
    sample: u32,

    /// Termination polling period.
    #[arg(short, long, default_value_t = config::DEFAULT_POLL_SECS,
          value_parser = clap::value_parser!(u64).range(1..), value_name = "SECS")]
    poll: u64,

    /// Execution timeout.
    #[arg(short, long, default_value = "6000.0", value_parser = parse_timeout, value_name = "SECS")]
    timeout: Duration,

    /// Esper directory.
    #[arg(short, long, default_value = config::DEFAULT_ESPER_DIR, value_name = "DIR")]
    esperdir: PathBuf,

    /// Query directory.
    #[arg(short, long, default_value = config::DEFAULT_QUERY_DIR, value_name = "DIR")]
    querydir: PathBuf,

    /// Data directory (defaults to the query family's own).
    #[arg(short, long, value_name = "DIR")]
    datadir: Option<PathBuf>,

    /// Output directory for the run log.
    #[arg(short, long, value_name = "DIR")]
    outdir: Option<PathBuf>,

    /// Directory containing the run_*.sh launcher scripts [default: current directory].
    #[arg(long, value_name = "DIR")]
    scriptdir: Option<PathBuf>,

    /// Write a JSON summary of the run here.
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Validate and print the engine command without running it.
    #[arg(long)]
    dry_run: bool,
}

fn parse_timeout(s: &str) -> std::result::Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if secs <= 0.0 {
        return Err(format!("timeout must be a positive number of seconds, got {}", s));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| format!("timeout {}: {}", s, e))
}

/// Log and print a diagnostic; printing keeps it visible when logging is off.
fn report(e: impl std::fmt::Display) -> ExitCode {
    error!("{}", e);
    eprintln!("{}", e);
    ExitCode::FAILURE
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    run(Cli::parse())
}

fn run(cli: Cli) -> Result<ExitCode> {
    // 1) Resolve the query.
    let query = match registry::resolve(&cli.query) {
        Ok(q) => q,
        Err(e) => return Ok(report(e)),
    };

    // 2) Fold flags into the run configuration.
    let script_dir = match cli.scriptdir {
        Some(dir) => dir,
        None => std::env::current_dir().context("resolve current directory")?,
    };
    let config = match config::RunConfiguration::new(cli.outdir, script_dir) {
        Ok(c) => c
            .with_sample(cli.sample)
            .with_poll_period(Duration::from_secs(cli.poll))
            .with_timeout(cli.timeout)
            .with_esper_dir(cli.esperdir)
            .with_query_dir(cli.querydir)
            .with_data_dir(cli.datadir),
        Err(e) => return Ok(report(e)),
    };

    // 3) Everything the run touches must exist.
    let required = paths::RequiredPaths::for_query(&query, &config);
    if let Err(e) = paths::validate(required.in_check_order()) {
        return Ok(report(e));
    }

    // 4) Compose and run.
    let command = format::format_command(&query, &config)?;
    if cli.dry_run {
        println!("{}", command);
        return Ok(ExitCode::SUCCESS);
    }

    info!("Running query {} ({})", query.name, query.family);
    let log_file = config.log_file(query.name);
    let run_report = runner::Runner::new(config.poll_period, config.timeout)
        .run(&command, &log_file)
        .with_context(|| format!("run query {}", query.name))?;

    if let Some(path) = cli.summary {
        summary::RunSummary::new(&query, &command, &run_report).write(&path)?;
        info!("Wrote {}", path.display());
    }

    Ok(ExitCode::SUCCESS)
}
