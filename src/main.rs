//! CLI entry point for the state tax rate updater.
//!
//! Validates the maintainer rate file and propagates it into the deployed data
//! file and the offline fallback embedded in the host document.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use tax_rate_updater::config::{UpdaterConfig, resolve_root};
use tax_rate_updater::output::{write_json, write_summary};
use tax_rate_updater::render::render_block;
use tax_rate_updater::update::{load_table, run_update};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "tax_rate_updater")]
#[command(about = "Update the embedded state tax rate table", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Repository root the default paths are resolved against
    /// (defaults to $RATES_ROOT, then the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Maintainer rate file [default: <root>/scripts/rates.json]
    #[arg(long, global = true, value_name = "FILE")]
    source: Option<PathBuf>,

    /// Deployed data file [default: <root>/data/rates.json]
    #[arg(long, global = true, value_name = "FILE", conflicts_with = "no_deploy")]
    deploy: Option<PathBuf>,

    /// Host document with the embedded fallback [default: <root>/index.html]
    #[arg(long, global = true, value_name = "FILE")]
    host: Option<PathBuf>,

    /// Skip writing the deployed data file
    #[arg(long, global = true, default_value_t = false)]
    no_deploy: bool,

    /// Print the run summary as JSON
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Validate the rate file and rewrite all destinations (default)
    Update,
    /// Validate and report what would change, without writing anything
    Check,
    /// Validate and print the rendered STATE_TAX_RATES block
    Render,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + optional JSON rolling log file
    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let (json_layer, _file_guard) = match std::env::var("LOG_FILE_PATH") {
        Ok(log_file_path) => {
            let log_dir = Path::new(&log_file_path)
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("logs"));
            let log_file_name = Path::new(&log_file_path)
                .file_name()
                .unwrap_or(OsStr::new("tax_rate_updater.log"));

            let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

            let layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(non_blocking_file)
                .with_filter(
                    EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?),
                );
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    // anyhow reports the error chain on stderr and exits non-zero
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let mut config = UpdaterConfig::from_root(&resolve_root(cli.root));
    if let Some(source) = cli.source {
        config = config.with_source(source);
    }
    if let Some(host) = cli.host {
        config = config.with_host(host);
    }
    if cli.no_deploy {
        config = config.with_deploy(None);
    } else if let Some(deploy) = cli.deploy {
        config = config.with_deploy(Some(deploy));
    }

    let mut stdout = std::io::stdout().lock();

    match cli.command.unwrap_or(Commands::Update) {
        Commands::Update | Commands::Check => {
            let dry_run = matches!(cli.command, Some(Commands::Check));
            let report = run_update(&config.dry_run(dry_run))
                .context("failed to update state tax rates")?;

            info!(
                states = report.states,
                year = report.year,
                host_changed = report.host_changed,
                dry_run,
                "Rate update finished"
            );

            if cli.json {
                write_json(&mut stdout, &report)?;
            } else {
                write_summary(&mut stdout, &report)?;
            }
        }
        Commands::Render => {
            let (_, table) = load_table(&config.source)
                .with_context(|| format!("failed to load {}", config.source.display()))?;
            writeln!(stdout, "{}", render_block("let", "", &table))?;
        }
    }

    Ok(())
}
