// Entry point and high-level CLI flow.
//
// One invocation builds one report:
// - the record store is sampled and counted,
// - the Hadoop result files and the Spark summary are loaded alongside it,
// - the merged report is rendered as Markdown or as the JSON envelope.
mod assembler;
mod config;
mod error;
mod loader;
mod output;
mod questions;
mod store;
mod summary;
mod types;
mod util;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use config::{ConfigArgs, ReportConfig};
use std::path::PathBuf;
use store::JsonlRecordStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
}

#[derive(Parser)]
#[command(name = "population-report")]
#[command(about = "Consolidated population report from batch results", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Output format
    #[arg(long, value_enum, default_value = "markdown")]
    format: OutputFormat,

    /// Write the rendered report to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log only warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn emit(cli: &Cli, rendered: &str) -> Result<()> {
    match &cli.output {
        Some(path) => {
            output::write_text(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            log::info!("Report written to {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();
    let cwd = std::env::current_dir().context("cannot determine working directory")?;

    // Variables already in the environment win over the .env file. Parse
    // again so env-backed flags pick up what it defined.
    if dotenvy::from_path(config::dotenv_path(&cli.config, &cwd)).is_ok() {
        cli = Cli::parse();
    }
    init_logging(&cli);

    let cfg = ReportConfig::from_args(&cli.config, cwd);
    log::debug!("Configuration: {:?}", cfg);

    let store = JsonlRecordStore::new(cfg.records_path.clone());
    log::debug!("Record store: {}", store.path().display());

    match assembler::generate_report(&store, &cfg).await {
        Ok(report) => {
            let rendered = match cli.format {
                OutputFormat::Markdown => output::render_markdown(&report, chrono::Local::now()),
                OutputFormat::Json => output::render_json(&report)?,
            };
            emit(&cli, &rendered)
        }
        Err(e) => {
            log::error!("Report generation failed: {}", e);
            if cli.format == OutputFormat::Json {
                emit(&cli, &output::render_json_failure(&e.to_string())?)?;
                std::process::exit(1);
            }
            Err(e).context("failed to build report")
        }
    }
}
