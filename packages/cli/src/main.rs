#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the TV series crawler.
//!
//! Subcommands crawl the listing into a page-range snapshot, merge
//! page-range snapshots, analyze a snapshot and export one to CSV. Run
//! without a subcommand for an interactive menu.
//!
//! Uses `indicatif-log-bridge` (via [`series_tv_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and progress bars never fight for the terminal.

mod pipeline;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Input, Select};
use series_tv_cli_utils::MultiProgress;
use series_tv_crawl::{CrawlConfig, load_config};

use crate::pipeline::{AnalyzeArgs, CrawlArgs};

/// Environment variable naming the config file when `--config` is absent.
const CONFIG_ENV: &str = "SERIES_TV_CONFIG";

/// Crawl, merge and analyze TV series listings.
#[derive(Parser)]
#[command(name = "series_tv")]
#[command(about = "Crawl, merge and analyze TV series listings")]
struct Cli {
    /// TOML configuration file (default: `$SERIES_TV_CONFIG`, then built-in
    /// defaults).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to execute. Omit for the interactive menu.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Crawl the listing and write a page-range snapshot.
    Crawl(CrawlArgs),

    /// Merge every page-range snapshot into the merged snapshot.
    Merge {
        /// Merged snapshot path (default: `<data_dir>/series_tv.msgpack`).
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print every analytic query over a snapshot.
    Analyze(AnalyzeArgs),

    /// Convert a snapshot to CSV.
    ExportCsv {
        /// Snapshot to read.
        #[arg(long)]
        input: PathBuf,

        /// CSV file to write.
        #[arg(long)]
        output: PathBuf,
    },
}

/// Entries of the interactive menu.
enum Tool {
    Crawl,
    Merge,
    Analyze,
    ExportCsv,
}

impl Tool {
    const ALL: &[Self] = &[Self::Crawl, Self::Merge, Self::Analyze, Self::ExportCsv];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Crawl => "Crawl listing",
            Self::Merge => "Merge page-range snapshots",
            Self::Analyze => "Analyze merged snapshot",
            Self::ExportCsv => "Export snapshot to CSV",
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = series_tv_cli_utils::init_logger();
    let cli = Cli::parse();

    let config_path = cli
        .config
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
    let config = load_config(config_path.as_deref())?;

    match cli.command {
        Some(Commands::Crawl(args)) => pipeline::crawl(config, &args, &multi).await?,
        Some(Commands::Merge { output }) => pipeline::merge(&config, output.as_deref())?,
        Some(Commands::Analyze(args)) => pipeline::analyze(&config, &args)?,
        Some(Commands::ExportCsv { input, output }) => pipeline::export(&input, &output)?,
        None => interactive(config, &multi).await?,
    }

    Ok(())
}

/// Prompts for a tool and its main options, then runs it.
async fn interactive(
    config: CrawlConfig,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Series TV Toolchain");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::Crawl => {
            let args = prompt_crawl(&config);
            pipeline::crawl(config, &args, multi).await?;
        }
        Tool::Merge => pipeline::merge(&config, None)?,
        Tool::Analyze => {
            let charts = Confirm::new()
                .with_prompt("Write charts?")
                .default(false)
                .interact()
                .unwrap_or(false);
            let args = AnalyzeArgs {
                charts,
                ..AnalyzeArgs::default()
            };
            pipeline::analyze(&config, &args)?;
        }
        Tool::ExportCsv => {
            let default_input = config.snapshot.merged_path();
            let input = prompt_path("Snapshot to export", &default_input);
            let output = prompt_path("CSV file", &default_input.with_extension("csv"));
            pipeline::export(&input, &output)?;
        }
    }

    Ok(())
}

fn prompt_crawl(config: &CrawlConfig) -> CrawlArgs {
    let start_page = prompt_number("Start page", config.start_page);
    let end_page = prompt_number(
        "End page (0 = until the listing runs out)",
        config.end_page().unwrap_or(0),
    );
    let concurrency = prompt_number("Detail pages fetched at once", config.concurrency);

    CrawlArgs {
        start_page: Some(start_page),
        end_page: Some(end_page).filter(|&page| page > 0),
        all_pages: end_page == 0,
        concurrency: Some(concurrency),
        ..CrawlArgs::default()
    }
}

fn prompt_number<T>(prompt: &str, default: T) -> T
where
    T: ToString + std::str::FromStr,
{
    Input::<String>::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .interact_text()
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn prompt_path(prompt: &str, default: &Path) -> PathBuf {
    let default = default.display().to_string();
    Input::<String>::new()
        .with_prompt(prompt)
        .default(default.clone())
        .interact_text()
        .map_or_else(|_| PathBuf::from(default), PathBuf::from)
}
