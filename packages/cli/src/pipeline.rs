//! The four operations of the series toolchain: crawl, merge, analyze and
//! CSV export.
//!
//! Each takes the loaded [`CrawlConfig`] plus its command-line overrides
//! and logs what it did. Crawl progress is shown with `indicatif` bars on
//! the shared [`MultiProgress`].

use std::path::{Path, PathBuf};

use clap::Args;
use series_tv_analytics::AnalysisYears;
use series_tv_cli_utils::{IndicatifProgress, MultiProgress};
use series_tv_crawl::{CrawlConfig, CrawlProgress};
use series_tv_scraper::http::HttpFetcher;
use series_tv_table::csv_export::export_csv;
use series_tv_table::merge::{merge_snapshots, merge_snapshots_to};
use series_tv_table::load_table;
use series_tv_table::snapshot::{read_snapshot, write_snapshot};

/// Overrides for a crawl run. Anything left unset keeps its configured
/// value.
#[derive(Debug, Clone, Default, Args)]
pub struct CrawlArgs {
    /// First listing page to read.
    #[arg(long)]
    pub start_page: Option<u32>,

    /// Last listing page to read (inclusive).
    #[arg(long, conflicts_with = "all_pages")]
    pub end_page: Option<u32>,

    /// Keep reading pages until the listing runs out.
    #[arg(long)]
    pub all_pages: bool,

    /// Number of detail pages fetched at once.
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Pause between requests, in milliseconds.
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Snapshot path (default: `<data_dir>/series_tv_<start>_<end>.msgpack`).
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Also export the crawled table as CSV to this path.
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

impl CrawlArgs {
    fn apply(&self, config: &mut CrawlConfig) {
        if let Some(start) = self.start_page {
            config.start_page = start;
        }
        if self.all_pages {
            config.end_page = None;
        } else if let Some(end) = self.end_page {
            config.end_page = Some(end);
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(delay) = self.delay_ms {
            config.delay_ms = Some(delay);
        }
    }
}

/// Options of the `analyze` command.
#[derive(Debug, Clone, Default, Args)]
pub struct AnalyzeArgs {
    /// Snapshot or `.csv` export to analyze (default: the merged snapshot).
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Write the genre and rating-per-year bar charts.
    #[arg(long)]
    pub charts: bool,

    /// Directory for the charts (default: the data directory).
    #[arg(long)]
    pub chart_dir: Option<PathBuf>,

    /// Year the "recent animation" queries refer to (default: this year).
    #[arg(long)]
    pub year: Option<i32>,
}

/// Crawls the listing and writes the resulting snapshot.
///
/// # Errors
///
/// Returns an error if the crawl finds no series or the snapshot cannot be
/// written.
pub async fn crawl(
    mut config: CrawlConfig,
    args: &CrawlArgs,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    args.apply(&mut config);

    let fetcher = HttpFetcher::new(&config.fetch)?;
    let progress = CrawlProgress {
        pages: IndicatifProgress::pages_spinner(multi, "Reading listing"),
        items: IndicatifProgress::items_bar(multi, "Reading detail pages"),
    };

    let outcome = series_tv_crawl::run(&fetcher, &config, &progress).await?;

    let path = args
        .output
        .clone()
        .unwrap_or_else(|| outcome.snapshot_path(&config.snapshot));
    write_snapshot(&path, &outcome.table)?;

    if let Some(csv_path) = &args.csv {
        export_csv(csv_path, &outcome.table)?;
    }

    log::info!(
        "Saved {} series to {} (pages {}-{}, {}; {} detail pages failed)",
        outcome.table.len(),
        path.display(),
        outcome.start_page,
        outcome.last_page,
        outcome.stop,
        outcome.failures.len()
    );

    Ok(())
}

/// Merges every page-range snapshot in the data directory.
///
/// # Errors
///
/// Returns an error if there is nothing to merge or a snapshot cannot be
/// read or written.
pub fn merge(
    config: &CrawlConfig,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let summary = match output {
        Some(path) => merge_snapshots_to(&config.snapshot, path)?,
        None => merge_snapshots(&config.snapshot)?,
    };
    println!(
        "Merged {} snapshots into {} ({} series)",
        summary.inputs.len(),
        summary.output.display(),
        summary.rows
    );
    Ok(())
}

/// Runs every analytic query over a snapshot (or a CSV export) and prints
/// the results as markdown.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be read or a chart cannot be
/// written.
pub fn analyze(config: &CrawlConfig, args: &AnalyzeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let input = args
        .input
        .clone()
        .unwrap_or_else(|| config.snapshot.merged_path());
    let table = load_table(&input)?;

    let mut years = AnalysisYears::now();
    if let Some(year) = args.year {
        years = years.with_reference(year);
    }

    let chart_dir = args.charts.then(|| {
        args.chart_dir
            .clone()
            .unwrap_or_else(|| config.snapshot.data_dir.clone())
    });

    let analysis = series_tv_analytics::analyze(&table, years, chart_dir.as_deref())?;
    println!("{}", analysis.markdown);
    for chart in &analysis.charts {
        println!("Chart written to {}", chart.display());
    }
    Ok(())
}

/// Converts a snapshot to CSV.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be read or the CSV written.
pub fn export(input: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let table = read_snapshot(input)?;
    export_csv(output, &table)?;
    println!("Exported {} series to {}", table.len(), output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crawl_args_override_config() {
        let mut config = CrawlConfig::default();
        let args = CrawlArgs {
            start_page: Some(151),
            end_page: Some(300),
            concurrency: Some(4),
            ..CrawlArgs::default()
        };
        args.apply(&mut config);
        assert_eq!(config.start_page, 151);
        assert_eq!(config.end_page(), Some(300));
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.delay_ms, None);
    }

    #[test]
    fn all_pages_removes_end_page() {
        let mut config = CrawlConfig::default();
        let args = CrawlArgs {
            all_pages: true,
            ..CrawlArgs::default()
        };
        args.apply(&mut config);
        assert_eq!(config.end_page(), None);
    }

    #[test]
    fn analyze_accepts_csv_export() {
        let dir = std::env::temp_dir().join("series_tv_cli_analyze_csv_test");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("series_tv.csv");
        std::fs::write(
            &input,
            "link,title,title_original,genres,season_count,episode_count,\
             air_year_start,air_year_end,rating,available_on\n\
             https://example.test/a,Alpha,Alpha,Drama,3,30,2010,2015,\"4,5\",Netflix\n",
        )
        .unwrap();

        let args = AnalyzeArgs {
            input: Some(input),
            year: Some(2024),
            ..AnalyzeArgs::default()
        };
        analyze(&CrawlConfig::default(), &args).unwrap();

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_args_keep_config() {
        let mut config = CrawlConfig::default();
        CrawlArgs::default().apply(&mut config);
        assert_eq!(config, CrawlConfig::default());
    }
}
