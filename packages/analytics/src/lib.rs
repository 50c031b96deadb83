#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Analytic queries over the normalized series table.
//!
//! Each public function in [`queries`] answers one question about the
//! crawled catalog (which services carry the most series, which genres rate
//! best, ...) and returns typed results. [`report`] turns them into
//! markdown tables and [`chart`] renders the two bar charts.

pub mod chart;
pub mod queries;
pub mod report;

use std::path::{Path, PathBuf};

use series_tv_table::SeriesTable;
use thiserror::Error;

pub use queries::AnalysisYears;
pub use report::{ReportTable, full_report, render_markdown};

/// Errors that can occur during analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Encoding or writing a chart image failed.
    #[error("Chart error: {0}")]
    Chart(#[from] image::ImageError),

    /// I/O error (creating the chart directory).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Output of [`analyze`].
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Every query result as markdown.
    pub markdown: String,
    /// Chart files written, if charts were requested.
    pub charts: Vec<PathBuf>,
}

/// Runs every query over `table` and, when `chart_dir` is given, writes the
/// genre distribution and mean-rating-per-year charts into it.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if a chart cannot be written.
pub fn analyze(
    table: &SeriesTable,
    years: AnalysisYears,
    chart_dir: Option<&Path>,
) -> Result<Analysis, AnalyticsError> {
    log::info!(
        "Analyzing {} series (current year {}, reference year {})",
        table.len(),
        years.current,
        years.reference
    );
    let markdown = render_markdown(&full_report(table, years));

    let mut charts = Vec::new();
    if let Some(dir) = chart_dir {
        charts.push(chart::write_genre_chart(
            &queries::genre_distribution(table),
            dir,
        )?);
        charts.push(chart::write_year_chart(
            &queries::mean_rating_by_year(table, years),
            dir,
        )?);
    }

    Ok(Analysis { markdown, charts })
}
