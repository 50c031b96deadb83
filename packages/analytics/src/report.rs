//! Markdown rendering of query results.

use std::fmt::Write as _;

use series_tv_series_models::{SeriesRow, format_rating};
use series_tv_table::SeriesTable;

use crate::queries::{
    self, AnalysisYears, GenreMean, LabelCount, PlatformScore, RatingStats, ServiceRating,
    YearMean,
};

/// A titled table ready to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTable {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    #[must_use]
    pub fn new(title: impl Into<String>, headers: &[&str]) -> Self {
        Self {
            title: title.into(),
            headers: headers.iter().map(ToString::to_string).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Renders the table as GitHub-flavored markdown.
    ///
    /// An empty table renders as `(empty)`. Every non-empty table ends with
    /// a row count line.
    #[must_use]
    pub fn render_markdown(&self) -> String {
        let mut out = format!("## {}\n\n", self.title);
        if self.rows.is_empty() {
            out.push_str("(empty)\n");
            return out;
        }

        let _ = writeln!(out, "| {} |", self.headers.join(" | "));
        let _ = writeln!(
            out,
            "|{}|",
            self.headers.iter().map(|_| "---").collect::<Vec<_>>().join("|")
        );
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|c| c.replace('|', "\\|")).collect();
            let _ = writeln!(out, "| {} |", cells.join(" | "));
        }
        let _ = writeln!(out, "\nRows: {}", self.rows.len());
        out
    }
}

/// Runs every query against `table`, in presentation order.
#[must_use]
pub fn full_report(table: &SeriesTable, years: AnalysisYears) -> Vec<ReportTable> {
    let genre_stats = queries::genre_rating_stats(table);
    let recommendations = queries::recommendations(table, years);

    vec![
        label_counts(
            "Series per streaming service",
            "Service",
            &queries::streaming_counts(table),
        ),
        label_counts(
            "Series per genre",
            "Genre",
            &queries::genre_distribution(table),
        ),
        series_table(
            "Top rated series with more than 2 seasons",
            &queries::top_rated_long_running(table),
            &[Col::Title, Col::Rating, Col::Seasons, Col::Episodes],
        ),
        genre_means(&genre_stats.means),
        rating_stats("Rating statistics of the 3 best genres", &genre_stats.best),
        rating_stats("Rating statistics of the 2 worst genres", &genre_stats.worst),
        service_ratings(&queries::streaming_rating(table)),
        series_table(
            "Finished dramas rated 3.5 to 5 with 2+ seasons on streaming",
            &queries::finished_drama(table, years),
            &[Col::Title, Col::Rating, Col::Seasons, Col::EndYear, Col::Services],
        ),
        platform_scores(&queries::best_platform(table)),
        series_table(
            format!(
                "Animated series rated 4 to 5 that aired in {} on streaming",
                years.reference
            ),
            &queries::recent_animation(table, years),
            &[Col::Title, Col::Rating, Col::EndYear, Col::Services],
        ),
        series_table(
            "Recent animation for action fans",
            &recommendations.action,
            &[Col::Title, Col::Rating, Col::EndYear, Col::Services],
        ),
        series_table(
            "Recent animation for comedy fans",
            &recommendations.comedy,
            &[Col::Title, Col::Rating, Col::EndYear, Col::Services],
        ),
        series_table(
            "Best rated series per premiere year",
            &queries::best_by_year(table, years),
            &[Col::StartYear, Col::Title, Col::Rating, Col::Genres, Col::Services],
        ),
        year_means(&queries::mean_rating_by_year(table, years)),
    ]
}

/// Renders every table of `report`, separated by blank lines.
#[must_use]
pub fn render_markdown(report: &[ReportTable]) -> String {
    report
        .iter()
        .map(ReportTable::render_markdown)
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Copy)]
enum Col {
    Title,
    Rating,
    Seasons,
    Episodes,
    StartYear,
    EndYear,
    Genres,
    Services,
}

impl Col {
    const fn header(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Rating => "Rating",
            Self::Seasons => "Seasons",
            Self::Episodes => "Episodes",
            Self::StartYear => "Premiere year",
            Self::EndYear => "End year",
            Self::Genres => "Genres",
            Self::Services => "Available on",
        }
    }

    fn cell(self, row: &SeriesRow) -> String {
        match self {
            Self::Title => row.title.clone(),
            Self::Rating => format_rating(row.rating),
            Self::Seasons => row.season_count.to_string(),
            Self::Episodes => row.episode_count.to_string(),
            Self::StartYear => row.air_year_start.to_string(),
            Self::EndYear => row.air_year_end.to_string(),
            Self::Genres => row.genres.clone(),
            Self::Services => row.available_on.clone(),
        }
    }
}

fn series_table(title: impl Into<String>, rows: &[&SeriesRow], columns: &[Col]) -> ReportTable {
    let headers: Vec<&str> = columns.iter().map(|c| c.header()).collect();
    let mut table = ReportTable::new(title, &headers);
    for row in rows {
        table.push(columns.iter().map(|c| c.cell(row)).collect());
    }
    table
}

fn label_counts(title: &str, label: &str, counts: &[LabelCount]) -> ReportTable {
    let mut table = ReportTable::new(title, &[label, "Series"]);
    for c in counts {
        table.push(vec![c.label.clone(), c.count.to_string()]);
    }
    table
}

fn genre_means(means: &[GenreMean]) -> ReportTable {
    let mut table = ReportTable::new("Mean rating per genre", &["Genre", "Mean rating"]);
    for m in means {
        table.push(vec![m.genre.clone(), format_mean(m.mean)]);
    }
    table
}

fn rating_stats(title: &str, stats: &[RatingStats]) -> ReportTable {
    let mut table = ReportTable::new(title, &["Genre", "Mean", "Std dev", "Max", "Min"]);
    for s in stats {
        table.push(vec![
            s.genre.clone(),
            format!("{:.3}", s.mean),
            s.std_dev
                .map_or_else(|| "n/a".to_string(), |d| format!("{d:.3}")),
            format!("{:.3}", s.max),
            format!("{:.3}", s.min),
        ]);
    }
    table
}

fn service_ratings(services: &[ServiceRating]) -> ReportTable {
    let mut table = ReportTable::new(
        "Series and mean rating per streaming service",
        &["Service", "Series", "Mean rating"],
    );
    for s in services {
        table.push(vec![
            s.service.clone(),
            s.count.to_string(),
            format_mean(s.mean_rating),
        ]);
    }
    table
}

fn platform_scores(scores: &[PlatformScore]) -> ReportTable {
    let mut table = ReportTable::new(
        "Best streaming platform by quality and quantity",
        &["Service", "Series", "Mean rating", "Index"],
    );
    for s in scores {
        table.push(vec![
            s.service.clone(),
            s.count.to_string(),
            format_mean(s.mean_rating),
            format!("{:.3}", s.index),
        ]);
    }
    table
}

fn year_means(means: &[YearMean]) -> ReportTable {
    let mut table = ReportTable::new("Mean rating per premiere year", &["Year", "Mean rating"]);
    for m in means {
        table.push(vec![m.year.to_string(), format!("{:.3}", m.mean)]);
    }
    table
}

fn format_mean(mean: Option<f64>) -> String {
    mean.map_or_else(|| format_rating(None), |m| format!("{m:.3}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::fixtures::sample_table;

    const YEARS: AnalysisYears = AnalysisYears {
        current: 2025,
        reference: 2024,
    };

    #[test]
    fn renders_markdown_table_with_footer() {
        let mut table = ReportTable::new("Counts", &["Name", "Count"]);
        table.push(vec!["A|B".to_string(), "2".to_string()]);
        assert_eq!(
            table.render_markdown(),
            "## Counts\n\n| Name | Count |\n|---|---|\n| A\\|B | 2 |\n\nRows: 1\n"
        );
    }

    #[test]
    fn renders_empty_marker() {
        let table = ReportTable::new("Nothing", &["Name"]);
        assert_eq!(table.render_markdown(), "## Nothing\n\n(empty)\n");
    }

    #[test]
    fn full_report_covers_every_query() {
        let report = full_report(&sample_table(), YEARS);
        assert_eq!(report.len(), 14);
        assert_eq!(report[0].rows[0], vec!["Netflix", "3"]);

        let stats = &report[4];
        assert_eq!(stats.headers, vec!["Genre", "Mean", "Std dev", "Max", "Min"]);
        let action = stats.rows.iter().find(|r| r[0] == "Acción").unwrap();
        assert_eq!(action[2], "0.212");

        let text = render_markdown(&report);
        assert!(text.contains("## Recent animation for comedy fans"));
        assert!(text.contains("| Epsilon | 3.9 | 2024 | Netflix |"));
    }

    #[test]
    fn single_rating_genre_shows_no_std_dev() {
        let mut table = sample_table();
        table.rows.truncate(1);
        let report = full_report(&table, YEARS);
        assert!(report[4].rows.iter().all(|r| r[2] == "n/a"));
    }
}
