//! Table building and per-column normalization.
//!
//! Each column is normalized by exactly one rule:
//!
//! | Kind | Placeholder | Coercion |
//! |-------|-------------|----------|
//! | text | `"unknown"` (`""` for the link) | trimmed |
//! | list | `"unavailable"` | joined with `", "` |
//! | integer | `0` | unparseable text becomes the placeholder |
//! | rating | `None` | unparseable or out-of-range becomes `None` |
//!
//! Every function here is idempotent, so building a table from the same
//! series twice yields identical rows.

use series_tv_series_models::{
    LIST_SEPARATOR, MAX_RATING, MISSING_RATING_LABEL, NUMBER_PLACEHOLDER, Series, SeriesRow,
    UNAVAILABLE_PLACEHOLDER, UNKNOWN_PLACEHOLDER, YEAR_PLACEHOLDER,
};

use crate::SeriesTable;

/// Builds one normalized row per series, in input order.
#[must_use]
pub fn build_table(items: &[Series]) -> SeriesTable {
    SeriesTable::new(items.iter().map(build_row).collect())
}

/// Converts a crawled series into a normalized row, substituting the
/// placeholder of each column for absent values.
#[must_use]
pub fn build_row(series: &Series) -> SeriesRow {
    normalize_row(SeriesRow {
        link: series.link.clone(),
        title: normalize_text(series.title.as_deref()),
        title_original: normalize_text(series.title_original.as_deref()),
        genres: join_list(&series.genres),
        season_count: series.season_count.unwrap_or(NUMBER_PLACEHOLDER),
        episode_count: series.episode_count.unwrap_or(NUMBER_PLACEHOLDER),
        air_year_start: series.air_year_start.unwrap_or(YEAR_PLACEHOLDER),
        air_year_end: series.air_year_end.unwrap_or(YEAR_PLACEHOLDER),
        rating: series.rating,
        available_on: join_list(&series.available_on),
    })
}

/// Re-applies every column rule to a row.
#[must_use]
pub fn normalize_row(row: SeriesRow) -> SeriesRow {
    let air_year_start = normalize_year(row.air_year_start);
    let mut air_year_end = normalize_year(row.air_year_end);

    // An end year before the start year cannot be right; keep the start.
    if air_year_start != YEAR_PLACEHOLDER
        && air_year_end != YEAR_PLACEHOLDER
        && air_year_end < air_year_start
    {
        log::debug!(
            "Dropping inverted air years {air_year_start}-{air_year_end} for {}",
            row.link
        );
        air_year_end = YEAR_PLACEHOLDER;
    }

    SeriesRow {
        link: row.link.trim().to_string(),
        title: normalize_text(Some(&row.title)),
        title_original: normalize_text(Some(&row.title_original)),
        genres: normalize_joined(&row.genres),
        season_count: row.season_count,
        episode_count: row.episode_count,
        air_year_start,
        air_year_end,
        rating: normalize_rating(row.rating),
        available_on: normalize_joined(&row.available_on),
    }
}

/// Trims free text, substituting `"unknown"` for absent or blank values.
#[must_use]
pub fn normalize_text(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => UNKNOWN_PLACEHOLDER.to_string(),
    }
}

/// Joins list entries with `", "`, dropping blank entries. An empty list
/// becomes `"unavailable"`.
#[must_use]
pub fn join_list(items: &[String]) -> String {
    let parts: Vec<&str> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        UNAVAILABLE_PLACEHOLDER.to_string()
    } else {
        parts.join(LIST_SEPARATOR)
    }
}

/// Canonicalizes a list that is already stored as a single string: entries
/// are re-separated with `", "` and blank entries dropped.
#[must_use]
pub fn normalize_joined(value: &str) -> String {
    let parts: Vec<&str> = value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() || parts == [UNAVAILABLE_PLACEHOLDER] {
        UNAVAILABLE_PLACEHOLDER.to_string()
    } else {
        parts.join(LIST_SEPARATOR)
    }
}

/// Keeps ratings that are finite and within `[0, 5]`.
#[must_use]
pub fn normalize_rating(rating: Option<f64>) -> Option<f64> {
    rating.filter(|r| r.is_finite() && (0.0..=MAX_RATING).contains(r))
}

const fn normalize_year(year: i32) -> i32 {
    if year < 0 { YEAR_PLACEHOLDER } else { year }
}

/// Parses a textual count, coercing anything non-numeric to `0`.
#[must_use]
pub fn parse_count(text: &str) -> u32 {
    text.trim().parse().unwrap_or(NUMBER_PLACEHOLDER)
}

/// Parses a textual year, coercing anything non-numeric or negative to `0`.
#[must_use]
pub fn parse_year(text: &str) -> i32 {
    text.trim()
        .parse()
        .map_or(YEAR_PLACEHOLDER, normalize_year)
}

/// Parses a textual rating. A decimal comma is accepted (`"4,5"` is 4.5).
/// The missing marker, unparseable text and out-of-range values yield
/// `None`.
#[must_use]
pub fn parse_rating(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() || text.eq_ignore_ascii_case(MISSING_RATING_LABEL) {
        return None;
    }
    normalize_rating(text.replace(',', ".").parse::<f64>().ok())
}
