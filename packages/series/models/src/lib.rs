#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Series record types and the normalized table schema.
//!
//! A [`Series`] is the crawl-time entity: every attribute besides the link
//! is an [`Option`] (or an empty list) until the detail page has been read.
//! A [`SeriesRow`] is the storage-time entity: every column has exactly one
//! type and absent values have been replaced by the column's placeholder
//! (see the `*_PLACEHOLDER` constants).

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Placeholder for free-text columns whose value was never recovered.
pub const UNKNOWN_PLACEHOLDER: &str = "unknown";

/// Placeholder for list columns (genres, streaming services) with no entries.
pub const UNAVAILABLE_PLACEHOLDER: &str = "unavailable";

/// Placeholder for integer columns (counts and years).
pub const NUMBER_PLACEHOLDER: u32 = 0;

/// Placeholder for year columns. Also means "still airing" for the end year.
pub const YEAR_PLACEHOLDER: i32 = 0;

/// How a missing rating is rendered in text output.
pub const MISSING_RATING_LABEL: &str = "NA";

/// Separator used when a list column is stored as a single string.
pub const LIST_SEPARATOR: &str = ", ";

/// Highest rating the site hands out.
pub const MAX_RATING: f64 = 5.0;

/// A TV series discovered on the listing and (possibly) enriched from its
/// detail page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Absolute URL of the detail page. Identifies the series.
    pub link: String,
    /// Display title as shown on the listing.
    pub title: Option<String>,
    /// Title in the original language.
    pub title_original: Option<String>,
    /// Genre labels in page order; the first one is the primary genre.
    pub genres: Vec<String>,
    /// Number of seasons.
    pub season_count: Option<u32>,
    /// Total number of episodes.
    pub episode_count: Option<u32>,
    /// Year the series first aired.
    pub air_year_start: Option<i32>,
    /// Year the series last aired. `None` while airing or unknown.
    pub air_year_end: Option<i32>,
    /// Users' rating in `[0.0, 5.0]`.
    pub rating: Option<f64>,
    /// Streaming services offering the series, in page order.
    pub available_on: Vec<String>,
}

impl Series {
    /// Creates a series with only the listing attributes set.
    #[must_use]
    pub fn new(link: impl Into<String>, title: Option<String>) -> Self {
        Self {
            link: link.into(),
            title,
            ..Self::default()
        }
    }

    /// Returns the primary genre, if any genre was found.
    #[must_use]
    pub fn primary_genre(&self) -> Option<&str> {
        self.genres.first().map(String::as_str)
    }

    /// Returns `true` if nothing beyond the listing attributes is known.
    #[must_use]
    pub fn is_bare(&self) -> bool {
        self.title_original.is_none()
            && self.genres.is_empty()
            && self.season_count.is_none()
            && self.episode_count.is_none()
            && self.air_year_start.is_none()
            && self.air_year_end.is_none()
            && self.rating.is_none()
            && self.available_on.is_empty()
    }
}

impl std::fmt::Display for Series {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn or_unknown<T: ToString>(value: Option<T>) -> String {
            value.map_or_else(|| UNKNOWN_PLACEHOLDER.to_string(), |v| v.to_string())
        }

        let genres = if self.genres.is_empty() {
            UNAVAILABLE_PLACEHOLDER.to_string()
        } else {
            self.genres.join(LIST_SEPARATOR)
        };
        let services = if self.available_on.is_empty() {
            UNAVAILABLE_PLACEHOLDER.to_string()
        } else {
            self.available_on.join(LIST_SEPARATOR)
        };
        let end = self
            .air_year_end
            .map_or_else(|| "airing or unknown".to_string(), |y| y.to_string());

        write!(
            f,
            "{} ({}) | genres: {genres} | seasons: {} | episodes: {} | aired: {} - {end} | rating: {} | on: {services} | {}",
            or_unknown(self.title.as_deref()),
            or_unknown(self.title_original.as_deref()),
            or_unknown(self.season_count),
            or_unknown(self.episode_count),
            or_unknown(self.air_year_start),
            self.rating
                .map_or_else(|| MISSING_RATING_LABEL.to_string(), |r| r.to_string()),
            self.link,
        )
    }
}

/// The columns of the normalized table, in storage order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SeriesColumn {
    Link,
    Title,
    TitleOriginal,
    Genres,
    SeasonCount,
    EpisodeCount,
    AirYearStart,
    AirYearEnd,
    Rating,
    AvailableOn,
}

impl SeriesColumn {
    /// Every column in declaration order.
    pub const ALL: &[Self] = &[
        Self::Link,
        Self::Title,
        Self::TitleOriginal,
        Self::Genres,
        Self::SeasonCount,
        Self::EpisodeCount,
        Self::AirYearStart,
        Self::AirYearEnd,
        Self::Rating,
        Self::AvailableOn,
    ];
}

/// One row of the normalized table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRow {
    pub link: String,
    pub title: String,
    pub title_original: String,
    /// Genres joined with [`LIST_SEPARATOR`], or [`UNAVAILABLE_PLACEHOLDER`].
    pub genres: String,
    pub season_count: u32,
    pub episode_count: u32,
    pub air_year_start: i32,
    pub air_year_end: i32,
    pub rating: Option<f64>,
    /// Services joined with [`LIST_SEPARATOR`], or [`UNAVAILABLE_PLACEHOLDER`].
    pub available_on: String,
}

impl SeriesRow {
    /// Splits the genres column back into individual labels. The placeholder
    /// yields an empty list.
    #[must_use]
    pub fn genre_list(&self) -> Vec<&str> {
        split_list(&self.genres)
    }

    /// Splits the streaming services column back into individual names. The
    /// placeholder yields an empty list.
    #[must_use]
    pub fn service_list(&self) -> Vec<&str> {
        split_list(&self.available_on)
    }

    /// Returns `true` if the series is tagged with `genre`.
    #[must_use]
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genre_list().contains(&genre)
    }

    /// Returns `true` if at least one streaming service is known.
    #[must_use]
    pub fn is_streamable(&self) -> bool {
        !self.service_list().is_empty()
    }

    /// Renders a single column as text, the way it is shown in tables and
    /// written to CSV.
    #[must_use]
    pub fn cell(&self, column: SeriesColumn) -> String {
        match column {
            SeriesColumn::Link => self.link.clone(),
            SeriesColumn::Title => self.title.clone(),
            SeriesColumn::TitleOriginal => self.title_original.clone(),
            SeriesColumn::Genres => self.genres.clone(),
            SeriesColumn::SeasonCount => self.season_count.to_string(),
            SeriesColumn::EpisodeCount => self.episode_count.to_string(),
            SeriesColumn::AirYearStart => self.air_year_start.to_string(),
            SeriesColumn::AirYearEnd => self.air_year_end.to_string(),
            SeriesColumn::Rating => format_rating(self.rating),
            SeriesColumn::AvailableOn => self.available_on.clone(),
        }
    }
}

/// Formats an optional rating, using [`MISSING_RATING_LABEL`] when absent.
#[must_use]
pub fn format_rating(rating: Option<f64>) -> String {
    rating.map_or_else(|| MISSING_RATING_LABEL.to_string(), |r| r.to_string())
}

fn split_list(value: &str) -> Vec<&str> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != UNAVAILABLE_PLACEHOLDER)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(genres: &str, available_on: &str) -> SeriesRow {
        SeriesRow {
            link: "https://example.test/series/1".to_string(),
            title: "Title".to_string(),
            title_original: UNKNOWN_PLACEHOLDER.to_string(),
            genres: genres.to_string(),
            season_count: 0,
            episode_count: 0,
            air_year_start: 0,
            air_year_end: 0,
            rating: None,
            available_on: available_on.to_string(),
        }
    }

    #[test]
    fn column_names_are_snake_case() {
        assert_eq!(SeriesColumn::TitleOriginal.to_string(), "title_original");
        assert_eq!(
            "available_on".parse::<SeriesColumn>().unwrap(),
            SeriesColumn::AvailableOn
        );
        assert_eq!(SeriesColumn::ALL.len(), 10);
    }

    #[test]
    fn placeholder_lists_split_to_nothing() {
        let r = row(UNAVAILABLE_PLACEHOLDER, UNAVAILABLE_PLACEHOLDER);
        assert!(r.genre_list().is_empty());
        assert!(!r.is_streamable());
    }

    #[test]
    fn splits_joined_lists() {
        let r = row("Drama, Acción", "Netflix,  HBO Max ");
        assert_eq!(r.genre_list(), vec!["Drama", "Acción"]);
        assert_eq!(r.service_list(), vec!["Netflix", "HBO Max"]);
        assert!(r.has_genre("Acción"));
        assert!(!r.has_genre("Comedia"));
    }

    #[test]
    fn missing_rating_renders_as_marker() {
        let r = row("Drama", "Netflix");
        assert_eq!(r.cell(SeriesColumn::Rating), MISSING_RATING_LABEL);
        assert_eq!(format_rating(Some(0.0)), "0");
    }

    #[test]
    fn new_series_is_bare() {
        let s = Series::new("https://example.test/a", Some("A".to_string()));
        assert!(s.is_bare());
        assert_eq!(s.primary_genre(), None);
    }
}
