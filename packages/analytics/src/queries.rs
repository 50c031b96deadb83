//! Analytic queries over a [`SeriesTable`].
//!
//! List columns are exploded into their individual entries; the
//! `"unavailable"` placeholder never counts as a genre or a service. Missing
//! ratings are left out of every mean and sort after all present ratings.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use series_tv_series_models::{MAX_RATING, SeriesRow, YEAR_PLACEHOLDER};
use series_tv_table::SeriesTable;

/// Genre label of dramas.
pub const DRAMA: &str = "Drama";
/// Genre label of animated series.
pub const ANIMATION: &str = "Animación";
/// Genre label of action series.
pub const ACTION: &str = "Acción";
/// Genre label of comedies.
pub const COMEDY: &str = "Comedia";

/// Years at or before this one are treated as bogus.
const MIN_VALID_YEAR: i32 = 1900;

/// Number of rows kept by [`top_rated_long_running`].
pub const TOP_RATED_LIMIT: usize = 30;

/// Dates the queries are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisYears {
    /// Latest year a series may have ended or started in.
    pub current: i32,
    /// The "recent" year used by the animation queries.
    pub reference: i32,
}

impl AnalysisYears {
    /// Uses the local calendar year for both values.
    #[must_use]
    pub fn now() -> Self {
        use chrono::Datelike as _;

        let current = chrono::Local::now().year();
        Self {
            current,
            reference: current,
        }
    }

    #[must_use]
    pub const fn with_reference(mut self, year: i32) -> Self {
        self.reference = year;
        self
    }

    const fn is_valid(self, year: i32) -> bool {
        year != YEAR_PLACEHOLDER && year > MIN_VALID_YEAR && year <= self.current
    }
}

/// A label (genre or service) and how many series carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// Mean rating of one genre.
#[derive(Debug, Clone, PartialEq)]
pub struct GenreMean {
    pub genre: String,
    /// `None` when no series of the genre has a rating.
    pub mean: Option<f64>,
}

/// Descriptive statistics of one genre's ratings.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingStats {
    pub genre: String,
    pub mean: f64,
    /// Sample standard deviation; `None` with fewer than two ratings.
    pub std_dev: Option<f64>,
    pub max: f64,
    pub min: f64,
}

/// Result of [`genre_rating_stats`].
#[derive(Debug, Clone, PartialEq)]
pub struct GenreRatingReport {
    /// Every genre in label order, means rounded to 3 decimals.
    pub means: Vec<GenreMean>,
    /// The 3 genres with the highest mean, best first.
    pub best: Vec<RatingStats>,
    /// The 2 genres with the lowest mean, worst first.
    pub worst: Vec<RatingStats>,
}

/// Series count and mean rating of one streaming service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRating {
    pub service: String,
    pub count: usize,
    /// Rounded to 3 decimals; `None` when no series has a rating.
    pub mean_rating: Option<f64>,
}

/// A streaming service scored by quality and catalog size.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformScore {
    pub service: String,
    pub count: usize,
    pub mean_rating: Option<f64>,
    /// `0.5 * normalized mean rating + 0.5 * normalized count`, in `[0, 1]`.
    pub index: f64,
}

/// Result of [`recommendations`].
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendations<'a> {
    pub action: Vec<&'a SeriesRow>,
    pub comedy: Vec<&'a SeriesRow>,
}

/// Mean rating of the series that premiered in one year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearMean {
    pub year: i32,
    pub mean: f64,
}

/// Number of series on each streaming service, most series first.
#[must_use]
pub fn streaming_counts(table: &SeriesTable) -> Vec<LabelCount> {
    count_labels(table, SeriesRow::service_list)
}

/// Number of series tagged with each genre, most series first.
#[must_use]
pub fn genre_distribution(table: &SeriesTable) -> Vec<LabelCount> {
    count_labels(table, SeriesRow::genre_list)
}

/// The best-rated series with more than two seasons.
#[must_use]
pub fn top_rated_long_running(table: &SeriesTable) -> Vec<&SeriesRow> {
    let mut rows: Vec<&SeriesRow> = table.rows.iter().filter(|r| r.season_count > 2).collect();
    rows.sort_by(|a, b| rating_desc(a.rating, b.rating));
    rows.truncate(TOP_RATED_LIMIT);
    rows
}

/// Mean rating per genre, plus descriptive statistics for the three best
/// and two worst genres.
#[must_use]
pub fn genre_rating_stats(table: &SeriesTable) -> GenreRatingReport {
    let ratings = group_ratings(table, SeriesRow::genre_list);

    let means: Vec<GenreMean> = ratings
        .iter()
        .map(|(genre, values)| GenreMean {
            genre: genre.to_string(),
            mean: mean(values).map(round3),
        })
        .collect();

    let mut ranked: Vec<(&str, f64)> = means
        .iter()
        .filter_map(|m| m.mean.map(|v| (m.genre.as_str(), v)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let stats_for = |genre: &str| ratings.get(genre).and_then(|v| describe(genre, v));
    let best = ranked.iter().take(3).filter_map(|&(g, _)| stats_for(g)).collect();
    let worst = ranked
        .iter()
        .rev()
        .take(2)
        .filter_map(|&(g, _)| stats_for(g))
        .collect();

    GenreRatingReport { means, best, worst }
}

/// Series count and mean rating per streaming service, by service name.
#[must_use]
pub fn streaming_rating(table: &SeriesTable) -> Vec<ServiceRating> {
    service_groups(table)
        .into_iter()
        .map(|(service, (count, ratings))| ServiceRating {
            service: service.to_string(),
            count,
            mean_rating: mean(&ratings).map(round3),
        })
        .collect()
}

/// Finished, well-rated, multi-season dramas that can be streamed.
///
/// Rating within `[3.5, 5]`, tagged `Drama`, at least two seasons, an end
/// year in `(1900, current]` and at least one service. Rows repeated across
/// merged snapshots appear once.
#[must_use]
pub fn finished_drama(table: &SeriesTable, years: AnalysisYears) -> Vec<&SeriesRow> {
    let mut seen = BTreeSet::new();
    table
        .rows
        .iter()
        .filter(|r| rating_within(r.rating, 3.5))
        .filter(|r| r.has_genre(DRAMA))
        .filter(|r| r.season_count >= 2)
        .filter(|r| years.is_valid(r.air_year_end))
        .filter(|r| r.is_streamable())
        .filter(|r| {
            seen.insert((
                r.title.clone(),
                r.rating.map(f64::to_bits),
                r.season_count,
                r.air_year_end,
                r.available_on.clone(),
            ))
        })
        .collect()
}

/// Scores every streaming service by min-max normalized mean rating and
/// series count, best first.
#[must_use]
pub fn best_platform(table: &SeriesTable) -> Vec<PlatformScore> {
    let groups: Vec<(String, usize, Option<f64>)> = service_groups(table)
        .into_iter()
        .map(|(service, (count, ratings))| (service.to_string(), count, mean(&ratings)))
        .collect();

    #[allow(clippy::cast_precision_loss)]
    let counts: Vec<f64> = groups.iter().map(|(_, c, _)| *c as f64).collect();
    let means: Vec<f64> = groups.iter().filter_map(|(_, _, m)| *m).collect();
    let count_range = min_max(&counts);
    let mean_range = min_max(&means);

    let mut scores: Vec<PlatformScore> = groups
        .into_iter()
        .zip(counts)
        .map(|((service, count, mean_rating), count_f)| {
            let rating_norm = mean_rating.map_or(0.0, |m| normalize(m, mean_range));
            let count_norm = normalize(count_f, count_range);
            PlatformScore {
                service,
                count,
                mean_rating,
                index: 0.5f64.mul_add(rating_norm, 0.5 * count_norm),
            }
        })
        .collect();
    scores.sort_by(|a, b| {
        b.index
            .total_cmp(&a.index)
            .then_with(|| a.service.cmp(&b.service))
    });
    scores
}

/// Streamable animated series rated within `[4, 5]` whose last season aired
/// in the reference year.
#[must_use]
pub fn recent_animation(table: &SeriesTable, years: AnalysisYears) -> Vec<&SeriesRow> {
    table
        .rows
        .iter()
        .filter(|r| rating_within(r.rating, 4.0))
        .filter(|r| r.has_genre(ANIMATION))
        .filter(|r| r.air_year_end == years.reference)
        .filter(|r| r.is_streamable())
        .collect()
}

/// Animated series that ended in the reference year, split by appeal to
/// action and comedy fans, best-rated first.
#[must_use]
pub fn recommendations(table: &SeriesTable, years: AnalysisYears) -> Recommendations<'_> {
    let recent: Vec<&SeriesRow> = table
        .rows
        .iter()
        .filter(|r| r.has_genre(ANIMATION) && r.air_year_end == years.reference)
        .collect();

    let pick = |genre: &str| {
        let mut rows: Vec<&SeriesRow> = recent
            .iter()
            .copied()
            .filter(|r| r.has_genre(genre))
            .collect();
        rows.sort_by(|a, b| rating_desc(a.rating, b.rating));
        rows
    };

    Recommendations {
        action: pick(ACTION),
        comedy: pick(COMEDY),
    }
}

/// The best-rated series of every valid premiere year, by year.
///
/// Years in which no series has a rating are left out. Ties go to the row
/// that comes first in the table.
#[must_use]
pub fn best_by_year(table: &SeriesTable, years: AnalysisYears) -> Vec<&SeriesRow> {
    let mut best: BTreeMap<i32, &SeriesRow> = BTreeMap::new();
    for row in &table.rows {
        let Some(rating) = row.rating else {
            continue;
        };
        if !years.is_valid(row.air_year_start) {
            continue;
        }
        best.entry(row.air_year_start)
            .and_modify(|current| {
                if current.rating.is_some_and(|r| rating > r) {
                    *current = row;
                }
            })
            .or_insert(row);
    }
    best.into_values().collect()
}

/// Mean rating of the series that premiered in each valid year, by year.
#[must_use]
pub fn mean_rating_by_year(table: &SeriesTable, years: AnalysisYears) -> Vec<YearMean> {
    let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for row in &table.rows {
        if let Some(rating) = row.rating
            && years.is_valid(row.air_year_start)
        {
            by_year.entry(row.air_year_start).or_default().push(rating);
        }
    }
    by_year
        .into_iter()
        .filter_map(|(year, ratings)| mean(&ratings).map(|mean| YearMean { year, mean }))
        .collect()
}

fn count_labels<'a>(
    table: &'a SeriesTable,
    labels: fn(&'a SeriesRow) -> Vec<&'a str>,
) -> Vec<LabelCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for row in &table.rows {
        for label in labels(row) {
            *counts.entry(label).or_default() += 1;
        }
    }
    let mut result: Vec<LabelCount> = counts
        .into_iter()
        .map(|(label, count)| LabelCount {
            label: label.to_string(),
            count,
        })
        .collect();
    result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    result
}

fn group_ratings<'a>(
    table: &'a SeriesTable,
    labels: fn(&'a SeriesRow) -> Vec<&'a str>,
) -> BTreeMap<&'a str, Vec<f64>> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for row in &table.rows {
        for label in labels(row) {
            let ratings = groups.entry(label).or_default();
            if let Some(rating) = row.rating {
                ratings.push(rating);
            }
        }
    }
    groups
}

/// Per service: number of series and their present ratings.
fn service_groups(table: &SeriesTable) -> BTreeMap<&str, (usize, Vec<f64>)> {
    let mut groups: BTreeMap<&str, (usize, Vec<f64>)> = BTreeMap::new();
    for row in &table.rows {
        for service in row.service_list() {
            let (count, ratings) = groups.entry(service).or_default();
            *count += 1;
            ratings.extend(row.rating);
        }
    }
    groups
}

fn describe(genre: &str, ratings: &[f64]) -> Option<RatingStats> {
    Some(RatingStats {
        genre: genre.to_string(),
        mean: mean(ratings)?,
        std_dev: sample_std_dev(ratings),
        max: ratings.iter().copied().reduce(f64::max)?,
        min: ratings.iter().copied().reduce(f64::min)?,
    })
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[allow(clippy::cast_precision_loss)]
fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Rounds to 3 decimal places.
#[must_use]
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let min = values.iter().copied().reduce(f64::min)?;
    let max = values.iter().copied().reduce(f64::max)?;
    Some((min, max))
}

/// Min-max normalization; `0` when every value is equal.
fn normalize(value: f64, range: Option<(f64, f64)>) -> f64 {
    match range {
        Some((min, max)) if max > min => (value - min) / (max - min),
        _ => 0.0,
    }
}

fn rating_within(rating: Option<f64>, min: f64) -> bool {
    rating.is_some_and(|r| (min..=MAX_RATING).contains(&r))
}

/// Descending by rating, missing ratings last.
fn rating_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
