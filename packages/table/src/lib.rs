#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The normalized series table and everything that persists it.
//!
//! [`normalize::build_table`] turns crawled [`Series`] records into a
//! [`SeriesTable`] whose columns each carry one type and one placeholder.
//! [`snapshot`] writes and reads MessagePack snapshots, [`merge`] combines
//! page-range snapshots into the canonical merged file, and [`csv_export`]
//! converts a table to and from CSV.

pub mod csv_export;
pub mod merge;
pub mod normalize;
pub mod snapshot;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use series_tv_series_models::{Series, SeriesRow};

pub use normalize::build_table;
pub use snapshot::SnapshotConfig;

/// Extension that marks a table file as CSV rather than a snapshot.
pub const CSV_EXTENSION: &str = "csv";

/// Errors that can occur while persisting or loading tables.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing a snapshot failed.
    #[error("Snapshot encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// Deserializing a snapshot failed.
    #[error("Snapshot decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// Reading or writing CSV failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A CSV file lacks a required column.
    #[error("CSV file is missing column '{column}'")]
    MissingColumn {
        /// Name of the absent column.
        column: String,
    },

    /// No page-range snapshots were found to merge.
    #[error("No snapshot files to merge in {}", dir.display())]
    NothingToMerge {
        /// The directory that was searched.
        dir: PathBuf,
    },
}

/// One row per series, columns in [`series_tv_series_models::SeriesColumn`]
/// order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesTable {
    pub rows: Vec<SeriesRow>,
}

impl SeriesTable {
    /// Wraps already-built rows.
    #[must_use]
    pub const fn new(rows: Vec<SeriesRow>) -> Self {
        Self { rows }
    }

    /// Builds a normalized table from crawled series.
    #[must_use]
    pub fn from_series(items: &[Series]) -> Self {
        build_table(items)
    }

    /// Re-applies the column normalization rules to every row.
    ///
    /// Idempotent: normalizing an already-normalized table is a no-op.
    #[must_use]
    pub fn normalize(self) -> Self {
        Self {
            rows: self.rows.into_iter().map(normalize::normalize_row).collect(),
        }
    }

    /// Appends every row of `other`.
    pub fn extend(&mut self, other: Self) {
        self.rows.extend(other.rows);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Loads a table from a snapshot, or from a CSV export when `path` ends in
/// `.csv`.
///
/// # Errors
///
/// Returns [`TableError`] if the file cannot be read or decoded.
pub fn load_table(path: &Path) -> Result<SeriesTable, TableError> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(CSV_EXTENSION));
    if is_csv {
        csv_export::import_csv(path)
    } else {
        snapshot::read_snapshot(path)
    }
}

#[cfg(test)]
mod tests {
    use series_tv_series_models::UNAVAILABLE_PLACEHOLDER;

    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn load_table_reads_snapshots_and_csv() {
        let dir = temp_dir("series_tv_load_table_test");
        let mut series = Series::new("https://example.test/a", Some("Alpha".to_string()));
        series.rating = Some(4.5);
        let table = SeriesTable::from_series(&[series]);

        let snapshot = dir.join("table.msgpack");
        snapshot::write_snapshot(&snapshot, &table).unwrap();
        assert_eq!(load_table(&snapshot).unwrap(), table);

        let csv = dir.join("table.CSV");
        csv_export::export_csv(&csv, &table).unwrap();
        assert_eq!(load_table(&csv).unwrap(), table);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_table_coerces_hand_edited_csv() {
        let dir = temp_dir("series_tv_load_table_coerce_test");
        let path = dir.join("edited.csv");
        std::fs::write(
            &path,
            "link,title,title_original,genres,season_count,episode_count,\
             air_year_start,air_year_end,rating,available_on\n\
             https://example.test/b,Beta,,Drama,two,10,2015,2010,N/A,\n",
        )
        .unwrap();

        let row = &load_table(&path).unwrap().rows[0];
        assert_eq!(row.season_count, 0);
        assert_eq!(row.episode_count, 10);
        assert_eq!(row.air_year_start, 2015);
        assert_eq!(row.air_year_end, 0);
        assert_eq!(row.rating, None);
        assert_eq!(row.available_on, UNAVAILABLE_PLACEHOLDER);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
