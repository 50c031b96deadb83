//! MessagePack snapshots of a [`SeriesTable`].
//!
//! A crawl over pages `start..=end` is stored as
//! `<data_dir>/<base_name>_<start>_<end>.<extension>`; the merge step writes
//! `<data_dir>/<merged_name>`.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;

use crate::{SeriesTable, TableError};

/// Where snapshots live and how they are named.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Directory holding every snapshot.
    pub data_dir: PathBuf,
    /// File name prefix of page-range snapshots.
    pub base_name: String,
    /// File extension, without the dot.
    pub extension: String,
    /// File name of the merged snapshot.
    pub merged_name: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            base_name: "series_tv".to_string(),
            extension: "msgpack".to_string(),
            merged_name: "series_tv.msgpack".to_string(),
        }
    }
}

impl SnapshotConfig {
    /// File name for a crawl of pages `start..=end`.
    #[must_use]
    pub fn range_file_name(&self, start: u32, end: u32) -> String {
        format!("{}_{start}_{end}.{}", self.base_name, self.extension)
    }

    /// Full path for a crawl of pages `start..=end`.
    #[must_use]
    pub fn range_path(&self, start: u32, end: u32) -> PathBuf {
        self.data_dir.join(self.range_file_name(start, end))
    }

    /// Full path of the merged snapshot.
    #[must_use]
    pub fn merged_path(&self) -> PathBuf {
        self.data_dir.join(&self.merged_name)
    }

    /// Returns `(start, end)` if `file_name` follows the page-range naming
    /// convention and is not the merged snapshot.
    #[must_use]
    pub fn parse_range_file_name(&self, file_name: &str) -> Option<(u32, u32)> {
        if file_name == self.merged_name {
            return None;
        }
        let pattern = format!(
            r"^{}_(\d+)_(\d+)\.{}$",
            regex::escape(&self.base_name),
            regex::escape(&self.extension)
        );
        let re = Regex::new(&pattern).ok()?;
        let caps = re.captures(file_name)?;
        let start = caps.get(1)?.as_str().parse().ok()?;
        let end = caps.get(2)?.as_str().parse().ok()?;
        Some((start, end))
    }
}

/// Writes `table` to `path`, creating the parent directory if needed.
///
/// # Errors
///
/// Returns [`TableError`] if encoding or writing fails.
pub fn write_snapshot(path: &Path, table: &SeriesTable) -> Result<(), TableError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let bytes = rmp_serde::to_vec_named(table)?;
    std::fs::write(path, bytes)?;
    log::info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Reads a snapshot written by [`write_snapshot`].
///
/// # Errors
///
/// Returns [`TableError`] if the file cannot be read or decoded.
pub fn read_snapshot(path: &Path) -> Result<SeriesTable, TableError> {
    let bytes = std::fs::read(path)?;
    let table: SeriesTable = rmp_serde::from_slice(&bytes)?;
    log::debug!("Read {} rows from {}", table.len(), path.display());
    Ok(table)
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.as_os_str().is_empty() && !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use series_tv_series_models::Series;

    use super::*;

    #[test]
    fn names_page_ranges() {
        let config = SnapshotConfig::default();
        assert_eq!(config.range_file_name(1, 150), "series_tv_1_150.msgpack");
        assert_eq!(config.merged_path(), PathBuf::from("./series_tv.msgpack"));
    }

    #[test]
    fn parses_page_range_names() {
        let config = SnapshotConfig::default();
        assert_eq!(
            config.parse_range_file_name("series_tv_151_300.msgpack"),
            Some((151, 300))
        );
        assert_eq!(config.parse_range_file_name("series_tv.msgpack"), None);
        assert_eq!(config.parse_range_file_name("series_tv_1_x.msgpack"), None);
        assert_eq!(config.parse_range_file_name("series_tv_1_2.csv"), None);
        assert_eq!(config.parse_range_file_name("other_1_2.msgpack"), None);
    }

    #[test]
    fn merged_name_is_never_a_range() {
        let config = SnapshotConfig {
            merged_name: "series_tv_0_0.msgpack".to_string(),
            ..SnapshotConfig::default()
        };
        assert_eq!(config.parse_range_file_name("series_tv_0_0.msgpack"), None);
    }

    #[test]
    fn snapshot_round_trips_and_is_deterministic() {
        let dir = std::env::temp_dir().join("series_tv_snapshot_test");
        let _ = std::fs::remove_dir_all(&dir);

        let table = SeriesTable::from_series(&[
            Series::new("https://example.test/a", Some("A".to_string())),
            Series::new("https://example.test/b", None),
        ]);
        let path = dir.join("series_tv_1_2.msgpack");
        write_snapshot(&path, &table).unwrap();
        let first = std::fs::read(&path).unwrap();

        write_snapshot(&path, &SeriesTable::from_series(&[
            Series::new("https://example.test/a", Some("A".to_string())),
            Series::new("https://example.test/b", None),
        ]))
        .unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), first);

        assert_eq!(read_snapshot(&path).unwrap(), table);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
