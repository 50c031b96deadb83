//! Merges page-range snapshots into the canonical merged snapshot.
//!
//! Crawls are often split into page ranges (`series_tv_1_150.msgpack`,
//! `series_tv_151_300.msgpack`, ...). [`merge_snapshots`] concatenates the
//! rows of every such file in the data directory, in page order, and writes
//! the result under the merged name. The merged file itself never matches
//! the page-range pattern, so re-running a merge does not include its own
//! previous output.

use std::path::{Path, PathBuf};

use crate::snapshot::{SnapshotConfig, read_snapshot, write_snapshot};
use crate::{SeriesTable, TableError};

/// A page-range snapshot found on disk.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RangeSnapshot {
    pub start_page: u32,
    pub end_page: u32,
    pub path: PathBuf,
}

/// Outcome of a merge.
#[derive(Debug, Clone)]
pub struct MergeSummary {
    /// Snapshots that were merged, in merge order.
    pub inputs: Vec<RangeSnapshot>,
    /// Where the merged snapshot was written.
    pub output: PathBuf,
    /// Number of rows in the merged snapshot.
    pub rows: usize,
}

/// Lists page-range snapshots in the data directory, ordered by start page
/// then end page.
///
/// # Errors
///
/// Returns [`TableError::Io`] if the directory cannot be read.
pub fn find_range_snapshots(config: &SnapshotConfig) -> Result<Vec<RangeSnapshot>, TableError> {
    let mut found = Vec::new();

    for entry in std::fs::read_dir(&config.data_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if let Some((start_page, end_page)) = config.parse_range_file_name(name) {
            found.push(RangeSnapshot {
                start_page,
                end_page,
                path: entry.path(),
            });
        }
    }

    found.sort();
    Ok(found)
}

/// Merges every page-range snapshot into [`SnapshotConfig::merged_path`].
///
/// # Errors
///
/// Returns [`TableError::NothingToMerge`] if no page-range snapshots exist,
/// or another [`TableError`] if reading or writing fails.
pub fn merge_snapshots(config: &SnapshotConfig) -> Result<MergeSummary, TableError> {
    merge_snapshots_to(config, &config.merged_path())
}

/// Merges every page-range snapshot into `output`.
///
/// `output` itself is never an input, even when its name follows the
/// page-range convention.
///
/// # Errors
///
/// Returns [`TableError::NothingToMerge`] if no page-range snapshots exist,
/// or another [`TableError`] if reading or writing fails.
pub fn merge_snapshots_to(
    config: &SnapshotConfig,
    output: &Path,
) -> Result<MergeSummary, TableError> {
    let inputs: Vec<RangeSnapshot> = find_range_snapshots(config)?
        .into_iter()
        .filter(|input| !same_file(&input.path, output))
        .collect();
    if inputs.is_empty() {
        return Err(TableError::NothingToMerge {
            dir: config.data_dir.clone(),
        });
    }

    let mut merged = SeriesTable::default();
    for input in &inputs {
        let table = read_snapshot(&input.path)?;
        log::info!(
            "Merging {} ({} rows, pages {}-{})",
            input.path.display(),
            table.len(),
            input.start_page,
            input.end_page
        );
        merged.extend(table);
    }

    let merged = merged.normalize();
    write_snapshot(output, &merged)?;

    log::info!(
        "Merged {} snapshots into {} ({} series)",
        inputs.len(),
        output.display(),
        merged.len()
    );

    Ok(MergeSummary {
        rows: merged.len(),
        inputs,
        output: output.to_path_buf(),
    })
}

/// Compares two paths by the file they name. Spellings such as `./x` and
/// `dir/../dir/x` resolve to the same file once canonicalized.
fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use series_tv_series_models::Series;

    use super::*;

    fn table_of(links: &[&str]) -> SeriesTable {
        let items: Vec<Series> = links.iter().map(|l| Series::new(*l, None)).collect();
        SeriesTable::from_series(&items)
    }

    fn config_in(name: &str) -> SnapshotConfig {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        SnapshotConfig {
            data_dir: dir,
            ..SnapshotConfig::default()
        }
    }

    #[test]
    fn merges_ranges_in_page_order() {
        let config = config_in("series_tv_merge_order_test");
        write_snapshot(&config.range_path(151, 300), &table_of(&["c"])).unwrap();
        write_snapshot(&config.range_path(1, 150), &table_of(&["a", "b"])).unwrap();
        std::fs::write(config.data_dir.join("notes.txt"), "ignore me").unwrap();

        let summary = merge_snapshots(&config).unwrap();
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.inputs.len(), 2);
        assert_eq!(summary.inputs[0].start_page, 1);

        let merged = read_snapshot(&summary.output).unwrap();
        let links: Vec<&str> = merged.rows.iter().map(|r| r.link.as_str()).collect();
        assert_eq!(links, vec!["a", "b", "c"]);

        let _ = std::fs::remove_dir_all(&config.data_dir);
    }

    #[test]
    fn rerunning_does_not_include_previous_output() {
        let config = config_in("series_tv_merge_rerun_test");
        write_snapshot(&config.range_path(1, 2), &table_of(&["a"])).unwrap();

        merge_snapshots(&config).unwrap();
        let second = merge_snapshots(&config).unwrap();
        assert_eq!(second.rows, 1);
        assert_eq!(second.inputs.len(), 1);

        let _ = std::fs::remove_dir_all(&config.data_dir);
    }

    #[test]
    fn explicit_output_is_never_an_input() {
        let config = config_in("series_tv_merge_output_test");
        write_snapshot(&config.range_path(1, 2), &table_of(&["a"])).unwrap();
        let output = config.range_path(0, 0);

        let first = merge_snapshots_to(&config, &output).unwrap();
        let second = merge_snapshots_to(&config, &output).unwrap();
        assert_eq!(first.rows, 1);
        assert_eq!(second.rows, 1);
        assert_eq!(read_snapshot(&output).unwrap().len(), 1);

        let _ = std::fs::remove_dir_all(&config.data_dir);
    }

    #[test]
    fn output_spelled_differently_is_still_excluded() {
        let config = config_in("series_tv_merge_spelling_test");
        write_snapshot(&config.range_path(1, 2), &table_of(&["a"])).unwrap();
        let output = config
            .data_dir
            .join("..")
            .join("series_tv_merge_spelling_test")
            .join(".")
            .join(config.range_file_name(0, 0));

        let first = merge_snapshots_to(&config, &output).unwrap();
        let second = merge_snapshots_to(&config, &output).unwrap();
        assert_eq!(first.rows, 1);
        assert_eq!(second.rows, 1);
        assert_eq!(second.inputs.len(), 1);
        assert_eq!(second.inputs[0].end_page, 2);

        let _ = std::fs::remove_dir_all(&config.data_dir);
    }

    #[test]
    fn empty_directory_has_nothing_to_merge() {
        let config = config_in("series_tv_merge_empty_test");
        let err = merge_snapshots(&config).unwrap_err();
        assert!(matches!(err, TableError::NothingToMerge { .. }));
        let _ = std::fs::remove_dir_all(&config.data_dir);
    }
}
