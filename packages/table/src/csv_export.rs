//! CSV import/export of a [`SeriesTable`].
//!
//! The header row uses the snake_case column names in table order. Missing
//! ratings are written as `NA`. Reading applies the textual coercions from
//! [`crate::normalize`], so hand-edited files with blank or malformed cells
//! still load as a uniformly-typed table.

use std::io::{Read, Write};
use std::path::Path;

use series_tv_series_models::{SeriesColumn, SeriesRow};

use crate::normalize::{normalize_row, parse_count, parse_rating, parse_year};
use crate::snapshot::ensure_dir;
use crate::{SeriesTable, TableError};

/// Writes `table` as CSV to `writer`.
///
/// # Errors
///
/// Returns [`TableError::Csv`] if writing fails.
pub fn write_csv<W: Write>(writer: W, table: &SeriesTable) -> Result<(), TableError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(SeriesColumn::ALL.iter().map(AsRef::<str>::as_ref))?;
    for row in &table.rows {
        out.write_record(SeriesColumn::ALL.iter().map(|c| row.cell(*c)))?;
    }
    out.flush()?;
    Ok(())
}

/// Writes `table` as CSV to the file at `path`.
///
/// # Errors
///
/// Returns [`TableError`] if the file cannot be created or written.
pub fn export_csv(path: &Path, table: &SeriesTable) -> Result<(), TableError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_csv(file, table)?;
    log::info!("Exported {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Reads the CSV file at `path` back into a table.
///
/// # Errors
///
/// Returns [`TableError`] if the file cannot be opened or parsed.
pub fn import_csv(path: &Path) -> Result<SeriesTable, TableError> {
    let file = std::fs::File::open(path)?;
    let table = read_csv(file)?;
    log::info!("Imported {} rows from {}", table.len(), path.display());
    Ok(table)
}

/// Reads a CSV table written by [`write_csv`].
///
/// Columns are matched by header name, so their order does not matter.
///
/// # Errors
///
/// Returns [`TableError::MissingColumn`] if a column is absent, or
/// [`TableError::Csv`] if the input is not valid CSV.
pub fn read_csv<R: Read>(reader: R) -> Result<SeriesTable, TableError> {
    let mut input = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers: Vec<String> = input
        .headers()?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect();
    let mut positions = Vec::with_capacity(SeriesColumn::ALL.len());
    for column in SeriesColumn::ALL {
        let name: &str = column.as_ref();
        let index = headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| TableError::MissingColumn {
                column: name.to_string(),
            })?;
        positions.push(index);
    }

    let mut rows = Vec::new();
    for record in input.records() {
        let record = record?;
        let cell = |column: SeriesColumn| field(&record, &positions, column);

        rows.push(normalize_row(SeriesRow {
            link: cell(SeriesColumn::Link).to_string(),
            title: cell(SeriesColumn::Title).to_string(),
            title_original: cell(SeriesColumn::TitleOriginal).to_string(),
            genres: cell(SeriesColumn::Genres).to_string(),
            season_count: parse_count(cell(SeriesColumn::SeasonCount)),
            episode_count: parse_count(cell(SeriesColumn::EpisodeCount)),
            air_year_start: parse_year(cell(SeriesColumn::AirYearStart)),
            air_year_end: parse_year(cell(SeriesColumn::AirYearEnd)),
            rating: parse_rating(cell(SeriesColumn::Rating)),
            available_on: cell(SeriesColumn::AvailableOn).to_string(),
        }));
    }

    Ok(SeriesTable::new(rows))
}

fn field<'r>(record: &'r csv::StringRecord, positions: &[usize], column: SeriesColumn) -> &'r str {
    positions
        .get(column as usize)
        .and_then(|&index| record.get(index))
        .unwrap_or("")
}
