//! Delimited-text and summary exports.
//!
//! Every writer truncates its target; reports are never appended to.

use std::fs::File;
use std::path::Path;

use crate::domain::{DATE_FORMAT, LastUpdate, ValueGrid, parse_date};
use crate::error::AppError;
use crate::report::SummaryRecord;

/// Write a dimension grid as `Date,<columns...>`; missing values are empty cells.
pub fn write_dimension_csv(path: &Path, grid: &ValueGrid) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| AppError::output(path, e))?;

    let mut header = Vec::with_capacity(grid.columns.len() + 1);
    header.push("Date");
    header.extend(grid.columns.iter().map(String::as_str));
    writer.write_record(&header).map_err(|e| AppError::output(path, e))?;

    for (date, row) in grid.dates.iter().zip(&grid.cells) {
        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(date.format(DATE_FORMAT).to_string());
        record.extend(row.iter().map(|v| v.map(|n| n.to_string()).unwrap_or_default()));
        writer.write_record(&record).map_err(|e| AppError::output(path, e))?;
    }

    writer.flush().map_err(|e| AppError::output(path, e))?;
    Ok(())
}

/// Read back a grid written by `write_dimension_csv`.
pub fn read_dimension_csv(path: &Path) -> Result<ValueGrid, AppError> {
    let file = File::open(path).map_err(|e| AppError::input(path, e))?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader.headers().map_err(|e| AppError::input(path, e))?.clone();
    let mut names = headers.iter();
    if names.next() != Some("Date") {
        return Err(AppError::input(path, "first column must be `Date`"));
    }
    let columns: Vec<String> = names.map(str::to_string).collect();

    let mut grid = ValueGrid {
        columns,
        ..ValueGrid::default()
    };
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|e| AppError::input(path, e))?;
        let date = parse_date(record.get(0).unwrap_or_default())
            .map_err(|e| AppError::input(path, format!("line {line}: {e}")))?;

        let mut row = Vec::with_capacity(grid.columns.len());
        for i in 0..grid.columns.len() {
            let value = match record.get(i + 1).map(str::trim) {
                None | Some("") => None,
                Some(s) => Some(
                    s.parse::<u64>()
                        .map_err(|_| AppError::input(path, format!("line {line}: invalid count `{s}`")))?,
                ),
            };
            row.push(value);
        }
        grid.dates.push(date);
        grid.cells.push(row);
    }

    Ok(grid)
}

/// Write `Canton,Date,Time` for every region. Regions with an empty feed get blank fields.
pub fn write_last_updated_csv(path: &Path, entries: &[(String, Option<LastUpdate>)]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| AppError::output(path, e))?;
    writer
        .write_record(["Canton", "Date", "Time"])
        .map_err(|e| AppError::output(path, e))?;

    for (code, last) in entries {
        let (date, time) = match last {
            Some(l) => (l.date.format(DATE_FORMAT).to_string(), l.time.clone()),
            None => (String::new(), String::new()),
        };
        writer
            .write_record([code.as_str(), date.as_str(), time.as_str()])
            .map_err(|e| AppError::output(path, e))?;
    }

    writer.flush().map_err(|e| AppError::output(path, e))?;
    Ok(())
}

/// Write the digest as a single flat JSON object.
pub fn write_summary_json(path: &Path, summary: &SummaryRecord) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| AppError::output(path, e))?;
    serde_json::to_writer(file, summary).map_err(|e| AppError::output(path, e))?;
    Ok(())
}
