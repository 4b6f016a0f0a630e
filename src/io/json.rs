//! Nested JSON form of a dimension table.
//!
//! The layout is column-major, keyed by column then by date:
//!
//! ```json
//! {"ZH": {"2020-03-01": 5, "2020-03-02": null}, "CH": {"2020-03-01": 5, "2020-03-02": 5}}
//! ```
//!
//! Missing values are written as `null` and read back as missing, never as zero.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use indexmap::IndexMap;

use crate::domain::{DATE_FORMAT, ValueGrid, parse_date};
use crate::error::AppError;

pub type NestedRecord = IndexMap<String, IndexMap<String, Option<u64>>>;

pub fn to_nested(grid: &ValueGrid) -> NestedRecord {
    let dates: Vec<String> = grid.dates.iter().map(|d| d.format(DATE_FORMAT).to_string()).collect();
    grid.columns
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let values = dates
                .iter()
                .zip(&grid.cells)
                .map(|(date, row)| (date.clone(), row[col]))
                .collect();
            (name.clone(), values)
        })
        .collect()
}

/// Rebuild a grid from its nested form. Dates absent from a column are missing values.
pub fn from_nested(nested: &NestedRecord) -> Result<ValueGrid, String> {
    let mut keys: Vec<&String> = Vec::new();
    for values in nested.values() {
        for key in values.keys() {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }

    let mut dates = keys.iter().map(|k| parse_date(k)).collect::<Result<Vec<_>, _>>()?;
    dates.sort();
    dates.dedup();

    let columns: Vec<String> = nested.keys().cloned().collect();
    let cells = dates
        .iter()
        .map(|date| {
            let key = date.format(DATE_FORMAT).to_string();
            nested
                .values()
                .map(|values| values.get(&key).copied().flatten())
                .collect()
        })
        .collect();

    Ok(ValueGrid { dates, columns, cells })
}

pub fn write_dimension_json(path: &Path, grid: &ValueGrid) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| AppError::output(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &to_nested(grid)).map_err(|e| AppError::output(path, e))?;
    writer.flush().map_err(|e| AppError::output(path, e))?;
    Ok(())
}

pub fn read_dimension_json(path: &Path) -> Result<ValueGrid, AppError> {
    let file = File::open(path).map_err(|e| AppError::input(path, e))?;
    let nested: NestedRecord = serde_json::from_reader(file).map_err(|e| AppError::input(path, e))?;
    from_nested(&nested).map_err(|e| AppError::input(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn grid() -> ValueGrid {
        let d = |day| NaiveDate::from_ymd_opt(2020, 3, day).unwrap();
        ValueGrid {
            dates: vec![d(1), d(2)],
            columns: vec!["ZH".into(), "CH".into()],
            cells: vec![vec![Some(5), Some(5)], vec![None, Some(5)]],
        }
    }

    #[test]
    fn nested_layout_is_column_then_date() {
        let json = serde_json::to_string(&to_nested(&grid())).unwrap();
        assert_eq!(
            json,
            r#"{"ZH":{"2020-03-01":5,"2020-03-02":null},"CH":{"2020-03-01":5,"2020-03-02":5}}"#
        );
    }

    #[test]
    fn file_reimport_preserves_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cases.json");
        write_dimension_json(&path, &grid()).unwrap();

        let back = read_dimension_json(&path).unwrap();
        assert_eq!(back, grid());
        assert_eq!(back.get(NaiveDate::from_ymd_opt(2020, 3, 2).unwrap(), "ZH"), None);
    }

    #[test]
    fn unreadable_file_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cases.json");
        std::fs::write(&path, r#"{"ZH":{"2020-13-01":1}}"#).unwrap();
        assert!(matches!(read_dimension_json(&path), Err(AppError::Input { .. })));
        assert!(matches!(
            read_dimension_json(&dir.path().join("missing.json")),
            Err(AppError::Input { .. })
        ));
    }

    #[test]
    fn absent_dates_read_as_missing() {
        let nested: NestedRecord =
            serde_json::from_str(r#"{"A":{"2020-03-02":1},"B":{"2020-03-01":2,"2020-03-02":3}}"#).unwrap();
        let grid = from_nested(&nested).unwrap();
        assert_eq!(grid.dates.len(), 2);
        assert_eq!(grid.cells[0], vec![None, Some(2)]);
        assert_eq!(grid.cells[1], vec![Some(1), Some(3)]);
    }
}
