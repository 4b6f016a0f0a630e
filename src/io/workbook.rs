//! Combined `.xlsx` workbook: one sheet per metric, raw values.

use std::path::Path;

use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};

use crate::domain::{DATE_FORMAT, ValueGrid};
use crate::error::AppError;

/// Write one sheet per `(sheet name, grid)` pair, in order. Missing values stay blank.
pub fn write_workbook(path: &Path, sheets: &[(&str, ValueGrid)]) -> Result<(), AppError> {
    let mut workbook = Workbook::new();
    for (name, grid) in sheets {
        let sheet = workbook.add_worksheet();
        fill_sheet(sheet, name, grid).map_err(|e| AppError::output(path, format!("sheet {name}: {e}")))?;
    }
    workbook.save(path).map_err(|e| AppError::output(path, e))?;
    Ok(())
}

fn fill_sheet(sheet: &mut Worksheet, name: &str, grid: &ValueGrid) -> Result<(), XlsxError> {
    sheet.set_name(name)?;
    sheet.write_string(0, 0, "Date")?;
    for (col, header) in grid.columns.iter().enumerate() {
        sheet.write_string(0, column_index(col + 1)?, header)?;
    }

    for (idx, (date, row)) in grid.dates.iter().zip(&grid.cells).enumerate() {
        let r = row_index(idx + 1)?;
        sheet.write_string(r, 0, date.format(DATE_FORMAT).to_string())?;
        for (col, value) in row.iter().enumerate() {
            if let Some(v) = value {
                sheet.write_number(r, column_index(col + 1)?, *v as f64)?;
            }
        }
    }
    Ok(())
}

fn row_index(idx: usize) -> Result<u32, XlsxError> {
    u32::try_from(idx).map_err(|_| XlsxError::RowColumnLimitError)
}

fn column_index(idx: usize) -> Result<u16, XlsxError> {
    u16::try_from(idx).map_err(|_| XlsxError::RowColumnLimitError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Reader, Xlsx, open_workbook};
    use chrono::NaiveDate;

    #[test]
    fn sheets_follow_given_names_and_leave_gaps_blank() {
        let d = |day| NaiveDate::from_ymd_opt(2020, 3, day).unwrap();
        let grid = ValueGrid {
            dates: vec![d(1), d(2)],
            columns: vec!["ZH".into(), "CH".into()],
            cells: vec![vec![Some(5), Some(5)], vec![None, Some(5)]],
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        write_workbook(&path, &[("Cases", grid.clone()), ("Ventilated", grid)]).unwrap();

        let mut book: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(book.sheet_names(), vec!["Cases".to_string(), "Ventilated".to_string()]);

        let range = book.worksheet_range("Cases").unwrap();
        let rows: Vec<Vec<String>> = range
            .rows()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect();
        assert_eq!(rows[0], vec!["Date", "ZH", "CH"]);
        assert_eq!(rows[1], vec!["2020-03-01", "5", "5"]);
        assert_eq!(rows[2], vec!["2020-03-02", "", "5"]);
    }
}
