use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::error::ExtractError;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Cell text of one worksheet, addressed by absolute (row, column).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetGrid {
    rows: Vec<Vec<String>>,
}

impl SheetGrid {
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Text of a cell; out-of-range cells read as blank.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map_or("", String::as_str)
    }

    #[must_use]
    pub fn row(&self, row: usize) -> Vec<String> {
        (0..self.width())
            .map(|column| self.cell(row, column).to_string())
            .collect()
    }
}

fn format_datetime(datetime: NaiveDateTime) -> String {
    datetime.format(DATETIME_FORMAT).to_string()
}

/// Spreadsheet serial date (days since 1899-12-30, time as the fraction).
fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let milliseconds = (serial * 86_400_000.0).round();
    if !milliseconds.is_finite() || milliseconds.abs() > 1e15 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let offset = TimeDelta::try_milliseconds(milliseconds as i64)?;
    epoch.checked_add_signed(offset)
}

pub(crate) fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) | Data::DateTimeIso(value) | Data::DurationIso(value) => {
            value.clone()
        }
        Data::Int(value) => value.to_string(),
        Data::Float(value) => value.to_string(),
        Data::Bool(true) => "True".to_string(),
        Data::Bool(false) => "False".to_string(),
        Data::DateTime(value) if !value.is_duration() => serial_to_datetime(value.as_f64())
            .map_or_else(|| value.to_string(), format_datetime),
        Data::DateTime(value) => value.to_string(),
        Data::Error(error) => error.to_string(),
    }
}

/// Reads a worksheet (the first one when `sheet` is unset) into a grid anchored at A1.
pub(crate) fn read_sheet_grid(path: &Path, sheet: Option<&str>) -> Result<SheetGrid, ExtractError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = match sheet {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|candidate| candidate == name) {
                return Err(ExtractError::SheetNotFound(name.to_string()));
            }
            workbook.worksheet_range(name)?
        }
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ExtractError::SheetNotFound("<first sheet>".to_string()))??,
    };

    let Some((last_row, last_column)) = range.end() else {
        return Ok(SheetGrid::default());
    };

    let rows = (0..=last_row)
        .map(|row| {
            (0..=last_column)
                .map(|column| range.get_value((row, column)).map_or_else(String::new, render_cell))
                .collect()
        })
        .collect();
    Ok(SheetGrid::from_rows(rows))
}
