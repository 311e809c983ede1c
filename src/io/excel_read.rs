use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use chrono::NaiveDate;

use crate::error::{ReportError, Result};

/// One extract cell, decoupled from the reader's own value type so the rest
/// of the pipeline (and the tests) never touch calamine directly.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl CellValue {
    /// Trimmed textual view of the cell; empty string for blank cells.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(value) => value.trim().to_string(),
            CellValue::Number(value) => value.to_string(),
            CellValue::Bool(value) => value.to_string(),
            CellValue::Date(value) => value.to_string(),
        }
    }

    /// Numeric view of the cell; non-numeric content coerces to zero.
    pub fn as_number(&self) -> f64 {
        match self {
            CellValue::Number(value) => *value,
            CellValue::Text(value) => value.trim().replace(',', "").parse().unwrap_or(0.0),
            CellValue::Bool(true) => 1.0,
            _ => 0.0,
        }
    }

    /// Date view of the cell, accepting ISO-formatted text as well.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(value) => Some(*value),
            CellValue::Text(value) => NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok(),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(value) => value.trim().is_empty(),
            _ => false,
        }
    }
}

/// The raw extract: one header row plus data rows, as read.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Grid {
    /// Cell at `(row, column)`; `Empty` for ragged rows.
    pub fn cell<'a>(&self, row: &'a [CellValue], index: usize) -> &'a CellValue {
        row.get(index).unwrap_or(&CellValue::Empty)
    }
}

/// Reads the first worksheet of the extract into a [`Grid`].
///
/// The source is never mutated; a missing file, an empty workbook, or an
/// empty sheet all fail with a load error before any entity is processed.
pub fn read_grid(path: &Path) -> Result<Grid> {
    if !path.exists() {
        return Err(ReportError::Load(format!(
            "extract not found: {}",
            path.display()
        )));
    }

    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ReportError::Load(format!("no worksheet in {}", path.display())))?
        .map_err(ReportError::from)?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| ReportError::Load(format!("empty worksheet in {}", path.display())))?
        .iter()
        .map(|cell| cell_to_value(cell).as_text())
        .collect();

    let rows = rows
        .map(|row| row.iter().map(cell_to_value).collect())
        .collect();

    Ok(Grid { headers, rows })
}

fn cell_to_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::Empty => CellValue::Empty,
        DataType::String(value) => CellValue::Text(value.clone()),
        DataType::Float(value) => CellValue::Number(*value),
        DataType::Int(value) => CellValue::Number(*value as f64),
        DataType::Bool(value) => CellValue::Bool(*value),
        DataType::DateTime(_) => match cell.as_datetime() {
            Some(datetime) => CellValue::Date(datetime.date()),
            None => CellValue::Empty,
        },
        other => CellValue::Text(other.to_string()),
    }
}
