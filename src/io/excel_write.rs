use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet};

use crate::error::{ReportError, Result};
use crate::model::{SummaryTable, format_margin, group_thousands};
use crate::render::{ColumnStyle, DetailCell, DetailTable};

/// Generic width cap for auto-sized columns.
const MAX_COLUMN_WIDTH: usize = 30;
/// Description columns widen beyond the generic cap.
const MAX_DESCRIPTION_WIDTH: usize = 60;

/// One worksheet of a report artifact.
pub enum Sheet<'a> {
    /// An aggregated rollup. `numeric_columns` names the columns the
    /// numeric formatting rule applies to; naming a column absent from the
    /// table is a render error.
    Summary {
        name: String,
        table: &'a SummaryTable,
        numeric_columns: Vec<String>,
    },
    /// Raw line items with per-column styles.
    Detail {
        name: String,
        table: &'a DetailTable,
    },
}

/// Cell formats shared by every sheet of an artifact.
struct Styles {
    header: Format,
    text: Format,
    monetary: Format,
    margin: Format,
    date: Format,
    total_text: Format,
    total_monetary: Format,
}

impl Styles {
    fn new() -> Self {
        let header = Format::new()
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(0x006400))
            .set_align(FormatAlign::Left);
        let monetary = Format::new()
            .set_align(FormatAlign::Right)
            .set_num_format("#,##0");
        let margin = Format::new()
            .set_align(FormatAlign::Right)
            .set_num_format("0.0%");
        Self {
            header,
            text: Format::new().set_align(FormatAlign::Left),
            total_monetary: monetary.clone().set_bold(),
            monetary,
            margin,
            date: Format::new()
                .set_align(FormatAlign::Right)
                .set_num_format("mm/dd/yyyy"),
            total_text: Format::new().set_align(FormatAlign::Left).set_bold(),
        }
    }
}

/// Writes a report artifact with one worksheet per sheet description.
pub fn write_workbook(path: &Path, sheets: &[Sheet<'_>]) -> Result<()> {
    let styles = Styles::new();
    let mut workbook = Workbook::new();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        match sheet {
            Sheet::Summary {
                name,
                table,
                numeric_columns,
            } => write_summary_sheet(worksheet, name, table, numeric_columns, &styles)?,
            Sheet::Detail { name, table } => write_detail_sheet(worksheet, name, table, &styles)?,
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn write_summary_sheet(
    worksheet: &mut Worksheet,
    name: &str,
    table: &SummaryTable,
    numeric_columns: &[String],
    styles: &Styles,
) -> Result<()> {
    worksheet.set_name(name)?;

    let mut columns = Vec::with_capacity(table.value_headers.len() + 1);
    columns.push(table.key_header.clone());
    columns.extend(table.value_headers.iter().cloned());

    // Every formatting rule must resolve against this table.
    for rule in numeric_columns {
        if !columns.iter().any(|column| column == rule) {
            return Err(ReportError::Render {
                sheet: name.to_string(),
                column: rule.clone(),
            });
        }
    }

    for (col_idx, header) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col_idx as u16, header, &styles.header)?;
    }

    // An empty rollup stays header-only: no Total row to disagree with the
    // "no data" placeholder in the rendered body.
    let data_rows = table.rows.iter().map(|row| (row, false));
    let total_row = (!table.is_empty()).then_some((&table.total, true));
    for (row_idx, (row, is_total)) in data_rows.chain(total_row).enumerate() {
        let excel_row = (row_idx + 1) as u32;
        let key_format = if is_total { &styles.total_text } else { &styles.text };
        worksheet.write_string_with_format(excel_row, 0, &row.key, key_format)?;
        for (value_idx, value) in row.values.iter().enumerate() {
            let format = if is_total {
                &styles.total_monetary
            } else {
                &styles.monetary
            };
            worksheet.write_number_with_format(
                excel_row,
                (value_idx + 1) as u16,
                *value as f64,
                format,
            )?;
        }
    }

    // Width from the display projection so formatted values fit.
    let mut widths: Vec<usize> = columns.iter().map(String::len).collect();
    if !table.is_empty() {
        let formatted = table.formatted();
        for row in &formatted.rows {
            for (col_idx, cell) in row.iter().enumerate() {
                if cell.len() > widths[col_idx] {
                    widths[col_idx] = cell.len();
                }
            }
        }
    }
    for (col_idx, width) in widths.iter().enumerate() {
        let capped = (width + 2).min(MAX_COLUMN_WIDTH);
        worksheet.set_column_width(col_idx as u16, capped as f64)?;
    }

    let written_rows = table.rows.len() + usize::from(!table.is_empty());
    finish_sheet(worksheet, written_rows, columns.len())
}

fn write_detail_sheet(
    worksheet: &mut Worksheet,
    name: &str,
    table: &DetailTable,
    styles: &Styles,
) -> Result<()> {
    worksheet.set_name(name)?;

    for (col_idx, column) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col_idx as u16, &column.header, &styles.header)?;
    }

    let mut widths: Vec<usize> = table.columns.iter().map(|column| column.header.len()).collect();

    for (row_idx, row) in table.rows.iter().enumerate() {
        let excel_row = (row_idx + 1) as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            let column = col_idx as u16;
            let display_len = match cell {
                DetailCell::Empty => 0,
                DetailCell::Text(value) => {
                    worksheet.write_string_with_format(excel_row, column, value, &styles.text)?;
                    value.len()
                }
                DetailCell::Integer(value) => {
                    worksheet.write_number_with_format(
                        excel_row,
                        column,
                        *value as f64,
                        &styles.monetary,
                    )?;
                    group_thousands(*value).len()
                }
                DetailCell::Ratio(value) => {
                    worksheet.write_number_with_format(excel_row, column, *value, &styles.margin)?;
                    format_margin(*value).len()
                }
                DetailCell::Date(value) => {
                    worksheet.write_datetime_with_format(excel_row, column, value, &styles.date)?;
                    10
                }
            };
            if display_len > widths[col_idx] {
                widths[col_idx] = display_len;
            }
        }
    }

    for (col_idx, width) in widths.iter().enumerate() {
        let cap = match table.columns[col_idx].style {
            ColumnStyle::Description => MAX_DESCRIPTION_WIDTH,
            _ => MAX_COLUMN_WIDTH,
        };
        worksheet.set_column_width(col_idx as u16, (width + 2).min(cap) as f64)?;
    }

    finish_sheet(worksheet, table.rows.len(), table.columns.len())
}

/// Header filter plus frozen header row and first column.
fn finish_sheet(worksheet: &mut Worksheet, data_rows: usize, columns: usize) -> Result<()> {
    let last_row = data_rows as u32;
    let last_col = (columns as u16).saturating_sub(1);
    worksheet.autofilter(0, 0, last_row, last_col)?;
    worksheet.set_freeze_panes(1, 1)?;
    Ok(())
}
