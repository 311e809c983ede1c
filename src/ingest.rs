use tracing::{debug, warn};

use crate::config::RunConfig;
use crate::error::Result;
use crate::io::excel_read::{CellValue, Grid};
use crate::model::{Category, Record};
use crate::schema::Schema;

/// Cleans and normalizes the raw grid into the run's record set.
///
/// Rows are dropped when they miss a rep or manager email, when their
/// category equals the configured excluded segment (aggregate market-level
/// rows), or when the category is outside the two known pricing categories.
/// Every drop is counted and logged; the grid itself is never mutated.
pub fn build_records(grid: &Grid, schema: &Schema, config: &RunConfig) -> Result<Vec<Record>> {
    let mut records = Vec::with_capacity(grid.rows.len());
    let mut missing_identity = 0usize;
    let mut excluded_segment = 0usize;
    let mut unknown_category = 0usize;

    for row in &grid.rows {
        let rep_email = grid.cell(row, schema.rep_email.index);
        let manager_email = grid.cell(row, schema.manager_email.index);
        if rep_email.is_empty() || manager_email.is_empty() {
            missing_identity += 1;
            continue;
        }

        let category_text = grid.cell(row, schema.category.index).as_text();
        if category_text.eq_ignore_ascii_case(&config.excluded_segment) {
            excluded_segment += 1;
            continue;
        }
        let Some(category) = Category::parse(&category_text) else {
            unknown_category += 1;
            warn!(category = %category_text, "row outside known pricing categories, dropped");
            continue;
        };

        records.push(Record {
            rep_email: rep_email.as_text(),
            rep_name: grid.cell(row, schema.rep_name.index).as_text(),
            manager_email: manager_email.as_text(),
            manager_name: grid.cell(row, schema.manager_name.index).as_text(),
            category,
            gross_sales: to_monetary(grid.cell(row, schema.gross_sales.index)),
            opp_to_floor: to_monetary(grid.cell(row, schema.opp_to_floor.index)),
            opp_to_target: to_monetary(grid.cell(row, schema.opp_to_target.index)),
            margin: to_margin(grid.cell(row, schema.margin.index)),
            item_number: item_number_text(grid.cell(row, schema.item_number.index)),
            item_name: grid.cell(row, schema.item_name.index).as_text(),
            description: grid.cell(row, schema.description.index).as_text(),
            visibility_tier: grid.cell(row, schema.visibility_tier.index).as_text(),
            transaction_date: schema
                .transaction_date
                .as_ref()
                .and_then(|column| grid.cell(row, column.index).as_date()),
        });
    }

    if missing_identity > 0 {
        warn!(count = missing_identity, "dropped rows missing rep or manager email");
    }
    if excluded_segment > 0 {
        debug!(count = excluded_segment, segment = %config.excluded_segment, "dropped excluded segment rows");
    }
    if unknown_category > 0 {
        warn!(count = unknown_category, "dropped rows with unknown category");
    }
    debug!(count = records.len(), "record set cleaned");

    Ok(records)
}

/// Monetary and opportunity normalization: non-numeric coerces to zero,
/// then rounds to the nearest integer with ties going to the even value.
fn to_monetary(cell: &CellValue) -> i64 {
    cell.as_number().round_ties_even() as i64
}

/// Margin normalization: a fraction rounded to three decimal places.
fn to_margin(cell: &CellValue) -> f64 {
    (cell.as_number() * 1000.0).round_ties_even() / 1000.0
}

/// Item numbers arrive as floats from the extract; render them without a
/// fractional part.
fn item_number_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Number(value) => format!("{}", *value as i64),
        other => other.as_text(),
    }
}
