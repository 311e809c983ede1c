pub mod html;

use chrono::NaiveDate;

use crate::model::{Category, Record};
use crate::schema::Schema;

/// Formatting class of a detail column, driving alignment, number format,
/// and width rules in the workbook writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnStyle {
    Text,
    /// Wide free-text column (descriptions); gets a larger width cap.
    Description,
    /// Integer currency, right-aligned with thousands separators.
    Monetary,
    /// Fraction rendered as a percentage with one decimal.
    Margin,
    Date,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailColumn {
    pub header: String,
    pub style: ColumnStyle,
}

/// One typed detail cell; the writer picks the cell format from the
/// owning column's style.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailCell {
    Empty,
    Text(String),
    Integer(i64),
    Ratio(f64),
    Date(NaiveDate),
}

/// Raw line items projected for one worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailTable {
    pub columns: Vec<DetailColumn>,
    pub rows: Vec<Vec<DetailCell>>,
}

/// Projects one category's records into a detail table for a
/// representative's workbook, ordered by the category's action priority:
/// Basement by opp-to-floor descending, Attic by gross sales descending.
/// The Attic projection omits the opp-to-floor column.
pub fn category_detail(records: &[&Record], category: Category, schema: &Schema) -> DetailTable {
    let mut sorted: Vec<&Record> = records.to_vec();
    match category {
        Category::Basement => sorted.sort_by(|lhs, rhs| {
            rhs.opp_to_floor
                .cmp(&lhs.opp_to_floor)
                .then_with(|| lhs.item_name.cmp(&rhs.item_name))
        }),
        Category::Attic => sorted.sort_by(|lhs, rhs| {
            rhs.gross_sales
                .cmp(&lhs.gross_sales)
                .then_with(|| lhs.item_name.cmp(&rhs.item_name))
        }),
    }

    let mut columns = vec![
        DetailColumn {
            header: schema.item_number.display.clone(),
            style: ColumnStyle::Text,
        },
        DetailColumn {
            header: schema.item_name.display.clone(),
            style: ColumnStyle::Text,
        },
        DetailColumn {
            header: schema.description.display.clone(),
            style: ColumnStyle::Description,
        },
        DetailColumn {
            header: schema.visibility_tier.display.clone(),
            style: ColumnStyle::Text,
        },
    ];
    if let Some(date_column) = &schema.transaction_date {
        columns.push(DetailColumn {
            header: date_column.display.clone(),
            style: ColumnStyle::Date,
        });
    }
    columns.push(DetailColumn {
        header: schema.gross_sales.display.clone(),
        style: ColumnStyle::Monetary,
    });
    if category == Category::Basement {
        columns.push(DetailColumn {
            header: schema.opp_to_floor.display.clone(),
            style: ColumnStyle::Monetary,
        });
    }
    columns.push(DetailColumn {
        header: schema.opp_to_target.display.clone(),
        style: ColumnStyle::Monetary,
    });
    columns.push(DetailColumn {
        header: schema.margin.display.clone(),
        style: ColumnStyle::Margin,
    });

    let rows = sorted
        .iter()
        .map(|record| {
            let mut cells = vec![
                DetailCell::Text(record.item_number.clone()),
                DetailCell::Text(record.item_name.clone()),
                DetailCell::Text(record.description.clone()),
                DetailCell::Text(record.visibility_tier.clone()),
            ];
            if schema.transaction_date.is_some() {
                cells.push(match record.transaction_date {
                    Some(date) => DetailCell::Date(date),
                    None => DetailCell::Empty,
                });
            }
            cells.push(DetailCell::Integer(record.gross_sales));
            if category == Category::Basement {
                cells.push(DetailCell::Integer(record.opp_to_floor));
            }
            cells.push(DetailCell::Integer(record.opp_to_target));
            cells.push(DetailCell::Ratio(record.margin));
            cells
        })
        .collect();

    DetailTable { columns, rows }
}

/// Projects every record of a manager's team into the "All Data" sheet:
/// rep name and category up front, no email columns, ingest order kept.
pub fn all_data_detail(records: &[&Record], schema: &Schema) -> DetailTable {
    let mut columns = vec![
        DetailColumn {
            header: schema.rep_name.display.clone(),
            style: ColumnStyle::Text,
        },
        DetailColumn {
            header: schema.category.display.clone(),
            style: ColumnStyle::Text,
        },
        DetailColumn {
            header: schema.item_number.display.clone(),
            style: ColumnStyle::Text,
        },
        DetailColumn {
            header: schema.item_name.display.clone(),
            style: ColumnStyle::Text,
        },
        DetailColumn {
            header: schema.description.display.clone(),
            style: ColumnStyle::Description,
        },
        DetailColumn {
            header: schema.visibility_tier.display.clone(),
            style: ColumnStyle::Text,
        },
    ];
    if let Some(date_column) = &schema.transaction_date {
        columns.push(DetailColumn {
            header: date_column.display.clone(),
            style: ColumnStyle::Date,
        });
    }
    columns.extend([
        DetailColumn {
            header: schema.gross_sales.display.clone(),
            style: ColumnStyle::Monetary,
        },
        DetailColumn {
            header: schema.opp_to_floor.display.clone(),
            style: ColumnStyle::Monetary,
        },
        DetailColumn {
            header: schema.opp_to_target.display.clone(),
            style: ColumnStyle::Monetary,
        },
        DetailColumn {
            header: schema.margin.display.clone(),
            style: ColumnStyle::Margin,
        },
    ]);

    let rows = records
        .iter()
        .map(|record| {
            let mut cells = vec![
                DetailCell::Text(record.rep_name.clone()),
                DetailCell::Text(record.category.as_str().to_string()),
                DetailCell::Text(record.item_number.clone()),
                DetailCell::Text(record.item_name.clone()),
                DetailCell::Text(record.description.clone()),
                DetailCell::Text(record.visibility_tier.clone()),
            ];
            if schema.transaction_date.is_some() {
                cells.push(match record.transaction_date {
                    Some(date) => DetailCell::Date(date),
                    None => DetailCell::Empty,
                });
            }
            cells.push(DetailCell::Integer(record.gross_sales));
            cells.push(DetailCell::Integer(record.opp_to_floor));
            cells.push(DetailCell::Integer(record.opp_to_target));
            cells.push(DetailCell::Ratio(record.margin));
            cells
        })
        .collect();

    DetailTable { columns, rows }
}
