use chrono::NaiveDate;

/// The two pricing categories a transactional line item can fall into.
///
/// "Attic" items sit above the expected peer margin (revenue exposure,
/// growth opportunity); "Basement" items sit below it (flagged for a price
/// increase).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Attic,
    Basement,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Attic => "Attic",
            Category::Basement => "Basement",
        }
    }

    /// Exact-match parse; anything else is outside the two known categories.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Attic" => Some(Category::Attic),
            "Basement" => Some(Category::Basement),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cleaned, normalized line item from the extract.
///
/// Monetary and opportunity values are integers (rounded half-to-even at
/// ingest), margin is a fraction rounded to three decimals. Records are
/// built once per run and never mutated afterwards; every later stage
/// produces new derived tables.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub rep_email: String,
    pub rep_name: String,
    pub manager_email: String,
    pub manager_name: String,
    pub category: Category,
    pub gross_sales: i64,
    pub opp_to_floor: i64,
    pub opp_to_target: i64,
    pub margin: f64,
    pub item_number: String,
    pub item_name: String,
    pub description: String,
    pub visibility_tier: String,
    pub transaction_date: Option<NaiveDate>,
}

/// Which kind of recipient an entity represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Representative,
    Manager,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Representative => "representative",
            EntityKind::Manager => "manager",
        }
    }
}

/// A report recipient: a sales representative or a manager, keyed by email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub kind: EntityKind,
    pub email: String,
    pub name: String,
}

impl Entity {
    /// Selects the records this entity owns (its own lines for a
    /// representative, the union of its reps' lines for a manager).
    pub fn records<'a>(&self, records: &'a [Record]) -> Vec<&'a Record> {
        records
            .iter()
            .filter(|record| match self.kind {
                EntityKind::Representative => record.rep_email == self.email,
                EntityKind::Manager => record.manager_email == self.email,
            })
            .collect()
    }
}

/// Label used for the synthetic totals row of a summary table.
pub const TOTAL_LABEL: &str = "Total";

/// One aggregated row of a [`SummaryTable`], keyed by sub-entity.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub key: String,
    pub values: Vec<i64>,
}

/// Per-category rollup for one entity: one row per sub-entity plus a
/// synthetic `Total` row whose values are the column-wise raw sums of the
/// non-total rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    pub category: Category,
    /// Header of the grouping column ("Item Name" or "Rep Name").
    pub key_header: String,
    pub value_headers: Vec<String>,
    pub rows: Vec<SummaryRow>,
    pub total: SummaryRow,
}

impl SummaryTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Removes one value column from headers, rows, and the total row.
    /// Dropping happens after aggregation so remaining sums are unaffected.
    pub fn drop_column(&mut self, header: &str) {
        let Some(index) = self.value_headers.iter().position(|h| h == header) else {
            return;
        };
        self.value_headers.remove(index);
        for row in &mut self.rows {
            row.values.remove(index);
        }
        self.total.values.remove(index);
    }

    /// Projects the raw rollup into display strings. The HTML fragment
    /// renders exactly this projection, and the workbook's number-formatted
    /// cells come from the same raw sums, so the two outputs always agree.
    pub fn formatted(&self) -> FormattedTable {
        let mut columns = Vec::with_capacity(self.value_headers.len() + 1);
        columns.push(self.key_header.clone());
        columns.extend(self.value_headers.iter().cloned());

        let mut rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| format_summary_row(row))
            .collect();
        rows.push(format_summary_row(&self.total));

        FormattedTable {
            title: format!("{} Summary", self.category),
            columns,
            rows,
            has_total: true,
        }
    }
}

fn format_summary_row(row: &SummaryRow) -> Vec<String> {
    let mut cells = Vec::with_capacity(row.values.len() + 1);
    cells.push(row.key.clone());
    cells.extend(row.values.iter().map(|value| group_thousands(*value)));
    cells
}

/// Display projection of a summary table: every cell already a string, the
/// last row being the totals row when `has_total` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedTable {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub has_total: bool,
}

/// Formats an integer with thousands separators and no decimals.
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (offset, ch) in digits.chars().enumerate() {
        if offset > 0 && (digits.len() - offset) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Formats a margin fraction as a percentage with one decimal place.
pub fn format_margin(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}
