use std::cmp::Reverse;
use std::collections::HashMap;

use crate::config::RunConfig;
use crate::model::{Category, Record, SummaryRow, SummaryTable, TOTAL_LABEL};
use crate::schema::Schema;

/// Which sub-entity a summary groups by: items under a representative,
/// representatives under a manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    ItemName,
    RepName,
}

impl GroupKey {
    pub fn header(self) -> &'static str {
        match self {
            GroupKey::ItemName => "Item Name",
            GroupKey::RepName => "Rep Name",
        }
    }

    fn of<'a>(self, record: &'a Record) -> &'a str {
        match self {
            GroupKey::ItemName => &record.item_name,
            GroupKey::RepName => &record.rep_name,
        }
    }
}

/// Builds the per-category rollup for one entity.
///
/// Rows are grouped by the sub-entity key, summing each monetary and
/// opportunity field and counting visible-tier rows and total rows. The
/// sort key differs by category on purpose: Basement orders by opp-to-floor
/// descending (biggest improvement potential first), Attic by gross sales
/// descending (biggest revenue exposure first); ties break on the group key
/// so output is deterministic. The synthetic `Total` row is computed from
/// the raw sums before any value is turned into a display string, and for
/// Attic the opp-to-floor column is dropped only after aggregation so the
/// other sums are unaffected.
pub fn summarize(
    records: &[&Record],
    category: Category,
    key: GroupKey,
    schema: &Schema,
    config: &RunConfig,
) -> SummaryTable {
    let value_headers = vec![
        schema.gross_sales.display.clone(),
        schema.opp_to_floor.display.clone(),
        schema.opp_to_target.display.clone(),
        "# Visible Items".to_string(),
        "# Rows".to_string(),
    ];

    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, SummaryRow> = HashMap::new();

    for record in records {
        debug_assert_eq!(record.category, category);
        let group = key.of(record);
        let row = groups.entry(group.to_string()).or_insert_with(|| {
            order.push(group.to_string());
            SummaryRow {
                key: group.to_string(),
                values: vec![0; 5],
            }
        });
        row.values[0] += record.gross_sales;
        row.values[1] += record.opp_to_floor;
        row.values[2] += record.opp_to_target;
        if config.visible_tiers.iter().any(|tier| tier == &record.visibility_tier) {
            row.values[3] += 1;
        }
        row.values[4] += 1;
    }

    let mut rows: Vec<SummaryRow> = order
        .into_iter()
        .map(|group| groups.remove(&group).expect("group collected above"))
        .collect();

    let sort_index = match category {
        Category::Basement => 1,
        Category::Attic => 0,
    };
    rows.sort_by(|lhs, rhs| {
        Reverse(lhs.values[sort_index])
            .cmp(&Reverse(rhs.values[sort_index]))
            .then_with(|| lhs.key.cmp(&rhs.key))
    });

    let mut total = SummaryRow {
        key: TOTAL_LABEL.to_string(),
        values: vec![0; 5],
    };
    for row in &rows {
        for (slot, value) in total.values.iter_mut().zip(&row.values) {
            *slot += value;
        }
    }

    let mut table = SummaryTable {
        category,
        key_header: key.header().to_string(),
        value_headers,
        rows,
        total,
    };

    // Opp-to-floor is not a meaningful metric for items already above the
    // peer margin.
    if category == Category::Attic {
        let header = schema.opp_to_floor.display.clone();
        table.drop_column(&header);
    }

    table
}
