use crate::error::{ReportError, Result};

/// A logical field bound to a physical extract column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub index: usize,
    /// Header text used downstream for display (summary and detail sheets).
    pub display: String,
}

/// Explicit binding of every logical field the pipeline needs to the
/// physical columns of one extract.
///
/// Binding happens exactly once, at load time. Identity fields bind by
/// known header aliases; the monetary, opportunity, margin, and date
/// fields bind by case-insensitive substring on the header ("sales" /
/// "opp" / "margin" / "date"), skipping any header that also carries an
/// identity qualifier so a column like "Sales Rep Name" is never treated
/// as a measure. A failed binding reports every missing logical field at
/// once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub rep_email: ColumnRef,
    pub rep_name: ColumnRef,
    pub manager_email: ColumnRef,
    pub manager_name: ColumnRef,
    pub category: ColumnRef,
    pub item_number: ColumnRef,
    pub item_name: ColumnRef,
    pub description: ColumnRef,
    pub visibility_tier: ColumnRef,
    pub transaction_date: Option<ColumnRef>,
    pub gross_sales: ColumnRef,
    pub opp_to_floor: ColumnRef,
    pub opp_to_target: ColumnRef,
    pub margin: ColumnRef,
}

impl Schema {
    /// Binds the logical schema against the extract's header row.
    pub fn bind(headers: &[String]) -> Result<Self> {
        let mut missing: Vec<String> = Vec::new();

        let mut require = |field: &str, column: Option<ColumnRef>| {
            if column.is_none() {
                missing.push(field.to_string());
            }
            column
        };

        let rep_email = require(
            "rep email",
            find_alias(headers, &["sales rep email", "rep email"]),
        );
        let rep_name = require(
            "rep name",
            find_alias(headers, &["sales rep name", "rep name"]),
        );
        let manager_email = require("manager email", find_alias(headers, &["manager email"]));
        let manager_name = require("manager name", find_alias(headers, &["manager name"]));
        let category = require(
            "category",
            find_alias(headers, &["category", "region", "segment"]),
        );
        let item_number = require("item number", find_alias(headers, &["item #", "item number"]));
        let item_name = require("item name", find_alias(headers, &["item name"]));
        let description = require(
            "description",
            find_alias(headers, &["item description", "description"]),
        );
        let visibility_tier = require(
            "visibility tier",
            find_alias(headers, &["kvi type", "item visibility", "visibility"]),
        );

        let gross_sales = require("gross sales", find_measure(headers, "sales"));
        let opp_to_floor = require("opp to floor", find_opportunity(headers, "floor"));
        let opp_to_target = require("opp to target", find_opportunity(headers, "target"));
        let margin = require("margin", find_measure(headers, "margin"));

        if !missing.is_empty() {
            return Err(ReportError::Schema { missing });
        }

        Ok(Self {
            rep_email: rep_email.unwrap(),
            rep_name: rep_name.unwrap(),
            manager_email: manager_email.unwrap(),
            manager_name: manager_name.unwrap(),
            category: category.unwrap(),
            item_number: item_number.unwrap(),
            item_name: item_name.unwrap(),
            description: description.unwrap(),
            visibility_tier: visibility_tier.unwrap(),
            transaction_date: find_measure(headers, "date"),
            gross_sales: gross_sales.unwrap(),
            opp_to_floor: currency_display(opp_to_floor.unwrap()),
            opp_to_target: currency_display(opp_to_target.unwrap()),
            margin: margin.unwrap(),
        })
    }
}

/// True when a header names an identity field rather than a measure.
fn is_identity(header: &str) -> bool {
    let lower = header.to_ascii_lowercase();
    lower.contains("name") || lower.contains("email")
}

fn find_alias(headers: &[String], aliases: &[&str]) -> Option<ColumnRef> {
    headers.iter().enumerate().find_map(|(index, header)| {
        let lower = header.trim().to_ascii_lowercase();
        aliases.contains(&lower.as_str()).then(|| ColumnRef {
            index,
            display: header.trim().to_string(),
        })
    })
}

fn find_measure(headers: &[String], needle: &str) -> Option<ColumnRef> {
    headers.iter().enumerate().find_map(|(index, header)| {
        let lower = header.to_ascii_lowercase();
        (lower.contains(needle) && !is_identity(header)).then(|| ColumnRef {
            index,
            display: header.trim().to_string(),
        })
    })
}

fn find_opportunity(headers: &[String], qualifier: &str) -> Option<ColumnRef> {
    headers.iter().enumerate().find_map(|(index, header)| {
        let lower = header.to_ascii_lowercase();
        (lower.contains("opp") && lower.contains(qualifier) && !is_identity(header))
            .then(|| ColumnRef {
                index,
                display: header.trim().to_string(),
            })
    })
}

/// Opportunity columns are displayed with a currency marker downstream.
fn currency_display(mut column: ColumnRef) -> ColumnRef {
    if !column.display.starts_with('$') {
        column.display = format!("$ {}", column.display);
    }
    column
}
