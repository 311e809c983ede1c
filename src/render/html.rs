use crate::model::{FormattedTable, SummaryTable};

/// Styling shared by every emailed summary table: first column
/// left-aligned, every other column right-aligned.
const TABLE_STYLE: &str = "\
<style>
    .summary-table { border-collapse: collapse; }
    .summary-table th, .summary-table td { text-align: right; padding: 5px; border: 1px solid #ddd; }
    .summary-table th:first-child, .summary-table td:first-child { text-align: left; }
    .summary-table th { background-color: #006400; color: white; }
</style>";

/// Renders a category rollup as an HTML fragment with a title.
///
/// Cells come from the same display projection the workbook summary values
/// reflect, so the two outputs always agree; this fragment is display-only
/// and never feeds back into any computation. The Total row is bold.
pub fn summary_fragment(summary: &SummaryTable) -> String {
    let title = format!("{} Summary", summary.category);
    if summary.is_empty() {
        return format!("<h3>{}</h3><p>No data available.</p>", escape(&title));
    }
    let table = summary.formatted();
    format!("<h3>{}</h3>\n{}\n{}", escape(&title), TABLE_STYLE, table_fragment(&table))
}

fn table_fragment(table: &FormattedTable) -> String {
    let mut html = String::from("<table class=\"summary-table\">\n<thead><tr>");
    for column in &table.columns {
        html.push_str(&format!("<th>{}</th>", escape(column)));
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for (index, row) in table.rows.iter().enumerate() {
        let is_total = table.has_total && index + 1 == table.rows.len();
        html.push_str("<tr>");
        for cell in row {
            if is_total {
                html.push_str(&format!(
                    "<td style=\"font-weight: bold;\">{}</td>",
                    escape(cell)
                ));
            } else {
                html.push_str(&format!("<td>{}</td>", escape(cell)));
            }
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>");
    html
}

/// Minimal HTML escaping for text interpolated into the fragment.
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
