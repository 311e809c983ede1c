use crate::model::group_thousands;
use crate::render::html::escape;

/// Headline numbers quoted in a representative's message body.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepMetrics {
    pub basement_count: usize,
    pub attic_count: usize,
    pub basement_sales: i64,
    pub attic_sales: i64,
    pub opp_to_floor: i64,
}

/// Builds the HTML body sent to a sales representative alongside the
/// workbook attachment.
pub fn rep_body(
    name: &str,
    period: &str,
    dashboard_link: &str,
    metrics: &RepMetrics,
    basement_html: &str,
    attic_html: &str,
) -> String {
    format!(
        r#"<div style="text-align: left;">
<p>Hi {name},</p>
<p>Attached is the Attic and Basement Report for {period}.</p>
<p>This month you have {basement_count} action items in 'Basement' corresponding to ${basement_sales} of gross sales and {attic_count} action items in 'Attic' corresponding to ${attic_sales} of gross sales.</p>
<p>Raising the items in Basement to the recommended margin will result in ${opp_to_floor} of profit gain.</p>
{basement_html}
<br>
{attic_html}
<p>Access the live dashboard: <a href="{link}">Attic and Basement Report</a></p>
<p>Thanks,<br>Pricing Team</p>
</div>"#,
        name = escape(name),
        period = escape(period),
        basement_count = metrics.basement_count,
        basement_sales = group_thousands(metrics.basement_sales),
        attic_count = metrics.attic_count,
        attic_sales = group_thousands(metrics.attic_sales),
        opp_to_floor = group_thousands(metrics.opp_to_floor),
        basement_html = basement_html,
        attic_html = attic_html,
        link = dashboard_link,
    )
}

/// Builds the HTML body sent to a manager, summarising the team's two
/// categories.
pub fn manager_body(
    name: &str,
    period: &str,
    dashboard_link: &str,
    basement_html: &str,
    attic_html: &str,
) -> String {
    format!(
        r#"<div style="text-align: left;">
<p>Hi {name},</p>
<p>Attached is your {period} Manager Report. Key metrics for your team:</p>
{basement_html}
<br>
{attic_html}
<p>Access the live dashboard: <a href="{link}">Manager Dashboard</a></p>
<p>Best regards,<br>Pricing Team</p>
</div>"#,
        name = escape(name),
        period = escape(period),
        basement_html = basement_html,
        attic_html = attic_html,
        link = dashboard_link,
    )
}
