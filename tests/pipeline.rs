use std::fs;
use std::path::{Path, PathBuf};

use ab_report::config::RunConfig;
use ab_report::error::{ReportError, Severity};
use ab_report::ingest;
use ab_report::io::excel_read;
use ab_report::model::EntityKind;
use ab_report::notify::{Notifier, OutboxNotifier};
use ab_report::orchestrate;
use ab_report::partition;
use ab_report::resolve::{self, Selection};
use ab_report::schema::Schema;
use rust_xlsxwriter::Workbook;
use tempfile::tempdir;

const HEADERS: [&str; 14] = [
    "Sales Rep Email",
    "Sales Rep Name",
    "Manager Email",
    "Manager Name",
    "Category",
    "Item #",
    "Item Name",
    "Item Description",
    "KVI Type",
    "Transaction Date",
    "Gross Sales (TTM)",
    "Opp to Floor",
    "Opp to Target",
    "Margin %",
];

#[derive(Clone)]
struct ExtractRow {
    rep_email: &'static str,
    rep_name: &'static str,
    manager_email: &'static str,
    manager_name: &'static str,
    category: &'static str,
    item_number: f64,
    item_name: &'static str,
    gross_sales: f64,
    opp_to_floor: f64,
    opp_to_target: f64,
    margin: f64,
    visibility: &'static str,
}

impl Default for ExtractRow {
    fn default() -> Self {
        Self {
            rep_email: "alice@example.com",
            rep_name: "Alice Reed",
            manager_email: "pat@example.com",
            manager_name: "Pat Quinn",
            category: "Basement",
            item_number: 1001.0,
            item_name: "Anvil",
            gross_sales: 100.0,
            opp_to_floor: 50.0,
            opp_to_target: 25.0,
            margin: 0.12345,
            visibility: "2: KVI",
        }
    }
}

fn write_extract(path: &Path, rows: &[ExtractRow]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (col, header) in HEADERS.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .expect("header written");
    }
    for (index, row) in rows.iter().enumerate() {
        let r = (index + 1) as u32;
        worksheet.write_string(r, 0, row.rep_email).expect("cell");
        worksheet.write_string(r, 1, row.rep_name).expect("cell");
        worksheet
            .write_string(r, 2, row.manager_email)
            .expect("cell");
        worksheet
            .write_string(r, 3, row.manager_name)
            .expect("cell");
        worksheet.write_string(r, 4, row.category).expect("cell");
        worksheet.write_number(r, 5, row.item_number).expect("cell");
        worksheet.write_string(r, 6, row.item_name).expect("cell");
        worksheet
            .write_string(r, 7, "A durable industrial item")
            .expect("cell");
        worksheet.write_string(r, 8, row.visibility).expect("cell");
        worksheet.write_string(r, 9, "2026-08-01").expect("cell");
        worksheet.write_number(r, 10, row.gross_sales).expect("cell");
        worksheet
            .write_number(r, 11, row.opp_to_floor)
            .expect("cell");
        worksheet
            .write_number(r, 12, row.opp_to_target)
            .expect("cell");
        worksheet.write_number(r, 13, row.margin).expect("cell");
    }
    workbook.save(path).expect("extract saved");
}

/// The batch fixture: manager Pat Quinn with reps Alice (Basement), Bob
/// (Attic), and Cara (one good Basement row, one row missing the manager
/// email), plus denylisted manager Morgan Vale with rep Dana, an excluded
/// market-level row, and a row with an unknown category.
fn fixture_rows() -> Vec<ExtractRow> {
    vec![
        ExtractRow::default(),
        ExtractRow {
            item_number: 1002.0,
            item_name: "Bolt",
            gross_sales: 200.0,
            opp_to_floor: 10.0,
            opp_to_target: 5.0,
            ..ExtractRow::default()
        },
        ExtractRow {
            rep_email: "bob@example.com",
            rep_name: "Bob Stone",
            category: "Attic",
            item_number: 2001.0,
            item_name: "Cog",
            gross_sales: 1234.6,
            opp_to_floor: 3.0,
            opp_to_target: 2.0,
            visibility: "1: Non KVI",
            ..ExtractRow::default()
        },
        ExtractRow {
            rep_email: "bob@example.com",
            rep_name: "Bob Stone",
            category: "Attic",
            item_number: 2002.0,
            item_name: "Drum",
            gross_sales: 100.0,
            opp_to_floor: 7.0,
            opp_to_target: 4.0,
            ..ExtractRow::default()
        },
        ExtractRow {
            rep_email: "cara@example.com",
            rep_name: "Cara Lane",
            item_number: 3001.0,
            item_name: "Gasket",
            gross_sales: 70.0,
            opp_to_floor: 5.0,
            opp_to_target: 3.0,
            ..ExtractRow::default()
        },
        // Missing manager email: dropped during cleaning (Cara keeps 1 row).
        ExtractRow {
            rep_email: "cara@example.com",
            rep_name: "Cara Lane",
            manager_email: "",
            item_number: 3002.0,
            item_name: "Hinge",
            ..ExtractRow::default()
        },
        ExtractRow {
            rep_email: "dana@example.com",
            rep_name: "Dana Frost",
            manager_email: "morgan@example.com",
            manager_name: "Morgan Vale",
            category: "Attic",
            item_number: 4001.0,
            item_name: "Ingot",
            gross_sales: 500.0,
            ..ExtractRow::default()
        },
        // Aggregate market-level row: removed by the excluded segment rule.
        ExtractRow {
            category: "Market",
            item_number: 9001.0,
            item_name: "Market Rollup",
            ..ExtractRow::default()
        },
        // Outside the two known categories: dropped with a trace.
        ExtractRow {
            category: "Mezzanine",
            item_number: 9002.0,
            item_name: "Oddity",
            ..ExtractRow::default()
        },
    ]
}

fn test_config(output_dir: PathBuf) -> RunConfig {
    let mut config = RunConfig::default();
    config.output_dir = output_dir;
    config.period_label = Some("Aug 2026".to_string());
    config.dashboard_link = "https://dashboards.example.com/ab".to_string();
    config.denylist = vec!["morgan vale".to_string()];
    config
}

#[test]
fn full_run_produces_artifacts_and_messages() {
    let temp_dir = tempdir().expect("temporary directory");
    let extract = temp_dir.path().join("extract.xlsx");
    write_extract(&extract, &fixture_rows());

    let output_dir = temp_dir.path().join("reports");
    let config = test_config(output_dir.clone());
    let notifier = OutboxNotifier::new(output_dir.join("outbox"));

    let summary = orchestrate::run(&extract, &config, &notifier).expect("batch run");

    // 4 reps + manager Pat processed; manager Morgan denylisted.
    assert_eq!(summary.processed, 5);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 0);

    assert!(output_dir.join("Alice Reed_Report.xlsx").exists());
    assert!(output_dir.join("Bob Stone_Report.xlsx").exists());
    assert!(output_dir.join("Cara Lane_Report.xlsx").exists());
    assert!(
        output_dir
            .join("Pat Quinn_Manager_Report_Aug 2026.xlsx")
            .exists()
    );
    // Scenario C: no artifact at all for the denylisted manager.
    assert!(
        !output_dir
            .join("Morgan Vale_Manager_Report_Aug 2026.xlsx")
            .exists()
    );

    let bob_message =
        fs::read_to_string(output_dir.join("outbox/bob@example.com.html")).expect("bob message");
    // 1234.6 rounds to 1,235 in the rendered summary.
    assert!(bob_message.contains("1,235"));
    // Attic summary total: 1,235 + 100.
    assert!(bob_message.contains("1,335"));
    // Scenario D: Attic summaries carry no opp-to-floor column.
    assert!(!bob_message.contains("$ Opp to Floor"));

    let alice_message = fs::read_to_string(output_dir.join("outbox/alice@example.com.html"))
        .expect("alice message");
    assert!(alice_message.contains("Basement Summary"));
    assert!(alice_message.contains("$ Opp to Floor"));
    assert!(alice_message.contains("font-weight: bold;"));
    assert!(alice_message.contains("https://dashboards.example.com/ab"));

    // Scenario A: cleaning dropped exactly one of Pat's six team rows, so
    // the manager rollups cover 5 rows (3 Basement + 2 Attic).
    let pat_message =
        fs::read_to_string(output_dir.join("outbox/pat@example.com.html")).expect("pat message");
    assert!(pat_message.contains("Basement Summary"));
    assert!(pat_message.contains("Attic Summary"));
    assert!(pat_message.contains("Cara Lane"));
}

#[test]
fn manager_rollup_counts_surviving_rows() {
    let temp_dir = tempdir().expect("temporary directory");
    let extract = temp_dir.path().join("extract.xlsx");
    write_extract(&extract, &fixture_rows());

    let config = test_config(temp_dir.path().join("reports"));
    let grid = excel_read::read_grid(&extract).expect("grid read");
    let schema = Schema::bind(&grid.headers).expect("schema bound");
    let records = ingest::build_records(&grid, &schema, &config).expect("records built");

    // 9 raw rows minus: 1 missing manager email, 1 market row, 1 unknown
    // category.
    assert_eq!(records.len(), 6);

    let managers = resolve::resolve(&records, EntityKind::Manager, Selection::default());
    let pat = managers
        .iter()
        .find(|manager| manager.name == "Pat Quinn")
        .expect("Pat resolved");
    let owned = pat.records(&records);
    assert_eq!(owned.len(), 5);

    let split = partition::partition(&owned);
    assert_eq!(split.basement.len() + split.attic.len(), owned.len());
    assert_eq!(split.basement.len(), 3);
    assert_eq!(split.attic.len(), 2);

    let basement = ab_report::aggregate::summarize(
        &split.basement,
        ab_report::model::Category::Basement,
        ab_report::aggregate::GroupKey::RepName,
        &schema,
        &config,
    );
    // "# Rows" is the last value column.
    let rows_index = basement.value_headers.len() - 1;
    assert_eq!(basement.total.values[rows_index], 3);
    // Sorted by opp-to-floor descending: Alice (60) before Cara (5).
    assert_eq!(basement.rows[0].key, "Alice Reed");
    assert_eq!(basement.rows[1].key, "Cara Lane");
}

struct FlakyNotifier {
    fail_for: String,
    inner: OutboxNotifier,
}

impl Notifier for FlakyNotifier {
    fn send(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        attachment: &Path,
    ) -> ab_report::Result<()> {
        if to == self.fail_for {
            return Err(ReportError::Transport("relay refused connection".into()));
        }
        self.inner.send(to, subject, html_body, attachment)
    }
}

#[test]
fn one_failing_entity_does_not_abort_the_batch() {
    let temp_dir = tempdir().expect("temporary directory");
    let extract = temp_dir.path().join("extract.xlsx");
    write_extract(&extract, &fixture_rows());

    let output_dir = temp_dir.path().join("reports");
    let config = test_config(output_dir.clone());
    let notifier = FlakyNotifier {
        fail_for: "alice@example.com".to_string(),
        inner: OutboxNotifier::new(output_dir.join("outbox")),
    };

    let summary = orchestrate::run(&extract, &config, &notifier).expect("batch run");
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.processed, 4);
    // Later entities still delivered.
    assert!(output_dir.join("outbox/pat@example.com.html").exists());
}

#[test]
fn zero_record_entity_fails_alone_and_batch_continues() {
    use ab_report::model::Entity;

    let temp_dir = tempdir().expect("temporary directory");
    let extract = temp_dir.path().join("extract.xlsx");
    write_extract(&extract, &fixture_rows());

    let output_dir = temp_dir.path().join("reports");
    let config = test_config(output_dir.clone());
    let notifier = OutboxNotifier::new(output_dir.join("outbox"));

    let grid = excel_read::read_grid(&extract).expect("grid read");
    let schema = Schema::bind(&grid.headers).expect("schema bound");
    let records = ingest::build_records(&grid, &schema, &config).expect("records built");

    let mut entities =
        resolve::resolve(&records, EntityKind::Representative, Selection::default());
    // A recipient that owns no cleaned records at all.
    entities.push(Entity {
        kind: EntityKind::Representative,
        email: "glen@example.com".to_string(),
        name: "Glen Hale".to_string(),
    });

    fs::create_dir_all(&output_dir).expect("output dir");
    let summary =
        orchestrate::run_for_entities(&entities, &records, &schema, &config, "Aug 2026", &notifier)
            .expect("batch run");

    // Alice, Bob, Cara, and Dana go through; Glen is counted as failed
    // without aborting anyone else.
    assert_eq!(summary.processed, 4);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.skipped, 0);
    assert!(!output_dir.join("Glen Hale_Report.xlsx").exists());
    assert!(!output_dir.join("outbox/glen@example.com.html").exists());
    assert!(output_dir.join("Dana Frost_Report.xlsx").exists());
}

#[test]
fn missing_columns_abort_before_any_entity() {
    let temp_dir = tempdir().expect("temporary directory");
    let extract = temp_dir.path().join("extract.xlsx");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "Category").expect("header");
    worksheet.write_string(0, 1, "Item Name").expect("header");
    worksheet.write_string(1, 0, "Basement").expect("cell");
    worksheet.write_string(1, 1, "Anvil").expect("cell");
    workbook.save(&extract).expect("extract saved");

    let output_dir = temp_dir.path().join("reports");
    let config = test_config(output_dir.clone());
    let notifier = OutboxNotifier::new(output_dir.join("outbox"));

    let error = orchestrate::run(&extract, &config, &notifier).expect_err("run must fail");
    assert_eq!(error.severity(), Severity::Fatal);
    match error {
        ReportError::Schema { missing } => {
            assert!(missing.contains(&"rep email".to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!output_dir.exists() || fs::read_dir(&output_dir).expect("read dir").next().is_none());
}

#[test]
fn missing_extract_is_a_load_error() {
    let temp_dir = tempdir().expect("temporary directory");
    let config = test_config(temp_dir.path().join("reports"));
    let notifier = OutboxNotifier::new(temp_dir.path().join("outbox"));

    let error = orchestrate::run(&temp_dir.path().join("absent.xlsx"), &config, &notifier)
        .expect_err("run must fail");
    assert_eq!(error.severity(), Severity::Fatal);
    assert!(matches!(error, ReportError::Load(_)));
}

#[test]
fn repeated_runs_render_identical_bodies() {
    let temp_dir = tempdir().expect("temporary directory");
    let extract = temp_dir.path().join("extract.xlsx");
    write_extract(&extract, &fixture_rows());

    let mut bodies = Vec::new();
    for run in 0..2 {
        let output_dir = temp_dir.path().join(format!("reports{run}"));
        let config = test_config(output_dir.clone());
        let notifier = OutboxNotifier::new(output_dir.join("outbox"));
        orchestrate::run(&extract, &config, &notifier).expect("batch run");

        let message = fs::read_to_string(output_dir.join("outbox/pat@example.com.html"))
            .expect("pat message");
        // The attachment path embeds the per-run output directory; the
        // rendered body itself must not vary.
        let body: String = message
            .lines()
            .filter(|line| !line.starts_with("<!-- Attachment:"))
            .collect::<Vec<_>>()
            .join("\n");
        bodies.push(body);
    }
    assert_eq!(bodies[0], bodies[1]);
}

#[test]
fn formatting_rule_against_absent_column_is_a_render_error() {
    use ab_report::io::excel_write::{self, Sheet};
    use ab_report::model::{Category, SummaryRow, SummaryTable, TOTAL_LABEL};

    let table = SummaryTable {
        category: Category::Attic,
        key_header: "Item Name".to_string(),
        value_headers: vec!["Gross Sales (TTM)".to_string()],
        rows: vec![SummaryRow {
            key: "Cog".to_string(),
            values: vec![900],
        }],
        total: SummaryRow {
            key: TOTAL_LABEL.to_string(),
            values: vec![900],
        },
    };

    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("report.xlsx");
    let error = excel_write::write_workbook(
        &path,
        &[Sheet::Summary {
            name: "Attic Summary".to_string(),
            table: &table,
            numeric_columns: vec!["$ Opp to Floor".to_string()],
        }],
    )
    .expect_err("rule must not bind");

    assert_eq!(error.severity(), Severity::EntityScoped);
    match error {
        ReportError::Render { sheet, column } => {
            assert_eq!(sheet, "Attic Summary");
            assert_eq!(column, "$ Opp to Floor");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn empty_summary_sheet_stays_header_only() {
    use ab_report::io::excel_write::{self, Sheet};
    use ab_report::model::{Category, SummaryRow, SummaryTable, TOTAL_LABEL};

    let table = SummaryTable {
        category: Category::Basement,
        key_header: "Item Name".to_string(),
        value_headers: vec!["Gross Sales (TTM)".to_string()],
        rows: Vec::new(),
        total: SummaryRow {
            key: TOTAL_LABEL.to_string(),
            values: vec![0],
        },
    };

    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("report.xlsx");
    excel_write::write_workbook(
        &path,
        &[Sheet::Summary {
            name: "Basement Summary".to_string(),
            table: &table,
            numeric_columns: vec!["Gross Sales (TTM)".to_string()],
        }],
    )
    .expect("workbook written");

    // No zeros "Total" row in the workbook when the rendered body shows the
    // "No data available." placeholder.
    let grid = excel_read::read_grid(&path).expect("grid read");
    assert_eq!(grid.headers, ["Item Name", "Gross Sales (TTM)"]);
    assert!(grid.rows.is_empty());
}
