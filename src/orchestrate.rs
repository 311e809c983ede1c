use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info, instrument};

use crate::aggregate::{self, GroupKey};
use crate::compose::{self, RepMetrics};
use crate::config::RunConfig;
use crate::error::{ReportError, Result, Severity};
use crate::ingest;
use crate::io::excel_read;
use crate::io::excel_write::{self, Sheet};
use crate::model::{Category, Entity, EntityKind, Record, SummaryTable};
use crate::notify::{Notifier, sanitize_file_stem};
use crate::partition;
use crate::render::{self, html};
use crate::resolve::{self, Selection};
use crate::schema::Schema;

/// Outcome counts for one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Runs the full batch: load, bind, clean, then one report per resolved
/// representative and manager.
///
/// Load and schema failures abort before any entity is touched. Everything
/// after that is entity-scoped: a failing entity is logged with its
/// identity and cause and the batch moves on, so one bad entity can never
/// abort the remainder.
#[instrument(level = "info", skip_all, fields(input = %input.display()))]
pub fn run(input: &Path, config: &RunConfig, notifier: &dyn Notifier) -> Result<RunSummary> {
    let grid = excel_read::read_grid(input)?;
    let schema = Schema::bind(&grid.headers)?;
    let records = ingest::build_records(&grid, &schema, config)?;
    info!(records = records.len(), "extract loaded and cleaned");

    fs::create_dir_all(&config.output_dir)?;
    let period = config.period();

    let reps = resolve::resolve(
        &records,
        EntityKind::Representative,
        Selection {
            limit: config.rep_limit,
            range: None,
        },
    );
    let managers = resolve::resolve(
        &records,
        EntityKind::Manager,
        Selection {
            limit: None,
            range: config.manager_range,
        },
    );
    let entities: Vec<Entity> = reps.into_iter().chain(managers).collect();

    run_for_entities(&entities, &records, &schema, config, &period, notifier)
}

/// Processes an explicit entity list against an already cleaned record
/// set: the per-entity loop behind [`run`], exposed so callers can drive
/// their own entity selection. Entity-scoped failures (no records, render,
/// transport) are logged and counted; only fatal errors propagate.
#[instrument(level = "info", skip_all, fields(entities = entities.len()))]
pub fn run_for_entities(
    entities: &[Entity],
    records: &[Record],
    schema: &Schema,
    config: &RunConfig,
    period: &str,
    notifier: &dyn Notifier,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();
    for entity in entities {
        if config.is_denied(&entity.name, &entity.email) {
            info!(entity = %entity.name, "denylisted, skipping");
            summary.skipped += 1;
            continue;
        }
        match process_entity(entity, records, schema, config, period, notifier) {
            Ok(()) => summary.processed += 1,
            Err(err) if err.severity() == Severity::EntityScoped => {
                error!(entity = %entity.name, kind = entity.kind.as_str(), %err, "entity failed, continuing");
                summary.failed += 1;
            }
            Err(err) => return Err(err),
        }
    }

    info!(
        processed = summary.processed,
        skipped = summary.skipped,
        failed = summary.failed,
        "run complete"
    );
    Ok(summary)
}

#[instrument(level = "debug", skip_all, fields(entity = %entity.name, kind = entity.kind.as_str()))]
fn process_entity(
    entity: &Entity,
    records: &[Record],
    schema: &Schema,
    config: &RunConfig,
    period: &str,
    notifier: &dyn Notifier,
) -> Result<()> {
    let owned = entity.records(records);
    if owned.is_empty() {
        return Err(ReportError::NoData {
            entity: entity.name.clone(),
        });
    }

    let split = partition::partition(&owned);
    let key = match entity.kind {
        EntityKind::Representative => GroupKey::ItemName,
        EntityKind::Manager => GroupKey::RepName,
    };
    let basement = aggregate::summarize(&split.basement, Category::Basement, key, schema, config);
    let attic = aggregate::summarize(&split.attic, Category::Attic, key, schema, config);

    let artifact = match entity.kind {
        EntityKind::Representative => {
            write_rep_artifact(entity, &split.basement, &split.attic, schema, config)?
        }
        EntityKind::Manager => write_manager_artifact(
            entity, &owned, &basement, &attic, schema, config, period,
        )?,
    };

    let basement_html = html::summary_fragment(&basement);
    let attic_html = html::summary_fragment(&attic);
    let (subject, body) = match entity.kind {
        EntityKind::Representative => {
            let metrics = RepMetrics {
                basement_count: split.basement.len(),
                attic_count: split.attic.len(),
                basement_sales: split.basement.iter().map(|r| r.gross_sales).sum(),
                attic_sales: split.attic.iter().map(|r| r.gross_sales).sum(),
                opp_to_floor: split.basement.iter().map(|r| r.opp_to_floor).sum(),
            };
            (
                format!("{}: Attic and Basement Report {period}", entity.name),
                compose::rep_body(
                    &entity.name,
                    period,
                    &config.dashboard_link,
                    &metrics,
                    &basement_html,
                    &attic_html,
                ),
            )
        }
        EntityKind::Manager => (
            format!("{}: Manager Report {period}", entity.name),
            compose::manager_body(
                &entity.name,
                period,
                &config.dashboard_link,
                &basement_html,
                &attic_html,
            ),
        ),
    };

    notifier.send(&entity.email, &subject, &body, &artifact)?;
    info!(artifact = %artifact.display(), "report delivered");
    Ok(())
}

fn write_rep_artifact(
    entity: &Entity,
    basement: &[&Record],
    attic: &[&Record],
    schema: &Schema,
    config: &RunConfig,
) -> Result<PathBuf> {
    let basement_detail = render::category_detail(basement, Category::Basement, schema);
    let attic_detail = render::category_detail(attic, Category::Attic, schema);

    let path = config
        .output_dir
        .join(format!("{}_Report.xlsx", sanitize_file_stem(&entity.name)));
    excel_write::write_workbook(
        &path,
        &[
            Sheet::Detail {
                name: Category::Basement.as_str().to_string(),
                table: &basement_detail,
            },
            Sheet::Detail {
                name: Category::Attic.as_str().to_string(),
                table: &attic_detail,
            },
        ],
    )?;
    Ok(path)
}

#[allow(clippy::too_many_arguments)]
fn write_manager_artifact(
    entity: &Entity,
    owned: &[&Record],
    basement: &SummaryTable,
    attic: &SummaryTable,
    schema: &Schema,
    config: &RunConfig,
    period: &str,
) -> Result<PathBuf> {
    let all_data = render::all_data_detail(owned, schema);

    let path = config.output_dir.join(format!(
        "{}_Manager_Report_{}.xlsx",
        sanitize_file_stem(&entity.name),
        sanitize_file_stem(period),
    ));
    excel_write::write_workbook(
        &path,
        &[
            Sheet::Summary {
                name: "Basement Summary".to_string(),
                table: basement,
                numeric_columns: basement.value_headers.clone(),
            },
            Sheet::Summary {
                name: "Attic Summary".to_string(),
                table: attic,
                numeric_columns: attic.value_headers.clone(),
            },
            Sheet::Detail {
                name: "All Data".to_string(),
                table: &all_data,
            },
        ],
    )?;
    Ok(path)
}
