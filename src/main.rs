use std::path::PathBuf;

use ab_report::config::RunConfig;
use ab_report::notify::OutboxNotifier;
use ab_report::orchestrate;
use ab_report::{ReportError, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging()?;
    match cli.command {
        Command::Run(args) => execute_run(args),
    }
}

fn execute_run(args: RunArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => RunConfig::from_file(path)?,
        None => RunConfig::default(),
    };
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(period) = args.period {
        config.period_label = Some(period);
    }
    if let Some(limit) = args.rep_limit {
        config.rep_limit = Some(limit);
    }

    let notifier = OutboxNotifier::new(config.output_dir.join("outbox"));
    let summary = orchestrate::run(&args.input, &config, &notifier)?;
    println!(
        "processed {} entities, skipped {}, failed {}",
        summary.processed, summary.skipped, summary.failed
    );
    Ok(())
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| ReportError::Logging(error.to_string()))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Generate Attic and Basement pricing reports from a sales extract."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full batch for every representative and manager.
    Run(RunArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Path to the tabular extract (.xlsx).
    #[arg(long)]
    input: PathBuf,

    /// Optional JSON run configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured output directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Override the reporting period label, e.g. "Aug 2026".
    #[arg(long)]
    period: Option<String>,

    /// Process only the first N representatives (staged rollout).
    #[arg(long)]
    rep_limit: Option<usize>,
}
