use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

/// Run configuration, constructed once at startup and passed by reference
/// into each component. No component reads process-wide state directly.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Directory the workbook artifacts are written into (created if absent).
    pub output_dir: PathBuf,
    /// Reporting period label used in artifact names and message subjects,
    /// e.g. "Aug 2026". Defaults to the current month.
    pub period_label: Option<String>,
    /// Link injected verbatim into the HTML body.
    pub dashboard_link: String,
    /// Entities whose name or email matches an entry (case-insensitive) are
    /// skipped entirely.
    pub denylist: Vec<String>,
    /// Segment value marking aggregate market-level rows that must be
    /// removed during cleaning.
    pub excluded_segment: String,
    /// Visibility tiers counted as "visible items" in the rollups.
    pub visible_tiers: Vec<String>,
    /// Process only the first N distinct representatives (staged rollout).
    pub rep_limit: Option<usize>,
    /// Process only the distinct managers in `[start, end)` (staged rollout).
    pub manager_range: Option<(usize, usize)>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("filtered_reports"),
            period_label: None,
            dashboard_link: String::new(),
            denylist: Vec::new(),
            excluded_segment: "Market".to_string(),
            visible_tiers: vec!["2: KVI".to_string(), "3: Super KVI".to_string()],
            rep_limit: None,
            manager_range: None,
        }
    }
}

impl RunConfig {
    /// Loads the configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&source)?)
    }

    /// The effective period label: the configured one, or the current month
    /// formatted like "Aug 2026".
    pub fn period(&self) -> String {
        self.period_label
            .clone()
            .unwrap_or_else(|| chrono::Local::now().format("%b %Y").to_string())
    }

    /// Case-insensitive denylist check against an entity's name and email.
    pub fn is_denied(&self, name: &str, email: &str) -> bool {
        self.denylist.iter().any(|entry| {
            entry.eq_ignore_ascii_case(name) || entry.eq_ignore_ascii_case(email)
        })
    }
}
