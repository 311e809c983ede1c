use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{ReportError, Result};

/// Narrow interface to the message transport. The pipeline only composes;
/// delivery is a collaborator concern.
pub trait Notifier {
    fn send(&self, to: &str, subject: &str, html_body: &str, attachment: &Path) -> Result<()>;
}

/// Notifier that drops each composed message into an outbox directory
/// instead of talking to a mail relay, keeping runs fully offline. A
/// delivery agent (or a human) picks the files up from there.
#[derive(Debug, Clone)]
pub struct OutboxNotifier {
    outbox_dir: PathBuf,
}

impl OutboxNotifier {
    pub fn new(outbox_dir: impl Into<PathBuf>) -> Self {
        Self {
            outbox_dir: outbox_dir.into(),
        }
    }
}

impl Notifier for OutboxNotifier {
    fn send(&self, to: &str, subject: &str, html_body: &str, attachment: &Path) -> Result<()> {
        fs::create_dir_all(&self.outbox_dir)
            .map_err(|error| ReportError::Transport(error.to_string()))?;

        let message = format!(
            "<!-- To: {to} -->\n<!-- Subject: {subject} -->\n<!-- Attachment: {} -->\n{html_body}\n",
            attachment.display()
        );
        let file_name = format!("{}.html", sanitize_file_stem(to));
        let path = self.outbox_dir.join(file_name);
        fs::write(&path, message).map_err(|error| ReportError::Transport(error.to_string()))?;
        info!(to, subject, path = %path.display(), "message staged in outbox");
        Ok(())
    }
}

/// Replaces path-hostile characters so recipient addresses and entity names
/// are safe as file name stems.
pub fn sanitize_file_stem(raw: &str) -> String {
    let invalid = [':', '\\', '/', '?', '*', '[', ']', '\'', '"', '<', '>', '|'];
    let mut sanitized: String = raw
        .chars()
        .map(|ch| {
            if invalid.contains(&ch) || ch.is_control() {
                '_'
            } else {
                ch
            }
        })
        .collect();

    sanitized = sanitized.trim().to_string();
    if sanitized.is_empty() {
        sanitized = "message".to_string();
    }
    sanitized
}
