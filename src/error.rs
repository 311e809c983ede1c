use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ReportError>;

/// How far an error should propagate.
///
/// Fatal errors abort the run before any entity is processed; entity-scoped
/// errors are caught at the orchestrator boundary, logged, and the batch
/// moves on to the next entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Fatal,
    EntityScoped,
}

/// Error type covering the different failure cases that can occur when the
/// pipeline loads, classifies, aggregates, or renders the extract.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing of the run configuration fails.
    #[error("config error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when the extract cannot be located or holds no usable sheet.
    #[error("cannot load extract: {0}")]
    Load(String),

    /// Raised when required logical fields cannot be bound to extract columns.
    #[error("extract schema mismatch: unbound fields [{}]", missing.join(", "))]
    Schema { missing: Vec<String> },

    /// Raised when an entity has no records after cleaning.
    #[error("no records for {entity}")]
    NoData { entity: String },

    /// Raised when a formatting rule references a column absent from the
    /// table being rendered.
    #[error("sheet '{sheet}' has no column '{column}' required by a formatting rule")]
    Render { sheet: String, column: String },

    /// Surfaced from the notification collaborator.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}


impl ReportError {
    /// Classifies the error so callers can distinguish abort-the-run from
    /// skip-the-entity without inspecting message strings.
    pub fn severity(&self) -> Severity {
        match self {
            ReportError::NoData { .. }
            | ReportError::Render { .. }
            | ReportError::Transport(_)
            | ReportError::ExcelWrite(_) => Severity::EntityScoped,
            _ => Severity::Fatal,
        }
    }
}
