use std::path::PathBuf;
use thiserror::Error;

/// Broad class of a failure, used by callers that only care whether the
/// problem is local input, the run lookup, or the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Precondition,
    Remote,
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Result file not found: {0}")]
    ResultFileNotFound(PathBuf),

    #[error("Result directory not found: {0}")]
    ResultDirNotFound(PathBuf),

    #[error("Malformed result file {path}: {reason}")]
    MalformedResult { path: PathBuf, reason: String },

    #[error("No task results to upload")]
    NoResults,

    #[error("Unknown task: {0} has no canonical metric")]
    UnknownTask(String),

    #[error("Task {task}: variant {variant} has no metric {metric}")]
    MissingMetric {
        task: String,
        variant: String,
        metric: String,
    },

    #[error("Task {0} has no metric variants")]
    NoVariants(String),

    #[error("Column {column} is not in the table (columns: {available:?})")]
    UnknownColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("Column already exists: {0}")]
    DuplicateColumn(String),

    #[error("Table is missing required column: {0}")]
    MissingColumn(String),

    #[error("Malformed table: {0}")]
    MalformedTable(String),

    #[error("Directory to upload does not exist: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Run lookup for {filter} matched {count} runs, expected exactly 1")]
    RunLookup { filter: String, count: usize },

    #[error("Remote store error: {0}")]
    Remote(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::RunLookup { .. } => ErrorKind::Precondition,
            CoreError::Remote(_) => ErrorKind::Remote,
            _ => ErrorKind::Configuration,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(err: validator::ValidationErrors) -> Self {
        CoreError::Validation(err.to_string())
    }
}
