use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid record at line {line}: {message}")]
    InvalidRecord { line: u64, message: String },

    #[error("Invalid date bound: '{value}' is not a number")]
    InvalidBound { value: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Settings error: {0}")]
    Settings(#[from] ::config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required data: {0}")]
    MissingData(String),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ProcessingError {
    pub fn invalid_record(line: u64, message: impl Into<String>) -> Self {
        ProcessingError::InvalidRecord {
            line,
            message: message.into(),
        }
    }

    /// True for malformed input values, whether from a data row or a query bound
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            ProcessingError::InvalidRecord { .. } | ProcessingError::InvalidBound { .. }
        )
    }
}
