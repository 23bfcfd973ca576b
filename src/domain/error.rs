//! Domain error types.

/// Message returned to callers when the data source produced nothing.
pub const NO_DATA_MESSAGE: &str = "Invalid symbol or no data for given dates.";

/// Top-level error type for stockcast.
#[derive(Debug, thiserror::Error)]
pub enum StockcastError {
    #[error("{}", NO_DATA_MESSAGE)]
    NoData { symbol: String },

    #[error("insufficient data for {stage}: have {have}, need at least {need}")]
    InsufficientData {
        stage: &'static str,
        have: usize,
        need: usize,
    },

    #[error("internal error: {reason}")]
    Internal { reason: String },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Caller-facing classification of a failed summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NoData,
    InsufficientData,
    Internal,
}

impl StockcastError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StockcastError::NoData { .. } => ErrorKind::NoData,
            StockcastError::InsufficientData { .. } => ErrorKind::InsufficientData,
            _ => ErrorKind::Internal,
        }
    }
}

impl From<&StockcastError> for std::process::ExitCode {
    fn from(err: &StockcastError) -> Self {
        let code: u8 = match err {
            StockcastError::Io(_) => 1,
            StockcastError::ConfigParse { .. } | StockcastError::ConfigInvalid { .. } => 2,
            StockcastError::DataSource { .. } => 3,
            StockcastError::NoData { .. } | StockcastError::InsufficientData { .. } => 5,
            StockcastError::Internal { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}

impl From<ErrorKind> for std::process::ExitCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NoData | ErrorKind::InsufficientData => std::process::ExitCode::from(5),
            ErrorKind::Internal => std::process::ExitCode::from(6),
        }
    }
}
