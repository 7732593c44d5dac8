//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for stockdash.
#[derive(Debug, thiserror::Error)]
pub enum StockdashError {
    #[error("no data for symbol {symbol}")]
    InvalidSymbol { symbol: String },

    #[error("malformed price series at row {index}: {reason}")]
    MalformedSeries { index: usize, reason: String },

    #[error("invalid date range: end date {end} is before start date {start}")]
    DateRangeInvalid { start: NaiveDate, end: NaiveDate },

    #[error("invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("data provider error: {reason}")]
    Provider { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StockdashError {
    pub fn malformed(index: usize, reason: impl Into<String>) -> Self {
        StockdashError::MalformedSeries {
            index,
            reason: reason.into(),
        }
    }

    pub fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        StockdashError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the error should be shown as an empty state rather than a failure.
    pub fn is_empty_state(&self) -> bool {
        matches!(self, StockdashError::InvalidSymbol { .. })
    }
}

impl From<&StockdashError> for std::process::ExitCode {
    fn from(err: &StockdashError) -> Self {
        let code: u8 = match err {
            StockdashError::Io(_) => 1,
            StockdashError::ConfigParse { .. }
            | StockdashError::ConfigMissing { .. }
            | StockdashError::ConfigInvalid { .. } => 2,
            StockdashError::Provider { .. } => 3,
            StockdashError::MalformedSeries { .. } => 4,
            StockdashError::InvalidSymbol { .. } => 5,
            StockdashError::DateRangeInvalid { .. } | StockdashError::InvalidInput { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
