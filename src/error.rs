use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Required column '{field}' not found (looked for: {fragments})")]
    MissingColumn { field: String, fragments: String },

    #[error("Could not connect to MongoDB: {0}")]
    Connect(String),

    #[error("Failed to insert batch of {attempted} records: {message}")]
    Write { attempted: usize, message: String },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SeedError>;

/// Why a single source row was left out of the batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("missing value for {0}")]
    MissingValue(&'static str),

    #[error("invalid number for {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("invalid date/time {0:?} (expected dd/mm/yy HHMMSS)")]
    InvalidTimestamp(String),

    #[error("customer {0:?} is not in the valid identifier pool")]
    UnknownCustomer(String),

    #[error("unreadable record: {0}")]
    Unreadable(String),
}
