use thiserror::Error;

#[derive(Error, Debug)]
pub enum CashflowError {
    #[error("Invalid cost item: {0}")]
    InvalidCostItem(String),

    #[error("Unknown grouping level '{0}': expected cost_category, cost_type or supplier")]
    UnknownGroupLevel(String),

    #[error("No cost items supplied: a date axis cannot be derived from an empty budget")]
    EmptyInput,

    #[error("The budget file is missing required columns: {0:?}")]
    MissingColumns(Vec<String>),

    #[error("Date parsing error: {0}")]
    DateError(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CashflowError>;
