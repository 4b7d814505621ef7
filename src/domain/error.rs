// Typed failures of the diagnostic pipeline
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemaError {
    #[error("required column '{column}' is missing")]
    MissingColumn { column: &'static str },

    #[error("column '{column}' row {row}: '{value}' is not a finite number")]
    NonNumeric {
        column: &'static str,
        row: usize,
        value: String,
    },

    #[error("column '{column}' row {row}: {value} must not be negative")]
    Negative {
        column: &'static str,
        row: usize,
        value: f64,
    },

    #[error("column '{column}' row {row}: {value} is not a whole count")]
    Fractional {
        column: &'static str,
        row: usize,
        value: f64,
    },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DiagnosticError {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("dataset has no rows")]
    EmptyDataset,

    #[error("insufficient data: need at least {minimum} rows, have {rows}")]
    InsufficientData { rows: usize, minimum: usize },

    #[error("invalid detector configuration: {0}")]
    InvalidConfig(String),
}
