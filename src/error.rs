//! Error type for loading and parsing simulation inputs
//!
//! The numeric engine never fails; only the surfaces that read loan
//! declarations from files or strings return these.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid year-month '{0}' (expected YYYY-MM)")]
    InvalidYearMonth(String),

    #[error("Unknown amortization style: {0}")]
    UnknownStyle(String),

    #[error("Unknown insurance basis: {0}")]
    UnknownInsuranceBasis(String),

    #[error("Unknown loan role: {0}")]
    UnknownRole(String),

    #[error("Expected exactly one primary loan, found {0}")]
    PrimaryCount(usize),

    #[error("At most {max} secondary loans are supported, found {found}")]
    TooManySecondaryLoans { max: usize, found: usize },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
