//! Error types for the shared crate

use thiserror::Error;

/// Failures while rendering warranty exports
#[derive(Error, Debug)]
pub enum WarrantyError {
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV writer error: {0}")]
    Writer(String),

    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
