//! Error types for the record store and ingestion layer.
//!
//! The metrics aggregator itself never fails: malformed field values degrade
//! to missing values at parse time and propagate as exclusions from sums.
//! Errors here cover the parts that must fail loudly instead: file I/O,
//! unreadable CSV, absent required columns, and bad credentials.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A spreadsheet is missing a column the requested feature depends on.
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// Username/password pair did not match the configured credentials.
    #[error("invalid credentials for user: {0}")]
    InvalidCredentials(String),

    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
