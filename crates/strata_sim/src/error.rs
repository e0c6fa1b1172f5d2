//! # Simulation Errors

use strata_core::StrataError;
use thiserror::Error;

/// Errors raised by the particle driver.
#[derive(Error, Debug)]
pub enum SimError {
    /// The storage engine rejected an operation.
    #[error("storage error: {0}")]
    Storage(#[from] StrataError),

    /// The scenario file is malformed or holds unusable values.
    #[error("invalid scenario: {0}")]
    Config(String),

    /// The scenario file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the particle driver.
pub type SimResult<T> = Result<T, SimError>;
