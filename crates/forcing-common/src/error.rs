//! Error types shared by the leaf utility modules.

use thiserror::Error;

/// Result type alias using CommonError.
pub type CommonResult<T> = Result<T, CommonError>;

/// Errors from the shared time and unit utilities.
#[derive(Debug, Error)]
pub enum CommonError {
    /// A time string could not be parsed.
    #[error("invalid time specification: {0}")]
    InvalidTime(String),

    /// A unit string is not in the recognized set.
    #[error("unknown unit: {0}")]
    UnknownUnit(String),

    /// No conversion factor is defined between the two units.
    #[error("no conversion from {from} to {to}")]
    UnsupportedConversion { from: String, to: String },
}
