//! Error types for the regridding engine.
//!
//! Two fatal categories abort a run: configuration errors (bad window, bad
//! method, empty field list) and data-shape errors (arrays that disagree
//! about their dimensions). Degenerate geometry is never an error here: the
//! distance floor and nearest-neighbor saturation compensate locally and the
//! pipeline only counts occurrences.

use thiserror::Error;

/// Result type alias using RegridError.
pub type Result<T> = std::result::Result<T, RegridError>;

/// Errors that can occur during regridding and ramping.
#[derive(Debug, Error)]
pub enum RegridError {
    /// Invalid run configuration; rerunning with corrected input is the only
    /// recovery.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Mismatched array dimensions between a field and its grid, or between
    /// paired vector fields.
    #[error("data shape error: {0}")]
    DataShape(String),

    /// A field required by the requested operation is not present in the
    /// source set.
    #[error("missing source field: {0}")]
    MissingField(String),
}

impl RegridError {
    /// Create a Configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a DataShape error.
    pub fn data_shape(msg: impl Into<String>) -> Self {
        Self::DataShape(msg.into())
    }
}
