//! Error types for mesh loading and validation.

use thiserror::Error;

/// Result type alias using MeshError.
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur while loading or validating a mesh.
#[derive(Debug, Error)]
pub enum MeshError {
    /// The mesh file could not be read.
    #[error("failed to read mesh file: {0}")]
    ReadFailed(#[from] std::io::Error),

    /// The header lines did not declare node and cell counts.
    #[error("invalid mesh header: {0}")]
    InvalidHeader(String),

    /// A node or cell record could not be parsed.
    #[error("invalid mesh record at line {line}: {message}")]
    InvalidRecord { line: usize, message: String },

    /// A cell references a node index outside the node table.
    #[error("cell {cell} references node {node} outside 1..={count}")]
    NodeIndexOutOfRange {
        cell: usize,
        node: i64,
        count: usize,
    },

    /// Fewer records than the header promised.
    #[error("mesh file truncated: expected {expected} {kind} records, found {found}")]
    Truncated {
        kind: &'static str,
        expected: usize,
        found: usize,
    },
}
