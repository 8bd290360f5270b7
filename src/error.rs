// Typed pipeline errors.
//
// Most failures in this crate propagate through anyhow at the application
// boundary. These two get concrete types because callers need to react to
// them specifically: a malformed input table must abort before any
// processing starts, and a zero-column feature matrix must be rejected by
// the cluster runner instead of being handed to HDBSCAN.

use thiserror::Error;

/// The input comment table does not have the shape the pipeline requires.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// A required column (`docid` or `text_data`) is absent from the header.
    #[error("input table is missing required column '{0}'")]
    MissingColumn(String),

    /// The same docid appears on more than one row.
    #[error("input table contains duplicate docid '{0}'")]
    DuplicateDocid(String),
}

/// The feature matrix cannot be clustered.
///
/// Raised when every gram was filtered out (zero columns) or the matrix has
/// no rows. An empty matrix is a valid *vectorization* outcome — it only
/// becomes an error when someone tries to cluster it.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("degenerate feature matrix: {reason}")]
pub struct DegenerateInputError {
    pub reason: String,
}

impl DegenerateInputError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
