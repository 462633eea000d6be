use std::collections::TryReserveError;
use thiserror::Error;

/// Failures detected before reduction begins.
///
/// The engine is a pure function of its inputs: every error is raised at
/// ingestion or at entry-point validation, and a reduction that has started
/// always runs to completion. Internal invariants (pivot injectivity,
/// R = D·V) are debug-checked instead — their violation is a bug, not an
/// error state.
#[derive(Debug, Error)]
pub enum ReductionError {
    /// A column contains a row index outside `[0, n)` or its entries are
    /// not strictly ascending (duplicates included).
    #[error("column {index} is invalid: {reason}")]
    InvalidColumn { index: usize, reason: String },

    /// Some columns carry a dimension annotation and others do not.
    #[error("column {index} mixes annotated and unannotated input")]
    InconsistentDimensions { index: usize },

    /// A configuration field is out of range or the flags contradict each
    /// other (e.g. representatives requested without `maintain_v`).
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// An allocation or thread-pool request could not be satisfied.
    #[error("resource exhaustion: {0}")]
    ResourceExhaustion(String),
}

impl From<TryReserveError> for ReductionError {
    fn from(err: TryReserveError) -> Self {
        ReductionError::ResourceExhaustion(err.to_string())
    }
}
