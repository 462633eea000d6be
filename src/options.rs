use serde::{Deserialize, Serialize};

use crate::error::ReductionError;

/// Configuration record for a single decomposition run.
///
/// Every entry point takes a reference to one of these; the struct is the
/// crate's entire configuration surface. All fields keep their documented
/// defaults under [`Default`], and the `with_*` helpers exist so call sites
/// can tweak a single knob without spelling out the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReductionOptions {
    /// Maintain the V matrix alongside R so that R = D·V holds at
    /// termination. Required by the with-representatives entry point.
    pub maintain_v: bool,
    /// Worker count for the parallel engine. `None` means hardware
    /// parallelism; `Some(1)` forces the serial path. `Some(0)` is invalid.
    pub num_threads: Option<usize>,
    /// Pre-sizing hint for the pivot map and column table when the matrix
    /// height is known up front. Never affects correctness: bounds are
    /// always checked against the realised height.
    pub column_height: Option<usize>,
    /// Floor on the number of consecutive columns per parallel chunk.
    /// A tuning parameter only — it stops tiny strata from shattering into
    /// per-column tasks that thrash the pivot map.
    pub min_chunk_len: usize,
    /// Apply the clearing rule when every column carries a dimension.
    /// Ignored (not an error) for unannotated input.
    pub clearing: bool,
}

impl Default for ReductionOptions {
    fn default() -> Self {
        Self {
            maintain_v: false,
            num_threads: None,
            column_height: None,
            min_chunk_len: 256,
            clearing: true,
        }
    }
}

impl ReductionOptions {
    pub fn with_maintain_v(mut self, maintain_v: bool) -> Self {
        self.maintain_v = maintain_v;
        self
    }

    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    pub fn with_column_height(mut self, column_height: usize) -> Self {
        self.column_height = Some(column_height);
        self
    }

    pub fn with_min_chunk_len(mut self, min_chunk_len: usize) -> Self {
        self.min_chunk_len = min_chunk_len;
        self
    }

    pub fn with_clearing(mut self, clearing: bool) -> Self {
        self.clearing = clearing;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ReductionError> {
        if self.num_threads == Some(0) {
            return Err(ReductionError::InvalidOption(
                "num_threads must be positive".into(),
            ));
        }
        if self.min_chunk_len == 0 {
            return Err(ReductionError::InvalidOption(
                "min_chunk_len must be positive".into(),
            ));
        }
        if self.column_height == Some(0) {
            return Err(ReductionError::InvalidOption(
                "column_height must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Resolved worker count: the explicit setting, or the machine's
    /// available parallelism.
    pub(crate) fn effective_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ReductionOptions::default();
        assert!(!options.maintain_v);
        assert!(options.num_threads.is_none());
        assert!(options.clearing);
        assert!(options.min_chunk_len > 0);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_zero_threads_rejected() {
        let options = ReductionOptions::default().with_num_threads(0);
        assert!(matches!(
            options.validate(),
            Err(ReductionError::InvalidOption(_))
        ));
    }

    #[test]
    fn test_zero_chunk_len_rejected() {
        let options = ReductionOptions::default().with_min_chunk_len(0);
        assert!(matches!(
            options.validate(),
            Err(ReductionError::InvalidOption(_))
        ));
    }

    #[test]
    fn test_explicit_threads_resolved() {
        let options = ReductionOptions::default().with_num_threads(3);
        assert_eq!(options.effective_threads(), 3);
    }
}
