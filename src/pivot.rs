use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::ReductionError;

/// Sentinel for a pivot row no column has claimed.
pub(crate) const UNCLAIMED: usize = usize::MAX;

/// Dense atomic mapping from pivot row to claiming column index.
///
/// This is the only piece of state the parallel workers contend on
/// directly. One slot per row (the matrix is square, so the height is
/// known), `usize::MAX` as the unclaimed sentinel — a dense array beats a
/// shared hash map here because a claim is a single `compare_exchange` on
/// an independent cache line region.
///
/// The protocol maintains one monotonic invariant: the value stored at a
/// slot only ever decreases. A claim CAS either fills an unclaimed slot or
/// replaces a claimant with a strictly smaller column index ("smallest
/// claimant wins"). Since the values are bounded below by zero, every
/// contested slot settles after finitely many exchanges, which is what the
/// termination argument of the lock-free engine rests on.
pub(crate) struct AtomicPivotMap {
    slots: Vec<AtomicUsize>,
}

impl AtomicPivotMap {
    pub(crate) fn new(height: usize) -> Result<Self, ReductionError> {
        let mut slots = Vec::new();
        slots.try_reserve_exact(height)?;
        slots.resize_with(height, || AtomicUsize::new(UNCLAIMED));
        Ok(Self { slots })
    }

    /// Current claimant of `row`, if any.
    pub(crate) fn claimant(&self, row: usize) -> Option<usize> {
        let value = self.slots[row].load(Ordering::Acquire);
        (value != UNCLAIMED).then_some(value)
    }

    /// Attempt to install `column` as the claimant of `row`, expecting the
    /// slot to currently hold `expected` (`None` = unclaimed). On failure
    /// returns the claimant observed instead.
    pub(crate) fn try_claim(
        &self,
        row: usize,
        expected: Option<usize>,
        column: usize,
    ) -> Result<(), Option<usize>> {
        debug_assert!(expected.map_or(true, |current| column < current));
        self.slots[row]
            .compare_exchange(
                expected.unwrap_or(UNCLAIMED),
                column,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(drop)
            .map_err(|observed| (observed != UNCLAIMED).then_some(observed))
    }

    /// Consume the map into a plain claims table, `UNCLAIMED` where no
    /// column committed.
    pub(crate) fn into_claims(self) -> Vec<usize> {
        self.slots
            .into_iter()
            .map(AtomicUsize::into_inner)
            .collect()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
