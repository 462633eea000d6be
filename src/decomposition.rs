use std::collections::HashSet;

use crate::column::Column;
use crate::diagram::{DiagramWithReps, PersistenceDiagram};
use crate::pivot::UNCLAIMED;

/// One column slot of the working matrix: the R column and, when V is
/// maintained, its V column. The two always live together so the parallel
/// engine can snapshot a coherent (R, V) pair under a single lock guard.
#[derive(Debug, Clone)]
pub(crate) struct Slot<C> {
    pub(crate) r: C,
    pub(crate) v: Option<C>,
}

impl<C: Column> Slot<C> {
    pub(crate) fn new(entries: Vec<usize>, index: usize, maintain_v: bool) -> Self {
        Self {
            r: C::from_entries(entries),
            v: maintain_v.then(|| C::unit(index)),
        }
    }

    /// Empty both columns — the clearing rule. The zero V column keeps
    /// R = D·V trivially true for a cleared slot.
    pub(crate) fn kill(&mut self) {
        self.r.clear();
        if let Some(v) = self.v.as_mut() {
            v.clear();
        }
    }
}

/// Terminal state of a reduction: the reduced columns, the optional V
/// columns, and the pivot claims table.
///
/// This is the mid-level result surface — [`crate::compute_pairings`] and
/// friends extract a diagram and throw the rest away, while hosts that
/// want the reduced columns themselves (or the change-of-basis) can go
/// through [`crate::decompose`] and read them here.
pub struct Decomposition<C> {
    pub(crate) slots: Vec<Slot<C>>,
    pub(crate) claims: Vec<usize>,
}

impl<C: Column> Decomposition<C> {
    /// Number of columns (= matrix height; the matrix is square).
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Sorted entries of the reduced column `j`.
    pub fn r_column(&self, j: usize) -> Vec<usize> {
        self.slots[j].r.entries()
    }

    /// Sorted entries of V column `j`, when V was maintained.
    pub fn v_column(&self, j: usize) -> Option<Vec<usize>> {
        self.slots[j].v.as_ref().map(Column::entries)
    }

    /// Whether this decomposition carries V columns.
    pub fn has_v(&self) -> bool {
        self.slots.first().is_some_and(|slot| slot.v.is_some())
    }

    /// Read the persistence diagram off the reduced matrix.
    ///
    /// A non-empty column is a death and pairs with its pivot row; an
    /// empty column whose own row was never claimed is essential.
    pub fn diagram(&mut self) -> PersistenceDiagram {
        let mut paired = HashSet::new();
        let mut unpaired = HashSet::new();
        for j in 0..self.slots.len() {
            match self.slots[j].r.pivot() {
                Some(i) => {
                    paired.insert((i, j));
                }
                None => {
                    if self.claims[j] == UNCLAIMED {
                        unpaired.insert(j);
                    }
                }
            }
        }
        PersistenceDiagram { paired, unpaired }
    }

    /// Diagram plus representatives, or `None` when V was not maintained.
    ///
    /// Pairs are ordered by death index and essentials ascend;
    /// `paired_reps[k]` / `unpaired_reps[k]` are the entries of the V
    /// column of the k-th death (resp. essential) column.
    pub fn diagram_with_reps(&mut self) -> Option<DiagramWithReps> {
        if self.size() > 0 && !self.has_v() {
            return None;
        }
        let mut paired = Vec::new();
        let mut unpaired = Vec::new();
        for j in 0..self.slots.len() {
            match self.slots[j].r.pivot() {
                Some(i) => paired.push((i, j)),
                None if self.claims[j] == UNCLAIMED => unpaired.push(j),
                None => {}
            }
        }
        let rep = |slots: &[Slot<C>], j: usize| {
            slots[j].v.as_ref().map(Column::entries).unwrap_or_default()
        };
        let paired_reps = paired.iter().map(|&(_, j)| rep(&self.slots, j)).collect();
        let unpaired_reps = unpaired.iter().map(|&j| rep(&self.slots, j)).collect();
        Some(DiagramWithReps {
            paired,
            unpaired,
            paired_reps,
            unpaired_reps,
        })
    }
}
