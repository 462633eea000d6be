use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A sparse 𝔽₂ vector over nonnegative row indices.
///
/// A column is a set of row indices — over 𝔽₂ a row is either present or
/// absent, and adding two columns is symmetric difference. The trait leaves
/// the representation open so the engines can trade merge cost against
/// pivot cost:
///
/// * [`VecColumn`] keeps entries strictly ascending and merges eagerly.
///   `pivot` is O(1). This is the default representation.
/// * [`HeapColumn`] defers all cancellation to a max-heap and pays for it
///   lazily at the next `pivot` call. Cheaper under long runs of additions
///   between pivot queries.
///
/// `pivot` takes `&mut self` because the heap representation normalises
/// itself during the query: after `pivot` returns, the reported row is
/// genuinely the unique maximum, so subsequent additions stay correct.
pub trait Column: Clone + Default + Send + Sync {
    /// Build a column from strictly ascending row indices.
    fn from_entries(entries: Vec<usize>) -> Self;

    /// The column `{index}` — the initial state of every V column.
    fn unit(index: usize) -> Self {
        Self::from_entries(vec![index])
    }

    /// Greatest row index present, or `None` for the zero column.
    fn pivot(&mut self) -> Option<usize>;

    /// In-place symmetric difference: rows of even multiplicity cancel.
    fn add_assign(&mut self, other: &Self);

    /// True when the column has reduced to zero.
    fn is_cycle(&mut self) -> bool {
        self.pivot().is_none()
    }

    /// Sorted row indices after cancellation.
    fn entries(&self) -> Vec<usize>;

    /// Reset to the zero column, used when a column is cleared.
    fn clear(&mut self);
}

/// Ordered sparse column: strictly ascending row indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VecColumn {
    rows: Vec<usize>,
}

impl Column for VecColumn {
    fn from_entries(entries: Vec<usize>) -> Self {
        debug_assert!(entries.windows(2).all(|w| w[0] < w[1]));
        Self { rows: entries }
    }

    fn pivot(&mut self) -> Option<usize> {
        self.rows.last().copied()
    }

    /// Two-finger merge into a fresh buffer; equal heads cancel in pairs.
    fn add_assign(&mut self, other: &Self) {
        if other.rows.is_empty() {
            return;
        }
        if self.rows.is_empty() {
            self.rows = other.rows.clone();
            return;
        }
        let mut merged = Vec::with_capacity(self.rows.len() + other.rows.len());
        let (mut i, mut j) = (0, 0);
        while i < self.rows.len() && j < other.rows.len() {
            match self.rows[i].cmp(&other.rows[j]) {
                Ordering::Less => {
                    merged.push(self.rows[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    merged.push(other.rows[j]);
                    j += 1;
                }
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
            }
        }
        merged.extend_from_slice(&self.rows[i..]);
        merged.extend_from_slice(&other.rows[j..]);
        self.rows = merged;
    }

    fn entries(&self) -> Vec<usize> {
        self.rows.clone()
    }

    fn clear(&mut self) {
        self.rows.clear();
    }
}

/// Lazy sparse column: a max-heap of row indices with deferred cancellation.
///
/// Additions just push the other column's rows. Cancellation happens at
/// `pivot`: equal tops are popped in pairs until the top is unique. The
/// heap may still hold cancelled pairs below the top; only the maximum is
/// guaranteed normalised after a pivot query, which is all the reduction
/// loop relies on.
#[derive(Debug, Clone, Default)]
pub struct HeapColumn {
    rows: BinaryHeap<usize>,
}

impl Column for HeapColumn {
    fn from_entries(entries: Vec<usize>) -> Self {
        debug_assert!(entries.windows(2).all(|w| w[0] < w[1]));
        Self {
            rows: BinaryHeap::from(entries),
        }
    }

    fn pivot(&mut self) -> Option<usize> {
        while let Some(top) = self.rows.pop() {
            if self.rows.peek() == Some(&top) {
                // even multiplicity so far: this pair cancels
                self.rows.pop();
            } else {
                self.rows.push(top);
                return Some(top);
            }
        }
        None
    }

    fn add_assign(&mut self, other: &Self) {
        self.rows.extend(other.rows.iter().copied());
    }

    fn entries(&self) -> Vec<usize> {
        let sorted = self.rows.clone().into_sorted_vec();
        let mut out = Vec::with_capacity(sorted.len());
        let mut iter = sorted.into_iter().peekable();
        while let Some(row) = iter.next() {
            if iter.peek() == Some(&row) {
                iter.next();
            } else {
                out.push(row);
            }
        }
        out
    }

    fn clear(&mut self) {
        self.rows.clear();
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn check_add<C: Column>() {
        let mut a = C::from_entries(vec![1, 3, 5]);
        let b = C::from_entries(vec![3, 4, 5, 7]);
        a.add_assign(&b);
        assert_eq!(a.entries(), vec![1, 4, 7]);
        assert_eq!(a.pivot(), Some(7));
    }

    #[test]
    fn test_add_cancels_shared_rows() {
        check_add::<VecColumn>();
        check_add::<HeapColumn>();
    }

    fn check_self_cancellation<C: Column>() {
        let mut a = C::from_entries(vec![0, 2, 9]);
        let b = a.clone();
        a.add_assign(&b);
        assert!(a.is_cycle());
        assert!(a.entries().is_empty());
    }

    #[test]
    fn test_adding_a_column_to_itself_is_zero() {
        check_self_cancellation::<VecColumn>();
        check_self_cancellation::<HeapColumn>();
    }

    #[test]
    fn test_empty_column_has_no_pivot() {
        assert_eq!(VecColumn::default().pivot(), None);
        assert_eq!(HeapColumn::default().pivot(), None);
    }

    #[test]
    fn test_unit_column() {
        let mut unit = VecColumn::unit(4);
        assert_eq!(unit.pivot(), Some(4));
        assert_eq!(unit.entries(), vec![4]);
    }

    #[test]
    fn test_heap_pivot_normalises_odd_multiplicity() {
        // Build multiplicity three at the top: {5} + {5,6} + {5,6} keeps 5.
        let mut col = HeapColumn::from_entries(vec![5]);
        let other = HeapColumn::from_entries(vec![5, 6]);
        col.add_assign(&other);
        col.add_assign(&other);
        assert_eq!(col.pivot(), Some(5));
        assert_eq!(col.entries(), vec![5]);
    }

    #[test]
    fn test_heap_pivot_is_stable_after_query() {
        let mut col = HeapColumn::from_entries(vec![2, 8]);
        let other = HeapColumn::from_entries(vec![8]);
        col.add_assign(&other);
        assert_eq!(col.pivot(), Some(2));
        // the query normalised the top; a repeat answers the same
        assert_eq!(col.pivot(), Some(2));
    }

    #[test]
    fn test_add_into_empty() {
        let mut a = VecColumn::default();
        a.add_assign(&VecColumn::from_entries(vec![1, 2]));
        assert_eq!(a.entries(), vec![1, 2]);
    }
}
