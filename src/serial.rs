use std::collections::HashMap;

use crate::column::Column;
use crate::decomposition::{Decomposition, Slot};
use crate::error::ReductionError;
use crate::matrix::BoundaryMatrix;
use crate::options::ReductionOptions;
use crate::pivot::UNCLAIMED;

/// Standard single-threaded R = D·V reduction.
///
/// Columns are processed left to right within each stratum: while the
/// current column has a pivot already claimed by an earlier column, add
/// that column (mirroring the addition in V when it is maintained); when
/// the pivot is unclaimed, claim it and move on. With clearing in effect
/// the strata run from the top dimension downward and a column whose own
/// row was claimed above is killed without reduction.
pub(crate) fn reduce_serial<C: Column>(
    matrix: &BoundaryMatrix,
    options: &ReductionOptions,
) -> Result<Decomposition<C>, ReductionError> {
    let n = matrix.len();
    let mut slots: Vec<Slot<C>> = Vec::new();
    slots.try_reserve_exact(n)?;
    for (j, column) in matrix.columns.iter().enumerate() {
        slots.push(Slot::new(column.clone(), j, options.maintain_v));
    }

    let clearing = matrix.clearing_effective(options.clearing);
    let mut low_inverse: HashMap<usize, usize> =
        HashMap::with_capacity(options.column_height.unwrap_or(n).min(n));

    for stratum in matrix.strata(clearing) {
        for &j in &stratum {
            if clearing && low_inverse.contains_key(&j) {
                // row j is already a pivot: column j is the boundary of its
                // killer and reduces to zero without any arithmetic
                slots[j].kill();
                continue;
            }
            loop {
                let Some(i) = slots[j].r.pivot() else { break };
                match low_inverse.get(&i) {
                    Some(&k) => {
                        // the claimant always precedes j: claims come from
                        // earlier columns of the same stratum
                        debug_assert!(k < j);
                        let (head, tail) = slots.split_at_mut(j);
                        let current = &mut tail[0];
                        let claimant = &head[k];
                        current.r.add_assign(&claimant.r);
                        if let (Some(vj), Some(vk)) =
                            (current.v.as_mut(), claimant.v.as_ref())
                        {
                            vj.add_assign(vk);
                        }
                    }
                    None => {
                        low_inverse.insert(i, j);
                        break;
                    }
                }
            }
        }
    }

    let mut claims = vec![UNCLAIMED; n];
    for (row, column) in low_inverse {
        claims[row] = column;
    }
    Ok(Decomposition { slots, claims })
}

// ─── Tests ────────────────────────────────────────────────────────────────────
