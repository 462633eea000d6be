//! Lock-free parallel reduction.
//!
//! The pivot map is the coordination point: workers race to claim pivot
//! rows with `compare_exchange`, and "smallest claimant wins" — a CAS may
//! only replace a claimant with a strictly smaller column index, so every
//! slot settles after finitely many exchanges and the pairing comes out
//! identical to the serial engine's regardless of thread count.
//!
//! Column state is shared through one `parking_lot::RwLock` per slot. A
//! slot holds the R column and its V column together, so a cross-chunk
//! read (`R[j] += R[k]` needs a snapshot of column `k`) clones a coherent
//! (R, V) pair under a single read guard. Only the worker currently
//! driving a column ever writes it: a column is handed over exactly once
//! per pivot steal, through the thief's deque, so writers never overlap
//! on the same slot.
//!
//! Work distribution per stratum: consecutive chunks of at least
//! `min_chunk_len` columns are claimed off an atomic cursor; a column
//! whose pivot was stolen is pushed onto the thief's own deque, and idle
//! workers steal from peers' deques. A worker exits only when the cursor
//! is exhausted, every deque is empty, and the stratum's `pending` count
//! of uncommitted columns has drained to zero.

use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam::deque::{Steal, Stealer, Worker};
use parking_lot::RwLock;
use tracing::debug;

use crate::column::Column;
use crate::decomposition::{Decomposition, Slot};
use crate::error::ReductionError;
use crate::matrix::BoundaryMatrix;
use crate::options::ReductionOptions;
use crate::pivot::AtomicPivotMap;

/// State shared by all workers for the whole decomposition.
struct SharedState<'a, C> {
    slots: &'a [RwLock<Slot<C>>],
    pivots: &'a AtomicPivotMap,
    clearing: bool,
}

/// Per-stratum coordination state.
struct StratumState<'a> {
    chunks: Vec<&'a [usize]>,
    cursor: AtomicUsize,
    /// Columns of this stratum not yet committed (claimed a pivot, proved
    /// to be a cycle, or cleared). The termination gate.
    pending: AtomicUsize,
    steals: AtomicUsize,
    stealers: Vec<Stealer<usize>>,
}

pub(crate) fn reduce_lock_free<C: Column>(
    matrix: &BoundaryMatrix,
    options: &ReductionOptions,
    num_threads: usize,
) -> Result<Decomposition<C>, ReductionError> {
    let n = matrix.len();
    let mut slots: Vec<RwLock<Slot<C>>> = Vec::new();
    slots.try_reserve_exact(n)?;
    for (j, column) in matrix.columns.iter().enumerate() {
        slots.push(RwLock::new(Slot::new(column.clone(), j, options.maintain_v)));
    }
    let pivots = AtomicPivotMap::new(n)?;
    let clearing = matrix.clearing_effective(options.clearing);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|worker| format!("lockred-worker-{worker}"))
        .build()
        .map_err(|e| ReductionError::ResourceExhaustion(e.to_string()))?;

    let shared = SharedState {
        slots: &slots,
        pivots: &pivots,
        clearing,
    };

    for stratum in matrix.strata(clearing) {
        let chunk_len = options
            .min_chunk_len
            .max(stratum.len().div_ceil(num_threads))
            .max(1);
        let locals: Vec<Worker<usize>> =
            (0..num_threads).map(|_| Worker::new_fifo()).collect();
        let state = StratumState {
            chunks: stratum.chunks(chunk_len).collect(),
            cursor: AtomicUsize::new(0),
            pending: AtomicUsize::new(stratum.len()),
            steals: AtomicUsize::new(0),
            stealers: locals.iter().map(Worker::stealer).collect(),
        };
        debug!(
            columns = stratum.len(),
            chunks = state.chunks.len(),
            "reducing stratum"
        );

        pool.scope(|scope| {
            for local in locals {
                let shared = &shared;
                let state = &state;
                scope.spawn(move |_| worker_loop(shared, state, local));
            }
        });

        debug!(
            steals = state.steals.load(Ordering::Relaxed),
            "stratum reduced"
        );
    }

    let slots = slots.into_iter().map(RwLock::into_inner).collect();
    Ok(Decomposition {
        slots,
        claims: pivots.into_claims(),
    })
}

fn worker_loop<C: Column>(
    shared: &SharedState<'_, C>,
    state: &StratumState<'_>,
    local: Worker<usize>,
) {
    loop {
        // dirtied columns first — they are what keeps `pending` above zero
        if let Some(j) = local.pop() {
            reduce_column(shared, state, &local, j, false);
            continue;
        }
        if state.cursor.load(Ordering::Relaxed) < state.chunks.len() {
            let claimed = state.cursor.fetch_add(1, Ordering::Relaxed);
            if let Some(chunk) = state.chunks.get(claimed) {
                for &j in *chunk {
                    reduce_column(shared, state, &local, j, shared.clearing);
                }
                continue;
            }
        }
        if let Some(j) = steal_dirty(&state.stealers) {
            reduce_column(shared, state, &local, j, false);
            continue;
        }
        if state.pending.load(Ordering::Acquire) == 0 {
            return;
        }
        std::hint::spin_loop();
    }
}

/// Take one dirtied column from any peer's deque.
fn steal_dirty(stealers: &[Stealer<usize>]) -> Option<usize> {
    for stealer in stealers {
        loop {
            match stealer.steal() {
                Steal::Success(j) => return Some(j),
                Steal::Empty => break,
                Steal::Retry => {}
            }
        }
    }
    None
}

/// Drive column `j` until it commits: it claims a pivot row, reduces to a
/// cycle, or is cleared. Commit is the single decrement of `pending`.
fn reduce_column<C: Column>(
    shared: &SharedState<'_, C>,
    state: &StratumState<'_>,
    local: &Worker<usize>,
    j: usize,
    check_clearing: bool,
) {
    if check_clearing && shared.pivots.claimant(j).is_some() {
        // row j is already a pivot: the column is the boundary of its
        // killer and reduces to zero without arithmetic. Claims on row j
        // come from the stratum one dimension up, which is fully reduced
        // before this one starts, so the check cannot race.
        shared.slots[j].write().kill();
        state.pending.fetch_sub(1, Ordering::Release);
        return;
    }
    loop {
        let pivot = shared.slots[j].write().r.pivot();
        let Some(i) = pivot else {
            // cycle column: committed, claims nothing
            state.pending.fetch_sub(1, Ordering::Release);
            return;
        };
        match shared.pivots.claimant(i) {
            Some(k) if k < j => {
                // snapshot (R[k], V[k]) under one guard so the pair is
                // coherent even if k is being re-reduced concurrently;
                // adding an earlier column is legal whatever its state
                let snapshot = shared.slots[k].read().clone();
                let mut guard = shared.slots[j].write();
                guard.r.add_assign(&snapshot.r);
                if let (Some(vj), Some(vk)) = (guard.v.as_mut(), snapshot.v.as_ref())
                {
                    vj.add_assign(vk);
                }
            }
            Some(k) => {
                debug_assert!(k != j, "a committed column cannot re-enter reduction");
                // this column is the smaller claimant: contend for the row
                if shared.pivots.try_claim(i, Some(k), j).is_ok() {
                    // j committed; k is dirtied and must re-reduce. Count k
                    // back into pending before publishing it so the gate
                    // never reads zero while k is in flight.
                    state.pending.fetch_add(1, Ordering::Release);
                    local.push(k);
                    state.steals.fetch_add(1, Ordering::Relaxed);
                    state.pending.fetch_sub(1, Ordering::Release);
                    return;
                }
                // an even smaller column won the row meanwhile; re-read
            }
            None => {
                if shared.pivots.try_claim(i, None, j).is_ok() {
                    state.pending.fetch_sub(1, Ordering::Release);
                    return;
                }
            }
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
