//! # lockred — Lock-Free Persistence Pairings over 𝔽₂
//!
//! ## What this crate computes
//!
//! Given the columns of a filtered boundary matrix — column `j` lists the
//! row indices of the boundary faces of cell `j`, delivered in filtration
//! order — the engine produces the **persistence diagram**: the set of
//! `(birth, death)` index pairs and the set of essential (unpaired)
//! indices. Coefficients are 𝔽₂, so a column is a set of rows and column
//! addition is symmetric difference.
//!
//! ## Architecture
//!
//! Three reduction engines share one data model:
//!
//! * **serial** — the textbook left-to-right R = D·V reduction with a
//!   hash-map pivot index;
//! * **lock-free parallel** — chunks of consecutive columns reduced
//!   concurrently by a fixed thread pool, coordinated only through an
//!   atomic pivot map where "smallest claimant wins" every CAS contest;
//! * **lock-free parallel with V** — the same engine mirroring every
//!   column addition into the change-of-basis matrix V, for callers that
//!   want representative cycles.
//!
//! Two optimisations wrap the engines. *Clearing* skips every column
//! already known to reduce to zero from a pairing discovered one
//! dimension up, which is why annotated input is reduced in dimension
//! strata from the top downward. *Anti-transposition* reflects the matrix
//! through its anti-diagonal and reduces the cohomology problem instead,
//! which is usually much cheaper for boundary matrices with many deaths;
//! the resulting diagram maps back through `(a, b) → (n-1-b, n-1-a)`.
//!
//! The output is deterministic: whatever the thread count, chunking, or
//! interleaving, the smallest-claimant rule resolves every contested
//! pivot the same way, and the emitted diagram is a pure function of the
//! input matrix.
//!
//! ## Entry points
//!
//! [`compute_pairings`] applies the default policy (anti-transpose iff the
//! input carries dimensions) and picks serial or parallel from
//! [`ReductionOptions::num_threads`]. The `compute_pairings_*` variants
//! pin one strategy each; [`decompose`] exposes the full terminal R/V
//! state for a chosen [`Column`] representation.

// Global allocator: mimalloc. Column arithmetic allocates fresh merge
// buffers at high rate from every worker thread at once; mimalloc's
// per-thread heaps keep those allocations contention-free. Declared at
// the crate root so it covers every allocation in the process, including
// those made by parking_lot and rayon.
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod column;
mod decomposition;
mod diagram;
mod error;
mod lockfree;
mod matrix;
mod options;
mod pivot;
mod serial;

pub use column::{Column, HeapColumn, VecColumn};
pub use decomposition::Decomposition;
pub use diagram::{DiagramWithReps, PersistenceDiagram};
pub use error::ReductionError;
pub use matrix::InputColumn;
pub use options::ReductionOptions;

use matrix::BoundaryMatrix;

/// Compute the persistence diagram under the default dualisation policy:
/// the matrix is anti-transposed first iff the input is annotated with
/// dimensions (cohomology is typically the cheaper direction for such
/// inputs, and clearing needs the annotations anyway).
pub fn compute_pairings<I, T>(
    columns: I,
    options: &ReductionOptions,
) -> Result<PersistenceDiagram, ReductionError>
where
    I: IntoIterator<Item = T>,
    T: Into<InputColumn>,
{
    options.validate()?;
    let matrix = BoundaryMatrix::ingest(columns, options.column_height)?;
    if matrix.dimensions.is_some() {
        reduce_anti_transpose::<VecColumn>(&matrix, options)
    } else {
        Ok(reduce_matrix::<VecColumn>(&matrix, options)?.diagram())
    }
}

/// Compute the persistence diagram on a single thread with default
/// options, no dualisation.
pub fn compute_pairings_serial<I, T>(
    columns: I,
) -> Result<PersistenceDiagram, ReductionError>
where
    I: IntoIterator<Item = T>,
    T: Into<InputColumn>,
{
    let matrix = BoundaryMatrix::ingest(columns, None)?;
    Ok(serial::reduce_serial::<VecColumn>(&matrix, &ReductionOptions::default())?
        .diagram())
}

/// Compute the persistence diagram of the primal matrix (no dualisation),
/// parallel unless `num_threads` resolves to one.
pub fn compute_pairings_lock_free<I, T>(
    columns: I,
    options: &ReductionOptions,
) -> Result<PersistenceDiagram, ReductionError>
where
    I: IntoIterator<Item = T>,
    T: Into<InputColumn>,
{
    options.validate()?;
    let matrix = BoundaryMatrix::ingest(columns, options.column_height)?;
    Ok(reduce_matrix::<VecColumn>(&matrix, options)?.diagram())
}

/// Compute the persistence diagram through the anti-transpose
/// unconditionally, re-mapping indices on output.
pub fn compute_pairings_anti_transpose<I, T>(
    columns: I,
    options: &ReductionOptions,
) -> Result<PersistenceDiagram, ReductionError>
where
    I: IntoIterator<Item = T>,
    T: Into<InputColumn>,
{
    options.validate()?;
    let matrix = BoundaryMatrix::ingest(columns, options.column_height)?;
    reduce_anti_transpose::<VecColumn>(&matrix, options)
}

/// Compute the diagram together with representatives from V.
///
/// Requires `maintain_v`. The primal matrix is reduced (never the
/// anti-transpose) so representatives are cycles in the caller's own
/// index space.
pub fn compute_pairings_with_reps<I, T>(
    columns: I,
    options: &ReductionOptions,
) -> Result<DiagramWithReps, ReductionError>
where
    I: IntoIterator<Item = T>,
    T: Into<InputColumn>,
{
    options.validate()?;
    if !options.maintain_v {
        return Err(ReductionError::InvalidOption(
            "representatives require maintain_v".into(),
        ));
    }
    let matrix = BoundaryMatrix::ingest(columns, options.column_height)?;
    let mut decomposition = reduce_matrix::<VecColumn>(&matrix, options)?;
    decomposition.diagram_with_reps().ok_or_else(|| {
        ReductionError::InvalidOption("representatives require maintain_v".into())
    })
}

/// Reduce the primal matrix and hand back the full terminal state for a
/// chosen column representation. The mid-level entry point behind every
/// `compute_pairings*` function.
pub fn decompose<C, I, T>(
    columns: I,
    options: &ReductionOptions,
) -> Result<Decomposition<C>, ReductionError>
where
    C: Column,
    I: IntoIterator<Item = T>,
    T: Into<InputColumn>,
{
    options.validate()?;
    let matrix = BoundaryMatrix::ingest(columns, options.column_height)?;
    reduce_matrix(&matrix, options)
}

fn reduce_matrix<C: Column>(
    matrix: &BoundaryMatrix,
    options: &ReductionOptions,
) -> Result<Decomposition<C>, ReductionError> {
    let threads = options.effective_threads();
    if threads <= 1 || matrix.len() == 0 {
        serial::reduce_serial(matrix, options)
    } else {
        lockfree::reduce_lock_free(matrix, options, threads)
    }
}

fn reduce_anti_transpose<C: Column>(
    matrix: &BoundaryMatrix,
    options: &ReductionOptions,
) -> Result<PersistenceDiagram, ReductionError> {
    let dual = matrix.anti_transpose();
    let diagram = reduce_matrix::<C>(&dual, options)?.diagram();
    Ok(PersistenceDiagram::from_anti_transpose(diagram, matrix.len()))
}

// ─── Tests ────────────────────────────────────────────────────────────────────
