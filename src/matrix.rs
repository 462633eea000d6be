use crate::error::ReductionError;

/// One column of the input stream: the sorted boundary rows of a filtered
/// cell, optionally annotated with the cell's dimension.
///
/// Hosts can hand the engine either literal form:
///
/// * `Vec<usize>` — unannotated rows (clearing is disabled);
/// * `(usize, Vec<usize>)` — `(dimension, rows)` (clearing is available).
///
/// Mixing the two forms in one stream is rejected at ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputColumn {
    pub dimension: Option<usize>,
    pub entries: Vec<usize>,
}

impl From<Vec<usize>> for InputColumn {
    fn from(entries: Vec<usize>) -> Self {
        Self {
            dimension: None,
            entries,
        }
    }
}

impl From<(usize, Vec<usize>)> for InputColumn {
    fn from((dimension, entries): (usize, Vec<usize>)) -> Self {
        Self {
            dimension: Some(dimension),
            entries,
        }
    }
}

/// The ingested square boundary matrix: raw sorted row lists plus the
/// per-column dimensions when the input was annotated.
///
/// Validation happens here, once, so the engines never re-check entries:
/// every column is strictly ascending and every row index is below the
/// realised height.
#[derive(Debug)]
pub(crate) struct BoundaryMatrix {
    pub(crate) columns: Vec<Vec<usize>>,
    pub(crate) dimensions: Option<Vec<usize>>,
}

impl BoundaryMatrix {
    pub(crate) fn ingest<I, T>(
        input: I,
        height_hint: Option<usize>,
    ) -> Result<Self, ReductionError>
    where
        I: IntoIterator<Item = T>,
        T: Into<InputColumn>,
    {
        let mut columns: Vec<Vec<usize>> = Vec::new();
        if let Some(hint) = height_hint {
            columns.try_reserve_exact(hint)?;
        }
        let mut annotated: Option<bool> = None;
        let mut dims: Vec<usize> = Vec::new();

        for (index, raw) in input.into_iter().enumerate() {
            let column: InputColumn = raw.into();
            for window in column.entries.windows(2) {
                if window[1] <= window[0] {
                    return Err(ReductionError::InvalidColumn {
                        index,
                        reason: format!(
                            "entries must be strictly ascending, found {} after {}",
                            window[1], window[0]
                        ),
                    });
                }
            }
            match (annotated, column.dimension) {
                (None, dimension) => {
                    annotated = Some(dimension.is_some());
                    if let Some(d) = dimension {
                        dims.push(d);
                    }
                }
                (Some(true), Some(d)) => dims.push(d),
                (Some(false), None) => {}
                _ => return Err(ReductionError::InconsistentDimensions { index }),
            }
            columns.try_reserve(1)?;
            columns.push(column.entries);
        }

        // The matrix is square: row indices live in the same space as
        // column indices, so bounds can only be checked once the stream
        // has been drained. Columns are sorted, so the last entry is max.
        let height = columns.len();
        for (index, column) in columns.iter().enumerate() {
            if let Some(&last) = column.last() {
                if last >= height {
                    return Err(ReductionError::InvalidColumn {
                        index,
                        reason: format!(
                            "row index {last} is outside the matrix height {height}"
                        ),
                    });
                }
            }
        }

        let dimensions = (annotated == Some(true)).then_some(dims);
        Ok(Self {
            columns,
            dimensions,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.columns.len()
    }

    /// Clearing needs every column annotated; the flag alone is not enough.
    pub(crate) fn clearing_effective(&self, flag: bool) -> bool {
        flag && self.dimensions.is_some()
    }

    /// The anti-transpose `D⊥[i][j] = D[n-1-j][n-1-i]`, built by scattering
    /// each input entry to its reflected position. Source columns are
    /// walked in descending order so each output column receives its rows
    /// already ascending.
    pub(crate) fn anti_transpose(&self) -> Self {
        let n = self.columns.len();
        let mut columns = vec![Vec::new(); n];
        for j in (0..n).rev() {
            for &i in &self.columns[j] {
                columns[n - 1 - i].push(n - 1 - j);
            }
        }
        let dimensions = self.dimensions.as_ref().map(|dims| {
            let top = dims.iter().copied().max().unwrap_or(0);
            (0..n).map(|c| top - dims[n - 1 - c]).collect()
        });
        Self {
            columns,
            dimensions,
        }
    }

    /// Column indices grouped into reduction order.
    ///
    /// With clearing in effect the matrix is reduced in dimension strata
    /// from the top dimension downward: a column may only be cleared once
    /// every column one dimension above has been reduced. Otherwise the
    /// whole index range is a single stratum. Pivot rows of distinct
    /// dimensions never collide, so strata are independent row spaces.
    pub(crate) fn strata(&self, clearing: bool) -> Vec<Vec<usize>> {
        match &self.dimensions {
            Some(dims) if clearing && !dims.is_empty() => {
                let top = dims.iter().copied().max().unwrap_or(0);
                let mut strata = vec![Vec::new(); top + 1];
                for (j, &d) in dims.iter().enumerate() {
                    strata[d].push(j);
                }
                strata.reverse();
                strata.retain(|stratum| !stratum.is_empty());
                strata
            }
            _ if self.columns.is_empty() => Vec::new(),
            _ => vec![(0..self.columns.len()).collect()],
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
