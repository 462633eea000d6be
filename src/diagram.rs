use std::collections::HashSet;
use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};

/// The persistence diagram of a filtered boundary matrix.
///
/// Two diagrams are equal iff `paired` and `unpaired` are equal as sets —
/// representation order is deliberately unobservable, which is why these
/// are hash sets rather than sorted vectors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceDiagram {
    /// `(birth, death)` index pairs: death column `j` pairs with its pivot
    /// row `i`, whose own column is empty.
    pub paired: HashSet<(usize, usize)>,
    /// Essential indices: empty columns never claimed as a pivot row.
    pub unpaired: HashSet<usize>,
}

impl PersistenceDiagram {
    /// Serialize the diagram to any `Write` sink (file, socket, buffer).
    pub fn save<W: Write>(&self, writer: W) -> io::Result<()> {
        bincode::serialize_into(writer, self)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }

    /// Deserialize a diagram from any `Read` source.
    pub fn load<R: Read>(reader: R) -> io::Result<Self> {
        bincode::deserialize_from(reader)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }

    /// Map a diagram computed on the anti-transpose back into the primal
    /// index space: `(a, b)` becomes `(n-1-b, n-1-a)` and an essential `j`
    /// becomes `n-1-j`.
    pub(crate) fn from_anti_transpose(dual: PersistenceDiagram, size: usize) -> Self {
        Self {
            paired: dual
                .paired
                .into_iter()
                .map(|(a, b)| (size - 1 - b, size - 1 - a))
                .collect(),
            unpaired: dual
                .unpaired
                .into_iter()
                .map(|j| size - 1 - j)
                .collect(),
        }
    }
}

/// Diagram plus representative columns from the V matrix.
///
/// Unlike [`PersistenceDiagram`] the sequences here are ordered — pairs by
/// death index, essentials ascending — so `paired_reps[k]` lines up with
/// `paired[k]` (and likewise for the unpaired side). Each representative
/// is the sorted entry list of the V column of the death (resp. essential)
/// column at termination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramWithReps {
    pub paired: Vec<(usize, usize)>,
    pub unpaired: Vec<usize>,
    pub paired_reps: Vec<Vec<usize>>,
    pub unpaired_reps: Vec<Vec<usize>>,
}

impl DiagramWithReps {
    /// Forget the representatives.
    pub fn diagram(&self) -> PersistenceDiagram {
        PersistenceDiagram {
            paired: self.paired.iter().copied().collect(),
            unpaired: self.unpaired.iter().copied().collect(),
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
