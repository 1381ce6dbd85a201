pub use std::{
    collections::BTreeSet,
    fmt,
};
pub use thiserror::Error;
pub use itertools::Itertools;
pub use indexmap::{IndexMap, IndexSet};
pub use serde::{Serialize, Deserialize};
pub use tracing::{debug, info, trace, warn};

pub use crate::{
    Snapshot,
    safety::*,
    deadlock::*,
    waitfor::*,
    request::*,
    evaluation::*,
};

/// The unit for counting instances of a resource type. `bankcore` does not
/// care about what a unit stands for (a lock, a page, a tape drive...), only
/// that it can be neither negative nor fractional. The former is enforced by
/// the type itself, which is why all counts are unsigned.
pub type Units = usize;

/// Logical process identifier, in `0..P`.
pub type ProcessId = usize;

/// Logical resource type identifier, in `0..R`.
pub type ResourceId = usize;

/// One unit count per resource type.
pub type Vector = Vec<Units>;

/// One [Vector] per process, i.e., a P×R matrix stored row-major.
pub type Matrix = Vec<Vector>;

/// Names the input matrices whenever a shape check fails.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixKind {
    Max,
    Allocation,
}

impl fmt::Display for MatrixKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixKind::Max         => { write!(f, "Max") },
            MatrixKind::Allocation  => { write!(f, "Allocation") },
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// Appears while constructing a [Snapshot]. No safety computation
/// runs on input that produced one of these.
pub enum ValidationError {
    #[error("Available vector has {found} entries, expected {expected}")]
    AvailableLength {
        expected:   usize,
        found:      usize,
    },
    #[error("{matrix} matrix has {found} rows, expected {expected}")]
    RowCount {
        matrix:     MatrixKind,
        expected:   usize,
        found:      usize,
    },
    #[error("{matrix} row of P{process} has {found} entries, expected {expected}")]
    ColumnCount {
        matrix:     MatrixKind,
        process:    ProcessId,
        expected:   usize,
        found:      usize,
    },
    #[error("Process P{process} has allocated resources ({allocated}) greater than its maximum need ({max}) for resource R{resource}")]
    AllocationExceedsMax {
        process:    ProcessId,
        resource:   ResourceId,
        allocated:  Units,
        max:        Units,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// A malformed request, as opposed to a well-formed one that
/// got denied (see [Denial]).
pub enum RequestError {
    #[error("Request denied: invalid process index P{process} ({processes} processes exist)")]
    InvalidProcess {
        process:    ProcessId,
        processes:  usize,
    },
    #[error("Request denied: length mismatch, request has {found} entries but there are {expected} resource types")]
    LengthMismatch {
        expected:   usize,
        found:      usize,
    },
}

/// Everything that may go wrong during a full evaluation.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BankError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Request(#[from] RequestError),
}

/// Renders a sequence of processes as `P1 → P2 → P0`.
pub fn fmt_sequence(seq: &[ProcessId]) -> String {
    seq.iter()
        .map(|p| format!("P{}", p))
        .join(" → ")
}

/// Renders a set of processes as `P1, P2`.
pub fn fmt_processes<'a, I>(procs: I) -> String
where I: IntoIterator<Item = &'a ProcessId> {
    procs.into_iter()
        .map(|p| format!("P{}", p))
        .join(", ")
}
