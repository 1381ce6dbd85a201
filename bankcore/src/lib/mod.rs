//! Welcome to `bankcore`!
//!
//! An allocation-safety engine built around the Banker's algorithm. Given a
//! fixed set of processes and resource types, it decides whether an allocation
//! state is *safe*, names the processes that cannot finish when it is not,
//! derives a wait-for relation between processes, and tests whether a
//! hypothetical request may be granted without risking deadlock.
//!
//! Parsing raw input and displaying results are someone else's job (see the
//! `teller` crate). What comes in here is already-typed integer vectors and
//! matrices; what goes out is structured reports.

pub mod utils;
pub mod safety;
pub mod deadlock;
pub mod waitfor;
pub mod request;
pub mod evaluation;

pub use crate::utils::*;

/// One immutable view of the system: what is free, what every process
/// may ever claim, what every process currently holds, and what it may
/// still ask for.
///
/// A [Snapshot] is constructed once per evaluation and never mutated
/// afterwards. Every algorithm that needs scratch state (the Work/Finish
/// vectors, a hypothetical allocation) allocates its own copy, so a
/// single [Snapshot] may be shared freely between readers.
///
/// > ***ATTENTION:*** the only way to get a [Snapshot] is through
/// > [Snapshot::new], which enforces all shape invariants and
/// > `Allocation ≤ Max`. Every other component relies on this.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    processes:  usize,
    resources:  usize,
    available:  Vector,
    max:        Matrix,
    allocation: Matrix,
    // Derived. Kept next to the rest since every algorithm reads it.
    need:       Matrix,
}

impl Snapshot {
    /// Builds a validated snapshot. This function is the gatekeeper to
    /// the rest of the library. Checks run in this order:
    ///
    /// 1. `available` has exactly `resources` entries.
    /// 2. `max` and `allocation` have exactly `processes` rows of
    ///     exactly `resources` entries each.
    /// 3. `Allocation ≤ Max` elementwise (see [validate_allocation]).
    ///
    /// Need is computed only after all of the above succeed.
    pub fn new(
        processes:  usize,
        resources:  usize,
        available:  Vector,
        max:        Matrix,
        allocation: Matrix,
    ) -> Result<Self, ValidationError> {
        if available.len() != resources {
            warn!(expected = resources, found = available.len(), "bad Available length");
            return Err(ValidationError::AvailableLength {
                expected:   resources,
                found:      available.len(),
            });
        }
        check_shape(&max, MatrixKind::Max, processes, resources)?;
        check_shape(&allocation, MatrixKind::Allocation, processes, resources)?;
        if let Err(e) = validate_allocation(&max, &allocation) {
            warn!("{}", e);
            return Err(e);
        }
        let need = compute_need(&max, &allocation);

        Ok(Self {
            processes,
            resources,
            available,
            max,
            allocation,
            need,
        })
    }

    #[inline]
    pub fn processes(&self) -> usize {
        self.processes
    }

    #[inline]
    pub fn resources(&self) -> usize {
        self.resources
    }

    #[inline]
    pub fn available(&self) -> &[Units] {
        &self.available
    }

    #[inline]
    pub fn max(&self) -> &Matrix {
        &self.max
    }

    #[inline]
    pub fn allocation(&self) -> &Matrix {
        &self.allocation
    }

    #[inline]
    pub fn need(&self) -> &Matrix {
        &self.need
    }

    /// Replays a completion order against `Work := Available`. Returns
    /// `true` only if the order names every process exactly once and
    /// each process' need fits in Work at the moment it is admitted.
    ///
    /// This is how a claimed safe sequence gets audited independently
    /// of the reduction that produced it.
    pub fn replay(&self, order: &[ProcessId]) -> bool {
        if order.len() != self.processes || !order.iter().all_unique() {
            return false;
        }
        let mut work = self.available.clone();
        for &p in order {
            if p >= self.processes || !fits(&self.need[p], &work) {
                return false;
            }
            release(&mut work, &self.allocation[p]);
        }

        true
    }
}

fn check_shape(
    m:          &Matrix,
    kind:       MatrixKind,
    processes:  usize,
    resources:  usize,
) -> Result<(), ValidationError> {
    if m.len() != processes {
        warn!(matrix = %kind, expected = processes, found = m.len(), "bad row count");
        return Err(ValidationError::RowCount {
            matrix:     kind,
            expected:   processes,
            found:      m.len(),
        });
    }
    if let Some((process, row)) = m.iter()
        .enumerate()
        .find(|(_, row)| row.len() != resources) {
            warn!(matrix = %kind, process, found = row.len(), "bad column count");
            return Err(ValidationError::ColumnCount {
                matrix:     kind,
                process,
                expected:   resources,
                found:      row.len(),
            });
    }

    Ok(())
}

/// Scans in row-major order and fails on the first cell where
/// `Allocation[i][j] > Max[i][j]`. Shapes are assumed to agree.
pub fn validate_allocation(max: &Matrix, allocation: &Matrix) -> Result<(), ValidationError> {
    for (process, (max_row, alloc_row)) in max.iter()
        .zip(allocation.iter())
        .enumerate() {
        for (resource, (&m, &a)) in max_row.iter()
            .zip(alloc_row.iter())
            .enumerate() {
            if a > m {
                return Err(ValidationError::AllocationExceedsMax {
                    process,
                    resource,
                    allocated:  a,
                    max:        m,
                });
            }
        }
    }

    Ok(())
}

/// `Need = Max − Allocation`. Must only run on validated input, or else
/// the subtraction underflows.
pub fn compute_need(max: &Matrix, allocation: &Matrix) -> Matrix {
    max.iter()
        .zip(allocation.iter())
        .map(|(max_row, alloc_row)| {
            max_row.iter()
                .zip(alloc_row.iter())
                .map(|(m, a)| m - a)
                .collect()
        })
        .collect()
}

/// `true` if `demand ≤ supply` for every resource type. Vacuously
/// `true` when there are no resource types.
#[inline]
pub(crate) fn fits(demand: &[Units], supply: &[Units]) -> bool {
    demand.iter()
        .zip(supply.iter())
        .all(|(d, s)| d <= s)
}

/// A finished process hands everything it holds back to the pool.
///
/// Saturates at `Units::MAX`. No need exceeds that, so a capped pool
/// admits exactly the processes the true sum would.
#[inline]
pub(crate) fn release(work: &mut [Units], held: &[Units]) {
    for (w, h) in work.iter_mut().zip(held.iter()) {
        *w = w.saturating_add(*h);
    }
}
