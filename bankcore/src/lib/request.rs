use crate::{
    utils::*,
    compute_need,
};

/// The state a request *would* lead to. Fully owned: it never shares
/// storage with the [Snapshot] it was derived from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialState {
    pub available:  Vector,
    pub allocation: Matrix,
    pub need:       Matrix,
}

/// Why a well-formed request was turned down.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Denial {
    /// Not enough free units right now.
    ExceedsAvailable {
        resource:   ResourceId,
        available:  Units,
        requested:  Units,
    },
    /// The process would go past its declared maximum.
    ExceedsNeed {
        process:    ProcessId,
        resource:   ResourceId,
        need:       Units,
        requested:  Units,
    },
    /// The request fits, but the trial state is not safe.
    Unsafe {
        /// Whichever processes could still finish in the trial state.
        completed:  Vec<ProcessId>,
        trace:      Trace,
        trial:      TrialState,
    },
}

/// Verdict of the Banker's request test.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum RequestVerdict {
    Granted {
        safe_sequence:  Vec<ProcessId>,
        trace:          Trace,
        trial:          TrialState,
    },
    Denied {
        reason:         Denial,
    },
}

impl RequestVerdict {
    #[inline]
    pub fn is_granted(&self) -> bool {
        matches!(self, RequestVerdict::Granted { .. })
    }

    /// Safety proof of the trial state. Empty unless granted.
    pub fn safe_sequence(&self) -> &[ProcessId] {
        match self {
            RequestVerdict::Granted { safe_sequence, .. } => { safe_sequence.as_slice() },
            RequestVerdict::Denied { .. }                 => { &[] },
        }
    }

    /// The trace of the trial run. Requests turned down before a trial
    /// state was built have none.
    pub fn trace(&self) -> &[TraceEvent] {
        match self {
            RequestVerdict::Granted { trace, .. }
            | RequestVerdict::Denied { reason: Denial::Unsafe { trace, .. } } => {
                trace.as_slice()
            },
            RequestVerdict::Denied { .. }   => { &[] },
        }
    }

    pub fn trial(&self) -> Option<&TrialState> {
        match self {
            RequestVerdict::Granted { trial, .. }
            | RequestVerdict::Denied { reason: Denial::Unsafe { trial, .. } } => {
                Some(trial)
            },
            RequestVerdict::Denied { .. }   => { None },
        }
    }

    pub fn message(&self) -> String {
        match self {
            RequestVerdict::Granted { safe_sequence, .. } => {
                format!(
                    "Request can be granted safely. Safe Sequence: {}",
                    fmt_sequence(safe_sequence)
                )
            },
            RequestVerdict::Denied { reason }   => {
                match reason {
                    Denial::ExceedsAvailable { available, requested, .. }  => {
                        format!(
                            "Request denied: exceeds available resources. Available: {}, Requested: {}",
                            available,
                            requested
                        )
                    },
                    Denial::ExceedsNeed { process, .. } => {
                        format!("Request denied: exceeds maximum need for process P{}.", process)
                    },
                    Denial::Unsafe { .. }   => {
                        String::from("Request would lead to unsafe state. Request denied.")
                    },
                }
            },
        }
    }

    pub fn summary(&self) -> &'static str {
        if self.is_granted() {
            "Safe State after Request."
        } else {
            "Unsafe State after Request."
        }
    }
}

impl Snapshot {
    /// The Banker's request test: may `process` be handed `request`
    /// right now without risking deadlock?
    ///
    /// Malformed requests (unknown process, wrong length) are errors.
    /// Well-formed ones always get a [RequestVerdict]. Resource types are
    /// visited in ascending order, and for each one the available units
    /// are checked before the process' remaining need; the first
    /// violation decides the denial.
    ///
    /// The snapshot itself is left untouched. The trial state is built
    /// on freshly allocated copies and handed back inside the verdict.
    pub fn evaluate_request(
        &self,
        process:    ProcessId,
        request:    &[Units],
    ) -> Result<RequestVerdict, RequestError> {
        if process >= self.processes() {
            warn!(process, processes = self.processes(), "invalid process index");
            return Err(RequestError::InvalidProcess {
                process,
                processes:  self.processes(),
            });
        }
        if request.len() != self.resources() {
            warn!(expected = self.resources(), found = request.len(), "request length mismatch");
            return Err(RequestError::LengthMismatch {
                expected:   self.resources(),
                found:      request.len(),
            });
        }
        let need = &self.need()[process];
        for (resource, &requested) in request.iter().enumerate() {
            let available = self.available()[resource];
            let denial = if requested > available {
                Some(Denial::ExceedsAvailable {
                    resource,
                    available,
                    requested,
                })
            } else if requested > need[resource] {
                Some(Denial::ExceedsNeed {
                    process,
                    resource,
                    need:       need[resource],
                    requested,
                })
            } else { None };
            if let Some(reason) = denial {
                info!(process, resource, requested, "request denied up front");
                return Ok(RequestVerdict::Denied { reason });
            }
        }

        let trial = self.trial_state(process, request);
        let report = check_safety(&trial.available, &trial.need, &trial.allocation);
        if report.is_safe {
            info!(process, "request granted: {}", fmt_sequence(&report.sequence));
            Ok(RequestVerdict::Granted {
                safe_sequence:  report.sequence,
                trace:          report.trace,
                trial,
            })
        } else {
            info!(process, "request would lead to an unsafe state");
            Ok(RequestVerdict::Denied {
                reason: Denial::Unsafe {
                    completed:  report.sequence,
                    trace:      report.trace,
                    trial,
                },
            })
        }
    }

    /// Pretends the request went through. Callers must have checked
    /// that `request ≤ Available` and `request ≤ Need[process]`.
    fn trial_state(&self, process: ProcessId, request: &[Units]) -> TrialState {
        // Deep copies. The trial must never alias live storage.
        let mut allocation: Matrix = self.allocation().clone();
        let mut available: Vector = self.available().to_vec();
        for (r, &units) in request.iter().enumerate() {
            allocation[process][r] += units;
            available[r] -= units;
        }
        let need = compute_need(self.max(), &allocation);

        TrialState {
            available,
            allocation,
            need,
        }
    }
}
