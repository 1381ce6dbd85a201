use crate::{
    utils::*,
    fits,
    release,
};

/// One step of the safety reduction, recorded for diagnostic display.
///
/// Every run of the reduction produces its own fresh [Trace]; nothing
/// about it outlives the report that carries it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    /// An unfinished process was tested against the current Work.
    Check {
        process:        ProcessId,
        need:           Vector,
        work:           Vector,
        can_allocate:   bool,
    },
    /// The process was proven completable, and released what it held.
    /// `work` is the value *after* the release.
    Grant {
        process:        ProcessId,
        work:           Vector,
    },
    /// A whole round went by without progress. Always the last event.
    Halt {
        work:           Vector,
    },
}

impl TraceEvent {
    /// The short caption shown next to each step.
    pub fn label(&self) -> String {
        match self {
            TraceEvent::Check { process, .. }   => {
                format!("Checking if P{} can proceed", process)
            },
            TraceEvent::Grant { process, .. }   => {
                format!("Allocating resources to P{} and marking as finished", process)
            },
            TraceEvent::Halt { .. }             => {
                String::from("No process can proceed, ending check")
            },
        }
    }

    /// What happened, as opposed to [label](TraceEvent::label) which
    /// says to whom.
    pub fn action(&self) -> &'static str {
        match self {
            TraceEvent::Check { .. }    => { "Checking if process can be allocated resources" },
            TraceEvent::Grant { .. }    => { "Resources allocated and process completed" },
            TraceEvent::Halt { .. }     => { "No process can proceed, ending check" },
        }
    }

    /// Work as it stood when the event was recorded.
    pub fn work(&self) -> &[Units] {
        match self {
            TraceEvent::Check { work, .. }
            | TraceEvent::Grant { work, .. }
            | TraceEvent::Halt { work }     => { work.as_slice() },
        }
    }
}

/// An ordered list of [TraceEvent]s.
pub type Trace = Vec<TraceEvent>;

/// Where the reduction sends its events.
///
/// Events are handed over as closures so that a sink which drops them
/// never pays for snapshotting Work and Need.
pub trait TraceSink {
    fn record<F>(&mut self, evt: F)
    where F: FnOnce() -> TraceEvent;
}

impl TraceSink for Trace {
    #[inline]
    fn record<F>(&mut self, evt: F)
    where F: FnOnce() -> TraceEvent {
        let e = evt();
        trace!(label = %e.label(), work = ?e.work());
        self.push(e);
    }
}

/// A sink for runs whose trace nobody will look at.
pub struct Untraced;

impl TraceSink for Untraced {
    #[inline(always)]
    fn record<F>(&mut self, _evt: F)
    where F: FnOnce() -> TraceEvent {}
}

/// What the reduction leaves behind once it reaches its fixpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reduction {
    /// `Finish[i]`: process `i` was proven completable.
    pub finish:     Vec<bool>,
    /// Processes in the order they were proven completable.
    pub completed:  Vec<ProcessId>,
    /// Work after the final (unproductive) round.
    pub work:       Vector,
    /// Number of rounds run, the last unproductive one included.
    pub rounds:     usize,
}

impl Reduction {
    #[inline]
    pub fn all_finished(&self) -> bool {
        self.finish.iter().all(|f| *f)
    }

    /// Indices of the processes left unfinished, ascending.
    pub fn unfinished(&self) -> BTreeSet<ProcessId> {
        self.finish.iter()
            .enumerate()
            .filter(|(_, f)| !**f)
            .map(|(i, _)| i)
            .collect()
    }
}

/// The Banker's safety reduction.
///
/// Rounds repeat until one of them makes no progress. Within a round,
/// unfinished processes are visited in ascending index order; a process
/// whose remaining need fits in Work is declared finished and whatever
/// it holds goes back to Work. Since each productive round finishes at
/// least one process, there are at most P + 1 rounds, each costing
/// O(P·R).
///
/// Inputs are only read; Work and Finish are local to this call.
pub fn reduce<S>(
    available:  &[Units],
    need:       &Matrix,
    allocation: &Matrix,
    sink:       &mut S,
) -> Reduction
where S: TraceSink {
    let processes = need.len();
    let mut work: Vector = available.to_vec();
    let mut finish = vec![false; processes];
    let mut completed = Vec::with_capacity(processes);
    let mut rounds = 0;

    loop {
        rounds += 1;
        let mut progress = false;
        for i in 0..processes {
            if finish[i] { continue; }
            let can_allocate = fits(&need[i], &work);
            sink.record(|| TraceEvent::Check {
                process:        i,
                need:           need[i].clone(),
                work:           work.clone(),
                can_allocate,
            });
            if can_allocate {
                release(&mut work, &allocation[i]);
                finish[i] = true;
                completed.push(i);
                progress = true;
                sink.record(|| TraceEvent::Grant {
                    process:    i,
                    work:       work.clone(),
                });
            }
        }
        if !progress {
            sink.record(|| TraceEvent::Halt { work: work.clone() });
            break;
        }
    }

    Reduction {
        finish,
        completed,
        work,
        rounds,
    }
}

/// Verdict of one safety check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyReport {
    pub is_safe:    bool,
    /// Completion order as built by the reduction. When the state is
    /// unsafe this is only the prefix of processes that could finish;
    /// use [safe_sequence](SafetyReport::safe_sequence) for the strict
    /// view.
    pub sequence:   Vec<ProcessId>,
    pub trace:      Trace,
}

impl SafetyReport {
    /// The proof of safety, or nothing if there is none.
    pub fn safe_sequence(&self) -> &[ProcessId] {
        if self.is_safe { &self.sequence[..] } else { &[] }
    }
}

/// Runs the reduction over explicit matrices and records the full trace.
/// Shapes are assumed to agree; [Snapshot::new] is where that is checked.
pub fn check_safety(
    available:  &[Units],
    need:       &Matrix,
    allocation: &Matrix,
) -> SafetyReport {
    let mut trace = Trace::new();
    let red = reduce(available, need, allocation, &mut trace);
    let is_safe = red.all_finished();
    debug!(
        is_safe,
        rounds = red.rounds,
        events = trace.len(),
        "safety check: {}",
        fmt_sequence(&red.completed)
    );

    SafetyReport {
        is_safe,
        sequence:   red.completed,
        trace,
    }
}

impl Snapshot {
    /// Is this state safe? See [reduce] for how the answer is reached.
    pub fn check_safety(&self) -> SafetyReport {
        check_safety(self.available(), self.need(), self.allocation())
    }
}
