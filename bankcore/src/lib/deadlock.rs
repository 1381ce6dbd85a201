use crate::{
    utils::*,
    fits,
};

/// Outcome of deadlock detection over one [Snapshot].
///
/// A process listed in [deadlocked_processes](DeadlockReport::deadlocked_processes)
/// is not proven to sit on a circular wait. It is proven *not completable
/// under the currently available resources in the worst case*, which is
/// the operational meaning of "deadlocked" throughout `bankcore`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlockReport {
    pub is_deadlocked:          bool,
    /// Left out of the JSON form, which carries Need once at the
    /// [Evaluation] level.
    #[serde(skip)]
    pub need:                   Matrix,
    /// Possibly partial: only the processes that could finish, in the
    /// order they did.
    pub safe_sequence:          Vec<ProcessId>,
    pub deadlocked_processes:   BTreeSet<ProcessId>,
    pub trace:                  Trace,
}

impl DeadlockReport {
    #[inline]
    pub fn is_safe(&self) -> bool {
        !self.is_deadlocked
    }

    pub fn summary(&self) -> String {
        if self.is_deadlocked {
            format!(
                "System is in an Unsafe State. Deadlocked processes: {}",
                fmt_processes(&self.deadlocked_processes)
            )
        } else {
            String::from("System is in a Safe State.")
        }
    }
}

impl Snapshot {
    /// Reduces the snapshot to its fixpoint and reports every process
    /// left unfinished.
    ///
    /// Shares its reduction with [check_safety](Snapshot::check_safety),
    /// so `is_deadlocked == !is_safe` always holds for the same snapshot.
    pub fn detect_deadlock(&self) -> DeadlockReport {
        let mut trace = Trace::new();
        let red = reduce(self.available(), self.need(), self.allocation(), &mut trace);
        // Fixpoint: one more round would not admit anybody.
        debug_assert!(
            red.unfinished()
                .iter()
                .all(|&p| !fits(&self.need()[p], &red.work)),
            "Reduction stopped before its fixpoint!"
        );
        let deadlocked_processes = red.unfinished();
        let is_deadlocked = !deadlocked_processes.is_empty();
        if is_deadlocked {
            info!(
                "unsafe state, deadlocked: {}",
                fmt_processes(&deadlocked_processes)
            );
        } else {
            info!("safe state: {}", fmt_sequence(&red.completed));
        }

        DeadlockReport {
            is_deadlocked,
            need:                   self.need().clone(),
            safe_sequence:          red.completed,
            deadlocked_processes,
            trace,
        }
    }

    /// Deadlock detection without the diagnostic trace. Cheaper, same
    /// verdict.
    pub fn deadlocked_processes(&self) -> BTreeSet<ProcessId> {
        reduce(self.available(), self.need(), self.allocation(), &mut Untraced)
            .unfinished()
    }
}
