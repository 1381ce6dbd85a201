use crate::utils::*;

/// What the caller wants to know about a state. Serialized scenarios
/// always carry an explicit `"mode"` key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Mode {
    /// Is the state safe, and if not, who is stuck?
    Detect,
    /// May `process` be granted `request`?
    Prevent {
        process:    ProcessId,
        request:    Vector,
    },
}

/// Already-parsed input to one evaluation. Parsing text into one of
/// these is the ingestion side's business.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub processes:  usize,
    pub resources:  usize,
    pub available:  Vector,
    pub max:        Matrix,
    pub allocation: Matrix,
    #[serde(flatten)]
    pub mode:       Mode,
}

impl Scenario {
    /// Validates and freezes the state part of the scenario.
    pub fn snapshot(&self) -> Result<Snapshot, ValidationError> {
        Snapshot::new(
            self.processes,
            self.resources,
            self.available.clone(),
            self.max.clone(),
            self.allocation.clone(),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Outcome {
    Detect(DeadlockReport),
    Prevent(RequestVerdict),
}

/// Everything the presentation side gets back from one evaluation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// The state is safe (detect) or the request was granted (prevent).
    pub is_safe:        bool,
    /// Only set in prevent mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granted:        Option<bool>,
    pub need:           Matrix,
    /// Always that of the real state, in both modes.
    pub wait_for_graph: WaitForGraph,
    pub outcome:        Outcome,
}

impl Evaluation {
    /// `true` if the state is safe (detect) or the request was granted
    /// (prevent).
    #[inline]
    pub fn is_safe(&self) -> bool {
        self.is_safe
    }

    pub fn safe_sequence(&self) -> &[ProcessId] {
        match &self.outcome {
            Outcome::Detect(r)  => { r.safe_sequence.as_slice() },
            Outcome::Prevent(v) => { v.safe_sequence() },
        }
    }

    pub fn trace(&self) -> &[TraceEvent] {
        match &self.outcome {
            Outcome::Detect(r)  => { r.trace.as_slice() },
            Outcome::Prevent(v) => { v.trace() },
        }
    }

    /// Headline for display.
    pub fn summary(&self) -> String {
        match &self.outcome {
            Outcome::Detect(r)  => { r.summary() },
            Outcome::Prevent(v) => { String::from(v.summary()) },
        }
    }
}

/// One full evaluation: validate, derive, then detect or test the
/// request. Nothing is kept between calls.
pub fn evaluate(scenario: &Scenario) -> Result<Evaluation, BankError> {
    let snap = scenario.snapshot()?;
    debug!(
        processes = snap.processes(),
        resources = snap.resources(),
        mode = ?scenario.mode,
        "evaluating"
    );
    let wait_for_graph = snap.wait_for_graph();
    let outcome = match &scenario.mode {
        Mode::Detect    => {
            Outcome::Detect(snap.detect_deadlock())
        },
        Mode::Prevent { process, request }  => {
            Outcome::Prevent(snap.evaluate_request(*process, request)?)
        },
    };

    let (is_safe, granted) = match &outcome {
        Outcome::Detect(r)  => { (r.is_safe(), None) },
        Outcome::Prevent(v) => { (v.is_granted(), Some(v.is_granted())) },
    };

    Ok(Evaluation {
        is_safe,
        granted,
        need:   snap.need().clone(),
        wait_for_graph,
        outcome,
    })
}
