use std::fmt::Write as _;

use itertools::Itertools;
use bankcore::{fmt_sequence, Denial, RequestVerdict, TraceEvent, WaitForGraph};
use serde::Serialize;

use crate::*;

/// Knobs of the text report.
#[derive(Clone, Copy, Debug)]
pub struct ReportOptions {
    /// Include the step-by-step trace.
    pub trace: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self { trace: true }
    }
}

/// Renders an [Evaluation] for humans.
pub fn render_text(ev: &Evaluation, opts: ReportOptions) -> String {
    let mut out = String::new();
    render_need(&mut out, &ev.need);
    render_wait_for(&mut out, &ev.wait_for_graph);

    let _ = writeln!(out, "Result: {}", ev.summary());
    match &ev.outcome {
        Outcome::Detect(r)  => {
            if r.is_deadlocked {
                let _ = writeln!(out, "Completed before halting: {}", or_none(&fmt_sequence(&r.safe_sequence)));
            } else {
                let _ = writeln!(out, "Safe sequence: {}", fmt_sequence(&r.safe_sequence));
            }
        },
        Outcome::Prevent(v) => {
            let _ = writeln!(out, "{}", v.message());
            if let RequestVerdict::Denied { reason: Denial::Unsafe { completed, .. } } = v {
                let _ = writeln!(out, "Completed before halting: {}", or_none(&fmt_sequence(completed)));
            }
        },
    }

    if opts.trace && !ev.trace().is_empty() {
        let _ = writeln!(out, "\nSteps:");
        for (idx, e) in ev.trace().iter().enumerate() {
            let _ = writeln!(out, "{:>4}. {}", idx + 1, render_event(e));
        }
    }

    out
}

/// One line per trace step: caption, then the vectors involved.
pub fn render_event(e: &TraceEvent) -> String {
    match e {
        TraceEvent::Check { need, work, can_allocate, .. } => {
            format!(
                "{} | need {:?} | work {:?} | {}",
                e.label(),
                need,
                work,
                if *can_allocate { "yes" } else { "no" }
            )
        },
        TraceEvent::Grant { work, .. }
        | TraceEvent::Halt { work }     => {
            format!("{} | work {:?}", e.label(), work)
        },
    }
}

fn render_need(out: &mut String, need: &[Vector]) {
    let _ = writeln!(out, "Need:");
    let resources = need.first().map_or(0, |r| r.len());
    let header = (0..resources)
        .map(|j| format!("{:>5}", format!("R{}", j)))
        .join("");
    let _ = writeln!(out, "      {}", header);
    for (i, row) in need.iter().enumerate() {
        let cells = row.iter()
            .map(|v| format!("{:>5}", v))
            .join("");
        let _ = writeln!(out, "{:>5} {}", format!("P{}", i), cells);
    }
}

fn render_wait_for(out: &mut String, g: &WaitForGraph) {
    let _ = writeln!(out, "Wait-for graph (single-holder approximation, not a proof of circular wait):");
    for (p, blockers) in g.iter() {
        let targets = if blockers.is_empty() {
            String::from("-")
        } else {
            blockers.iter()
                .map(|b| format!("P{}", b))
                .join(", ")
        };
        let _ = writeln!(out, "  P{} -> {}", p, targets);
    }
    if let Some(c) = g.find_cycle() {
        let _ = writeln!(out, "  possible cycle: {}", fmt_sequence(&c));
    }
}

fn or_none(s: &str) -> &str {
    if s.is_empty() { "none" } else { s }
}

/// Machine-readable failure, the counterpart of a serialized [Evaluation].
#[derive(Serialize)]
pub struct ErrorReport<'a> {
    pub error:      &'a BankError,
    pub message:    String,
}

/// Serializes either side of an evaluation's result as pretty JSON.
pub fn render_json(res: &Result<Evaluation, BankError>) -> Result<String, serde_json::Error> {
    match res {
        Ok(ev)  => { serde_json::to_string_pretty(ev) },
        Err(e)  => {
            serde_json::to_string_pretty(&ErrorReport {
                error:      e,
                message:    e.to_string(),
            })
        },
    }
}
