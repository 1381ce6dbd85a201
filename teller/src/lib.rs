//! The collaborators around `bankcore`: getting scenarios in, getting
//! reports out, and making up scenarios for testing.

pub mod ingest;
pub mod report;
pub mod synth;

pub use std::{
    path::{Path, PathBuf},
    io::{BufRead, BufReader, BufWriter, Write},
    fs::File,
};
pub use clap::{Parser, ValueEnum};
pub use bankcore::{
    evaluate, BankError, Evaluation, Mode, Outcome, ProcessId, Scenario, Units, Vector,
};

pub use crate::{
    ingest::*,
    report::*,
    synth::*,
};

/// Supported input formats.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum InputFormat {
    /// A serialized [Scenario]
    Json,
    /// Line-oriented text, laid out like the input form
    Text,
}

/// Command-line choice of mode.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum ModeArg {
    /// Safety check and deadlock detection
    Detect,
    /// Banker's request test
    Prevent,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum OverrideError {
    #[error("Prevent mode needs a requesting process")]
    MissingProcess,
    #[error("Prevent mode needs a request vector")]
    MissingRequest,
    #[error("A process or request was given, but the mode is detect")]
    RequestInDetectMode,
}

/// Merges command-line mode parts into the scenario's own mode.
///
/// Command-line parts win. Without an explicit `mode`, giving a process
/// or a request on either side means prevent mode.
pub fn resolve_mode(
    file:       &Mode,
    mode:       Option<ModeArg>,
    process:    Option<ProcessId>,
    request:    Option<Vector>,
) -> Result<Mode, OverrideError> {
    let (file_process, file_request) = match file {
        Mode::Prevent { process, request }  => { (Some(*process), Some(request.clone())) },
        Mode::Detect                        => { (None, None) },
    };
    let prevent = match mode {
        Some(ModeArg::Prevent)  => { true },
        Some(ModeArg::Detect)   => {
            if process.is_some() || request.is_some() {
                return Err(OverrideError::RequestInDetectMode);
            }
            false
        },
        None                    => {
            file_process.is_some() || process.is_some() || request.is_some()
        },
    };
    if !prevent {
        return Ok(Mode::Detect);
    }
    let process = process
        .or(file_process)
        .ok_or(OverrideError::MissingProcess)?;
    let request = request
        .or(file_request)
        .ok_or(OverrideError::MissingRequest)?;

    Ok(Mode::Prevent { process, request })
}

/// Picks the right reader for `format` and reads one scenario.
pub fn read_from_path(path: PathBuf, format: InputFormat) -> Result<Scenario, IngestError> {
    match format {
        InputFormat::Json   => { JsonScenarioParser::new(path).read_scenario() },
        InputFormat::Text   => { FormScenarioParser::new(path).read_scenario() },
    }
}

/// Sets up `tracing` for the binaries. `RUST_LOG` wins if set; otherwise
/// the binary itself talks at `info` and the engine only warns. Logs go to
/// stderr, stdout is for the report.
pub fn init_logging(bin: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info,teller=info,bankcore=warn", bin).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
