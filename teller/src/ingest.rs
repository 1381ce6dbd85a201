use thiserror::Error;
use tracing::debug;

use crate::*;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed JSON scenario: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Line {line}: {message}")]
    Parse {
        line:       usize,
        message:    String,
    },
    #[error("Missing field: {0}")]
    Missing(&'static str),
}

/// Defines the interface for reading scenarios.
///
/// Whatever the source looks like, what comes out is a fully typed
/// [Scenario]. Shape and `Allocation ≤ Max` checks are *not* done here;
/// `bankcore` does those.
pub trait ScenarioReader {
    fn read_scenario(&self) -> Result<Scenario, IngestError>;
}

/// Reads a serialized [Scenario], the same format `scengen` writes.
pub struct JsonScenarioParser {
    pub path: PathBuf,
}

impl JsonScenarioParser {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
        }
    }
}

impl ScenarioReader for JsonScenarioParser {
    fn read_scenario(&self) -> Result<Scenario, IngestError> {
        let reader = BufReader::new(File::open(&self.path)?);
        let scn = serde_json::from_reader::<BufReader<File>, Scenario>(reader)?;
        debug!(path = ?self.path, "read JSON scenario");

        Ok(scn)
    }
}

/// Reads the plain-text layout of the input form. Keys come first on a
/// line, values follow separated by whitespace; `max` and `allocation`
/// take one row per process on the lines right after them. Blank lines
/// and lines starting with `#` are skipped.
///
/// ```text
/// processes 2
/// resources 1
/// available 1
/// max
/// 2
/// 1
/// allocation
/// 1
/// 0
/// mode prevent
/// request_process 1
/// request 1
/// ```
///
/// `mode` defaults to `detect`. In `prevent` mode both `request_process`
/// and `request` are mandatory.
pub struct FormScenarioParser {
    pub path: PathBuf,
}

impl FormScenarioParser {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
        }
    }
}

impl ScenarioReader for FormScenarioParser {
    fn read_scenario(&self) -> Result<Scenario, IngestError> {
        let reader = BufReader::new(File::open(&self.path)?);
        let scn = parse_form(reader)?;
        debug!(path = ?self.path, "read text scenario");

        Ok(scn)
    }
}

/// The workhorse behind [FormScenarioParser], usable on any reader.
pub fn parse_form<R: BufRead>(reader: R) -> Result<Scenario, IngestError> {
    let mut processes: Option<usize> = None;
    let mut resources: Option<usize> = None;
    let mut available: Option<Vector> = None;
    let mut max: Option<Vec<Vector>> = None;
    let mut allocation: Option<Vec<Vector>> = None;
    let mut prevent = false;
    let mut request_process: Option<ProcessId> = None;
    let mut request: Option<Vector> = None;

    let mut lines = reader.lines()
        .enumerate()
        .map(|(idx, l)| (idx + 1, l))
        .filter(|(_, l)| {
            l.as_ref()
                .map_or(true, |txt| !(txt.trim().is_empty() || txt.trim_start().starts_with('#')))
        });

    while let Some((line, txt)) = lines.next() {
        let txt = txt?;
        let mut words = txt.split_whitespace();
        // Filtered above, there is at least one word.
        let key = words.next().unwrap_or_default();
        let rest: Vec<&str> = words.collect();
        match key {
            "processes"         => { processes = Some(single(&rest, line)?); },
            "resources"         => { resources = Some(single(&rest, line)?); },
            "available"         => { available = Some(numbers(&rest, line)?); },
            "request_process"   => { request_process = Some(single(&rest, line)?); },
            "request"           => { request = Some(numbers(&rest, line)?); },
            "mode"              => {
                prevent = match rest.as_slice() {
                    ["detect"]  => { false },
                    ["prevent"] => { true },
                    _           => {
                        return Err(IngestError::Parse {
                            line,
                            message: String::from("mode must be either 'detect' or 'prevent'"),
                        });
                    }
                };
            },
            "max" | "allocation"    => {
                let rows = processes.ok_or_else(|| IngestError::Parse {
                    line,
                    message: format!("'{}' given before 'processes'", key),
                })?;
                let mut m = Vec::with_capacity(rows);
                for _ in 0..rows {
                    match lines.next() {
                        Some((row_line, row)) => { m.push(numbers_str(&row?, row_line)?); },
                        None    => {
                            return Err(IngestError::Parse {
                                line,
                                message: format!("'{}' expects {} rows", key, rows),
                            });
                        }
                    }
                }
                if key == "max" { max = Some(m); } else { allocation = Some(m); }
            },
            other   => {
                return Err(IngestError::Parse {
                    line,
                    message: format!("unknown key '{}'", other),
                });
            }
        }
    }

    let mode = if prevent {
        Mode::Prevent {
            process: request_process.ok_or(IngestError::Missing("request_process"))?,
            request: request.ok_or(IngestError::Missing("request"))?,
        }
    } else { Mode::Detect };

    Ok(Scenario {
        processes:  processes.ok_or(IngestError::Missing("processes"))?,
        resources:  resources.ok_or(IngestError::Missing("resources"))?,
        available:  available.ok_or(IngestError::Missing("available"))?,
        max:        max.ok_or(IngestError::Missing("max"))?,
        allocation: allocation.ok_or(IngestError::Missing("allocation"))?,
        mode,
    })
}

/// Parses a whitespace-separated vector, e.g. `"1 0 2"`.
pub fn parse_vector(txt: &str) -> Result<Vector, IngestError> {
    numbers_str(txt, 1)
}

fn number(word: &str, line: usize) -> Result<Units, IngestError> {
    word.parse::<Units>()
        .map_err(|_| IngestError::Parse {
            line,
            message: format!("'{}' is not a non-negative integer", word),
        })
}

fn numbers(words: &[&str], line: usize) -> Result<Vector, IngestError> {
    words.iter()
        .map(|w| number(w, line))
        .collect()
}

fn numbers_str(txt: &str, line: usize) -> Result<Vector, IngestError> {
    txt.split_whitespace()
        .map(|w| number(w, line))
        .collect()
}

fn single(words: &[&str], line: usize) -> Result<Units, IngestError> {
    match words {
        [w] => { number(w, line) },
        _   => {
            Err(IngestError::Parse {
                line,
                message: format!("expected exactly one value, found {}", words.len()),
            })
        }
    }
}
