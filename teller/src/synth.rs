use rand::Rng;

use crate::*;

/// Shape of the scenarios [generate] makes up.
#[derive(Clone, Copy, Debug)]
pub struct GenConfig {
    pub processes:  usize,
    pub resources:  usize,
    /// Upper bound (inclusive) for every Max and Available cell.
    pub max_units:  Units,
    /// Also draw a request, turning the scenario into a `prevent` one.
    pub request:    bool,
}

/// Makes up a scenario that passes validation: every Allocation cell is
/// drawn at or below its Max cell. Whether it is *safe* is up to luck.
///
/// Requests, when asked for, come from a random process and never exceed
/// that process' need nor what is available, so they are decided by the
/// safety check rather than turned down up front.
pub fn generate<R: Rng>(cfg: &GenConfig, rng: &mut R) -> Scenario {
    let available: Vector = (0..cfg.resources)
        .map(|_| rng.gen_range(0..=cfg.max_units))
        .collect();
    let max: Vec<Vector> = (0..cfg.processes)
        .map(|_| {
            (0..cfg.resources)
                .map(|_| rng.gen_range(0..=cfg.max_units))
                .collect()
        })
        .collect();
    let allocation: Vec<Vector> = max.iter()
        .map(|row| {
            row.iter()
                .map(|&m| rng.gen_range(0..=m))
                .collect()
        })
        .collect();

    let mode = if cfg.request && cfg.processes > 0 {
        let process = rng.gen_range(0..cfg.processes);
        let request = (0..cfg.resources)
            .map(|j| {
                let cap = (max[process][j] - allocation[process][j]).min(available[j]);
                rng.gen_range(0..=cap)
            })
            .collect();
        Mode::Prevent { process, request }
    } else { Mode::Detect };

    Scenario {
        processes:  cfg.processes,
        resources:  cfg.resources,
        available,
        max,
        allocation,
        mode,
    }
}

/// Writes a scenario in the format [JsonScenarioParser] reads.
pub fn write_scenario<W: Write>(w: W, scn: &Scenario) -> Result<(), serde_json::Error> {
    serde_json::to_writer_pretty(w, scn)
}
