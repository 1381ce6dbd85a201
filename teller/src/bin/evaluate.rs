use anyhow::{bail, Context};
use teller::*;

/// Banker's algorithm safety and request evaluation
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to input
    #[arg(short, long, value_parser = clap::value_parser!(PathBuf))]
    input:      PathBuf,

    /// Input format
    #[arg(value_enum)]
    format:     InputFormat,

    /// Overrides the scenario's mode
    #[arg(short, long, value_enum)]
    mode:       Option<ModeArg>,

    /// Requesting process (prevent mode)
    #[arg(short, long)]
    process:    Option<ProcessId>,

    /// Request vector, whitespace-separated, e.g. "1 0 2" (prevent mode)
    #[arg(short, long)]
    request:    Option<String>,

    /// Emit JSON instead of the text report
    #[arg(long, default_value_t = false)]
    json:       bool,

    /// Leave the step-by-step trace out of the text report
    #[arg(long, default_value_t = false)]
    no_trace:   bool,
}

fn main() -> anyhow::Result<()> {
    init_logging("evaluate");
    let cli = Args::parse();
    let input_path = cli.input;
    if !(input_path.exists() && input_path.is_file()) {
        bail!("Invalid input path: {}", input_path.display());
    }
    let mut scn = read_from_path(input_path.clone(), cli.format)
        .with_context(|| format!("Reading {}", input_path.display()))?;

    let cli_request = cli.request
        .as_deref()
        .map(parse_vector)
        .transpose()
        .context("Parsing --request")?;
    scn.mode = resolve_mode(&scn.mode, cli.mode, cli.process, cli_request)?;
    tracing::info!(
        processes = scn.processes,
        resources = scn.resources,
        mode = ?scn.mode,
        "scenario loaded"
    );

    let res = evaluate(&scn);
    if cli.json {
        println!("{}", render_json(&res)?);
    } else {
        match &res {
            Ok(ev)  => {
                print!("{}", render_text(ev, ReportOptions { trace: !cli.no_trace }));
            },
            Err(e)  => { println!("Error: {}", e); },
        }
    }
    if let Err(e) = res {
        tracing::warn!("evaluation failed: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
