use anyhow::Context;
use rand::{rngs::StdRng, SeedableRng};
use teller::*;

/// A random generator of valid Banker's algorithm scenarios
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of processes
    #[arg(short, long, default_value_t = 5)]
    processes:  usize,

    /// Number of resource types
    #[arg(short, long, default_value_t = 3)]
    resources:  usize,

    /// Upper bound for any Max or Available entry
    #[arg(short, long, default_value_t = 10)]
    max_units:  Units,

    /// Seed, for reproducible output
    #[arg(short, long)]
    seed:       Option<u64>,

    /// Also draw a request (prevent mode)
    #[arg(long, default_value_t = false)]
    request:    bool,

    /// Path to output (stdout if absent)
    #[arg(short, long, value_parser = clap::value_parser!(PathBuf))]
    output:     Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_logging("scengen");
    let cli = Args::parse();
    let mut rng = match cli.seed {
        Some(s) => { StdRng::seed_from_u64(s) },
        None    => { StdRng::from_entropy() },
    };
    let cfg = GenConfig {
        processes:  cli.processes,
        resources:  cli.resources,
        max_units:  cli.max_units,
        request:    cli.request,
    };
    let scn = generate(&cfg, &mut rng);

    match cli.output {
        Some(path)  => {
            let fd = File::create(&path)
                .with_context(|| format!("Creating {}", path.display()))?;
            write_scenario(BufWriter::new(fd), &scn)?;
            tracing::info!(path = %path.display(), "scenario written");
        },
        None        => {
            write_scenario(std::io::stdout().lock(), &scn)?;
            println!();
        },
    }

    Ok(())
}
