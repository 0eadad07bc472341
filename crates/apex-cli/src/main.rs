//! Lap simulation driver binary.
//!
//! Runs a configured number of laps over a circuit (a JSON file or the
//! built-in Aspar circuit), writes one summary JSON per lap plus a run
//! aggregate, and exits non-zero on any configuration failure.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use apex::prelude::*;

/// Seed stream tag for per-lap weather draws.
const WEATHER_STREAM: u64 = 0x5745_4154_4845_5231;

const USAGE: &str = "\
apex - dual-memory racing perception lap simulator

USAGE:
    apex [OPTIONS]

OPTIONS:
    --laps N                Number of laps to simulate (default: 1)
    --out DIR               Output directory for summaries (default: out)
    --seed S                Base seed for all components (default: 42)
    --circuit PATH          Circuit JSON file (default: built-in Aspar)
    --frames-per-sector N   Frames simulated per sector (default: 30)
    --threshold X           Fast/slow confidence threshold (default: 0.85)
    --help                  Print this help and exit
";

#[derive(Debug)]
struct Args {
    laps: u64,
    out_dir: PathBuf,
    seed: u64,
    circuit_path: Option<PathBuf>,
    frames_per_sector: u64,
    threshold: f64,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            laps: 1,
            out_dir: PathBuf::from("out"),
            seed: 42,
            circuit_path: None,
            frames_per_sector: 30,
            threshold: 0.85,
        }
    }
}

fn parse_args() -> Result<Option<Args>> {
    let mut args = Args::default();
    let mut argv = std::env::args().skip(1);

    while let Some(flag) = argv.next() {
        let mut value = |name: &str| -> Result<String> {
            argv.next()
                .with_context(|| format!("{name} requires a value"))
        };
        match flag.as_str() {
            "--laps" => args.laps = value("--laps")?.parse().context("--laps must be a count")?,
            "--out" => args.out_dir = PathBuf::from(value("--out")?),
            "--seed" => args.seed = value("--seed")?.parse().context("--seed must be a u64")?,
            "--circuit" => args.circuit_path = Some(PathBuf::from(value("--circuit")?)),
            "--frames-per-sector" => {
                args.frames_per_sector = value("--frames-per-sector")?
                    .parse()
                    .context("--frames-per-sector must be a count")?
            }
            "--threshold" => {
                args.threshold = value("--threshold")?
                    .parse()
                    .context("--threshold must be a number")?
            }
            "--help" | "-h" => {
                print!("{USAGE}");
                return Ok(None);
            }
            other => bail!("unknown argument '{other}'\n\n{USAGE}"),
        }
    }
    if args.laps == 0 {
        bail!("--laps must be at least 1");
    }
    Ok(Some(args))
}

/// Whole-run aggregate written next to the per-lap summaries.
#[derive(Debug, Serialize)]
struct RunSummary {
    circuit: String,
    laps: u64,
    seed: u64,
    total_frames: u64,
    mean_lap_time_s: f64,
    anomalous_laps: u64,
    decision_stats: DecisionStats,
    static_store: StaticStoreStats,
    similarity_store: SimilarityStoreStats,
}

fn load_circuit(args: &Args) -> Result<CircuitConfig> {
    match &args.circuit_path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading circuit file {}", path.display()))?;
            let circuit = CircuitConfig::from_json_str(&text)
                .with_context(|| format!("parsing circuit file {}", path.display()))?;
            Ok(circuit)
        }
        None => Ok(CircuitConfig::aspar()),
    }
}

fn run(args: Args) -> Result<()> {
    let circuit = load_circuit(&args)?;
    let circuit_name = circuit.name.clone();
    tracing::info!(
        circuit = %circuit_name,
        sectors = circuit.sectors.len(),
        laps = args.laps,
        seed = args.seed,
        "starting simulation"
    );

    let mut driver = LapDriver::builder()
        .circuit(circuit)
        .seed(args.seed)
        .frames_per_sector(args.frames_per_sector)
        .confidence_threshold(args.threshold)
        .build()
        .context("building the lap driver")?;

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating output directory {}", args.out_dir.display()))?;

    let mut weather_rng = ChaCha8Rng::seed_from_u64(args.seed ^ WEATHER_STREAM);
    let mut total_frames = 0;
    let mut lap_time_sum = 0.0;
    let mut anomalous_laps = 0;

    for lap in 1..=args.laps {
        let weather = Weather::sample(&mut weather_rng);
        let summary = driver
            .run_lap(LapId(lap), weather)
            .with_context(|| format!("simulating lap {lap}"))?;

        total_frames += summary.total_frames;
        lap_time_sum += summary.performance_metrics.total_lap_time_s;
        if summary
            .per_sector_telemetry
            .iter()
            .any(|sector| sector.anomaly.is_some())
        {
            anomalous_laps += 1;
        }

        let path = args.out_dir.join(format!("lap_{lap:05}.json"));
        let json = serde_json::to_string_pretty(&summary).context("serializing lap summary")?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    }

    let run_summary = RunSummary {
        circuit: circuit_name,
        laps: args.laps,
        seed: args.seed,
        total_frames,
        mean_lap_time_s: lap_time_sum / args.laps as f64,
        anomalous_laps,
        decision_stats: driver.decision_stats().clone(),
        static_store: driver.static_store_stats().clone(),
        similarity_store: driver.similarity_stats(),
    };
    let path = args.out_dir.join("run_summary.json");
    let json = serde_json::to_string_pretty(&run_summary).context("serializing run summary")?;
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;

    tracing::info!(
        laps = args.laps,
        total_frames,
        fast_pct = run_summary.decision_stats.fast_pct(),
        fallbacks = run_summary.decision_stats.fallbacks,
        out = %args.out_dir.display(),
        "run complete"
    );
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => return ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_args_match_the_study() {
        let args = Args::default();
        assert_eq!(args.laps, 1);
        assert_eq!(args.seed, 42);
        assert_eq!(args.frames_per_sector, 30);
        assert_eq!(args.threshold, 0.85);
    }

    #[test]
    fn builtin_circuit_loads_without_a_file() {
        let circuit = load_circuit(&Args::default()).unwrap();
        assert_eq!(circuit.name, "Aspar Circuit");
        assert_eq!(circuit.sectors.len(), 8);
    }

    #[test]
    fn missing_circuit_file_is_an_error() {
        let args = Args {
            circuit_path: Some(PathBuf::from("/nonexistent/circuit.json")),
            ..Args::default()
        };
        assert!(load_circuit(&args).is_err());
    }
}
