use anyhow::Context;
use chaincore::report::SweepSummary;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use sweep::builder::run_sweep;
use sweep::config::SweepConfig;

mod sweep;

#[derive(Parser)]
#[command(author, version, about = "Parameter-sweep driver for the signal-chain core")]
struct Args {
    /// Load a sweep config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 64)]
    pulses: usize,
    #[arg(long, default_value_t = 128)]
    samples: usize,
    /// Disable memoization for this run
    #[arg(long, default_value_t = false)]
    no_cache: bool,
    /// Run the sweep cached and uncached and report both timings
    #[arg(long, default_value_t = false)]
    compare: bool,
    /// Write the sweep summary as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

fn write_report(path: &PathBuf, summary: &SweepSummary) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating report directory {}", parent.display()))?;
    }
    let encoded = summary.to_json().context("encoding sweep summary")?;
    fs::write(path, encoded).with_context(|| format!("writing report {}", path.display()))?;
    Ok(())
}

fn print_outcomes(summary: &SweepSummary) {
    println!(
        "{} -> {} combinations, {} cache hits, {} misses",
        summary.pipeline, summary.combinations, summary.cache_hits, summary.cache_misses
    );
    for outcome in &summary.outcomes {
        match &outcome.error {
            None => println!(
                "  [{}] shape {:?} peak power {:.3}",
                outcome.labels.join(", "),
                outcome.shape,
                outcome.peak_power
            ),
            Some(err) => println!("  [{}] failed: {}", outcome.labels.join(", "), err),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = if let Some(path) = args.config {
        SweepConfig::load(path)?
    } else {
        SweepConfig::from_args(args.pulses, args.samples, !args.no_cache)
    };
    if args.no_cache {
        config.enable_cache = false;
    }

    let summary = if args.compare {
        let mut cached = config.clone();
        cached.enable_cache = true;
        let started = Instant::now();
        let summary = run_sweep(&cached)?;
        let cached_elapsed = started.elapsed();

        let mut uncached = config.clone();
        uncached.enable_cache = false;
        let started = Instant::now();
        run_sweep(&uncached)?;
        let uncached_elapsed = started.elapsed();

        println!(
            "memoized run   {:>10.3?} ({} hits, {} misses)",
            cached_elapsed, summary.cache_hits, summary.cache_misses
        );
        println!("uncached run   {:>10.3?}", uncached_elapsed);
        summary
    } else {
        run_sweep(&config)?
    };

    print_outcomes(&summary);

    if let Some(path) = args.report {
        write_report(&path, &summary)?;
        println!("report written to {}", path.display());
    }

    Ok(())
}
