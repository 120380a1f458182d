//! Sweep the primary loan's rate over a range
//!
//! Runs one simulation per rate in parallel and writes the headline figures
//! of each run to CSV for comparison.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;

use credit_simulator::{ScenarioRunner, SimulationConfig};

/// Parallel sensitivity sweep over the primary annual rate
#[derive(Parser, Debug)]
#[command(name = "rate_sweep")]
struct Args {
    /// JSON configuration file
    #[arg(long, conflicts_with = "loans", required_unless_present = "loans")]
    config: Option<PathBuf>,

    /// Loans CSV file
    #[arg(long)]
    loans: Option<PathBuf>,

    /// First rate in percent
    #[arg(long, default_value = "1.0")]
    from: f64,

    /// Last rate in percent (inclusive)
    #[arg(long, default_value = "6.0")]
    to: f64,

    /// Rate increment in percent
    #[arg(long, default_value = "0.25")]
    step: f64,

    /// Output CSV path
    #[arg(long, default_value = "rate_sweep_output.csv")]
    output: PathBuf,
}

/// One line of the sweep output
#[derive(Debug, Serialize)]
struct SweepRow {
    #[serde(rename = "RatePct")]
    rate_pct: f64,
    #[serde(rename = "FirstMonthPayment")]
    first_month_payment: f64,
    #[serde(rename = "TotalInterest")]
    total_interest: f64,
    #[serde(rename = "TotalCost")]
    total_cost: f64,
    #[serde(rename = "PrimaryMonths")]
    primary_months: usize,
    #[serde(rename = "DurationDelta")]
    duration_delta: i64,
}

/// Most rates a single sweep runs
const MAX_SWEEP_POINTS: usize = 10_000;

fn sweep_rates(from: f64, to: f64, step: f64) -> Result<Vec<f64>> {
    if !(step > 0.0) || !from.is_finite() || !to.is_finite() || to < from {
        bail!("invalid sweep range {}..={} step {}", from, to, step);
    }
    let points = ((to - from) / step + 1e-9).floor() + 1.0;
    if points > MAX_SWEEP_POINTS as f64 {
        bail!("sweep of {} rates exceeds the limit of {}", points, MAX_SWEEP_POINTS);
    }
    let count = points as usize;
    Ok((0..count).map(|i| from + step * i as f64).collect())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    let config = match (&args.config, &args.loans) {
        (Some(path), _) => SimulationConfig::from_json_file(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        (None, Some(path)) => SimulationConfig::from_loans_csv(path)
            .with_context(|| format!("failed to load loans {}", path.display()))?,
        (None, None) => bail!("either --config or --loans is required"),
    };
    let runner = ScenarioRunner::new(config);
    let rates = sweep_rates(args.from, args.to, args.step)?;

    println!("Running {} simulations...", rates.len());
    let sim_start = Instant::now();
    let results = runner.run_rate_sweep(&rates);
    println!("Simulations complete in {:?}", sim_start.elapsed());

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    println!("{:>8} {:>14} {:>14} {:>8} {:>7}", "Rate%", "Month1", "Interest", "Months", "Delta");
    println!("{}", "-".repeat(55));
    for (&rate, sim) in rates.iter().zip(&results) {
        let summary = sim.summary();
        let row = SweepRow {
            rate_pct: rate,
            first_month_payment: summary.first_month_payment,
            total_interest: summary.total_interest,
            total_cost: summary.total_cost,
            primary_months: summary.primary_months,
            duration_delta: summary.duration_delta_months,
        };
        println!(
            "{:>8.2} {:>14.2} {:>14.2} {:>8} {:>+7}",
            row.rate_pct, row.first_month_payment, row.total_interest, row.primary_months, row.duration_delta
        );
        writer.serialize(&row)?;
    }
    writer.flush()?;

    println!("\nOutput written to {}", args.output.display());
    println!("Total time: {:?}", start.elapsed());
    Ok(())
}
