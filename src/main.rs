//! Credit Simulator CLI
//!
//! Command-line interface for loan schedules, smoothing and borrowing capacity

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use credit_simulator::rates::{monthly_rate, principal_for_payment, sanitize_months};
use credit_simulator::{AmortizationStyle, Granularity, Simulation, SimulationConfig, SmoothingMode};

/// Credit Simulator - loan amortization and multi-loan smoothing
#[derive(Parser)]
#[command(name = "credit-sim")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the schedules and tables for a set of loans
    Simulate(SimulateArgs),

    /// Largest principal a monthly payment can service
    Capacity(CapacityArgs),
}

#[derive(Args, Debug)]
struct SimulateArgs {
    /// JSON configuration file
    #[arg(long, conflicts_with = "loans", required_unless_present = "loans")]
    config: Option<PathBuf>,

    /// Loans CSV file (one row per loan, Role = primary|secondary)
    #[arg(long)]
    loans: Option<PathBuf>,

    /// Smoothing of the primary loan, overrides the configuration
    #[arg(long, value_enum)]
    smoothing: Option<SmoothingArg>,

    /// Show the annual table instead of the monthly one
    #[arg(long)]
    annual: bool,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct CapacityArgs {
    /// Monthly payment excluding insurance
    #[arg(long)]
    payment: f64,

    /// Annual nominal rate in percent (e.g. 3.5)
    #[arg(long)]
    rate: f64,

    /// Duration in months
    #[arg(long)]
    months: i64,

    /// Interest-only loan instead of amortizing
    #[arg(long)]
    interest_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SmoothingArg {
    ConstantPayment,
    ConstantDuration,
}

impl From<SmoothingArg> for SmoothingMode {
    fn from(arg: SmoothingArg) -> Self {
        match arg {
            SmoothingArg::ConstantPayment => SmoothingMode::ConstantPayment,
            SmoothingArg::ConstantDuration => SmoothingMode::ConstantDuration,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Simulate(args) => simulate(args),
        Commands::Capacity(args) => capacity(args),
    }
}

fn load_config(args: &SimulateArgs) -> Result<SimulationConfig> {
    let mut config = match (&args.config, &args.loans) {
        (Some(path), _) => SimulationConfig::from_json_file(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        (None, Some(path)) => SimulationConfig::from_loans_csv(path)
            .with_context(|| format!("failed to load loans {}", path.display()))?,
        (None, None) => bail!("either --config or --loans is required"),
    };

    if let Some(mode) = args.smoothing {
        config.smoothing = Some(mode.into());
    }
    if args.annual {
        config.granularity = Granularity::Annual;
    }
    Ok(config)
}

fn simulate(args: SimulateArgs) -> Result<()> {
    let config = load_config(&args)?;
    let sim = Simulation::run(&config);

    if args.json {
        let output = serde_json::json!({
            "schedules": sim.schedules(),
            "table": sim.period_table(),
            "breakpoints": sim.breakpoints(),
            "summary": sim.summary(),
            "warnings": sim.warnings(),
        });
        println!("{}", serde_json::to_string_pretty(&output).context("failed to serialize result")?);
        return Ok(());
    }

    for warning in sim.warnings() {
        println!("Warning: {}", warning);
    }

    let table = sim.period_table();
    println!("Combined table ({} rows, from {}):", table.len(), sim.start().month_label());
    println!(
        "{:>8} {:>12} {:>12} {:>12} {:>12} {:>14} {:>14}",
        "Period", "Interest", "Insurance", "Principal", "Payment", "Pay+Ins", "Balance"
    );
    println!("{}", "-".repeat(90));
    for row in &table {
        let t = &row.totals;
        println!(
            "{:>8} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>14.2} {:>14.2}",
            row.label, t.interest, t.insurance, t.principal, t.payment, t.payment_with_insurance, t.balance
        );
    }

    let breakpoints = sim.breakpoints();
    if !breakpoints.is_empty() {
        println!("\nPayment periods:");
        for row in &breakpoints {
            let secondary: Vec<String> = row.secondary.iter().map(|p| format!("{:>10.2}", p)).collect();
            println!("  {:<14} primary {:>10.2}  secondary {}", row.label(), row.primary, secondary.join(" "));
        }
    }

    let summary = sim.summary();
    println!("\nSummary:");
    println!("  First month payment: {:.2}", summary.first_month_payment);
    println!("  First month insurance: {:.2}", summary.first_month_insurance);
    println!("  Total interest: {:.2}", summary.total_interest);
    println!("  Total insurance: {:.2}", summary.total_insurance);
    println!("  Total cost of credit: {:.2}", summary.total_cost);
    println!(
        "  Primary duration: {} months ({:+} vs standard)",
        summary.primary_months, summary.duration_delta_months
    );
    if let Some(target) = summary.smoothing_target {
        println!("  Smoothing target: {:.2}", target);
    }
    if config.granularity == Granularity::Annual {
        println!("  Max annual payment: {:.2}", summary.max_annual_payment);
    }

    Ok(())
}

fn capacity(args: CapacityArgs) -> Result<()> {
    let style = if args.interest_only {
        AmortizationStyle::InterestOnly
    } else {
        AmortizationStyle::Amortizing
    };
    let months = sanitize_months(args.months);

    match principal_for_payment(args.payment, monthly_rate(args.rate), months, style) {
        Some(principal) => println!(
            "A payment of {:.2} over {} months at {}% services a principal of {:.0}",
            args.payment, months, args.rate, principal
        ),
        None => bail!("no finite principal for a payment of {:.2} at {}%", args.payment, args.rate),
    }
    Ok(())
}
