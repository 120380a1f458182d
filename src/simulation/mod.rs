//! Simulation engine: one computation per configuration snapshot

mod config;
mod engine;
mod summary;
mod warnings;

pub use config::SimulationConfig;
pub use engine::{LoanSchedules, Simulation};
pub use summary::SimulationSummary;
pub use warnings::{collect_warnings, LoanRef, Warning};
