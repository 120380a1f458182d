//! Credit Simulator - Amortization and multi-loan smoothing engine
//!
//! This library provides:
//! - Monthly schedules for amortizing and interest-only (in fine) loans
//! - Alignment of up to two secondary loans on the primary loan's calendar
//! - Smoothing of the primary loan at constant total payment or constant duration
//! - Monthly and annual aggregation with per-loan tables
//! - Breakpoint summary of the payment regimes
//! - Batch scenarios over many configurations

pub mod error;
pub mod rates;
pub mod loan;
pub mod schedule;
pub mod smoothing;
pub mod aggregate;
pub mod breakpoints;
pub mod simulation;
pub mod scenario;

// Re-export commonly used types
pub use error::EngineError;
pub use loan::{AmortizationStyle, InsuranceBasis, Loan, YearMonth};
pub use schedule::{AlignedSchedule, Installment, Schedule, ScheduleGenerator};
pub use smoothing::{SmoothingMode, SmoothingOutcome};
pub use aggregate::{Granularity, PeriodRow, PeriodTotals};
pub use breakpoints::BreakpointRow;
pub use simulation::{LoanRef, LoanSchedules, Simulation, SimulationConfig, SimulationSummary, Warning};
pub use scenario::ScenarioRunner;
