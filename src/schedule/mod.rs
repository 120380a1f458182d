//! Per-loan schedules: generation, running state and axis alignment

mod state;
mod generator;
mod installments;
mod shift;

pub use state::LoanState;
pub use generator::ScheduleGenerator;
pub use installments::{Installment, Schedule};
pub use shift::{payments_at, AlignedSchedule};
