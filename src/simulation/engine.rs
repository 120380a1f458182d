//! The shared computation behind every query
//!
//! A [`Simulation`] is computed once from a [`SimulationConfig`] snapshot.
//! Schedules, the period table and the breakpoint table are then read from
//! it without recomputing anything.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::config::SimulationConfig;
use super::summary::SimulationSummary;
use super::warnings::{collect_warnings, LoanRef, Warning};
use crate::aggregate::{
    aggregate_monthly, axis_len, loan_months, period_table, roll_up_to_years, Granularity, MonthRow, PeriodRow,
};
use crate::breakpoints::{synthesize, BreakpointRow};
use crate::loan::{Loan, YearMonth, MAX_SECONDARY_LOANS};
use crate::schedule::{AlignedSchedule, Schedule, ScheduleGenerator};
use crate::smoothing::{smoothing_eligible, SmoothingOutcome, SmoothingSolver};

/// Every loan's schedule on the shared axis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanSchedules {
    pub start: YearMonth,
    /// Primary schedule before smoothing
    pub base_primary: Schedule,
    /// Primary schedule in use (smoothed when smoothing applied)
    pub primary: Schedule,
    /// Secondary schedules in their own month numbering
    pub secondary: Vec<Schedule>,
    /// Secondary schedules aligned on the primary loan's axis
    pub secondary_aligned: Vec<AlignedSchedule>,
}

/// Result of one computation over a configuration snapshot
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    start: YearMonth,
    schedules: LoanSchedules,
    primary_aligned: AlignedSchedule,
    smoothing: Option<SmoothingOutcome>,
    axis_len: usize,
    months: Vec<MonthRow>,
    warnings: Vec<Warning>,
}

impl Simulation {
    /// Run the full computation
    pub fn run(config: &SimulationConfig) -> Self {
        let start = config.anchor();
        let warnings = collect_warnings(config);
        for w in &warnings {
            warn!("{}", w);
        }

        let secondary_loans: &[Loan] = &config.secondary[..config.secondary.len().min(MAX_SECONDARY_LOANS)];

        let secondary: Vec<Schedule> = secondary_loans
            .iter()
            .map(|loan| ScheduleGenerator::for_loan(loan).generate(loan.payment_override))
            .collect();
        let secondary_aligned: Vec<AlignedSchedule> = secondary_loans
            .iter()
            .zip(&secondary)
            .map(|(loan, schedule)| {
                let offset = start.months_until(loan.start.unwrap_or(start));
                AlignedSchedule::from_schedule(schedule, offset)
            })
            .collect();

        let base_primary = ScheduleGenerator::for_loan(&config.primary).generate(config.primary.payment_override);

        let smoothing = match config.smoothing {
            Some(mode) if smoothing_eligible(&config.primary, secondary_loans) => {
                Some(SmoothingSolver::new(&config.primary, &secondary_aligned).solve(mode))
            }
            Some(mode) => {
                debug!("smoothing {:?} not applicable, using the standard schedule", mode);
                None
            }
            None => None,
        };

        let primary = smoothing
            .as_ref()
            .map(|outcome| outcome.schedule.clone())
            .unwrap_or_else(|| base_primary.clone());
        let primary_aligned = AlignedSchedule::from_schedule(&primary, 0);

        let axis_len = axis_len(&primary_aligned, &secondary_aligned, config.primary.terms().months);
        let months = aggregate_monthly(&primary_aligned, &secondary_aligned, axis_len, start);

        Self {
            config: config.clone(),
            start,
            schedules: LoanSchedules {
                start,
                base_primary,
                primary,
                secondary,
                secondary_aligned,
            },
            primary_aligned,
            smoothing,
            axis_len,
            months,
            warnings,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// First month of the shared axis
    pub fn start(&self) -> YearMonth {
        self.start
    }

    /// Number of months on the shared axis
    pub fn axis_len(&self) -> usize {
        self.axis_len
    }

    /// Per-loan schedules
    pub fn schedules(&self) -> &LoanSchedules {
        &self.schedules
    }

    /// Combined table at the configured granularity
    pub fn period_table(&self) -> Vec<PeriodRow> {
        self.period_table_at(self.config.granularity)
    }

    /// Combined table at an explicit granularity
    pub fn period_table_at(&self, granularity: Granularity) -> Vec<PeriodRow> {
        period_table(&self.months, granularity)
    }

    /// Combined monthly rows on the shared axis
    pub fn months(&self) -> &[MonthRow] {
        &self.months
    }

    /// One loan's own table on the shared axis
    pub fn loan_table(&self, loan: LoanRef, granularity: Granularity) -> Option<Vec<PeriodRow>> {
        let aligned = match loan {
            LoanRef::Primary => &self.primary_aligned,
            LoanRef::Secondary(idx) => self.schedules.secondary_aligned.get(idx)?,
        };
        Some(period_table(&loan_months(aligned, self.start), granularity))
    }

    /// Payment-regime table; empty without secondary loans
    pub fn breakpoints(&self) -> Vec<BreakpointRow> {
        if self.schedules.secondary_aligned.is_empty() {
            return Vec::new();
        }
        synthesize(
            &self.primary_aligned,
            &self.schedules.secondary_aligned,
            self.axis_len,
            self.start,
        )
    }

    pub fn smoothing(&self) -> Option<&SmoothingOutcome> {
        self.smoothing.as_ref()
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn summary(&self) -> SimulationSummary {
        let primary = &self.schedules.primary;
        let base = &self.schedules.base_primary;

        let total_interest: f64 = self.months.iter().map(|m| m.totals.interest).sum();
        let total_insurance: f64 = self.months.iter().map(|m| m.totals.insurance).sum();

        let max_annual_payment = match self.config.granularity {
            Granularity::Annual => roll_up_to_years(&self.months)
                .iter()
                .map(|y| y.totals.payment)
                .fold(0.0, f64::max),
            Granularity::Monthly => 0.0,
        };

        SimulationSummary {
            first_month_payment: self.months.first().map(|m| m.totals.payment).unwrap_or(0.0),
            first_month_insurance: primary.installments.first().map(|i| i.insurance).unwrap_or(0.0),
            primary_total_interest: primary.total_interest(),
            primary_total_insurance: primary.total_insurance(),
            total_interest,
            total_insurance,
            total_cost: total_interest + total_insurance,
            base_primary_months: base.len(),
            primary_months: primary.len(),
            duration_delta_months: primary.len() as i64 - base.len() as i64,
            smoothing_target: self.smoothing.as_ref().map(|o| o.target),
            max_annual_payment,
        }
    }
}
