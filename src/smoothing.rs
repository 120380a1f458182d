//! Smoothing of the primary loan against its secondary loans
//!
//! Both modes replace the primary loan's payment stream so that the combined
//! monthly obligation (excluding insurance) follows a level policy:
//!
//! - **Constant payment**: the combined payment stays at its month-1 level.
//!   The primary loan absorbs every change in the secondary payments, so its
//!   payoff month moves earlier or later than declared.
//! - **Constant duration**: a single combined amount `T` is solved in closed
//!   form so that the primary balance reaches zero exactly at its declared term.
//!
//! Smoothing only applies to amortizing loans; see [`smoothing_eligible`].

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::loan::{Loan, LoanTerms};
use crate::schedule::{payments_at, AlignedSchedule, LoanState, Schedule};

/// Hard stop for constant-payment smoothing when the primary loan stalls
pub const MAX_SMOOTHED_MONTHS: u32 = 1200;

/// Smoothing policy applied to the primary loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingMode {
    /// Keep the combined payment at its month-1 level
    ConstantPayment,
    /// Keep the primary loan's declared duration
    ConstantDuration,
}

/// Whether smoothing can apply to this set of loans
///
/// Requires at least one secondary loan and no interest-only loan anywhere.
pub fn smoothing_eligible(primary: &Loan, secondary: &[Loan]) -> bool {
    !secondary.is_empty()
        && !primary.style.is_interest_only()
        && secondary.iter().all(|l| !l.style.is_interest_only())
}

/// Result of smoothing the primary loan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoothingOutcome {
    pub mode: SmoothingMode,

    /// Combined monthly payment (excluding insurance) the solver aims for
    pub target: f64,

    /// Replacement schedule of the primary loan
    pub schedule: Schedule,
}

impl SmoothingOutcome {
    /// Signed payoff shift against the unsmoothed schedule, in months
    pub fn duration_delta(&self, base: &Schedule) -> i64 {
        self.schedule.len() as i64 - base.len() as i64
    }
}

/// Solver for the primary loan's smoothed payment stream
///
/// Secondary schedules must already be aligned on the primary loan's axis.
/// Callers check [`smoothing_eligible`] first.
pub struct SmoothingSolver<'a> {
    terms: LoanTerms,
    base_payment: f64,
    secondary: &'a [AlignedSchedule],
}

impl<'a> SmoothingSolver<'a> {
    pub fn new(primary: &Loan, secondary: &'a [AlignedSchedule]) -> Self {
        Self {
            terms: primary.terms(),
            base_payment: primary.effective_payment(),
            secondary,
        }
    }

    pub fn solve(&self, mode: SmoothingMode) -> SmoothingOutcome {
        let (target, schedule) = match mode {
            SmoothingMode::ConstantPayment => self.constant_payment(),
            SmoothingMode::ConstantDuration => self.constant_duration(),
        };
        debug!(
            "smoothing {:?}: target {:.4}, primary runs {} of {} declared months",
            mode,
            target,
            schedule.len(),
            self.terms.months
        );
        SmoothingOutcome { mode, target, schedule }
    }

    /// Combined month-1 payment: the primary's own payment plus every secondary
    pub fn constant_payment_target(&self) -> f64 {
        self.base_payment + payments_at(self.secondary, 0)
    }

    fn constant_payment(&self) -> (f64, Schedule) {
        let target = self.constant_payment_target();
        let mut schedule = Schedule::new(self.terms.months);
        let mut state = LoanState::new(self.terms);

        while !state.is_repaid() {
            if state.month >= MAX_SMOOTHED_MONTHS {
                warn!(
                    "primary loan still owes {:.2} after {} smoothed months; secondary payments exceed the target {:.2}",
                    state.balance, MAX_SMOOTHED_MONTHS, target
                );
                break;
            }
            let others = payments_at(self.secondary, state.month as usize);
            let paid = (target - others)
                .max(state.interest_due())
                .min(state.payoff_amount());
            schedule.add_installment(state.settle(paid));
        }

        (target, schedule)
    }

    /// Closed-form combined payment that clears the primary balance at month N
    ///
    /// Months flagged in `frozen` pay interest only and carry the balance
    /// unchanged. With weights a_t = (1+r)^(number of unfrozen months after t),
    /// A = Σ a_t, B = Σ others_t·a_t over unfrozen t and G = (1+r)^(unfrozen
    /// count), T = (P·G + B) / A. With nothing frozen, a_t = (1+r)^(N−t).
    pub fn constant_duration_target(&self, others: &[f64], frozen: &[bool]) -> f64 {
        let growth = 1.0 + self.terms.monthly_rate;
        let mut weight = 1.0;
        let mut sum_weights = 0.0;
        let mut sum_others = 0.0;

        for (t, other) in others.iter().enumerate().rev() {
            if frozen.get(t).copied().unwrap_or(false) {
                continue;
            }
            sum_weights += weight;
            sum_others += other * weight;
            weight *= growth;
        }

        if sum_weights == 0.0 {
            return 0.0;
        }
        (self.terms.principal * weight + sum_others) / sum_weights
    }

    fn constant_duration(&self) -> (f64, Schedule) {
        let months = self.terms.months as usize;
        let others: Vec<f64> = (0..months).map(|t| payments_at(self.secondary, t)).collect();
        let mut frozen = vec![false; months];

        loop {
            let target = self.constant_duration_target(&others, &frozen);
            let (schedule, floored) = self.run_constant_duration(target, &others, &frozen);

            let newly_floored: Vec<usize> = floored
                .iter()
                .enumerate()
                .filter(|(t, f)| **f && !frozen[*t])
                .map(|(t, _)| t)
                .collect();
            if newly_floored.is_empty() {
                return (target, schedule);
            }

            debug!(
                "constant duration: {} months fall below interest at T = {:.4}, re-solving",
                newly_floored.len(),
                target
            );
            for t in newly_floored {
                frozen[t] = true;
            }
        }
    }

    /// Apply `target` month by month; also reports which months hit the interest floor
    fn run_constant_duration(&self, target: f64, others: &[f64], frozen: &[bool]) -> (Schedule, Vec<bool>) {
        let last = self.terms.months as usize - 1;
        let mut schedule = Schedule::new(self.terms.months);
        let mut state = LoanState::new(self.terms);
        let mut floored = vec![false; others.len()];

        for t in 0..=last {
            if state.is_repaid() {
                break;
            }
            let interest = state.interest_due();
            let paid = if t == last {
                state.payoff_amount()
            } else if frozen[t] {
                interest
            } else {
                let raw = target - others[t];
                if raw < interest {
                    floored[t] = true;
                }
                raw.max(interest).min(state.payoff_amount())
            };
            schedule.add_installment(state.settle(paid));
        }

        (schedule, floored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ScheduleGenerator;
    use approx::assert_abs_diff_eq;

    fn aligned(loan: &Loan, offset: i32) -> AlignedSchedule {
        AlignedSchedule::from_schedule(&ScheduleGenerator::for_loan(loan).generate(None), offset)
    }

    fn primary() -> Loan {
        Loan::amortizing(300_000.0, 3.5, 240)
    }

    #[test]
    fn test_eligibility() {
        let p = primary();
        let s = Loan::amortizing(100_000.0, 2.5, 120);
        assert!(smoothing_eligible(&p, &[s.clone()]));
        assert!(!smoothing_eligible(&p, &[]));
        assert!(!smoothing_eligible(&p, &[Loan::interest_only(50_000.0, 2.0, 60)]));
        assert!(!smoothing_eligible(&Loan::interest_only(300_000.0, 3.5, 240), &[s]));
    }

    #[test]
    fn test_constant_payment_keeps_month_one_total() {
        let p = primary();
        let secondary = Loan::amortizing(100_000.0, 2.5, 120);
        let others = vec![aligned(&secondary, 0)];
        let outcome = SmoothingSolver::new(&p, &others).solve(SmoothingMode::ConstantPayment);

        let standalone_primary = ScheduleGenerator::for_loan(&p).generate(None).first_payment();
        let standalone_secondary = others[0].payment_at(0);
        let combined = outcome.schedule.first_payment() + others[0].payment_at(0);
        assert_abs_diff_eq!(combined, standalone_primary + standalone_secondary, epsilon = 1e-6);
        assert_abs_diff_eq!(outcome.target, combined, epsilon = 1e-6);

        // While the secondary runs, the combined payment is level
        for idx in 0..119 {
            let total = outcome.schedule.installments[idx].payment + others[0].payment_at(idx);
            assert_abs_diff_eq!(total, outcome.target, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_constant_payment_shortens_primary_after_secondary_ends() {
        let p = primary();
        let others = vec![aligned(&Loan::amortizing(100_000.0, 2.5, 120), 0)];
        let outcome = SmoothingSolver::new(&p, &others).solve(SmoothingMode::ConstantPayment);
        let base = ScheduleGenerator::for_loan(&p).generate(None);

        assert!(outcome.duration_delta(&base) < 0);
        assert_abs_diff_eq!(outcome.schedule.final_balance(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_constant_payment_lengthens_primary_when_secondary_starts_later() {
        let p = primary();
        let others = vec![aligned(&Loan::amortizing(100_000.0, 2.5, 120), 24)];
        let outcome = SmoothingSolver::new(&p, &others).solve(SmoothingMode::ConstantPayment);
        let base = ScheduleGenerator::for_loan(&p).generate(None);

        assert!(outcome.duration_delta(&base) > 0);
        assert_abs_diff_eq!(outcome.schedule.final_balance(), 0.0, epsilon = 1e-6);
        for pair in outcome.schedule.installments.windows(2) {
            assert!(pair[1].balance <= pair[0].balance);
        }
    }

    #[test]
    fn test_constant_payment_floors_at_interest() {
        // Secondary payment dwarfs the target once it starts
        let p = Loan::amortizing(100_000.0, 6.0, 120);
        let others = vec![aligned(&Loan::amortizing(500_000.0, 1.0, 24), 12)];
        let outcome = SmoothingSolver::new(&p, &others).solve(SmoothingMode::ConstantPayment);

        let row = &outcome.schedule.installments[12];
        assert_abs_diff_eq!(row.payment, row.interest, epsilon = 1e-9);
        assert_eq!(row.principal, 0.0);
        assert_abs_diff_eq!(outcome.schedule.final_balance(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_constant_payment_stalls_at_month_cap() {
        // Secondary payment stays above the target for 999 months
        let p = Loan::amortizing(100_000.0, 6.0, 240);
        let others = vec![aligned(&Loan::amortizing(1_000_000.0, 1.0, 999), 12)];
        let outcome = SmoothingSolver::new(&p, &others).solve(SmoothingMode::ConstantPayment);
        let schedule = &outcome.schedule;

        assert_eq!(schedule.len(), MAX_SMOOTHED_MONTHS as usize);
        assert!(schedule.final_balance() > 0.0);

        // Interest only while the secondary runs, the balance carried unchanged
        let carried = schedule.installments[11].balance;
        for row in &schedule.installments[12..1011] {
            assert_abs_diff_eq!(row.principal, 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(row.payment, row.interest, epsilon = 1e-9);
            assert_abs_diff_eq!(row.balance, carried, epsilon = 1e-6);
        }
        assert!(schedule.installments[1011].principal > 0.0);
    }

    #[test]
    fn test_constant_duration_matches_closed_form() {
        let p = primary();
        let others = vec![aligned(&Loan::amortizing(100_000.0, 2.5, 120), 24)];
        let solver = SmoothingSolver::new(&p, &others);
        let outcome = solver.solve(SmoothingMode::ConstantDuration);

        let r = 0.035 / 12.0;
        let n = 240;
        let mut a = 0.0;
        let mut b = 0.0;
        for t in 1..=n {
            let w = (1.0f64 + r).powi(n - t);
            a += w;
            b += others[0].payment_at((t - 1) as usize) * w;
        }
        let expected = (300_000.0 * (1.0f64 + r).powi(n) + b) / a;
        assert_abs_diff_eq!(outcome.target, expected, epsilon = 1e-6);

        assert_eq!(outcome.schedule.len(), 240);
        assert_abs_diff_eq!(outcome.schedule.final_balance(), 0.0, epsilon = 1e-6);
        for idx in 0..239 {
            let total = outcome.schedule.installments[idx].payment + others[0].payment_at(idx);
            assert_abs_diff_eq!(total, outcome.target, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_constant_duration_preserves_term_for_many_layouts() {
        let p = primary();
        let layouts = [
            vec![(Loan::amortizing(100_000.0, 2.5, 120), 0)],
            vec![(Loan::amortizing(100_000.0, 2.5, 120), -36)],
            vec![(Loan::amortizing(80_000.0, 1.5, 60), 60), (Loan::amortizing(20_000.0, 0.0, 36), 200)],
            vec![(Loan::amortizing(400_000.0, 1.0, 24), 0)],
        ];

        for layout in layouts {
            let others: Vec<_> = layout.iter().map(|(l, off)| aligned(l, *off)).collect();
            let outcome = SmoothingSolver::new(&p, &others).solve(SmoothingMode::ConstantDuration);
            assert_eq!(outcome.schedule.len(), 240);
            assert_abs_diff_eq!(outcome.schedule.final_balance(), 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_constant_duration_refreezes_floored_months() {
        // A short, heavy secondary pushes the closed-form T below interest early on
        let p = Loan::amortizing(100_000.0, 3.0, 240);
        let others = vec![aligned(&Loan::amortizing(200_000.0, 1.0, 24), 0)];
        let solver = SmoothingSolver::new(&p, &others);
        let outcome = solver.solve(SmoothingMode::ConstantDuration);

        assert_eq!(outcome.schedule.len(), 240);
        assert_abs_diff_eq!(outcome.schedule.final_balance(), 0.0, epsilon = 1e-6);
        let first = &outcome.schedule.installments[0];
        assert_abs_diff_eq!(first.payment, first.interest, epsilon = 1e-9);

        // After the secondary ends the primary pays the target alone
        let later = &outcome.schedule.installments[100];
        assert_abs_diff_eq!(later.payment, outcome.target, epsilon = 1e-6);
    }

    #[test]
    fn test_duration_target_without_secondaries_is_annuity() {
        let p = Loan::amortizing(150_000.0, 4.2, 180);
        let solver = SmoothingSolver::new(&p, &[]);
        let others = vec![0.0; 180];
        let target = solver.constant_duration_target(&others, &vec![false; 180]);
        assert_abs_diff_eq!(target, p.terms().standard_payment(), epsilon = 1e-6);
    }
}
