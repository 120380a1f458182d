//! Single-loan schedule generation

use super::installments::Schedule;
use super::state::LoanState;
use crate::loan::{AmortizationStyle, Loan, LoanTerms};

/// Builds the unsmoothed schedule of one loan
#[derive(Debug, Clone)]
pub struct ScheduleGenerator {
    terms: LoanTerms,
}

impl ScheduleGenerator {
    pub fn new(terms: LoanTerms) -> Self {
        Self { terms }
    }

    /// Generator for a declared loan
    pub fn for_loan(loan: &Loan) -> Self {
        Self::new(loan.terms())
    }

    /// Generate the schedule, honoring `payment` when it is a positive amount
    ///
    /// Without a usable payment the standard payment for the style is used.
    pub fn generate(&self, payment: Option<f64>) -> Schedule {
        let payment = payment.filter(|p| p.is_finite() && *p > 0.0);
        match self.terms.style {
            AmortizationStyle::Amortizing => {
                self.amortizing(payment.unwrap_or_else(|| self.terms.standard_payment()))
            }
            AmortizationStyle::InterestOnly => self.interest_only(payment),
        }
    }

    fn amortizing(&self, payment: f64) -> Schedule {
        let mut schedule = Schedule::new(self.terms.months);
        let mut state = LoanState::new(self.terms);

        for _month in 1..=self.terms.months {
            if state.is_repaid() {
                break;
            }
            let paid = state.clamp_payment(payment);
            schedule.add_installment(state.settle(paid));
        }

        schedule
    }

    fn interest_only(&self, payment: Option<f64>) -> Schedule {
        let mut schedule = Schedule::new(self.terms.months);
        let mut state = LoanState::new(self.terms);
        let last = self.terms.months;

        for month in 1..=last {
            if state.is_repaid() {
                break;
            }
            let paid = if month == last {
                state.payoff_amount()
            } else {
                state.clamp_payment(payment.unwrap_or_else(|| state.interest_due()))
            };
            schedule.add_installment(state.settle(paid));
        }

        schedule
    }
}
