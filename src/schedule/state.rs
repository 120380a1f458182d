//! Running balance of a loan between two installments

use super::installments::Installment;
use crate::loan::LoanTerms;
use crate::rates::BALANCE_EPSILON;

/// Balance carried from one month to the next
///
/// Every schedule (plain or smoothed) is produced by repeatedly choosing a
/// payment for the month and calling [`LoanState::settle`].
#[derive(Debug, Clone)]
pub struct LoanState {
    terms: LoanTerms,

    /// Months settled so far
    pub month: u32,

    /// Balance outstanding at the start of the next month
    pub balance: f64,
}

impl LoanState {
    pub fn new(terms: LoanTerms) -> Self {
        Self {
            terms,
            month: 0,
            balance: terms.principal,
        }
    }

    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    pub fn is_repaid(&self) -> bool {
        self.balance <= BALANCE_EPSILON
    }

    /// Interest due on the current balance
    pub fn interest_due(&self) -> f64 {
        self.balance * self.terms.monthly_rate
    }

    /// Largest payment the month accepts: interest plus the whole balance
    pub fn payoff_amount(&self) -> f64 {
        self.interest_due() + self.balance
    }

    /// Standard clamps: never above the payoff amount, never below interest when r > 0
    pub fn clamp_payment(&self, payment: f64) -> f64 {
        let interest = self.interest_due();
        let mut payment = payment.min(self.payoff_amount());
        if self.terms.monthly_rate > 0.0 && payment < interest {
            payment = interest;
        }
        payment
    }

    /// Record one month paying `payment` (excluding insurance) and advance
    pub fn settle(&mut self, payment: f64) -> Installment {
        let opening = self.balance;
        let interest = self.interest_due();
        let principal = if payment >= interest + opening {
            opening
        } else {
            (payment - interest).max(0.0).min(opening)
        };
        let closing = (opening - principal).max(0.0);
        let insurance = self.terms.insurance_due(opening);

        self.month += 1;
        self.balance = closing;

        Installment {
            month: self.month,
            interest,
            insurance,
            principal,
            payment,
            payment_with_insurance: payment + insurance,
            balance: closing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::{InsuranceBasis, Loan};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_settle_splits_payment() {
        let terms = Loan::amortizing(10_000.0, 12.0, 12)
            .with_insurance(1.2, InsuranceBasis::Declining)
            .terms();
        let mut state = LoanState::new(terms);

        let row = state.settle(600.0);
        assert_eq!(row.month, 1);
        assert_abs_diff_eq!(row.interest, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(row.principal, 500.0, epsilon = 1e-9);
        assert_abs_diff_eq!(row.insurance, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(row.payment_with_insurance, 610.0, epsilon = 1e-9);
        assert_abs_diff_eq!(state.balance, 9_500.0, epsilon = 1e-9);
    }

    #[test]
    fn test_clamp_payment_bounds() {
        let terms = Loan::amortizing(1_000.0, 12.0, 12).terms();
        let state = LoanState::new(terms);

        assert_abs_diff_eq!(state.clamp_payment(5_000.0), 1_010.0, epsilon = 1e-9);
        assert_abs_diff_eq!(state.clamp_payment(1.0), 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(state.clamp_payment(200.0), 200.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_rate_has_no_interest_floor() {
        let state = LoanState::new(Loan::amortizing(1_000.0, 0.0, 12).terms());
        assert_eq!(state.clamp_payment(0.0), 0.0);
        assert_eq!(state.clamp_payment(2_000.0), 1_000.0);
    }
}
