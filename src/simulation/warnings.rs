//! Advisory warnings surfaced alongside results
//!
//! None of these stop the computation; the inputs have already been clamped.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::config::SimulationConfig;
use crate::loan::{AmortizationStyle, Loan, MAX_SECONDARY_LOANS};
use crate::rates::MAX_DURATION_MONTHS;

/// Which loan a warning refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanRef {
    Primary,
    /// 0-based position among the secondary loans
    Secondary(usize),
}

impl fmt::Display for LoanRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanRef::Primary => write!(f, "loan 1"),
            LoanRef::Secondary(idx) => write!(f, "loan {}", idx + 2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    NonPositivePrincipal { loan: LoanRef },
    NonPositiveDuration { loan: LoanRef },
    /// Declared duration above the supported maximum, computed at the maximum
    DurationCapped { loan: LoanRef, max: u32 },
    /// Requested month-1 payment of the amortizing primary loan is below its month-1 interest
    PaymentBelowInterest { payment: f64, interest: f64 },
    /// Secondary loans beyond the supported count were left out
    IgnoredSecondaryLoans { count: usize },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::NonPositivePrincipal { loan } => write!(f, "principal of {} must be > 0", loan),
            Warning::NonPositiveDuration { loan } => write!(f, "duration of {} must be > 0 months", loan),
            Warning::DurationCapped { loan, max } => {
                write!(f, "duration of {} capped at {} months", loan, max)
            }
            Warning::PaymentBelowInterest { payment, interest } => write!(
                f,
                "monthly payment of loan 1 ({:.2}) is below its first month's interest ({:.2})",
                payment, interest
            ),
            Warning::IgnoredSecondaryLoans { count } => write!(
                f,
                "{} secondary loan(s) ignored, at most {} are supported",
                count, MAX_SECONDARY_LOANS
            ),
        }
    }
}

fn loan_warnings(loan: &Loan, which: LoanRef, out: &mut Vec<Warning>) {
    if !(loan.principal > 0.0) {
        out.push(Warning::NonPositivePrincipal { loan: which });
    }
    if loan.duration_months <= 0 {
        out.push(Warning::NonPositiveDuration { loan: which });
    }
    if loan.duration_months > MAX_DURATION_MONTHS as i64 {
        out.push(Warning::DurationCapped {
            loan: which,
            max: MAX_DURATION_MONTHS,
        });
    }
}

/// Collect every advisory warning for a configuration
pub fn collect_warnings(config: &SimulationConfig) -> Vec<Warning> {
    let mut warnings = Vec::new();

    loan_warnings(&config.primary, LoanRef::Primary, &mut warnings);

    if config.primary.style == AmortizationStyle::Amortizing {
        let terms = config.primary.terms();
        let interest = terms.principal * terms.monthly_rate;
        let payment = config.primary.effective_payment();
        if payment < interest - 1e-6 {
            warnings.push(Warning::PaymentBelowInterest { payment, interest });
        }
    }

    for (idx, loan) in config.secondary.iter().take(MAX_SECONDARY_LOANS).enumerate() {
        loan_warnings(loan, LoanRef::Secondary(idx), &mut warnings);
    }

    if config.secondary.len() > MAX_SECONDARY_LOANS {
        warnings.push(Warning::IgnoredSecondaryLoans {
            count: config.secondary.len() - MAX_SECONDARY_LOANS,
        });
    }

    warnings
}
