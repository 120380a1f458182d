//! Installment and schedule output structures

use serde::{Deserialize, Serialize};

/// A single month of one loan's schedule
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Installment {
    /// 1-based month relative to the loan's own start
    pub month: u32,
    pub interest: f64,
    pub insurance: f64,
    /// Principal repaid this month
    pub principal: f64,
    /// Payment excluding insurance
    pub payment: f64,
    /// Payment including insurance
    pub payment_with_insurance: f64,
    /// Remaining balance after this installment
    pub balance: f64,
}

/// Month-by-month schedule of a single loan
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schedule {
    /// Duration the loan was declared with
    pub declared_months: u32,

    /// One installment per elapsed month; may stop before `declared_months`
    pub installments: Vec<Installment>,
}

impl Schedule {
    pub fn new(declared_months: u32) -> Self {
        Self {
            declared_months,
            installments: Vec::with_capacity(declared_months as usize),
        }
    }

    pub fn add_installment(&mut self, installment: Installment) {
        self.installments.push(installment);
    }

    /// Number of installments actually emitted
    pub fn len(&self) -> usize {
        self.installments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.installments.is_empty()
    }

    /// Installment for a 1-based month
    pub fn month(&self, month: u32) -> Option<&Installment> {
        (month as usize)
            .checked_sub(1)
            .and_then(|idx| self.installments.get(idx))
    }

    /// Month-1 payment excluding insurance, 0 for an empty schedule
    pub fn first_payment(&self) -> f64 {
        self.installments.first().map(|i| i.payment).unwrap_or(0.0)
    }

    pub fn final_balance(&self) -> f64 {
        self.installments.last().map(|i| i.balance).unwrap_or(0.0)
    }

    pub fn total_interest(&self) -> f64 {
        self.installments.iter().map(|i| i.interest).sum()
    }

    pub fn total_insurance(&self) -> f64 {
        self.installments.iter().map(|i| i.insurance).sum()
    }

    pub fn total_principal(&self) -> f64 {
        self.installments.iter().map(|i| i.principal).sum()
    }

    /// Signed difference between emitted and declared months
    pub fn duration_delta(&self) -> i64 {
        self.len() as i64 - self.declared_months as i64
    }
}
