//! Headline figures of a simulation

use serde::{Deserialize, Serialize};

/// Summary statistics shown next to the tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    /// Combined month-1 payment excluding insurance
    pub first_month_payment: f64,
    /// Month-1 insurance premium of the primary loan
    pub first_month_insurance: f64,

    pub primary_total_interest: f64,
    pub primary_total_insurance: f64,

    /// Interest over the whole axis, all loans
    pub total_interest: f64,
    /// Insurance over the whole axis, all loans
    pub total_insurance: f64,
    /// Interest plus insurance, all loans
    pub total_cost: f64,

    /// Months of the unsmoothed primary schedule
    pub base_primary_months: usize,
    /// Months of the primary schedule actually used
    pub primary_months: usize,
    /// `primary_months - base_primary_months`
    pub duration_delta_months: i64,

    /// Smoothing target if smoothing applied
    pub smoothing_target: Option<f64>,

    /// Largest yearly combined payment excluding insurance (annual view only, else 0)
    pub max_annual_payment: f64,
}
