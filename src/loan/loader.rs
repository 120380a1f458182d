//! Load loan declarations from CSV
//!
//! One row per loan. The `Role` column marks the single primary loan; every
//! other row is a secondary loan, in file order.

use std::path::Path;

use csv::Reader;

use super::{AmortizationStyle, InsuranceBasis, Loan, YearMonth};
use crate::error::EngineError;

/// Maximum number of secondary loans sharing the primary loan's axis
pub const MAX_SECONDARY_LOANS: usize = 2;

/// Raw CSV row
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Role")]
    role: String,
    #[serde(rename = "Principal")]
    principal: f64,
    #[serde(rename = "AnnualRatePct")]
    annual_rate_pct: f64,
    #[serde(rename = "InsuranceRatePct", default)]
    insurance_rate_pct: Option<f64>,
    #[serde(rename = "DurationMonths")]
    duration_months: i64,
    #[serde(rename = "Style", default)]
    style: Option<String>,
    #[serde(rename = "InsuranceBasis", default)]
    insurance_basis: Option<String>,
    #[serde(rename = "Start", default)]
    start: Option<String>,
    #[serde(rename = "PaymentOverride", default)]
    payment_override: Option<f64>,
}

/// Whether a row declares the primary loan
fn is_primary(role: &str) -> Result<bool, EngineError> {
    match role.trim().to_ascii_lowercase().as_str() {
        "primary" => Ok(true),
        "secondary" => Ok(false),
        other => Err(EngineError::UnknownRole(other.to_string())),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl CsvRow {
    fn to_loan(self) -> Result<(bool, Loan), EngineError> {
        let primary = is_primary(&self.role)?;

        let style = match non_empty(self.style) {
            Some(s) => s.parse()?,
            None => AmortizationStyle::default(),
        };
        let insurance_basis = match non_empty(self.insurance_basis) {
            Some(s) => s.parse()?,
            None => InsuranceBasis::default(),
        };
        let start = non_empty(self.start)
            .map(|s| s.parse::<YearMonth>())
            .transpose()?;

        Ok((
            primary,
            Loan {
                principal: self.principal,
                annual_rate_pct: self.annual_rate_pct,
                insurance_rate_pct: self.insurance_rate_pct.unwrap_or(0.0),
                duration_months: self.duration_months,
                style,
                insurance_basis,
                start,
                payment_override: self.payment_override,
            },
        ))
    }
}

/// Split parsed rows into the primary loan and its secondary loans
fn collect_loans(rows: Vec<(bool, Loan)>) -> Result<(Loan, Vec<Loan>), EngineError> {
    let primary_count = rows.iter().filter(|(p, _)| *p).count();
    if primary_count != 1 {
        return Err(EngineError::PrimaryCount(primary_count));
    }

    let mut primary = None;
    let mut secondary = Vec::new();
    for (is_primary, loan) in rows {
        if is_primary {
            primary = Some(loan);
        } else {
            secondary.push(loan);
        }
    }

    if secondary.len() > MAX_SECONDARY_LOANS {
        return Err(EngineError::TooManySecondaryLoans {
            max: MAX_SECONDARY_LOANS,
            found: secondary.len(),
        });
    }

    primary
        .map(|p| (p, secondary))
        .ok_or(EngineError::PrimaryCount(0))
}

/// Load the primary loan and its secondary loans from a CSV file
pub fn load_loans<P: AsRef<Path>>(path: P) -> Result<(Loan, Vec<Loan>), EngineError> {
    let mut reader = Reader::from_path(path)?;
    let rows = reader
        .deserialize::<CsvRow>()
        .map(|row| row.map_err(EngineError::from).and_then(CsvRow::to_loan))
        .collect::<Result<Vec<_>, _>>()?;
    collect_loans(rows)
}

/// Load loans from any reader (e.g., string buffer, request body)
pub fn load_loans_from_reader<R: std::io::Read>(reader: R) -> Result<(Loan, Vec<Loan>), EngineError> {
    let mut csv_reader = Reader::from_reader(reader);
    let rows = csv_reader
        .deserialize::<CsvRow>()
        .map(|row| row.map_err(EngineError::from).and_then(CsvRow::to_loan))
        .collect::<Result<Vec<_>, _>>()?;
    collect_loans(rows)
}
