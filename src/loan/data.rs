//! Loan declarations and calendar month handling

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::rates::{monthly_rate, sanitize_amount, sanitize_months, standard_payment};

/// How the principal is repaid over the life of the loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmortizationStyle {
    /// Level payment covering interest plus a share of principal
    #[default]
    Amortizing,
    /// Interest only until the final month, which repays the full principal ("in fine")
    InterestOnly,
}

impl AmortizationStyle {
    pub fn is_interest_only(&self) -> bool {
        matches!(self, AmortizationStyle::InterestOnly)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AmortizationStyle::Amortizing => "amortizing",
            AmortizationStyle::InterestOnly => "interest_only",
        }
    }
}

impl FromStr for AmortizationStyle {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "amortizing" | "amortissable" => Ok(AmortizationStyle::Amortizing),
            "interest_only" | "interest-only" | "infine" | "in_fine" => Ok(AmortizationStyle::InterestOnly),
            other => Err(EngineError::UnknownStyle(other.to_string())),
        }
    }
}

/// Base the insurance premium is computed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsuranceBasis {
    /// Premium on the initial principal, identical every month
    Fixed,
    /// Premium on the balance outstanding at the start of each month
    #[default]
    Declining,
}

impl FromStr for InsuranceBasis {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" | "ci" => Ok(InsuranceBasis::Fixed),
            "declining" | "crd" => Ok(InsuranceBasis::Declining),
            other => Err(EngineError::UnknownInsuranceBasis(other.to_string())),
        }
    }
}

/// A calendar year and month, serialized as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    /// 1..=12
    month: u32,
}

impl YearMonth {
    /// Build from a year and a 1-based month; `None` if the month is out of range
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The current calendar month in local time
    pub fn current() -> Self {
        let today = Local::now().date_naive();
        Self {
            year: today.year(),
            month: today.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Month `k` months after this one (`k` may be negative)
    pub fn add_months(&self, k: i32) -> Self {
        let total = self.year * 12 + (self.month as i32 - 1) + k;
        Self {
            year: total.div_euclid(12),
            month: total.rem_euclid(12) as u32 + 1,
        }
    }

    /// Signed number of whole months from `self` to `other`
    pub fn months_until(&self, other: YearMonth) -> i32 {
        (other.year - self.year) * 12 + (other.month as i32 - self.month as i32)
    }

    /// Label used in monthly tables, e.g. `03/2026`
    pub fn month_label(&self) -> String {
        format!("{:02}/{}", self.month, self.year)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let date = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .map_err(|_| EngineError::InvalidYearMonth(s.to_string()))?;
        Ok(Self {
            year: date.year(),
            month: date.month(),
        })
    }
}

impl TryFrom<String> for YearMonth {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// A loan as declared by the user
///
/// Rates are annual percentages. Nothing is validated here: every field is
/// clamped to its numeric domain when the loan is turned into [`LoanTerms`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    /// Amount borrowed
    pub principal: f64,

    /// Annual nominal rate in percent
    pub annual_rate_pct: f64,

    /// Annual insurance rate in percent
    #[serde(default)]
    pub insurance_rate_pct: f64,

    /// Declared duration in months
    pub duration_months: i64,

    #[serde(default)]
    pub style: AmortizationStyle,

    #[serde(default)]
    pub insurance_basis: InsuranceBasis,

    /// First month of the loan; `None` means "same month as the primary loan"
    #[serde(default)]
    pub start: Option<YearMonth>,

    /// Explicit monthly payment excluding insurance, replacing the standard payment
    #[serde(default)]
    pub payment_override: Option<f64>,
}

impl Loan {
    /// Amortizing loan with no insurance and no override
    pub fn amortizing(principal: f64, annual_rate_pct: f64, duration_months: i64) -> Self {
        Self {
            principal,
            annual_rate_pct,
            insurance_rate_pct: 0.0,
            duration_months,
            style: AmortizationStyle::Amortizing,
            insurance_basis: InsuranceBasis::Declining,
            start: None,
            payment_override: None,
        }
    }

    /// Interest-only loan with no insurance and no override
    pub fn interest_only(principal: f64, annual_rate_pct: f64, duration_months: i64) -> Self {
        Self {
            style: AmortizationStyle::InterestOnly,
            ..Self::amortizing(principal, annual_rate_pct, duration_months)
        }
    }

    pub fn with_insurance(mut self, insurance_rate_pct: f64, basis: InsuranceBasis) -> Self {
        self.insurance_rate_pct = insurance_rate_pct;
        self.insurance_basis = basis;
        self
    }

    pub fn starting(mut self, start: YearMonth) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_payment(mut self, payment: f64) -> Self {
        self.payment_override = Some(payment);
        self
    }

    /// Normalized terms used by every recurrence
    pub fn terms(&self) -> LoanTerms {
        LoanTerms {
            principal: sanitize_amount(self.principal),
            monthly_rate: monthly_rate(self.annual_rate_pct),
            insurance_rate: monthly_rate(self.insurance_rate_pct),
            months: sanitize_months(self.duration_months),
            style: self.style,
            insurance_basis: self.insurance_basis,
        }
    }

    /// The override payment if it is usable, otherwise the standard payment
    pub fn effective_payment(&self) -> f64 {
        let terms = self.terms();
        self.payment_override
            .filter(|p| p.is_finite() && *p > 0.0)
            .unwrap_or_else(|| terms.standard_payment())
    }
}

/// Clamped, monthly-normalized loan parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanTerms {
    pub principal: f64,
    /// Monthly decimal interest rate
    pub monthly_rate: f64,
    /// Monthly decimal insurance rate
    pub insurance_rate: f64,
    /// Declared duration, at least 1
    pub months: u32,
    pub style: AmortizationStyle,
    pub insurance_basis: InsuranceBasis,
}

impl LoanTerms {
    pub fn standard_payment(&self) -> f64 {
        standard_payment(self.style, self.principal, self.monthly_rate, self.months)
    }

    /// Insurance due for a month that starts with `opening_balance`
    pub fn insurance_due(&self, opening_balance: f64) -> f64 {
        match self.insurance_basis {
            InsuranceBasis::Fixed => self.principal * self.insurance_rate,
            InsuranceBasis::Declining => opening_balance * self.insurance_rate,
        }
    }
}
