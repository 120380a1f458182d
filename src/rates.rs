//! Rate normalization and closed-form annuity helpers
//!
//! All recurrences in the engine work on a monthly decimal rate. User-facing
//! inputs are annual percentages (3.50 meaning 3.50%).

use crate::loan::AmortizationStyle;

/// Balance at or below this is treated as fully repaid
pub const BALANCE_EPSILON: f64 = 1e-8;

/// Convert an annual percentage into the monthly decimal rate
///
/// Negative and non-finite inputs are floored to zero.
pub fn monthly_rate(annual_pct: f64) -> f64 {
    if !annual_pct.is_finite() || annual_pct <= 0.0 {
        return 0.0;
    }
    (annual_pct / 100.0) / 12.0
}

/// Clamp a currency amount to a finite, non-negative value
pub fn sanitize_amount(amount: f64) -> f64 {
    if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        0.0
    }
}

/// Longest declared duration accepted, in months
pub const MAX_DURATION_MONTHS: u32 = 999;

/// Clamp a declared duration to `1..=MAX_DURATION_MONTHS`
pub fn sanitize_months(months: i64) -> u32 {
    months.clamp(1, MAX_DURATION_MONTHS as i64) as u32
}

/// (1+r)^−N without integer narrowing of N
fn discount_factor(monthly_rate: f64, months: u32) -> f64 {
    (1.0 + monthly_rate).powf(-f64::from(months))
}

/// Level payment that amortizes `principal` to zero in exactly `months` months
///
/// payment = P·r / (1 − (1+r)^−N), or P/N when r = 0.
pub fn annuity_payment(principal: f64, monthly_rate: f64, months: u32) -> f64 {
    if months == 0 {
        return 0.0;
    }
    if monthly_rate == 0.0 {
        return principal / months as f64;
    }
    principal * monthly_rate / (1.0 - discount_factor(monthly_rate, months))
}

/// Standard monthly payment (excluding insurance) for a loan style
///
/// Interest-only loans pay the interest on the initial principal.
pub fn standard_payment(
    style: AmortizationStyle,
    principal: f64,
    monthly_rate: f64,
    months: u32,
) -> f64 {
    match style {
        AmortizationStyle::Amortizing => annuity_payment(principal, monthly_rate, months),
        AmortizationStyle::InterestOnly => principal * monthly_rate,
    }
}

/// Largest whole-currency principal that `payment` services over `months`
///
/// Inverse of [`standard_payment`]. Returns `None` for a non-positive payment
/// and for an interest-only loan at a zero rate, where any principal works.
pub fn principal_for_payment(
    payment: f64,
    monthly_rate: f64,
    months: u32,
    style: AmortizationStyle,
) -> Option<f64> {
    if !payment.is_finite() || payment <= 0.0 {
        return None;
    }
    let months = months.max(1);
    let principal = match style {
        AmortizationStyle::Amortizing if monthly_rate == 0.0 => payment * months as f64,
        AmortizationStyle::Amortizing => {
            payment * (1.0 - discount_factor(monthly_rate, months)) / monthly_rate
        }
        AmortizationStyle::InterestOnly if monthly_rate == 0.0 => return None,
        AmortizationStyle::InterestOnly => payment / monthly_rate,
    };
    Some(principal.floor())
}
