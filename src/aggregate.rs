//! Combination of aligned schedules into per-month and per-year tables

use serde::{Deserialize, Serialize};

use crate::loan::YearMonth;
use crate::schedule::{AlignedSchedule, Installment};

/// Reporting period of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Monthly,
    Annual,
}

/// Summed amounts for one period
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PeriodTotals {
    pub interest: f64,
    pub insurance: f64,
    pub principal: f64,
    /// Payment excluding insurance
    pub payment: f64,
    pub payment_with_insurance: f64,
    /// Remaining balance at the end of the period
    pub balance: f64,
}

impl PeriodTotals {
    /// Add one installment's flows and balance
    pub fn add_installment(&mut self, row: &Installment) {
        self.interest += row.interest;
        self.insurance += row.insurance;
        self.principal += row.principal;
        self.payment += row.payment;
        self.payment_with_insurance += row.payment_with_insurance;
        self.balance += row.balance;
    }

    /// Add another period's flows; the balance is replaced, not summed
    fn accumulate_flows(&mut self, other: &PeriodTotals) {
        self.interest += other.interest;
        self.insurance += other.insurance;
        self.principal += other.principal;
        self.payment += other.payment;
        self.payment_with_insurance += other.payment_with_insurance;
        self.balance = other.balance;
    }
}

/// Totals of one calendar month on the shared axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthRow {
    pub month: YearMonth,
    #[serde(flatten)]
    pub totals: PeriodTotals,
}

/// A labelled row of a monthly or annual table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRow {
    /// `MM/YYYY` for monthly rows, `YYYY` for annual rows
    pub label: String,
    #[serde(flatten)]
    pub totals: PeriodTotals,
}

/// Number of months on the shared axis
///
/// Covers the longest aligned schedule and at least the primary loan's
/// declared duration.
pub fn axis_len(primary: &AlignedSchedule, secondary: &[AlignedSchedule], declared_months: u32) -> usize {
    secondary
        .iter()
        .map(AlignedSchedule::len)
        .chain([primary.len(), declared_months as usize])
        .max()
        .unwrap_or(0)
}

/// Field-wise monthly sums across every loan running at each axis index
///
/// Absent loans contribute zero. The balance is the sum of the running
/// loans' balances.
pub fn aggregate_monthly(
    primary: &AlignedSchedule,
    secondary: &[AlignedSchedule],
    axis_len: usize,
    start: YearMonth,
) -> Vec<MonthRow> {
    (0..axis_len)
        .map(|idx| {
            let mut totals = PeriodTotals::default();
            for schedule in std::iter::once(primary).chain(secondary) {
                if let Some(row) = schedule.at(idx) {
                    totals.add_installment(row);
                }
            }
            MonthRow {
                month: start.add_months(idx as i32),
                totals,
            }
        })
        .collect()
}

/// Months of a single loan on the shared axis, skipping months it is not running
pub fn loan_months(schedule: &AlignedSchedule, start: YearMonth) -> Vec<MonthRow> {
    schedule
        .slots()
        .iter()
        .enumerate()
        .filter_map(|(idx, slot)| {
            slot.as_ref().map(|row| {
                let mut totals = PeriodTotals::default();
                totals.add_installment(row);
                MonthRow {
                    month: start.add_months(idx as i32),
                    totals,
                }
            })
        })
        .collect()
}

/// Roll months up into calendar years
///
/// Flows are summed within each year; the balance is the one of the last
/// month present in that year.
pub fn roll_up_to_years(months: &[MonthRow]) -> Vec<PeriodRow> {
    let mut years: Vec<(i32, PeriodTotals)> = Vec::new();

    for row in months {
        let year = row.month.year();
        match years.last_mut() {
            Some((current, totals)) if *current == year => totals.accumulate_flows(&row.totals),
            _ => {
                let mut totals = PeriodTotals::default();
                totals.accumulate_flows(&row.totals);
                years.push((year, totals));
            }
        }
    }

    years
        .into_iter()
        .map(|(year, totals)| PeriodRow {
            label: year.to_string(),
            totals,
        })
        .collect()
}

/// Render months as a table at the requested granularity
pub fn period_table(months: &[MonthRow], granularity: Granularity) -> Vec<PeriodRow> {
    match granularity {
        Granularity::Monthly => months
            .iter()
            .map(|row| PeriodRow {
                label: row.month.month_label(),
                totals: row.totals,
            })
            .collect(),
        Granularity::Annual => roll_up_to_years(months),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::{InsuranceBasis, Loan};
    use crate::schedule::ScheduleGenerator;
    use approx::assert_abs_diff_eq;

    fn aligned(loan: &Loan, offset: i32) -> AlignedSchedule {
        AlignedSchedule::from_schedule(&ScheduleGenerator::for_loan(loan).generate(None), offset)
    }

    fn start() -> YearMonth {
        YearMonth::new(2026, 4).unwrap()
    }

    #[test]
    fn test_axis_len() {
        let primary = aligned(&Loan::amortizing(100_000.0, 2.0, 120), 0);
        let late = aligned(&Loan::amortizing(10_000.0, 2.0, 60), 100);
        assert_eq!(axis_len(&primary, &[], 120), 120);
        assert_eq!(axis_len(&primary, &[late], 120), 160);

        let early_payoff = aligned(&Loan::amortizing(1_000.0, 0.0, 120).with_payment(500.0), 0);
        assert_eq!(axis_len(&early_payoff, &[], 120), 120);
    }

    #[test]
    fn test_monthly_sums_running_loans() {
        let primary = aligned(
            &Loan::amortizing(100_000.0, 2.0, 120).with_insurance(0.3, InsuranceBasis::Fixed),
            0,
        );
        let secondary = aligned(&Loan::amortizing(20_000.0, 1.0, 24), 6);
        let len = axis_len(&primary, &[secondary.clone()], 120);
        let months = aggregate_monthly(&primary, &[secondary.clone()], len, start());

        assert_eq!(months.len(), 120);
        assert_eq!(months[0].month, start());
        assert_eq!(months[0].totals.payment, primary.payment_at(0));

        let p = primary.at(10).unwrap();
        let s = secondary.at(10).unwrap();
        let row = &months[10].totals;
        assert_abs_diff_eq!(row.interest, p.interest + s.interest, epsilon = 1e-9);
        assert_abs_diff_eq!(row.insurance, p.insurance, epsilon = 1e-9);
        assert_abs_diff_eq!(row.principal, p.principal + s.principal, epsilon = 1e-9);
        assert_abs_diff_eq!(row.payment, p.payment + s.payment, epsilon = 1e-9);
        assert_abs_diff_eq!(row.payment_with_insurance, p.payment_with_insurance + s.payment_with_insurance, epsilon = 1e-9);
        assert_abs_diff_eq!(row.balance, p.balance + s.balance, epsilon = 1e-9);

        // Secondary finished at index 29
        assert_eq!(months[30].totals.payment, primary.payment_at(30));
    }

    #[test]
    fn test_annual_roll_up() {
        let primary = aligned(&Loan::amortizing(12_000.0, 0.0, 12), 0);
        let months = aggregate_monthly(&primary, &[], 12, start());
        let years = roll_up_to_years(&months);

        // April..December 2026, then January..March 2027
        assert_eq!(years.len(), 2);
        assert_eq!(years[0].label, "2026");
        assert_abs_diff_eq!(years[0].totals.payment, 9_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(years[0].totals.balance, 3_000.0, epsilon = 1e-9);
        assert_eq!(years[1].label, "2027");
        assert_abs_diff_eq!(years[1].totals.principal, 3_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(years[1].totals.balance, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_period_table_labels() {
        let primary = aligned(&Loan::amortizing(12_000.0, 0.0, 12), 0);
        let months = aggregate_monthly(&primary, &[], 12, start());

        let monthly = period_table(&months, Granularity::Monthly);
        assert_eq!(monthly.len(), 12);
        assert_eq!(monthly[0].label, "04/2026");
        assert_eq!(monthly[11].label, "03/2027");

        let annual = period_table(&months, Granularity::Annual);
        assert_eq!(annual.iter().map(|r| r.label.as_str()).collect::<Vec<_>>(), ["2026", "2027"]);
    }

    #[test]
    fn test_loan_months_skip_absent_slots() {
        let secondary = aligned(&Loan::amortizing(6_000.0, 0.0, 6), 9);
        let months = loan_months(&secondary, start());

        assert_eq!(months.len(), 6);
        assert_eq!(months[0].month, YearMonth::new(2027, 1).unwrap());

        let years = roll_up_to_years(&months);
        assert_eq!(years.len(), 1);
        assert_abs_diff_eq!(years[0].totals.payment, 6_000.0, epsilon = 1e-9);
    }
}
