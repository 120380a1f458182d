//! Period summary: the months where the set of running loans changes

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::loan::YearMonth;
use crate::schedule::AlignedSchedule;

/// Payments in force from one breakpoint until the next
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakpointRow {
    /// Axis index of the breakpoint
    pub index: usize,
    /// Calendar month the row applies from
    pub from: YearMonth,
    /// Primary loan payment excluding insurance
    pub primary: f64,
    /// Payment of each secondary loan, in declaration order
    pub secondary: Vec<f64>,
}

impl BreakpointRow {
    /// Human label, e.g. `from 01/2028`
    pub fn label(&self) -> String {
        format!("from {}", self.from.month_label())
    }

    fn same_payments(&self, other: &BreakpointRow) -> bool {
        self.primary == other.primary && self.secondary == other.secondary
    }
}

/// Axis indices where a secondary loan starts or ends, plus month 0
///
/// A loan that started before the axis counts as starting at 0. Its end is
/// one past its last running month. Only indices below `horizon` are kept.
pub fn breakpoint_indices(secondary: &[AlignedSchedule], horizon: usize) -> Vec<usize> {
    let mut points = BTreeSet::from([0usize]);
    for schedule in secondary {
        if let (Some(first), Some(end)) = (schedule.first_active(), schedule.end()) {
            points.insert(first);
            points.insert(end);
        }
    }
    points.into_iter().filter(|&idx| idx < horizon).collect()
}

/// Build the breakpoint table, merging consecutive rows with identical payments
pub fn synthesize(
    primary: &AlignedSchedule,
    secondary: &[AlignedSchedule],
    horizon: usize,
    start: YearMonth,
) -> Vec<BreakpointRow> {
    let mut rows: Vec<BreakpointRow> = Vec::new();

    for index in breakpoint_indices(secondary, horizon) {
        let row = BreakpointRow {
            index,
            from: start.add_months(index as i32),
            primary: primary.payment_at(index),
            secondary: secondary.iter().map(|s| s.payment_at(index)).collect(),
        };
        if rows.last().is_some_and(|last| last.same_payments(&row)) {
            continue;
        }
        rows.push(row);
    }

    rows
}
