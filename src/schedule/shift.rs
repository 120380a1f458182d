//! Alignment of independently dated schedules onto the primary loan's axis

use serde::{Deserialize, Serialize};

use super::installments::{Installment, Schedule};

/// A schedule re-indexed onto the shared month axis
///
/// Slot `i` holds the installment due in global month `i` (0-based, anchored
/// at the primary loan's start), or `None` when the loan is not running.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlignedSchedule {
    slots: Vec<Option<Installment>>,
}

impl AlignedSchedule {
    /// Place `schedule` on the axis, `offset` months after the axis start
    ///
    /// A negative offset means the loan started before the axis; its
    /// already-elapsed installments are dropped.
    pub fn from_schedule(schedule: &Schedule, offset: i32) -> Self {
        let slots: Vec<Option<Installment>> = schedule.installments.iter().copied().map(Some).collect();
        Self { slots }.shift(offset)
    }

    /// Shift by `offset` months: pad the front when positive, drop the front when negative
    pub fn shift(&self, offset: i32) -> Self {
        let slots = match offset {
            0 => self.slots.clone(),
            k if k > 0 => std::iter::repeat(None)
                .take(k as usize)
                .chain(self.slots.iter().copied())
                .collect(),
            k => self
                .slots
                .iter()
                .skip(k.unsigned_abs() as usize)
                .copied()
                .collect(),
        };
        Self { slots }
    }

    /// Length of the axis span this schedule covers, padding included
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn at(&self, index: usize) -> Option<&Installment> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Payment excluding insurance at `index`, 0 when the loan is not running
    pub fn payment_at(&self, index: usize) -> f64 {
        self.at(index).map(|i| i.payment).unwrap_or(0.0)
    }

    pub fn slots(&self) -> &[Option<Installment>] {
        &self.slots
    }

    /// First axis index where the loan is running
    pub fn first_active(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_some)
    }

    /// One past the last axis index where the loan is running
    pub fn end(&self) -> Option<usize> {
        self.slots.iter().rposition(Option::is_some).map(|i| i + 1)
    }
}

/// Sum of the payments of every schedule at axis index `index`
pub fn payments_at(schedules: &[AlignedSchedule], index: usize) -> f64 {
    schedules.iter().map(|s| s.payment_at(index)).sum()
}
