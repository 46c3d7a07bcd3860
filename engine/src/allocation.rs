//! Allocation reconciliation
//!
//! Classifies how completely the payor/schedule allocation matrix covers
//! each row (split payor) and column (schedule). A valid allocation set is
//! a bipartite exact cover: every schedule column and every payor row sums
//! to its target amount simultaneously, with a single allocation row
//! participating in both sums.
//!
//! This module only classifies and reports; constructing allocations is a
//! user action performed through the store. At most one row exists per
//! (schedule, payor) pair — the store rejects duplicates — and the sums
//! here are correct regardless.

use serde::{Deserialize, Serialize};
use shared::{PaymentSchedule, SchedulePayorAllocation, SplitPayor};

/// Coverage classification for one row or column
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationState {
    /// Allocated exactly the target amount
    Complete,
    /// Allocated less than the target amount
    Partial,
    /// Allocated more than the target amount
    Overflow,
}

/// Coverage of a single payor or schedule
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AllocationStatus {
    pub state: AllocationState,
    pub total_allocated: i64,
    /// Target amount minus allocated; negative on overflow
    pub remaining: i64,
}

impl AllocationStatus {
    fn classify(target: i64, total_allocated: i64) -> Self {
        let remaining = target - total_allocated;
        let state = if remaining == 0 {
            AllocationState::Complete
        } else if remaining < 0 {
            AllocationState::Overflow
        } else {
            AllocationState::Partial
        };
        Self {
            state,
            total_allocated,
            remaining,
        }
    }
}

/// Coverage of one split payor's share across all schedules
pub fn payor_allocation_status(
    payor: &SplitPayor,
    allocations: &[SchedulePayorAllocation],
) -> AllocationStatus {
    let total = allocations
        .iter()
        .filter(|a| a.split_payor_id == payor.id)
        .map(|a| a.amount)
        .sum();
    AllocationStatus::classify(payor.amount, total)
}

/// Coverage of one schedule's amount across all payors
pub fn schedule_allocation_status(
    schedule: &PaymentSchedule,
    allocations: &[SchedulePayorAllocation],
) -> AllocationStatus {
    let total = allocations
        .iter()
        .filter(|a| a.schedule_id == schedule.id)
        .map(|a| a.amount)
        .sum();
    AllocationStatus::classify(schedule.amount, total)
}

/// Result of validating the whole allocation matrix
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AllocationReport {
    pub is_valid: bool,
    /// One message per non-complete row or column, naming it
    pub errors: Vec<String>,
}

/// Validate the whole matrix: every schedule and every payor must be
/// individually complete
pub fn validate_all_allocations(
    schedules: &[PaymentSchedule],
    payors: &[SplitPayor],
    allocations: &[SchedulePayorAllocation],
) -> AllocationReport {
    let mut errors = Vec::new();

    for schedule in schedules {
        let status = schedule_allocation_status(schedule, allocations);
        match status.state {
            AllocationState::Complete => {}
            AllocationState::Partial => errors.push(format!(
                "schedule '{}' is under-allocated: {} of {}",
                schedule.label, status.total_allocated, schedule.amount
            )),
            AllocationState::Overflow => errors.push(format!(
                "schedule '{}' is over-allocated: {} of {}",
                schedule.label, status.total_allocated, schedule.amount
            )),
        }
    }

    for payor in payors {
        let status = payor_allocation_status(payor, allocations);
        match status.state {
            AllocationState::Complete => {}
            AllocationState::Partial => errors.push(format!(
                "payor '{}' is under-allocated: {} of {}",
                payor.payor.name, status.total_allocated, payor.amount
            )),
            AllocationState::Overflow => errors.push(format!(
                "payor '{}' is over-allocated: {} of {}",
                payor.payor.name, status.total_allocated, payor.amount
            )),
        }
    }

    AllocationReport {
        is_valid: errors.is_empty(),
        errors,
    }
}
