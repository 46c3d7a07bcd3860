//! Amount-change synchronization
//!
//! When a schedule's or split payor's top-level amount changes after its
//! methods exist, the edit is not applied immediately. This module computes
//! the delta, proposes a reconciliation action, and transforms the method
//! list once the caller has chosen an action; the store then applies the
//! new amount and the transformed methods atomically.
//!
//! The method list is ordered: "last" always means most recently appended,
//! never map iteration order.

use serde::{Deserialize, Serialize};
use shared::PaymentMethod;

/// Strategy for resolving a mismatch after a top-level amount change
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconcileAction {
    /// Clear all methods
    Reset,
    /// Add the difference to the last method, floored at 0
    AdjustLast,
    /// Append a fresh method carrying the full positive difference
    AddNew,
    /// Apply the new top-level amount only, leaving the methods untouched;
    /// the resulting sum mismatch is deliberate and surfaced by validation
    Manual,
}

/// Pending amount change surfaced to the caller for confirmation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AmountChange {
    pub original_amount: i64,
    pub new_amount: i64,
    /// `new_amount - original_amount`
    pub difference: i64,
    /// Snapshot of the methods that existed when the change was planned
    pub affected_methods: Vec<PaymentMethod>,
    pub suggested_action: ReconcileAction,
}

/// Plan a reconciliation for an amount edit
///
/// Returns `None` when nothing changed. Suggestion priority: a single
/// method absorbs the delta; growth across several methods is ambiguous
/// about which one absorbs it, so a fresh method is proposed; shrinkage is
/// assumed recoverable from the most recently appended method. The
/// asymmetry (no ADD_NEW on decrease) is deliberate.
pub fn plan_amount_change(
    original_amount: i64,
    new_amount: i64,
    methods: &[PaymentMethod],
) -> Option<AmountChange> {
    let difference = new_amount - original_amount;
    if difference == 0 {
        return None;
    }

    let suggested_action = if methods.len() <= 1 {
        ReconcileAction::AdjustLast
    } else if difference > 0 {
        ReconcileAction::AddNew
    } else {
        ReconcileAction::AdjustLast
    };

    Some(AmountChange {
        original_amount,
        new_amount,
        difference,
        affected_methods: methods.to_vec(),
        suggested_action,
    })
}

/// Apply the chosen action, producing the new method list
pub fn apply_action(
    action: ReconcileAction,
    change: &AmountChange,
    methods: &[PaymentMethod],
) -> Vec<PaymentMethod> {
    match action {
        ReconcileAction::Reset => Vec::new(),
        ReconcileAction::AdjustLast => {
            let mut out = methods.to_vec();
            if let Some(last) = out.last_mut() {
                last.amount = (last.amount + change.difference).max(0);
            }
            out
        }
        ReconcileAction::AddNew => {
            let mut out = methods.to_vec();
            if change.difference > 0 {
                out.push(PaymentMethod::draft(change.difference));
            }
            out
        }
        ReconcileAction::Manual => methods.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn methods(amounts: &[i64]) -> Vec<PaymentMethod> {
        amounts.iter().map(|&a| PaymentMethod::draft(a)).collect()
    }

    fn sum(methods: &[PaymentMethod]) -> i64 {
        methods.iter().map(|m| m.amount).sum()
    }

    #[test]
    fn test_no_change_is_none() {
        let existing = methods(&[600_000, 400_000]);
        assert!(plan_amount_change(1_000_000, 1_000_000, &existing).is_none());
    }

    #[test]
    fn test_single_method_suggests_adjust_last() {
        let existing = methods(&[1_000_000]);
        let change = plan_amount_change(1_000_000, 1_200_000, &existing).unwrap();
        assert_eq!(change.suggested_action, ReconcileAction::AdjustLast);
        assert_eq!(change.difference, 200_000);
        assert_eq!(change.affected_methods.len(), 1);
    }

    #[test]
    fn test_increase_with_two_methods_suggests_add_new() {
        // 1,000,000 split 600k/400k, raised to 1,300,000
        let existing = methods(&[600_000, 400_000]);
        let change = plan_amount_change(1_000_000, 1_300_000, &existing).unwrap();
        assert_eq!(change.suggested_action, ReconcileAction::AddNew);

        let after = apply_action(ReconcileAction::AddNew, &change, &existing);
        assert_eq!(after.len(), 3);
        assert_eq!(after[2].amount, 300_000);
        assert_eq!(sum(&after), 1_300_000);
    }

    #[test]
    fn test_decrease_with_two_methods_suggests_adjust_last() {
        // Same schedule, lowered to 700,000
        let existing = methods(&[600_000, 400_000]);
        let change = plan_amount_change(1_000_000, 700_000, &existing).unwrap();
        assert_eq!(change.suggested_action, ReconcileAction::AdjustLast);

        let after = apply_action(ReconcileAction::AdjustLast, &change, &existing);
        assert_eq!(after.len(), 2);
        assert_eq!(after[0].amount, 600_000);
        assert_eq!(after[1].amount, 100_000);
    }

    #[test]
    fn test_adjust_last_never_goes_below_zero() {
        let existing = methods(&[600_000, 400_000]);
        let change = plan_amount_change(1_000_000, 100_000, &existing).unwrap();
        assert_eq!(change.difference, -900_000);

        let after = apply_action(ReconcileAction::AdjustLast, &change, &existing);
        assert_eq!(after[1].amount, 0);
    }

    #[test]
    fn test_add_new_on_decrease_appends_nothing() {
        let existing = methods(&[600_000, 400_000]);
        let change = plan_amount_change(1_000_000, 800_000, &existing).unwrap();

        let after = apply_action(ReconcileAction::AddNew, &change, &existing);
        assert_eq!(after.len(), 2);
        assert_eq!(sum(&after), 1_000_000);
    }

    #[test]
    fn test_reset_clears_methods() {
        let existing = methods(&[600_000, 400_000]);
        let change = plan_amount_change(1_000_000, 500_000, &existing).unwrap();

        let after = apply_action(ReconcileAction::Reset, &change, &existing);
        assert!(after.is_empty());
    }

    #[test]
    fn test_manual_leaves_methods_untouched() {
        let existing = methods(&[600_000, 400_000]);
        let change = plan_amount_change(1_000_000, 1_500_000, &existing).unwrap();

        let after = apply_action(ReconcileAction::Manual, &change, &existing);
        assert_eq!(after, existing);
        // Sum now mismatches the new amount; validation surfaces it.
        assert_ne!(sum(&after), change.new_amount);
    }

    #[test]
    fn test_adjust_last_targets_most_recently_appended() {
        let existing = methods(&[100_000, 200_000, 300_000]);
        let change = plan_amount_change(600_000, 550_000, &existing).unwrap();

        let after = apply_action(ReconcileAction::AdjustLast, &change, &existing);
        assert_eq!(after[0].amount, 100_000);
        assert_eq!(after[1].amount, 200_000);
        assert_eq!(after[2].amount, 250_000);
    }
}
