use chrono::NaiveDate;
use shared::{
    AllocationInput, MethodChanges, MethodDetails, MethodInput, MethodType, PayorInfo,
    ProofDocument, ScheduleInput, ScheduleTiming, SplitPayorInput,
};

use super::*;
use crate::rules::RULE_CASH_RECEIPT_THRESHOLD;
use crate::sync::ReconcileAction;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 25).unwrap()
}

fn schedule_input(label: &str, amount: i64) -> ScheduleInput {
    ScheduleInput {
        label: label.to_string(),
        amount,
        timing: ScheduleTiming::Upfront,
        due_date: None,
        due_time: None,
        payor: None,
    }
}

fn payor_input(name: &str, amount: i64) -> SplitPayorInput {
    SplitPayorInput {
        payor: PayorInfo::named(name),
        amount,
    }
}

fn bank_transfer(amount: i64) -> MethodInput {
    MethodInput {
        method_type: MethodType::BankTransfer,
        amount,
        details: None,
        auto_receipt: false,
    }
}

// ============================================================================
// Schedules
// ============================================================================

#[test]
fn test_new_store_has_full_amount_schedule() {
    let store = PaymentStore::new(1_000_000);
    assert_eq!(store.payment().schedules.len(), 1);
    assert_eq!(store.total_amount(), 1_000_000);
    assert_eq!(store.payable_amount(), 1_000_000);
    assert!(!store.is_submitted());
}

#[test]
fn test_add_schedule_rejects_negative_amount() {
    let mut store = PaymentStore::new(1_000_000);
    let err = store.add_schedule(schedule_input("Deposit", -1)).unwrap_err();
    assert!(matches!(err, StoreError::InvalidAmount(_)));
    assert_eq!(store.payment().schedules.len(), 1);
}

#[test]
fn test_update_missing_schedule_fails() {
    let mut store = PaymentStore::new(1_000_000);
    let err = store
        .update_schedule("nope", shared::ScheduleChanges::default())
        .unwrap_err();
    assert_eq!(err, StoreError::ScheduleNotFound("nope".to_string()));
}

#[test]
fn test_remove_schedule_cascades_allocations() {
    let mut store = PaymentStore::new(1_000_000);
    store.set_payor_mode(shared::PayorMode::SplitAmount).unwrap();
    let s1 = store.payment().schedules[0].id.clone();
    let s2 = store.add_schedule(schedule_input("Balance", 0)).unwrap();
    let p = store.add_split_payor(payor_input("A", 1_000_000)).unwrap();
    store
        .add_allocation(AllocationInput {
            schedule_id: s1.clone(),
            split_payor_id: p.clone(),
            amount: 600_000,
        })
        .unwrap();
    let kept = store
        .add_allocation(AllocationInput {
            schedule_id: s2,
            split_payor_id: p,
            amount: 400_000,
        })
        .unwrap();

    store.remove_schedule(&s1).unwrap();
    let allocations = &store.payment().schedule_payor_allocations;
    assert_eq!(allocations.len(), 1);
    assert_eq!(allocations[0].id, kept);
}

// ============================================================================
// Allocations
// ============================================================================

#[test]
fn test_allocation_requires_existing_endpoints() {
    let mut store = PaymentStore::new(1_000_000);
    let s = store.payment().schedules[0].id.clone();
    let p = store.add_split_payor(payor_input("A", 1_000_000)).unwrap();

    let err = store
        .add_allocation(AllocationInput {
            schedule_id: "missing".to_string(),
            split_payor_id: p.clone(),
            amount: 100,
        })
        .unwrap_err();
    assert!(matches!(err, StoreError::ScheduleNotFound(_)));

    let err = store
        .add_allocation(AllocationInput {
            schedule_id: s,
            split_payor_id: "missing".to_string(),
            amount: 100,
        })
        .unwrap_err();
    assert!(matches!(err, StoreError::PayorNotFound(_)));
    assert!(store.payment().schedule_payor_allocations.is_empty());
}

#[test]
fn test_allocation_rejects_occupied_pair_and_bad_amount() {
    let mut store = PaymentStore::new(1_000_000);
    let s = store.payment().schedules[0].id.clone();
    let p = store.add_split_payor(payor_input("A", 1_000_000)).unwrap();

    let err = store
        .add_allocation(AllocationInput {
            schedule_id: s.clone(),
            split_payor_id: p.clone(),
            amount: 0,
        })
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidAmount(_)));

    store
        .add_allocation(AllocationInput {
            schedule_id: s.clone(),
            split_payor_id: p.clone(),
            amount: 400_000,
        })
        .unwrap();
    let err = store
        .add_allocation(AllocationInput {
            schedule_id: s.clone(),
            split_payor_id: p.clone(),
            amount: 600_000,
        })
        .unwrap_err();
    assert_eq!(
        err,
        StoreError::DuplicateAllocation {
            schedule_id: s,
            split_payor_id: p,
        }
    );
}

#[test]
fn test_remove_split_payor_cascades_allocations() {
    let mut store = PaymentStore::new(1_000_000);
    let s = store.payment().schedules[0].id.clone();
    let a = store.add_split_payor(payor_input("A", 700_000)).unwrap();
    let b = store.add_split_payor(payor_input("B", 300_000)).unwrap();
    store
        .add_allocation(AllocationInput {
            schedule_id: s.clone(),
            split_payor_id: a.clone(),
            amount: 700_000,
        })
        .unwrap();
    store
        .add_allocation(AllocationInput {
            schedule_id: s,
            split_payor_id: b.clone(),
            amount: 300_000,
        })
        .unwrap();

    store.remove_split_payor(&a).unwrap();
    assert_eq!(store.payment().split_payors.len(), 1);
    let allocations = &store.payment().schedule_payor_allocations;
    assert_eq!(allocations.len(), 1);
    assert_eq!(allocations[0].split_payor_id, b);
}

// ============================================================================
// Methods
// ============================================================================

#[test]
fn test_add_method_rejects_mismatched_details_payload() {
    let mut store = PaymentStore::new(1_000_000);
    let s = store.payment().schedules[0].id.clone();
    let host = MethodHost::schedule(&s);

    let err = store
        .add_method(
            &host,
            MethodInput {
                method_type: MethodType::BankTransfer,
                amount: 500_000,
                details: Some(MethodDetails::empty_for(MethodType::CardKeyin)),
                auto_receipt: false,
            },
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidOperation(_)));
    assert!(store.payment().schedules[0].methods.is_empty());
}

#[test]
fn test_add_method_defaults_details_to_empty_payload() {
    let mut store = PaymentStore::new(1_000_000);
    let s = store.payment().schedules[0].id.clone();
    let host = MethodHost::schedule(&s);

    let id = store.add_method(&host, bank_transfer(1_000_000)).unwrap();
    let method = &store.payment().schedules[0].methods[0];
    assert_eq!(method.id, id);
    assert_eq!(method.details, MethodDetails::empty_for(MethodType::BankTransfer));
}

#[test]
fn test_update_method_with_details_retypes_it() {
    let mut store = PaymentStore::new(1_000_000);
    let s = store.payment().schedules[0].id.clone();
    let host = MethodHost::schedule(&s);
    let id = store.add_method(&host, bank_transfer(1_000_000)).unwrap();

    store
        .update_method(
            &host,
            &id,
            MethodChanges {
                details: Some(MethodDetails::empty_for(MethodType::CardKeyin)),
                ..Default::default()
            },
        )
        .unwrap();
    let method = &store.payment().schedules[0].methods[0];
    assert_eq!(method.method_type, MethodType::CardKeyin);
}

#[test]
fn test_methods_on_split_payor_host() {
    let mut store = PaymentStore::new(1_000_000);
    store.set_payor_mode(shared::PayorMode::SplitAmount).unwrap();
    let p = store.add_split_payor(payor_input("A", 1_000_000)).unwrap();
    let host = MethodHost::split_payor(&p);

    let id = store.add_method(&host, bank_transfer(1_000_000)).unwrap();
    assert_eq!(store.payment().split_payors[0].methods.len(), 1);
    store.remove_method(&host, &id).unwrap();
    assert!(store.payment().split_payors[0].methods.is_empty());

    let err = store.remove_method(&host, &id).unwrap_err();
    assert_eq!(err, StoreError::MethodNotFound(id));
}

// ============================================================================
// Amount change reconciliation
// ============================================================================

#[test]
fn test_amount_change_without_methods_applies_directly() {
    let mut store = PaymentStore::new(1_000_000);
    let s = store.payment().schedules[0].id.clone();
    let host = MethodHost::schedule(&s);

    assert!(store.request_amount_change(&host, 600_000).unwrap().is_none());
    assert_eq!(store.payment().schedules[0].amount, 600_000);
}

#[test]
fn test_amount_change_with_methods_is_deferred_until_applied() {
    let mut store = PaymentStore::new(1_000_000);
    let s = store.payment().schedules[0].id.clone();
    let host = MethodHost::schedule(&s);
    store.add_method(&host, bank_transfer(600_000)).unwrap();
    store.add_method(&host, bank_transfer(400_000)).unwrap();

    let change = store
        .request_amount_change(&host, 1_300_000)
        .unwrap()
        .expect("a plan");
    assert_eq!(change.suggested_action, ReconcileAction::AddNew);
    // Nothing moved yet.
    assert_eq!(store.payment().schedules[0].amount, 1_000_000);
    assert_eq!(store.payment().schedules[0].methods.len(), 2);

    store
        .apply_amount_change(&host, &change, ReconcileAction::AddNew)
        .unwrap();
    let schedule = &store.payment().schedules[0];
    assert_eq!(schedule.amount, 1_300_000);
    assert_eq!(schedule.methods.len(), 3);
    assert_eq!(schedule.method_total(), 1_300_000);
    assert!(schedule.methods_balanced());
}

#[test]
fn test_stale_amount_change_is_rejected() {
    let mut store = PaymentStore::new(1_000_000);
    let s = store.payment().schedules[0].id.clone();
    let host = MethodHost::schedule(&s);
    store.add_method(&host, bank_transfer(1_000_000)).unwrap();

    let change = store
        .request_amount_change(&host, 800_000)
        .unwrap()
        .expect("a plan");
    // A second change lands first.
    let other = store
        .request_amount_change(&host, 900_000)
        .unwrap()
        .expect("a plan");
    store
        .apply_amount_change(&host, &other, ReconcileAction::AdjustLast)
        .unwrap();

    let err = store
        .apply_amount_change(&host, &change, ReconcileAction::AdjustLast)
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidOperation(_)));
    assert_eq!(store.payment().schedules[0].amount, 900_000);
}

#[test]
fn test_manual_action_leaves_a_visible_sum_violation() {
    let mut store = PaymentStore::new(1_000_000);
    let s = store.payment().schedules[0].id.clone();
    let host = MethodHost::schedule(&s);
    store.add_method(&host, bank_transfer(1_000_000)).unwrap();

    let change = store
        .request_amount_change(&host, 1_500_000)
        .unwrap()
        .expect("a plan");
    store
        .apply_amount_change(&host, &change, ReconcileAction::Manual)
        .unwrap();

    assert!(!store.payment().schedules[0].methods_balanced());
    let violations = store.validate(today());
    assert!(violations.iter().any(|v| v.rule == crate::rules::RULE_SCHEDULE_SUM));
}

// ============================================================================
// Warning overrides
// ============================================================================

#[test]
fn test_acknowledge_warning_requires_existing_method() {
    let mut store = PaymentStore::new(1_000_000);
    let err = store
        .acknowledge_warning("missing", RULE_CASH_RECEIPT_THRESHOLD)
        .unwrap_err();
    assert_eq!(err, StoreError::MethodNotFound("missing".to_string()));
}

#[test]
fn test_acknowledged_warning_is_filtered() {
    let mut store = PaymentStore::new(1_000_000);
    let s = store.payment().schedules[0].id.clone();
    let host = MethodHost::schedule(&s);
    let id = store.add_method(&host, bank_transfer(1_000_000)).unwrap();

    let pending = store.unacknowledged_warnings(today());
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].0, id);
    assert_eq!(pending[0].1.rule, RULE_CASH_RECEIPT_THRESHOLD);

    store
        .acknowledge_warning(&id, RULE_CASH_RECEIPT_THRESHOLD)
        .unwrap();
    assert!(store.unacknowledged_warnings(today()).is_empty());
}

#[test]
fn test_changing_proof_discards_the_override() {
    let mut store = PaymentStore::new(1_000_000);
    let s = store.payment().schedules[0].id.clone();
    let host = MethodHost::schedule(&s);
    let id = store.add_method(&host, bank_transfer(1_000_000)).unwrap();

    store
        .acknowledge_warning(&id, RULE_CASH_RECEIPT_THRESHOLD)
        .unwrap();
    store
        .set_method_proof(&host, &id, Some(ProofDocument::none()))
        .unwrap();
    assert!(!store.is_warning_acknowledged(&id, RULE_CASH_RECEIPT_THRESHOLD));
    assert_eq!(store.unacknowledged_warnings(today()).len(), 1);
}

#[test]
fn test_removing_method_prunes_its_overrides() {
    let mut store = PaymentStore::new(1_000_000);
    let s = store.payment().schedules[0].id.clone();
    let host = MethodHost::schedule(&s);
    let id = store.add_method(&host, bank_transfer(1_000_000)).unwrap();
    store
        .acknowledge_warning(&id, RULE_CASH_RECEIPT_THRESHOLD)
        .unwrap();

    store.remove_method(&host, &id).unwrap();
    assert!(!store.is_warning_acknowledged(&id, RULE_CASH_RECEIPT_THRESHOLD));
}

// ============================================================================
// Deposit
// ============================================================================

#[test]
fn test_deposit_amount_requires_enabled_deposit() {
    let mut store = PaymentStore::new(1_000_000);
    let err = store.set_deposit_amount(100_000).unwrap_err();
    assert!(matches!(err, StoreError::InvalidOperation(_)));
}

#[test]
fn test_deposit_amount_is_bounded_by_available() {
    let mut store = PaymentStore::new(1_000_000);
    store.set_available_deposit(300_000).unwrap();
    store.set_use_deposit(true).unwrap();

    let err = store.set_deposit_amount(400_000).unwrap_err();
    assert!(matches!(err, StoreError::InvalidAmount(_)));

    store.set_deposit_amount(300_000).unwrap();
    assert_eq!(store.payable_amount(), 700_000);

    // Shrinking the available deposit clamps the applied amount.
    store.set_available_deposit(200_000).unwrap();
    assert_eq!(store.payment().deposit_amount, 200_000);
    assert_eq!(store.payable_amount(), 800_000);
}

#[test]
fn test_deposit_amount_is_bounded_by_order_total() {
    let mut store = PaymentStore::new(100_000);
    store.set_available_deposit(500_000).unwrap();
    store.set_use_deposit(true).unwrap();

    let err = store.set_deposit_amount(200_000).unwrap_err();
    assert!(matches!(err, StoreError::InvalidAmount(_)));
    assert_eq!(store.payable_amount(), 100_000);

    store.set_deposit_amount(100_000).unwrap();
    assert_eq!(store.payable_amount(), 0);
}

#[test]
fn test_disabling_deposit_resets_the_amount() {
    let mut store = PaymentStore::new(1_000_000);
    store.set_available_deposit(300_000).unwrap();
    store.set_use_deposit(true).unwrap();
    store.set_deposit_amount(300_000).unwrap();

    store.set_use_deposit(false).unwrap();
    assert_eq!(store.payment().deposit_amount, 0);
    assert_eq!(store.payable_amount(), 1_000_000);
}

// ============================================================================
// Submission freeze
// ============================================================================

#[test]
fn test_submitted_store_rejects_all_mutation() {
    let mut store = PaymentStore::new(1_000_000);
    store.submitted = true;

    let s = store.payment.schedules[0].id.clone();
    let host = MethodHost::schedule(&s);
    assert!(store.add_schedule(schedule_input("X", 1)).is_err());
    assert!(store.add_method(&host, bank_transfer(1)).is_err());
    assert!(store.request_amount_change(&host, 1).is_err());
    assert!(store.set_use_deposit(true).is_err());
    assert!(store.set_contract_signers(Vec::new()).is_err());
}

// ============================================================================
// Validation across modes
// ============================================================================

#[test]
fn test_split_mode_validation_covers_payor_methods() {
    let mut store = PaymentStore::new(1_000_000);
    store.set_payor_mode(shared::PayorMode::SplitAmount).unwrap();
    let p = store.add_split_payor(payor_input("A", 1_000_000)).unwrap();
    let host = MethodHost::split_payor(&p);
    store.add_method(&host, bank_transfer(400_000)).unwrap();

    let violations = store.validate(today());
    assert!(violations.iter().any(|v| v.rule == crate::rules::RULE_PAYOR_SUM));
}

#[test]
fn test_has_deferred_reflects_later_proofs() {
    let mut store = PaymentStore::new(1_000_000);
    let s = store.payment().schedules[0].id.clone();
    let host = MethodHost::schedule(&s);
    let id = store.add_method(&host, bank_transfer(1_000_000)).unwrap();
    assert!(!store.has_deferred());

    store
        .set_method_proof(&host, &id, Some(ProofDocument::later()))
        .unwrap();
    assert!(store.has_deferred());
}
