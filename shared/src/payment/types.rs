//! Core payment composition types
//!
//! All monetary amounts are integer currency units (no fractional part).
//! Entity ids are UUID v4 strings assigned at construction time.

use super::proof::ProofDocument;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Schedule Types
// ============================================================================

/// Due timing for a payment schedule
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleTiming {
    /// Due before production starts (deposit)
    #[default]
    Upfront,
    /// Due when the goods ship
    OnShip,
    /// Due after delivery (balance)
    PostShip,
    /// Free-form due date chosen by the operator
    Custom,
}

/// A named portion of the order total with its own due timing
///
/// Invariant (checked, not eagerly enforced): once `methods` is non-empty,
/// the method amounts must sum to `amount`. Violations are surfaced by the
/// rule engine and gate wizard progress; they never block editing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentSchedule {
    /// Schedule ID (assigned at creation)
    pub id: String,
    /// Display label (e.g. "Deposit", "Balance")
    pub label: String,
    /// Scheduled amount in integer currency units
    pub amount: i64,
    /// Due timing
    pub timing: ScheduleTiming,
    /// Due date (required for Custom timing)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Due time of day as "HH:MM" (display only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_time: Option<String>,
    /// Responsible payor (used in per-schedule payor mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payor: Option<PayorInfo>,
    /// Payment methods covering this schedule, in append order
    pub methods: Vec<PaymentMethod>,
}

impl PaymentSchedule {
    pub fn new(label: impl Into<String>, amount: i64, timing: ScheduleTiming) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            label: label.into(),
            amount,
            timing,
            due_date: None,
            due_time: None,
            payor: None,
            methods: Vec::new(),
        }
    }

    /// Sum of method amounts (derived, never stored)
    pub fn method_total(&self) -> i64 {
        self.methods.iter().map(|m| m.amount).sum()
    }

    /// Whether the method sum invariant currently holds
    ///
    /// Vacuously true while no methods exist.
    pub fn methods_balanced(&self) -> bool {
        self.methods.is_empty() || self.method_total() == self.amount
    }
}

// ============================================================================
// Method Types
// ============================================================================

/// Payment method kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MethodType {
    /// Manual card entry
    CardKeyin,
    #[default]
    BankTransfer,
    /// Government e-billing (Narabill)
    Narabill,
    /// Installment contract
    Contract,
    Other,
    /// Online payment gateway
    Gateway,
}

/// Per-type method payload, discriminated by `type`
///
/// One variant per method kind; fields that the operator has not filled in
/// yet stay `None`, so a freshly created method is representable without
/// sentinel values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MethodDetails {
    CardKeyin {
        #[serde(skip_serializing_if = "Option::is_none")]
        card_number: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        card_holder: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        installment_months: Option<u8>,
    },
    BankTransfer {
        #[serde(skip_serializing_if = "Option::is_none")]
        bank_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        account_number: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        depositor_name: Option<String>,
    },
    Narabill {
        #[serde(skip_serializing_if = "Option::is_none")]
        bill_number: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        agency_name: Option<String>,
    },
    Contract {
        #[serde(skip_serializing_if = "Option::is_none")]
        contract_number: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        signer_name: Option<String>,
    },
    Other {
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Gateway {
        #[serde(skip_serializing_if = "Option::is_none")]
        provider: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        transaction_ref: Option<String>,
    },
}

impl MethodDetails {
    /// Empty payload for the given method kind
    pub fn empty_for(method_type: MethodType) -> Self {
        match method_type {
            MethodType::CardKeyin => Self::CardKeyin {
                card_number: None,
                card_holder: None,
                installment_months: None,
            },
            MethodType::BankTransfer => Self::BankTransfer {
                bank_name: None,
                account_number: None,
                depositor_name: None,
            },
            MethodType::Narabill => Self::Narabill {
                bill_number: None,
                agency_name: None,
            },
            MethodType::Contract => Self::Contract {
                contract_number: None,
                signer_name: None,
            },
            MethodType::Other => Self::Other { description: None },
            MethodType::Gateway => Self::Gateway {
                provider: None,
                transaction_ref: None,
            },
        }
    }

    /// The method kind this payload belongs to
    pub fn method_type(&self) -> MethodType {
        match self {
            Self::CardKeyin { .. } => MethodType::CardKeyin,
            Self::BankTransfer { .. } => MethodType::BankTransfer,
            Self::Narabill { .. } => MethodType::Narabill,
            Self::Contract { .. } => MethodType::Contract,
            Self::Other { .. } => MethodType::Other,
            Self::Gateway { .. } => MethodType::Gateway,
        }
    }
}

/// A specific way of paying a portion of a schedule's (or split payor's) amount
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentMethod {
    /// Method ID (assigned at creation)
    pub id: String,
    pub method_type: MethodType,
    /// Amount in integer currency units
    pub amount: i64,
    /// Per-type payload
    pub details: MethodDetails,
    /// Whether a receipt is issued automatically (skips proof validation)
    #[serde(default)]
    pub auto_receipt: bool,
    /// Requested tax/accounting documentation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<ProofDocument>,
}

impl PaymentMethod {
    pub fn new(method_type: MethodType, amount: i64, details: MethodDetails) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            method_type,
            amount,
            details,
            auto_receipt: false,
            proof: None,
        }
    }

    /// Blank bank-transfer method carrying `amount`, for reconciliation
    /// proposals where the operator fills in details afterwards
    pub fn draft(amount: i64) -> Self {
        Self::new(
            MethodType::BankTransfer,
            amount,
            MethodDetails::empty_for(MethodType::BankTransfer),
        )
    }
}

// ============================================================================
// Payor Types
// ============================================================================

/// Flat payor identity / tax-registration fields
///
/// No behavior; validated by the rule engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PayorInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub representative: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl PayorInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// One of several independent parties each responsible for a fixed share
/// of the order total
///
/// Same method sum invariant as a schedule, scoped to the payor's share.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SplitPayor {
    /// Payor ID (assigned at creation)
    pub id: String,
    pub payor: PayorInfo,
    /// This payor's share in integer currency units
    pub amount: i64,
    /// Payment methods covering this payor's share, in append order
    pub methods: Vec<PaymentMethod>,
}

impl SplitPayor {
    pub fn new(payor: PayorInfo, amount: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            payor,
            amount,
            methods: Vec::new(),
        }
    }

    /// Sum of method amounts (derived, never stored)
    pub fn method_total(&self) -> i64 {
        self.methods.iter().map(|m| m.amount).sum()
    }

    /// Whether the method sum invariant currently holds
    pub fn methods_balanced(&self) -> bool {
        self.methods.is_empty() || self.method_total() == self.amount
    }
}

/// Many-to-many join between schedules and split payors
///
/// A single row participates in two sums at once: the per-schedule column
/// sum and the per-payor row sum. At most one row exists per
/// (schedule, payor) pair; the store rejects a second row for an occupied
/// pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchedulePayorAllocation {
    /// Allocation ID (assigned at creation)
    pub id: String,
    pub schedule_id: String,
    pub split_payor_id: String,
    /// Allocated amount in integer currency units
    pub amount: i64,
}

impl SchedulePayorAllocation {
    pub fn new(schedule_id: impl Into<String>, split_payor_id: impl Into<String>, amount: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            schedule_id: schedule_id.into(),
            split_payor_id: split_payor_id.into(),
            amount,
        }
    }
}

/// Who pays: one party, one party per schedule, or several parties with
/// amounts distributed via the allocation matrix
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayorMode {
    #[default]
    Single,
    PerSchedule,
    SplitAmount,
}

/// Signer recorded for contract-type methods
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContractSigner {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// The payment composition aggregate
///
/// Created with one schedule equal to the order total. All mutation flows
/// through store operations; validation and reconciliation modules are
/// read-only consumers. Totals and deferred flags are derived on read and
/// never cached here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnifiedPayment {
    pub schedules: Vec<PaymentSchedule>,
    pub payor_mode: PayorMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub single_payor: Option<PayorInfo>,
    pub split_payors: Vec<SplitPayor>,
    pub schedule_payor_allocations: Vec<SchedulePayorAllocation>,
    #[serde(default)]
    pub use_deposit: bool,
    #[serde(default)]
    pub deposit_amount: i64,
    #[serde(default)]
    pub available_deposit: i64,
    #[serde(default)]
    pub contract_signers: Vec<ContractSigner>,
}

impl UnifiedPayment {
    /// Create the aggregate with one full-amount schedule
    pub fn new(order_total: i64) -> Self {
        Self {
            schedules: vec![PaymentSchedule::new(
                "Full amount",
                order_total,
                ScheduleTiming::Upfront,
            )],
            payor_mode: PayorMode::Single,
            single_payor: None,
            split_payors: Vec::new(),
            schedule_payor_allocations: Vec::new(),
            use_deposit: false,
            deposit_amount: 0,
            available_deposit: 0,
            contract_signers: Vec::new(),
        }
    }

    /// Sum of schedule amounts (derived on every read)
    pub fn total_amount(&self) -> i64 {
        self.schedules.iter().map(|s| s.amount).sum()
    }

    /// Whether any method defers its proof (`LATER`)
    pub fn has_deferred(&self) -> bool {
        let deferred = |m: &PaymentMethod| {
            m.proof
                .as_ref()
                .is_some_and(|p| p.proof_type == super::proof::ProofType::Later)
        };
        self.schedules.iter().flat_map(|s| &s.methods).any(deferred)
            || self.split_payors.iter().flat_map(|p| &p.methods).any(deferred)
    }

    pub fn schedule(&self, id: &str) -> Option<&PaymentSchedule> {
        self.schedules.iter().find(|s| s.id == id)
    }

    pub fn split_payor(&self, id: &str) -> Option<&SplitPayor> {
        self.split_payors.iter().find(|p| p.id == id)
    }
}

// ============================================================================
// Wizard Step Status
// ============================================================================

/// Per-step wizard status
///
/// Exactly one step has `is_active == true` at a time, except before the
/// wizard starts or after submission.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepStatus {
    /// Step number (1..=5; 4 is reserved and never active)
    pub step: u8,
    pub is_completed: bool,
    pub is_active: bool,
    pub can_edit: bool,
}

// ============================================================================
// Input / Change Types
// ============================================================================

/// Input for creating a schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub label: String,
    pub amount: i64,
    #[serde(default)]
    pub timing: ScheduleTiming,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payor: Option<PayorInfo>,
}

/// Partial schedule changes (None = no change)
///
/// Amount is deliberately absent: top-level amount edits go through the
/// amount-change reconciliation flow instead.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScheduleChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<ScheduleTiming>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payor: Option<PayorInfo>,
}

/// Input for creating a payment method
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodInput {
    pub method_type: MethodType,
    pub amount: i64,
    /// Payload; defaults to an empty payload for `method_type`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<MethodDetails>,
    #[serde(default)]
    pub auto_receipt: bool,
}

/// Partial method changes (None = no change)
///
/// Providing `details` also retypes the method to the payload's kind.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MethodChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<MethodDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_receipt: Option<bool>,
}

/// Input for creating a split payor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitPayorInput {
    pub payor: PayorInfo,
    pub amount: i64,
}

/// Input for creating an allocation (one drop onto a matrix cell)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationInput {
    pub schedule_id: String,
    pub split_payor_id: String,
    pub amount: i64,
}
