//! Shared types for the payment composition engine
//!
//! Pure data shapes used by the engine crate and by view code:
//! schedules, methods, payors, allocations, proof documents, validation
//! violations and the OCR collaborator wire types. No behavior beyond
//! constructors and derived read-only helpers lives here.

pub mod payment;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use payment::{
    AllocationInput, BusinessInfoFields, CashReceiptType, ContractSigner, MethodChanges,
    MethodDetails, MethodInput, MethodType, OcrFieldError, OcrScanResult, PaymentMethod,
    PaymentSchedule, PayorInfo, PayorMode, ProofDocument, ProofType, RecipientMode, ScheduleChanges,
    ScheduleInput, SchedulePayorAllocation, ScheduleTiming, Severity, SplitPayor, SplitPayorInput,
    StepStatus, UnifiedPayment, Violation, has_blocking,
};
