//! Store errors
//!
//! Structural rejections: a payload referencing a missing id or breaking a
//! structural rule is refused outright, with no partial application. These
//! are treated as programming errors in the calling layer, unlike rule
//! violations, which are ordinary data the UI surfaces.

use thiserror::Error;

/// Store operation errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Schedule not found: {0}")]
    ScheduleNotFound(String),

    #[error("Payment method not found: {0}")]
    MethodNotFound(String),

    #[error("Split payor not found: {0}")]
    PayorNotFound(String),

    #[error("Allocation not found: {0}")]
    AllocationNotFound(String),

    #[error("Allocation already exists for schedule {schedule_id} and payor {split_payor_id}")]
    DuplicateAllocation {
        schedule_id: String,
        split_payor_id: String,
    },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
