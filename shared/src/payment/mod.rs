//! Payment Composition Module
//!
//! This module provides the types for the payment composition system:
//! - Schedules: named portions of the order total with their own due timing
//! - Methods: concrete ways of paying a portion of a schedule or payor share
//! - Split payors: independent parties each responsible for a fixed share
//! - Allocations: the payor x schedule distribution matrix
//! - Proofs: tax/accounting documentation attached to a method

pub mod ocr;
pub mod proof;
pub mod types;
pub mod violation;

// Re-exports
pub use ocr::{OcrFieldError, OcrScanResult};
pub use proof::{BusinessInfoFields, CashReceiptType, ProofDocument, ProofType, RecipientMode};
pub use types::*;
pub use violation::{Severity, Violation, has_blocking};
