//! Payment Composition & Reconciliation Engine
//!
//! Core logic behind the order/payment administration front-end: splitting
//! an order total across payment schedules, schedules across methods, and
//! (for multi-payor orders) amounts across independent payors via an
//! allocation matrix, while legal/tax rules are continuously evaluated and
//! a 5-step wizard gates progress.
//!
//! Module layering, leaves first:
//! - [`config`]: rule thresholds and per-method-type proof requirements
//! - [`rules`]: pure legal/financial validation producing severity-tagged
//!   violations
//! - [`allocation`]: classifies payor/schedule allocation coverage
//! - [`sync`]: plans and applies reconciliation after top-level amount edits
//! - [`store`]: the single mutable aggregate and its operations
//! - [`wizard`]: the sequential step state machine on top of the store
//! - [`ocr`]: epoch-guarded acceptance of asynchronous scan results
//!
//! Everything is synchronous and single-threaded; view code calls in and
//! receives immutable snapshots back.

pub mod allocation;
pub mod config;
pub mod ocr;
pub mod rules;
pub mod store;
pub mod sync;
pub mod wizard;

// Re-exports
pub use allocation::{AllocationReport, AllocationState, AllocationStatus};
pub use config::RuleConfig;
pub use ocr::{ScanGate, ScanOutcome, ScanTicket};
pub use rules::RuleEngine;
pub use store::{MethodHost, PaymentStore, StoreError, StoreResult};
pub use sync::{AmountChange, ReconcileAction};
pub use wizard::{WizardError, WizardStep};
