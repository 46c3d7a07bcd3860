//! Rule engine configuration
//!
//! Thresholds and per-method-type proof requirements. Deserializable so a
//! host application can override the statutory defaults without recompiling.

use serde::{Deserialize, Serialize};
use shared::MethodType;

/// Configuration for the validation rule engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Bank-transfer amount at or above which a cash receipt is mandatory
    pub cash_receipt_threshold: i64,
    /// Day of the following month by which a tax invoice must be issued
    pub tax_invoice_deadline_day: u32,
    /// Method types that require proof documentation at all
    ///
    /// Card key-in and gateway payments produce their own slips and
    /// Narabill is itself an invoicing channel, so none of those carry a
    /// proof document by default.
    pub proof_required: Vec<MethodType>,
    /// OCR confidence below which a scan result needs manual review
    pub ocr_confidence_threshold: f64,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            cash_receipt_threshold: 100_000,
            tax_invoice_deadline_day: 10,
            proof_required: vec![
                MethodType::BankTransfer,
                MethodType::Contract,
                MethodType::Other,
            ],
            ocr_confidence_threshold: 0.8,
        }
    }
}

impl RuleConfig {
    /// Whether methods of this type carry proof documentation
    pub fn requires_proof(&self, method_type: MethodType) -> bool {
        self.proof_required.contains(&method_type)
    }
}
