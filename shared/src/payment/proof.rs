//! Proof document types
//!
//! The tax/accounting documentation requested for a payment method:
//! tax invoice, cash receipt, none, or deferred ("issue later").

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of documentation requested
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProofType {
    TaxInvoice,
    CashReceipt,
    /// No documentation requested
    #[default]
    None,
    /// Deferred; the operator will request documentation later
    Later,
}

/// Whose details appear on the document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecipientMode {
    /// Document is issued to the payor on record
    #[default]
    Same,
    /// Document is issued to a different recipient
    Different,
}

/// Cash receipt purpose
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashReceiptType {
    /// Personal income deduction
    PersonalDeduction,
    /// Business expense proof
    BusinessExpense,
}

/// Tax-registration fields for an invoice recipient
///
/// Also the structured output shape of the OCR collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BusinessInfoFields {
    #[serde(default)]
    pub business_number: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub representative: String,
    #[serde(default)]
    pub tax_email: String,
    #[serde(default)]
    pub business_type: String,
    #[serde(default)]
    pub business_item: String,
    #[serde(default)]
    pub address: String,
}

/// Documentation requested for a payment method
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProofDocument {
    pub proof_type: ProofType,
    #[serde(default)]
    pub recipient_mode: RecipientMode,
    /// Alternate recipient, required when `recipient_mode` is Different
    #[serde(skip_serializing_if = "Option::is_none")]
    pub different_recipient: Option<BusinessInfoFields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash_receipt_type: Option<CashReceiptType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash_receipt_number: Option<String>,
    /// Requested issue date for a tax invoice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,
    /// Whether the requested issue date should be honored
    #[serde(default)]
    pub preferred_issue_date: bool,
}

impl ProofDocument {
    /// Proof explicitly declining documentation
    pub fn none() -> Self {
        Self::default()
    }

    pub fn tax_invoice() -> Self {
        Self {
            proof_type: ProofType::TaxInvoice,
            ..Default::default()
        }
    }

    pub fn cash_receipt(receipt_type: CashReceiptType, number: impl Into<String>) -> Self {
        Self {
            proof_type: ProofType::CashReceipt,
            cash_receipt_type: Some(receipt_type),
            cash_receipt_number: Some(number.into()),
            ..Default::default()
        }
    }

    pub fn later() -> Self {
        Self {
            proof_type: ProofType::Later,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_proof_is_none() {
        let proof = ProofDocument::default();
        assert_eq!(proof.proof_type, ProofType::None);
        assert_eq!(proof.recipient_mode, RecipientMode::Same);
        assert!(!proof.preferred_issue_date);
    }

    #[test]
    fn test_proof_type_serde_tags() {
        assert_eq!(serde_json::to_string(&ProofType::TaxInvoice).unwrap(), "\"TAX_INVOICE\"");
        assert_eq!(serde_json::to_string(&ProofType::Later).unwrap(), "\"LATER\"");
    }
}
