//! OCR collaborator wire types
//!
//! The scanner itself is external and opaque; it returns structured
//! business-registration fields plus a confidence score after an
//! unspecified delay. Acceptance policy (epoch guarding, confidence
//! threshold) lives in the engine crate.

use super::proof::BusinessInfoFields;
use serde::{Deserialize, Serialize};

/// Per-field extraction error reported by the scanner
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OcrFieldError {
    pub field: String,
    pub message: String,
}

/// Result returned by the OCR collaborator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OcrScanResult {
    pub success: bool,
    /// Extraction confidence in 0.0..=1.0
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<BusinessInfoFields>,
    #[serde(default)]
    pub errors: Vec<OcrFieldError>,
}

impl OcrScanResult {
    pub fn ok(confidence: f64, data: BusinessInfoFields) -> Self {
        Self {
            success: true,
            confidence,
            data: Some(data),
            errors: Vec::new(),
        }
    }

    pub fn failed(errors: Vec<OcrFieldError>) -> Self {
        Self {
            success: false,
            confidence: 0.0,
            data: None,
            errors,
        }
    }
}
