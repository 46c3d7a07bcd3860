//! OCR acceptance gate
//!
//! Scans complete after an arbitrary delay, during which the operator may
//! have switched context or started another scan. The gate hands out an
//! epoch-stamped ticket per scan; a result presented with a ticket from an
//! older epoch is rejected as stale instead of being written into whatever
//! form happens to be open now.

use shared::{BusinessInfoFields, OcrFieldError, OcrScanResult};
use tracing::debug;

use crate::config::RuleConfig;

/// Ticket identifying one in-flight scan
///
/// Not `Clone`: a ticket is redeemed at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct ScanTicket {
    epoch: u64,
}

/// Outcome of presenting a scan result to the gate
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// Fields extracted at or above the confidence threshold
    Accepted(BusinessInfoFields),
    /// Fields extracted but below the confidence threshold; the operator
    /// must confirm or correct them
    NeedsReview {
        fields: BusinessInfoFields,
        confidence: f64,
    },
    /// The scanner could not extract the fields
    Failed(Vec<OcrFieldError>),
    /// The ticket's epoch has passed; the result is discarded
    Stale,
}

/// Epoch-guarded acceptance of OCR results
#[derive(Debug, Clone)]
pub struct ScanGate {
    epoch: u64,
    confidence_threshold: f64,
}

impl ScanGate {
    pub fn new(config: &RuleConfig) -> Self {
        Self {
            epoch: 0,
            confidence_threshold: config.ocr_confidence_threshold,
        }
    }

    /// Start a scan, invalidating any ticket issued earlier
    pub fn begin(&mut self) -> ScanTicket {
        self.epoch += 1;
        debug!(epoch = self.epoch, "scan started");
        ScanTicket { epoch: self.epoch }
    }

    /// Invalidate all outstanding tickets without starting a scan
    ///
    /// Called when the target method or proof changes while a scan is in
    /// flight.
    pub fn invalidate(&mut self) {
        self.epoch += 1;
        debug!(epoch = self.epoch, "outstanding scans invalidated");
    }

    /// Judge a completed scan against the ticket it was started with
    pub fn resolve(&self, ticket: ScanTicket, result: OcrScanResult) -> ScanOutcome {
        if ticket.epoch != self.epoch {
            debug!(ticket_epoch = ticket.epoch, current_epoch = self.epoch, "stale scan dropped");
            return ScanOutcome::Stale;
        }
        if !result.success {
            return ScanOutcome::Failed(result.errors);
        }
        let Some(fields) = result.data else {
            return ScanOutcome::Failed(vec![OcrFieldError {
                field: "data".to_string(),
                message: "scanner reported success without extracted fields".to_string(),
            }]);
        };
        if result.confidence < self.confidence_threshold {
            return ScanOutcome::NeedsReview {
                fields,
                confidence: result.confidence,
            };
        }
        ScanOutcome::Accepted(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> BusinessInfoFields {
        BusinessInfoFields {
            business_number: "123-45-67890".to_string(),
            company_name: "Acme Industries".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_confident_result_is_accepted() {
        let mut gate = ScanGate::new(&RuleConfig::default());
        let ticket = gate.begin();
        let outcome = gate.resolve(ticket, OcrScanResult::ok(0.95, fields()));
        assert_eq!(outcome, ScanOutcome::Accepted(fields()));
    }

    #[test]
    fn test_low_confidence_needs_review() {
        let mut gate = ScanGate::new(&RuleConfig::default());
        let ticket = gate.begin();
        let outcome = gate.resolve(ticket, OcrScanResult::ok(0.6, fields()));
        assert!(matches!(outcome, ScanOutcome::NeedsReview { confidence, .. } if confidence == 0.6));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let mut gate = ScanGate::new(&RuleConfig::default());
        let ticket = gate.begin();
        let outcome = gate.resolve(ticket, OcrScanResult::ok(0.8, fields()));
        assert_eq!(outcome, ScanOutcome::Accepted(fields()));
    }

    #[test]
    fn test_failed_scan_carries_field_errors() {
        let mut gate = ScanGate::new(&RuleConfig::default());
        let ticket = gate.begin();
        let errors = vec![OcrFieldError {
            field: "business_number".to_string(),
            message: "unreadable".to_string(),
        }];
        let outcome = gate.resolve(ticket, OcrScanResult::failed(errors.clone()));
        assert_eq!(outcome, ScanOutcome::Failed(errors));
    }

    #[test]
    fn test_invalidated_ticket_is_stale() {
        let mut gate = ScanGate::new(&RuleConfig::default());
        let ticket = gate.begin();
        gate.invalidate();
        let outcome = gate.resolve(ticket, OcrScanResult::ok(0.95, fields()));
        assert_eq!(outcome, ScanOutcome::Stale);
    }

    #[test]
    fn test_new_scan_supersedes_older_ticket() {
        let mut gate = ScanGate::new(&RuleConfig::default());
        let first = gate.begin();
        let second = gate.begin();
        assert_eq!(gate.resolve(first, OcrScanResult::ok(0.95, fields())), ScanOutcome::Stale);
        assert_eq!(
            gate.resolve(second, OcrScanResult::ok(0.95, fields())),
            ScanOutcome::Accepted(fields())
        );
    }

    #[test]
    fn test_success_without_data_fails() {
        let mut gate = ScanGate::new(&RuleConfig::default());
        let ticket = gate.begin();
        let result = OcrScanResult {
            success: true,
            confidence: 0.9,
            data: None,
            errors: Vec::new(),
        };
        assert!(matches!(gate.resolve(ticket, result), ScanOutcome::Failed(_)));
    }
}
