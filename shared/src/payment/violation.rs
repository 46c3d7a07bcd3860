//! Validation violation types
//!
//! Severity model: ERROR blocks step completion and submission; WARNING
//! never blocks but must be surfaced and explicitly acknowledged by the
//! caller before the method step can complete.

use serde::{Deserialize, Serialize};

/// Violation severity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Error,
    Warning,
}

/// Result of evaluating one rule against one method or proof
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Violation {
    /// Stable rule identifier (e.g. "cash-receipt-threshold")
    pub rule: String,
    /// Always false for emitted violations; rules that pass emit nothing
    pub passed: bool,
    /// Message naming the offending field or rule, never generic
    pub message: String,
    pub severity: Severity,
    /// Whether the caller may acknowledge and proceed anyway
    pub can_override: bool,
}

impl Violation {
    pub fn error(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            passed: false,
            message: message.into(),
            severity: Severity::Error,
            can_override: false,
        }
    }

    pub fn warning(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            passed: false,
            message: message.into(),
            severity: Severity::Warning,
            can_override: true,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Whether any unoverridable blocker exists in `violations`
pub fn has_blocking(violations: &[Violation]) -> bool {
    violations.iter().any(Violation::is_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_not_overridable() {
        let v = Violation::error("business-number-format", "business number must be 000-00-00000");
        assert!(v.is_error());
        assert!(!v.can_override);
        assert!(!v.passed);
    }

    #[test]
    fn test_warning_is_overridable() {
        let v = Violation::warning("cash-receipt-threshold", "cash receipt required above threshold");
        assert!(!v.is_error());
        assert!(v.can_override);
    }

    #[test]
    fn test_has_blocking() {
        let warnings = vec![Violation::warning("r", "m")];
        assert!(!has_blocking(&warnings));

        let mixed = vec![Violation::warning("r", "m"), Violation::error("r2", "m2")];
        assert!(has_blocking(&mixed));
    }
}
