//! Validation rule engine
//!
//! Pure, deterministic evaluation of legal/financial rules against payment
//! methods and their proof documents. Every function takes an explicit
//! `today` so the tax-invoice deadline rule is deterministic on input.
//!
//! Rules never mutate anything and never block editing; ERROR-severity
//! violations gate wizard progress, WARNING-severity ones require explicit
//! acknowledgement by the caller.

use chrono::{Datelike, NaiveDate};
use shared::{
    BusinessInfoFields, MethodType, PaymentMethod, PaymentSchedule, ProofType, RecipientMode,
    SplitPayor, Violation,
};

use crate::config::RuleConfig;

// ── Rule identifiers ────────────────────────────────────────────────

pub const RULE_CASH_RECEIPT_THRESHOLD: &str = "cash-receipt-threshold";
pub const RULE_TAX_INVOICE_DEADLINE: &str = "tax-invoice-deadline";
pub const RULE_TAX_INVOICE_RECIPIENT: &str = "tax-invoice-recipient";
pub const RULE_BUSINESS_NUMBER_FORMAT: &str = "business-number-format";
pub const RULE_EMAIL_FORMAT: &str = "email-format";
pub const RULE_CASH_RECEIPT_NUMBER: &str = "cash-receipt-number";
pub const RULE_SCHEDULE_SUM: &str = "schedule-sum";
pub const RULE_PAYOR_SUM: &str = "payor-sum";

/// The validation rule engine
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    config: RuleConfig,
}

impl RuleEngine {
    pub fn new(config: RuleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Evaluate all method-level rules
    ///
    /// Returns only failed rules; an empty vec means the method passes.
    /// Skipped entirely when the method auto-issues receipts, when its type
    /// carries no proof, or when proof is deferred (`LATER`).
    pub fn validate_method(&self, method: &PaymentMethod, today: NaiveDate) -> Vec<Violation> {
        if method.auto_receipt || !self.config.requires_proof(method.method_type) {
            return Vec::new();
        }

        let proof_type = method
            .proof
            .as_ref()
            .map(|p| p.proof_type)
            .unwrap_or_default();

        match proof_type {
            ProofType::Later => Vec::new(),
            ProofType::None => self.check_cash_receipt_threshold(method),
            ProofType::TaxInvoice => self.check_tax_invoice(method, today),
            ProofType::CashReceipt => self.check_cash_receipt(method),
        }
    }

    /// Evaluate a schedule: its sum invariant plus every method
    pub fn validate_schedule(&self, schedule: &PaymentSchedule, today: NaiveDate) -> Vec<Violation> {
        let mut out = Vec::new();

        if !schedule.methods_balanced() {
            out.push(Violation::error(
                RULE_SCHEDULE_SUM,
                format!(
                    "schedule '{}': method amounts total {} but the schedule amount is {}",
                    schedule.label,
                    schedule.method_total(),
                    schedule.amount
                ),
            ));
        }

        for method in &schedule.methods {
            out.extend(self.validate_method(method, today));
        }
        out
    }

    /// Evaluate a split payor's share: its sum invariant plus every method
    pub fn validate_split_payor(&self, payor: &SplitPayor, today: NaiveDate) -> Vec<Violation> {
        let mut out = Vec::new();

        if !payor.methods_balanced() {
            out.push(Violation::error(
                RULE_PAYOR_SUM,
                format!(
                    "payor '{}': method amounts total {} but the payor share is {}",
                    payor.payor.name,
                    payor.method_total(),
                    payor.amount
                ),
            ));
        }

        for method in &payor.methods {
            out.extend(self.validate_method(method, today));
        }
        out
    }

    /// Evaluate every schedule
    pub fn validate_all(&self, schedules: &[PaymentSchedule], today: NaiveDate) -> Vec<Violation> {
        schedules
            .iter()
            .flat_map(|s| self.validate_schedule(s, today))
            .collect()
    }

    /// Latest permitted issue date: the configured day of the month
    /// following `today`'s month (December rolls into next January).
    /// A configured day past the month's end clamps to the last day.
    pub fn tax_invoice_deadline(&self, today: NaiveDate) -> NaiveDate {
        let (year, month) = if today.month() == 12 {
            (today.year() + 1, 1)
        } else {
            (today.year(), today.month() + 1)
        };
        let day = self
            .config
            .tax_invoice_deadline_day
            .clamp(1, last_day_of_month(year, month));
        NaiveDate::from_ymd_opt(year, month, day).unwrap_or(today)
    }

    // ── Individual rules ────────────────────────────────────────────

    fn check_cash_receipt_threshold(&self, method: &PaymentMethod) -> Vec<Violation> {
        if method.method_type == MethodType::BankTransfer
            && method.amount >= self.config.cash_receipt_threshold
        {
            return vec![Violation::warning(
                RULE_CASH_RECEIPT_THRESHOLD,
                format!(
                    "bank transfer of {} meets the cash receipt threshold ({}); a cash receipt is legally required",
                    method.amount, self.config.cash_receipt_threshold
                ),
            )];
        }
        Vec::new()
    }

    fn check_tax_invoice(&self, method: &PaymentMethod, today: NaiveDate) -> Vec<Violation> {
        let mut out = Vec::new();
        let Some(proof) = &method.proof else {
            return out;
        };

        if proof.preferred_issue_date
            && let Some(issue_date) = proof.issue_date
        {
            let deadline = self.tax_invoice_deadline(today);
            if issue_date > deadline {
                out.push(Violation::error(
                    RULE_TAX_INVOICE_DEADLINE,
                    format!(
                        "tax invoice issue date {} is past the legal deadline {}",
                        issue_date, deadline
                    ),
                ));
            }
        }

        if proof.recipient_mode == RecipientMode::Different {
            match &proof.different_recipient {
                Some(recipient) => out.extend(check_recipient(recipient)),
                None => out.push(Violation::error(
                    RULE_TAX_INVOICE_RECIPIENT,
                    "alternate recipient details are required when issuing to a different recipient",
                )),
            }
        }

        out
    }

    fn check_cash_receipt(&self, method: &PaymentMethod) -> Vec<Violation> {
        let number = method
            .proof
            .as_ref()
            .and_then(|p| p.cash_receipt_number.as_deref())
            .unwrap_or("");
        if number.trim().is_empty() {
            return vec![Violation::error(
                RULE_CASH_RECEIPT_NUMBER,
                "cash receipt number is required",
            )];
        }
        Vec::new()
    }
}

/// Completeness and format checks for an alternate invoice recipient
fn check_recipient(recipient: &BusinessInfoFields) -> Vec<Violation> {
    let mut out = Vec::new();

    for (value, field) in [
        (&recipient.business_number, "business number"),
        (&recipient.company_name, "company name"),
        (&recipient.tax_email, "tax email"),
    ] {
        if value.trim().is_empty() {
            out.push(Violation::error(
                RULE_TAX_INVOICE_RECIPIENT,
                format!("alternate recipient {field} must not be empty"),
            ));
        }
    }

    if !recipient.business_number.trim().is_empty()
        && !is_valid_business_number(&recipient.business_number)
    {
        out.push(Violation::error(
            RULE_BUSINESS_NUMBER_FORMAT,
            format!(
                "business number '{}' must use the 000-00-00000 format",
                recipient.business_number
            ),
        ));
    }

    if !recipient.tax_email.trim().is_empty() && !is_valid_email(&recipient.tax_email) {
        out.push(Violation::error(
            RULE_EMAIL_FORMAT,
            format!("tax email '{}' is not a valid email address", recipient.tax_email),
        ));
    }

    out
}

fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map_or(28, |d| d.day())
}

/// Business registration numbers use 3-2-5 digit groups: 000-00-00000
pub fn is_valid_business_number(value: &str) -> bool {
    let parts: Vec<&str> = value.split('-').collect();
    parts.len() == 3
        && parts[0].len() == 3
        && parts[1].len() == 2
        && parts[2].len() == 5
        && parts.iter().all(|p| p.bytes().all(|b| b.is_ascii_digit()))
}

/// Minimal structural email check: one '@', non-empty local part, dotted
/// domain without leading/trailing dots or whitespace
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
