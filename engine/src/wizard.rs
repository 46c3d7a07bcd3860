//! Wizard step flow
//!
//! Drives the store's per-step status: a linear sequence with one active
//! step, completion predicates evaluated on demand, and a terminal
//! submitted state. Step numbering has a hole at 4 (reserved); the
//! sequence runs 1, 2, 3, 5.
//!
//! Predicates never run eagerly. Editing can leave any step's data
//! transiently invalid; only completing a step (or submitting) checks it.

use chrono::NaiveDate;
use shared::{PayorMode, StepStatus};
use thiserror::Error;

use crate::rules;
use crate::store::PaymentStore;

/// A step in the payment wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    /// Split the order total into schedules
    Schedule = 1,
    /// Decide who pays
    Payor = 2,
    /// Attach payment methods and proof documents
    Method = 3,
    /// Review and submit
    Confirm = 5,
}

impl WizardStep {
    pub const SEQUENCE: [WizardStep; 4] = [
        WizardStep::Schedule,
        WizardStep::Payor,
        WizardStep::Method,
        WizardStep::Confirm,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::SEQUENCE.into_iter().find(|s| s.number() == number)
    }

    pub fn next(self) -> Option<Self> {
        match self {
            Self::Schedule => Some(Self::Payor),
            Self::Payor => Some(Self::Method),
            Self::Method => Some(Self::Confirm),
            Self::Confirm => None,
        }
    }
}

/// Wizard flow errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("Step {0} is not active")]
    StepNotActive(u8),

    #[error("Step {0} has not been completed")]
    StepNotCompleted(u8),

    #[error("Step {step} cannot be completed: {}", .reasons.join("; "))]
    PredicateFailed { step: u8, reasons: Vec<String> },

    #[error("Payment has already been submitted")]
    AlreadySubmitted,
}

impl PaymentStore {
    pub fn step_status(&self, step: WizardStep) -> StepStatus {
        // Steps are materialized 1..=5 at construction, so the lookup
        // cannot miss.
        self.steps
            .iter()
            .copied()
            .find(|s| s.step == step.number())
            .unwrap_or(StepStatus {
                step: step.number(),
                is_completed: false,
                is_active: false,
                can_edit: false,
            })
    }

    /// The currently active step, if any
    pub fn current_step(&self) -> Option<WizardStep> {
        self.steps
            .iter()
            .find(|s| s.is_active)
            .and_then(|s| WizardStep::from_number(s.step))
    }

    /// Complete the active step, advancing the wizard
    ///
    /// Completing [`WizardStep::Confirm`] submits the payment and freezes
    /// the store.
    pub fn complete_step(&mut self, step: WizardStep, today: NaiveDate) -> Result<(), WizardError> {
        if self.submitted {
            return Err(WizardError::AlreadySubmitted);
        }
        if !self.step_status(step).is_active {
            return Err(WizardError::StepNotActive(step.number()));
        }
        if step == WizardStep::Confirm {
            for earlier in [WizardStep::Schedule, WizardStep::Payor, WizardStep::Method] {
                if !self.step_status(earlier).is_completed {
                    return Err(WizardError::StepNotCompleted(earlier.number()));
                }
            }
        }

        let reasons = self.step_blockers(step, today);
        if !reasons.is_empty() {
            return Err(WizardError::PredicateFailed {
                step: step.number(),
                reasons,
            });
        }

        self.mark_completed(step);
        if let Some(next) = step.next() {
            self.activate(Some(next));
        } else {
            self.activate(None);
            self.submitted = true;
        }
        self.refresh_can_edit();
        Ok(())
    }

    /// Reopen a completed (or the active) step for editing
    ///
    /// Downstream completion flags are preserved; their predicates run
    /// again when those steps are re-completed or at submission.
    pub fn edit_step(&mut self, step: WizardStep) -> Result<(), WizardError> {
        if self.submitted {
            return Err(WizardError::AlreadySubmitted);
        }
        let status = self.step_status(step);
        if !status.is_completed && !status.is_active {
            return Err(WizardError::StepNotCompleted(step.number()));
        }
        self.activate(Some(step));
        self.refresh_can_edit();
        Ok(())
    }

    pub fn go_to_step(&mut self, step: WizardStep) -> Result<(), WizardError> {
        self.edit_step(step)
    }

    /// Re-validate everything and submit
    pub fn submit(&mut self, today: NaiveDate) -> Result<(), WizardError> {
        self.complete_step(WizardStep::Confirm, today)
    }

    /// Reasons the given step cannot currently be completed
    pub fn step_blockers(&self, step: WizardStep, today: NaiveDate) -> Vec<String> {
        match step {
            WizardStep::Schedule => self.schedule_blockers(),
            WizardStep::Payor => self.payor_blockers(),
            WizardStep::Method => self.method_blockers(today),
            // Submission re-checks every earlier step against the current
            // data, not just the completion flags.
            WizardStep::Confirm => {
                let mut reasons = self.schedule_blockers();
                reasons.extend(self.payor_blockers());
                reasons.extend(self.method_blockers(today));
                reasons
            }
        }
    }

    fn schedule_blockers(&self) -> Vec<String> {
        let mut reasons = Vec::new();
        if self.payment.schedules.is_empty() {
            reasons.push("at least one payment schedule is required".to_string());
            return reasons;
        }
        for schedule in &self.payment.schedules {
            if schedule.amount <= 0 {
                reasons.push(format!(
                    "schedule '{}' amount must be positive",
                    schedule.label
                ));
            }
        }
        let total = self.payment.total_amount();
        let payable = self.payable_amount();
        if total != payable {
            reasons.push(format!(
                "schedule amounts total {total} but the payable amount is {payable}"
            ));
        }
        reasons
    }

    fn payor_blockers(&self) -> Vec<String> {
        let mut reasons = Vec::new();
        match self.payment.payor_mode {
            PayorMode::Single => match &self.payment.single_payor {
                None => reasons.push("payor information is required".to_string()),
                Some(payor) => {
                    if payor.name.trim().is_empty() {
                        reasons.push("payor name is required".to_string());
                    }
                    if let Some(number) = &payor.business_number
                        && !number.is_empty()
                        && !rules::is_valid_business_number(number)
                    {
                        reasons.push("payor business number is malformed".to_string());
                    }
                    if let Some(email) = &payor.tax_email
                        && !email.is_empty()
                        && !rules::is_valid_email(email)
                    {
                        reasons.push("payor tax email is malformed".to_string());
                    }
                }
            },
            PayorMode::PerSchedule => {
                for schedule in &self.payment.schedules {
                    match &schedule.payor {
                        None => reasons.push(format!("schedule '{}' has no payor", schedule.label)),
                        Some(payor) if payor.name.trim().is_empty() => reasons.push(format!(
                            "schedule '{}' payor name is required",
                            schedule.label
                        )),
                        Some(_) => {}
                    }
                }
            }
            PayorMode::SplitAmount => {
                if self.payment.split_payors.is_empty() {
                    reasons.push("at least one split payor is required".to_string());
                    return reasons;
                }
                for payor in &self.payment.split_payors {
                    if payor.payor.name.trim().is_empty() {
                        reasons.push("split payor name is required".to_string());
                    }
                }
                let total: i64 = self.payment.split_payors.iter().map(|p| p.amount).sum();
                let payable = self.payable_amount();
                if total != payable {
                    reasons.push(format!(
                        "split payor amounts total {total} but the payable amount is {payable}"
                    ));
                }
                reasons.extend(self.allocation_report().errors);
            }
        }
        reasons
    }

    fn method_blockers(&self, today: NaiveDate) -> Vec<String> {
        let mut reasons = Vec::new();
        if self.payment.payor_mode == PayorMode::SplitAmount {
            for payor in &self.payment.split_payors {
                if payor.methods.is_empty() {
                    reasons.push(format!(
                        "payor '{}' has no payment methods",
                        payor.payor.name
                    ));
                }
            }
        } else {
            for schedule in &self.payment.schedules {
                if schedule.methods.is_empty() {
                    reasons.push(format!(
                        "schedule '{}' has no payment methods",
                        schedule.label
                    ));
                }
            }
        }
        for violation in self.validate(today) {
            if violation.is_error() {
                reasons.push(violation.message);
            }
        }
        for (_, violation) in self.unacknowledged_warnings(today) {
            reasons.push(format!("unacknowledged warning: {}", violation.message));
        }
        reasons
    }

    fn mark_completed(&mut self, step: WizardStep) {
        if let Some(status) = self.steps.iter_mut().find(|s| s.step == step.number()) {
            status.is_completed = true;
        }
    }

    fn activate(&mut self, step: Option<WizardStep>) {
        let number = step.map(WizardStep::number);
        for status in &mut self.steps {
            status.is_active = Some(status.step) == number;
        }
    }

    fn refresh_can_edit(&mut self) {
        let frozen = self.submitted;
        for status in &mut self.steps {
            status.can_edit = !frozen && (status.is_completed || status.is_active);
        }
    }
}
