//! Payment state store
//!
//! Owns the [`UnifiedPayment`] aggregate and is the only place it is
//! mutated. Every operation either applies fully or returns a
//! [`StoreError`] with the aggregate untouched. Rule violations are not
//! errors at this layer; editing an aggregate into a transiently invalid
//! state is normal, and the wizard gates progress on validation instead.

mod error;

pub use error::{StoreError, StoreResult};

use std::collections::HashSet;

use chrono::NaiveDate;
use shared::{
    AllocationInput, ContractSigner, MethodChanges, MethodDetails, MethodInput, PaymentMethod,
    PayorInfo, PayorMode, ProofDocument, ScheduleChanges, ScheduleInput, SplitPayorInput,
    StepStatus, UnifiedPayment, Violation,
};
use tracing::debug;

use crate::allocation;
use crate::config::RuleConfig;
use crate::rules::RuleEngine;
use crate::sync::{self, AmountChange, ReconcileAction};

/// Where a payment method lives: on a schedule (single / per-schedule payor
/// modes) or on a split payor (split-amount mode)
///
/// Method operations are identical on both sides, so they take a host
/// instead of being duplicated per collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodHost {
    Schedule(String),
    SplitPayor(String),
}

impl MethodHost {
    pub fn schedule(id: impl Into<String>) -> Self {
        Self::Schedule(id.into())
    }

    pub fn split_payor(id: impl Into<String>) -> Self {
        Self::SplitPayor(id.into())
    }
}

/// The payment composition store
///
/// Field access stays inside the crate; the wizard layer drives step
/// status directly and everything else goes through the operations here.
#[derive(Debug, Clone)]
pub struct PaymentStore {
    pub(crate) order_total: i64,
    pub(crate) payment: UnifiedPayment,
    pub(crate) steps: Vec<StepStatus>,
    pub(crate) rules: RuleEngine,
    /// (method id, rule id) pairs the operator has explicitly overridden
    pub(crate) acknowledged: HashSet<(String, String)>,
    pub(crate) submitted: bool,
}

impl PaymentStore {
    pub fn new(order_total: i64) -> Self {
        Self::with_config(order_total, RuleConfig::default())
    }

    pub fn with_config(order_total: i64, config: RuleConfig) -> Self {
        let steps = (1u8..=5)
            .map(|step| StepStatus {
                step,
                is_completed: false,
                // Step 4 is reserved and never activates.
                is_active: step == 1,
                can_edit: step == 1,
            })
            .collect();
        Self {
            order_total,
            payment: UnifiedPayment::new(order_total),
            steps,
            rules: RuleEngine::new(config),
            acknowledged: HashSet::new(),
            submitted: false,
        }
    }

    // ========================================================================
    // Read access
    // ========================================================================

    pub fn payment(&self) -> &UnifiedPayment {
        &self.payment
    }

    pub fn steps(&self) -> &[StepStatus] {
        &self.steps
    }

    pub fn order_total(&self) -> i64 {
        self.order_total
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Amount the schedules must cover: the order total less any deposit
    /// being applied
    pub fn payable_amount(&self) -> i64 {
        if self.payment.use_deposit {
            self.order_total - self.payment.deposit_amount
        } else {
            self.order_total
        }
    }

    pub fn total_amount(&self) -> i64 {
        self.payment.total_amount()
    }

    pub fn has_deferred(&self) -> bool {
        self.payment.has_deferred()
    }

    fn ensure_editable(&self) -> StoreResult<()> {
        if self.submitted {
            return Err(StoreError::InvalidOperation(
                "payment has already been submitted".to_string(),
            ));
        }
        Ok(())
    }

    // ========================================================================
    // Schedules
    // ========================================================================

    pub fn add_schedule(&mut self, input: ScheduleInput) -> StoreResult<String> {
        self.ensure_editable()?;
        if input.amount < 0 {
            return Err(StoreError::InvalidAmount(format!(
                "schedule amount must not be negative: {}",
                input.amount
            )));
        }

        let mut schedule =
            shared::PaymentSchedule::new(input.label, input.amount, input.timing);
        schedule.due_date = input.due_date;
        schedule.due_time = input.due_time;
        schedule.payor = input.payor;
        let id = schedule.id.clone();
        debug!(schedule_id = %id, amount = schedule.amount, "add schedule");
        self.payment.schedules.push(schedule);
        Ok(id)
    }

    pub fn update_schedule(&mut self, id: &str, changes: ScheduleChanges) -> StoreResult<()> {
        self.ensure_editable()?;
        let schedule = self
            .payment
            .schedules
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::ScheduleNotFound(id.to_string()))?;

        if let Some(label) = changes.label {
            schedule.label = label;
        }
        if let Some(timing) = changes.timing {
            schedule.timing = timing;
        }
        if let Some(due_date) = changes.due_date {
            schedule.due_date = Some(due_date);
        }
        if let Some(due_time) = changes.due_time {
            schedule.due_time = Some(due_time);
        }
        if let Some(payor) = changes.payor {
            schedule.payor = Some(payor);
        }
        debug!(schedule_id = %id, "update schedule");
        Ok(())
    }

    /// Remove a schedule along with its allocation rows
    pub fn remove_schedule(&mut self, id: &str) -> StoreResult<()> {
        self.ensure_editable()?;
        let index = self
            .payment
            .schedules
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| StoreError::ScheduleNotFound(id.to_string()))?;

        let removed = self.payment.schedules.remove(index);
        self.payment
            .schedule_payor_allocations
            .retain(|a| a.schedule_id != id);
        self.prune_acknowledgements(&removed.methods);
        debug!(schedule_id = %id, "remove schedule");
        Ok(())
    }

    // ========================================================================
    // Amount change reconciliation
    // ========================================================================

    /// Request a top-level amount change on a schedule or split payor
    ///
    /// Returns `Ok(None)` when the change needed no reconciliation and has
    /// already been applied (no methods yet, or no actual difference).
    /// Otherwise nothing is mutated and the returned plan must be passed to
    /// [`apply_amount_change`](Self::apply_amount_change) with a chosen
    /// action.
    pub fn request_amount_change(
        &mut self,
        host: &MethodHost,
        new_amount: i64,
    ) -> StoreResult<Option<AmountChange>> {
        self.ensure_editable()?;
        if new_amount < 0 {
            return Err(StoreError::InvalidAmount(format!(
                "amount must not be negative: {new_amount}"
            )));
        }

        let (amount, methods) = self.host_slot(host)?;
        if methods.is_empty() {
            *amount = new_amount;
            debug!(?host, new_amount, "amount change applied directly");
            return Ok(None);
        }
        Ok(sync::plan_amount_change(*amount, new_amount, methods))
    }

    /// Apply a planned amount change with the chosen reconciliation action
    ///
    /// The new amount and the transformed method list land atomically. The
    /// plan is rejected if the host's amount moved since it was computed.
    pub fn apply_amount_change(
        &mut self,
        host: &MethodHost,
        change: &AmountChange,
        action: ReconcileAction,
    ) -> StoreResult<()> {
        self.ensure_editable()?;
        let (amount, methods) = self.host_slot(host)?;
        if *amount != change.original_amount {
            return Err(StoreError::InvalidOperation(format!(
                "amount moved since the change was planned: expected {}, found {}",
                change.original_amount, *amount
            )));
        }

        let next = sync::apply_action(action, change, methods);
        let kept: HashSet<&str> = next.iter().map(|m| m.id.as_str()).collect();
        let removed: Vec<PaymentMethod> = methods
            .iter()
            .filter(|m| !kept.contains(m.id.as_str()))
            .cloned()
            .collect();

        *amount = change.new_amount;
        *methods = next;
        self.prune_acknowledgements(&removed);
        debug!(?host, ?action, new_amount = change.new_amount, "amount change applied");
        Ok(())
    }

    // ========================================================================
    // Methods
    // ========================================================================

    pub fn add_method(&mut self, host: &MethodHost, input: MethodInput) -> StoreResult<String> {
        self.ensure_editable()?;
        if input.amount < 0 {
            return Err(StoreError::InvalidAmount(format!(
                "method amount must not be negative: {}",
                input.amount
            )));
        }
        let details = input
            .details
            .unwrap_or_else(|| MethodDetails::empty_for(input.method_type));
        if details.method_type() != input.method_type {
            return Err(StoreError::InvalidOperation(format!(
                "details payload is {:?} but the method type is {:?}",
                details.method_type(),
                input.method_type
            )));
        }

        let mut method = PaymentMethod::new(input.method_type, input.amount, details);
        method.auto_receipt = input.auto_receipt;
        let id = method.id.clone();

        let (_, methods) = self.host_slot(host)?;
        methods.push(method);
        debug!(?host, method_id = %id, "add method");
        Ok(id)
    }

    pub fn update_method(
        &mut self,
        host: &MethodHost,
        method_id: &str,
        changes: MethodChanges,
    ) -> StoreResult<()> {
        self.ensure_editable()?;
        if let Some(amount) = changes.amount
            && amount < 0
        {
            return Err(StoreError::InvalidAmount(format!(
                "method amount must not be negative: {amount}"
            )));
        }

        let (_, methods) = self.host_slot(host)?;
        let method = methods
            .iter_mut()
            .find(|m| m.id == method_id)
            .ok_or_else(|| StoreError::MethodNotFound(method_id.to_string()))?;

        if let Some(amount) = changes.amount {
            method.amount = amount;
        }
        if let Some(details) = changes.details {
            method.method_type = details.method_type();
            method.details = details;
        }
        if let Some(auto_receipt) = changes.auto_receipt {
            method.auto_receipt = auto_receipt;
        }
        debug!(?host, method_id = %method_id, "update method");
        Ok(())
    }

    pub fn remove_method(&mut self, host: &MethodHost, method_id: &str) -> StoreResult<()> {
        self.ensure_editable()?;
        let (_, methods) = self.host_slot(host)?;
        let index = methods
            .iter()
            .position(|m| m.id == method_id)
            .ok_or_else(|| StoreError::MethodNotFound(method_id.to_string()))?;
        let removed = methods.remove(index);
        self.prune_acknowledgements(std::slice::from_ref(&removed));
        debug!(?host, method_id = %method_id, "remove method");
        Ok(())
    }

    /// Set or clear a method's proof document
    ///
    /// A changed proof discards earlier warning overrides for the method;
    /// its violations are recomputed from scratch.
    pub fn set_method_proof(
        &mut self,
        host: &MethodHost,
        method_id: &str,
        proof: Option<ProofDocument>,
    ) -> StoreResult<()> {
        self.ensure_editable()?;
        let (_, methods) = self.host_slot(host)?;
        let method = methods
            .iter_mut()
            .find(|m| m.id == method_id)
            .ok_or_else(|| StoreError::MethodNotFound(method_id.to_string()))?;
        method.proof = proof;
        self.acknowledged.retain(|(m, _)| m != method_id);
        debug!(?host, method_id = %method_id, "set method proof");
        Ok(())
    }

    // ========================================================================
    // Payors
    // ========================================================================

    pub fn set_payor_mode(&mut self, mode: PayorMode) -> StoreResult<()> {
        self.ensure_editable()?;
        self.payment.payor_mode = mode;
        debug!(?mode, "set payor mode");
        Ok(())
    }

    pub fn set_single_payor(&mut self, payor: PayorInfo) -> StoreResult<()> {
        self.ensure_editable()?;
        self.payment.single_payor = Some(payor);
        Ok(())
    }

    pub fn add_split_payor(&mut self, input: SplitPayorInput) -> StoreResult<String> {
        self.ensure_editable()?;
        if input.amount < 0 {
            return Err(StoreError::InvalidAmount(format!(
                "split payor amount must not be negative: {}",
                input.amount
            )));
        }
        let payor = shared::SplitPayor::new(input.payor, input.amount);
        let id = payor.id.clone();
        debug!(split_payor_id = %id, amount = payor.amount, "add split payor");
        self.payment.split_payors.push(payor);
        Ok(id)
    }

    pub fn update_split_payor_info(&mut self, id: &str, info: PayorInfo) -> StoreResult<()> {
        self.ensure_editable()?;
        let payor = self
            .payment
            .split_payors
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::PayorNotFound(id.to_string()))?;
        payor.payor = info;
        Ok(())
    }

    /// Remove a split payor along with its allocation rows
    pub fn remove_split_payor(&mut self, id: &str) -> StoreResult<()> {
        self.ensure_editable()?;
        let index = self
            .payment
            .split_payors
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StoreError::PayorNotFound(id.to_string()))?;

        let removed = self.payment.split_payors.remove(index);
        self.payment
            .schedule_payor_allocations
            .retain(|a| a.split_payor_id != id);
        self.prune_acknowledgements(&removed.methods);
        debug!(split_payor_id = %id, "remove split payor");
        Ok(())
    }

    // ========================================================================
    // Allocations
    // ========================================================================

    pub fn add_allocation(&mut self, input: AllocationInput) -> StoreResult<String> {
        self.ensure_editable()?;
        if self.payment.schedule(&input.schedule_id).is_none() {
            return Err(StoreError::ScheduleNotFound(input.schedule_id));
        }
        if self.payment.split_payor(&input.split_payor_id).is_none() {
            return Err(StoreError::PayorNotFound(input.split_payor_id));
        }
        if input.amount <= 0 {
            return Err(StoreError::InvalidAmount(format!(
                "allocation amount must be positive: {}",
                input.amount
            )));
        }
        let occupied = self.payment.schedule_payor_allocations.iter().any(|a| {
            a.schedule_id == input.schedule_id && a.split_payor_id == input.split_payor_id
        });
        if occupied {
            return Err(StoreError::DuplicateAllocation {
                schedule_id: input.schedule_id,
                split_payor_id: input.split_payor_id,
            });
        }

        let allocation = shared::SchedulePayorAllocation::new(
            input.schedule_id,
            input.split_payor_id,
            input.amount,
        );
        let id = allocation.id.clone();
        debug!(allocation_id = %id, amount = allocation.amount, "add allocation");
        self.payment.schedule_payor_allocations.push(allocation);
        Ok(id)
    }

    pub fn update_allocation(&mut self, id: &str, amount: i64) -> StoreResult<()> {
        self.ensure_editable()?;
        if amount <= 0 {
            return Err(StoreError::InvalidAmount(format!(
                "allocation amount must be positive: {amount}"
            )));
        }
        let allocation = self
            .payment
            .schedule_payor_allocations
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::AllocationNotFound(id.to_string()))?;
        allocation.amount = amount;
        Ok(())
    }

    pub fn remove_allocation(&mut self, id: &str) -> StoreResult<()> {
        self.ensure_editable()?;
        let index = self
            .payment
            .schedule_payor_allocations
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| StoreError::AllocationNotFound(id.to_string()))?;
        self.payment.schedule_payor_allocations.remove(index);
        Ok(())
    }

    /// Validate the full allocation matrix against the current payors and
    /// schedules
    pub fn allocation_report(&self) -> allocation::AllocationReport {
        allocation::validate_all_allocations(
            &self.payment.schedules,
            &self.payment.split_payors,
            &self.payment.schedule_payor_allocations,
        )
    }

    // ========================================================================
    // Deposit
    // ========================================================================

    pub fn set_available_deposit(&mut self, amount: i64) -> StoreResult<()> {
        self.ensure_editable()?;
        if amount < 0 {
            return Err(StoreError::InvalidAmount(format!(
                "available deposit must not be negative: {amount}"
            )));
        }
        self.payment.available_deposit = amount;
        if self.payment.deposit_amount > amount {
            self.payment.deposit_amount = amount;
        }
        Ok(())
    }

    pub fn set_use_deposit(&mut self, enabled: bool) -> StoreResult<()> {
        self.ensure_editable()?;
        self.payment.use_deposit = enabled;
        if !enabled {
            self.payment.deposit_amount = 0;
        }
        Ok(())
    }

    pub fn set_deposit_amount(&mut self, amount: i64) -> StoreResult<()> {
        self.ensure_editable()?;
        if !self.payment.use_deposit {
            return Err(StoreError::InvalidOperation(
                "deposit is not enabled".to_string(),
            ));
        }
        // Bounded by the order total as well, so the payable amount can
        // never go negative.
        let limit = self.payment.available_deposit.min(self.order_total);
        if amount < 0 || amount > limit {
            return Err(StoreError::InvalidAmount(format!(
                "deposit amount must be between 0 and {limit}: {amount}"
            )));
        }
        self.payment.deposit_amount = amount;
        Ok(())
    }

    // ========================================================================
    // Contract signers
    // ========================================================================

    pub fn set_contract_signers(&mut self, signers: Vec<ContractSigner>) -> StoreResult<()> {
        self.ensure_editable()?;
        self.payment.contract_signers = signers;
        Ok(())
    }

    // ========================================================================
    // Validation and warning overrides
    // ========================================================================

    /// All current rule violations
    ///
    /// Schedules are always checked; split payors only carry methods in
    /// split-amount mode, so they are checked in that mode alone.
    pub fn validate(&self, today: NaiveDate) -> Vec<Violation> {
        let mut out = self.rules.validate_all(&self.payment.schedules, today);
        if self.payment.payor_mode == PayorMode::SplitAmount {
            for payor in &self.payment.split_payors {
                out.extend(self.rules.validate_split_payor(payor, today));
            }
        }
        out
    }

    /// Record the operator's override of an overridable warning
    pub fn acknowledge_warning(&mut self, method_id: &str, rule: &str) -> StoreResult<()> {
        self.ensure_editable()?;
        if self.find_method(method_id).is_none() {
            return Err(StoreError::MethodNotFound(method_id.to_string()));
        }
        debug!(method_id = %method_id, rule = %rule, "acknowledge warning");
        self.acknowledged
            .insert((method_id.to_string(), rule.to_string()));
        Ok(())
    }

    pub fn is_warning_acknowledged(&self, method_id: &str, rule: &str) -> bool {
        self.acknowledged
            .contains(&(method_id.to_string(), rule.to_string()))
    }

    /// Warnings not yet overridden, paired with the offending method's id
    pub fn unacknowledged_warnings(&self, today: NaiveDate) -> Vec<(String, Violation)> {
        let mut out = Vec::new();
        for method in self.all_methods() {
            for violation in self.rules.validate_method(method, today) {
                if !violation.is_error()
                    && !self.is_warning_acknowledged(&method.id, &violation.rule)
                {
                    out.push((method.id.clone(), violation));
                }
            }
        }
        out
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn host_slot(
        &mut self,
        host: &MethodHost,
    ) -> StoreResult<(&mut i64, &mut Vec<PaymentMethod>)> {
        match host {
            MethodHost::Schedule(id) => {
                let schedule = self
                    .payment
                    .schedules
                    .iter_mut()
                    .find(|s| s.id == *id)
                    .ok_or_else(|| StoreError::ScheduleNotFound(id.clone()))?;
                Ok((&mut schedule.amount, &mut schedule.methods))
            }
            MethodHost::SplitPayor(id) => {
                let payor = self
                    .payment
                    .split_payors
                    .iter_mut()
                    .find(|p| p.id == *id)
                    .ok_or_else(|| StoreError::PayorNotFound(id.clone()))?;
                Ok((&mut payor.amount, &mut payor.methods))
            }
        }
    }

    fn all_methods(&self) -> impl Iterator<Item = &PaymentMethod> {
        self.payment
            .schedules
            .iter()
            .flat_map(|s| &s.methods)
            .chain(self.payment.split_payors.iter().flat_map(|p| &p.methods))
    }

    fn find_method(&self, method_id: &str) -> Option<&PaymentMethod> {
        self.all_methods().find(|m| m.id == method_id)
    }

    fn prune_acknowledgements(&mut self, removed: &[PaymentMethod]) {
        if removed.is_empty() {
            return;
        }
        let ids: HashSet<&str> = removed.iter().map(|m| m.id.as_str()).collect();
        self.acknowledged.retain(|(m, _)| !ids.contains(m.as_str()));
    }
}

#[cfg(test)]
mod tests;
