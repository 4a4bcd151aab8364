//! Fee lifecycle: creation, payment application, and status derivation.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::core::services::{ServiceError, ServiceResult};
use crate::errors::SchoolError;
use crate::school::{Fee, FeeStatus, FeeType, PaymentOutcome, School};

/// Upper bound on reference regeneration before giving up.
pub const MAX_REFERENCE_ATTEMPTS: usize = 16;

const REFERENCE_PREFIX: &str = "FEE";

/// Draft values for a new fee; leaving `reference` unset asks the ledger to
/// allocate a unique one.
#[derive(Debug, Clone)]
pub struct FeeDraft {
    pub student_id: Uuid,
    pub academic_period_id: Uuid,
    pub reference: Option<String>,
    pub title: String,
    pub fee_type: FeeType,
    pub amount: Decimal,
    pub currency: String,
    pub due_date: NaiveDate,
    pub status: FeeStatus,
    pub metadata: BTreeMap<String, String>,
}

impl FeeDraft {
    pub fn new(
        student_id: Uuid,
        academic_period_id: Uuid,
        title: impl Into<String>,
        fee_type: FeeType,
        amount: Decimal,
        currency: impl Into<String>,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            student_id,
            academic_period_id,
            reference: None,
            title: title.into(),
            fee_type,
            amount,
            currency: currency.into(),
            due_date,
            status: FeeStatus::Pending,
            metadata: BTreeMap::new(),
        }
    }
}

/// Owns the lifecycle of billable obligations: creation with unique
/// references, clamped payment application, and pure status derivation.
pub struct FeeLedger;

impl FeeLedger {
    /// Creates a fee from the draft. The paid amount starts at zero and the
    /// status is seeded by the derivation rule.
    pub fn create(school: &mut School, draft: FeeDraft) -> ServiceResult<Uuid> {
        if draft.amount < Decimal::ZERO {
            return Err(ServiceError::Invalid(
                "fee amount must not be negative".into(),
            ));
        }
        let reference = match draft.reference {
            Some(reference) if !reference.trim().is_empty() => {
                if school.fee_by_reference(&reference).is_some() {
                    return Err(
                        SchoolError::Duplicate(format!("fee reference {reference}")).into(),
                    );
                }
                reference
            }
            _ => Self::allocate_reference(school)?,
        };

        let mut fee = Fee::new(
            draft.student_id,
            draft.academic_period_id,
            draft.title,
            draft.fee_type,
            draft.amount,
            draft.currency,
            draft.due_date,
        );
        fee.reference = reference;
        fee.status = draft.status;
        fee.metadata = draft.metadata;
        fee.refresh_status(Utc::now());

        let id = school.add_fee(fee)?;
        Ok(id)
    }

    /// Applies `delta` to the fee's paid amount, clamped to `[0, amount]`.
    /// Over- and under-payments are absorbed by the clamp rather than
    /// rejected; the outcome reports how much actually landed so callers can
    /// surface the difference. Payments against a cancelled fee are rejected.
    pub fn record_payment(
        school: &mut School,
        fee_id: Uuid,
        delta: Decimal,
    ) -> ServiceResult<PaymentOutcome> {
        let fee = school.fee_mut(fee_id).ok_or(ServiceError::NotFound {
            entity: "fee",
            id: fee_id,
        })?;
        if fee.status == FeeStatus::Cancelled {
            return Err(ServiceError::InvalidPayment(format!(
                "fee {} is cancelled",
                fee.reference
            )));
        }
        let outcome = fee.apply_payment(delta, Utc::now());
        if outcome.clamped {
            tracing::debug!(
                fee = %fee_id,
                requested = %outcome.requested,
                applied = %outcome.applied,
                "payment clamped to the fee's bounds"
            );
        }
        school.touch();
        Ok(outcome)
    }

    /// Unpaid remainder of a fee; a derived view, never stored.
    pub fn outstanding(fee: &Fee) -> Decimal {
        fee.outstanding()
    }

    fn allocate_reference(school: &School) -> ServiceResult<String> {
        for _ in 0..MAX_REFERENCE_ATTEMPTS {
            let candidate = Self::candidate_reference();
            if school.fee_by_reference(&candidate).is_none() {
                return Ok(candidate);
            }
        }
        Err(ServiceError::ReferenceExhausted(MAX_REFERENCE_ATTEMPTS))
    }

    fn candidate_reference() -> String {
        let token = Uuid::new_v4().simple().to_string();
        format!(
            "{REFERENCE_PREFIX}-{}-{}",
            Utc::now().format("%Y%m%d"),
            token[..6].to_uppercase()
        )
    }
}
