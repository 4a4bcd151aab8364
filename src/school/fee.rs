use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata key tagging a fee's provenance.
pub const META_SOURCE: &str = "source";
/// Metadata key carrying the grade level the fee was generated for.
pub const META_GRADE_LEVEL: &str = "grade_level";
/// Metadata key carrying the fee template the fee was generated from.
pub const META_TEMPLATE_ID: &str = "template_id";
/// Provenance value for fees produced by promotion billing.
pub const SOURCE_PROMOTION: &str = "promotion";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeeType {
    Tuition,
    Registration,
    Uniform,
    Misc,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeeStatus {
    #[default]
    Pending,
    Partial,
    Paid,
    /// Terminal; never reverted by status derivation.
    Cancelled,
}

/// A single billable obligation owed by a student for one academic period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fee {
    pub id: Uuid,
    pub student_id: Uuid,
    pub academic_period_id: Uuid,
    /// Globally unique within a school; opaque to callers.
    pub reference: String,
    pub title: String,
    pub fee_type: FeeType,
    pub amount: Decimal,
    pub paid_amount: Decimal,
    pub currency: String,
    pub due_date: NaiveDate,
    pub status: FeeStatus,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Fee {
    #[allow(clippy::too_many_arguments)]
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
            id: Uuid::new_v4(),
            student_id,
            academic_period_id,
            reference: String::new(),
            title: title.into(),
            fee_type,
            amount,
            paid_amount: Decimal::ZERO,
            currency: currency.into(),
            due_date,
            status: FeeStatus::Pending,
            paid_at: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Re-derives `status` from the paid amount. Idempotent; runs after every
    /// mutation. A cancelled fee is left untouched; a fee whose payments were
    /// reversed out of `Partial` falls back to `Pending`.
    pub fn refresh_status(&mut self, now: DateTime<Utc>) {
        if self.status == FeeStatus::Cancelled {
            return;
        }
        if self.paid_amount >= self.amount {
            self.status = FeeStatus::Paid;
            if self.paid_at.is_none() {
                self.paid_at = Some(now);
            }
        } else if self.paid_amount > Decimal::ZERO {
            self.status = FeeStatus::Partial;
        } else if self.status == FeeStatus::Partial {
            self.status = FeeStatus::Pending;
        }
    }

    /// Applies `delta` to the paid amount, clamped to `[0, amount]`, then
    /// re-derives the status. The outcome reports how much actually landed.
    pub fn apply_payment(&mut self, delta: Decimal, now: DateTime<Utc>) -> PaymentOutcome {
        let target = (self.paid_amount + delta).clamp(Decimal::ZERO, self.amount);
        let applied = target - self.paid_amount;
        self.paid_amount = target;
        self.refresh_status(now);
        PaymentOutcome {
            requested: delta,
            applied,
            clamped: applied != delta,
            status: self.status,
        }
    }

    /// Unpaid remainder; derived, never stored.
    pub fn outstanding(&self) -> Decimal {
        (self.amount - self.paid_amount).max(Decimal::ZERO)
    }

    pub fn is_tagged(&self, key: &str, value: &str) -> bool {
        self.metadata.get(key).map(String::as_str) == Some(value)
    }
}

/// Result of applying a payment, including whether the `[0, amount]` clamp
/// engaged (over- and under-payments are absorbed, not rejected).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentOutcome {
    pub requested: Decimal,
    pub applied: Decimal,
    pub clamped: bool,
    pub status: FeeStatus,
}
