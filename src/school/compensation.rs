use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::payroll::PayComponent;

/// A staff member's period-scoped salary template: base pay plus allowance
/// and deduction lines, valid from `effective_date` until `expires_on`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompensationStructure {
    pub id: Uuid,
    pub staff_id: Uuid,
    pub base_salary: Decimal,
    #[serde(default)]
    pub allowances: Vec<PayComponent>,
    #[serde(default)]
    pub deductions: Vec<PayComponent>,
    pub currency: String,
    pub effective_date: NaiveDate,
    #[serde(default)]
    pub expires_on: Option<NaiveDate>,
    pub is_active: bool,
    /// When set, the structure only applies to payrolls scoped to the same
    /// academic period; unscoped structures match any period.
    #[serde(default)]
    pub academic_period_id: Option<Uuid>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CompensationStructure {
    pub fn new(
        staff_id: Uuid,
        base_salary: Decimal,
        currency: impl Into<String>,
        effective_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            staff_id,
            base_salary,
            allowances: Vec::new(),
            deductions: Vec::new(),
            currency: currency.into(),
            effective_date,
            expires_on: None,
            is_active: true,
            academic_period_id: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    /// True when the structure can pay out for the given period window.
    pub fn covers(
        &self,
        period_start: NaiveDate,
        period_end: NaiveDate,
        academic_period: Option<Uuid>,
    ) -> bool {
        if !self.is_active || self.effective_date > period_end {
            return false;
        }
        if let Some(expiry) = self.expires_on {
            if expiry < period_start {
                return false;
            }
        }
        match self.academic_period_id {
            None => true,
            Some(scoped) => academic_period == Some(scoped),
        }
    }
}
