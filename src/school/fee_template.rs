use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::fee::FeeType;
use super::people::GradeLevel;

/// A grade-scoped rule for automatically generating a fee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeTemplate {
    pub id: Uuid,
    pub title: String,
    pub grade_level: GradeLevel,
    pub fee_type: FeeType,
    pub amount: Decimal,
    pub currency: String,
    /// Days after the target period's start before the fee falls due; `None`
    /// defers to the configured default.
    #[serde(default)]
    pub due_in_days: Option<i64>,
    pub is_active: bool,
}

impl FeeTemplate {
    pub fn new(
        title: impl Into<String>,
        grade_level: GradeLevel,
        fee_type: FeeType,
        amount: Decimal,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            grade_level,
            fee_type,
            amount,
            currency: currency.into(),
            due_in_days: None,
            is_active: true,
        }
    }
}
