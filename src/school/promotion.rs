use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::people::GradeLevel;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PromotionStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// A request/decision record governing a student's advancement to a new
/// grade, classroom, and academic period. Terminal states are set exactly
/// once by a decision action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionApproval {
    pub id: Uuid,
    pub student_id: Uuid,
    pub from_period_id: Uuid,
    pub target_period_id: Uuid,
    pub target_grade: GradeLevel,
    #[serde(default)]
    pub target_classroom_id: Option<Uuid>,
    /// Snapshot of the student's outstanding fees at request time; not
    /// live-linked.
    pub outstanding_amount: Decimal,
    pub status: PromotionStatus,
    pub requested_by: String,
    #[serde(default)]
    pub decided_by: Option<String>,
    #[serde(default)]
    pub decided_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub decision_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PromotionApproval {
    pub fn new(
        student_id: Uuid,
        from_period_id: Uuid,
        target_period_id: Uuid,
        target_grade: GradeLevel,
        requested_by: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id,
            from_period_id,
            target_period_id,
            target_grade,
            target_classroom_id: None,
            outstanding_amount: Decimal::ZERO,
            status: PromotionStatus::Pending,
            requested_by: requested_by.into(),
            decided_by: None,
            decided_at: None,
            notes: None,
            decision_notes: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == PromotionStatus::Pending
    }
}
