pub mod conflict_guard;
pub mod fee_ledger;
pub mod payroll_engine;
pub mod promotion_fees;
pub mod promotion_workflow;

pub use conflict_guard::ConflictGuard;
pub use fee_ledger::{FeeDraft, FeeLedger};
pub use payroll_engine::{GenerationOutcome, PayrollEngine};
pub use promotion_fees::PromotionFeeGenerator;
pub use promotion_workflow::PromotionWorkflow;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::SchoolError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    School(#[from] SchoolError),
    #[error("{0}")]
    Invalid(String),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("booking must end after it starts ({starts_at} .. {ends_at})")]
    InvalidRange {
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    },
    #[error("conflicts with \"{title}\" ({starts_at} .. {ends_at})")]
    SchedulingConflict {
        title: String,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    },
    #[error("classroom \"{name}\" is at capacity ({capacity})")]
    ClassroomFull { name: String, capacity: u32 },
    #[error("payment rejected: {0}")]
    InvalidPayment(String),
    #[error("no unique fee reference after {0} attempts")]
    ReferenceExhausted(usize),
}
