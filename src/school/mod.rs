//! School domain records, persistence-friendly types, and the aggregate store.

pub mod booking;
pub mod compensation;
pub mod fee;
pub mod fee_template;
pub mod payroll;
pub mod people;
pub mod promotion;
#[allow(clippy::module_inception)]
pub mod school;

pub use booking::Booking;
pub use compensation::CompensationStructure;
pub use fee::{Fee, FeeStatus, FeeType, PaymentOutcome};
pub use fee_template::FeeTemplate;
pub use payroll::{
    PayComponent, Payroll, PayrollItem, PayrollItemStatus, PayrollStatus, RollupTotals,
};
pub use people::{AcademicPeriod, Classroom, GradeLevel, StaffMember, Student};
pub use promotion::{PromotionApproval, PromotionStatus};
pub use school::School;
