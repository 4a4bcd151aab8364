use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::SchoolError;

use super::{
    booking::Booking,
    compensation::CompensationStructure,
    fee::Fee,
    fee_template::FeeTemplate,
    payroll::{Payroll, PayrollItem},
    people::{AcademicPeriod, Classroom, StaffMember, Student},
    promotion::{PromotionApproval, PromotionStatus},
};

const CURRENT_SCHEMA_VERSION: u8 = 1;

/// The aggregate store every engine operates against. Insertion helpers
/// enforce the uniqueness constraints the engines rely on (fee and payroll
/// references, one payroll item per (payroll, staff) pair).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct School {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub periods: Vec<AcademicPeriod>,
    #[serde(default)]
    pub classrooms: Vec<Classroom>,
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub staff: Vec<StaffMember>,
    #[serde(default)]
    pub fees: Vec<Fee>,
    #[serde(default)]
    pub fee_templates: Vec<FeeTemplate>,
    #[serde(default)]
    pub payrolls: Vec<Payroll>,
    #[serde(default)]
    pub payroll_items: Vec<PayrollItem>,
    #[serde(default)]
    pub compensation_structures: Vec<CompensationStructure>,
    #[serde(default)]
    pub promotion_approvals: Vec<PromotionApproval>,
    #[serde(default)]
    pub bookings: Vec<Booking>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "School::schema_version_default")]
    pub schema_version: u8,
}

impl School {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            periods: Vec::new(),
            classrooms: Vec::new(),
            students: Vec::new(),
            staff: Vec::new(),
            fees: Vec::new(),
            fee_templates: Vec::new(),
            payrolls: Vec::new(),
            payroll_items: Vec::new(),
            compensation_structures: Vec::new(),
            promotion_approvals: Vec::new(),
            bookings: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    /// Runs `f` against a scratch copy of the store and commits the copy only
    /// when `f` succeeds, so multi-step writes land all-or-nothing.
    pub fn transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut School) -> Result<T, E>,
    {
        let mut staged = self.clone();
        let value = f(&mut staged)?;
        *self = staged;
        Ok(value)
    }

    pub fn add_period(&mut self, period: AcademicPeriod) -> Uuid {
        let id = period.id;
        self.periods.push(period);
        self.touch();
        id
    }

    pub fn add_classroom(&mut self, classroom: Classroom) -> Uuid {
        let id = classroom.id;
        self.classrooms.push(classroom);
        self.touch();
        id
    }

    pub fn add_student(&mut self, student: Student) -> Uuid {
        let id = student.id;
        self.students.push(student);
        self.touch();
        id
    }

    pub fn add_staff_member(&mut self, member: StaffMember) -> Uuid {
        let id = member.id;
        self.staff.push(member);
        self.touch();
        id
    }

    /// Rejects a fee whose reference is already taken.
    pub fn add_fee(&mut self, fee: Fee) -> Result<Uuid, SchoolError> {
        if fee.reference.is_empty() {
            return Err(SchoolError::InvalidRef("fee reference is empty".into()));
        }
        if self.fee_by_reference(&fee.reference).is_some() {
            return Err(SchoolError::Duplicate(format!(
                "fee reference {}",
                fee.reference
            )));
        }
        let id = fee.id;
        self.fees.push(fee);
        self.touch();
        Ok(id)
    }

    pub fn add_fee_template(&mut self, template: FeeTemplate) -> Uuid {
        let id = template.id;
        self.fee_templates.push(template);
        self.touch();
        id
    }

    /// Rejects a payroll whose reference is already taken.
    pub fn add_payroll(&mut self, payroll: Payroll) -> Result<Uuid, SchoolError> {
        if self
            .payrolls
            .iter()
            .any(|existing| existing.reference == payroll.reference)
        {
            return Err(SchoolError::Duplicate(format!(
                "payroll reference {}",
                payroll.reference
            )));
        }
        let id = payroll.id;
        self.payrolls.push(payroll);
        self.touch();
        Ok(id)
    }

    /// Rejects a second item for the same (payroll, staff) pair.
    pub fn add_payroll_item(&mut self, item: PayrollItem) -> Result<Uuid, SchoolError> {
        if self
            .payroll_item_for(item.payroll_id, item.staff_id)
            .is_some()
        {
            return Err(SchoolError::Duplicate(format!(
                "payroll item for staff {} in payroll {}",
                item.staff_id, item.payroll_id
            )));
        }
        let id = item.id;
        self.payroll_items.push(item);
        self.touch();
        Ok(id)
    }

    pub fn add_compensation_structure(&mut self, structure: CompensationStructure) -> Uuid {
        let id = structure.id;
        self.compensation_structures.push(structure);
        self.touch();
        id
    }

    pub fn add_promotion_approval(&mut self, approval: PromotionApproval) -> Uuid {
        let id = approval.id;
        self.promotion_approvals.push(approval);
        self.touch();
        id
    }

    pub fn add_booking(&mut self, booking: Booking) -> Uuid {
        let id = booking.id;
        self.bookings.push(booking);
        self.touch();
        id
    }

    pub fn period(&self, id: Uuid) -> Option<&AcademicPeriod> {
        self.periods.iter().find(|period| period.id == id)
    }

    pub fn classroom(&self, id: Uuid) -> Option<&Classroom> {
        self.classrooms.iter().find(|classroom| classroom.id == id)
    }

    pub fn student(&self, id: Uuid) -> Option<&Student> {
        self.students.iter().find(|student| student.id == id)
    }

    pub fn student_mut(&mut self, id: Uuid) -> Option<&mut Student> {
        self.students.iter_mut().find(|student| student.id == id)
    }

    pub fn staff_member(&self, id: Uuid) -> Option<&StaffMember> {
        self.staff.iter().find(|member| member.id == id)
    }

    pub fn fee(&self, id: Uuid) -> Option<&Fee> {
        self.fees.iter().find(|fee| fee.id == id)
    }

    pub fn fee_mut(&mut self, id: Uuid) -> Option<&mut Fee> {
        self.fees.iter_mut().find(|fee| fee.id == id)
    }

    pub fn fee_by_reference(&self, reference: &str) -> Option<&Fee> {
        self.fees.iter().find(|fee| fee.reference == reference)
    }

    pub fn fees_for_student(&self, student_id: Uuid) -> Vec<&Fee> {
        self.fees
            .iter()
            .filter(|fee| fee.student_id == student_id)
            .collect()
    }

    pub fn payroll(&self, id: Uuid) -> Option<&Payroll> {
        self.payrolls.iter().find(|payroll| payroll.id == id)
    }

    pub fn payroll_mut(&mut self, id: Uuid) -> Option<&mut Payroll> {
        self.payrolls.iter_mut().find(|payroll| payroll.id == id)
    }

    pub fn payroll_items_for(&self, payroll_id: Uuid) -> Vec<&PayrollItem> {
        self.payroll_items
            .iter()
            .filter(|item| item.payroll_id == payroll_id)
            .collect()
    }

    pub fn payroll_item_for(&self, payroll_id: Uuid, staff_id: Uuid) -> Option<&PayrollItem> {
        self.payroll_items
            .iter()
            .find(|item| item.payroll_id == payroll_id && item.staff_id == staff_id)
    }

    pub fn payroll_item_for_mut(
        &mut self,
        payroll_id: Uuid,
        staff_id: Uuid,
    ) -> Option<&mut PayrollItem> {
        self.payroll_items
            .iter_mut()
            .find(|item| item.payroll_id == payroll_id && item.staff_id == staff_id)
    }

    pub fn approval(&self, id: Uuid) -> Option<&PromotionApproval> {
        self.promotion_approvals
            .iter()
            .find(|approval| approval.id == id)
    }

    pub fn approval_mut(&mut self, id: Uuid) -> Option<&mut PromotionApproval> {
        self.promotion_approvals
            .iter_mut()
            .find(|approval| approval.id == id)
    }

    /// True when the student already has a pending request targeting the
    /// given period. At most one such request may exist at a time.
    pub fn has_pending_promotion(&self, student_id: Uuid, target_period_id: Uuid) -> bool {
        self.promotion_approvals.iter().any(|approval| {
            approval.student_id == student_id
                && approval.target_period_id == target_period_id
                && approval.status == PromotionStatus::Pending
        })
    }

    pub fn booking(&self, id: Uuid) -> Option<&Booking> {
        self.bookings.iter().find(|booking| booking.id == id)
    }

    pub fn booking_mut(&mut self, id: Uuid) -> Option<&mut Booking> {
        self.bookings.iter_mut().find(|booking| booking.id == id)
    }

    /// Number of students currently assigned to the classroom.
    pub fn enrolled_count(&self, classroom_id: Uuid) -> usize {
        self.students
            .iter()
            .filter(|student| student.classroom_id == Some(classroom_id))
            .count()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
