//! The promotion approval state machine: pending requests decided exactly
//! once, with approval side effects landing as a single unit of work.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::PromotionBilling;
use crate::core::services::{PromotionFeeGenerator, ServiceError, ServiceResult};
use crate::school::{Fee, GradeLevel, PromotionApproval, PromotionStatus, School};

pub struct PromotionWorkflow;

impl PromotionWorkflow {
    /// Creates pending requests for a batch of students. A student that
    /// already has a pending request for the target period is skipped.
    /// Each request snapshots the student's outstanding fees at this moment.
    /// The batch lands all-or-nothing: an unknown student anywhere in it
    /// leaves no requests behind.
    pub fn request_bulk(
        school: &mut School,
        student_ids: &[Uuid],
        target_period_id: Uuid,
        target_grade: GradeLevel,
        requested_by: &str,
    ) -> ServiceResult<Vec<Uuid>> {
        if school.period(target_period_id).is_none() {
            return Err(ServiceError::NotFound {
                entity: "academic period",
                id: target_period_id,
            });
        }
        school.transaction(|school| {
            let mut created = Vec::new();
            for &student_id in student_ids {
                let from_period_id = school
                    .student(student_id)
                    .ok_or(ServiceError::NotFound {
                        entity: "student",
                        id: student_id,
                    })?
                    .academic_period_id;
                if school.has_pending_promotion(student_id, target_period_id) {
                    continue;
                }
                let outstanding: Decimal = school
                    .fees
                    .iter()
                    .filter(|fee| fee.student_id == student_id)
                    .map(Fee::outstanding)
                    .sum();
                let mut request = PromotionApproval::new(
                    student_id,
                    from_period_id,
                    target_period_id,
                    target_grade,
                    requested_by,
                );
                request.outstanding_amount = outstanding;
                created.push(school.add_promotion_approval(request));
            }
            Ok(created)
        })
    }

    /// Approves a pending request. The capacity check, student reassignment,
    /// fee generation, and decision record succeed or fail together.
    pub fn approve(
        school: &mut School,
        config: &PromotionBilling,
        request_id: Uuid,
        approver: &str,
        target_classroom_id: Option<Uuid>,
    ) -> ServiceResult<()> {
        school.transaction(|school| {
            let request = school
                .approval(request_id)
                .ok_or(ServiceError::NotFound {
                    entity: "promotion request",
                    id: request_id,
                })?
                .clone();
            if !request.is_pending() {
                return Err(ServiceError::Invalid(
                    "promotion request was already decided".into(),
                ));
            }

            let classroom_id = target_classroom_id.or(request.target_classroom_id);
            if let Some(classroom_id) = classroom_id {
                let classroom =
                    school
                        .classroom(classroom_id)
                        .ok_or(ServiceError::NotFound {
                            entity: "classroom",
                            id: classroom_id,
                        })?;
                if let Some(capacity) = classroom.capacity {
                    if school.enrolled_count(classroom_id) as u32 >= capacity {
                        return Err(ServiceError::ClassroomFull {
                            name: classroom.name.clone(),
                            capacity,
                        });
                    }
                }
            }

            {
                let student =
                    school
                        .student_mut(request.student_id)
                        .ok_or(ServiceError::NotFound {
                            entity: "student",
                            id: request.student_id,
                        })?;
                student.academic_period_id = request.target_period_id;
                student.grade_level = request.target_grade;
                student.classroom_id = classroom_id;
            }

            PromotionFeeGenerator::create_for_promotion(
                school,
                config,
                request.student_id,
                request.target_grade,
                request.target_period_id,
            )?;

            let request = school
                .approval_mut(request_id)
                .ok_or(ServiceError::NotFound {
                    entity: "promotion request",
                    id: request_id,
                })?;
            request.status = PromotionStatus::Approved;
            request.target_classroom_id = classroom_id;
            request.decided_by = Some(approver.to_string());
            request.decided_at = Some(Utc::now());
            school.touch();
            tracing::debug!(request = %request_id, "promotion approved");
            Ok(())
        })
    }

    /// Rejects a pending request. Decision notes are mandatory; student data
    /// is untouched.
    pub fn reject(
        school: &mut School,
        request_id: Uuid,
        approver: &str,
        decision_notes: &str,
    ) -> ServiceResult<()> {
        if decision_notes.trim().is_empty() {
            return Err(ServiceError::Invalid(
                "decision notes are required to reject".into(),
            ));
        }
        let request = school
            .approval_mut(request_id)
            .ok_or(ServiceError::NotFound {
                entity: "promotion request",
                id: request_id,
            })?;
        if !request.is_pending() {
            return Err(ServiceError::Invalid(
                "promotion request was already decided".into(),
            ));
        }
        request.status = PromotionStatus::Rejected;
        request.decided_by = Some(approver.to_string());
        request.decided_at = Some(Utc::now());
        request.decision_notes = Some(decision_notes.to_string());
        school.touch();
        Ok(())
    }
}
