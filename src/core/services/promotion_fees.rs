//! Follow-on billing when a student advances a grade.

use std::collections::BTreeMap;

use chrono::Duration;
use uuid::Uuid;

use crate::config::PromotionBilling;
use crate::core::services::{FeeDraft, FeeLedger, ServiceError, ServiceResult};
use crate::school::fee::{META_GRADE_LEVEL, META_SOURCE, META_TEMPLATE_ID, SOURCE_PROMOTION};
use crate::school::{FeeTemplate, GradeLevel, School};

/// Creates or reuses promotion fees from grade-scoped templates, with a flat
/// per-grade fallback. Each fee's identity is pinned by its provenance tag,
/// so repeating a call never double-bills.
pub struct PromotionFeeGenerator;

impl PromotionFeeGenerator {
    /// Returns the fees owed when `student_id` enters `grade` in the target
    /// period, creating them where they do not exist yet. Absent billing
    /// rules yield an empty list, never an error.
    pub fn create_for_promotion(
        school: &mut School,
        config: &PromotionBilling,
        student_id: Uuid,
        grade: GradeLevel,
        period_id: Uuid,
    ) -> ServiceResult<Vec<Uuid>> {
        if !config.enabled {
            return Ok(Vec::new());
        }
        let period = school
            .period(period_id)
            .ok_or(ServiceError::NotFound {
                entity: "academic period",
                id: period_id,
            })?
            .clone();
        if school.student(student_id).is_none() {
            return Err(ServiceError::NotFound {
                entity: "student",
                id: student_id,
            });
        }

        let templates: Vec<FeeTemplate> = school
            .fee_templates
            .iter()
            .filter(|template| template.is_active && template.grade_level == grade)
            .cloned()
            .collect();

        let mut fee_ids = Vec::new();
        if !templates.is_empty() {
            for template in templates {
                if let Some(existing) =
                    Self::find_templated(school, student_id, period_id, template.id)
                {
                    fee_ids.push(existing);
                    continue;
                }
                let due_in = template.due_in_days.unwrap_or(config.due_in_days);
                let mut draft = FeeDraft::new(
                    student_id,
                    period_id,
                    template.title.clone(),
                    template.fee_type,
                    template.amount,
                    template.currency.clone(),
                    period.starts_on + Duration::days(due_in),
                );
                draft.status = config.default_status;
                draft.metadata = promotion_tag(grade, Some(template.id));
                fee_ids.push(FeeLedger::create(school, draft)?);
            }
            return Ok(fee_ids);
        }

        let Some(flat_amount) = config.flat_amount_for(grade) else {
            return Ok(fee_ids);
        };
        if let Some(existing) = Self::find_flat(school, student_id, period_id, grade) {
            fee_ids.push(existing);
            return Ok(fee_ids);
        }
        let mut draft = FeeDraft::new(
            student_id,
            period_id,
            format!("Promotion fee ({grade})"),
            config.default_fee_type,
            flat_amount,
            config.currency.clone(),
            period.starts_on + Duration::days(config.due_in_days),
        );
        draft.status = config.default_status;
        draft.metadata = promotion_tag(grade, None);
        fee_ids.push(FeeLedger::create(school, draft)?);
        Ok(fee_ids)
    }

    fn find_templated(
        school: &School,
        student_id: Uuid,
        period_id: Uuid,
        template_id: Uuid,
    ) -> Option<Uuid> {
        let template_tag = template_id.to_string();
        school
            .fees
            .iter()
            .find(|fee| {
                fee.student_id == student_id
                    && fee.academic_period_id == period_id
                    && fee.is_tagged(META_SOURCE, SOURCE_PROMOTION)
                    && fee.is_tagged(META_TEMPLATE_ID, &template_tag)
            })
            .map(|fee| fee.id)
    }

    fn find_flat(
        school: &School,
        student_id: Uuid,
        period_id: Uuid,
        grade: GradeLevel,
    ) -> Option<Uuid> {
        let grade_tag = grade.0.to_string();
        school
            .fees
            .iter()
            .find(|fee| {
                fee.student_id == student_id
                    && fee.academic_period_id == period_id
                    && fee.is_tagged(META_SOURCE, SOURCE_PROMOTION)
                    && fee.is_tagged(META_GRADE_LEVEL, &grade_tag)
                    && !fee.metadata.contains_key(META_TEMPLATE_ID)
            })
            .map(|fee| fee.id)
    }
}

fn promotion_tag(grade: GradeLevel, template_id: Option<Uuid>) -> BTreeMap<String, String> {
    let mut tag = BTreeMap::new();
    tag.insert(META_SOURCE.into(), SOURCE_PROMOTION.into());
    tag.insert(META_GRADE_LEVEL.into(), grade.0.to_string());
    if let Some(id) = template_id {
        tag.insert(META_TEMPLATE_ID.into(), id.to_string());
    }
    tag
}
