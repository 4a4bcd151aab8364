//! Payroll generation: structure selection, item upserts, and rollups.

use chrono::Utc;
use uuid::Uuid;

use crate::core::services::{ServiceError, ServiceResult};
use crate::school::{
    CompensationStructure, Payroll, PayrollItem, PayrollItemStatus, PayrollStatus, RollupTotals,
    School,
};

/// Summary of one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationOutcome {
    /// Items created or overwritten.
    pub items_written: usize,
    /// Staff members with no applicable compensation structure.
    pub staff_skipped: usize,
}

/// Selects period-applicable compensation structures and produces or updates
/// payroll items, then recomputes the payroll's rollup totals.
pub struct PayrollEngine;

impl PayrollEngine {
    /// Regenerates the payroll's items from the applicable compensation
    /// structures.
    ///
    /// Regeneration is destructive: an item already present for a
    /// (payroll, staff) pair is overwritten from its structure and its status
    /// reset to pending, discarding any manual edits. Re-running with
    /// unchanged structures yields the same items, never duplicates.
    pub fn generate(
        school: &mut School,
        payroll_id: Uuid,
        staff_ids: Option<&[Uuid]>,
    ) -> ServiceResult<GenerationOutcome> {
        school.transaction(|school| Self::generate_inner(school, payroll_id, staff_ids))
    }

    fn generate_inner(
        school: &mut School,
        payroll_id: Uuid,
        staff_ids: Option<&[Uuid]>,
    ) -> ServiceResult<GenerationOutcome> {
        let payroll = school
            .payroll(payroll_id)
            .ok_or(ServiceError::NotFound {
                entity: "payroll",
                id: payroll_id,
            })?
            .clone();

        let staff_set: Vec<Uuid> = match staff_ids {
            Some(ids) if !ids.is_empty() => ids.to_vec(),
            _ if !payroll.staff_filter.is_empty() => payroll.staff_filter.clone(),
            _ => school.staff.iter().map(|member| member.id).collect(),
        };

        let mut items_written = 0usize;
        let mut staff_skipped = 0usize;
        for staff_id in staff_set {
            let Some(structure) = Self::select_structure(school, staff_id, &payroll) else {
                staff_skipped += 1;
                continue;
            };
            let structure = structure.clone();
            match school.payroll_item_for_mut(payroll_id, staff_id) {
                Some(item) => Self::apply_structure(item, &structure),
                None => {
                    let mut item = PayrollItem::new(payroll_id, staff_id, structure.currency.clone());
                    Self::apply_structure(&mut item, &structure);
                    school.add_payroll_item(item)?;
                }
            }
            items_written += 1;
        }

        if items_written > 0 {
            let payroll = school.payroll_mut(payroll_id).ok_or(ServiceError::NotFound {
                entity: "payroll",
                id: payroll_id,
            })?;
            payroll.processed_at = Some(Utc::now());
            if payroll.status == PayrollStatus::Draft {
                payroll.status = PayrollStatus::Processing;
            }
        }

        Self::recompute_rollups(school, payroll_id);
        school.touch();
        tracing::debug!(
            payroll = %payroll_id,
            items_written,
            staff_skipped,
            "payroll generation finished"
        );
        Ok(GenerationOutcome {
            items_written,
            staff_skipped,
        })
    }

    /// Picks the single best active structure for the staff member: effective
    /// on or before the period's end, not expired before its start, scoped to
    /// the payroll's academic period or unscoped. Ties break on the latest
    /// effective date, then on the most recently created structure.
    fn select_structure<'a>(
        school: &'a School,
        staff_id: Uuid,
        payroll: &Payroll,
    ) -> Option<&'a CompensationStructure> {
        school
            .compensation_structures
            .iter()
            .filter(|structure| structure.staff_id == staff_id)
            .filter(|structure| {
                structure.covers(
                    payroll.period_start,
                    payroll.period_end,
                    payroll.academic_period_id,
                )
            })
            .max_by_key(|structure| (structure.effective_date, structure.created_at))
    }

    fn apply_structure(item: &mut PayrollItem, structure: &CompensationStructure) {
        item.base_salary = structure.base_salary;
        item.allowances = structure.allowances.clone();
        item.deductions = structure.deductions.clone();
        item.currency = structure.currency.clone();
        item.notes = structure.notes.clone();
        item.status = PayrollItemStatus::Pending;
        item.recompute();
    }

    fn recompute_rollups(school: &mut School, payroll_id: Uuid) {
        let totals = RollupTotals::of(
            school
                .payroll_items
                .iter()
                .filter(|item| item.payroll_id == payroll_id),
        );
        if let Some(payroll) = school.payroll_mut(payroll_id) {
            payroll.apply_rollups(totals);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::school::{PayComponent, StaffMember};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn school_with_payroll() -> (School, Uuid, Uuid) {
        let mut school = School::new("Test");
        let staff_id = school.add_staff_member(StaffMember::new("Mr. Ortiz"));
        let payroll = Payroll::new("PAY-2025-03", date(2025, 3, 1), date(2025, 3, 31), "USD");
        let payroll_id = school.add_payroll(payroll).unwrap();
        (school, payroll_id, staff_id)
    }

    fn structure(
        staff_id: Uuid,
        base: Decimal,
        effective: NaiveDate,
    ) -> CompensationStructure {
        CompensationStructure::new(staff_id, base, "USD", effective)
    }

    #[test]
    fn most_recent_effective_structure_wins() {
        let (mut school, payroll_id, staff_id) = school_with_payroll();
        school.add_compensation_structure(structure(staff_id, dec!(1000), date(2025, 1, 1)));
        school.add_compensation_structure(structure(staff_id, dec!(1200), date(2025, 3, 1)));

        PayrollEngine::generate(&mut school, payroll_id, None).unwrap();
        let item = school.payroll_item_for(payroll_id, staff_id).unwrap();
        assert_eq!(item.base_salary, dec!(1200));
    }

    #[test]
    fn expired_and_inactive_structures_are_ignored() {
        let (mut school, payroll_id, staff_id) = school_with_payroll();
        let mut expired = structure(staff_id, dec!(900), date(2024, 1, 1));
        expired.expires_on = Some(date(2025, 2, 1));
        school.add_compensation_structure(expired);
        let mut inactive = structure(staff_id, dec!(950), date(2025, 2, 1));
        inactive.is_active = false;
        school.add_compensation_structure(inactive);

        let outcome = PayrollEngine::generate(&mut school, payroll_id, None).unwrap();
        assert_eq!(outcome.items_written, 0);
        assert_eq!(outcome.staff_skipped, 1);
        assert!(school.payroll_item_for(payroll_id, staff_id).is_none());
    }

    #[test]
    fn period_scoped_structure_requires_matching_payroll() {
        let (mut school, payroll_id, staff_id) = school_with_payroll();
        let mut scoped = structure(staff_id, dec!(1100), date(2025, 1, 1));
        scoped.academic_period_id = Some(Uuid::new_v4());
        school.add_compensation_structure(scoped);

        let outcome = PayrollEngine::generate(&mut school, payroll_id, None).unwrap();
        assert_eq!(outcome.items_written, 0);
    }

    #[test]
    fn regeneration_overwrites_manual_edits() {
        let (mut school, payroll_id, staff_id) = school_with_payroll();
        let mut with_lines = structure(staff_id, dec!(1000), date(2025, 1, 1));
        with_lines.allowances.push(PayComponent::new("Transport", dec!(100)));
        with_lines.deductions.push(PayComponent::new("Tax", dec!(150)));
        school.add_compensation_structure(with_lines);

        PayrollEngine::generate(&mut school, payroll_id, None).unwrap();
        {
            let item = school.payroll_item_for_mut(payroll_id, staff_id).unwrap();
            item.status = PayrollItemStatus::Approved;
            item.base_salary = dec!(9999);
        }

        PayrollEngine::generate(&mut school, payroll_id, None).unwrap();
        let item = school.payroll_item_for(payroll_id, staff_id).unwrap();
        assert_eq!(item.status, PayrollItemStatus::Pending);
        assert_eq!(item.base_salary, dec!(1000));
        assert_eq!(item.net_amount, dec!(950));
    }

    #[test]
    fn generation_is_idempotent_and_rolls_up() {
        let (mut school, payroll_id, staff_id) = school_with_payroll();
        let other_staff = school.add_staff_member(StaffMember::new("Ms. Lane"));
        school.add_compensation_structure(structure(staff_id, dec!(1000), date(2025, 1, 1)));
        school.add_compensation_structure(structure(other_staff, dec!(800), date(2025, 1, 1)));

        let first = PayrollEngine::generate(&mut school, payroll_id, None).unwrap();
        let second = PayrollEngine::generate(&mut school, payroll_id, None).unwrap();
        assert_eq!(first, second);
        assert_eq!(school.payroll_items_for(payroll_id).len(), 2);

        let payroll = school.payroll(payroll_id).unwrap();
        assert_eq!(payroll.total_base, dec!(1800));
        assert_eq!(payroll.total_net, dec!(1800));
        assert_eq!(payroll.status, PayrollStatus::Processing);
        assert!(payroll.processed_at.is_some());
    }

    #[test]
    fn explicit_staff_argument_narrows_the_run() {
        let (mut school, payroll_id, staff_id) = school_with_payroll();
        let other_staff = school.add_staff_member(StaffMember::new("Ms. Lane"));
        school.add_compensation_structure(structure(staff_id, dec!(1000), date(2025, 1, 1)));
        school.add_compensation_structure(structure(other_staff, dec!(800), date(2025, 1, 1)));

        PayrollEngine::generate(&mut school, payroll_id, Some(&[other_staff])).unwrap();
        assert!(school.payroll_item_for(payroll_id, staff_id).is_none());
        assert!(school.payroll_item_for(payroll_id, other_staff).is_some());
    }

    #[test]
    fn missing_payroll_is_reported() {
        let mut school = School::new("Test");
        let err = PayrollEngine::generate(&mut school, Uuid::new_v4(), None).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: "payroll", .. }));
    }
}
