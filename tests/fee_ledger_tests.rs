use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use school_core::core::services::{FeeDraft, FeeLedger};
use school_core::school::{AcademicPeriod, FeeStatus, FeeType, GradeLevel, School, Student};
use uuid::Uuid;

fn sample_date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn seeded_school() -> (School, Uuid, Uuid) {
    let mut school = School::new("Hillside");
    let period_id = school.add_period(AcademicPeriod::new(
        "2025/2026",
        sample_date(2025, 9, 1),
        sample_date(2026, 6, 30),
    ));
    let student_id = school.add_student(Student::new("Ana", period_id, GradeLevel(3)));
    (school, student_id, period_id)
}

#[test]
fn fee_walks_through_partial_to_paid() {
    let (mut school, student_id, period_id) = seeded_school();
    let fee_id = FeeLedger::create(
        &mut school,
        FeeDraft::new(
            student_id,
            period_id,
            "Annual tuition",
            FeeType::Tuition,
            dec!(1_000_000),
            "IDR",
            sample_date(2025, 10, 1),
        ),
    )
    .unwrap();

    let outcome = FeeLedger::record_payment(&mut school, fee_id, dec!(400_000)).unwrap();
    assert_eq!(outcome.status, FeeStatus::Partial);
    let fee = school.fee(fee_id).unwrap();
    assert_eq!(FeeLedger::outstanding(fee), dec!(600_000));

    let outcome = FeeLedger::record_payment(&mut school, fee_id, dec!(600_000)).unwrap();
    assert_eq!(outcome.status, FeeStatus::Paid);
    let fee = school.fee(fee_id).unwrap();
    assert_eq!(FeeLedger::outstanding(fee), Decimal::ZERO);
    assert!(fee.paid_at.is_some());
}

#[test]
fn paid_amount_never_leaves_its_bounds() {
    let (mut school, student_id, period_id) = seeded_school();
    let fee_id = FeeLedger::create(
        &mut school,
        FeeDraft::new(
            student_id,
            period_id,
            "Uniform",
            FeeType::Uniform,
            dec!(120),
            "USD",
            sample_date(2025, 10, 1),
        ),
    )
    .unwrap();

    for delta in [dec!(50), dec!(200), dec!(-90), dec!(-500), dec!(120)] {
        FeeLedger::record_payment(&mut school, fee_id, delta).unwrap();
        let fee = school.fee(fee_id).unwrap();
        assert!(fee.paid_amount >= Decimal::ZERO);
        assert!(fee.paid_amount <= fee.amount);
        if fee.paid_amount == fee.amount {
            assert_eq!(fee.status, FeeStatus::Paid);
            assert!(fee.paid_at.is_some());
        }
    }
}

#[test]
fn generated_references_are_unique() {
    let (mut school, student_id, period_id) = seeded_school();
    let mut references = std::collections::HashSet::new();
    for n in 0..25 {
        let fee_id = FeeLedger::create(
            &mut school,
            FeeDraft::new(
                student_id,
                period_id,
                format!("Misc {n}"),
                FeeType::Misc,
                dec!(10),
                "USD",
                sample_date(2025, 10, 1),
            ),
        )
        .unwrap();
        references.insert(school.fee(fee_id).unwrap().reference.clone());
    }
    assert_eq!(references.len(), 25);
}

#[test]
fn zero_amount_fee_is_immediately_paid() {
    let (mut school, student_id, period_id) = seeded_school();
    let fee_id = FeeLedger::create(
        &mut school,
        FeeDraft::new(
            student_id,
            period_id,
            "Waived registration",
            FeeType::Registration,
            Decimal::ZERO,
            "USD",
            sample_date(2025, 10, 1),
        ),
    )
    .unwrap();
    let fee = school.fee(fee_id).unwrap();
    assert_eq!(fee.status, FeeStatus::Paid);
    assert!(fee.paid_at.is_some());
}
