//! Double-booking protection for classrooms and staff members.

use uuid::Uuid;

use crate::core::services::{ServiceError, ServiceResult};
use crate::school::{Booking, School};

/// Validates proposed bookings against committed ones. The check runs before
/// every insert and update, so no two committed bookings ever overlap for the
/// same resource.
pub struct ConflictGuard;

impl ConflictGuard {
    /// Validates a candidate against existing bookings. The candidate's own
    /// id is excluded so updates do not conflict with themselves; a booking
    /// holding neither resource is exempt.
    pub fn validate(candidate: &Booking, existing: &[Booking]) -> ServiceResult<()> {
        if candidate.ends_at <= candidate.starts_at {
            return Err(ServiceError::InvalidRange {
                starts_at: candidate.starts_at,
                ends_at: candidate.ends_at,
            });
        }
        if candidate.is_unconstrained() {
            return Ok(());
        }
        if let Some(other) = existing.iter().find(|other| {
            other.id != candidate.id
                && candidate.shares_resource(other)
                && candidate.overlaps(other)
        }) {
            return Err(ServiceError::SchedulingConflict {
                title: other.title.clone(),
                starts_at: other.starts_at,
                ends_at: other.ends_at,
            });
        }
        Ok(())
    }

    /// Validates then commits a new booking.
    pub fn schedule(school: &mut School, booking: Booking) -> ServiceResult<Uuid> {
        school.transaction(|school| {
            Self::validate(&booking, &school.bookings)?;
            Ok(school.add_booking(booking))
        })
    }

    /// Re-validates and replaces an existing booking.
    pub fn reschedule(school: &mut School, booking: Booking) -> ServiceResult<()> {
        school.transaction(|school| {
            Self::validate(&booking, &school.bookings)?;
            let slot = school
                .booking_mut(booking.id)
                .ok_or(ServiceError::NotFound {
                    entity: "booking",
                    id: booking.id,
                })?;
            *slot = booking;
            school.touch();
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 3, h, min, 0).unwrap()
    }

    #[test]
    fn rejects_inverted_and_empty_ranges() {
        let booking = Booking::new("Math", at(9, 0), at(8, 0));
        let err = ConflictGuard::validate(&booking, &[]).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRange { .. }));

        let empty = Booking::new("Math", at(9, 0), at(9, 0));
        assert!(ConflictGuard::validate(&empty, &[]).is_err());
    }

    #[test]
    fn overlapping_room_bookings_conflict() {
        let room = Uuid::new_v4();
        let existing = Booking::new("Math", at(7, 30), at(9, 0)).with_classroom(room);
        let candidate = Booking::new("Physics", at(8, 45), at(10, 0)).with_classroom(room);
        let err = ConflictGuard::validate(&candidate, &[existing]).unwrap_err();
        match err {
            ServiceError::SchedulingConflict { title, .. } => assert_eq!(title, "Math"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn touching_endpoints_do_not_conflict() {
        let room = Uuid::new_v4();
        let existing = Booking::new("Math", at(7, 30), at(9, 0)).with_classroom(room);
        let candidate = Booking::new("Physics", at(9, 0), at(10, 0)).with_classroom(room);
        assert!(ConflictGuard::validate(&candidate, &[existing]).is_ok());
    }

    #[test]
    fn shared_staff_conflicts_across_rooms() {
        let teacher = Uuid::new_v4();
        let existing = Booking::new("Math", at(8, 0), at(9, 0))
            .with_classroom(Uuid::new_v4())
            .with_staff(teacher);
        let candidate = Booking::new("Physics", at(8, 30), at(9, 30))
            .with_classroom(Uuid::new_v4())
            .with_staff(teacher);
        assert!(ConflictGuard::validate(&candidate, &[existing]).is_err());
    }

    #[test]
    fn all_day_booking_with_full_day_bounds_blocks_the_room() {
        let room = Uuid::new_v4();
        let mut whole_day = Booking::new(
            "Exam day",
            Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 4, 0, 0, 0).unwrap(),
        )
        .with_classroom(room);
        whole_day.is_all_day = true;

        let candidate = Booking::new("Math", at(8, 0), at(9, 0)).with_classroom(room);
        assert!(ConflictGuard::validate(&candidate, &[whole_day]).is_err());
    }

    #[test]
    fn unconstrained_bookings_skip_the_check() {
        let existing = Booking::new("Assembly", at(8, 0), at(9, 0));
        let candidate = Booking::new("Drill", at(8, 0), at(9, 0));
        assert!(ConflictGuard::validate(&candidate, &[existing]).is_ok());
    }

    #[test]
    fn update_does_not_conflict_with_itself() {
        let room = Uuid::new_v4();
        let mut school = School::new("Test");
        let booking = Booking::new("Math", at(7, 30), at(9, 0)).with_classroom(room);
        let id = ConflictGuard::schedule(&mut school, booking).unwrap();

        let mut moved = school.booking(id).unwrap().clone();
        moved.ends_at = at(9, 30);
        ConflictGuard::reschedule(&mut school, moved).unwrap();
        assert_eq!(school.booking(id).unwrap().ends_at, at(9, 30));
    }

    #[test]
    fn schedule_rejects_and_leaves_store_untouched() {
        let room = Uuid::new_v4();
        let mut school = School::new("Test");
        ConflictGuard::schedule(
            &mut school,
            Booking::new("Math", at(7, 30), at(9, 0)).with_classroom(room),
        )
        .unwrap();

        let err = ConflictGuard::schedule(
            &mut school,
            Booking::new("Physics", at(8, 45), at(10, 0)).with_classroom(room),
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::SchedulingConflict { .. }));
        assert_eq!(school.bookings.len(), 1);
    }
}
