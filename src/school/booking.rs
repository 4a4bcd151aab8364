use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A time-boxed occupation of an optional classroom and/or an optional staff
/// member. No two bookings sharing a resource may overlap in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub classroom_id: Option<Uuid>,
    #[serde(default)]
    pub staff_id: Option<Uuid>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    /// Display hint only. An all-day booking must still carry full-day
    /// `starts_at`/`ends_at` bounds; the overlap check reads only the
    /// timestamps.
    #[serde(default)]
    pub is_all_day: bool,
}

impl Booking {
    pub fn new(title: impl Into<String>, starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            classroom_id: None,
            staff_id: None,
            starts_at,
            ends_at,
            is_all_day: false,
        }
    }

    pub fn with_classroom(mut self, classroom_id: Uuid) -> Self {
        self.classroom_id = Some(classroom_id);
        self
    }

    pub fn with_staff(mut self, staff_id: Uuid) -> Self {
        self.staff_id = Some(staff_id);
        self
    }

    /// Half-open interval overlap; touching endpoints do not overlap.
    pub fn overlaps(&self, other: &Booking) -> bool {
        other.starts_at < self.ends_at && other.ends_at > self.starts_at
    }

    /// True when both bookings claim the same classroom, or the same staff
    /// member when this booking has one.
    pub fn shares_resource(&self, other: &Booking) -> bool {
        let same_room =
            matches!((self.classroom_id, other.classroom_id), (Some(a), Some(b)) if a == b);
        let same_staff = self.staff_id.is_some() && self.staff_id == other.staff_id;
        same_room || same_staff
    }

    /// A booking holding neither a classroom nor a staff member is exempt
    /// from conflict checking.
    pub fn is_unconstrained(&self) -> bool {
        self.classroom_id.is_none() && self.staff_id.is_none()
    }
}
