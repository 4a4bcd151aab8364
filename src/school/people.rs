use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Numeric grade level (1 = first grade).
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
pub struct GradeLevel(pub u8);

impl fmt::Display for GradeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grade {}", self.0)
    }
}

/// A bounded date range (e.g. a school year) that scopes fees, compensation
/// structures, and promotions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcademicPeriod {
    pub id: Uuid,
    pub name: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
}

impl AcademicPeriod {
    pub fn new(name: impl Into<String>, starts_on: NaiveDate, ends_on: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            starts_on,
            ends_on,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classroom {
    pub id: Uuid,
    pub name: String,
    pub grade_level: GradeLevel,
    /// Maximum number of enrolled students; `None` means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
}

impl Classroom {
    pub fn new(name: impl Into<String>, grade_level: GradeLevel) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            grade_level,
            capacity: None,
        }
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub academic_period_id: Uuid,
    pub grade_level: GradeLevel,
    #[serde(default)]
    pub classroom_id: Option<Uuid>,
}

impl Student {
    pub fn new(name: impl Into<String>, academic_period_id: Uuid, grade_level: GradeLevel) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            academic_period_id,
            grade_level,
            classroom_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
}

impl StaffMember {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            is_active: true,
        }
    }
}
