//! Courses, their materials and the weekly timetable cells that reference them.

use serde::{Deserialize, Serialize};

use crate::fields::{MaterialKind, SchoolDay};

/// A school subject with its teaching materials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub materials: Vec<Material>,
}

impl Course {
    pub fn new(name: &str) -> Self {
        Course {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            color: None,
            materials: Vec::new(),
        }
    }
}

/// A book, workbook or other item used in a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: MaterialKind,
}

impl Material {
    pub fn new(name: &str, kind: MaterialKind) -> Self {
        Material {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            kind,
        }
    }
}

/// One recurring cell of the weekly timetable.
///
/// At most one slot exists per `(day, period)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySlot {
    pub day: SchoolDay,
    pub period: u8,
    pub course: String,
}

impl WeeklySlot {
    pub fn new(day: SchoolDay, period: u8, course: &str) -> Self {
        WeeklySlot {
            day,
            period,
            course: course.to_string(),
        }
    }

    pub fn is_at(&self, day: SchoolDay, period: u8) -> bool {
        self.day == day && self.period == period
    }
}
