//! Enumerations and field types shared by the timetable, courses and tasks.
//!
//! School days are limited to Monday through Friday; the stored form of a
//! [`SchoolDay`] is its German name so that files stay human-editable.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Number of periods in a school day.
pub const PERIODS_PER_DAY: u8 = 9;

/// A day of the school week.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum SchoolDay {
    #[serde(rename = "Montag")]
    #[value(alias = "mon", alias = "montag", alias = "mo")]
    Monday,
    #[serde(rename = "Dienstag")]
    #[value(alias = "tue", alias = "dienstag", alias = "di")]
    Tuesday,
    #[serde(rename = "Mittwoch")]
    #[value(alias = "wed", alias = "mittwoch", alias = "mi")]
    Wednesday,
    #[serde(rename = "Donnerstag")]
    #[value(alias = "thu", alias = "donnerstag", alias = "do")]
    Thursday,
    #[serde(rename = "Freitag")]
    #[value(alias = "fri", alias = "freitag", alias = "fr")]
    Friday,
}

impl SchoolDay {
    pub const ALL: [SchoolDay; 5] = [
        SchoolDay::Monday,
        SchoolDay::Tuesday,
        SchoolDay::Wednesday,
        SchoolDay::Thursday,
        SchoolDay::Friday,
    ];

    /// Zero-based position in the week, Monday = 0.
    pub fn index(self) -> u32 {
        match self {
            SchoolDay::Monday => 0,
            SchoolDay::Tuesday => 1,
            SchoolDay::Wednesday => 2,
            SchoolDay::Thursday => 3,
            SchoolDay::Friday => 4,
        }
    }

    /// Map a calendar weekday onto a school day. Weekends have none.
    pub fn from_weekday(weekday: chrono::Weekday) -> Option<Self> {
        match weekday {
            chrono::Weekday::Mon => Some(SchoolDay::Monday),
            chrono::Weekday::Tue => Some(SchoolDay::Tuesday),
            chrono::Weekday::Wed => Some(SchoolDay::Wednesday),
            chrono::Weekday::Thu => Some(SchoolDay::Thursday),
            chrono::Weekday::Fri => Some(SchoolDay::Friday),
            chrono::Weekday::Sat | chrono::Weekday::Sun => None,
        }
    }

    /// The school day to show first for a given date: the day itself, or
    /// Friday on weekends.
    pub fn current_or_friday(weekday: chrono::Weekday) -> Self {
        Self::from_weekday(weekday).unwrap_or(SchoolDay::Friday)
    }

    pub fn next(self) -> Self {
        Self::ALL[((self.index() + 1) % 5) as usize]
    }

    pub fn previous(self) -> Self {
        Self::ALL[((self.index() + 4) % 5) as usize]
    }
}

/// Kind of teaching material attached to a course.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MaterialKind {
    Book,
    Workbook,
    #[default]
    Other,
}

/// Format a school day for display.
pub fn format_school_day(day: SchoolDay) -> &'static str {
    match day {
        SchoolDay::Monday => "Montag",
        SchoolDay::Tuesday => "Dienstag",
        SchoolDay::Wednesday => "Mittwoch",
        SchoolDay::Thursday => "Donnerstag",
        SchoolDay::Friday => "Freitag",
    }
}

/// Format a material kind for display.
pub fn format_material_kind(kind: MaterialKind) -> &'static str {
    match kind {
        MaterialKind::Book => "Buch",
        MaterialKind::Workbook => "Arbeitsheft",
        MaterialKind::Other => "Sonstiges",
    }
}
