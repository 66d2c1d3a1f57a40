//! Task data structure.
//!
//! A `Task` is one piece of homework for a course. Due dates carry no time of
//! day; the completion stamp is a local wall-clock instant.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A homework item.
///
/// `archived` implies `completed` and a set `completed_at`; the archiving
/// operation in [`crate::schedule`] is the only place that sets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub course: String,
    pub description: String,
    pub due: Option<NaiveDate>,
    pub completed: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub completed_at: Option<NaiveDateTime>,
}

impl Task {
    /// Create an open task with a fresh identifier.
    pub fn new(course: &str, description: &str, due: Option<NaiveDate>) -> Self {
        Task {
            id: uuid::Uuid::new_v4().to_string(),
            course: course.to_string(),
            description: description.to_string(),
            due,
            completed: false,
            archived: false,
            completed_at: None,
        }
    }

    /// First eight characters of the id, enough to address a task from the CLI.
    pub fn short_id(&self) -> &str {
        let end = self.id.char_indices().nth(8).map(|(i, _)| i).unwrap_or(self.id.len());
        &self.id[..end]
    }

    /// Open tasks are the ones still shown in the overview.
    pub fn is_active(&self) -> bool {
        !self.archived
    }
}
