//! Error types for store and command operations.

use thiserror::Error;

/// Errors surfaced by the store and the command handlers.
///
/// Date scheduling itself never fails; everything here comes from user input
/// or from the file backing the store.
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Task id '{prefix}' is ambiguous, candidates: {candidates}")]
    AmbiguousTask { prefix: String, candidates: String },

    #[error("Course not found: {0}")]
    CourseNotFound(String),

    #[error("Course '{0}' already exists")]
    DuplicateCourse(String),

    #[error("Course '{0}' cannot be removed while it is used in the timetable")]
    CourseInUse(String),

    #[error("Material not found: {0}")]
    MaterialNotFound(String),

    #[error("Period {0} is outside 1..=9")]
    InvalidPeriod(u8),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No upcoming lesson for '{0}'; pass --due YYYY-MM-DD")]
    NoSuggestion(String),
}

/// Result type alias for planner operations.
pub type PlannerResult<T> = Result<T, PlannerError>;
