//! Add/edit form state for the terminal user interface.
//!
//! The course is picked from the known courses. The due date is one of the
//! course's upcoming lessons or a typed date ("Datum wählen"), and the
//! course's materials can be dropped into the description.

use chrono::NaiveDate;

use crate::db::{parse_due_input, Database};
use crate::error::{PlannerError, PlannerResult};
use crate::schedule::{next_occurrences, DateOption};
use crate::task::Task;
use crate::tui::enums::FormField;
use crate::tui::input::InputField;

/// Label of the due entry that takes a typed date.
pub const CUSTOM_DATE_LABEL: &str = "Datum wählen";

pub struct TaskForm {
    /// Task being edited, `None` when adding.
    pub editing: Option<String>,
    pub courses: Vec<String>,
    pub course_index: usize,
    pub description: InputField,
    pub material_index: usize,
    pub options: Vec<DateOption>,
    /// Index into `options`; `options.len()` selects the typed date.
    pub due_index: usize,
    pub custom_due: InputField,
    pub focus: FormField,
}

impl TaskForm {
    /// Start an empty form for the courses currently in `db`.
    pub fn new(db: &Database, today: NaiveDate) -> Self {
        let mut form = TaskForm {
            editing: None,
            courses: db.unique_courses(),
            course_index: 0,
            description: InputField::new(),
            material_index: 0,
            options: Vec::new(),
            due_index: 0,
            custom_due: InputField::new(),
            focus: FormField::Course,
        };
        form.refresh_options(db, today);
        form
    }

    /// Start a form pre-filled from `task`.
    pub fn edit(db: &Database, task: &Task, today: NaiveDate) -> Self {
        let mut form = Self::new(db, today);
        form.editing = Some(task.id.clone());
        form.course_index = match form.courses.iter().position(|c| *c == task.course) {
            Some(i) => i,
            None => {
                form.courses.push(task.course.clone());
                form.courses.len() - 1
            }
        };
        form.refresh_options(db, today);
        form.description = InputField::with_value(&task.description);
        form.focus = FormField::Description;

        if let Some(due) = task.due {
            match form.options.iter().position(|o| o.date == due) {
                Some(i) => form.due_index = i,
                None => {
                    form.due_index = form.options.len();
                    form.custom_due = InputField::with_value(&due.format("%d.%m.%Y").to_string());
                }
            }
        }
        form
    }

    pub fn course(&self) -> Option<&str> {
        self.courses.get(self.course_index).map(String::as_str)
    }

    /// The selected lesson, `None` while the typed date is selected.
    pub fn lesson(&self) -> Option<&DateOption> {
        self.options.get(self.due_index)
    }

    pub fn is_custom_due(&self) -> bool {
        self.due_index >= self.options.len()
    }

    /// The due date the form would submit.
    pub fn due_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self.lesson() {
            Some(option) => Some(option.date),
            None => parse_due_input(&self.custom_due.value, today),
        }
    }

    fn refresh_options(&mut self, db: &Database, today: NaiveDate) {
        self.options = match self.course() {
            Some(course) => next_occurrences(&db.schedule, course, today),
            None => Vec::new(),
        };
        self.due_index = 0;
        self.material_index = 0;
    }

    /// Cycle the course and recompute the lesson dates offered for it.
    pub fn cycle_course(&mut self, forward: bool, db: &Database, today: NaiveDate) {
        if self.courses.is_empty() {
            return;
        }
        let len = self.courses.len();
        self.course_index = if forward {
            (self.course_index + 1) % len
        } else {
            (self.course_index + len - 1) % len
        };
        self.refresh_options(db, today);
    }

    /// Cycle through the lessons and the typed-date entry.
    pub fn cycle_due(&mut self, forward: bool) {
        let len = self.options.len() + 1;
        self.due_index = if forward {
            (self.due_index + 1) % len
        } else {
            (self.due_index + len - 1) % len
        };
    }

    /// Name of the highlighted material of the selected course.
    pub fn material<'a>(&self, db: &'a Database) -> Option<&'a str> {
        let materials = db.materials_of(self.course()?);
        materials
            .get(self.material_index % materials.len().max(1))
            .map(|m| m.name.as_str())
    }

    pub fn cycle_material(&mut self, forward: bool, db: &Database) {
        let len = self.course().map(|c| db.materials_of(c).len()).unwrap_or(0);
        if len == 0 {
            return;
        }
        self.material_index = if forward {
            (self.material_index + 1) % len
        } else {
            (self.material_index + len - 1) % len
        };
    }

    /// Put the highlighted material into the description at its cursor.
    pub fn insert_material(&mut self, db: &Database) -> bool {
        match self.material(db) {
            Some(name) => {
                self.description.replace_word_before_cursor(name);
                true
            }
            None => false,
        }
    }

    /// Save the form into `db`. Returns the id of the added or edited task.
    pub fn submit(&self, db: &mut Database, today: NaiveDate) -> PlannerResult<String> {
        let course = self.course().unwrap_or_default();
        let due = self.due_date(today);
        if due.is_none() && !self.custom_due.value.trim().is_empty() {
            return Err(PlannerError::InvalidInput(format!(
                "cannot read due date '{}'",
                self.custom_due.value.trim()
            )));
        }
        match &self.editing {
            Some(id) => {
                if self.description.value.trim().is_empty() || due.is_none() {
                    return Err(PlannerError::InvalidInput(
                        "description and due date are required".into(),
                    ));
                }
                db.update_task(id, Some(course), Some(&self.description.value), due)?;
                Ok(id.clone())
            }
            None => db.add_task(course, &self.description.value, due),
        }
    }
}
