//! Database operations and utility functions for the planner state.
//!
//! This module provides the `Database` struct owning the timetable, the task
//! list and the course list, plus parsing and formatting helpers used by the
//! CLI and the TUI. Mutations only touch memory; callers persist with
//! [`Database::save`] afterwards.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::course::{Course, Material, WeeklySlot};
use crate::error::{PlannerError, PlannerResult};
use crate::fields::*;
use crate::schedule;
use crate::task::Task;

/// Shortest id prefix accepted when addressing a task.
pub const MIN_ID_PREFIX: usize = 4;

/// In-memory store for the timetable, tasks and courses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Database {
    pub schedule: Vec<WeeklySlot>,
    pub tasks: Vec<Task>,
    pub courses: Vec<Course>,
}

/// Deserialize every element of `collection` on its own, dropping the ones
/// that do not fit the record shape.
fn load_records<T: DeserializeOwned>(doc: &Value, collection: &str) -> Vec<T> {
    let Some(value) = doc.get(collection) else {
        return Vec::new();
    };
    let Some(items) = value.as_array() else {
        warn!(collection, "expected an array, ignoring stored value");
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value::<T>(item.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(collection, index = i, error = %e, "dropping invalid record");
                None
            }
        })
        .collect()
}

impl Database {
    /// Load the store from a JSON file.
    ///
    /// A missing file gives an empty store. Records that fail validation are
    /// dropped individually; a file that is not JSON at all gives an empty
    /// store as well.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "no store file yet, starting empty");
            return Database::default();
        }
        let buf = match fs::read_to_string(path) {
            Ok(buf) => buf,
            Err(e) => {
                error!(path = %path.display(), error = %e, "error reading store, starting fresh");
                return Database::default();
            }
        };
        let doc: Value = match serde_json::from_str(&buf) {
            Ok(doc) => doc,
            Err(e) => {
                error!(path = %path.display(), error = %e, "error parsing store, starting fresh");
                return Database::default();
            }
        };
        Self::from_value(&doc)
    }

    /// Build a store from an untyped JSON document, validating each record.
    pub fn from_value(doc: &Value) -> Self {
        let mut schedule: Vec<WeeklySlot> = Vec::new();
        for slot in load_records::<WeeklySlot>(doc, "schedule") {
            if !(1..=PERIODS_PER_DAY).contains(&slot.period) || slot.course.trim().is_empty() {
                warn!(
                    period = slot.period,
                    course = %slot.course,
                    "dropping invalid timetable slot"
                );
                continue;
            }
            // Later entries for the same cell win.
            schedule.retain(|s| !s.is_at(slot.day, slot.period));
            schedule.push(slot);
        }

        let tasks: Vec<Task> = load_records::<Task>(doc, "tasks")
            .into_iter()
            .filter(|t| {
                let ok = !t.id.trim().is_empty();
                if !ok {
                    warn!(course = %t.course, "dropping task without id");
                }
                ok
            })
            .collect();

        let courses: Vec<Course> = load_records::<Course>(doc, "courses")
            .into_iter()
            .filter(|c| {
                let ok = !c.id.trim().is_empty() && !c.name.trim().is_empty();
                if !ok {
                    warn!(id = %c.id, "dropping course without id or name");
                }
                ok
            })
            .collect();

        debug!(
            slots = schedule.len(),
            tasks = tasks.len(),
            courses = courses.len(),
            "store loaded"
        );
        Database { schedule, tasks, courses }
    }

    /// Save the store to a JSON file using atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> PlannerResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(self)?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        debug!(path = %path.display(), tasks = self.tasks.len(), "store saved");
        Ok(())
    }

    // ---- timetable ----

    /// Put `course` into the cell at `(day, period)`, replacing what was there.
    /// A blank course clears the cell.
    pub fn set_slot(&mut self, day: SchoolDay, period: u8, course: &str) -> PlannerResult<()> {
        if !(1..=PERIODS_PER_DAY).contains(&period) {
            return Err(PlannerError::InvalidPeriod(period));
        }
        let course = course.trim();
        if course.is_empty() {
            self.clear_slot(day, period);
            return Ok(());
        }
        match self.schedule.iter_mut().find(|s| s.is_at(day, period)) {
            Some(slot) => slot.course = course.to_string(),
            None => self.schedule.push(WeeklySlot::new(day, period, course)),
        }
        info!(day = format_school_day(day), period, course, "timetable slot set");
        Ok(())
    }

    /// Remove the cell at `(day, period)`. Returns whether a cell was removed.
    pub fn clear_slot(&mut self, day: SchoolDay, period: u8) -> bool {
        let before = self.schedule.len();
        self.schedule.retain(|s| !s.is_at(day, period));
        before != self.schedule.len()
    }

    /// Course taught at `(day, period)`, if any.
    pub fn course_at(&self, day: SchoolDay, period: u8) -> Option<&str> {
        self.schedule
            .iter()
            .find(|s| s.is_at(day, period))
            .map(|s| s.course.as_str())
    }

    /// The cells of one day, ordered by period.
    pub fn day_slots(&self, day: SchoolDay) -> Vec<&WeeklySlot> {
        let mut slots: Vec<&WeeklySlot> = self.schedule.iter().filter(|s| s.day == day).collect();
        slots.sort_by_key(|s| s.period);
        slots
    }

    // ---- courses ----

    /// Sorted, de-duplicated course names.
    pub fn unique_courses(&self) -> Vec<String> {
        let mut names: Vec<String> = self.courses.iter().map(|c| c.name.clone()).collect();
        names.sort();
        names.dedup();
        names
    }

    /// Find a course by id or (case-insensitive) name.
    pub fn find_course(&self, id_or_name: &str) -> Option<usize> {
        let needle = id_or_name.trim();
        self.courses
            .iter()
            .position(|c| c.id == needle)
            .or_else(|| {
                self.courses
                    .iter()
                    .position(|c| c.name.to_lowercase() == needle.to_lowercase())
            })
    }

    fn course_index(&self, id_or_name: &str) -> PlannerResult<usize> {
        self.find_course(id_or_name)
            .ok_or_else(|| PlannerError::CourseNotFound(id_or_name.to_string()))
    }

    /// Canonical name of a known course.
    pub fn course_name(&self, id_or_name: &str) -> PlannerResult<String> {
        let idx = self.course_index(id_or_name)?;
        Ok(self.courses[idx].name.clone())
    }

    pub fn add_course(&mut self, name: &str) -> PlannerResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlannerError::InvalidInput("course name cannot be empty".into()));
        }
        if self.courses.iter().any(|c| c.name.to_lowercase() == name.to_lowercase()) {
            return Err(PlannerError::DuplicateCourse(name.to_string()));
        }
        let course = Course::new(name);
        let id = course.id.clone();
        self.courses.push(course);
        info!(course = name, "course added");
        Ok(id)
    }

    /// Remove a course unless the timetable still uses it.
    pub fn remove_course(&mut self, id_or_name: &str) -> PlannerResult<Course> {
        let idx = self.course_index(id_or_name)?;
        let name = &self.courses[idx].name;
        if self.schedule.iter().any(|s| &s.course == name) {
            return Err(PlannerError::CourseInUse(name.clone()));
        }
        let course = self.courses.remove(idx);
        info!(course = %course.name, "course removed");
        Ok(course)
    }

    /// Rename a course and every timetable cell that referenced it.
    pub fn rename_course(&mut self, id_or_name: &str, new_name: &str) -> PlannerResult<()> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(PlannerError::InvalidInput("course name cannot be empty".into()));
        }
        let idx = self.course_index(id_or_name)?;
        if self
            .courses
            .iter()
            .enumerate()
            .any(|(i, c)| i != idx && c.name.to_lowercase() == new_name.to_lowercase())
        {
            return Err(PlannerError::DuplicateCourse(new_name.to_string()));
        }
        let old_name = std::mem::replace(&mut self.courses[idx].name, new_name.to_string());
        for slot in self.schedule.iter_mut().filter(|s| s.course == old_name) {
            slot.course = new_name.to_string();
        }
        info!(from = %old_name, to = new_name, "course renamed");
        Ok(())
    }

    pub fn add_material(
        &mut self,
        course: &str,
        name: &str,
        kind: MaterialKind,
    ) -> PlannerResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlannerError::InvalidInput("material name cannot be empty".into()));
        }
        let idx = self.course_index(course)?;
        let material = Material::new(name, kind);
        let id = material.id.clone();
        self.courses[idx].materials.push(material);
        Ok(id)
    }

    fn material_position(&self, course_idx: usize, material: &str) -> PlannerResult<usize> {
        let materials = &self.courses[course_idx].materials;
        materials
            .iter()
            .position(|m| {
                m.id == material || (material.len() >= MIN_ID_PREFIX && m.id.starts_with(material))
            })
            .or_else(|| {
                materials
                    .iter()
                    .position(|m| m.name.to_lowercase() == material.trim().to_lowercase())
            })
            .ok_or_else(|| PlannerError::MaterialNotFound(material.to_string()))
    }

    /// Look up a material of a course by id, id prefix or name.
    pub fn find_material(&self, course: &str, material: &str) -> PlannerResult<&Material> {
        let idx = self.course_index(course)?;
        let pos = self.material_position(idx, material)?;
        Ok(&self.courses[idx].materials[pos])
    }

    /// Materials of a course, empty for unknown courses.
    pub fn materials_of(&self, course: &str) -> &[Material] {
        match self.find_course(course) {
            Some(idx) => &self.courses[idx].materials,
            None => &[],
        }
    }

    /// Remove a material by id or name from a course.
    pub fn remove_material(&mut self, course: &str, material: &str) -> PlannerResult<Material> {
        let idx = self.course_index(course)?;
        let pos = self.material_position(idx, material)?;
        Ok(self.courses[idx].materials.remove(pos))
    }

    // ---- tasks ----

    /// Get a task by full id.
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Get a mutable reference to a task by full id.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Resolve a full id or a unique id prefix to a full task id.
    pub fn resolve_task(&self, identifier: &str) -> PlannerResult<String> {
        let identifier = identifier.trim();
        if let Some(task) = self.get(identifier) {
            return Ok(task.id.clone());
        }
        if identifier.len() < MIN_ID_PREFIX {
            return Err(PlannerError::TaskNotFound(identifier.to_string()));
        }
        let matches: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.id.starts_with(identifier))
            .collect();
        match matches.as_slice() {
            [] => Err(PlannerError::TaskNotFound(identifier.to_string())),
            [task] => Ok(task.id.clone()),
            many => Err(PlannerError::AmbiguousTask {
                prefix: identifier.to_string(),
                candidates: many
                    .iter()
                    .map(|t| format!("{} ({})", t.short_id(), t.course))
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    fn task_mut(&mut self, identifier: &str) -> PlannerResult<&mut Task> {
        let id = self.resolve_task(identifier)?;
        self.get_mut(&id).ok_or(PlannerError::TaskNotFound(id))
    }

    /// Add an open task. Course, description and due date are all required.
    pub fn add_task(
        &mut self,
        course: &str,
        description: &str,
        due: Option<NaiveDate>,
    ) -> PlannerResult<String> {
        let course = course.trim();
        let description = description.trim();
        if course.is_empty() || description.is_empty() {
            return Err(PlannerError::InvalidInput("course and description are required".into()));
        }
        let Some(due) = due else {
            return Err(PlannerError::InvalidInput("a due date is required".into()));
        };
        let task = Task::new(course, description, Some(due));
        let id = task.id.clone();
        self.tasks.push(task);
        info!(course, due = %due, "task added");
        Ok(id)
    }

    /// Change the given fields of a task.
    pub fn update_task(
        &mut self,
        identifier: &str,
        course: Option<&str>,
        description: Option<&str>,
        due: Option<NaiveDate>,
    ) -> PlannerResult<()> {
        let task = self.task_mut(identifier)?;
        if let Some(course) = course.map(str::trim).filter(|c| !c.is_empty()) {
            task.course = course.to_string();
        }
        if let Some(description) = description.map(str::trim).filter(|d| !d.is_empty()) {
            task.description = description.to_string();
        }
        if let Some(due) = due {
            task.due = Some(due);
        }
        info!(id = %task.id, "task updated");
        Ok(())
    }

    /// Flip the completion flag. Returns the new value.
    pub fn toggle_task(&mut self, identifier: &str) -> PlannerResult<bool> {
        let task = self.task_mut(identifier)?;
        task.completed = !task.completed;
        info!(id = %task.id, completed = task.completed, "task toggled");
        Ok(task.completed)
    }

    /// Bring a task back from the archive as an open task.
    pub fn unmark_completed(&mut self, identifier: &str) -> PlannerResult<()> {
        let task = self.task_mut(identifier)?;
        task.completed = false;
        task.archived = false;
        task.completed_at = None;
        info!(id = %task.id, "task restored");
        Ok(())
    }

    pub fn delete_task(&mut self, identifier: &str) -> PlannerResult<Task> {
        let id = self.resolve_task(identifier)?;
        let pos = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| PlannerError::TaskNotFound(id.clone()))?;
        info!(id = %id, "task deleted");
        Ok(self.tasks.remove(pos))
    }

    /// Archive all completed tasks at `now`. Returns how many were archived.
    pub fn archive_completed(&mut self, now: NaiveDateTime) -> usize {
        let count = self.tasks.iter().filter(|t| t.completed && !t.archived).count();
        self.tasks = schedule::archive_completed_tasks(&self.tasks, now);
        info!(count, "completed tasks archived");
        count
    }

    /// Remove tasks that are completed and archived. Returns how many were removed.
    pub fn delete_archived_tasks(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed || !t.archived);
        let removed = before - self.tasks.len();
        info!(removed, "archived tasks purged");
        removed
    }

    /// Whether any completed task is waiting to be archived.
    pub fn has_completed_tasks(&self) -> bool {
        self.tasks.iter().any(|t| t.completed && !t.archived)
    }
}

/// Parse a due date given on the command line.
///
/// Supports "heute"/"today", "morgen"/"tomorrow", "übermorgen", ISO
/// `YYYY-MM-DD` and German `DD.MM.YYYY`.
pub fn parse_due_input(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();
    match s.as_str() {
        "heute" | "today" => return Some(today),
        "morgen" | "tomorrow" => return Some(today + Duration::days(1)),
        "übermorgen" | "uebermorgen" => return Some(today + Duration::days(2)),
        _ => {}
    }
    NaiveDate::parse_from_str(&s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&s, "%d.%m.%Y"))
        .ok()
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn set_slot_overwrites_the_same_cell() {
        let mut db = Database::default();
        db.set_slot(SchoolDay::Monday, 2, "Mathe").unwrap();
        db.set_slot(SchoolDay::Monday, 2, "Physik").unwrap();
        assert_eq!(db.schedule.len(), 1);
        assert_eq!(db.course_at(SchoolDay::Monday, 2), Some("Physik"));
    }

    #[test]
    fn blank_course_clears_slot() {
        let mut db = Database::default();
        db.set_slot(SchoolDay::Friday, 5, "Sport").unwrap();
        db.set_slot(SchoolDay::Friday, 5, "  ").unwrap();
        assert!(db.schedule.is_empty());
    }

    #[test]
    fn period_must_be_in_range() {
        let mut db = Database::default();
        assert!(matches!(
            db.set_slot(SchoolDay::Monday, 0, "Mathe"),
            Err(PlannerError::InvalidPeriod(0))
        ));
        assert!(matches!(
            db.set_slot(SchoolDay::Monday, 10, "Mathe"),
            Err(PlannerError::InvalidPeriod(10))
        ));
    }

    #[test]
    fn day_slots_are_ordered_by_period() {
        let mut db = Database::default();
        db.set_slot(SchoolDay::Tuesday, 6, "Kunst").unwrap();
        db.set_slot(SchoolDay::Tuesday, 1, "Mathe").unwrap();
        db.set_slot(SchoolDay::Wednesday, 2, "Deutsch").unwrap();
        let periods: Vec<u8> = db.day_slots(SchoolDay::Tuesday).iter().map(|s| s.period).collect();
        assert_eq!(periods, vec![1, 6]);
    }

    #[test]
    fn course_in_timetable_cannot_be_removed() {
        let mut db = Database::default();
        db.add_course("Mathe").unwrap();
        db.set_slot(SchoolDay::Monday, 1, "Mathe").unwrap();
        assert!(matches!(db.remove_course("Mathe"), Err(PlannerError::CourseInUse(_))));
        db.clear_slot(SchoolDay::Monday, 1);
        assert_eq!(db.remove_course("mathe").unwrap().name, "Mathe");
        assert!(db.courses.is_empty());
    }

    #[test]
    fn duplicate_course_names_are_rejected() {
        let mut db = Database::default();
        db.add_course("Kunst").unwrap();
        assert!(matches!(db.add_course(" kunst "), Err(PlannerError::DuplicateCourse(_))));
        assert!(matches!(db.add_course(""), Err(PlannerError::InvalidInput(_))));
    }

    #[test]
    fn rename_course_updates_timetable() {
        let mut db = Database::default();
        let id = db.add_course("Bio").unwrap();
        db.set_slot(SchoolDay::Thursday, 3, "Bio").unwrap();
        db.set_slot(SchoolDay::Thursday, 4, "Chemie").unwrap();
        db.rename_course(&id, "Biologie").unwrap();
        assert_eq!(db.courses[0].name, "Biologie");
        assert_eq!(db.course_at(SchoolDay::Thursday, 3), Some("Biologie"));
        assert_eq!(db.course_at(SchoolDay::Thursday, 4), Some("Chemie"));
    }

    #[test]
    fn materials_are_added_and_removed() {
        let mut db = Database::default();
        db.add_course("Englisch").unwrap();
        let id = db.add_material("Englisch", "Green Line 3", MaterialKind::Book).unwrap();
        db.add_material("Englisch", "Workbook", MaterialKind::Workbook).unwrap();
        assert_eq!(db.courses[0].materials.len(), 2);
        assert_eq!(db.remove_material("Englisch", &id).unwrap().name, "Green Line 3");
        assert_eq!(
            db.remove_material("Englisch", "Workbook").unwrap().kind,
            MaterialKind::Workbook
        );
        assert!(matches!(
            db.remove_material("Englisch", "missing"),
            Err(PlannerError::MaterialNotFound(_))
        ));
    }

    #[test]
    fn materials_are_found_by_name_or_id() {
        let mut db = Database::default();
        db.add_course("Englisch").unwrap();
        let id = db.add_material("Englisch", "Green Line 3", MaterialKind::Book).unwrap();
        assert_eq!(db.find_material("englisch", "green line 3").unwrap().id, id);
        assert_eq!(db.find_material("Englisch", &id[..6]).unwrap().name, "Green Line 3");
        assert!(db.find_material("Englisch", "Atlas").is_err());
        assert_eq!(db.materials_of("Englisch").len(), 1);
        assert!(db.materials_of("Latein").is_empty());
    }

    #[test]
    fn unique_courses_sorted() {
        let mut db = Database::default();
        db.add_course("Mathe").unwrap();
        db.add_course("Deutsch").unwrap();
        db.add_course("Kunst").unwrap();
        assert_eq!(db.unique_courses(), vec!["Deutsch", "Kunst", "Mathe"]);
    }

    #[test]
    fn add_task_requires_fields() {
        let mut db = Database::default();
        assert!(db.add_task("Mathe", "S. 12", None).is_err());
        assert!(db.add_task("", "S. 12", Some(date(2024, 1, 12))).is_err());
        let id = db.add_task("Mathe", "S. 12", Some(date(2024, 1, 12))).unwrap();
        let task = db.get(&id).unwrap();
        assert!(!task.completed && !task.archived);
    }

    #[test]
    fn resolve_task_by_prefix() {
        let mut db = Database::default();
        let id = db.add_task("Mathe", "S. 12", Some(date(2024, 1, 12))).unwrap();
        assert_eq!(db.resolve_task(&id[..8]).unwrap(), id);
        assert!(matches!(db.resolve_task("ab"), Err(PlannerError::TaskNotFound(_))));
    }

    #[test]
    fn ambiguous_prefix_is_reported() {
        let mut db = Database::default();
        for id in ["abcd1111", "abcd2222"] {
            let mut task = Task::new("Mathe", "x", Some(date(2024, 1, 12)));
            task.id = id.to_string();
            db.tasks.push(task);
        }
        assert!(matches!(db.resolve_task("abcd"), Err(PlannerError::AmbiguousTask { .. })));
        assert_eq!(db.resolve_task("abcd2").unwrap(), "abcd2222");
    }

    #[test]
    fn toggle_archive_restore_cycle() {
        let mut db = Database::default();
        let id = db.add_task("Kunst", "Bild malen", Some(date(2024, 1, 12))).unwrap();
        assert!(db.toggle_task(&id).unwrap());
        assert!(db.has_completed_tasks());

        let now = date(2024, 1, 10).and_hms_opt(16, 30, 0).unwrap();
        assert_eq!(db.archive_completed(now), 1);
        assert!(!db.has_completed_tasks());
        let task = db.get(&id).unwrap();
        assert!(task.archived && task.completed);
        assert_eq!(task.completed_at, Some(now));

        db.unmark_completed(&id).unwrap();
        let task = db.get(&id).unwrap();
        assert!(!task.completed && !task.archived && task.completed_at.is_none());
    }

    #[test]
    fn purge_removes_only_archived() {
        let mut db = Database::default();
        let a = db.add_task("Mathe", "a", Some(date(2024, 1, 12))).unwrap();
        let b = db.add_task("Mathe", "b", Some(date(2024, 1, 12))).unwrap();
        db.add_task("Mathe", "c", Some(date(2024, 1, 12))).unwrap();
        db.toggle_task(&a).unwrap();
        db.toggle_task(&b).unwrap();
        db.archive_completed(date(2024, 1, 10).and_hms_opt(9, 0, 0).unwrap());
        db.toggle_task(&b).unwrap();
        db.toggle_task(&b).unwrap();
        assert_eq!(db.delete_archived_tasks(), 2);
        assert_eq!(db.tasks.len(), 1);
    }

    #[test]
    fn load_drops_invalid_records() {
        let doc = json!({
            "schedule": [
                { "day": "Montag", "period": 1, "course": "Mathe" },
                { "day": "Samstag", "period": 1, "course": "Mathe" },
                { "day": "Dienstag", "period": 12, "course": "Kunst" },
                { "day": "Montag", "period": 1, "course": "Physik" }
            ],
            "tasks": [
                {
                    "id": "t1", "course": "Mathe", "description": "S. 4",
                    "due": "2024-01-12", "completed": false
                },
                {
                    "id": "t2", "course": "Mathe", "description": "S. 5",
                    "due": "not a date", "completed": false
                },
                { "course": "Mathe", "description": "S. 6", "due": null, "completed": true }
            ],
            "courses": [
                { "id": "c1", "name": "Mathe", "materials": [] },
                { "id": "c2", "name": "Kunst", "materials": "nope" }
            ]
        });
        let db = Database::from_value(&doc);
        assert_eq!(db.schedule, vec![WeeklySlot::new(SchoolDay::Monday, 1, "Physik")]);
        assert_eq!(db.tasks.len(), 1);
        assert!(!db.tasks[0].archived);
        assert!(db.tasks[0].completed_at.is_none());
        assert_eq!(db.courses.len(), 1);
    }

    #[test]
    fn non_array_collection_is_ignored() {
        let db = Database::from_value(&json!({ "tasks": { "id": "x" }, "courses": [] }));
        assert_eq!(db, Database::default());
    }

    #[test]
    fn save_and_load_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("planner.json");

        let mut db = Database::default();
        db.add_course("Mathe").unwrap();
        db.set_slot(SchoolDay::Wednesday, 2, "Mathe").unwrap();
        db.add_task("Mathe", "S. 12 Nr. 3", Some(date(2024, 1, 17))).unwrap();
        db.save(&path).unwrap();

        assert_eq!(Database::load(&path), db);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn load_missing_or_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert_eq!(Database::load(&missing), Database::default());

        let corrupt = dir.path().join("corrupt.json");
        fs::write(&corrupt, "{ not json").unwrap();
        assert_eq!(Database::load(&corrupt), Database::default());
    }

    #[test]
    fn parse_due_input_forms() {
        let today = date(2024, 1, 10);
        assert_eq!(parse_due_input("heute", today), Some(today));
        assert_eq!(parse_due_input("Morgen", today), Some(date(2024, 1, 11)));
        assert_eq!(parse_due_input("übermorgen", today), Some(date(2024, 1, 12)));
        assert_eq!(parse_due_input("2024-02-01", today), Some(date(2024, 2, 1)));
        assert_eq!(parse_due_input("01.02.2024", today), Some(date(2024, 2, 1)));
        assert_eq!(parse_due_input("someday", today), None);
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate("Mathe", 10), "Mathe");
        assert_eq!(truncate("Hausaufgaben", 6), "Hausa…");
    }
}
