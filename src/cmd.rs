//! Command implementations for the CLI interface.
//!
//! Each subcommand loads nothing itself: `main` hands over the store, the
//! path it persists to and the reference instant. Handlers that change the
//! store save it before returning. Rendering is split into `render_*`
//! functions returning strings so the output can be checked in tests.

use std::fmt::Write as _;
use std::io;
use std::path::Path;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::db::*;
use crate::error::{PlannerError, PlannerResult};
use crate::fields::*;
use crate::messages::daily_message;
use crate::schedule::{
    classify_and_group_tasks, group_archived_by_completion_date, next_occurrences, weekday_name,
    DateOption, TaskGroup,
};
use crate::task::Task;
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Show open homework: overdue, for today, and grouped by work day.
    Overview,

    /// Add a homework task.
    Add {
        /// Course name (must exist, see `hw course add`).
        course: String,
        /// What to do.
        description: String,
        /// Due date: YYYY-MM-DD, DD.MM.YYYY, "heute", "morgen".
        #[arg(long)]
        due: Option<String>,
        /// Use the N-th upcoming lesson of the course as due date (1 = next).
        #[arg(long, conflicts_with = "due")]
        lesson: Option<usize>,
        /// Put a material of the course (name or id) in front of the description.
        #[arg(long)]
        material: Option<String>,
    },

    /// Change fields on a task.
    Edit {
        /// Task id or unique id prefix.
        id: String,
        #[arg(long)]
        course: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long, conflicts_with = "due")]
        lesson: Option<usize>,
    },

    /// Mark a task done, or open again.
    Toggle {
        /// Task id or unique id prefix.
        id: String,
    },

    /// Move all completed tasks to the archive.
    Archive,

    /// List archived tasks grouped by completion day.
    Archived,

    /// Take a task out of the archive and reopen it.
    Restore {
        /// Task id or unique id prefix.
        id: String,
    },

    /// Delete a task.
    Delete {
        /// Task id or unique id prefix.
        id: String,
    },

    /// Delete every archived task.
    Purge,

    /// Suggest due dates from the next lessons of a course.
    Suggest {
        /// Course name.
        course: String,
    },

    /// Show the weekly timetable.
    Timetable {
        /// Only show one day.
        #[arg(long, value_enum)]
        day: Option<SchoolDay>,
    },

    /// Edit timetable cells.
    Slot {
        #[command(subcommand)]
        action: SlotAction,
    },

    /// Manage courses.
    Course {
        #[command(subcommand)]
        action: CourseAction,
    },

    /// Manage course materials.
    Material {
        #[command(subcommand)]
        action: MaterialAction,
    },

    /// Launch the interactive UI.
    Ui,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum SlotAction {
    /// Put a course into a cell, replacing what was there.
    Set {
        #[arg(value_enum)]
        day: SchoolDay,
        /// Period 1-9.
        period: u8,
        course: String,
    },
    /// Empty a cell.
    Clear {
        #[arg(value_enum)]
        day: SchoolDay,
        period: u8,
    },
}

#[derive(Subcommand)]
pub enum CourseAction {
    /// Add a course.
    Add { name: String },
    /// List courses with their materials.
    List,
    /// Remove a course that is not in the timetable.
    Rm {
        /// Course id or name.
        course: String,
    },
    /// Rename a course and its timetable cells.
    Rename {
        /// Course id or name.
        course: String,
        new_name: String,
    },
}

#[derive(Subcommand)]
pub enum MaterialAction {
    /// Add a material to a course.
    Add {
        course: String,
        name: String,
        #[arg(long, value_enum, default_value_t = MaterialKind::Other)]
        kind: MaterialKind,
    },
    /// Remove a material by id or name.
    Rm { course: String, material: String },
}

/// Work out a due date from an explicit input or the course's lessons.
///
/// An explicit date wins; `lesson` picks the N-th projected occurrence;
/// with neither, the next lesson is used.
pub fn resolve_due(
    db: &Database,
    course: &str,
    due: Option<&str>,
    lesson: Option<usize>,
    today: NaiveDate,
) -> PlannerResult<NaiveDate> {
    if let Some(input) = due {
        return parse_due_input(input, today)
            .ok_or_else(|| PlannerError::InvalidInput(format!("cannot read due date '{input}'")));
    }
    let options = next_occurrences(&db.schedule, course, today);
    match lesson {
        Some(n) => n
            .checked_sub(1)
            .and_then(|i| options.get(i))
            .map(|o| o.date)
            .ok_or_else(|| {
                PlannerError::InvalidInput(format!(
                    "lesson {n} is not available, {} upcoming for '{course}'",
                    options.len()
                ))
            }),
        None => options
            .first()
            .map(|o| o.date)
            .ok_or_else(|| PlannerError::NoSuggestion(course.to_string())),
    }
}

/// Prefix `description` with the name of one of the course's materials.
pub fn with_material(
    db: &Database,
    course: &str,
    description: &str,
    material: Option<&str>,
) -> PlannerResult<String> {
    let description = description.trim();
    match material {
        Some(material) => {
            let name = &db.find_material(course, material)?.name;
            Ok(format!("{name} {description}").trim_end().to_string())
        }
        None => Ok(description.to_string()),
    }
}

/// One task as a single line.
pub fn format_task_line(task: &Task) -> String {
    let check = if task.completed { "[x]" } else { "[ ]" };
    let due = task
        .due
        .map(|d| format!("  ({})", weekday_name(d.weekday())))
        .unwrap_or_default();
    format!(
        "{} {}  {:<12} {}{}",
        check,
        task.short_id(),
        truncate(&task.course, 12),
        task.description,
        due
    )
}

fn push_section(out: &mut String, title: &str, tasks: &[Task]) {
    let _ = writeln!(out, "{title}");
    for task in tasks {
        let _ = writeln!(out, "  {}", format_task_line(task));
    }
    out.push('\n');
}

/// Render the overview for `today`.
pub fn render_overview(db: &Database, today: NaiveDate) -> String {
    let overview = classify_and_group_tasks(&db.tasks, today);
    let mut out = String::new();

    if !overview.overdue.is_empty() {
        push_section(&mut out, "Überfällig", &overview.overdue);
    }
    if !overview.today.is_empty() {
        push_section(&mut out, "Heute erledigen", &overview.today);
    }
    for group in &overview.future {
        push_section(&mut out, &group.label, &group.tasks);
    }
    if overview.is_empty() {
        out.push_str("Keine offenen Hausaufgaben.\n\n");
    }

    let message = daily_message(today, overview.needs_attention());
    let _ = writeln!(out, "{} {}", message.emoji, message.text);
    out
}

/// Render archived tasks grouped by completion day.
pub fn render_archived(groups: &[TaskGroup]) -> String {
    if groups.is_empty() {
        return "Keine erledigten Aufgaben im Archiv.\n".to_string();
    }
    let mut out = String::new();
    for group in groups {
        let _ = writeln!(out, "{}", group.label);
        for task in &group.tasks {
            let _ = writeln!(
                out,
                "  ✓ {}  {:<12} {}",
                task.short_id(),
                truncate(&task.course, 12),
                task.description
            );
        }
        out.push('\n');
    }
    out
}

/// Render due-date suggestions as a numbered list.
pub fn render_suggestions(course: &str, options: &[DateOption]) -> String {
    if options.is_empty() {
        return format!("Keine Stunden für '{course}' im Stundenplan.\n");
    }
    let mut out = String::new();
    for (i, option) in options.iter().enumerate() {
        let _ = writeln!(out, "{:>2}. {}  {}", i + 1, option.date.format("%Y-%m-%d"), option.label);
    }
    out
}

/// Render the whole week as a grid or a single day as a list.
pub fn render_timetable(db: &Database, day: Option<SchoolDay>) -> String {
    let mut out = String::new();
    match day {
        Some(day) => {
            let _ = writeln!(out, "{}", format_school_day(day));
            for period in 1..=PERIODS_PER_DAY {
                let _ = writeln!(out, "  {}. {}", period, db.course_at(day, period).unwrap_or("-"));
            }
        }
        None => {
            let _ = write!(out, "{:<3}", "");
            for day in SchoolDay::ALL {
                let _ = write!(out, " {:<12}", format_school_day(day));
            }
            out.push('\n');
            for period in 1..=PERIODS_PER_DAY {
                let _ = write!(out, "{:<3}", format!("{period}."));
                for day in SchoolDay::ALL {
                    let course = db.course_at(day, period).unwrap_or("-");
                    let _ = write!(out, " {:<12}", truncate(course, 12));
                }
                out.push('\n');
            }
        }
    }
    out
}

/// Print the overview.
pub fn cmd_overview(db: &Database, today: NaiveDate) -> PlannerResult<()> {
    print!("{}", render_overview(db, today));
    Ok(())
}

/// Add a new task to the database.
pub fn cmd_add(
    db: &mut Database,
    db_path: &Path,
    today: NaiveDate,
    course: String,
    description: String,
    due: Option<String>,
    lesson: Option<usize>,
    material: Option<String>,
) -> PlannerResult<()> {
    let course = db.course_name(&course)?;
    let description = with_material(db, &course, &description, material.as_deref())?;
    let due = resolve_due(db, &course, due.as_deref(), lesson, today)?;
    let id = db.add_task(&course, &description, Some(due))?;
    db.save(db_path)?;
    let label = crate::schedule::format_relative_label(due, today);
    println!(
        "Added {} ({course}, fällig {}, {label})",
        &id[..8.min(id.len())],
        due.format("%d.%m.%Y")
    );
    Ok(())
}

/// Update fields on a task.
pub fn cmd_edit(
    db: &mut Database,
    db_path: &Path,
    today: NaiveDate,
    id: String,
    course: Option<String>,
    desc: Option<String>,
    due: Option<String>,
    lesson: Option<usize>,
) -> PlannerResult<()> {
    let id = db.resolve_task(&id)?;
    let course = course.map(|c| db.course_name(&c)).transpose()?;
    let new_due = if due.is_some() || lesson.is_some() {
        let target_course = match &course {
            Some(c) => c.clone(),
            None => db.get(&id).map(|t| t.course.clone()).unwrap_or_default(),
        };
        Some(resolve_due(db, &target_course, due.as_deref(), lesson, today)?)
    } else {
        None
    };
    db.update_task(&id, course.as_deref(), desc.as_deref(), new_due)?;
    db.save(db_path)?;
    println!("Updated {}", &id[..8.min(id.len())]);
    Ok(())
}

/// Flip completion on a task.
pub fn cmd_toggle(db: &mut Database, db_path: &Path, id: String) -> PlannerResult<()> {
    let completed = db.toggle_task(&id)?;
    db.save(db_path)?;
    println!("{}", if completed { "Erledigt." } else { "Wieder offen." });
    Ok(())
}

/// Archive all completed tasks.
pub fn cmd_archive(db: &mut Database, db_path: &Path, now: NaiveDateTime) -> PlannerResult<()> {
    if !db.has_completed_tasks() {
        println!("Nothing to archive.");
        return Ok(());
    }
    let count = db.archive_completed(now);
    db.save(db_path)?;
    println!("Archived {count} task(s).");
    Ok(())
}

/// List archived tasks.
pub fn cmd_archived(db: &Database, today: NaiveDate) -> PlannerResult<()> {
    let groups = group_archived_by_completion_date(&db.tasks, today);
    print!("{}", render_archived(&groups));
    Ok(())
}

/// Reopen an archived task.
pub fn cmd_restore(db: &mut Database, db_path: &Path, id: String) -> PlannerResult<()> {
    db.unmark_completed(&id)?;
    db.save(db_path)?;
    println!("Restored.");
    Ok(())
}

/// Delete a task.
pub fn cmd_delete(db: &mut Database, db_path: &Path, id: String) -> PlannerResult<()> {
    let task = db.delete_task(&id)?;
    db.save(db_path)?;
    println!("Deleted {} ({})", task.short_id(), task.course);
    Ok(())
}

/// Delete all archived tasks.
pub fn cmd_purge(db: &mut Database, db_path: &Path) -> PlannerResult<()> {
    let removed = db.delete_archived_tasks();
    db.save(db_path)?;
    println!("Deleted {removed} archived task(s).");
    Ok(())
}

/// Print due-date suggestions for a course.
pub fn cmd_suggest(db: &Database, today: NaiveDate, course: String) -> PlannerResult<()> {
    let course = db.course_name(&course).unwrap_or(course);
    let options = next_occurrences(&db.schedule, &course, today);
    print!("{}", render_suggestions(&course, &options));
    Ok(())
}

/// Print the timetable.
pub fn cmd_timetable(db: &Database, day: Option<SchoolDay>) -> PlannerResult<()> {
    print!("{}", render_timetable(db, day));
    Ok(())
}

/// Edit timetable cells.
pub fn cmd_slot(db: &mut Database, db_path: &Path, action: SlotAction) -> PlannerResult<()> {
    match action {
        SlotAction::Set { day, period, course } if course.trim().is_empty() => {
            db.set_slot(day, period, &course)?;
            println!("{} {}. Stunde geleert.", format_school_day(day), period);
        }
        SlotAction::Set { day, period, course } => {
            let course = db.course_name(&course)?;
            db.set_slot(day, period, &course)?;
            println!("{} {}. Stunde: {}", format_school_day(day), period, course);
        }
        SlotAction::Clear { day, period } => {
            if !(1..=PERIODS_PER_DAY).contains(&period) {
                return Err(PlannerError::InvalidPeriod(period));
            }
            if db.clear_slot(day, period) {
                println!("{} {}. Stunde geleert.", format_school_day(day), period);
            } else {
                println!("{} {}. Stunde war schon frei.", format_school_day(day), period);
            }
        }
    }
    db.save(db_path)
}

/// Manage courses.
pub fn cmd_course(db: &mut Database, db_path: &Path, action: CourseAction) -> PlannerResult<()> {
    match action {
        CourseAction::Add { name } => {
            db.add_course(&name)?;
            println!("Added course {}", name.trim());
        }
        CourseAction::List => {
            let mut courses: Vec<_> = db.courses.iter().collect();
            courses.sort_by(|a, b| a.name.cmp(&b.name));
            if courses.is_empty() {
                println!("No courses yet.");
            }
            for course in courses {
                println!("{}", course.name);
                for material in &course.materials {
                    println!(
                        "  - {} [{}] {}",
                        material.name,
                        format_material_kind(material.kind),
                        &material.id[..8.min(material.id.len())]
                    );
                }
            }
            return Ok(());
        }
        CourseAction::Rm { course } => {
            let removed = db.remove_course(&course)?;
            println!("Removed course {}", removed.name);
        }
        CourseAction::Rename { course, new_name } => {
            db.rename_course(&course, &new_name)?;
            println!("Renamed to {}", new_name.trim());
        }
    }
    db.save(db_path)
}

/// Manage course materials.
pub fn cmd_material(
    db: &mut Database,
    db_path: &Path,
    action: MaterialAction,
) -> PlannerResult<()> {
    match action {
        MaterialAction::Add { course, name, kind } => {
            db.add_material(&course, &name, kind)?;
            println!("Added {} to {}", name.trim(), course);
        }
        MaterialAction::Rm { course, material } => {
            let removed = db.remove_material(&course, &material)?;
            println!("Removed {}", removed.name);
        }
    }
    db.save(db_path)
}

/// Launch the terminal user interface.
pub fn cmd_ui(db_path: &Path, today: Option<NaiveDate>) -> PlannerResult<()> {
    run_tui(db_path, today)?;
    Ok(())
}

/// Generate shell completions.
pub fn cmd_completions(shell: Shell) -> PlannerResult<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "hw", &mut io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_db() -> Database {
        let mut db = Database::default();
        db.add_course("Mathe").unwrap();
        db.add_course("Kunst").unwrap();
        db.set_slot(SchoolDay::Monday, 1, "Mathe").unwrap();
        db.set_slot(SchoolDay::Wednesday, 2, "Mathe").unwrap();
        db
    }

    #[test]
    fn resolve_due_prefers_explicit_date() {
        let db = sample_db();
        let today = date(2024, 1, 11);
        assert_eq!(
            resolve_due(&db, "Mathe", Some("morgen"), None, today).unwrap(),
            date(2024, 1, 12)
        );
        assert!(resolve_due(&db, "Mathe", Some("bald"), None, today).is_err());
    }

    #[test]
    fn resolve_due_uses_lessons() {
        let db = sample_db();
        let thursday = date(2024, 1, 11);
        assert_eq!(resolve_due(&db, "Mathe", None, None, thursday).unwrap(), date(2024, 1, 15));
        assert_eq!(resolve_due(&db, "Mathe", None, Some(2), thursday).unwrap(), date(2024, 1, 17));
        assert!(resolve_due(&db, "Mathe", None, Some(0), thursday).is_err());
        assert!(resolve_due(&db, "Mathe", None, Some(9), thursday).is_err());
        assert!(matches!(
            resolve_due(&db, "Kunst", None, None, thursday),
            Err(PlannerError::NoSuggestion(_))
        ));
    }

    #[test]
    fn overview_lists_sections_in_order() {
        let mut db = sample_db();
        let today = date(2024, 1, 10);
        db.add_task("Mathe", "S. 12", Some(today)).unwrap();
        db.add_task("Kunst", "Bild", Some(date(2024, 1, 13))).unwrap();
        let out = render_overview(&db, today);

        let overdue = out.find("Überfällig").unwrap();
        let friday = out.find("Diese Woche Freitag").unwrap();
        assert!(overdue < friday);
        assert!(out.contains("S. 12"));
        assert!(!out.contains("Heute erledigen"));
    }

    #[test]
    fn empty_overview_is_motivating() {
        let db = sample_db();
        let out = render_overview(&db, date(2024, 1, 10));
        assert!(out.starts_with("Keine offenen Hausaufgaben."));
    }

    #[test]
    fn task_line_shows_state_and_weekday() {
        let mut task = Task::new("Mathe", "S. 12", Some(date(2024, 1, 12)));
        task.id = "0123456789abcdef".to_string();
        assert_eq!(format_task_line(&task), "[ ] 01234567  Mathe        S. 12  (Freitag)");
        task.completed = true;
        assert!(format_task_line(&task).starts_with("[x]"));
    }

    #[test]
    fn suggestions_are_numbered() {
        let db = sample_db();
        let options = next_occurrences(&db.schedule, "Mathe", date(2024, 1, 11));
        let out = render_suggestions("Mathe", &options);
        assert!(out.starts_with(" 1. 2024-01-15  Nächste Stunde (Nächste Woche Montag)"));
        assert_eq!(out.lines().count(), options.len());
        assert!(render_suggestions("Kunst", &[]).contains("Keine Stunden"));
    }

    #[test]
    fn timetable_grid_and_day_view() {
        let db = sample_db();
        let grid = render_timetable(&db, None);
        assert_eq!(grid.lines().count(), 1 + PERIODS_PER_DAY as usize);
        assert!(grid.lines().nth(1).unwrap().contains("Mathe"));

        let monday = render_timetable(&db, Some(SchoolDay::Monday));
        assert!(monday.contains("1. Mathe"));
        assert!(monday.contains("2. -"));
    }

    #[test]
    fn archived_rendering_groups_by_label() {
        let mut db = sample_db();
        let today = date(2024, 1, 10);
        let id = db.add_task("Mathe", "S. 12", Some(today)).unwrap();
        db.toggle_task(&id).unwrap();
        db.archive_completed(today.and_hms_opt(18, 0, 0).unwrap());
        let groups = group_archived_by_completion_date(&db.tasks, today);
        let out = render_archived(&groups);
        assert!(out.starts_with("Heute\n"));
        assert!(out.contains("✓"));
        assert!(render_archived(&[]).contains("Keine erledigten"));
    }

    #[test]
    fn add_and_toggle_persist_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planner.json");
        let mut db = sample_db();
        let today = date(2024, 1, 11);

        cmd_add(&mut db, &path, today, "mathe".into(), "Aufgabe 4".into(), None, None, None)
            .unwrap();
        let stored = Database::load(&path);
        assert_eq!(stored.tasks.len(), 1);
        assert_eq!(stored.tasks[0].course, "Mathe");
        assert_eq!(stored.tasks[0].due, Some(date(2024, 1, 15)));

        let id = stored.tasks[0].id.clone();
        cmd_toggle(&mut db, &path, id[..6].to_string()).unwrap();
        assert!(Database::load(&path).tasks[0].completed);
    }

    #[test]
    fn add_rejects_unknown_course() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planner.json");
        let mut db = sample_db();
        let today = date(2024, 1, 11);
        let result = cmd_add(&mut db, &path, today, "Latein".into(), "x".into(), None, None, None);
        assert!(matches!(result, Err(PlannerError::CourseNotFound(_))));
        assert!(!path.exists());
    }

    #[test]
    fn add_puts_material_before_description() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planner.json");
        let mut db = sample_db();
        db.add_material("Mathe", "Lambacher Schweizer", MaterialKind::Book).unwrap();
        let today = date(2024, 1, 11);

        let material = Some("lambacher schweizer".to_string());
        cmd_add(&mut db, &path, today, "Mathe".into(), "S. 40".into(), None, None, material)
            .unwrap();
        assert_eq!(Database::load(&path).tasks[0].description, "Lambacher Schweizer S. 40");

        let missing = Some("Atlas".to_string());
        let result =
            cmd_add(&mut db, &path, today, "Mathe".into(), "x".into(), None, None, missing);
        assert!(matches!(result, Err(PlannerError::MaterialNotFound(_))));
        assert_eq!(Database::load(&path).tasks.len(), 1);
    }

    #[test]
    fn blank_slot_course_clears_the_cell() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planner.json");
        let mut db = sample_db();
        let clear = SlotAction::Set {
            day: SchoolDay::Monday,
            period: 1,
            course: "  ".into(),
        };
        cmd_slot(&mut db, &path, clear).unwrap();
        assert_eq!(db.course_at(SchoolDay::Monday, 1), None);
        assert_eq!(Database::load(&path).day_slots(SchoolDay::Wednesday).len(), 1);

        let unknown = SlotAction::Set {
            day: SchoolDay::Monday,
            period: 1,
            course: "Latein".into(),
        };
        assert!(matches!(
            cmd_slot(&mut db, &path, unknown),
            Err(PlannerError::CourseNotFound(_))
        ));
    }
}
