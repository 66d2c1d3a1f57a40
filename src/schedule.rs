//! Date scheduling: due-date suggestions, relative labels and task grouping.
//!
//! Everything in here is a pure function of its inputs. The reference date
//! (`today`) or instant (`now`) is always passed in by the caller; nothing
//! reads the wall clock, which keeps every label and grouping reproducible.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};

use crate::course::WeeklySlot;
use crate::task::Task;

/// Default number of due-date suggestions offered for a course.
pub const DEFAULT_MAX_RESULTS: usize = 6;
/// Default number of week boundaries the suggestion walk may cross.
pub const DEFAULT_MAX_WEEKS: u32 = 3;

/// A concrete date a task could be due on, with its display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateOption {
    pub date: NaiveDate,
    pub label: String,
}

/// Tasks sharing one display date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskGroup {
    pub date: NaiveDate,
    pub label: String,
    pub tasks: Vec<Task>,
}

/// Active tasks partitioned relative to a reference date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskOverview {
    /// Due today or earlier, ascending by due date.
    pub overdue: Vec<Task>,
    /// Due tomorrow, i.e. to be done today.
    pub today: Vec<Task>,
    /// Due after tomorrow, grouped by the day before the due date.
    pub future: Vec<TaskGroup>,
}

impl TaskOverview {
    /// True while anything due up to tomorrow is still open.
    pub fn needs_attention(&self) -> bool {
        self.overdue.iter().chain(self.today.iter()).any(|t| !t.completed)
    }

    pub fn is_empty(&self) -> bool {
        self.overdue.is_empty() && self.today.is_empty() && self.future.is_empty()
    }

    /// All tasks in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.overdue
            .iter()
            .chain(self.today.iter())
            .chain(self.future.iter().flat_map(|g| g.tasks.iter()))
    }
}

/// German name of a weekday.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Montag",
        Weekday::Tue => "Dienstag",
        Weekday::Wed => "Mittwoch",
        Weekday::Thu => "Donnerstag",
        Weekday::Fri => "Freitag",
        Weekday::Sat => "Samstag",
        Weekday::Sun => "Sonntag",
    }
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "Januar",
        2 => "Februar",
        3 => "März",
        4 => "April",
        5 => "Mai",
        6 => "Juni",
        7 => "Juli",
        8 => "August",
        9 => "September",
        10 => "Oktober",
        11 => "November",
        _ => "Dezember",
    }
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}

fn previous_day(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(date)
}

/// Monday of the ISO week containing `date`.
pub fn monday_of_week(date: NaiveDate) -> NaiveDate {
    date - chrono::Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Long German date, e.g. "Montag, 8. Januar 2024".
pub fn format_long_date(date: NaiveDate) -> String {
    format!(
        "{}, {}. {} {}",
        weekday_name(date.weekday()),
        date.day(),
        month_name(date.month()),
        date.year()
    )
}

/// Numeric German date, e.g. "08.01.2024".
pub fn format_short_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// Label a date relative to `today`.
///
/// Past dates other than yesterday are written out in full; future dates
/// other than tomorrow are placed by their distance from this week's Monday.
pub fn format_relative_label(date: NaiveDate, today: NaiveDate) -> String {
    let days = (date - today).num_days();
    match days {
        0 => return "Heute".to_string(),
        1 => return "Morgen".to_string(),
        -1 => return "Gestern".to_string(),
        d if d < 0 => return format_long_date(date),
        _ => {}
    }

    let week_diff = (date - monday_of_week(today)).num_days().div_euclid(7);
    let day_name = weekday_name(date.weekday());
    match week_diff {
        0 => format!("Diese Woche {day_name}"),
        1 => format!("Nächste Woche {day_name}"),
        2 => format!("Übernächste Woche {day_name}"),
        n => format!("{day_name} in {n} Wochen"),
    }
}

/// Short label used for completion days: "Heute", "Gestern" or the numeric date.
pub fn format_completion_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Heute".to_string()
    } else if date == previous_day(today) {
        "Gestern".to_string()
    } else {
        format_short_date(date)
    }
}

/// Project the weekly slots of `course` onto the calendar.
///
/// The walk starts the day after `today` and stops after `max_results`
/// occurrences or once `max_weeks` Mondays have been crossed. The first
/// occurrence is labeled as the next lesson.
pub fn project_next_occurrences(
    slots: &[WeeklySlot],
    course: &str,
    today: NaiveDate,
    max_results: usize,
    max_weeks: u32,
) -> Vec<DateOption> {
    let weekdays: BTreeSet<u32> = slots
        .iter()
        .filter(|slot| slot.course == course)
        .map(|slot| slot.day.index())
        .collect();
    if weekdays.is_empty() {
        return Vec::new();
    }

    let mut occurrences: Vec<DateOption> = Vec::new();
    let mut current = next_day(today);
    let mut weeks = 0;

    while occurrences.len() < max_results && weeks < max_weeks {
        if weekdays.contains(&current.weekday().num_days_from_monday()) {
            let label = format_relative_label(current, today);
            let label = if occurrences.is_empty() {
                format!("Nächste Stunde ({label})")
            } else {
                label
            };
            occurrences.push(DateOption { date: current, label });
        }

        let Some(following) = current.succ_opt() else {
            break;
        };
        current = following;
        if current.weekday() == Weekday::Mon {
            weeks += 1;
        }
    }

    occurrences
}

/// [`project_next_occurrences`] with the default bounds.
pub fn next_occurrences(slots: &[WeeklySlot], course: &str, today: NaiveDate) -> Vec<DateOption> {
    project_next_occurrences(slots, course, today, DEFAULT_MAX_RESULTS, DEFAULT_MAX_WEEKS)
}

/// Build groups in first-seen key order from `(key, task)` pairs.
fn group_in_order<I, F>(items: I, label: F) -> Vec<TaskGroup>
where
    I: IntoIterator<Item = (NaiveDate, Task)>,
    F: Fn(NaiveDate) -> String,
{
    let mut groups: Vec<TaskGroup> = Vec::new();
    for (date, task) in items {
        match groups.iter_mut().find(|g| g.date == date) {
            Some(group) => group.tasks.push(task),
            None => groups.push(TaskGroup {
                date,
                label: label(date),
                tasks: vec![task],
            }),
        }
    }
    groups
}

/// Partition active tasks into overdue, today and future groups.
///
/// Archived tasks and tasks without a due date appear nowhere. Tasks due
/// today count as overdue; tasks due tomorrow are today's work. Later tasks
/// are grouped under the day before they are due.
pub fn classify_and_group_tasks(tasks: &[Task], today: NaiveDate) -> TaskOverview {
    let tomorrow = next_day(today);
    let mut scheduled: Vec<(NaiveDate, &Task)> = tasks
        .iter()
        .filter(|t| t.is_active())
        .filter_map(|t| t.due.map(|due| (due, t)))
        .collect();
    scheduled.sort_by_key(|(due, _)| *due);

    let mut overview = TaskOverview::default();
    let mut future: Vec<(NaiveDate, Task)> = Vec::new();
    for (due, task) in scheduled {
        if due <= today {
            overview.overdue.push(task.clone());
        } else if due == tomorrow {
            overview.today.push(task.clone());
        } else {
            future.push((previous_day(due), task.clone()));
        }
    }
    overview.future = group_in_order(future, |bucket| format_relative_label(bucket, today));
    overview
}

/// Archive every completed, not yet archived task, stamping it with `now`.
pub fn archive_completed_tasks(tasks: &[Task], now: NaiveDateTime) -> Vec<Task> {
    tasks
        .iter()
        .map(|task| {
            if task.completed && !task.archived {
                Task {
                    archived: true,
                    completed_at: Some(now),
                    ..task.clone()
                }
            } else {
                task.clone()
            }
        })
        .collect()
}

/// Group archived tasks by completion day, most recent first.
pub fn group_archived_by_completion_date(tasks: &[Task], today: NaiveDate) -> Vec<TaskGroup> {
    let mut archived: Vec<(NaiveDateTime, &Task)> = tasks
        .iter()
        .filter(|t| t.archived)
        .filter_map(|t| t.completed_at.map(|at| (at, t)))
        .collect();
    archived.sort_by(|a, b| b.0.cmp(&a.0));

    group_in_order(
        archived.into_iter().map(|(at, task)| (at.date(), task.clone())),
        |day| format_completion_label(day, today),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::SchoolDay;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, 0, 0).unwrap()
    }

    fn task(id: &str, course: &str, due: Option<NaiveDate>) -> Task {
        Task {
            id: id.to_string(),
            course: course.to_string(),
            description: format!("{course} homework"),
            due,
            completed: false,
            archived: false,
            completed_at: None,
        }
    }

    fn archived(id: &str, completed_at: NaiveDateTime) -> Task {
        Task {
            completed: true,
            archived: true,
            completed_at: Some(completed_at),
            ..task(id, "Deutsch", None)
        }
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn tomorrow_label_on_every_weekday() {
        let start = date(2024, 1, 8);
        for offset in 0..7 {
            let today = start + chrono::Duration::days(offset);
            assert_eq!(format_relative_label(next_day(today), today), "Morgen");
        }
    }

    #[test]
    fn today_and_yesterday_labels() {
        let today = date(2024, 1, 10);
        assert_eq!(format_relative_label(today, today), "Heute");
        assert_eq!(format_relative_label(date(2024, 1, 9), today), "Gestern");
    }

    #[test]
    fn past_dates_use_long_form() {
        let today = date(2024, 1, 10);
        assert_eq!(format_relative_label(date(2024, 1, 8), today), "Montag, 8. Januar 2024");
        assert_eq!(format_relative_label(date(2023, 12, 24), today), "Sonntag, 24. Dezember 2023");
    }

    #[test]
    fn future_dates_use_week_distance() {
        // Wednesday; the week starts on Monday 2024-01-08.
        let today = date(2024, 1, 10);
        assert_eq!(format_relative_label(date(2024, 1, 12), today), "Diese Woche Freitag");
        assert_eq!(format_relative_label(date(2024, 1, 14), today), "Diese Woche Sonntag");
        assert_eq!(format_relative_label(date(2024, 1, 15), today), "Nächste Woche Montag");
        assert_eq!(format_relative_label(date(2024, 1, 24), today), "Übernächste Woche Mittwoch");
        assert_eq!(format_relative_label(date(2024, 1, 29), today), "Montag in 3 Wochen");
    }

    #[test]
    fn distant_dates_use_in_n_weeks_form() {
        let today = date(2024, 1, 10);
        let monday = monday_of_week(today);
        for days in [21i64, 25, 27, 34, 60, 400] {
            let target = monday + chrono::Duration::days(days);
            let n = days / 7;
            let expected = format!("{} in {} Wochen", weekday_name(target.weekday()), n);
            assert_eq!(format_relative_label(target, today), expected);
        }
    }

    #[test]
    fn sunday_reference_belongs_to_the_week_before() {
        let sunday = date(2024, 1, 14);
        assert_eq!(monday_of_week(sunday), date(2024, 1, 8));
        assert_eq!(format_relative_label(date(2024, 1, 16), sunday), "Nächste Woche Dienstag");
    }

    #[test]
    fn completion_label_short_form() {
        let today = date(2024, 1, 10);
        assert_eq!(format_completion_label(today, today), "Heute");
        assert_eq!(format_completion_label(date(2024, 1, 9), today), "Gestern");
        assert_eq!(format_completion_label(date(2024, 1, 2), today), "02.01.2024");
    }

    #[test]
    fn occurrences_for_monday_and_wednesday_from_thursday() {
        let slots = vec![
            WeeklySlot::new(SchoolDay::Monday, 1, "Mathe"),
            WeeklySlot::new(SchoolDay::Wednesday, 3, "Mathe"),
            WeeklySlot::new(SchoolDay::Monday, 4, "Mathe"),
            WeeklySlot::new(SchoolDay::Tuesday, 2, "Kunst"),
        ];
        let thursday = date(2024, 1, 11);
        let options = next_occurrences(&slots, "Mathe", thursday);

        let dates: Vec<NaiveDate> = options.iter().map(|o| o.date).collect();
        assert_eq!(
            dates,
            vec![date(2024, 1, 15), date(2024, 1, 17), date(2024, 1, 22), date(2024, 1, 24)]
        );
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(options[0].label, "Nächste Stunde (Nächste Woche Montag)");
        assert_eq!(options[1].label, "Nächste Woche Mittwoch");
        assert_eq!(options[2].label, "Übernächste Woche Montag");
    }

    #[test]
    fn occurrences_start_tomorrow() {
        let slots = vec![WeeklySlot::new(SchoolDay::Thursday, 1, "Englisch")];
        let wednesday = date(2024, 1, 10);
        let options = next_occurrences(&slots, "Englisch", wednesday);
        assert_eq!(options[0].date, date(2024, 1, 11));
        assert_eq!(options[0].label, "Nächste Stunde (Morgen)");
    }

    #[test]
    fn occurrences_respect_result_bound() {
        let slots: Vec<WeeklySlot> = SchoolDay::ALL
            .iter()
            .map(|&day| WeeklySlot::new(day, 1, "Sport"))
            .collect();
        let options = next_occurrences(&slots, "Sport", date(2024, 1, 8));
        assert_eq!(options.len(), DEFAULT_MAX_RESULTS);

        let limited = project_next_occurrences(&slots, "Sport", date(2024, 1, 8), 2, 3);
        assert_eq!(limited.len(), 2);
    }

    #[test]
    fn occurrences_never_cross_more_week_boundaries_than_allowed() {
        let slots = vec![WeeklySlot::new(SchoolDay::Friday, 2, "Musik")];
        let monday = date(2024, 1, 8);
        for max_weeks in 0..5u32 {
            let options = project_next_occurrences(&slots, "Musik", monday, 100, max_weeks);
            assert_eq!(options.len(), max_weeks as usize);
            if let Some(last) = options.last() {
                let boundaries =
                    (monday_of_week(last.date) - monday_of_week(monday)).num_days() / 7;
                assert!(boundaries < max_weeks as i64);
            }
        }
    }

    #[test]
    fn course_without_slots_has_no_suggestion() {
        let slots = vec![WeeklySlot::new(SchoolDay::Monday, 1, "Mathe")];
        assert!(next_occurrences(&slots, "Biologie", date(2024, 1, 10)).is_empty());
        assert!(next_occurrences(&[], "Mathe", date(2024, 1, 10)).is_empty());
    }

    #[test]
    fn overdue_includes_today_sorted_ascending() {
        let today = date(2024, 1, 10);
        let tasks = vec![
            task("a", "Mathe", Some(today)),
            task("b", "Kunst", Some(date(2024, 1, 3))),
            task("c", "Physik", Some(date(2024, 1, 9))),
            task("d", "Chemie", Some(date(2024, 1, 20))),
        ];
        let overview = classify_and_group_tasks(&tasks, today);
        assert_eq!(ids(&overview.overdue), vec!["b", "c", "a"]);
    }

    #[test]
    fn scenario_math_today_art_in_three_days() {
        let today = date(2024, 1, 10);
        let tasks = vec![
            task("math", "Math", Some(today)),
            task("art", "Art", Some(date(2024, 1, 13))),
        ];
        let overview = classify_and_group_tasks(&tasks, today);
        assert_eq!(ids(&overview.overdue), vec!["math"]);
        assert!(overview.today.is_empty());
        assert_eq!(overview.future.len(), 1);
        assert_eq!(overview.future[0].date, date(2024, 1, 12));
        assert_eq!(overview.future[0].label, "Diese Woche Freitag");
        assert_eq!(ids(&overview.future[0].tasks), vec!["art"]);
    }

    #[test]
    fn tasks_due_tomorrow_are_todays_work() {
        let today = date(2024, 1, 10);
        let tasks = vec![
            task("x", "Mathe", Some(date(2024, 1, 11))),
            task("y", "Kunst", Some(date(2024, 1, 12))),
        ];
        let overview = classify_and_group_tasks(&tasks, today);
        assert_eq!(ids(&overview.today), vec!["x"]);
        assert_eq!(overview.future[0].label, "Morgen");
    }

    #[test]
    fn archived_and_undated_tasks_are_excluded() {
        let today = date(2024, 1, 10);
        let mut done = task("old", "Mathe", Some(date(2024, 1, 5)));
        done.completed = true;
        done.archived = true;
        done.completed_at = Some(at(2024, 1, 5, 12));
        let tasks = vec![done, task("undated", "Kunst", None)];
        assert!(classify_and_group_tasks(&tasks, today).is_empty());
    }

    #[test]
    fn future_groups_are_ascending_and_flatten_to_sorted_input() {
        let today = date(2024, 1, 10);
        let tasks = vec![
            task("late", "Mathe", Some(date(2024, 2, 1))),
            task("fri", "Kunst", Some(date(2024, 1, 13))),
            task("mon", "Physik", Some(date(2024, 1, 16))),
            task("fri2", "Deutsch", Some(date(2024, 1, 13))),
        ];
        let overview = classify_and_group_tasks(&tasks, today);
        let buckets: Vec<NaiveDate> = overview.future.iter().map(|g| g.date).collect();
        assert_eq!(buckets, vec![date(2024, 1, 12), date(2024, 1, 15), date(2024, 1, 31)]);

        let flattened: Vec<&str> = overview
            .future
            .iter()
            .flat_map(|g| g.tasks.iter().map(|t| t.id.as_str()))
            .collect();
        assert_eq!(flattened, vec!["fri", "fri2", "mon", "late"]);
    }

    #[test]
    fn needs_attention_tracks_open_near_tasks() {
        let today = date(2024, 1, 10);
        let mut tasks = vec![task("a", "Mathe", Some(today))];
        assert!(classify_and_group_tasks(&tasks, today).needs_attention());
        tasks[0].completed = true;
        assert!(!classify_and_group_tasks(&tasks, today).needs_attention());
    }

    #[test]
    fn archiving_stamps_completed_tasks_only() {
        let now = at(2024, 1, 10, 15);
        let mut done = task("done", "Mathe", Some(date(2024, 1, 9)));
        done.completed = true;
        let open = task("open", "Kunst", Some(date(2024, 1, 12)));

        let result = archive_completed_tasks(&[done, open.clone()], now);
        assert!(result[0].archived);
        assert_eq!(result[0].completed_at, Some(now));
        assert_eq!(result[1], open);
    }

    #[test]
    fn archiving_is_idempotent() {
        let mut done = task("done", "Mathe", None);
        done.completed = true;
        let once = archive_completed_tasks(&[done], at(2024, 1, 10, 8));
        let twice = archive_completed_tasks(&once, at(2024, 1, 11, 9));
        assert_eq!(once, twice);
    }

    #[test]
    fn archived_groups_by_completion_day_descending() {
        let today = date(2024, 1, 10);
        let tasks = vec![
            archived("week-ago", at(2024, 1, 2, 10)),
            archived("morning", at(2024, 1, 10, 8)),
            task("open", "Mathe", Some(today)),
            archived("evening", at(2024, 1, 10, 19)),
        ];
        let groups = group_archived_by_completion_date(&tasks, today);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "Heute");
        assert_eq!(ids(&groups[0].tasks), vec!["evening", "morning"]);
        assert_eq!(groups[1].label, "02.01.2024");
        assert_eq!(ids(&groups[1].tasks), vec!["week-ago"]);
    }

    #[test]
    fn archived_grouping_labels_yesterday() {
        let today = date(2024, 1, 10);
        let groups = group_archived_by_completion_date(&[archived("y", at(2024, 1, 9, 23))], today);
        assert_eq!(groups[0].label, "Gestern");
    }
}
