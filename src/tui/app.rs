//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which manages the TUI state,
//! handles key presses, renders the three views (tasks, timetable, archive)
//! and writes every change straight back to the store file.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Tabs, Wrap,
    },
    Frame, Terminal,
};
use tracing::warn;

use crate::db::{truncate, Database};
use crate::fields::{format_school_day, SchoolDay, PERIODS_PER_DAY};
use crate::messages::daily_message;
use crate::schedule::{
    classify_and_group_tasks, format_long_date, group_archived_by_completion_date, weekday_name,
    TaskGroup,
};
use crate::task::Task;
use crate::tui::{
    colors::{ACCENT_BLUE, MUTED_GRAY, SUCCESS_GREEN, WARNING_RED},
    enums::{AppState, FormField, View},
    input::InputField,
    task_form::{TaskForm, CUSTOM_DATE_LABEL},
    utils::centered_rect,
};

/// One line of the task and archive lists.
enum Entry {
    Heading(String, Color),
    Task(String),
}

/// Main application state for the terminal user interface.
pub struct App {
    db: Database,
    db_path: PathBuf,
    today_override: Option<NaiveDate>,
    view: View,
    state: AppState,
    list_state: ListState,
    entries: Vec<Entry>,
    selected: Option<String>,
    timetable_day: SchoolDay,
    form: Option<TaskForm>,
    confirm_delete: Option<String>,
    status_message: String,
}

impl App {
    /// Create a new App instance, loading the store from the specified path.
    pub fn new(db_path: &Path, today: Option<NaiveDate>) -> Self {
        let db = Database::load(db_path);
        let reference = today.unwrap_or_else(|| Local::now().date_naive());
        let mut app = App {
            db,
            db_path: db_path.to_path_buf(),
            today_override: today,
            view: View::Tasks,
            state: AppState::Browse,
            list_state: ListState::default(),
            entries: Vec::new(),
            selected: None,
            timetable_day: SchoolDay::current_or_friday(reference.weekday()),
            form: None,
            confirm_delete: None,
            status_message: String::new(),
        };
        app.rebuild_entries();
        app
    }

    fn today(&self) -> NaiveDate {
        self.today_override.unwrap_or_else(|| Local::now().date_naive())
    }

    fn now(&self) -> NaiveDateTime {
        match self.today_override {
            Some(day) => day.and_time(Local::now().time()),
            None => Local::now().naive_local(),
        }
    }

    fn push_groups(entries: &mut Vec<Entry>, groups: &[TaskGroup], color: Color) {
        for group in groups {
            entries.push(Entry::Heading(group.label.clone(), color));
            entries.extend(group.tasks.iter().map(|t| Entry::Task(t.id.clone())));
        }
    }

    /// Recompute the visible list for the current view and keep the
    /// selection on the same task when it is still visible.
    fn rebuild_entries(&mut self) {
        let today = self.today();
        let mut entries = Vec::new();
        match self.view {
            View::Tasks => {
                let overview = classify_and_group_tasks(&self.db.tasks, today);
                if !overview.overdue.is_empty() {
                    entries.push(Entry::Heading("Überfällig".into(), WARNING_RED));
                    entries.extend(overview.overdue.iter().map(|t| Entry::Task(t.id.clone())));
                }
                if !overview.today.is_empty() {
                    entries.push(Entry::Heading("Heute erledigen".into(), ACCENT_BLUE));
                    entries.extend(overview.today.iter().map(|t| Entry::Task(t.id.clone())));
                }
                Self::push_groups(&mut entries, &overview.future, ACCENT_BLUE);
            }
            View::Archive => {
                let groups = group_archived_by_completion_date(&self.db.tasks, today);
                Self::push_groups(&mut entries, &groups, SUCCESS_GREEN);
            }
            View::Timetable => {}
        }
        self.entries = entries;

        let ids = self.task_ids();
        let keep = self.selected.as_ref().filter(|id| ids.contains(&id.as_str())).cloned();
        self.selected = keep.or_else(|| ids.first().map(|id| id.to_string()));
        self.sync_list_state();
    }

    fn task_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                Entry::Task(id) => Some(id.as_str()),
                Entry::Heading(..) => None,
            })
            .collect()
    }

    fn sync_list_state(&mut self) {
        let position = self.selected.as_ref().and_then(|sel| {
            self.entries
                .iter()
                .position(|e| matches!(e, Entry::Task(id) if id == sel))
        });
        self.list_state.select(position);
    }

    fn move_selection(&mut self, delta: isize) {
        let ids = self.task_ids();
        if ids.is_empty() {
            return;
        }
        let current = self
            .selected
            .as_ref()
            .and_then(|sel| ids.iter().position(|id| id == sel))
            .unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, ids.len() as isize - 1) as usize;
        self.selected = Some(ids[next].to_string());
        self.sync_list_state();
    }

    fn selected_task(&self) -> Option<&Task> {
        self.selected.as_deref().and_then(|id| self.db.get(id))
    }

    /// Save the store and refresh the view, reporting the outcome in the status bar.
    fn persist(&mut self, message: &str) {
        match self.db.save(&self.db_path) {
            Ok(()) => self.status_message = message.to_string(),
            Err(e) => {
                warn!(error = %e, "saving from the UI failed");
                self.status_message = format!("Speichern fehlgeschlagen: {e}");
            }
        }
        self.rebuild_entries();
    }

    fn switch_view(&mut self, view: View) {
        self.view = view;
        self.selected = None;
        self.rebuild_entries();
    }

    /// Handle one key press. Returns true if the application should quit.
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match self.state {
            AppState::Browse => return self.handle_browse_key(key),
            AppState::AddTask => self.handle_form_key(key),
            AppState::Help => {
                if matches!(
                    key,
                    KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h') | KeyCode::Char('?')
                ) {
                    self.state = AppState::Browse;
                }
            }
            AppState::Confirm => self.handle_confirm_key(key),
        }
        false
    }

    fn handle_browse_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => self.switch_view(self.view.next()),
            KeyCode::BackTab => self.switch_view(self.view.previous()),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Left if self.view == View::Timetable => {
                self.timetable_day = self.timetable_day.previous();
            }
            KeyCode::Right if self.view == View::Timetable => {
                self.timetable_day = self.timetable_day.next();
            }
            KeyCode::Char(' ') if self.view == View::Tasks => {
                if let Some(id) = self.selected.clone() {
                    match self.db.toggle_task(&id) {
                        Ok(true) => self.persist("Erledigt."),
                        Ok(false) => self.persist("Wieder offen."),
                        Err(e) => self.status_message = e.to_string(),
                    }
                }
            }
            KeyCode::Char('a') => {
                if self.db.has_completed_tasks() {
                    let count = self.db.archive_completed(self.now());
                    self.persist(&format!("{count} Aufgabe(n) archiviert."));
                } else {
                    self.status_message = "Nichts zu archivieren.".into();
                }
            }
            KeyCode::Char('r') if self.view == View::Archive => {
                if let Some(id) = self.selected.clone() {
                    match self.db.unmark_completed(&id) {
                        Ok(()) => self.persist("Wiederhergestellt."),
                        Err(e) => self.status_message = e.to_string(),
                    }
                }
            }
            KeyCode::Char('d') if self.view != View::Timetable => {
                if let Some(id) = self.selected.clone() {
                    self.confirm_delete = Some(id);
                    self.state = AppState::Confirm;
                }
            }
            KeyCode::Char('n') => {
                if self.db.courses.is_empty() {
                    self.status_message = "Noch keine Fächer angelegt (hw course add).".into();
                } else {
                    self.form = Some(TaskForm::new(&self.db, self.today()));
                    self.state = AppState::AddTask;
                }
            }
            KeyCode::Char('e') if self.view == View::Tasks => {
                if let Some(task) = self.selected_task() {
                    self.form = Some(TaskForm::edit(&self.db, task, self.today()));
                    self.state = AppState::AddTask;
                }
            }
            KeyCode::Char('h') | KeyCode::Char('?') => self.state = AppState::Help,
            _ => {}
        }
        false
    }

    fn handle_confirm_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('j') | KeyCode::Enter => {
                if let Some(id) = self.confirm_delete.take() {
                    match self.db.delete_task(&id) {
                        Ok(_) => {
                            self.selected = None;
                            self.persist("Gelöscht.");
                        }
                        Err(e) => self.status_message = e.to_string(),
                    }
                }
                self.state = AppState::Browse;
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.confirm_delete = None;
                self.state = AppState::Browse;
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyCode) {
        let today = self.today();
        let Some(form) = self.form.as_mut() else {
            self.state = AppState::Browse;
            return;
        };
        let typing_date = form.focus == FormField::Due && form.is_custom_due();
        match key {
            KeyCode::Esc => {
                self.form = None;
                self.state = AppState::Browse;
            }
            KeyCode::Enter => {
                let editing = form.editing.is_some();
                match form.submit(&mut self.db, today) {
                    Ok(id) => {
                        self.form = None;
                        self.state = AppState::Browse;
                        self.selected = Some(id);
                        self.persist(if editing {
                            "Aufgabe geändert."
                        } else {
                            "Aufgabe hinzugefügt."
                        });
                    }
                    Err(e) => self.status_message = e.to_string(),
                }
            }
            KeyCode::Tab | KeyCode::Down => form.focus = form.focus.next(),
            KeyCode::BackTab | KeyCode::Up => form.focus = form.focus.previous(),
            KeyCode::Left | KeyCode::Right => {
                let forward = key == KeyCode::Right;
                match form.focus {
                    FormField::Course => form.cycle_course(forward, &self.db, today),
                    FormField::Material => form.cycle_material(forward, &self.db),
                    FormField::Due => form.cycle_due(forward),
                    FormField::Description if forward => form.description.move_cursor_right(),
                    FormField::Description => form.description.move_cursor_left(),
                }
            }
            KeyCode::Char(' ') if form.focus == FormField::Material => {
                if !form.insert_material(&self.db) {
                    self.status_message = "Keine Materialien für dieses Fach.".into();
                }
            }
            KeyCode::Char(c) if form.focus == FormField::Description => {
                form.description.handle_char(c)
            }
            KeyCode::Char(c) if typing_date => form.custom_due.handle_char(c),
            KeyCode::Backspace if form.focus == FormField::Description => {
                form.description.handle_backspace()
            }
            KeyCode::Backspace if typing_date => form.custom_due.handle_backspace(),
            KeyCode::Delete if form.focus == FormField::Description => {
                form.description.handle_delete()
            }
            KeyCode::Delete if typing_date => form.custom_due.handle_delete(),
            _ => {}
        }
    }

    /// Poll for and handle keyboard events.
    ///
    /// Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    return Ok(false);
                }
                if self.state == AppState::Browse {
                    self.status_message.clear();
                }
                return Ok(self.handle_key(key.code));
            }
        }
        Ok(false)
    }

    fn task_item(&self, task: &Task) -> ListItem<'static> {
        let base = if task.completed {
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
        } else {
            Style::default()
        };
        let check = if task.completed { "[x] " } else { "[ ] " };
        let trailing = match (self.view, task.due, task.completed_at) {
            (View::Archive, _, Some(at)) => format!("  {}", at.format("%H:%M")),
            (_, Some(due), _) => format!("  {}", weekday_name(due.weekday())),
            _ => String::new(),
        };
        ListItem::new(Line::from(vec![
            Span::styled(check, base),
            Span::styled(
                format!("{:<14}", truncate(&task.course, 14)),
                base.fg(ACCENT_BLUE).add_modifier(Modifier::BOLD),
            ),
            Span::styled(task.description.clone(), base),
            Span::styled(trailing, Style::default().fg(MUTED_GRAY)),
        ]))
    }

    fn list_items(&self) -> Vec<ListItem<'static>> {
        self.entries
            .iter()
            .map(|entry| match entry {
                Entry::Heading(label, color) => ListItem::new(Line::from(Span::styled(
                    label.clone(),
                    Style::default().fg(*color).add_modifier(Modifier::BOLD),
                ))),
                Entry::Task(id) => match self.db.get(id) {
                    Some(task) => self.task_item(task),
                    None => ListItem::new(""),
                },
            })
            .collect()
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let titles: Vec<&str> = View::ALL.iter().map(|v| v.title()).collect();
        let tabs = Tabs::new(titles)
            .select(self.view.index())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("HAUSAUFGABEN  {}", format_long_date(self.today()))),
            )
            .highlight_style(Style::default().fg(ACCENT_BLUE).add_modifier(Modifier::BOLD));
        f.render_widget(tabs, area);
    }

    fn render_list(&mut self, f: &mut Frame, area: Rect, title: &str, empty_text: &str) {
        if self.entries.is_empty() {
            let empty = Paragraph::new(empty_text.to_string())
                .block(Block::default().borders(Borders::ALL).title(title.to_string()))
                .alignment(Alignment::Center);
            f.render_widget(empty, area);
            return;
        }
        let list = List::new(self.list_items())
            .block(Block::default().borders(Borders::ALL).title(title.to_string()))
            .highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");
        f.render_stateful_widget(list, area, &mut self.list_state);
    }

    fn render_tasks(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let overview = classify_and_group_tasks(&self.db.tasks, self.today());
        let open = overview.needs_attention();
        let message = daily_message(self.today(), open);
        let color = if open { WARNING_RED } else { SUCCESS_GREEN };
        let banner = Paragraph::new(format!("{} {}", message.emoji, message.text))
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(banner, chunks[0]);

        let pending = overview.iter().filter(|t| !t.completed).count();
        self.render_list(
            f,
            chunks[1],
            &format!("Aufgaben ({pending} offen)"),
            "Keine offenen Hausaufgaben.",
        );
    }

    fn render_timetable(&self, f: &mut Frame, area: Rect) {
        let day = self.timetable_day;
        let is_today = SchoolDay::from_weekday(self.today().weekday()) == Some(day);
        let rows: Vec<Row> = (1..=PERIODS_PER_DAY)
            .map(|period| {
                let course = self.db.course_at(day, period);
                let style = if course.is_some() {
                    Style::default().fg(ACCENT_BLUE)
                } else {
                    Style::default().fg(MUTED_GRAY)
                };
                Row::new(vec![
                    Cell::from(format!("{period}.")),
                    Cell::from(course.unwrap_or("-").to_string()).style(style),
                ])
            })
            .collect();
        let title = format!(
            "< {}{} >",
            format_school_day(day),
            if is_today { " (heute)" } else { "" }
        );
        let table = Table::new(rows, [Constraint::Length(4), Constraint::Min(20)])
            .header(
                Row::new(vec!["Std", "Fach"]).style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(table, area);
    }

    fn render_form(&self, f: &mut Frame, area: Rect) {
        let Some(form) = &self.form else {
            return;
        };
        let popup = centered_rect(70, 50, area);
        f.render_widget(Clear, popup);

        let field_style = |field: FormField| {
            if form.focus == field {
                Style::default().fg(ACCENT_BLUE).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            }
        };
        let with_cursor = |field: &InputField| {
            let mut shown = field.value.clone();
            let at = shown
                .char_indices()
                .nth(field.cursor)
                .map(|(i, _)| i)
                .unwrap_or(shown.len());
            shown.insert(at, '|');
            shown
        };
        let description = if form.focus == FormField::Description {
            with_cursor(&form.description)
        } else {
            form.description.value.clone()
        };
        let material = match form.material(&self.db) {
            Some(name) => format!("< {name} >  (Leertaste: einfügen)"),
            None => "keine".to_string(),
        };
        let due = match form.lesson() {
            Some(option) => format!("< {} >", option.label),
            None if form.focus == FormField::Due => {
                format!("< {CUSTOM_DATE_LABEL} > {}", with_cursor(&form.custom_due))
            }
            None => format!("< {CUSTOM_DATE_LABEL} > {}", form.custom_due.value),
        };
        let preview = match form.due_date(self.today()) {
            Some(date) => format_long_date(date),
            None => "TT.MM.JJJJ, heute, morgen".to_string(),
        };

        let lines = vec![
            Line::from(vec![
                Span::styled("Fach:     ", field_style(FormField::Course)),
                Span::raw(format!("< {} >", form.course().unwrap_or("-"))),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Aufgabe:  ", field_style(FormField::Description)),
                Span::raw(description),
            ]),
            Line::from(vec![
                Span::styled("Material: ", field_style(FormField::Material)),
                Span::raw(material),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Fällig:   ", field_style(FormField::Due)),
                Span::raw(due),
            ]),
            Line::from(Span::styled(
                format!("          {preview}"),
                Style::default().fg(MUTED_GRAY),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Tab: Feld wechseln  ←/→: auswählen  Enter: speichern  Esc: abbrechen",
                Style::default().fg(MUTED_GRAY),
            )),
        ];
        let title = if form.editing.is_some() {
            "Aufgabe bearbeiten"
        } else {
            "Neue Aufgabe"
        };
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, popup);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let popup = centered_rect(60, 60, area);
        f.render_widget(Clear, popup);
        let lines: Vec<Line> = [
            ("Tab / Shift+Tab", "Ansicht wechseln"),
            ("↑/↓, j/k", "Aufgabe auswählen"),
            ("Leertaste", "erledigt / offen"),
            ("a", "Erledigte archivieren"),
            ("r", "aus dem Archiv zurückholen"),
            ("d", "Aufgabe löschen"),
            ("n", "neue Aufgabe"),
            ("e", "Aufgabe bearbeiten"),
            ("←/→", "Tag im Stundenplan"),
            ("q / Esc", "beenden"),
        ]
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!("{key:<18}"), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(*what),
            ])
        })
        .collect();
        let help =
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Hilfe"));
        f.render_widget(help, popup);
    }

    fn render_confirm(&self, f: &mut Frame, area: Rect) {
        let popup = centered_rect(50, 20, area);
        f.render_widget(Clear, popup);
        let what = self
            .selected_task()
            .map(|t| format!("{}: {}", t.course, t.description))
            .unwrap_or_default();
        let text = vec![
            Line::from(what),
            Line::from(""),
            Line::from(Span::styled("Wirklich löschen? (y/n)", Style::default().fg(WARNING_RED))),
        ];
        let confirm = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Löschen"))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(confirm, popup);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match self.view {
                View::Tasks => {
                    "Leertaste: erledigt | a: archivieren | n: neu | e: bearbeiten | h: Hilfe"
                        .to_string()
                }
                View::Timetable => "←/→: Tag wechseln | Tab: Ansicht | h: Hilfe".to_string(),
                View::Archive => "r: zurückholen | d: löschen | h: Hilfe".to_string(),
            }
        };
        let status = Paragraph::new(text)
            .style(Style::default().bg(ACCENT_BLUE).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Main render function that dispatches to the view renderers.
    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        self.render_header(f, chunks[0]);
        match self.view {
            View::Tasks => self.render_tasks(f, chunks[1]),
            View::Timetable => self.render_timetable(f, chunks[1]),
            View::Archive => {
                self.render_list(f, chunks[1], "Erledigt", "Keine erledigten Aufgaben im Archiv.")
            }
        }
        match self.state {
            AppState::AddTask => self.render_form(f, chunks[1]),
            AppState::Help => self.render_help(f, chunks[1]),
            AppState::Confirm => self.render_confirm(f, chunks[1]),
            AppState::Browse => {}
        }
        self.render_status_bar(f, chunks[2]);
    }

    /// Main event loop for the TUI application.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}
