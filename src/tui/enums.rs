//! Enumerations for TUI state management.

/// The three screens reachable with Tab.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum View {
    Tasks,
    Timetable,
    Archive,
}

impl View {
    pub const ALL: [View; 3] = [View::Tasks, View::Timetable, View::Archive];

    pub fn title(self) -> &'static str {
        match self {
            View::Tasks => "Aufgaben",
            View::Timetable => "Stundenplan",
            View::Archive => "Erledigt",
        }
    }

    pub fn index(self) -> usize {
        match self {
            View::Tasks => 0,
            View::Timetable => 1,
            View::Archive => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Application state for the terminal user interface.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppState {
    Browse,
    AddTask,
    Help,
    Confirm,
}

/// Focused field of the add/edit form.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FormField {
    Course,
    Description,
    Material,
    Due,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Course => FormField::Description,
            FormField::Description => FormField::Material,
            FormField::Material => FormField::Due,
            FormField::Due => FormField::Course,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            FormField::Course => FormField::Due,
            FormField::Description => FormField::Course,
            FormField::Material => FormField::Description,
            FormField::Due => FormField::Material,
        }
    }
}
