//! Color constants for the terminal user interface.

use ratatui::style::Color;

/// Headers, course names and the active tab.
pub const ACCENT_BLUE: Color = Color::Rgb(25, 118, 210);
/// Overdue section and warning messages.
pub const WARNING_RED: Color = Color::Rgb(198, 40, 40);
/// Motivational messages and completed markers.
pub const SUCCESS_GREEN: Color = Color::Rgb(46, 125, 50);
/// Secondary text such as due weekdays.
pub const MUTED_GRAY: Color = Color::Rgb(102, 102, 102);
