use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use crate::cmd::Commands;

/// File-backed homework and timetable organiser.
/// Storage defaults to ~/.hausaufgaben/planner.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "hw", version, about = "Homework and timetable organiser")]
pub struct Cli {
    /// Path to the JSON database file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Reference date (YYYY-MM-DD) used instead of the local date.
    #[arg(long, global = true, value_parser = parse_date)]
    pub today: Option<NaiveDate>,

    /// Increase log output on stderr. May be repeated.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Validate date format (YYYY-MM-DD).
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{s}': {e}. Use YYYY-MM-DD format"))
}
