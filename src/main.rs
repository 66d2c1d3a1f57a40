//! # hw - Homework and Timetable Organiser
//!
//! A command-line homework planner for school students with an optional
//! terminal user interface (TUI).
//!
//! ## Key Features
//!
//! - **Weekly Timetable**: Five school days with nine periods each
//! - **Due Date Suggestions**: Due dates proposed from the next lessons of a course
//! - **Work-Day Overview**: Open homework grouped by the day it should be done,
//!   one day before it is due
//! - **Archive**: Completed work grouped by the day it was finished
//! - **Local File Storage**: A single JSON file, written atomically
//!
//! ## Quick Start
//!
//! ```bash
//! hw course add Mathe
//! hw slot set montag 1 Mathe
//! hw add Mathe "S. 12 Nr. 3" --lesson 1
//! hw            # overview
//! hw ui         # interactive
//! ```
//!
//! Data is stored in `~/.hausaufgaben/planner.json` unless `--db` is given.
//! Set `HW_LOG=debug` (or pass `-v`) to see what the store is doing.

use std::path::PathBuf;

use chrono::Local;
use clap::Parser;

pub mod cli;
pub mod cmd;
pub mod course;
pub mod db;
pub mod error;
pub mod fields;
pub mod logging;
pub mod messages;
pub mod schedule;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use db::*;
use error::PlannerResult;

fn default_db_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".hausaufgaben").join("planner.json")
}

fn run(cli: Cli) -> PlannerResult<()> {
    let db_path = cli.db.unwrap_or_else(default_db_path);
    let now = match cli.today {
        Some(day) => day.and_time(Local::now().time()),
        None => Local::now().naive_local(),
    };
    let today = now.date();
    tracing::debug!(path = %db_path.display(), %today, "starting");

    let command = cli.command.unwrap_or(Commands::Overview);

    // These never touch the store file.
    match command {
        Commands::Ui => return cmd_ui(&db_path, cli.today),
        Commands::Completions { shell } => return cmd_completions(shell),
        _ => {}
    }

    let mut db = Database::load(&db_path);

    match command {
        Commands::Overview => cmd_overview(&db, today),
        Commands::Add { course, description, due, lesson, material } => {
            cmd_add(&mut db, &db_path, today, course, description, due, lesson, material)
        }
        Commands::Edit { id, course, desc, due, lesson } => {
            cmd_edit(&mut db, &db_path, today, id, course, desc, due, lesson)
        }
        Commands::Toggle { id } => cmd_toggle(&mut db, &db_path, id),
        Commands::Archive => cmd_archive(&mut db, &db_path, now),
        Commands::Archived => cmd_archived(&db, today),
        Commands::Restore { id } => cmd_restore(&mut db, &db_path, id),
        Commands::Delete { id } => cmd_delete(&mut db, &db_path, id),
        Commands::Purge => cmd_purge(&mut db, &db_path),
        Commands::Suggest { course } => cmd_suggest(&db, today, course),
        Commands::Timetable { day } => cmd_timetable(&db, day),
        Commands::Slot { action } => cmd_slot(&mut db, &db_path, action),
        Commands::Course { action } => cmd_course(&mut db, &db_path, action),
        Commands::Material { action } => cmd_material(&mut db, &db_path, action),
        Commands::Ui | Commands::Completions { .. } => Ok(()),
    }
}

fn main() {
    let cli = Cli::parse();
    // The UI owns the terminal; only warnings may reach stderr there.
    let verbose = if matches!(cli.command, Some(Commands::Ui)) {
        0
    } else {
        cli.verbose
    };
    logging::init_logging(verbose);

    if let Err(e) = run(cli) {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
