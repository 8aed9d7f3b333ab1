//! Command-line front end over `campuslife_core`.
//!
//! # Responsibility
//! - Drive every core use-case from a terminal against one storage file.
//! - Keep the active user in storage, exactly like the mobile shell does.

mod commands;

use anyhow::{Context, Result};
use campuslife_core::{open_db, AppConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "campuslife")]
#[command(about = "Tasks, budget and shared class schedules for a small group of students")]
struct Cli {
    /// Storage file (overrides CAMPUSLIFE_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Write rolling logs into this absolute directory
    #[arg(long, global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in as one of the roster users
    Login { name: String, pin: String },
    Logout,
    /// Show the active user
    Whoami,
    /// Remove all stored data (administrator only)
    ClearData,
    #[command(subcommand)]
    Task(TaskCommand),
    #[command(subcommand)]
    Budget(BudgetCommand),
    #[command(subcommand)]
    Schedule(ScheduleCommand),
    #[command(subcommand)]
    Avatar(AvatarCommand),
    #[command(subcommand)]
    Tutorial(TutorialCommand),
    /// Dashboard summary for today (or --date)
    Home {
        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TaskCommand {
    Add { text: String },
    List,
    /// Toggle a task's completed flag
    Done { id: String },
    Rm { id: String },
    Reset,
}

#[derive(Subcommand)]
pub enum BudgetCommand {
    /// Record an expense (category: food|money)
    Add {
        category: String,
        amount: f64,
        description: String,
    },
    Rm { category: String, id: String },
    /// Set a category limit; 0 clears it
    Limit { category: String, amount: f64 },
    Show,
    Reset,
}

#[derive(Subcommand)]
pub enum ScheduleCommand {
    /// Add a weekly class
    AddClass {
        name: String,
        /// Weekday, e.g. "Mon"
        #[arg(long)]
        day: String,
        /// Start time (HH:MM)
        #[arg(long)]
        start: String,
        /// End time (HH:MM)
        #[arg(long)]
        end: String,
        /// Semester, e.g. "Fall 2025" (defaults to the current one)
        #[arg(long)]
        semester: Option<String>,
    },
    /// Add a one-off event
    AddEvent {
        name: String,
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
    /// Items on one day (defaults to today)
    Day {
        #[arg(long)]
        date: Option<String>,
    },
    /// Every item you can see
    List,
    /// Calendar marks starting at --from (defaults to today)
    Marks {
        #[arg(long)]
        from: Option<String>,
    },
    Share { id: String },
    Rm { id: String },
    Reset,
    /// Drop stored duplicates
    Compact,
    /// Who is free when on one day
    Compare {
        users: Vec<String>,
        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AvatarCommand {
    Show,
    /// Set a slot (upper_hair|lower_hair|outfit|accessory)
    Set { slot: String, value: String },
}

#[derive(Subcommand)]
pub enum TutorialCommand {
    /// Print every step and whether the tutorial is pending
    Show,
    /// Mark the tutorial as seen
    Done,
    Reset,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(log_dir) = cli.log_dir.as_deref() {
        campuslife_core::init_logging(&config.log_level, log_dir)?;
    }

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open storage at {}", config.db_path.display()))?;
    let session = commands::Session::new(&conn, &config);

    match cli.command {
        Commands::Login { name, pin } => commands::login(&session, &name, &pin),
        Commands::Logout => commands::logout(&session),
        Commands::Whoami => commands::whoami(&session),
        Commands::ClearData => commands::clear_data(&session),
        Commands::Task(command) => commands::task(&session, command),
        Commands::Budget(command) => commands::budget(&session, command),
        Commands::Schedule(command) => commands::schedule(&session, command),
        Commands::Avatar(command) => commands::avatar(&session, command),
        Commands::Tutorial(command) => commands::tutorial(&session, command),
        Commands::Home { date } => commands::home(&session, date.as_deref()),
    }
}
