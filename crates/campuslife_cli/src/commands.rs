//! Subcommand handlers.

use crate::{AvatarCommand, BudgetCommand, ScheduleCommand, TaskCommand, TutorialCommand};
use anyhow::{anyhow, bail, Result};
use campuslife_core::model::schedule::hhmm;
use campuslife_core::model::tutorial::TUTORIAL_STEPS;
use campuslife_core::schedule::day_filter::MarkKind;
use campuslife_core::{
    AppConfig, AuthService, AvatarService, AvatarSlot, BudgetCategory, BudgetService,
    HomeService, NewClass, NewEvent, ScheduleItem, ScheduleService, Semester, SqliteKvStore,
    TaskService, TutorialService, User,
};
use chrono::{Local, NaiveDate, NaiveTime, Weekday};
use rusqlite::Connection;
use uuid::Uuid;

/// Storage handle plus resolved configuration for one invocation.
pub struct Session<'conn> {
    store: SqliteKvStore<'conn>,
    config: &'conn AppConfig,
}

impl<'conn> Session<'conn> {
    pub fn new(conn: &'conn Connection, config: &'conn AppConfig) -> Self {
        Self {
            store: SqliteKvStore::new(conn),
            config,
        }
    }

    fn auth(&self) -> AuthService<SqliteKvStore<'conn>> {
        AuthService::new(self.store)
    }

    fn schedule(&self) -> ScheduleService<SqliteKvStore<'conn>> {
        ScheduleService::with_grid(self.store, self.config.grid)
    }

    /// Active user, or an error telling how to log in.
    fn require_user(&self) -> Result<User> {
        self.auth().current_user()?.ok_or_else(|| {
            anyhow!("Not logged in.\n\nLog in with:\n  campuslife login <name> <pin>")
        })
    }
}

pub fn login(session: &Session<'_>, name: &str, pin: &str) -> Result<()> {
    let user = session.auth().login(name, pin)?;
    println!("Welcome, {user}!");
    if TutorialService::new(session.store).should_show() {
        println!("New here? Run `campuslife tutorial show`.");
    }
    Ok(())
}

pub fn logout(session: &Session<'_>) -> Result<()> {
    session.auth().logout()?;
    println!("Logged out.");
    Ok(())
}

pub fn whoami(session: &Session<'_>) -> Result<()> {
    match session.auth().current_user()? {
        Some(user) if user.is_admin() => println!("{user} (admin)"),
        Some(user) => println!("{user}"),
        None => println!("Not logged in."),
    }
    Ok(())
}

pub fn clear_data(session: &Session<'_>) -> Result<()> {
    let removed = session.auth().clear_all_data()?;
    println!("Cleared {removed} stored key(s).");
    Ok(())
}

pub fn task(session: &Session<'_>, command: TaskCommand) -> Result<()> {
    let user = session.require_user()?;
    let service = TaskService::new(session.store);
    match command {
        TaskCommand::Add { text } => {
            let task = service.add_task(user, &text)?;
            println!("Added {}", task.id);
        }
        TaskCommand::List => {
            let tasks = service.list_tasks(user)?;
            if tasks.is_empty() {
                println!("No tasks.");
            }
            for task in tasks {
                let mark = if task.completed { "x" } else { " " };
                println!("[{mark}] {}  {}", task.id, task.text);
            }
        }
        TaskCommand::Done { id } => {
            let task = service.toggle_task(user, parse_id(&id)?)?;
            let state = if task.completed { "done" } else { "open" };
            println!("{} is {state}", task.id);
        }
        TaskCommand::Rm { id } => {
            service.delete_task(user, parse_id(&id)?)?;
            println!("Deleted {id}");
        }
        TaskCommand::Reset => {
            service.reset_tasks(user)?;
            println!("Tasks cleared.");
        }
    }
    Ok(())
}

pub fn budget(session: &Session<'_>, command: BudgetCommand) -> Result<()> {
    let user = session.require_user()?;
    let service = BudgetService::new(session.store);
    match command {
        BudgetCommand::Add {
            category,
            amount,
            description,
        } => {
            let expense = service.add_expense(user, parse_category(&category)?, amount, &description)?;
            println!("Added {}", expense.id);
        }
        BudgetCommand::Rm { category, id } => {
            service.delete_expense(user, parse_category(&category)?, parse_id(&id)?)?;
            println!("Deleted {id}");
        }
        BudgetCommand::Limit { category, amount } => {
            let summary = service.set_limit(user, parse_category(&category)?, amount)?;
            println!("{} limit: {:.2}", summary.category, summary.limit);
        }
        BudgetCommand::Show => {
            let budget = service.load_budget(user)?;
            for category in BudgetCategory::ALL {
                let summary = budget.summary(category);
                println!(
                    "{}: spent {:.2} of {:.2} (remaining {:.2})",
                    category, summary.spent, summary.limit, summary.remaining
                );
                for expense in budget.expenses(category) {
                    println!(
                        "  {}  {:>8.2}  {}  {}",
                        expense.id,
                        expense.amount,
                        expense.date.format("%Y-%m-%d"),
                        expense.description
                    );
                }
            }
            println!("Overall: {}%", budget.overview().percentage);
        }
        BudgetCommand::Reset => {
            service.reset_budget(user)?;
            println!("Budget cleared.");
        }
    }
    Ok(())
}

pub fn schedule(session: &Session<'_>, command: ScheduleCommand) -> Result<()> {
    let user = session.require_user()?;
    let service = session.schedule();
    match command {
        ScheduleCommand::AddClass {
            name,
            day,
            start,
            end,
            semester,
        } => {
            let semester = match semester {
                Some(name) => Semester::parse(&name)?,
                None => Semester::containing(today())?,
            };
            let input = NewClass {
                name,
                day: parse_weekday(&day)?,
                start_time: parse_time(&start)?,
                end_time: parse_time(&end)?,
                semester,
            };
            let added = service.add_class(user, input)?;
            print_added(&added.item, &added.conflicts);
        }
        ScheduleCommand::AddEvent {
            name,
            date,
            start,
            end,
        } => {
            let input = NewEvent {
                name,
                date: parse_date(&date)?,
                start_time: parse_time(&start)?,
                end_time: parse_time(&end)?,
            };
            let added = service.add_event(user, input)?;
            print_added(&added.item, &added.conflicts);
        }
        ScheduleCommand::Day { date } => {
            let date = date_or_today(date.as_deref())?;
            let items = service.items_for_day(user, date)?;
            println!("{} ({})", date, date.format("%A"));
            if items.is_empty() {
                println!("  Nothing scheduled.");
            }
            for item in &items {
                println!("  {}", describe(item));
            }
        }
        ScheduleCommand::List => {
            for item in service.visible_items(user)? {
                println!("{}", describe(&item));
            }
        }
        ScheduleCommand::Marks { from } => {
            let from = date_or_today(from.as_deref())?;
            let marks = service.marked_dates(user, from, session.config.mark_horizon_days)?;
            for (date, kind) in marks {
                let label = match kind {
                    MarkKind::Class => "class",
                    MarkKind::Event => "event",
                };
                println!("{date} {label}");
            }
        }
        ScheduleCommand::Share { id } => {
            let copy = service.share_item(user, parse_id(&id)?)?;
            println!("Shared as {}", copy.id);
        }
        ScheduleCommand::Rm { id } => {
            let removed = service.delete_item(user, parse_id(&id)?)?;
            println!("Removed {removed} item(s).");
        }
        ScheduleCommand::Reset => {
            let removed = service.reset_schedule(user)?;
            println!("Removed {removed} item(s).");
        }
        ScheduleCommand::Compact => {
            let removed = service.compact_duplicates()?;
            println!("Removed {removed} duplicate(s).");
        }
        ScheduleCommand::Compare { users, date } => {
            let date = date_or_today(date.as_deref())?;
            let users = if users.is_empty() {
                User::ALL.to_vec()
            } else {
                users
                    .iter()
                    .map(|name| name.parse::<User>())
                    .collect::<Result<Vec<_>, _>>()?
            };
            let comparison = service.compare(&users, date)?;
            for slot in &comparison.slots {
                let end = slot
                    .end
                    .map(|end| end.format("%H:%M").to_string())
                    .unwrap_or_else(|| "24:00".to_string());
                let busy: Vec<String> = slot
                    .busy
                    .iter()
                    .map(|(user, items)| format!("{user}: {}", items.join(", ")))
                    .collect();
                let status = if slot.everyone_free() {
                    "everyone free".to_string()
                } else {
                    busy.join("; ")
                };
                println!("{}-{end}  {status}", slot.start.format("%H:%M"));
            }
        }
    }
    Ok(())
}

pub fn avatar(session: &Session<'_>, command: AvatarCommand) -> Result<()> {
    let user = session.require_user()?;
    let service = AvatarService::new(session.store);
    let avatar = match command {
        AvatarCommand::Show => service.load_avatar(user)?,
        AvatarCommand::Set { slot, value } => {
            let slot = slot.parse::<AvatarSlot>().map_err(|err| anyhow!(err))?;
            service.set_option(user, slot, &value)?
        }
    };
    for slot in AvatarSlot::ALL {
        println!("{}: {}", slot.as_str(), avatar.get(slot));
    }
    Ok(())
}

pub fn tutorial(session: &Session<'_>, command: TutorialCommand) -> Result<()> {
    let mut tutorial = TutorialService::new(session.store);
    match command {
        TutorialCommand::Show => {
            let state = if tutorial.should_show() { "pending" } else { "seen" };
            println!("Tutorial {state}.");
            for (index, step) in TUTORIAL_STEPS.iter().enumerate() {
                println!("{}. [{}] {}", index + 1, step.screen, step.text);
            }
        }
        TutorialCommand::Done => {
            tutorial.complete()?;
            println!("Tutorial marked as seen.");
        }
        TutorialCommand::Reset => {
            tutorial.reset()?;
            println!("Tutorial will show again.");
        }
    }
    Ok(())
}

pub fn home(session: &Session<'_>, date: Option<&str>) -> Result<()> {
    let user = session.require_user()?;
    let today = date_or_today(date)?;
    let summary = HomeService::new(session.store).home_summary(user, today)?;
    println!("Hi {user}!");
    println!(
        "Tasks: {} ({} open)",
        summary.task_count, summary.open_task_count
    );
    println!("Budget used: {}%", summary.budget_percentage);
    println!("Classes today: {}", summary.today_class_count);
    if !summary.upcoming.is_empty() {
        println!("Upcoming:");
        for entry in &summary.upcoming {
            println!("  {}  {}", entry.date, describe(&entry.item));
        }
    }
    Ok(())
}

fn print_added(item: &ScheduleItem, conflicts: &[ScheduleItem]) {
    println!("Added {} {}", item.kind.as_str(), item.id);
    for conflict in conflicts {
        println!("  warning: overlaps {}", describe(conflict));
    }
}

fn describe(item: &ScheduleItem) -> String {
    let mut line = format!(
        "{}-{}  {}  [{}]",
        item.start_time.format("%H:%M"),
        item.end_time.format("%H:%M"),
        item.name,
        item.kind.as_str()
    );
    if let Some(shared_by) = item.shared_by {
        line.push_str(&format!(" shared by {shared_by}"));
    }
    line.push_str(&format!("  {}", item.id));
    line
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn date_or_today(value: Option<&str>) -> Result<NaiveDate> {
    match value {
        Some(value) => parse_date(value),
        None => Ok(today()),
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|err| anyhow!("invalid date '{value}': {err} (expected YYYY-MM-DD)"))
}

fn parse_time(value: &str) -> Result<NaiveTime> {
    hhmm::parse(value).map_err(|err| anyhow!(err))
}

fn parse_weekday(value: &str) -> Result<Weekday> {
    match value.trim().parse::<Weekday>() {
        Ok(day) => Ok(day),
        Err(_) => bail!("invalid weekday '{value}' (expected Mon..Sun)"),
    }
}

fn parse_category(value: &str) -> Result<BudgetCategory> {
    value.parse::<BudgetCategory>().map_err(|err| anyhow!(err))
}

fn parse_id(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|err| anyhow!("invalid id '{value}': {err}"))
}
