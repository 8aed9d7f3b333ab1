//! FFI use-case API for the mobile UI shell.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Flatten core errors into response envelopes the UI can render.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Dates cross the boundary as `YYYY-MM-DD`, times as `HH:MM`, users by
//!   roster name.
//! - DB-backed calls are serialized through one process-wide lock.

use campuslife_core::db::open_db;
use campuslife_core::model::schedule::hhmm;
use campuslife_core::model::tutorial::TUTORIAL_STEPS;
use campuslife_core::repo::profile_repo::ProfileRepository;
use campuslife_core::schedule::compare::ComparisonSlot;
use campuslife_core::schedule::day_filter::{DatedItem, MarkKind};
use campuslife_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AddedItem, AppConfig, AuthService, AvatarConfig, AvatarService, AvatarSlot, BudgetCategory,
    BudgetService, CategorySummary, Expense, HomeService, NewClass, NewEvent, RepoError,
    ScheduleItem, ScheduleService, Semester, SqliteKvStore, Task, TaskService, TutorialService,
    User,
};
use chrono::{NaiveDate, NaiveTime, Weekday};
use log::warn;
use rusqlite::Connection;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};
use uuid::Uuid;

static CONFIG: OnceLock<Result<AppConfig, String>> = OnceLock::new();
static STORAGE_PATH: OnceLock<PathBuf> = OnceLock::new();
static DB_LOCK: Mutex<()> = Mutex::new(());

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Pins the storage file to `db_path` for the rest of the process.
///
/// Call before any DB-backed function; otherwise the first such call pins
/// `CAMPUSLIFE_DB_PATH` (or the temp-dir default) and later `init_storage`
/// calls with another path are rejected.
///
/// # FFI contract
/// - Idempotent for the same path; a different path is rejected.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_storage(db_path: String) -> String {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return "db_path cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    if !requested.is_absolute() {
        return format!("db_path must be an absolute path, got `{trimmed}`");
    }
    let active = STORAGE_PATH.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!(
            "storage already initialized at `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        )
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Optional id of the created or affected record.
    pub id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: Option<String>) -> Self {
        Self {
            ok: true,
            id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }

    fn from_result(result: Result<(String, Option<String>), String>) -> Self {
        match result {
            Ok((message, id)) => Self::success(message, id),
            Err(message) => Self::failure(message),
        }
    }
}

/// Login outcome plus the active user name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResponse {
    pub ok: bool,
    /// Active user after the call, if any.
    pub user: Option<String>,
    pub is_admin: bool,
    pub message: String,
}

/// Verifies name + PIN and makes the user active.
///
/// # FFI contract
/// - PIN never appears in the returned message.
#[flutter_rust_bridge::frb(sync)]
pub fn login(username: String, pin: String) -> SessionResponse {
    let result = with_store("login", |store| AuthService::new(store).login(&username, &pin));
    match result {
        Ok(user) => SessionResponse {
            ok: true,
            user: Some(user.name().to_string()),
            is_admin: user.is_admin(),
            message: format!("Welcome, {user}!"),
        },
        Err(message) => SessionResponse {
            ok: false,
            user: None,
            is_admin: false,
            message,
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn logout() -> ActionResponse {
    ActionResponse::from_result(
        with_store("logout", |store| AuthService::new(store).logout())
            .map(|()| ("Logged out.".to_string(), None)),
    )
}

/// Reads the persisted active user; `ok` with `user=None` means logged out.
#[flutter_rust_bridge::frb(sync)]
pub fn current_user() -> SessionResponse {
    match with_store("current_user", |store| AuthService::new(store).current_user()) {
        Ok(user) => SessionResponse {
            ok: true,
            user: user.map(|user| user.name().to_string()),
            is_admin: user.is_some_and(User::is_admin),
            message: String::new(),
        },
        Err(message) => SessionResponse {
            ok: false,
            user: None,
            is_admin: false,
            message,
        },
    }
}

/// Wipes all stored data. Administrator session only.
#[flutter_rust_bridge::frb(sync)]
pub fn clear_all_data() -> ActionResponse {
    ActionResponse::from_result(
        with_store("clear_all_data", |store| AuthService::new(store).clear_all_data())
            .map(|removed| (format!("Cleared {removed} stored key(s)."), None)),
    )
}

/// Task row for list views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub text: String,
    pub completed: bool,
    pub created_at_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub ok: bool,
    pub tasks: Vec<TaskItem>,
    pub message: String,
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_add(user: String, text: String) -> ActionResponse {
    ActionResponse::from_result(
        with_user_store("task_add", &user, |store, user| {
            TaskService::new(store).add_task(user, &text)
        })
        .map(|task| ("Task added.".to_string(), Some(task.id.to_string()))),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_list(user: String) -> TaskListResponse {
    match with_user_store("task_list", &user, |store, user| {
        TaskService::new(store).list_tasks(user)
    }) {
        Ok(tasks) => TaskListResponse {
            ok: true,
            tasks: tasks.iter().map(to_task_item).collect(),
            message: String::new(),
        },
        Err(message) => TaskListResponse {
            ok: false,
            tasks: Vec::new(),
            message,
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle(user: String, task_id: String) -> ActionResponse {
    let result = parse_id(&task_id).and_then(|id| {
        with_user_store("task_toggle", &user, |store, user| {
            TaskService::new(store).toggle_task(user, id)
        })
    });
    ActionResponse::from_result(result.map(|task| {
        let message = if task.completed {
            "Task completed."
        } else {
            "Task reopened."
        };
        (message.to_string(), Some(task.id.to_string()))
    }))
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(user: String, task_id: String) -> ActionResponse {
    let result = parse_id(&task_id).and_then(|id| {
        with_user_store("task_delete", &user, |store, user| {
            TaskService::new(store).delete_task(user, id)
        })
    });
    ActionResponse::from_result(result.map(|()| ("Task deleted.".to_string(), Some(task_id.clone()))))
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_reset(user: String) -> ActionResponse {
    ActionResponse::from_result(
        with_user_store("task_reset", &user, |store, user| {
            TaskService::new(store).reset_tasks(user)
        })
        .map(|()| ("Tasks cleared.".to_string(), None)),
    )
}

/// Expense row for list views.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseItem {
    pub id: String,
    pub amount: f64,
    pub description: String,
    pub date_ms: i64,
}

/// One budget category with its expenses.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryView {
    pub category: String,
    pub limit: f64,
    pub spent: f64,
    pub remaining: f64,
    pub expenses: Vec<ExpenseItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetResponse {
    pub ok: bool,
    pub categories: Vec<CategoryView>,
    /// Overall spent percentage, `0` when no limit is set.
    pub percentage: u32,
    pub message: String,
}

#[flutter_rust_bridge::frb(sync)]
pub fn budget_add_expense(
    user: String,
    category: String,
    amount: f64,
    description: String,
) -> ActionResponse {
    let result = parse_category(&category).and_then(|category| {
        with_user_store("budget_add_expense", &user, |store, user| {
            BudgetService::new(store).add_expense(user, category, amount, &description)
        })
    });
    ActionResponse::from_result(
        result.map(|expense| ("Expense added.".to_string(), Some(expense.id.to_string()))),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn budget_delete_expense(user: String, category: String, expense_id: String) -> ActionResponse {
    let result = parse_category(&category).and_then(|category| {
        let id = parse_id(&expense_id)?;
        with_user_store("budget_delete_expense", &user, |store, user| {
            BudgetService::new(store).delete_expense(user, category, id)
        })
    });
    ActionResponse::from_result(result.map(|()| ("Expense deleted.".to_string(), Some(expense_id.clone()))))
}

#[flutter_rust_bridge::frb(sync)]
pub fn budget_set_limit(user: String, category: String, limit: f64) -> ActionResponse {
    let result = parse_category(&category).and_then(|category| {
        with_user_store("budget_set_limit", &user, |store, user| {
            BudgetService::new(store).set_limit(user, category, limit)
        })
    });
    ActionResponse::from_result(
        result.map(|summary| (format!("{} limit set.", summary.category), None)),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn budget_load(user: String) -> BudgetResponse {
    match with_user_store("budget_load", &user, |store, user| {
        BudgetService::new(store).load_budget(user)
    }) {
        Ok(budget) => BudgetResponse {
            ok: true,
            categories: BudgetCategory::ALL
                .into_iter()
                .map(|category| to_category_view(budget.summary(category), budget.expenses(category)))
                .collect(),
            percentage: budget.overview().percentage,
            message: String::new(),
        },
        Err(message) => BudgetResponse {
            ok: false,
            categories: Vec::new(),
            percentage: 0,
            message,
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn budget_reset(user: String) -> ActionResponse {
    ActionResponse::from_result(
        with_user_store("budget_reset", &user, |store, user| {
            BudgetService::new(store).reset_budget(user)
        })
        .map(|()| ("Budget cleared.".to_string(), None)),
    )
}

/// Schedule entry for calendar and list views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleItemView {
    pub id: String,
    /// `class|event`.
    pub kind: String,
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    /// Three-letter weekday (`Mon`..`Sun`).
    pub day: Option<String>,
    pub date: Option<String>,
    pub semester: Option<String>,
    pub creator: String,
    pub is_shared: bool,
    pub shared_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleAddResponse {
    pub ok: bool,
    pub item_id: Option<String>,
    /// Names of the user's items that overlap the new one.
    pub conflicts: Vec<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleListResponse {
    pub ok: bool,
    pub items: Vec<ScheduleItemView>,
    pub message: String,
}

/// Calendar mark for one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateMark {
    pub date: String,
    /// `class|event`.
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedDatesResponse {
    pub ok: bool,
    pub marks: Vec<DateMark>,
    pub message: String,
}

/// Adds a weekly class.
///
/// Input semantics:
/// - `day`: weekday name (`Mon` or `Monday`).
/// - `semester`: `<Spring|Summer|Fall> <year>`.
#[flutter_rust_bridge::frb(sync)]
pub fn schedule_add_class(
    user: String,
    name: String,
    day: String,
    start_time: String,
    end_time: String,
    semester: String,
) -> ScheduleAddResponse {
    let input = parse_class_input(name, &day, &start_time, &end_time, &semester);
    let result = input.and_then(|input| {
        with_user_store("schedule_add_class", &user, |store, user| {
            schedule_service(store).add_class(user, input)
        })
    });
    to_add_response(result)
}

/// Adds a one-off event on `date`.
#[flutter_rust_bridge::frb(sync)]
pub fn schedule_add_event(
    user: String,
    name: String,
    date: String,
    start_time: String,
    end_time: String,
) -> ScheduleAddResponse {
    let input = parse_event_input(name, &date, &start_time, &end_time);
    let result = input.and_then(|input| {
        with_user_store("schedule_add_event", &user, |store, user| {
            schedule_service(store).add_event(user, input)
        })
    });
    to_add_response(result)
}

/// Items `user` sees on `date`, deduplicated and ordered by start time.
#[flutter_rust_bridge::frb(sync)]
pub fn schedule_day(user: String, date: String) -> ScheduleListResponse {
    let result = parse_date(&date).and_then(|date| {
        with_user_store("schedule_day", &user, |store, user| {
            schedule_service(store).items_for_day(user, date)
        })
    });
    to_list_response(result.map(|items| items.iter().map(to_item_view).collect()))
}

/// Every item `user` can see, in stored order.
#[flutter_rust_bridge::frb(sync)]
pub fn schedule_visible(user: String) -> ScheduleListResponse {
    let result = with_user_store("schedule_visible", &user, |store, user| {
        schedule_service(store).visible_items(user)
    });
    to_list_response(result.map(|items| items.iter().map(to_item_view).collect()))
}

/// Calendar marks for the configured horizon starting at `from`.
#[flutter_rust_bridge::frb(sync)]
pub fn schedule_marked_dates(user: String, from: String) -> MarkedDatesResponse {
    let result = parse_date(&from).and_then(|from| {
        let days = resolve_config()?.mark_horizon_days;
        with_user_store("schedule_marked_dates", &user, |store, user| {
            schedule_service(store).marked_dates(user, from, days)
        })
    });
    match result {
        Ok(marks) => MarkedDatesResponse {
            ok: true,
            marks: marks
                .into_iter()
                .map(|(date, kind)| DateMark {
                    date: format_date(date),
                    kind: match kind {
                        MarkKind::Class => "class",
                        MarkKind::Event => "event",
                    }
                    .to_string(),
                })
                .collect(),
            message: String::new(),
        },
        Err(message) => MarkedDatesResponse {
            ok: false,
            marks: Vec::new(),
            message,
        },
    }
}

/// Shares an item with every user; returns the shared copy's id.
#[flutter_rust_bridge::frb(sync)]
pub fn schedule_share(user: String, item_id: String) -> ActionResponse {
    let result = parse_id(&item_id).and_then(|id| {
        with_user_store("schedule_share", &user, |store, user| {
            schedule_service(store).share_item(user, id)
        })
    });
    ActionResponse::from_result(
        result.map(|copy| ("Shared with everyone.".to_string(), Some(copy.id.to_string()))),
    )
}

/// Deletes an item; deleting an original also removes its shared copies.
#[flutter_rust_bridge::frb(sync)]
pub fn schedule_delete(user: String, item_id: String) -> ActionResponse {
    let result = parse_id(&item_id).and_then(|id| {
        with_user_store("schedule_delete", &user, |store, user| {
            schedule_service(store).delete_item(user, id)
        })
    });
    ActionResponse::from_result(
        result.map(|removed| (format!("Removed {removed} item(s)."), Some(item_id.clone()))),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn schedule_reset(user: String) -> ActionResponse {
    ActionResponse::from_result(
        with_user_store("schedule_reset", &user, |store, user| {
            schedule_service(store).reset_schedule(user)
        })
        .map(|removed| (format!("Removed {removed} item(s)."), None)),
    )
}

/// Users busy in one comparison slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusyEntry {
    pub user: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareSlotView {
    pub start: String,
    /// `24:00` when the slot runs to midnight.
    pub end: String,
    pub busy: Vec<BusyEntry>,
    pub free: Vec<String>,
    pub everyone_free: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareResponse {
    pub ok: bool,
    pub slots: Vec<CompareSlotView>,
    pub message: String,
}

/// Free/busy grid of `users` on `date`.
#[flutter_rust_bridge::frb(sync)]
pub fn schedule_compare(users: Vec<String>, date: String) -> CompareResponse {
    let result = parse_date(&date).and_then(|date| {
        let users = users
            .iter()
            .map(|name| parse_user(name))
            .collect::<Result<Vec<_>, _>>()?;
        with_store("schedule_compare", |store| {
            schedule_service(store).compare(&users, date)
        })
    });
    match result {
        Ok(comparison) => CompareResponse {
            ok: true,
            slots: comparison.slots.iter().map(to_slot_view).collect(),
            message: String::new(),
        },
        Err(message) => CompareResponse {
            ok: false,
            slots: Vec::new(),
            message,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarResponse {
    pub ok: bool,
    pub upper_hair: String,
    pub lower_hair: String,
    pub outfit: String,
    pub accessory: String,
    pub message: String,
}

#[flutter_rust_bridge::frb(sync)]
pub fn avatar_load(user: String) -> AvatarResponse {
    to_avatar_response(with_user_store("avatar_load", &user, |store, user| {
        AvatarService::new(store).load_avatar(user)
    }))
}

/// Sets one avatar slot (`upper_hair|lower_hair|outfit|accessory`).
#[flutter_rust_bridge::frb(sync)]
pub fn avatar_set(user: String, slot: String, value: String) -> AvatarResponse {
    let result = slot.parse::<AvatarSlot>().and_then(|slot| {
        with_user_store("avatar_set", &user, |store, user| {
            AvatarService::new(store).set_option(user, slot, &value)
        })
    });
    to_avatar_response(result)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorialResponse {
    pub ok: bool,
    pub visible: bool,
    pub step_index: u32,
    pub step_count: u32,
    pub screen: Option<String>,
    pub text: Option<String>,
    pub message: String,
}

/// Tutorial state at `step_index`.
#[flutter_rust_bridge::frb(sync)]
pub fn tutorial_state(step_index: u32) -> TutorialResponse {
    to_tutorial_response(with_store("tutorial_state", |store| {
        let tutorial = TutorialService::resume_at(store, step_index as usize);
        Ok::<_, RepoError>(tutorial_snapshot(&tutorial))
    }))
}

/// Advances from `step_index`; past the last step the tutorial completes.
#[flutter_rust_bridge::frb(sync)]
pub fn tutorial_next(step_index: u32) -> TutorialResponse {
    to_tutorial_response(with_store("tutorial_next", |store| {
        let mut tutorial = TutorialService::resume_at(store, step_index as usize);
        tutorial.next_step()?;
        Ok::<_, RepoError>(tutorial_snapshot(&tutorial))
    }))
}

#[flutter_rust_bridge::frb(sync)]
pub fn tutorial_skip() -> TutorialResponse {
    to_tutorial_response(with_store("tutorial_skip", |store| {
        let mut tutorial = TutorialService::new(store);
        tutorial.skip()?;
        Ok::<_, RepoError>(tutorial_snapshot(&tutorial))
    }))
}

#[flutter_rust_bridge::frb(sync)]
pub fn tutorial_reset() -> TutorialResponse {
    to_tutorial_response(with_store("tutorial_reset", |store| {
        let mut tutorial = TutorialService::new(store);
        tutorial.reset()?;
        Ok::<_, RepoError>(tutorial_snapshot(&tutorial))
    }))
}

/// Item plus the concrete date it occurs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingItem {
    pub date: String,
    pub item: ScheduleItemView,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeResponse {
    pub ok: bool,
    pub task_count: u32,
    pub open_task_count: u32,
    pub budget_percentage: u32,
    pub today_class_count: u32,
    pub upcoming: Vec<UpcomingItem>,
    pub message: String,
}

/// Home dashboard numbers for `user` on `today`.
#[flutter_rust_bridge::frb(sync)]
pub fn home_summary(user: String, today: String) -> HomeResponse {
    let result = parse_date(&today).and_then(|today| {
        with_user_store("home_summary", &user, |store, user| {
            HomeService::new(store).home_summary(user, today)
        })
    });
    match result {
        Ok(summary) => HomeResponse {
            ok: true,
            task_count: to_u32(summary.task_count),
            open_task_count: to_u32(summary.open_task_count),
            budget_percentage: summary.budget_percentage,
            today_class_count: to_u32(summary.today_class_count),
            upcoming: summary.upcoming.iter().map(to_upcoming_item).collect(),
            message: String::new(),
        },
        Err(message) => HomeResponse {
            ok: false,
            task_count: 0,
            open_task_count: 0,
            budget_percentage: 0,
            today_class_count: 0,
            upcoming: Vec::new(),
            message,
        },
    }
}

fn resolve_config() -> Result<&'static AppConfig, String> {
    CONFIG
        .get_or_init(|| AppConfig::from_env().map_err(|err| err.to_string()))
        .as_ref()
        .map_err(Clone::clone)
}

/// Returns the pinned storage path, pinning the configured one on first use.
fn resolve_db_path() -> Result<PathBuf, String> {
    if let Some(path) = STORAGE_PATH.get() {
        return Ok(path.clone());
    }
    let configured = resolve_config()?.db_path.clone();
    Ok(STORAGE_PATH.get_or_init(|| configured).clone())
}

fn with_store<T, E: Display>(
    op: &str,
    f: impl FnOnce(SqliteKvStore<'_>) -> Result<T, E>,
) -> Result<T, String> {
    let db_path = resolve_db_path()?;
    let _guard = DB_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let conn = open_storage(&db_path).map_err(|err| {
        warn!("event=ffi_call module=ffi status=error op={op} error_code=db_open");
        err
    })?;
    f(SqliteKvStore::new(&conn)).map_err(|err| {
        warn!("event=ffi_call module=ffi status=error op={op}");
        err.to_string()
    })
}

fn with_user_store<T, E: Display>(
    op: &str,
    user: &str,
    f: impl FnOnce(SqliteKvStore<'_>, User) -> Result<T, E>,
) -> Result<T, String> {
    let user = parse_user(user)?;
    with_store(op, |store| f(store, user))
}

fn open_storage(path: &Path) -> Result<Connection, String> {
    open_db(path).map_err(|err| format!("storage open failed: {err}"))
}

fn schedule_service(store: SqliteKvStore<'_>) -> ScheduleService<SqliteKvStore<'_>> {
    let grid = resolve_config()
        .map(|config| config.grid)
        .unwrap_or_default();
    ScheduleService::with_grid(store, grid)
}

fn parse_user(value: &str) -> Result<User, String> {
    value.parse::<User>().map_err(|err| err.to_string())
}

fn parse_id(value: &str) -> Result<Uuid, String> {
    Uuid::parse_str(value.trim()).map_err(|err| format!("invalid id `{}`: {err}", value.trim()))
}

fn parse_category(value: &str) -> Result<BudgetCategory, String> {
    value.parse::<BudgetCategory>()
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|err| format!("invalid date `{}`: {err}; expected YYYY-MM-DD", value.trim()))
}

fn parse_time(value: &str) -> Result<NaiveTime, String> {
    hhmm::parse(value)
}

fn parse_class_input(
    name: String,
    day: &str,
    start_time: &str,
    end_time: &str,
    semester: &str,
) -> Result<NewClass, String> {
    let day = day
        .trim()
        .parse::<Weekday>()
        .map_err(|_| format!("invalid weekday `{}`", day.trim()))?;
    Ok(NewClass {
        name,
        day,
        start_time: parse_time(start_time)?,
        end_time: parse_time(end_time)?,
        semester: Semester::parse(semester).map_err(|err| err.to_string())?,
    })
}

fn parse_event_input(
    name: String,
    date: &str,
    start_time: &str,
    end_time: &str,
) -> Result<NewEvent, String> {
    Ok(NewEvent {
        name,
        date: parse_date(date)?,
        start_time: parse_time(start_time)?,
        end_time: parse_time(end_time)?,
    })
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn to_task_item(task: &Task) -> TaskItem {
    TaskItem {
        id: task.id.to_string(),
        text: task.text.clone(),
        completed: task.completed,
        created_at_ms: task.created_at.timestamp_millis(),
    }
}

fn to_category_view(summary: CategorySummary, expenses: &[Expense]) -> CategoryView {
    CategoryView {
        category: summary.category.to_string(),
        limit: summary.limit,
        spent: summary.spent,
        remaining: summary.remaining,
        expenses: expenses
            .iter()
            .map(|expense| ExpenseItem {
                id: expense.id.to_string(),
                amount: expense.amount,
                description: expense.description.clone(),
                date_ms: expense.date.timestamp_millis(),
            })
            .collect(),
    }
}

fn to_item_view(item: &ScheduleItem) -> ScheduleItemView {
    ScheduleItemView {
        id: item.id.to_string(),
        kind: item.kind.as_str().to_string(),
        name: item.name.clone(),
        start_time: format_time(item.start_time),
        end_time: format_time(item.end_time),
        day: item.day.map(|day| day.to_string()),
        date: item.date.map(format_date),
        semester: item.semester.as_ref().map(|semester| semester.name.clone()),
        creator: item.creator.name().to_string(),
        is_shared: item.is_shared,
        shared_by: item.shared_by.map(|user| user.name().to_string()),
    }
}

fn to_upcoming_item(entry: &DatedItem) -> UpcomingItem {
    UpcomingItem {
        date: format_date(entry.date),
        item: to_item_view(&entry.item),
    }
}

fn to_add_response(result: Result<AddedItem, String>) -> ScheduleAddResponse {
    match result {
        Ok(added) => {
            let message = if added.conflicts.is_empty() {
                format!("{} added.", capitalize(added.item.kind.as_str()))
            } else {
                format!(
                    "{} added; overlaps {} existing item(s).",
                    capitalize(added.item.kind.as_str()),
                    added.conflicts.len()
                )
            };
            ScheduleAddResponse {
                ok: true,
                item_id: Some(added.item.id.to_string()),
                conflicts: added.conflicts.iter().map(|item| item.name.clone()).collect(),
                message,
            }
        }
        Err(message) => ScheduleAddResponse {
            ok: false,
            item_id: None,
            conflicts: Vec::new(),
            message,
        },
    }
}

fn to_list_response(result: Result<Vec<ScheduleItemView>, String>) -> ScheduleListResponse {
    match result {
        Ok(items) => ScheduleListResponse {
            ok: true,
            items,
            message: String::new(),
        },
        Err(message) => ScheduleListResponse {
            ok: false,
            items: Vec::new(),
            message,
        },
    }
}

fn to_slot_view(slot: &ComparisonSlot) -> CompareSlotView {
    CompareSlotView {
        start: format_time(slot.start),
        end: slot.end.map(format_time).unwrap_or_else(|| "24:00".to_string()),
        busy: slot
            .busy
            .iter()
            .map(|(user, items)| BusyEntry {
                user: user.name().to_string(),
                items: items.clone(),
            })
            .collect(),
        free: slot.free.iter().map(|user| user.name().to_string()).collect(),
        everyone_free: slot.everyone_free(),
    }
}

fn to_avatar_response(result: Result<AvatarConfig, String>) -> AvatarResponse {
    match result {
        Ok(avatar) => AvatarResponse {
            ok: true,
            upper_hair: avatar.upper_hair,
            lower_hair: avatar.lower_hair,
            outfit: avatar.outfit,
            accessory: avatar.accessory,
            message: String::new(),
        },
        Err(message) => {
            let fallback = AvatarConfig::default();
            AvatarResponse {
                ok: false,
                upper_hair: fallback.upper_hair,
                lower_hair: fallback.lower_hair,
                outfit: fallback.outfit,
                accessory: fallback.accessory,
                message,
            }
        }
    }
}

struct TutorialSnapshot {
    visible: bool,
    step_index: usize,
    screen: Option<&'static str>,
    text: Option<&'static str>,
}

fn tutorial_snapshot<R: ProfileRepository>(
    tutorial: &TutorialService<R>,
) -> TutorialSnapshot {
    let step = tutorial.current_step();
    TutorialSnapshot {
        visible: tutorial.should_show(),
        step_index: tutorial.step_index(),
        screen: step.map(|step| step.screen),
        text: step.map(|step| step.text),
    }
}

fn to_tutorial_response(result: Result<TutorialSnapshot, String>) -> TutorialResponse {
    let step_count = to_u32(TUTORIAL_STEPS.len());
    match result {
        Ok(snapshot) => TutorialResponse {
            ok: true,
            visible: snapshot.visible,
            step_index: to_u32(snapshot.step_index),
            step_count,
            screen: snapshot.screen.map(str::to_string),
            text: snapshot.text.map(str::to_string),
            message: String::new(),
        },
        Err(message) => TutorialResponse {
            ok: false,
            visible: false,
            step_index: 0,
            step_count,
            screen: None,
            text: None,
            message,
        },
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        avatar_load, avatar_set, budget_add_expense, budget_load, budget_set_limit,
        clear_all_data, core_version, home_summary, init_logging, init_storage, login, logout,
        ping, schedule_add_class, schedule_add_event, schedule_compare, schedule_day,
        schedule_delete, schedule_share, task_add, task_delete, task_list, task_toggle,
        tutorial_next, tutorial_reset, tutorial_state,
    };
    use campuslife_core::model::tutorial::TUTORIAL_STEPS;
    use std::sync::OnceLock;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn use_test_storage() {
        static DIR: OnceLock<tempfile::TempDir> = OnceLock::new();
        let dir = DIR.get_or_init(|| tempfile::tempdir().unwrap());
        let path = dir.path().join("campuslife-ffi.sqlite3");
        assert_eq!(init_storage(path.to_string_lossy().into_owned()), "");
    }

    fn unique_name(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        format!("{prefix}-{nanos}")
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn init_storage_rejects_relative_and_switched_paths() {
        use_test_storage();
        assert!(init_storage("data/app.sqlite3".to_string()).contains("absolute"));
        let other = std::env::temp_dir().join(unique_name("other")).join("x.sqlite3");
        assert!(init_storage(other.to_string_lossy().into_owned()).contains("refusing"));
    }

    #[test]
    fn login_logout_and_admin_gate() {
        use_test_storage();
        let wrong = login("Sheila".to_string(), "0000".to_string());
        assert!(!wrong.ok);
        assert_eq!(wrong.message, "incorrect password");
        assert!(!wrong.message.contains("0000"));

        let session = login("sheila".to_string(), "9012".to_string());
        assert!(session.ok, "{}", session.message);
        assert_eq!(session.user.as_deref(), Some("Sheila"));
        assert!(!session.is_admin);

        assert!(!clear_all_data().ok);
        assert!(logout().ok);
    }

    #[test]
    fn task_flow_round_trips_through_envelopes() {
        use_test_storage();
        let text = unique_name("essay");
        let added = task_add("Reni".to_string(), text.clone());
        assert!(added.ok, "{}", added.message);
        let id = added.id.unwrap();

        let listed = task_list("Reni".to_string());
        assert!(listed.tasks.iter().any(|task| task.id == id && task.text == text));

        let toggled = task_toggle("Reni".to_string(), id.clone());
        assert_eq!(toggled.message, "Task completed.");

        assert!(task_delete("Reni".to_string(), id.clone()).ok);
        assert!(!task_delete("Reni".to_string(), id).ok);
        assert!(!task_toggle("Reni".to_string(), "not-a-uuid".to_string()).ok);
        assert!(!task_add("Nobody".to_string(), "x".to_string()).ok);
    }

    #[test]
    fn budget_flow_reports_percentage() {
        use_test_storage();
        assert!(budget_set_limit("Luna".to_string(), "food".to_string(), 100.0).ok);
        let added = budget_add_expense("Luna".to_string(), "Food".to_string(), 25.0, "lunch".to_string());
        assert!(added.ok, "{}", added.message);
        assert!(!budget_add_expense("Luna".to_string(), "rent".to_string(), 5.0, "x".to_string()).ok);

        let budget = budget_load("Luna".to_string());
        assert!(budget.ok);
        assert_eq!(budget.categories.len(), 2);
        assert_eq!(budget.categories[0].category, "food");
        assert_eq!(budget.percentage, 25);
    }

    #[test]
    fn schedule_flow_adds_shares_compares_and_deletes() {
        use_test_storage();
        let name = unique_name("Physics");
        let added = schedule_add_class(
            "Maria".to_string(),
            name.clone(),
            "Wed".to_string(),
            "09:00".to_string(),
            "10:00".to_string(),
            "Fall 2025".to_string(),
        );
        assert!(added.ok, "{}", added.message);
        let id = added.item_id.unwrap();

        let day = schedule_day("Maria".to_string(), "2025-09-03".to_string());
        assert!(day.items.iter().any(|item| item.id == id && item.day.as_deref() == Some("Wed")));

        assert!(!schedule_share("Reni".to_string(), id.clone()).ok);
        let shared = schedule_share("Maria".to_string(), id.clone());
        assert!(shared.ok, "{}", shared.message);
        let seen_by_reni = schedule_day("Reni".to_string(), "2025-09-03".to_string());
        assert!(seen_by_reni.items.iter().any(|item| item.name == name && item.is_shared));

        let comparison = schedule_compare(
            vec!["Maria".to_string(), "Reni".to_string()],
            "2025-09-03".to_string(),
        );
        assert!(comparison.ok, "{}", comparison.message);
        let nine = comparison
            .slots
            .iter()
            .find(|slot| slot.start == "09:00")
            .unwrap();
        assert!(nine
            .busy
            .iter()
            .any(|entry| entry.user == "Maria" && entry.items.contains(&name)));

        let deleted = schedule_delete("Maria".to_string(), id);
        assert_eq!(deleted.message, "Removed 2 item(s).");
        let after = schedule_day("Reni".to_string(), "2025-09-03".to_string());
        assert!(!after.items.iter().any(|item| item.name == name));
    }

    #[test]
    fn schedule_rejects_malformed_input() {
        use_test_storage();
        let bad_time = schedule_add_event(
            "Maria".to_string(),
            "Party".to_string(),
            "2025-09-05".to_string(),
            "25:00".to_string(),
            "26:00".to_string(),
        );
        assert!(!bad_time.ok);
        let bad_day = schedule_add_class(
            "Maria".to_string(),
            "Art".to_string(),
            "Someday".to_string(),
            "09:00".to_string(),
            "10:00".to_string(),
            "Fall 2025".to_string(),
        );
        assert!(bad_day.message.contains("weekday"));
        assert!(!schedule_day("Maria".to_string(), "09/03/2025".to_string()).ok);
    }

    #[test]
    fn home_summary_lists_upcoming_event() {
        use_test_storage();
        let name = unique_name("Concert");
        let added = schedule_add_event(
            "Maria".to_string(),
            name.clone(),
            "2030-05-02".to_string(),
            "19:00".to_string(),
            "21:00".to_string(),
        );
        assert!(added.ok, "{}", added.message);

        let home = home_summary("Maria".to_string(), "2030-05-01".to_string());
        assert!(home.ok, "{}", home.message);
        assert!(home
            .upcoming
            .iter()
            .any(|entry| entry.date == "2030-05-02" && entry.item.name == name));
        assert!(schedule_delete("Maria".to_string(), added.item_id.unwrap()).ok);
    }

    #[test]
    fn tutorial_walks_to_completion() {
        use_test_storage();
        let reset = tutorial_reset();
        assert!(reset.visible);
        assert_eq!(reset.step_index, 0);
        assert_eq!(reset.screen.as_deref(), Some("home"));

        let second = tutorial_next(0);
        assert_eq!(second.step_index, 1);

        let last = (TUTORIAL_STEPS.len() - 1) as u32;
        let done = tutorial_next(last);
        assert!(!done.visible);
        assert!(!tutorial_state(0).visible);
    }

    #[test]
    fn avatar_set_validates_options() {
        use_test_storage();
        let updated = avatar_set("Luna".to_string(), "outfit".to_string(), "dress".to_string());
        assert!(updated.ok, "{}", updated.message);
        assert_eq!(avatar_load("Luna".to_string()).outfit, "dress");

        let rejected = avatar_set("Luna".to_string(), "outfit".to_string(), "cape".to_string());
        assert!(!rejected.ok);
        assert!(!avatar_set("Luna".to_string(), "hat".to_string(), "none".to_string()).ok);
    }
}
