//! Core domain logic for CampusLife.
//! This crate is the single source of truth for business invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schedule;
pub mod service;

pub use config::{AppConfig, ConfigError};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::avatar::{AvatarConfig, AvatarSlot};
pub use model::budget::{Budget, BudgetCategory, BudgetOverview, CategorySummary, Expense};
pub use model::schedule::{ItemKind, ScheduleItem, ScheduleItemId};
pub use model::semester::{Season, Semester};
pub use model::task::{Task, TaskId};
pub use model::user::User;
pub use repo::kv_store::{KvStore, RepoError, RepoResult, SqliteKvStore};
pub use schedule::compare::{ComparisonGrid, ScheduleComparison};
pub use service::auth_service::{AuthError, AuthService};
pub use service::avatar_service::{AvatarError, AvatarService};
pub use service::budget_service::{BudgetService, BudgetServiceError};
pub use service::home_service::{HomeService, HomeSummary};
pub use service::schedule_service::{
    AddedItem, NewClass, NewEvent, ScheduleService, ScheduleServiceError,
};
pub use service::task_service::{TaskService, TaskServiceError};
pub use service::tutorial_service::TutorialService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
