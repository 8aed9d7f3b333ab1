//! Home dashboard aggregation.

use crate::model::user::User;
use crate::repo::budget_repo::BudgetRepository;
use crate::repo::kv_store::{KvStore, RepoResult};
use crate::repo::schedule_repo::ScheduleRepository;
use crate::repo::task_repo::TaskRepository;
use crate::schedule::day_filter::{self, DatedItem};
use chrono::NaiveDate;

/// Numbers and items shown on the home screen.
#[derive(Debug, Clone, PartialEq)]
pub struct HomeSummary {
    pub task_count: usize,
    pub open_task_count: usize,
    /// Overall budget usage, `0` when no limit is set.
    pub budget_percentage: u32,
    pub today_class_count: usize,
    /// Visible items today and tomorrow.
    pub upcoming: Vec<DatedItem>,
}

pub struct HomeService<S: KvStore> {
    store: S,
}

impl<S: KvStore> HomeService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn home_summary(&self, user: User, today: NaiveDate) -> RepoResult<HomeSummary> {
        let tasks = self.store.load_tasks(user)?;
        let budget = self.store.load_budget(user)?;
        let items = self.store.load_items()?;

        Ok(HomeSummary {
            task_count: tasks.len(),
            open_task_count: tasks.iter().filter(|task| !task.completed).count(),
            budget_percentage: budget.overview().percentage,
            today_class_count: day_filter::class_count(&items, user, today),
            upcoming: day_filter::upcoming(&items, user, today),
        })
    }
}
