//! Per-user budget blob persistence.
//!
//! # Invariants
//! - Each user's budget lives under `budget_<User>`.
//! - A missing key reads as an empty budget with zero limits.

use crate::model::budget::Budget;
use crate::model::user::User;
use crate::repo::kv_store::{KvStore, RepoResult};

/// Storage key for one user's budget.
pub fn budget_key(user: User) -> String {
    format!("budget_{}", user.name())
}

/// Repository interface for budgets.
pub trait BudgetRepository {
    fn load_budget(&self, user: User) -> RepoResult<Budget>;
    fn save_budget(&self, user: User, budget: &Budget) -> RepoResult<()>;
    fn clear_budget(&self, user: User) -> RepoResult<()>;
}

impl<S: KvStore> BudgetRepository for S {
    fn load_budget(&self, user: User) -> RepoResult<Budget> {
        Ok(self.get_json(&budget_key(user))?.unwrap_or_default())
    }

    fn save_budget(&self, user: User, budget: &Budget) -> RepoResult<()> {
        self.set_json(&budget_key(user), budget)
    }

    fn clear_budget(&self, user: User) -> RepoResult<()> {
        self.remove_item(&budget_key(user))
    }
}
