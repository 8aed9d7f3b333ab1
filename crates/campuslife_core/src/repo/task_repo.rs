//! Per-user task list persistence.
//!
//! # Invariants
//! - Each user's tasks live under `tasks_<User>`; no cross-user reads.
//! - A missing key reads as an empty list.

use crate::model::task::Task;
use crate::model::user::User;
use crate::repo::kv_store::{KvStore, RepoResult};

/// Storage key for one user's tasks.
pub fn tasks_key(user: User) -> String {
    format!("tasks_{}", user.name())
}

/// Repository interface for task lists.
pub trait TaskRepository {
    fn load_tasks(&self, user: User) -> RepoResult<Vec<Task>>;
    fn save_tasks(&self, user: User, tasks: &[Task]) -> RepoResult<()>;
    fn clear_tasks(&self, user: User) -> RepoResult<()>;
}

impl<S: KvStore> TaskRepository for S {
    fn load_tasks(&self, user: User) -> RepoResult<Vec<Task>> {
        Ok(self.get_json(&tasks_key(user))?.unwrap_or_default())
    }

    fn save_tasks(&self, user: User, tasks: &[Task]) -> RepoResult<()> {
        self.set_json(&tasks_key(user), tasks)
    }

    fn clear_tasks(&self, user: User) -> RepoResult<()> {
        self.remove_item(&tasks_key(user))
    }
}
