//! To-do list use-cases.
//!
//! # Invariants
//! - Tasks are appended in creation order and never reordered.
//! - Task text is trimmed; blank text is rejected.

use crate::model::task::{Task, TaskId};
use crate::model::user::User;
use crate::repo::kv_store::RepoError;
use crate::repo::task_repo::TaskRepository;
use chrono::Utc;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from task use-cases.
#[derive(Debug)]
pub enum TaskServiceError {
    BlankText,
    TaskNotFound(TaskId),
    Repo(RepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankText => write!(f, "task text must not be blank"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Task list facade over repository implementations.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Appends a new open task.
    pub fn add_task(&self, user: User, text: &str) -> Result<Task, TaskServiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TaskServiceError::BlankText);
        }
        let mut tasks = self.repo.load_tasks(user)?;
        let task = Task::new(text, Utc::now());
        tasks.push(task.clone());
        self.repo.save_tasks(user, &tasks)?;
        info!(
            "event=task_add module=task status=ok user={user} task_count={}",
            tasks.len()
        );
        Ok(task)
    }

    pub fn list_tasks(&self, user: User) -> Result<Vec<Task>, TaskServiceError> {
        Ok(self.repo.load_tasks(user)?)
    }

    pub fn delete_task(&self, user: User, id: TaskId) -> Result<(), TaskServiceError> {
        let mut tasks = self.repo.load_tasks(user)?;
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        if tasks.len() == before {
            return Err(TaskServiceError::TaskNotFound(id));
        }
        self.repo.save_tasks(user, &tasks)?;
        info!("event=task_delete module=task status=ok user={user}");
        Ok(())
    }

    /// Flips the `completed` flag and returns the updated task.
    pub fn toggle_task(&self, user: User, id: TaskId) -> Result<Task, TaskServiceError> {
        let mut tasks = self.repo.load_tasks(user)?;
        let task = tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(TaskServiceError::TaskNotFound(id))?;
        task.completed = !task.completed;
        let updated = task.clone();
        self.repo.save_tasks(user, &tasks)?;
        Ok(updated)
    }

    /// Removes every task of `user`.
    pub fn reset_tasks(&self, user: User) -> Result<(), TaskServiceError> {
        self.repo.clear_tasks(user)?;
        info!("event=task_reset module=task status=ok user={user}");
        Ok(())
    }
}
