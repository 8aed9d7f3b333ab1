//! Budget tracker use-cases.
//!
//! # Invariants
//! - Expense descriptions are never logged.
//! - Limits and amounts are validated before any write.

use crate::model::budget::{
    Budget, BudgetCategory, BudgetOverview, CategorySummary, Expense, ExpenseId,
};
use crate::model::user::User;
use crate::repo::budget_repo::BudgetRepository;
use crate::repo::kv_store::RepoError;
use chrono::Utc;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Errors from budget use-cases.
#[derive(Debug)]
pub enum BudgetServiceError {
    /// Amount is not a finite number greater than zero.
    InvalidAmount(f64),
    BlankDescription,
    /// Limit is not a finite, non-negative number.
    InvalidLimit(f64),
    ExpenseNotFound(ExpenseId),
    Repo(RepoError),
}

impl Display for BudgetServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAmount(value) => {
                write!(f, "invalid amount {value}; expected a number greater than 0")
            }
            Self::BlankDescription => write!(f, "expense description must not be blank"),
            Self::InvalidLimit(value) => {
                write!(f, "invalid limit {value}; expected a number of 0 or more")
            }
            Self::ExpenseNotFound(id) => write!(f, "expense not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BudgetServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for BudgetServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Budget facade over repository implementations.
pub struct BudgetService<R: BudgetRepository> {
    repo: R,
}

impl<R: BudgetRepository> BudgetService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn load_budget(&self, user: User) -> Result<Budget, BudgetServiceError> {
        Ok(self.repo.load_budget(user)?)
    }

    /// Records an expense in `category` dated now.
    pub fn add_expense(
        &self,
        user: User,
        category: BudgetCategory,
        amount: f64,
        description: &str,
    ) -> Result<Expense, BudgetServiceError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(BudgetServiceError::InvalidAmount(amount));
        }
        let description = description.trim();
        if description.is_empty() {
            return Err(BudgetServiceError::BlankDescription);
        }

        let mut budget = self.repo.load_budget(user)?;
        let expense = Expense {
            id: Uuid::new_v4(),
            amount,
            description: description.to_string(),
            date: Utc::now(),
            category,
        };
        budget.expenses_mut(category).push(expense.clone());
        self.repo.save_budget(user, &budget)?;
        info!("event=expense_add module=budget status=ok user={user} category={category}");
        Ok(expense)
    }

    pub fn delete_expense(
        &self,
        user: User,
        category: BudgetCategory,
        id: ExpenseId,
    ) -> Result<(), BudgetServiceError> {
        let mut budget = self.repo.load_budget(user)?;
        let expenses = budget.expenses_mut(category);
        let before = expenses.len();
        expenses.retain(|expense| expense.id != id);
        if expenses.len() == before {
            return Err(BudgetServiceError::ExpenseNotFound(id));
        }
        self.repo.save_budget(user, &budget)?;
        info!("event=expense_delete module=budget status=ok user={user} category={category}");
        Ok(())
    }

    /// Sets the spending limit of `category`; `0` clears it.
    pub fn set_limit(
        &self,
        user: User,
        category: BudgetCategory,
        limit: f64,
    ) -> Result<CategorySummary, BudgetServiceError> {
        if !limit.is_finite() || limit < 0.0 {
            return Err(BudgetServiceError::InvalidLimit(limit));
        }
        let mut budget = self.repo.load_budget(user)?;
        budget.set_limit(category, limit);
        self.repo.save_budget(user, &budget)?;
        info!("event=budget_limit module=budget status=ok user={user} category={category}");
        Ok(budget.summary(category))
    }

    pub fn category_summary(
        &self,
        user: User,
        category: BudgetCategory,
    ) -> Result<CategorySummary, BudgetServiceError> {
        Ok(self.repo.load_budget(user)?.summary(category))
    }

    pub fn overview(&self, user: User) -> Result<BudgetOverview, BudgetServiceError> {
        Ok(self.repo.load_budget(user)?.overview())
    }

    pub fn reset_budget(&self, user: User) -> Result<(), BudgetServiceError> {
        self.repo.clear_budget(user)?;
        info!("event=budget_reset module=budget status=ok user={user}");
        Ok(())
    }
}
