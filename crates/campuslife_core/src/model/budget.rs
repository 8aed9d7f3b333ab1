//! Budget tracker model.
//!
//! # Responsibility
//! - Group expenses into category buckets with an optional spending limit each.
//! - Derive per-category summaries and the overall spent percentage.
//!
//! # Invariants
//! - Expense amounts are finite and strictly positive.
//! - Limits are finite and non-negative; `0` means "no limit set".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

pub type ExpenseId = Uuid;

/// Expense bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetCategory {
    Food,
    Money,
}

impl BudgetCategory {
    pub const ALL: [BudgetCategory; 2] = [BudgetCategory::Food, BudgetCategory::Money];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Money => "money",
        }
    }
}

impl Display for BudgetCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetCategory {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "food" => Ok(Self::Food),
            "money" => Ok(Self::Money),
            other => Err(format!(
                "unknown budget category `{other}`; expected food|money"
            )),
        }
    }
}

/// One recorded expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: ExpenseId,
    pub amount: f64,
    pub description: String,
    pub date: DateTime<Utc>,
    pub category: BudgetCategory,
}

/// Spending limits per category.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BudgetLimits {
    #[serde(default)]
    pub food: f64,
    #[serde(default)]
    pub money: f64,
}

/// Full per-user budget blob.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Budget {
    #[serde(default)]
    pub food: Vec<Expense>,
    #[serde(default)]
    pub money: Vec<Expense>,
    #[serde(default)]
    pub limits: BudgetLimits,
}

/// Limit, spent and remaining amounts for one category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategorySummary {
    pub category: BudgetCategory,
    pub limit: f64,
    pub spent: f64,
    /// Negative when the category is over its limit.
    pub remaining: f64,
}

/// Totals across all categories.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetOverview {
    pub total_limit: f64,
    pub total_spent: f64,
    /// `round(spent / limit * 100)`, or `0` when no limit is set.
    pub percentage: u32,
}

impl Budget {
    pub fn expenses(&self, category: BudgetCategory) -> &[Expense] {
        match category {
            BudgetCategory::Food => &self.food,
            BudgetCategory::Money => &self.money,
        }
    }

    pub fn expenses_mut(&mut self, category: BudgetCategory) -> &mut Vec<Expense> {
        match category {
            BudgetCategory::Food => &mut self.food,
            BudgetCategory::Money => &mut self.money,
        }
    }

    pub fn limit(&self, category: BudgetCategory) -> f64 {
        match category {
            BudgetCategory::Food => self.limits.food,
            BudgetCategory::Money => self.limits.money,
        }
    }

    pub fn set_limit(&mut self, category: BudgetCategory, limit: f64) {
        match category {
            BudgetCategory::Food => self.limits.food = limit,
            BudgetCategory::Money => self.limits.money = limit,
        }
    }

    pub fn spent(&self, category: BudgetCategory) -> f64 {
        self.expenses(category)
            .iter()
            .map(|expense| expense.amount)
            .sum()
    }

    pub fn summary(&self, category: BudgetCategory) -> CategorySummary {
        let limit = self.limit(category);
        let spent = self.spent(category);
        CategorySummary {
            category,
            limit,
            spent,
            remaining: limit - spent,
        }
    }

    pub fn overview(&self) -> BudgetOverview {
        let total_limit: f64 = BudgetCategory::ALL.iter().map(|c| self.limit(*c)).sum();
        let total_spent: f64 = BudgetCategory::ALL.iter().map(|c| self.spent(*c)).sum();
        BudgetOverview {
            total_limit,
            total_spent,
            percentage: spent_percentage(total_spent, total_limit),
        }
    }
}

fn spent_percentage(spent: f64, limit: f64) -> u32 {
    if limit <= 0.0 {
        return 0;
    }
    let ratio = (spent / limit * 100.0).round();
    if ratio.is_finite() && ratio > 0.0 {
        ratio as u32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::{Budget, BudgetCategory, Expense};
    use chrono::Utc;
    use uuid::Uuid;

    fn expense(category: BudgetCategory, amount: f64) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            amount,
            description: "x".to_string(),
            date: Utc::now(),
            category,
        }
    }

    #[test]
    fn summary_reports_negative_remaining_when_over_limit() {
        let mut budget = Budget::default();
        budget.set_limit(BudgetCategory::Food, 10.0);
        budget.food.push(expense(BudgetCategory::Food, 12.5));

        let summary = budget.summary(BudgetCategory::Food);
        assert_eq!(summary.spent, 12.5);
        assert_eq!(summary.remaining, -2.5);
    }

    #[test]
    fn overview_percentage_is_zero_without_limits() {
        let mut budget = Budget::default();
        budget.money.push(expense(BudgetCategory::Money, 40.0));
        assert_eq!(budget.overview().percentage, 0);
    }

    #[test]
    fn overview_percentage_rounds_over_all_categories() {
        let mut budget = Budget::default();
        budget.set_limit(BudgetCategory::Food, 100.0);
        budget.set_limit(BudgetCategory::Money, 200.0);
        budget.food.push(expense(BudgetCategory::Food, 50.0));
        budget.money.push(expense(BudgetCategory::Money, 51.0));

        // 101 / 300 = 33.67%
        assert_eq!(budget.overview().percentage, 34);
    }

    #[test]
    fn missing_fields_deserialize_to_empty_budget() {
        let budget: Budget = serde_json::from_str("{}").unwrap();
        assert_eq!(budget, Budget::default());
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!(" Food ".parse::<BudgetCategory>().unwrap(), BudgetCategory::Food);
        assert!("rent".parse::<BudgetCategory>().is_err());
    }
}
