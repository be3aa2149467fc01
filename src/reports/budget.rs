use rust_decimal::Decimal;

use super::percent;
use crate::models::{Budget, Category, Expense, Money};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetProgress {
    pub spent: Money,
    pub limit: Money,
    /// `spent / limit * 100`, capped at 100; 0 when the limit is not positive.
    pub percent: Decimal,
    pub is_over: bool,
    /// Negative once the budget is exceeded.
    pub remaining: Money,
}

impl BudgetProgress {
    pub fn status_line(&self) -> String {
        if self.is_over {
            format!("exceeded by {}", self.remaining.abs())
        } else {
            format!("{} remaining", self.remaining)
        }
    }
}

/// Sum of all expenses whose category matches `category` after normalization.
pub fn spent_in(category: &Category, expenses: &[Expense]) -> Money {
    expenses
        .iter()
        .filter(|e| category.matches(&e.category))
        .map(|e| e.amount)
        .sum()
}

pub fn budget_progress(budget: &Budget, expenses: &[Expense]) -> BudgetProgress {
    let spent = spent_in(&budget.category, expenses);
    let limit = budget.limit_amount;
    BudgetProgress {
        spent,
        limit,
        percent: percent(spent, limit).min(Decimal::ONE_HUNDRED),
        is_over: spent > limit,
        remaining: limit - spent,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BudgetOverview {
    pub total_planned: Money,
    pub total_spent: Money,
    pub exceeded: usize,
}

pub fn budget_overview(budgets: &[Budget], expenses: &[Expense]) -> BudgetOverview {
    budgets
        .iter()
        .map(|b| budget_progress(b, expenses))
        .fold(BudgetOverview::default(), |mut acc, p| {
            acc.total_planned += p.limit;
            acc.total_spent += p.spent;
            acc.exceeded += usize::from(p.is_over);
            acc
        })
}
