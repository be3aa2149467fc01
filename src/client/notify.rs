use std::collections::VecDeque;

use crate::error::FinanceError;
use crate::models::{Budget, Expense, Income, Money, Notification, NotificationKind, SavingsGoal};
use crate::reports::BudgetProgress;

pub const DEFAULT_CAP: usize = 5;

/// Append-only notification feed, oldest first. With a cap, the oldest entries
/// are evicted first.
#[derive(Debug, Clone)]
pub struct Notifications {
    entries: VecDeque<Notification>,
    cap: Option<usize>,
    next_seq: u64,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(Some(DEFAULT_CAP))
    }
}

impl Notifications {
    /// `None` keeps everything.
    pub fn new(cap: Option<usize>) -> Self {
        Self {
            entries: VecDeque::new(),
            cap: cap.filter(|c| *c > 0),
            next_seq: 0,
        }
    }

    pub fn push(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.next_seq += 1;
        self.entries.push_back(Notification {
            seq: self.next_seq,
            kind,
            message: message.into(),
        });
        if let Some(cap) = self.cap {
            while self.entries.len() > cap {
                self.entries.pop_front();
            }
        }
    }

    /// Turns an error into a notification unless it is meant to stay silent.
    pub fn surface(&mut self, err: &FinanceError) {
        if let Some(kind) = err.notification_kind() {
            self.push(kind, err.to_string());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> + '_ {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<Notification> {
        self.entries.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_of(&self, kind: NotificationKind) -> usize {
        self.entries.iter().filter(|n| n.kind == kind).count()
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
    }
}

pub fn expense_added(expense: &Expense, currency: &str) -> String {
    format!("Expense added: {} ({currency}{})", expense.category, expense.amount)
}

pub fn income_added(income: &Income, currency: &str) -> String {
    format!("Income added: {} ({currency}{})", income.source, income.amount)
}

pub fn saving_added(goal: &SavingsGoal, currency: &str) -> String {
    format!("Saving goal added: {} (target {currency}{})", goal.goal, goal.target_amount)
}

pub fn money_added(goal: &SavingsGoal, delta: Money, currency: &str) -> String {
    format!(
        "Added {currency}{delta} to {} ({currency}{} of {currency}{})",
        goal.goal, goal.saved_amount, goal.target_amount
    )
}

pub fn goal_achieved(goal: &SavingsGoal) -> String {
    format!("🎉 Goal achieved: {}", goal.goal)
}

pub fn budget_exceeded(budget: &Budget, progress: &BudgetProgress, currency: &str) -> String {
    format!(
        "⚠ {} budget exceeded by {currency}{}",
        budget.category,
        progress.remaining.abs()
    )
}
