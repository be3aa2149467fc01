pub mod budget;
pub mod category;
pub mod expense;
pub mod income;
pub mod money;
pub mod notification;
pub mod saving_goal;

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

pub use budget::{Budget, BudgetForm, BudgetPatch};
pub use category::{normalize_key, Category, UNCATEGORIZED};
pub use expense::{Expense, ExpenseForm, ExpensePatch};
pub use income::{Income, IncomeForm, IncomePatch};
pub use money::Money;
pub use notification::{Notification, NotificationKind};
pub use saving_goal::{SavingsForm, SavingsGoal, SavingsPatch};

use crate::error::FinanceError;
use crate::util;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Expense,
    Income,
    Budget,
    Savings,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [Self::Expense, Self::Income, Self::Budget, Self::Savings];

    /// Backend collection path segment.
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Expense => "expenses",
            Self::Income => "incomes",
            Self::Budget => "budgets",
            Self::Savings => "savings",
        }
    }

    pub const fn singular(self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
            Self::Budget => "budget",
            Self::Savings => "savings goal",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

/// Record identifier. Backends hand out numbers or strings, both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Self(s),
            Value::Number(n) => Self(n.to_string()),
            _ => Self::default(),
        })
    }
}

/// Dates that fail to parse come through as `None` instead of failing the whole record.
pub(crate) fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        // ISO timestamps carry the date in their first ten characters.
        Value::String(s) => util::parse_date(s.get(..10).unwrap_or(s.as_str())),
        _ => None,
    })
}

pub(crate) fn required_text(value: &str, message: &str) -> Result<String, FinanceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FinanceError::validation(message));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn required_date(value: &str) -> Result<NaiveDate, FinanceError> {
    if value.trim().is_empty() {
        return Err(FinanceError::validation("Date is required"));
    }
    util::parse_date(value).ok_or_else(|| FinanceError::validation("Format: YYYY-MM-DD"))
}
