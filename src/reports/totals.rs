use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::percent;
use crate::models::{normalize_key, Budget, Expense, Income, Money, SavingsGoal, UNCATEGORIZED};

/// The amount a record contributes to totals.
pub trait Amounted {
    fn amount(&self) -> Money;
}

impl Amounted for Expense {
    fn amount(&self) -> Money {
        self.amount
    }
}

impl Amounted for Income {
    fn amount(&self) -> Money {
        self.amount
    }
}

impl Amounted for SavingsGoal {
    fn amount(&self) -> Money {
        self.saved_amount
    }
}

/// Budgets total up by their limit ("total planned").
impl Amounted for Budget {
    fn amount(&self) -> Money {
        self.limit_amount
    }
}

pub fn total_of<T: Amounted>(items: &[T]) -> Money {
    items.iter().map(Amounted::amount).sum()
}

/// Summed amounts per normalized key. Blank keys land in `uncategorized`, so
/// `total()` always equals `total_of` over the same records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Breakdown {
    buckets: BTreeMap<String, Money>,
}

impl Breakdown {
    pub fn get(&self, key: &str) -> Money {
        self.buckets.get(&normalize_key(key)).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Money)> + '_ {
        self.buckets.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn total(&self) -> Money {
        self.buckets.values().sum()
    }

    /// Percentage of the breakdown total that falls in `key`.
    pub fn share(&self, key: &str) -> Decimal {
        percent(self.get(key), self.total())
    }
}

pub fn breakdown_by<T, F>(items: &[T], key: F) -> Breakdown
where
    T: Amounted,
    F: Fn(&T) -> String,
{
    let mut buckets = BTreeMap::new();
    for item in items {
        let mut bucket = normalize_key(&key(item));
        if bucket.is_empty() {
            bucket = UNCATEGORIZED.to_string();
        }
        *buckets.entry(bucket).or_insert_with(Money::zero) += item.amount();
    }
    Breakdown { buckets }
}

pub fn expenses_by_category(expenses: &[Expense]) -> Breakdown {
    breakdown_by(expenses, |e| e.category.key())
}

pub fn incomes_by_source(incomes: &[Income]) -> Breakdown {
    breakdown_by(incomes, |i| i.source.clone())
}
