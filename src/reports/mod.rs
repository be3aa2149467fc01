//! Derived values: totals, breakdowns and progress figures.
//!
//! Every function here is pure and total. Whatever the stores hold, they
//! return a value; malformed amounts were already coerced to zero on the way in.

pub mod budget;
pub mod savings;
pub mod totals;

use rust_decimal::Decimal;

pub use budget::{budget_overview, budget_progress, spent_in, BudgetOverview, BudgetProgress};
pub use savings::{savings_progress, SavingsProgress};
pub use totals::{breakdown_by, expenses_by_category, incomes_by_source, total_of, Amounted, Breakdown};

use crate::models::Money;
use crate::store::Stores;

/// `part / whole * 100` rounded to one decimal place; 0 when `whole` is not positive.
pub(crate) fn percent(part: Money, whole: Money) -> Decimal {
    if !whole.is_positive() {
        return Decimal::ZERO;
    }
    part.0
        .checked_div(whole.0)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|p| p.round_dp(1))
        .unwrap_or_default()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinancialSummary {
    pub total_expenses: Money,
    pub total_income: Money,
    pub total_budgeted: Money,
    pub total_saved: Money,
    /// Income minus expenses.
    pub net_balance: Money,
    pub exceeded_budgets: usize,
}

pub fn summarize(stores: &Stores) -> FinancialSummary {
    let expenses = stores.expenses().list();
    let total_expenses = total_of(expenses);
    let total_income = total_of(stores.incomes().list());
    FinancialSummary {
        total_expenses,
        total_income,
        total_budgeted: total_of(stores.budgets().list()),
        total_saved: total_of(stores.savings().list()),
        net_balance: total_income - total_expenses,
        exceeded_budgets: budget_overview(stores.budgets().list(), expenses).exceeded,
    }
}
