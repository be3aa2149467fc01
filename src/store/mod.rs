//! In-memory entity stores, one per record kind.
//!
//! Stores are read-only from outside the crate. Every write goes through
//! `App`, which only touches a store after the backend confirmed the change.

pub mod ids;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use ids::IdGenerator;

use crate::models::{
    Budget, BudgetPatch, EntityKind, Expense, ExpensePatch, Income, IncomePatch, RecordId,
    SavingsGoal, SavingsPatch,
};

/// A record kind the stores hold and the backend persists.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;
    type Patch: Serialize + Send + Sync;

    fn id(&self) -> &RecordId;
    fn set_id(&mut self, id: RecordId);
    fn apply(&mut self, patch: &Self::Patch);

    fn select(stores: &Stores) -> &EntityStore<Self>;
    fn select_mut(stores: &mut Stores) -> &mut EntityStore<Self>;
}

#[derive(Debug, Clone)]
pub struct EntityStore<T> {
    records: Vec<T>,
}

impl<T> Default for EntityStore<T> {
    fn default() -> Self {
        Self { records: Vec::new() }
    }
}

impl<T: Entity> EntityStore<T> {
    pub fn list(&self) -> &[T] {
        &self.records
    }

    pub fn get(&self, id: &RecordId) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends, or replaces in place when the id is already present.
    pub(crate) fn insert(&mut self, record: T) {
        match self.position(record.id()) {
            Some(idx) => self.records[idx] = record,
            None => self.records.push(record),
        }
    }

    pub(crate) fn replace(&mut self, record: T) -> Option<T> {
        let idx = self.position(record.id())?;
        Some(std::mem::replace(&mut self.records[idx], record))
    }

    pub(crate) fn remove(&mut self, id: &RecordId) -> Option<T> {
        let idx = self.position(id)?;
        Some(self.records.remove(idx))
    }

    pub(crate) fn replace_all(&mut self, records: Vec<T>) {
        self.records = records;
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }

    fn position(&self, id: &RecordId) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }
}

/// The four parallel stores for the active identity.
#[derive(Debug, Clone, Default)]
pub struct Stores {
    expenses: EntityStore<Expense>,
    incomes: EntityStore<Income>,
    budgets: EntityStore<Budget>,
    savings: EntityStore<SavingsGoal>,
}

impl Stores {
    pub fn expenses(&self) -> &EntityStore<Expense> {
        &self.expenses
    }

    pub fn incomes(&self) -> &EntityStore<Income> {
        &self.incomes
    }

    pub fn budgets(&self) -> &EntityStore<Budget> {
        &self.budgets
    }

    pub fn savings(&self) -> &EntityStore<SavingsGoal> {
        &self.savings
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
            && self.incomes.is_empty()
            && self.budgets.is_empty()
            && self.savings.is_empty()
    }

    pub(crate) fn clear_all(&mut self) {
        self.expenses.clear();
        self.incomes.clear();
        self.budgets.clear();
        self.savings.clear();
    }
}

impl Entity for Expense {
    const KIND: EntityKind = EntityKind::Expense;
    type Patch = ExpensePatch;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn apply(&mut self, patch: &ExpensePatch) {
        patch.apply_to(self);
    }

    fn select(stores: &Stores) -> &EntityStore<Self> {
        &stores.expenses
    }

    fn select_mut(stores: &mut Stores) -> &mut EntityStore<Self> {
        &mut stores.expenses
    }
}

impl Entity for Income {
    const KIND: EntityKind = EntityKind::Income;
    type Patch = IncomePatch;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn apply(&mut self, patch: &IncomePatch) {
        patch.apply_to(self);
    }

    fn select(stores: &Stores) -> &EntityStore<Self> {
        &stores.incomes
    }

    fn select_mut(stores: &mut Stores) -> &mut EntityStore<Self> {
        &mut stores.incomes
    }
}

impl Entity for Budget {
    const KIND: EntityKind = EntityKind::Budget;
    type Patch = BudgetPatch;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn apply(&mut self, patch: &BudgetPatch) {
        patch.apply_to(self);
    }

    fn select(stores: &Stores) -> &EntityStore<Self> {
        &stores.budgets
    }

    fn select_mut(stores: &mut Stores) -> &mut EntityStore<Self> {
        &mut stores.budgets
    }
}

impl Entity for SavingsGoal {
    const KIND: EntityKind = EntityKind::Savings;
    type Patch = SavingsPatch;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn apply(&mut self, patch: &SavingsPatch) {
        patch.apply_to(self);
    }

    fn select(stores: &Stores) -> &EntityStore<Self> {
        &stores.savings
    }

    fn select_mut(stores: &mut Stores) -> &mut EntityStore<Self> {
        &mut stores.savings
    }
}
