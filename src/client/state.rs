use tracing::{debug, info, warn};

use super::api::{bounded, fetch_snapshot, Client, Remote, Snapshot};
use super::notify::{self, Notifications};
use super::session::{Identity, LoadTicket, Session, SessionManager, Transition};
use crate::config::ClientConfig;
use crate::database::ClientStateStore;
use crate::error::FinanceError;
use crate::models::{
    Budget, BudgetForm, BudgetPatch, EntityKind, Expense, ExpenseForm, ExpensePatch, Income,
    IncomeForm, IncomePatch, Money, NotificationKind, RecordId, SavingsForm, SavingsGoal,
    SavingsPatch,
};
use crate::reports::{
    self, budget_progress, savings_progress, Breakdown, BudgetOverview, BudgetProgress,
    FinancialSummary, SavingsProgress,
};
use crate::store::{Entity, IdGenerator, Stores};

/// What a bulk load did, per store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: Vec<(EntityKind, usize)>,
    pub failed: Vec<(EntityKind, FinanceError)>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn loaded_count(&self, kind: EntityKind) -> Option<usize> {
        self.loaded.iter().find(|(k, _)| *k == kind).map(|(_, n)| *n)
    }
}

/// Owns every piece of mutable client state: the session, the four entity
/// stores and the notification feed. Consumers read through the accessors and
/// change state only through the typed operations below.
///
/// Writes are pessimistic: a store changes only after the backend confirmed
/// the call, so a failed call leaves the store exactly as it was.
pub struct App<R: Remote = Client> {
    remote: R,
    config: ClientConfig,
    session: SessionManager,
    stores: Stores,
    notifications: Notifications,
    ids: IdGenerator,
    persistence: Option<ClientStateStore>,
    theme: Option<String>,
}

impl<R: Remote> App<R> {
    pub fn new(remote: R, config: ClientConfig) -> Self {
        Self {
            notifications: Notifications::new(config.notification_cap),
            remote,
            config,
            session: SessionManager::default(),
            stores: Stores::default(),
            ids: IdGenerator::default(),
            persistence: None,
            theme: None,
        }
    }

    pub fn with_persistence(mut self, store: ClientStateStore) -> Self {
        self.persistence = Some(store);
        self
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        self.session.session()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.session.identity()
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub fn expenses(&self) -> &[Expense] {
        self.stores.expenses().list()
    }

    pub fn incomes(&self) -> &[Income] {
        self.stores.incomes().list()
    }

    pub fn budgets(&self) -> &[Budget] {
        self.stores.budgets().list()
    }

    pub fn savings(&self) -> &[SavingsGoal] {
        self.stores.savings().list()
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn clear_notifications(&mut self) {
        self.notifications.clear_all();
    }

    pub fn theme(&self) -> Option<&str> {
        self.theme.as_deref()
    }

    // ============= Derived views =============

    pub fn summary(&self) -> FinancialSummary {
        reports::summarize(&self.stores)
    }

    pub fn budget_report(&self) -> Vec<(&Budget, BudgetProgress)> {
        let expenses = self.expenses();
        self.budgets()
            .iter()
            .map(|b| (b, budget_progress(b, expenses)))
            .collect()
    }

    pub fn budget_overview(&self) -> BudgetOverview {
        reports::budget_overview(self.budgets(), self.expenses())
    }

    pub fn savings_report(&self) -> Vec<(&SavingsGoal, SavingsProgress)> {
        self.savings().iter().map(|g| (g, savings_progress(g))).collect()
    }

    pub fn expense_breakdown(&self) -> Breakdown {
        reports::expenses_by_category(self.expenses())
    }

    pub fn income_breakdown(&self) -> Breakdown {
        reports::incomes_by_source(self.incomes())
    }

    // ============= Session =============

    /// Signs back in as the identity persisted by the previous run, if any.
    pub async fn restore(&mut self) -> Result<Option<LoadReport>, FinanceError> {
        let Some(store) = &self.persistence else {
            return Ok(None);
        };
        let state = match store.load().await {
            Ok(state) => state,
            Err(err) => {
                warn!(error = %format!("{err:#}"), "could not read client state");
                return Ok(None);
            }
        };
        self.theme = state.theme;
        match state.last_identity {
            Some(raw) => self.sign_in(&raw).await.map(Some),
            None => Ok(None),
        }
    }

    /// Makes `raw_identity` the active identity without loading anything.
    /// Switching to a different identity empties every store first.
    pub fn authenticate(&mut self, raw_identity: &str) -> Result<Transition, FinanceError> {
        let parsed = Identity::parse(raw_identity);
        let identity = self.report(parsed)?;
        let transition = self.session.sign_in(identity);
        self.apply_transition(&transition);
        Ok(transition)
    }

    pub async fn sign_in(&mut self, raw_identity: &str) -> Result<LoadReport, FinanceError> {
        self.authenticate(raw_identity)?;
        let identity = self.session.identity().cloned();
        self.persist_identity(identity.as_ref()).await;
        self.reload().await
    }

    pub async fn sign_out(&mut self) {
        let transition = self.session.sign_out();
        self.apply_transition(&transition);
        self.persist_identity(None).await;
    }

    pub fn begin_load(&self) -> Result<LoadTicket, FinanceError> {
        self.session.ticket()
    }

    /// Fills the stores from a snapshot fetched under `snapshot.ticket`. A
    /// snapshot for an identity that is no longer active is dropped without
    /// touching anything. A store whose fetch failed keeps what it had.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) -> Result<LoadReport, FinanceError> {
        if let Err(err) = self.session.check(&snapshot.ticket) {
            debug!(
                identity = %snapshot.ticket.identity,
                generation = snapshot.ticket.generation,
                "discarding stale load"
            );
            return Err(err);
        }

        let mut report = LoadReport::default();
        self.absorb(snapshot.expenses, &mut report);
        self.absorb(snapshot.incomes, &mut report);
        self.absorb(snapshot.budgets, &mut report);
        self.absorb(snapshot.savings, &mut report);
        Ok(report)
    }

    /// Loads every store for the active identity.
    pub async fn reload(&mut self) -> Result<LoadReport, FinanceError> {
        let ticket = self.begin_load();
        let ticket = self.report(ticket)?;
        info!(identity = %ticket.identity, generation = ticket.generation, "loading stores");
        let snapshot = fetch_snapshot(&self.remote, ticket, self.config.request_timeout).await;
        self.apply_snapshot(snapshot)
    }

    pub async fn set_theme(&mut self, theme: &str) {
        self.theme = Some(theme.trim().to_string());
        if let Some(store) = &self.persistence {
            if let Err(err) = store.save_theme(theme.trim()).await {
                warn!(error = %format!("{err:#}"), "could not persist theme");
            }
        }
    }

    // ============= Expenses =============

    pub async fn add_expense(&mut self, form: &ExpenseForm) -> Result<Expense, FinanceError> {
        let result = self.try_add_expense(form).await;
        self.report(result)
    }

    pub async fn update_expense(
        &mut self,
        id: &RecordId,
        patch: ExpensePatch,
    ) -> Result<Expense, FinanceError> {
        let result = match patch.validate() {
            Ok(()) => self.modify::<Expense>(id, &patch).await,
            Err(err) => Err(err),
        };
        self.report(result)
    }

    pub async fn remove_expense(&mut self, id: &RecordId) -> Result<Expense, FinanceError> {
        let result = self.discard::<Expense>(id).await;
        self.report(result)
    }

    async fn try_add_expense(&mut self, form: &ExpenseForm) -> Result<Expense, FinanceError> {
        let draft = form.validate()?;
        let expense = self.create(draft).await?;
        let message = notify::expense_added(&expense, &self.config.currency);
        self.notifications.push(NotificationKind::Expense, message);
        self.flag_crossed_budgets(&expense);
        Ok(expense)
    }

    /// One alert per budget that this expense pushed from within its limit to
    /// over it. Budgets that were already over stay quiet.
    fn flag_crossed_budgets(&mut self, expense: &Expense) {
        let expenses = self.stores.expenses().list();
        let crossed: Vec<String> = self
            .stores
            .budgets()
            .list()
            .iter()
            .filter(|b| b.category.matches(&expense.category))
            .filter_map(|b| {
                let progress = budget_progress(b, expenses);
                let spent_before = progress.spent - expense.amount;
                (progress.is_over && spent_before <= progress.limit)
                    .then(|| notify::budget_exceeded(b, &progress, &self.config.currency))
            })
            .collect();

        for message in crossed {
            warn!(category = %expense.category, "budget exceeded");
            self.notifications.push(NotificationKind::Error, message);
        }
    }

    // ============= Incomes =============

    pub async fn add_income(&mut self, form: &IncomeForm) -> Result<Income, FinanceError> {
        let result = self.try_add_income(form).await;
        self.report(result)
    }

    pub async fn update_income(
        &mut self,
        id: &RecordId,
        patch: IncomePatch,
    ) -> Result<Income, FinanceError> {
        let result = match patch.validate() {
            Ok(()) => self.modify::<Income>(id, &patch).await,
            Err(err) => Err(err),
        };
        self.report(result)
    }

    pub async fn remove_income(&mut self, id: &RecordId) -> Result<Income, FinanceError> {
        let result = self.discard::<Income>(id).await;
        self.report(result)
    }

    async fn try_add_income(&mut self, form: &IncomeForm) -> Result<Income, FinanceError> {
        let draft = form.validate()?;
        let income = self.create(draft).await?;
        let message = notify::income_added(&income, &self.config.currency);
        self.notifications.push(NotificationKind::Success, message);
        Ok(income)
    }

    // ============= Budgets =============

    pub async fn add_budget(&mut self, form: &BudgetForm) -> Result<Budget, FinanceError> {
        let result = self.try_add_budget(form).await;
        self.report(result)
    }

    pub async fn update_budget(
        &mut self,
        id: &RecordId,
        patch: BudgetPatch,
    ) -> Result<Budget, FinanceError> {
        let result = match patch.validate() {
            Ok(()) => self.modify::<Budget>(id, &patch).await,
            Err(err) => Err(err),
        };
        self.report(result)
    }

    pub async fn remove_budget(&mut self, id: &RecordId) -> Result<Budget, FinanceError> {
        let result = self.discard::<Budget>(id).await;
        self.report(result)
    }

    async fn try_add_budget(&mut self, form: &BudgetForm) -> Result<Budget, FinanceError> {
        let draft = form.validate()?;
        let budget = self.create(draft).await?;
        let progress = budget_progress(&budget, self.expenses());
        if progress.is_over {
            let message = notify::budget_exceeded(&budget, &progress, &self.config.currency);
            self.notifications.push(NotificationKind::Warning, message);
        }
        Ok(budget)
    }

    // ============= Savings =============

    pub async fn add_savings_goal(&mut self, form: &SavingsForm) -> Result<SavingsGoal, FinanceError> {
        let result = self.try_add_savings_goal(form).await;
        self.report(result)
    }

    /// Edits the label or target. Use `add_money` to change the saved amount.
    pub async fn update_savings_goal(
        &mut self,
        id: &RecordId,
        patch: SavingsPatch,
    ) -> Result<SavingsGoal, FinanceError> {
        let result = match patch.validate() {
            Ok(()) => self.modify::<SavingsGoal>(id, &patch).await,
            Err(err) => Err(err),
        };
        self.report(result)
    }

    pub async fn add_money(&mut self, id: &RecordId, delta: Money) -> Result<SavingsGoal, FinanceError> {
        let result = self.try_add_money(id, delta).await;
        self.report(result)
    }

    pub async fn remove_savings_goal(&mut self, id: &RecordId) -> Result<SavingsGoal, FinanceError> {
        let result = self.discard::<SavingsGoal>(id).await;
        self.report(result)
    }

    async fn try_add_savings_goal(&mut self, form: &SavingsForm) -> Result<SavingsGoal, FinanceError> {
        let draft = form.validate()?;
        let goal = self.create(draft).await?;
        let message = notify::saving_added(&goal, &self.config.currency);
        self.notifications.push(NotificationKind::Info, message);
        Ok(goal)
    }

    async fn try_add_money(&mut self, id: &RecordId, delta: Money) -> Result<SavingsGoal, FinanceError> {
        if !delta.is_positive() {
            return Err(FinanceError::validation("Amount to add must be greater than zero"));
        }
        self.session.require_identity()?;
        let current = self.existing::<SavingsGoal>(id)?;
        let saved = current
            .saved_amount
            .checked_add(delta)
            .ok_or_else(|| FinanceError::validation("Amount is too large"))?;
        let patch = SavingsPatch {
            saved_amount: Some(saved),
            ..Default::default()
        };
        let goal = self.modify::<SavingsGoal>(id, &patch).await?;

        let message = notify::money_added(&goal, delta, &self.config.currency);
        self.notifications.push(NotificationKind::Success, message);
        if !current.is_achieved() && goal.is_achieved() {
            self.notifications.push(NotificationKind::Info, notify::goal_achieved(&goal));
        }
        Ok(goal)
    }

    // ============= Store plumbing =============

    async fn create<T: Entity>(&mut self, draft: T) -> Result<T, FinanceError> {
        let owner = self.session.require_identity()?.clone();
        let mut stored =
            bounded(self.config.request_timeout, self.remote.create(&owner, &draft)).await?;
        if stored.id().is_blank() {
            stored.set_id(self.ids.next_id());
        }
        debug!(kind = %T::KIND, id = %stored.id(), "record created");
        T::select_mut(&mut self.stores).insert(stored.clone());
        Ok(stored)
    }

    async fn modify<T: Entity>(&mut self, id: &RecordId, patch: &T::Patch) -> Result<T, FinanceError> {
        self.session.require_identity()?;
        let current = self.existing::<T>(id)?;
        let confirmed =
            bounded(self.config.request_timeout, self.remote.update::<T>(id, patch)).await?;
        // Prefer the record as the backend stored it; an empty reply means apply locally.
        let updated = match confirmed {
            Some(mut stored) => {
                if stored.id().is_blank() {
                    stored.set_id(id.clone());
                }
                stored
            }
            None => {
                let mut local = current;
                local.apply(patch);
                local
            }
        };
        debug!(kind = %T::KIND, id = %id, "record updated");
        T::select_mut(&mut self.stores).replace(updated.clone());
        Ok(updated)
    }

    async fn discard<T: Entity>(&mut self, id: &RecordId) -> Result<T, FinanceError> {
        self.session.require_identity()?;
        self.existing::<T>(id)?;
        bounded(self.config.request_timeout, self.remote.delete::<T>(id)).await?;
        debug!(kind = %T::KIND, id = %id, "record deleted");
        T::select_mut(&mut self.stores)
            .remove(id)
            .ok_or_else(|| not_found::<T>(id))
    }

    fn existing<T: Entity>(&self, id: &RecordId) -> Result<T, FinanceError> {
        T::select(&self.stores)
            .get(id)
            .cloned()
            .ok_or_else(|| not_found::<T>(id))
    }

    fn absorb<T: Entity>(&mut self, result: Result<Vec<T>, FinanceError>, report: &mut LoadReport) {
        match result {
            Ok(mut records) => {
                for record in records.iter_mut().filter(|r| r.id().is_blank()) {
                    record.set_id(self.ids.next_id());
                }
                debug!(kind = %T::KIND, count = records.len(), "store loaded");
                report.loaded.push((T::KIND, records.len()));
                T::select_mut(&mut self.stores).replace_all(records);
            }
            Err(err) => {
                warn!(kind = %T::KIND, code = err.code(), error = %err, "load failed, keeping previous contents");
                self.notifications.surface(&err);
                report.failed.push((T::KIND, err));
            }
        }
    }

    fn apply_transition(&mut self, transition: &Transition) {
        match transition {
            Transition::SignedIn(identity) => info!(%identity, "signed in"),
            Transition::Switched { from, to } => info!(%from, %to, "switched identity"),
            Transition::SignedOut(identity) => info!(%identity, "signed out"),
            Transition::Unchanged(_) | Transition::AlreadyAnonymous => {}
        }
        if transition.clears_stores() {
            self.stores.clear_all();
        }
        if matches!(transition, Transition::Switched { .. } | Transition::SignedOut(_)) {
            self.notifications.clear_all();
        }
    }

    async fn persist_identity(&self, identity: Option<&Identity>) {
        if let Some(store) = &self.persistence {
            if let Err(err) = store.save_identity(identity).await {
                warn!(error = %format!("{err:#}"), "could not persist identity");
            }
        }
    }

    fn report<T>(&mut self, result: Result<T, FinanceError>) -> Result<T, FinanceError> {
        if let Err(err) = &result {
            warn!(code = err.code(), error = %err, "operation failed");
            self.notifications.surface(err);
        }
        result
    }
}

fn not_found<T: Entity>(id: &RecordId) -> FinanceError {
    FinanceError::NotFound {
        kind: T::KIND,
        id: id.clone(),
    }
}
