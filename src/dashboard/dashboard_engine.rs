use log::debug;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::budgets::{Budget, BudgetRepositoryTrait, NewBudget};
use crate::dashboard::dashboard_model::{BudgetView, EngineSources, GoalBarPosition};
use crate::errors::{Result, SessionError};
use crate::expenses::{Expense, ExpenseRepositoryTrait};
use crate::users::UserId;

/// Combines one user's budget and expense streams into a live
/// [`BudgetView`].
///
/// Every emission from any source triggers a full recompute from the
/// most recently observed value of every other source; nothing blocks
/// waiting for the sources to line up. The worker is torn down as a unit
/// when the engine is dropped (or `shutdown` is called), so a recompute
/// in flight at teardown is never delivered.
pub struct BudgetViewEngine {
    user_id: UserId,
    budget_repository: Arc<dyn BudgetRepositoryTrait>,
    view_rx: watch::Receiver<BudgetView>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl BudgetViewEngine {
    /// Builds the engine for one session and starts its worker.
    ///
    /// Fails fast with a session error for an invalid user id instead of
    /// silently aggregating unscoped data. Must run inside a Tokio
    /// runtime.
    pub fn new(
        user_id: UserId,
        budget_repository: Arc<dyn BudgetRepositoryTrait>,
        expense_repository: Arc<dyn ExpenseRepositoryTrait>,
    ) -> Result<Self> {
        if user_id <= 0 {
            return Err(SessionError::InvalidUser(user_id).into());
        }

        let (view_tx, view_rx) = watch::channel(BudgetView::default());

        let budget_rx = budget_repository.observe_latest();
        let total_rx = expense_repository.observe_total();
        let expenses_rx = expense_repository.observe_all();

        let worker = tokio::spawn(run_engine(
            user_id,
            budget_rx,
            total_rx,
            expenses_rx,
            view_tx,
        ));

        Ok(BudgetViewEngine {
            user_id,
            budget_repository,
            view_rx,
            worker: Mutex::new(Some(worker)),
        })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Stream of derived views; the receiver always holds the most
    /// recently published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<BudgetView> {
        self.view_rx.clone()
    }

    pub fn current_view(&self) -> BudgetView {
        self.view_rx.borrow().clone()
    }

    pub fn current_budget(&self) -> Option<Budget> {
        self.view_rx.borrow().current_budget.clone()
    }

    pub fn total_spent(&self) -> Decimal {
        self.view_rx.borrow().total_spent
    }

    pub fn progress_percentage(&self) -> i32 {
        self.view_rx.borrow().progress_percentage
    }

    pub fn remaining(&self) -> Option<Decimal> {
        self.view_rx.borrow().remaining
    }

    pub fn category_breakdown(&self) -> HashMap<String, Decimal> {
        self.view_rx.borrow().category_breakdown.clone()
    }

    pub fn goal_bar(&self) -> Option<GoalBarPosition> {
        self.view_rx.borrow().goal_bar
    }

    /// Appends a budget row for the session user. The store notification
    /// feeds the recompute; budgets are history, so the new row becomes
    /// the current budget.
    pub async fn record_budget(&self, new_budget: NewBudget) -> Result<Budget> {
        new_budget.validate()?;
        self.budget_repository.insert(new_budget).await
    }

    /// Stops the worker and releases the session's subscriptions.
    pub fn shutdown(&self) {
        if let Some(worker) = self.worker.lock().unwrap().take() {
            worker.abort();
            debug!("Budget view engine for user {} shut down", self.user_id);
        }
    }
}

impl Drop for BudgetViewEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn run_engine(
    user_id: UserId,
    mut budget_rx: watch::Receiver<Option<Budget>>,
    mut total_rx: watch::Receiver<Decimal>,
    mut expenses_rx: watch::Receiver<Vec<Expense>>,
    view_tx: watch::Sender<BudgetView>,
) {
    let mut sources = EngineSources::default();

    loop {
        tokio::select! {
            changed = budget_rx.changed() => match changed {
                Ok(()) => sources.budget = Some(budget_rx.borrow_and_update().clone()),
                Err(_) => break,
            },
            changed = total_rx.changed() => match changed {
                Ok(()) => sources.total_spent = Some(*total_rx.borrow_and_update()),
                Err(_) => break,
            },
            changed = expenses_rx.changed() => match changed {
                Ok(()) => sources.expenses = Some(expenses_rx.borrow_and_update().clone()),
                Err(_) => break,
            },
        }

        // The engine keeps its own receiver, so publishing cannot fail
        // while the engine is alive.
        let _ = view_tx.send(sources.recompute());
    }

    debug!("Budget view worker for user {} stopped", user_id);
}
