use crate::budgets::budgets_model::{Budget, NewBudget};
use crate::errors::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::watch;

/// Trait for budget repository operations. Implementations are bound to
/// one user; every query and mutation is scoped to that user's rows.
#[async_trait]
pub trait BudgetRepositoryTrait: Send + Sync {
    /// The most recently created budget, if any.
    fn get_latest(&self) -> Result<Option<Budget>>;

    /// Budget history created at or after `from`, oldest first.
    fn get_since(&self, from: NaiveDateTime) -> Result<Vec<Budget>>;

    /// Appends a budget row. Budgets are history, not upserts.
    async fn insert(&self, new_budget: NewBudget) -> Result<Budget>;

    /// Removes every budget row for the scoped user.
    async fn delete_all(&self) -> Result<usize>;

    /// Live view of the latest budget: emits the current value promptly
    /// after subscription and after every budget write for this user.
    fn observe_latest(&self) -> watch::Receiver<Option<Budget>>;
}

/// Trait for budget service operations
#[async_trait]
pub trait BudgetServiceTrait: Send + Sync {
    fn get_current_budget(&self) -> Result<Option<Budget>>;
    fn get_budgets_since(&self, from: NaiveDateTime) -> Result<Vec<Budget>>;
    async fn record_budget(&self, new_budget: NewBudget) -> Result<Budget>;
    async fn clear_budgets(&self) -> Result<usize>;
    fn observe_current_budget(&self) -> watch::Receiver<Option<Budget>>;
}
