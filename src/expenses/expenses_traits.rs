use crate::errors::Result;
use crate::expenses::expenses_model::{Expense, NewExpense};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::watch;

/// Trait for expense repository operations, scoped to one user.
#[async_trait]
pub trait ExpenseRepositoryTrait: Send + Sync {
    fn get_all(&self) -> Result<Vec<Expense>>;

    /// The most recent expenses by date, newest first.
    fn get_recent(&self) -> Result<Vec<Expense>>;

    fn get_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Expense>>;
    fn get_by_category(&self, category: &str) -> Result<Vec<Expense>>;
    fn get_between_for_category(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        category: &str,
    ) -> Result<Vec<Expense>>;

    /// Category names as recorded on expenses, including orphans.
    fn distinct_category_names(&self) -> Result<Vec<String>>;

    fn get_total_spent(&self) -> Result<Decimal>;
    fn get_total_spent_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Decimal>;

    async fn insert(&self, new_expense: NewExpense) -> Result<Expense>;
    async fn delete_all(&self) -> Result<usize>;

    /// Live running total of the user's spending.
    fn observe_total(&self) -> watch::Receiver<Decimal>;

    /// Live view of the full expense list, newest first.
    fn observe_all(&self) -> watch::Receiver<Vec<Expense>>;

    /// Live view of the recent-expenses list.
    fn observe_recent(&self) -> watch::Receiver<Vec<Expense>>;
}

/// Trait for expense service operations
#[async_trait]
pub trait ExpenseServiceTrait: Send + Sync {
    async fn record_expense(&self, new_expense: NewExpense) -> Result<Expense>;
    fn get_expenses(&self) -> Result<Vec<Expense>>;
    fn get_recent_expenses(&self) -> Result<Vec<Expense>>;
    fn get_expenses_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Expense>>;
    fn get_expenses_for_category(&self, category: &str) -> Result<Vec<Expense>>;
    fn get_expenses_between_for_category(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        category: &str,
    ) -> Result<Vec<Expense>>;
    /// Category names as recorded on expenses, including orphans.
    fn get_category_names(&self) -> Result<Vec<String>>;
    fn get_total_spent(&self) -> Result<Decimal>;
    fn get_total_spent_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Decimal>;
    fn get_category_totals(&self) -> Result<HashMap<String, Decimal>>;
    fn get_category_totals_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HashMap<String, Decimal>>;
    async fn clear_expenses(&self) -> Result<usize>;
    fn observe_total_spent(&self) -> watch::Receiver<Decimal>;
    fn observe_expenses(&self) -> watch::Receiver<Vec<Expense>>;
    fn observe_recent_expenses(&self) -> watch::Receiver<Vec<Expense>>;
}
