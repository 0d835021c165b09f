use crate::categories::CategoryRepositoryTrait;
use crate::errors::{Result, ValidationError};
use crate::expenses::expenses_model::{category_breakdown, Expense, NewExpense};
use crate::expenses::expenses_traits::{ExpenseRepositoryTrait, ExpenseServiceTrait};
use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;

pub struct ExpenseService {
    repository: Arc<dyn ExpenseRepositoryTrait>,
    category_repository: Arc<dyn CategoryRepositoryTrait>,
}

impl ExpenseService {
    pub fn new(
        repository: Arc<dyn ExpenseRepositoryTrait>,
        category_repository: Arc<dyn CategoryRepositoryTrait>,
    ) -> Self {
        ExpenseService {
            repository,
            category_repository,
        }
    }

    fn validate(new_expense: &NewExpense) -> Result<()> {
        if new_expense.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        if new_expense.category.trim().is_empty() {
            return Err(ValidationError::MissingField("category".to_string()).into());
        }
        if !new_expense.amount.is_finite() || new_expense.amount < 0.0 {
            return Err(ValidationError::InvalidInput(format!(
                "invalid expense amount {}",
                new_expense.amount
            ))
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl ExpenseServiceTrait for ExpenseService {
    async fn record_expense(&self, new_expense: NewExpense) -> Result<Expense> {
        Self::validate(&new_expense)?;

        // Resolve the stable category reference; an unmatched name is kept
        // as-is and the expense stays an orphan of that name.
        let mut expense = new_expense;
        if expense.category_id.is_none() {
            match self.category_repository.get_by_name(&expense.category)? {
                Some(category) => expense.category_id = Some(category.id),
                None => debug!("Expense references unknown category '{}'", expense.category),
            }
        }

        self.repository.insert(expense).await
    }

    fn get_expenses(&self) -> Result<Vec<Expense>> {
        self.repository.get_all()
    }

    fn get_recent_expenses(&self) -> Result<Vec<Expense>> {
        self.repository.get_recent()
    }

    fn get_expenses_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Expense>> {
        self.repository.get_between(start, end)
    }

    fn get_expenses_for_category(&self, category: &str) -> Result<Vec<Expense>> {
        self.repository.get_by_category(category)
    }

    fn get_expenses_between_for_category(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        category: &str,
    ) -> Result<Vec<Expense>> {
        self.repository.get_between_for_category(start, end, category)
    }

    fn get_category_names(&self) -> Result<Vec<String>> {
        self.repository.distinct_category_names()
    }

    fn get_total_spent(&self) -> Result<Decimal> {
        self.repository.get_total_spent()
    }

    fn get_total_spent_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Decimal> {
        self.repository.get_total_spent_between(start, end)
    }

    fn get_category_totals(&self) -> Result<HashMap<String, Decimal>> {
        let expenses = self.repository.get_all()?;
        Ok(category_breakdown(&expenses))
    }

    fn get_category_totals_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HashMap<String, Decimal>> {
        let expenses = self.repository.get_between(start, end)?;
        Ok(category_breakdown(&expenses))
    }

    async fn clear_expenses(&self) -> Result<usize> {
        self.repository.delete_all().await
    }

    fn observe_total_spent(&self) -> watch::Receiver<Decimal> {
        self.repository.observe_total()
    }

    fn observe_expenses(&self) -> watch::Receiver<Vec<Expense>> {
        self.repository.observe_all()
    }

    fn observe_recent_expenses(&self) -> watch::Receiver<Vec<Expense>> {
        self.repository.observe_recent()
    }
}
