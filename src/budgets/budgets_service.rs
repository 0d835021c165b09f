use crate::budgets::budgets_model::{Budget, NewBudget};
use crate::budgets::budgets_traits::{BudgetRepositoryTrait, BudgetServiceTrait};
use crate::errors::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use log::warn;
use std::sync::Arc;
use tokio::sync::watch;

pub struct BudgetService {
    repository: Arc<dyn BudgetRepositoryTrait>,
}

impl BudgetService {
    pub fn new(repository: Arc<dyn BudgetRepositoryTrait>) -> Self {
        BudgetService { repository }
    }
}

#[async_trait]
impl BudgetServiceTrait for BudgetService {
    fn get_current_budget(&self) -> Result<Option<Budget>> {
        self.repository.get_latest()
    }

    fn get_budgets_since(&self, from: NaiveDateTime) -> Result<Vec<Budget>> {
        self.repository.get_since(from)
    }

    async fn record_budget(&self, new_budget: NewBudget) -> Result<Budget> {
        new_budget.validate()?;

        // The goal range is expected to be ordered but the store does not
        // enforce it; surface the anomaly without rejecting the write.
        if new_budget.min_goal > new_budget.max_goal {
            warn!(
                "Budget goals out of order: min {} > max {}",
                new_budget.min_goal, new_budget.max_goal
            );
        }

        self.repository.insert(new_budget).await
    }

    async fn clear_budgets(&self) -> Result<usize> {
        self.repository.delete_all().await
    }

    fn observe_current_budget(&self) -> watch::Receiver<Option<Budget>> {
        self.repository.observe_latest()
    }
}
