use crate::categories::categories_model::{Category, NewCategory};
use crate::categories::categories_traits::{CategoryRepositoryTrait, CategoryServiceTrait};
use crate::errors::{Result, ValidationError};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

pub struct CategoryService {
    repository: Arc<dyn CategoryRepositoryTrait>,
}

impl CategoryService {
    pub fn new(repository: Arc<dyn CategoryRepositoryTrait>) -> Self {
        CategoryService { repository }
    }
}

#[async_trait]
impl CategoryServiceTrait for CategoryService {
    fn get_categories(&self) -> Result<Vec<Category>> {
        self.repository.get_all()
    }

    async fn create_category(&self, name: String, amount: f64) -> Result<Category> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        if !amount.is_finite() || amount < 0.0 {
            return Err(
                ValidationError::InvalidInput(format!("invalid category amount {}", amount)).into(),
            );
        }

        self.repository.insert(NewCategory { name, amount }).await
    }

    async fn set_category_amount(&self, id: i32, amount: f64) -> Result<Category> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(
                ValidationError::InvalidInput(format!("invalid category amount {}", amount)).into(),
            );
        }
        self.repository.update_amount(id, amount).await
    }

    async fn delete_category(&self, name: &str) -> Result<usize> {
        self.repository.delete_by_name(name).await
    }

    async fn clear_categories(&self) -> Result<usize> {
        self.repository.delete_all().await
    }

    fn observe_categories(&self) -> watch::Receiver<Vec<Category>> {
        self.repository.observe_all()
    }
}
