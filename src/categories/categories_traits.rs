use crate::categories::categories_model::{Category, NewCategory};
use crate::errors::Result;
use async_trait::async_trait;
use tokio::sync::watch;

/// Trait for category repository operations, scoped to one user.
#[async_trait]
pub trait CategoryRepositoryTrait: Send + Sync {
    fn get_all(&self) -> Result<Vec<Category>>;
    fn get_by_name(&self, name: &str) -> Result<Option<Category>>;

    /// Inserts a category; duplicates of `(user, name)` fail with
    /// `DuplicateCategory` and leave the store unchanged.
    async fn insert(&self, new_category: NewCategory) -> Result<Category>;

    /// Replaces the budgeted amount of the row matched by id.
    async fn update_amount(&self, id: i32, amount: f64) -> Result<Category>;

    /// Removes every row sharing the given name for the scoped user.
    async fn delete_by_name(&self, name: &str) -> Result<usize>;

    async fn delete_all(&self) -> Result<usize>;

    /// Live view of the user's categories, ordered by name.
    fn observe_all(&self) -> watch::Receiver<Vec<Category>>;
}

/// Trait for category service operations
#[async_trait]
pub trait CategoryServiceTrait: Send + Sync {
    fn get_categories(&self) -> Result<Vec<Category>>;
    async fn create_category(&self, name: String, amount: f64) -> Result<Category>;
    async fn set_category_amount(&self, id: i32, amount: f64) -> Result<Category>;
    async fn delete_category(&self, name: &str) -> Result<usize>;
    async fn clear_categories(&self) -> Result<usize>;
    fn observe_categories(&self) -> watch::Receiver<Vec<Category>>;
}
