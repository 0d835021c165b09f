use crate::errors::Result;
use crate::users::users_model::{NewUser, UpdateUser, User, UserId};
use async_trait::async_trait;

/// Trait for user repository operations. Unlike the per-user entity
/// repositories, this one is unscoped: registration and login run before
/// any session exists.
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    fn get_by_id(&self, user_id: UserId) -> Result<Option<User>>;
    fn get_by_username(&self, username: &str) -> Result<Option<User>>;
    fn get_by_email(&self, email: &str) -> Result<Option<User>>;
    fn username_exists(&self, username: &str) -> Result<bool>;
    fn email_exists(&self, email: &str) -> Result<bool>;
    fn find_by_credentials(&self, username: &str, password_hash: &str) -> Result<Option<User>>;
    async fn insert(&self, new_user: NewUser) -> Result<User>;
    async fn update(&self, user_id: UserId, update: UpdateUser) -> Result<User>;
}

/// Trait for user service operations
#[async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn register(&self, new_user: NewUser) -> Result<User>;
    fn authenticate(&self, username: &str, password_hash: &str) -> Result<Option<User>>;
    fn get_user(&self, user_id: UserId) -> Result<Option<User>>;
    fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn update_profile(&self, user_id: UserId, update: UpdateUser) -> Result<User>;
}
