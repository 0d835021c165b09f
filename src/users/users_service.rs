use crate::errors::{ConstraintViolation, Result, ValidationError};
use crate::users::users_model::{NewUser, UpdateUser, User, UserId};
use crate::users::users_traits::{UserRepositoryTrait, UserServiceTrait};
use async_trait::async_trait;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use std::sync::Arc;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

pub struct UserService {
    repository: Arc<dyn UserRepositoryTrait>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepositoryTrait>) -> Self {
        UserService { repository }
    }

    fn validate_registration(new_user: &NewUser) -> Result<()> {
        let required = [
            ("fullName", &new_user.full_name),
            ("surname", &new_user.surname),
            ("username", &new_user.username),
            ("email", &new_user.email),
            ("passwordHash", &new_user.password_hash),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField(field.to_string()).into());
            }
        }

        if !EMAIL_RE.is_match(&new_user.email) {
            return Err(
                ValidationError::InvalidInput(format!("invalid email '{}'", new_user.email)).into(),
            );
        }

        Ok(())
    }
}

#[async_trait]
impl UserServiceTrait for UserService {
    async fn register(&self, new_user: NewUser) -> Result<User> {
        Self::validate_registration(&new_user)?;

        if self.repository.username_exists(&new_user.username)? {
            return Err(ConstraintViolation::DuplicateUsername(new_user.username).into());
        }
        if self.repository.email_exists(&new_user.email)? {
            return Err(ConstraintViolation::DuplicateEmail(new_user.email).into());
        }

        let user = self.repository.insert(new_user).await?;
        debug!("Registered user {}", user.id);
        Ok(user)
    }

    fn authenticate(&self, username: &str, password_hash: &str) -> Result<Option<User>> {
        self.repository.find_by_credentials(username, password_hash)
    }

    fn get_user(&self, user_id: UserId) -> Result<Option<User>> {
        self.repository.get_by_id(user_id)
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.repository.get_by_username(username)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.repository.get_by_email(email)
    }

    async fn update_profile(&self, user_id: UserId, update: UpdateUser) -> Result<User> {
        if let Some(ref username) = update.username {
            if let Some(existing) = self.repository.get_by_username(username)? {
                if existing.id != user_id {
                    return Err(ConstraintViolation::DuplicateUsername(username.clone()).into());
                }
            }
        }
        if let Some(ref email) = update.email {
            if let Some(existing) = self.repository.get_by_email(email)? {
                if existing.id != user_id {
                    return Err(ConstraintViolation::DuplicateEmail(email.clone()).into());
                }
            }
        }

        self.repository.update(user_id, update).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> NewUser {
        NewUser {
            full_name: "Ada".to_string(),
            surname: "Lovelace".to_string(),
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "2f7a...".to_string(),
        }
    }

    #[test]
    fn test_validate_registration_accepts_complete_input() {
        assert!(UserService::validate_registration(&sample_user()).is_ok());
    }

    #[test]
    fn test_validate_registration_rejects_blank_fields() {
        let mut user = sample_user();
        user.surname = "  ".to_string();
        assert!(UserService::validate_registration(&user).is_err());
    }

    #[test]
    fn test_validate_registration_rejects_malformed_email() {
        let mut user = sample_user();
        user.email = "not-an-email".to_string();
        assert!(UserService::validate_registration(&user).is_err());
    }
}
