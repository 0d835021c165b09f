use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::Result;
use crate::events::{DomainEvent, EventBus};
use crate::schema::users;
use crate::users::users_model::{NewUser, UpdateUser, User, UserId};
use crate::users::users_traits::UserRepositoryTrait;
use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

pub struct UserRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
    bus: EventBus,
}

impl UserRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle, bus: EventBus) -> Self {
        UserRepository { pool, writer, bus }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    fn get_by_id(&self, user_id: UserId) -> Result<Option<User>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(users::table
            .find(user_id)
            .first::<User>(&mut conn)
            .optional()?)
    }

    fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(users::table
            .filter(users::username.eq(username))
            .first::<User>(&mut conn)
            .optional()?)
    }

    fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(users::table
            .filter(users::email.eq(email))
            .first::<User>(&mut conn)
            .optional()?)
    }

    fn username_exists(&self, username: &str) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;
        Ok(diesel::select(exists(
            users::table.filter(users::username.eq(username)),
        ))
        .get_result(&mut conn)?)
    }

    fn email_exists(&self, email: &str) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;
        Ok(diesel::select(exists(
            users::table.filter(users::email.eq(email)),
        ))
        .get_result(&mut conn)?)
    }

    fn find_by_credentials(&self, username: &str, password_hash: &str) -> Result<Option<User>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(users::table
            .filter(users::username.eq(username))
            .filter(users::password_hash.eq(password_hash))
            .first::<User>(&mut conn)
            .optional()?)
    }

    async fn insert(&self, new_user: NewUser) -> Result<User> {
        let user = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<User> {
                Ok(diesel::insert_into(users::table)
                    .values(&new_user)
                    .returning(User::as_returning())
                    .get_result(conn)?)
            })
            .await?;

        self.bus.publish(DomainEvent::users_changed(user.id));
        Ok(user)
    }

    async fn update(&self, user_id: UserId, update: UpdateUser) -> Result<User> {
        let user = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<User> {
                let updated = diesel::update(users::table.find(user_id))
                    .set(&update)
                    .execute(conn)?;
                if updated == 0 {
                    return Err(crate::errors::Error::NotFound(format!("user {}", user_id)));
                }

                Ok(users::table.find(user_id).first::<User>(conn)?)
            })
            .await?;

        self.bus.publish(DomainEvent::users_changed(user.id));
        Ok(user)
    }
}
