use crate::constants::SESSION_USER_KEY;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::Result;
use crate::schema::app_settings;
use crate::users::UserId;
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::warn;
use std::sync::Arc;

/// Durable key-value holder of the active user id.
///
/// The id survives restarts; the factory reads it at startup to decide
/// between rebuilding a session and redirecting to the login flow.
#[async_trait]
pub trait SessionStore: Send + Sync {
    fn current_user_id(&self) -> Result<Option<UserId>>;
    async fn set_current_user(&self, user_id: UserId) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::app_settings)]
struct SettingRow {
    setting_key: String,
    setting_value: String,
}

pub struct DbSessionStore {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl DbSessionStore {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        DbSessionStore { pool, writer }
    }
}

#[async_trait]
impl SessionStore for DbSessionStore {
    fn current_user_id(&self) -> Result<Option<UserId>> {
        let mut conn = get_connection(&self.pool)?;
        let value: Option<String> = app_settings::table
            .find(SESSION_USER_KEY)
            .select(app_settings::setting_value)
            .first::<String>(&mut conn)
            .optional()?;

        match value {
            Some(raw) => match raw.parse::<UserId>() {
                Ok(user_id) => Ok(Some(user_id)),
                Err(_) => {
                    warn!("Stored session user id '{}' is not a valid id", raw);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn set_current_user(&self, user_id: UserId) -> Result<()> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let row = SettingRow {
                    setting_key: SESSION_USER_KEY.to_string(),
                    setting_value: user_id.to_string(),
                };
                diesel::replace_into(app_settings::table)
                    .values(&row)
                    .execute(conn)?;
                Ok(())
            })
            .await
    }

    async fn clear(&self) -> Result<()> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::delete(app_settings::table.find(SESSION_USER_KEY)).execute(conn)?;
                Ok(())
            })
            .await
    }
}
