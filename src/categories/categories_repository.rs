use crate::categories::categories_model::{Category, NewCategory};
use crate::categories::categories_traits::CategoryRepositoryTrait;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{ConstraintViolation, Error, Result};
use crate::events::{observe, DomainEvent, EventBus};
use crate::schema::categories;
use crate::users::UserId;
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Insertable)]
#[diesel(table_name = crate::schema::categories)]
struct CategoryRow {
    user_id: UserId,
    name: String,
    amount: f64,
}

pub struct CategoryRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
    bus: EventBus,
    user_id: UserId,
}

impl CategoryRepository {
    pub fn for_user(pool: Arc<DbPool>, writer: WriteHandle, bus: EventBus, user_id: UserId) -> Self {
        CategoryRepository {
            pool,
            writer,
            bus,
            user_id,
        }
    }

    fn all_for(pool: &DbPool, user_id: UserId) -> Result<Vec<Category>> {
        let mut conn = get_connection(pool)?;
        Ok(categories::table
            .filter(categories::user_id.eq(user_id))
            .order(categories::name.asc())
            .load::<Category>(&mut conn)?)
    }
}

#[async_trait]
impl CategoryRepositoryTrait for CategoryRepository {
    fn get_all(&self) -> Result<Vec<Category>> {
        Self::all_for(&self.pool, self.user_id)
    }

    fn get_by_name(&self, name: &str) -> Result<Option<Category>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(categories::table
            .filter(categories::user_id.eq(self.user_id))
            .filter(categories::name.eq(name))
            .first::<Category>(&mut conn)
            .optional()?)
    }

    async fn insert(&self, new_category: NewCategory) -> Result<Category> {
        let user_id = self.user_id;
        let category = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Category> {
                // Pre-check inside the write transaction; the unique index
                // on (user_id, name) is the backstop under races.
                let existing: Option<Category> = categories::table
                    .filter(categories::user_id.eq(user_id))
                    .filter(categories::name.eq(&new_category.name))
                    .first::<Category>(conn)
                    .optional()?;

                if existing.is_some() {
                    return Err(Error::Constraint(ConstraintViolation::DuplicateCategory(
                        new_category.name,
                    )));
                }

                let row = CategoryRow {
                    user_id,
                    name: new_category.name,
                    amount: new_category.amount,
                };

                Ok(diesel::insert_into(categories::table)
                    .values(&row)
                    .returning(Category::as_returning())
                    .get_result(conn)?)
            })
            .await?;

        self.bus.publish(DomainEvent::categories_changed(user_id));
        Ok(category)
    }

    async fn update_amount(&self, id: i32, amount: f64) -> Result<Category> {
        let user_id = self.user_id;
        let category = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Category> {
                let updated = diesel::update(
                    categories::table
                        .find(id)
                        .filter(categories::user_id.eq(user_id)),
                )
                .set(categories::amount.eq(amount))
                .execute(conn)?;

                if updated == 0 {
                    return Err(Error::NotFound(format!("category {}", id)));
                }

                Ok(categories::table.find(id).first::<Category>(conn)?)
            })
            .await?;

        self.bus.publish(DomainEvent::categories_changed(user_id));
        Ok(category)
    }

    async fn delete_by_name(&self, name: &str) -> Result<usize> {
        let user_id = self.user_id;
        let name_owned = name.to_string();
        let deleted = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(
                    categories::table
                        .filter(categories::user_id.eq(user_id))
                        .filter(categories::name.eq(name_owned)),
                )
                .execute(conn)?)
            })
            .await?;

        self.bus.publish(DomainEvent::categories_changed(user_id));
        Ok(deleted)
    }

    async fn delete_all(&self) -> Result<usize> {
        let user_id = self.user_id;
        let deleted = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(
                    diesel::delete(categories::table.filter(categories::user_id.eq(user_id)))
                        .execute(conn)?,
                )
            })
            .await?;

        self.bus.publish(DomainEvent::categories_changed(user_id));
        Ok(deleted)
    }

    fn observe_all(&self) -> watch::Receiver<Vec<Category>> {
        let pool = self.pool.clone();
        let user_id = self.user_id;
        observe(
            &self.bus,
            Vec::new(),
            move |event| matches!(event, DomainEvent::CategoriesChanged { user_id: uid } if *uid == user_id),
            move || Self::all_for(&pool, user_id),
        )
    }
}
