use crate::budgets::budgets_model::{Budget, NewBudget};
use crate::budgets::budgets_traits::BudgetRepositoryTrait;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::Result;
use crate::events::{observe, DomainEvent, EventBus};
use crate::schema::budgets;
use crate::users::UserId;
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Insertable)]
#[diesel(table_name = crate::schema::budgets)]
struct BudgetRow {
    user_id: UserId,
    budget_type: String,
    amount: f64,
    min_goal: f64,
    max_goal: f64,
    created_at: NaiveDateTime,
}

pub struct BudgetRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
    bus: EventBus,
    user_id: UserId,
}

impl BudgetRepository {
    /// Builds a repository bound to `user_id`; every operation is scoped
    /// to that user's rows.
    pub fn for_user(pool: Arc<DbPool>, writer: WriteHandle, bus: EventBus, user_id: UserId) -> Self {
        BudgetRepository {
            pool,
            writer,
            bus,
            user_id,
        }
    }

    fn latest_for(pool: &DbPool, user_id: UserId) -> Result<Option<Budget>> {
        let mut conn = get_connection(pool)?;
        Ok(budgets::table
            .filter(budgets::user_id.eq(user_id))
            .order(budgets::id.desc())
            .first::<Budget>(&mut conn)
            .optional()?)
    }
}

#[async_trait]
impl BudgetRepositoryTrait for BudgetRepository {
    fn get_latest(&self) -> Result<Option<Budget>> {
        Self::latest_for(&self.pool, self.user_id)
    }

    fn get_since(&self, from: NaiveDateTime) -> Result<Vec<Budget>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(budgets::table
            .filter(budgets::user_id.eq(self.user_id))
            .filter(budgets::created_at.ge(from))
            .order(budgets::created_at.asc())
            .load::<Budget>(&mut conn)?)
    }

    async fn insert(&self, new_budget: NewBudget) -> Result<Budget> {
        let user_id = self.user_id;
        let budget = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Budget> {
                let row = BudgetRow {
                    user_id,
                    budget_type: new_budget.budget_type,
                    amount: new_budget.amount,
                    min_goal: new_budget.min_goal,
                    max_goal: new_budget.max_goal,
                    created_at: Utc::now().naive_utc(),
                };

                Ok(diesel::insert_into(budgets::table)
                    .values(&row)
                    .returning(Budget::as_returning())
                    .get_result(conn)?)
            })
            .await?;

        self.bus.publish(DomainEvent::budgets_changed(user_id));
        Ok(budget)
    }

    async fn delete_all(&self) -> Result<usize> {
        let user_id = self.user_id;
        let deleted = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(
                    diesel::delete(budgets::table.filter(budgets::user_id.eq(user_id)))
                        .execute(conn)?,
                )
            })
            .await?;

        self.bus.publish(DomainEvent::budgets_changed(user_id));
        Ok(deleted)
    }

    fn observe_latest(&self) -> watch::Receiver<Option<Budget>> {
        let pool = self.pool.clone();
        let user_id = self.user_id;
        observe(
            &self.bus,
            None,
            move |event| matches!(event, DomainEvent::BudgetsChanged { user_id: uid } if *uid == user_id),
            move || Self::latest_for(&pool, user_id),
        )
    }
}
