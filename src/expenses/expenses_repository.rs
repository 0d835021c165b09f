use crate::constants::RECENT_EXPENSES_LIMIT;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::Result;
use crate::events::{observe, DomainEvent, EventBus};
use crate::expenses::expenses_model::{Expense, NewExpense};
use crate::expenses::expenses_traits::ExpenseRepositoryTrait;
use crate::schema::expenses;
use crate::users::UserId;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use diesel::dsl::sum;
use diesel::prelude::*;
use diesel::SqliteConnection;
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Insertable)]
#[diesel(table_name = crate::schema::expenses)]
struct ExpenseRow {
    user_id: UserId,
    name: String,
    category_id: Option<i32>,
    category: String,
    amount: f64,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    image_ref: Option<String>,
}

pub struct ExpenseRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
    bus: EventBus,
    user_id: UserId,
}

impl ExpenseRepository {
    pub fn for_user(pool: Arc<DbPool>, writer: WriteHandle, bus: EventBus, user_id: UserId) -> Self {
        ExpenseRepository {
            pool,
            writer,
            bus,
            user_id,
        }
    }

    fn all_for(pool: &DbPool, user_id: UserId) -> Result<Vec<Expense>> {
        let mut conn = get_connection(pool)?;
        Ok(expenses::table
            .filter(expenses::user_id.eq(user_id))
            .order((expenses::date.desc(), expenses::id.desc()))
            .load::<Expense>(&mut conn)?)
    }

    fn recent_for(pool: &DbPool, user_id: UserId) -> Result<Vec<Expense>> {
        let mut conn = get_connection(pool)?;
        Ok(expenses::table
            .filter(expenses::user_id.eq(user_id))
            .order((expenses::date.desc(), expenses::id.desc()))
            .limit(RECENT_EXPENSES_LIMIT)
            .load::<Expense>(&mut conn)?)
    }

    fn total_for(pool: &DbPool, user_id: UserId) -> Result<Decimal> {
        let mut conn = get_connection(pool)?;
        let total: Option<f64> = expenses::table
            .filter(expenses::user_id.eq(user_id))
            .select(sum(expenses::amount))
            .first(&mut conn)?;
        Ok(total.and_then(Decimal::from_f64).unwrap_or(Decimal::ZERO))
    }
}

#[async_trait]
impl ExpenseRepositoryTrait for ExpenseRepository {
    fn get_all(&self) -> Result<Vec<Expense>> {
        Self::all_for(&self.pool, self.user_id)
    }

    fn get_recent(&self) -> Result<Vec<Expense>> {
        Self::recent_for(&self.pool, self.user_id)
    }

    fn get_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Expense>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(expenses::table
            .filter(expenses::user_id.eq(self.user_id))
            .filter(expenses::date.between(start, end))
            .order(expenses::date.asc())
            .load::<Expense>(&mut conn)?)
    }

    fn get_by_category(&self, category: &str) -> Result<Vec<Expense>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(expenses::table
            .filter(expenses::user_id.eq(self.user_id))
            .filter(expenses::category.eq(category))
            .order(expenses::date.desc())
            .load::<Expense>(&mut conn)?)
    }

    fn get_between_for_category(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        category: &str,
    ) -> Result<Vec<Expense>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(expenses::table
            .filter(expenses::user_id.eq(self.user_id))
            .filter(expenses::date.between(start, end))
            .filter(expenses::category.eq(category))
            .order(expenses::date.asc())
            .load::<Expense>(&mut conn)?)
    }

    fn distinct_category_names(&self) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(expenses::table
            .filter(expenses::user_id.eq(self.user_id))
            .select(expenses::category)
            .distinct()
            .load::<String>(&mut conn)?)
    }

    fn get_total_spent(&self) -> Result<Decimal> {
        Self::total_for(&self.pool, self.user_id)
    }

    fn get_total_spent_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Decimal> {
        let mut conn = get_connection(&self.pool)?;
        let total: Option<f64> = expenses::table
            .filter(expenses::user_id.eq(self.user_id))
            .filter(expenses::date.between(start, end))
            .select(sum(expenses::amount))
            .first(&mut conn)?;
        Ok(total.and_then(Decimal::from_f64).unwrap_or(Decimal::ZERO))
    }

    async fn insert(&self, new_expense: NewExpense) -> Result<Expense> {
        let user_id = self.user_id;
        let expense = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Expense> {
                let row = ExpenseRow {
                    user_id,
                    name: new_expense.name,
                    category_id: new_expense.category_id,
                    category: new_expense.category,
                    amount: new_expense.amount,
                    date: new_expense.date,
                    start_time: new_expense.start_time,
                    end_time: new_expense.end_time,
                    image_ref: new_expense.image_ref,
                };

                Ok(diesel::insert_into(expenses::table)
                    .values(&row)
                    .returning(Expense::as_returning())
                    .get_result(conn)?)
            })
            .await?;

        self.bus.publish(DomainEvent::expenses_changed(user_id));
        Ok(expense)
    }

    async fn delete_all(&self) -> Result<usize> {
        let user_id = self.user_id;
        let deleted = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(
                    diesel::delete(expenses::table.filter(expenses::user_id.eq(user_id)))
                        .execute(conn)?,
                )
            })
            .await?;

        self.bus.publish(DomainEvent::expenses_changed(user_id));
        Ok(deleted)
    }

    fn observe_total(&self) -> watch::Receiver<Decimal> {
        let pool = self.pool.clone();
        let user_id = self.user_id;
        observe(
            &self.bus,
            Decimal::ZERO,
            move |event| matches!(event, DomainEvent::ExpensesChanged { user_id: uid } if *uid == user_id),
            move || Self::total_for(&pool, user_id),
        )
    }

    fn observe_all(&self) -> watch::Receiver<Vec<Expense>> {
        let pool = self.pool.clone();
        let user_id = self.user_id;
        observe(
            &self.bus,
            Vec::new(),
            move |event| matches!(event, DomainEvent::ExpensesChanged { user_id: uid } if *uid == user_id),
            move || Self::all_for(&pool, user_id),
        )
    }

    fn observe_recent(&self) -> watch::Receiver<Vec<Expense>> {
        let pool = self.pool.clone();
        let user_id = self.user_id;
        observe(
            &self.bus,
            Vec::new(),
            move |event| matches!(event, DomainEvent::ExpensesChanged { user_id: uid } if *uid == user_id),
            move || Self::recent_for(&pool, user_id),
        )
    }
}
