use chrono::NaiveDateTime;
use diesel::prelude::*;
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};
use crate::users::UserId;

/// Supported budgeting periods.
pub struct BudgetType;

impl BudgetType {
    pub const MONTHLY: &'static str = "Monthly";
    pub const WEEKLY: &'static str = "Weekly";

    pub fn is_valid(value: &str) -> bool {
        value == Self::MONTHLY || value == Self::WEEKLY
    }
}

/// One budget row. Budgets are append-only history; the "current" budget
/// for a user is the most recently created row.
#[derive(
    Queryable, Identifiable, AsChangeset, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::budgets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: i32,
    pub user_id: UserId,
    pub budget_type: String,
    pub amount: f64,
    pub min_goal: f64,
    pub max_goal: f64,
    pub created_at: NaiveDateTime,
}

impl Budget {
    pub fn amount_decimal(&self) -> Decimal {
        Decimal::from_f64(self.amount).unwrap_or(Decimal::ZERO)
    }
}

/// Input for recording a budget
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewBudget {
    pub budget_type: String,
    pub amount: f64,
    pub min_goal: f64,
    pub max_goal: f64,
}

impl NewBudget {
    pub fn validate(&self) -> Result<()> {
        if !BudgetType::is_valid(&self.budget_type) {
            return Err(ValidationError::InvalidInput(format!(
                "unknown budget type '{}'",
                self.budget_type
            ))
            .into());
        }
        Ok(())
    }
}
