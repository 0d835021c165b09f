use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::users::UserId;

/// Spending category with its budgeted amount. `(user_id, name)` is
/// unique; the store enforces it with a unique index and the repository
/// pre-checks it to surface a typed error.
#[derive(
    Queryable, Identifiable, AsChangeset, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::categories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i32,
    pub user_id: UserId,
    pub name: String,
    pub amount: f64,
}

/// Input for creating a category
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    pub amount: f64,
}
