use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Opaque row identifier shared by every entity kind.
pub type UserId = i32;

/// Registered user. The password hash is opaque to this layer; hashing
/// happens in the credential flow that sits in front of the core.
#[derive(
    Queryable, Identifiable, AsChangeset, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub surname: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Input for registering a new user
#[derive(Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub full_name: String,
    pub surname: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Partial profile update; absent fields keep their current value.
#[derive(AsChangeset, Serialize, Deserialize, Debug, Clone, Default)]
#[diesel(table_name = crate::schema::users)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub full_name: Option<String>,
    pub surname: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}
