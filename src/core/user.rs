//! User account operations - registration, lookups, search and deletion.
//!
//! Registration writes the user and an empty profile in one transaction. Deleting a
//! user relies on the `ON DELETE CASCADE` rules declared by every dependent entity.

use crate::{
    entities::{User, profile, user},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use email_address::EmailAddress;
use sea_orm::{Condition, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, warn};

/// Fields supplied at registration.
///
/// The password must already be hashed by the authentication service.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    /// Given name
    pub name: Option<String>,
    /// Family name
    pub surname: Option<String>,
    /// Login email, trimmed before storing
    pub email: String,
    /// Hash of the chosen password
    pub password_hash: String,
    /// Date of birth
    pub birth_date: Option<NaiveDate>,
    /// Self-described gender
    pub gender: Option<String>,
    /// Preferred art discipline
    pub preferred_art_type: Option<String>,
    /// Contact phone number
    pub phone: Option<String>,
    /// Public handle, not unique
    pub username: Option<String>,
}

/// Loads a user or fails with [`Error::UserNotFound`].
///
/// Generic over the connection so it can run inside a transaction.
pub(crate) async fn require_user<C>(db: &C, user_id: i32) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })
}

/// Registers a new account together with its (empty) profile.
///
/// The email is trimmed and must be a valid address; the password hash must not be empty.
/// A duplicate email is rejected by the store and surfaces as a unique violation.
pub async fn create_user(db: &DatabaseConnection, new_user: NewUser) -> Result<user::Model> {
    let email = new_user.email.trim().to_string();
    if !EmailAddress::is_valid(&email) {
        return Err(Error::validation(format!("Invalid email address: {email:?}")));
    }

    if new_user.password_hash.is_empty() {
        return Err(Error::validation("Password hash cannot be empty"));
    }

    let txn = db.begin().await?;

    let user = user::ActiveModel {
        name: Set(new_user.name),
        surname: Set(new_user.surname),
        email: Set(email),
        password_hash: Set(new_user.password_hash),
        birth_date: Set(new_user.birth_date),
        gender: Set(new_user.gender),
        preferred_art_type: Set(new_user.preferred_art_type),
        phone: Set(new_user.phone),
        username: Set(new_user.username),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    profile::ActiveModel {
        user_id: Set(user.id),
        description: Set(None),
        avatar: Set(None),
        biography: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(user_id = user.id, "Registered new user");
    Ok(user)
}

/// Finds a user by primary key.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i32) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Finds a user by email, the unique login key.
pub async fn get_user_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Email.eq(email.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists every account in registration order.
pub async fn get_all_users(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    User::find()
        .order_by_asc(user::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Searches users whose username, name or surname contains `query`.
///
/// Usernames are not unique, so this returns every match; an empty query returns nothing.
pub async fn search_users(db: &DatabaseConnection, query: &str) -> Result<Vec<user::Model>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    User::find()
        .filter(
            Condition::any()
                .add(user::Column::Username.contains(query))
                .add(user::Column::Name.contains(query))
                .add(user::Column::Surname.contains(query)),
        )
        .order_by_asc(user::Column::Username)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes an account. Follows, friend requests, friendships, notifications, reports,
/// posts, the profile and reset tokens referencing the user are removed by cascade.
pub async fn delete_user(db: &DatabaseConnection, user_id: i32) -> Result<()> {
    let result = User::delete_by_id(user_id).exec(db).await?;
    if result.rows_affected == 0 {
        warn!(user_id, "Attempted to delete a user that does not exist");
        return Err(Error::UserNotFound { id: user_id });
    }

    info!(user_id, "Deleted user and dependent rows");
    Ok(())
}
