//! Shared test utilities for the Artiverse data layer.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test users with sensible defaults.

use crate::{
    core::user::{self, NewUser},
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::collections::HashMap;

/// Variable lookup backed by fixed pairs, standing in for the process environment.
pub fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test user with sensible defaults.
///
/// # Defaults
/// * `password_hash`: `"test-hash"`
/// * `username`: the local part of `email`
/// * every other optional field: None
pub async fn create_test_user(db: &DatabaseConnection, email: &str) -> Result<entities::user::Model> {
    let username = email.split('@').next().map(ToString::to_string);
    user::create_user(
        db,
        NewUser {
            email: email.to_string(),
            password_hash: "test-hash".to_string(),
            username,
            ..Default::default()
        },
    )
    .await
}

/// Creates a test user with custom parameters.
pub async fn create_custom_user(
    db: &DatabaseConnection,
    new_user: NewUser,
) -> Result<entities::user::Model> {
    user::create_user(db, new_user).await
}

/// Sets up a test environment with two users.
/// Returns (db, ana, bruno) for social graph scenarios.
pub async fn setup_with_users() -> Result<(
    DatabaseConnection,
    entities::user::Model,
    entities::user::Model,
)> {
    let db = setup_test_db().await?;
    let ana = create_test_user(&db, "ana@artiverse.app").await?;
    let bruno = create_test_user(&db, "bruno@artiverse.app").await?;
    Ok((db, ana, bruno))
}
