//! Database configuration module for the Artiverse data layer.
//!
//! This module handles database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so foreign keys, cascades and unique
//! constraints come straight from the `Relation` and column attributes.

use crate::entities::{
    Follow, FollowColumn, FriendRequest, Friendship, Notification, PasswordResetToken, Post, Profile, Report,
    User,
};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema,
    sea_query::{Index, IndexCreateStatement, TableCreateStatement},
};
use tracing::{debug, info};

/// Default store used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/artiverse.sqlite?mode=rwc";

/// Establishes a connection to the database at `database_url`.
///
/// `SQLite` connections opened through `sqlx` enforce foreign keys, which the
/// cascade rules on every user reference rely on.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database at {}", database_url);
    Database::connect(database_url).await.map_err(Into::into)
}

fn table_for<E: EntityTrait>(schema: &Schema, entity: E) -> TableCreateStatement {
    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();
    table
}

/// A user follows another user at most once.
fn unique_follow_edge() -> IndexCreateStatement {
    Index::create()
        .name("idx_seguir_usuario_par")
        .table(Follow)
        .col(FollowColumn::FollowerId)
        .col(FollowColumn::FollowedId)
        .unique()
        .if_not_exists()
        .to_owned()
}

/// Creates all tables and indexes that do not exist yet.
///
/// `usuarios` is created first since every other table references it.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let tables = [
        table_for(&schema, User),
        table_for(&schema, Profile),
        table_for(&schema, Post),
        table_for(&schema, Follow),
        table_for(&schema, Report),
        table_for(&schema, FriendRequest),
        table_for(&schema, Notification),
        table_for(&schema, Friendship),
        table_for(&schema, PasswordResetToken),
    ];

    for table in &tables {
        db.execute(builder.build(table)).await?;
    }
    db.execute(builder.build(&unique_follow_edge())).await?;

    info!("Database schema ensured ({} tables)", tables.len());
    Ok(())
}
