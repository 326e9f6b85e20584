//! User entity - An Artiverse account.
//!
//! The email address is the unique lookup key. The username is a display handle
//! with no uniqueness constraint, so it is only ever used for searching.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "usuarios")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key, column_name = "id_usuario")]
    pub id: i32,
    /// Given name
    #[sea_orm(column_name = "nombre")]
    pub name: Option<String>,
    /// Family name
    #[sea_orm(column_name = "apellido")]
    pub surname: Option<String>,
    /// Login email, unique across all accounts
    #[sea_orm(column_name = "correo_electronico", unique)]
    pub email: String,
    /// Password hash produced by the authentication service
    #[sea_orm(column_name = "contrasena")]
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sea_orm(column_name = "fecha_nacimiento")]
    pub birth_date: Option<Date>,
    #[sea_orm(column_name = "genero")]
    pub gender: Option<String>,
    /// Art discipline the user is most interested in (e.g. "pintura", "fotografia")
    #[sea_orm(column_name = "tipo_arte_preferido")]
    pub preferred_art_type: Option<String>,
    #[sea_orm(column_name = "telefono")]
    pub phone: Option<String>,
    /// Public handle, not unique
    #[sea_orm(column_name = "nombre_usuario")]
    pub username: Option<String>,
}

/// Single-sided relations owned by the user.
///
/// Entities with two foreign keys into `usuarios` (follows, reports, friend requests,
/// friendships) are reached through their own named relations instead.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has at most one profile
    #[sea_orm(has_one = "super::profile::Entity")]
    Profile,
    /// One user authors many posts
    #[sea_orm(has_many = "super::post::Entity")]
    Posts,
    /// One user receives many notifications
    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,
    /// One user may hold several reset tokens
    #[sea_orm(has_many = "super::password_reset_token::Entity")]
    PasswordResetTokens,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl Related<super::password_reset_token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PasswordResetTokens.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
