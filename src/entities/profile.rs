//! Profile entity - Extended public information for a user.
//!
//! The `id_usuario` column is unique, which makes this a strict one-to-one
//! relation with `usuarios`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Maximum length of the description and avatar columns
pub const SHORT_TEXT_MAX: usize = 255;
/// Maximum length of the biography column
pub const BIOGRAPHY_MAX: usize = 500;

/// Profile database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "perfiles")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "id_perfil")]
    pub id: i32,
    /// Owning user, at most one profile per user
    #[sea_orm(column_name = "id_usuario", unique)]
    pub user_id: i32,
    /// Short tagline shown under the username
    #[sea_orm(
        column_name = "descripcion",
        column_type = "String(StringLen::N(255))",
        nullable
    )]
    pub description: Option<String>,
    /// Reference (path or URL) to the avatar image
    #[sea_orm(
        column_name = "foto_perfil",
        column_type = "String(StringLen::N(255))",
        nullable
    )]
    pub avatar: Option<String>,
    #[sea_orm(
        column_name = "biografia",
        column_type = "String(StringLen::N(500))",
        nullable
    )]
    pub biography: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each profile belongs to exactly one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
