//! Password reset token entity - A single-use credential reset grant.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Password reset token database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reset_password_tokens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_name = "id_usuario")]
    pub user_id: i32,
    /// Opaque random token sent by mail, unique
    #[sea_orm(unique)]
    pub token: String,
    /// Instant (UTC) after which the token is no longer accepted
    #[sea_orm(column_name = "expiracion")]
    pub expires_at: DateTime,
}

impl Model {
    /// Whether the token is past its expiration at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime) -> bool {
        now >= self.expires_at
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
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
