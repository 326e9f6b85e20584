//! Post entity - User-authored content with an optional image.

use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// Post database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "publicaciones")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "id_publicacion")]
    pub id: i32,
    /// Author of the post
    #[sea_orm(column_name = "id_usuario")]
    pub user_id: i32,
    /// Text body, never empty
    #[sea_orm(column_name = "contenido")]
    pub content: String,
    /// Optional reference to an attached image
    #[sea_orm(column_name = "imagen")]
    pub image: Option<String>,
    /// When the post was created (UTC)
    #[sea_orm(column_name = "fecha_creacion")]
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each post belongs to its author
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

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert && self.created_at.is_not_set() {
            self.created_at = Set(Utc::now().naive_utc());
        }
        Ok(self)
    }
}
