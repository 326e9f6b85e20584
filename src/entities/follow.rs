//! Follow entity - A directed "follower follows followed" edge.
//!
//! Both endpoints reference `usuarios`, so the two sides are exposed as separate
//! named relations rather than a single `Related` implementation.

use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// Follow database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "seguir_usuario")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "id_seguimiento")]
    pub id: i32,
    /// The user doing the following
    #[sea_orm(column_name = "id_seguidor")]
    pub follower_id: i32,
    /// The user being followed
    #[sea_orm(column_name = "id_seguido")]
    pub followed_id: i32,
    #[sea_orm(column_name = "fecha_seguimiento")]
    pub followed_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::FollowerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Follower,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::FollowedId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Followed,
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert && self.followed_at.is_not_set() {
            self.followed_at = Set(Utc::now().naive_utc());
        }
        Ok(self)
    }
}
