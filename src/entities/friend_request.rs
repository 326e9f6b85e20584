//! Friend request entity - A friendship offer from sender to receiver.
//!
//! Requests are the proposal log. Accepting one creates a row in `amistades`
//! (see [`super::friendship`]); the request itself keeps its final status.

use super::request_status::RequestStatus;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// Friend request database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "solicitud_de_amistad")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "id_solicitud")]
    pub id: i32,
    #[sea_orm(column_name = "id_emisor")]
    pub sender_id: i32,
    #[sea_orm(column_name = "id_receptor")]
    pub receiver_id: i32,
    /// Defaults to [`RequestStatus::Pending`] on insert
    #[sea_orm(column_name = "estado")]
    pub status: RequestStatus,
    #[sea_orm(column_name = "fecha_envio")]
    pub sent_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SenderId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Sender,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ReceiverId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Receiver,
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert {
            if self.status.is_not_set() {
                self.status = Set(RequestStatus::Pending);
            }
            if self.sent_at.is_not_set() {
                self.sent_at = Set(Utc::now().naive_utc());
            }
        }
        Ok(self)
    }
}
