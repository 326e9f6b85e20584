//! Notification entity - An alert delivered to a user.
//!
//! `tipo` is an open tag shared with features outside this crate (likes,
//! comments, shares), so it stays a string column. The kinds produced here are
//! listed in [`NotificationKind`].

use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// Maximum length of a notification message
pub const MESSAGE_MAX: usize = 255;

/// Notification database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notificaciones")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "id_notificacion")]
    pub id: i32,
    /// Recipient
    #[sea_orm(column_name = "id_usuario")]
    pub user_id: i32,
    #[sea_orm(column_name = "mensaje", column_type = "String(StringLen::N(255))")]
    pub message: String,
    /// Defaults to false on insert
    #[sea_orm(column_name = "leido")]
    pub read: bool,
    #[sea_orm(column_name = "fecha")]
    pub created_at: DateTime,
    /// Type tag, see [`NotificationKind`]
    #[sea_orm(column_name = "tipo", column_type = "String(StringLen::N(100))")]
    pub kind: String,
    /// Id of the row that triggered the notification (request, user, post...)
    #[sea_orm(column_name = "id_referencia")]
    pub reference_id: Option<i32>,
}

/// Notification kinds emitted by the social graph operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    /// Someone started following the recipient
    NewFollower,
    /// The recipient received a friend request
    FriendRequest,
    /// A request the recipient sent was accepted
    FriendshipAccepted,
    /// A request the recipient sent was rejected
    FriendshipRejected,
}

impl NotificationKind {
    /// Stored `tipo` value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewFollower => "nuevo_seguidor",
            Self::FriendRequest => "solicitud_amistad",
            Self::FriendshipAccepted => "amistad_aceptada",
            Self::FriendshipRejected => "amistad_rechazada",
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each notification belongs to its recipient
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
        if insert {
            if self.read.is_not_set() {
                self.read = Set(false);
            }
            if self.created_at.is_not_set() {
                self.created_at = Set(Utc::now().naive_utc());
            }
        }
        Ok(self)
    }
}
