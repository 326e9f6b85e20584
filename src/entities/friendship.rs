//! Friendship entity - A resolved mutual relationship between two users.
//!
//! Rows are only written when a friend request is accepted, so `user1_id` is the
//! original sender and `user2_id` the receiver. Lookups must check both columns.

use super::request_status::RequestStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Friendship database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "amistades")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "id_amistad")]
    pub id: i32,
    #[sea_orm(column_name = "id_usuario1")]
    pub user1_id: i32,
    #[sea_orm(column_name = "id_usuario2")]
    pub user2_id: i32,
    #[sea_orm(column_name = "estado")]
    pub status: RequestStatus,
}

impl Model {
    /// Returns the id of the other participant, or `None` if `user_id` is not part of this friendship.
    #[must_use]
    pub const fn other_user(&self, user_id: i32) -> Option<i32> {
        if self.user1_id == user_id {
            Some(self.user2_id)
        } else if self.user2_id == user_id {
            Some(self.user1_id)
        } else {
            None
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::User1Id",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User1,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::User2Id",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User2,
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_user() {
        let friendship = Model {
            id: 1,
            user1_id: 10,
            user2_id: 20,
            status: RequestStatus::Accepted,
        };
        assert_eq!(friendship.other_user(10), Some(20));
        assert_eq!(friendship.other_user(20), Some(10));
        assert_eq!(friendship.other_user(30), None);
    }
}
