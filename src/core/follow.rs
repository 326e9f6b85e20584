//! Follow graph operations.
//!
//! A follow is a directed edge; following someone notifies them. Reverse lookups
//! (followers, following) join `usuarios` through the named relation of the side
//! being resolved.

use crate::{
    core::{
        notification::{actor_message, create_notification},
        user::require_user,
    },
    entities::{Follow, NotificationKind, User, follow, user},
    errors::{Error, Result},
};
use sea_orm::{
    JoinType, PaginatorTrait, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*,
};
use tracing::{info, warn};

async fn find_edge<C>(db: &C, follower_id: i32, followed_id: i32) -> Result<Option<follow::Model>>
where
    C: ConnectionTrait,
{
    Follow::find()
        .filter(follow::Column::FollowerId.eq(follower_id))
        .filter(follow::Column::FollowedId.eq(followed_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Makes `follower_id` follow `followed_id` and notifies the followed user.
///
/// Self-follows and duplicate edges are rejected.
pub async fn follow_user(
    db: &DatabaseConnection,
    follower_id: i32,
    followed_id: i32,
) -> Result<follow::Model> {
    if follower_id == followed_id {
        return Err(Error::validation("Users cannot follow themselves"));
    }

    let txn = db.begin().await?;

    let follower = require_user(&txn, follower_id).await?;
    require_user(&txn, followed_id).await?;

    if find_edge(&txn, follower_id, followed_id).await?.is_some() {
        warn!(follower_id, followed_id, "Duplicate follow rejected");
        return Err(Error::validation("Already following this user"));
    }

    let edge = follow::ActiveModel {
        follower_id: Set(follower_id),
        followed_id: Set(followed_id),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let handle = follower.username.as_deref().unwrap_or(&follower.email);
    create_notification(
        &txn,
        followed_id,
        NotificationKind::NewFollower.as_str(),
        &actor_message(handle, "comenzo a seguirte"),
        Some(follower_id),
    )
    .await?;

    txn.commit().await?;

    info!(follower_id, followed_id, "User followed");
    Ok(edge)
}

/// Removes the follow edge, returning whether one existed.
pub async fn unfollow_user(
    db: &DatabaseConnection,
    follower_id: i32,
    followed_id: i32,
) -> Result<bool> {
    let result = Follow::delete_many()
        .filter(follow::Column::FollowerId.eq(follower_id))
        .filter(follow::Column::FollowedId.eq(followed_id))
        .exec(db)
        .await?;

    Ok(result.rows_affected > 0)
}

/// Whether `follower_id` currently follows `followed_id`.
pub async fn is_following(
    db: &DatabaseConnection,
    follower_id: i32,
    followed_id: i32,
) -> Result<bool> {
    Ok(find_edge(db, follower_id, followed_id).await?.is_some())
}

/// Users following `user_id`, most recent first.
pub async fn get_followers(db: &DatabaseConnection, user_id: i32) -> Result<Vec<user::Model>> {
    User::find()
        .join_rev(JoinType::InnerJoin, follow::Relation::Follower.def())
        .filter(follow::Column::FollowedId.eq(user_id))
        .order_by_desc(follow::Column::FollowedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Users that `user_id` follows, most recent first.
pub async fn get_following(db: &DatabaseConnection, user_id: i32) -> Result<Vec<user::Model>> {
    User::find()
        .join_rev(JoinType::InnerJoin, follow::Relation::Followed.def())
        .filter(follow::Column::FollowerId.eq(user_id))
        .order_by_desc(follow::Column::FollowedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Number of users following `user_id`.
pub async fn follower_count(db: &DatabaseConnection, user_id: i32) -> Result<u64> {
    Follow::find()
        .filter(follow::Column::FollowedId.eq(user_id))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Number of users `user_id` follows.
pub async fn following_count(db: &DatabaseConnection, user_id: i32) -> Result<u64> {
    Follow::find()
        .filter(follow::Column::FollowerId.eq(user_id))
        .count(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::notification::get_notifications_for_user;
    use crate::core::user::NewUser;
    use crate::entities::notification::MESSAGE_MAX;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_self_follow_rejected() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let err = follow_user(&db, 3, 3).await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_follow_notifies_and_lists() -> Result<()> {
        let (db, ana, bruno) = setup_with_users().await?;

        let edge = follow_user(&db, ana.id, bruno.id).await?;
        assert_eq!(edge.follower_id, ana.id);
        assert_eq!(edge.followed_id, bruno.id);

        assert!(is_following(&db, ana.id, bruno.id).await?);
        assert!(!is_following(&db, bruno.id, ana.id).await?);

        assert_eq!(get_followers(&db, bruno.id).await?, vec![ana.clone()]);
        assert_eq!(get_following(&db, ana.id).await?, vec![bruno.clone()]);
        assert!(get_followers(&db, ana.id).await?.is_empty());
        assert_eq!(follower_count(&db, bruno.id).await?, 1);
        assert_eq!(following_count(&db, ana.id).await?, 1);

        let notifications = get_notifications_for_user(&db, bruno.id).await?;
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, "nuevo_seguidor");
        assert_eq!(notifications[0].reference_id, Some(ana.id));
        assert_eq!(notifications[0].message, "ana comenzo a seguirte");
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_follow_rejected_without_extra_notification() -> Result<()> {
        let (db, ana, bruno) = setup_with_users().await?;

        follow_user(&db, ana.id, bruno.id).await?;
        let err = follow_user(&db, ana.id, bruno.id).await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        assert_eq!(follower_count(&db, bruno.id).await?, 1);
        assert_eq!(get_notifications_for_user(&db, bruno.id).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_follow_unknown_user() -> Result<()> {
        let (db, ana, _) = setup_with_users().await?;
        let err = follow_user(&db, ana.id, 500).await.unwrap_err();
        assert!(matches!(err, Error::UserNotFound { id: 500 }));
        Ok(())
    }

    #[tokio::test]
    async fn test_store_rejects_dangling_follow_edge() -> Result<()> {
        let (db, ana, _) = setup_with_users().await?;

        let err: Error = follow::ActiveModel {
            follower_id: Set(ana.id),
            followed_id: Set(12345),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap_err()
        .into();
        assert!(err.is_foreign_key_violation(), "unexpected error: {err:?}");
        Ok(())
    }

    #[tokio::test]
    async fn test_follow_with_long_username() -> Result<()> {
        let (db, _, bruno) = setup_with_users().await?;
        let long_name = create_custom_user(
            &db,
            NewUser {
                email: "largo@artiverse.app".to_string(),
                password_hash: "hash".to_string(),
                username: Some("x".repeat(240)),
                ..Default::default()
            },
        )
        .await?;

        follow_user(&db, long_name.id, bruno.id).await?;

        let notifications = get_notifications_for_user(&db, bruno.id).await?;
        assert_eq!(notifications.len(), 1);
        assert!(notifications[0].message.chars().count() <= MESSAGE_MAX);
        assert!(notifications[0].message.starts_with("xxx"));
        assert!(notifications[0].message.ends_with("... comenzo a seguirte"));
        Ok(())
    }

    #[tokio::test]
    async fn test_unfollow() -> Result<()> {
        let (db, ana, bruno) = setup_with_users().await?;
        follow_user(&db, ana.id, bruno.id).await?;

        assert!(unfollow_user(&db, ana.id, bruno.id).await?);
        assert!(!unfollow_user(&db, ana.id, bruno.id).await?);
        assert!(!is_following(&db, ana.id, bruno.id).await?);
        Ok(())
    }
}
