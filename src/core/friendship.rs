//! Friend request and friendship operations.
//!
//! A friend request is the proposal record; its status moves from pending to
//! accepted or rejected exactly once. Accepting writes the friendship row and the
//! sender's notification in the same transaction as the status change, so the
//! request and the friendship can never disagree.

use crate::{
    core::{
        notification::{actor_message, create_notification},
        user::require_user,
    },
    entities::{
        FriendRequest, Friendship, NotificationKind, RequestStatus, User, friend_request,
        friendship, user,
    },
    errors::{Error, Result},
};
use sea_orm::{Condition, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, warn};

fn between(user_a: i32, user_b: i32) -> Condition {
    Condition::any()
        .add(
            Condition::all()
                .add(friendship::Column::User1Id.eq(user_a))
                .add(friendship::Column::User2Id.eq(user_b)),
        )
        .add(
            Condition::all()
                .add(friendship::Column::User1Id.eq(user_b))
                .add(friendship::Column::User2Id.eq(user_a)),
        )
}

async fn find_friendship<C>(db: &C, user_a: i32, user_b: i32) -> Result<Option<friendship::Model>>
where
    C: ConnectionTrait,
{
    Friendship::find()
        .filter(between(user_a, user_b))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Sends a friend request from `sender_id` to `receiver_id` and notifies the receiver.
///
/// Rejected when the users are the same, already friends, or a pending request
/// already exists in either direction.
pub async fn send_friend_request(
    db: &DatabaseConnection,
    sender_id: i32,
    receiver_id: i32,
) -> Result<friend_request::Model> {
    if sender_id == receiver_id {
        return Err(Error::validation("Users cannot send a friend request to themselves"));
    }

    let txn = db.begin().await?;

    let sender = require_user(&txn, sender_id).await?;
    require_user(&txn, receiver_id).await?;

    if find_friendship(&txn, sender_id, receiver_id).await?.is_some() {
        return Err(Error::validation("Users are already friends"));
    }

    let pending = FriendRequest::find()
        .filter(friend_request::Column::Status.eq(RequestStatus::Pending))
        .filter(
            Condition::any()
                .add(
                    Condition::all()
                        .add(friend_request::Column::SenderId.eq(sender_id))
                        .add(friend_request::Column::ReceiverId.eq(receiver_id)),
                )
                .add(
                    Condition::all()
                        .add(friend_request::Column::SenderId.eq(receiver_id))
                        .add(friend_request::Column::ReceiverId.eq(sender_id)),
                ),
        )
        .one(&txn)
        .await?;

    if pending.is_some() {
        warn!(sender_id, receiver_id, "Duplicate friend request rejected");
        return Err(Error::validation(
            "A pending friend request already exists between these users",
        ));
    }

    let request = friend_request::ActiveModel {
        sender_id: Set(sender_id),
        receiver_id: Set(receiver_id),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let handle = sender.username.as_deref().unwrap_or(&sender.email);
    create_notification(
        &txn,
        receiver_id,
        NotificationKind::FriendRequest.as_str(),
        &actor_message(handle, "te envio una solicitud de amistad"),
        Some(request.id),
    )
    .await?;

    txn.commit().await?;

    info!(sender_id, receiver_id, request_id = request.id, "Friend request sent");
    Ok(request)
}

/// Outcome of answering a friend request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendRequestResponse {
    /// The request with its final status
    pub request: friend_request::Model,
    /// The friendship created by an acceptance
    pub friendship: Option<friendship::Model>,
}

/// Accepts or rejects a pending request. Only the receiver may answer.
///
/// `decision` must be [`RequestStatus::Accepted`] or [`RequestStatus::Rejected`].
pub async fn respond_to_friend_request(
    db: &DatabaseConnection,
    request_id: i32,
    responder_id: i32,
    decision: RequestStatus,
) -> Result<FriendRequestResponse> {
    let notification_kind = match decision {
        RequestStatus::Accepted => NotificationKind::FriendshipAccepted,
        RequestStatus::Rejected => NotificationKind::FriendshipRejected,
        RequestStatus::Pending => {
            return Err(Error::validation(
                "A friend request can only be accepted or rejected",
            ));
        }
    };

    let txn = db.begin().await?;

    let request = FriendRequest::find_by_id(request_id)
        .one(&txn)
        .await?
        .filter(|request| request.receiver_id == responder_id)
        .ok_or(Error::NotFound {
            entity: "Friend request",
            id: request_id,
        })?;

    if !request.status.is_pending() {
        return Err(Error::validation("Friend request has already been answered"));
    }

    let sender_id = request.sender_id;
    let mut active_model: friend_request::ActiveModel = request.into();
    active_model.status = Set(decision);
    let request = active_model.update(&txn).await?;

    let friendship = match decision {
        RequestStatus::Accepted => Some(
            friendship::ActiveModel {
                user1_id: Set(sender_id),
                user2_id: Set(responder_id),
                status: Set(RequestStatus::Accepted),
                ..Default::default()
            }
            .insert(&txn)
            .await?,
        ),
        RequestStatus::Rejected | RequestStatus::Pending => None,
    };

    let responder = require_user(&txn, responder_id).await?;
    let handle = responder.username.as_deref().unwrap_or(&responder.email);
    let message = match decision {
        RequestStatus::Accepted => actor_message(handle, "acepto tu solicitud de amistad"),
        RequestStatus::Rejected | RequestStatus::Pending => {
            actor_message(handle, "rechazo tu solicitud de amistad")
        }
    };
    create_notification(
        &txn,
        sender_id,
        notification_kind.as_str(),
        &message,
        Some(request.id),
    )
    .await?;

    txn.commit().await?;

    info!(request_id, ?decision, "Friend request answered");
    Ok(FriendRequestResponse {
        request,
        friendship,
    })
}

/// Pending requests addressed to `user_id`, newest first.
pub async fn get_pending_requests(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<friend_request::Model>> {
    FriendRequest::find()
        .filter(friend_request::Column::ReceiverId.eq(user_id))
        .filter(friend_request::Column::Status.eq(RequestStatus::Pending))
        .order_by_desc(friend_request::Column::SentAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Whether the two users are friends, regardless of who sent the original request.
pub async fn are_friends(db: &DatabaseConnection, user_a: i32, user_b: i32) -> Result<bool> {
    Ok(find_friendship(db, user_a, user_b).await?.is_some())
}

/// Friends of `user_id`, ordered by user id.
pub async fn get_friends(db: &DatabaseConnection, user_id: i32) -> Result<Vec<user::Model>> {
    let friendships = Friendship::find()
        .filter(
            Condition::any()
                .add(friendship::Column::User1Id.eq(user_id))
                .add(friendship::Column::User2Id.eq(user_id)),
        )
        .filter(friendship::Column::Status.eq(RequestStatus::Accepted))
        .all(db)
        .await?;

    let friend_ids: Vec<i32> = friendships
        .iter()
        .filter_map(|friendship| friendship.other_user(user_id))
        .collect();

    if friend_ids.is_empty() {
        return Ok(Vec::new());
    }

    User::find()
        .filter(user::Column::Id.is_in(friend_ids))
        .order_by_asc(user::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Ends a friendship, returning whether one existed.
pub async fn remove_friend(db: &DatabaseConnection, user_id: i32, friend_id: i32) -> Result<bool> {
    let result = Friendship::delete_many()
        .filter(between(user_id, friend_id))
        .exec(db)
        .await?;

    if result.rows_affected > 0 {
        info!(user_id, friend_id, "Friendship removed");
    }
    Ok(result.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::notification::get_notifications_for_user;
    use crate::core::user::NewUser;
    use crate::entities::notification::MESSAGE_MAX;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase, PaginatorTrait};

    #[tokio::test]
    async fn test_request_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let err = send_friend_request(&db, 1, 1).await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        let err = respond_to_friend_request(&db, 1, 2, RequestStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_status_defaults_to_pending() -> Result<()> {
        let (db, ana, bruno) = setup_with_users().await?;

        let request = friend_request::ActiveModel {
            sender_id: Set(ana.id),
            receiver_id: Set(bruno.id),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        assert_eq!(request.status, RequestStatus::Pending);
        Ok(())
    }

    #[tokio::test]
    async fn test_store_rejects_dangling_request() -> Result<()> {
        let (db, ana, _) = setup_with_users().await?;

        let err: Error = friend_request::ActiveModel {
            sender_id: Set(999),
            receiver_id: Set(ana.id),
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
    async fn test_send_request_notifies_receiver() -> Result<()> {
        let (db, ana, bruno) = setup_with_users().await?;

        let request = send_friend_request(&db, ana.id, bruno.id).await?;
        assert_eq!(request.status, RequestStatus::Pending);

        let pending = get_pending_requests(&db, bruno.id).await?;
        assert_eq!(pending, vec![request.clone()]);
        assert!(get_pending_requests(&db, ana.id).await?.is_empty());

        let notifications = get_notifications_for_user(&db, bruno.id).await?;
        assert_eq!(notifications[0].kind, "solicitud_amistad");
        assert_eq!(notifications[0].reference_id, Some(request.id));
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_requests_rejected_in_both_directions() -> Result<()> {
        let (db, ana, bruno) = setup_with_users().await?;
        send_friend_request(&db, ana.id, bruno.id).await?;

        let err = send_friend_request(&db, ana.id, bruno.id).await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        let err = send_friend_request(&db, bruno.id, ana.id).await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        assert_eq!(FriendRequest::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_accept_creates_friendship() -> Result<()> {
        let (db, ana, bruno) = setup_with_users().await?;
        let request = send_friend_request(&db, ana.id, bruno.id).await?;

        let response =
            respond_to_friend_request(&db, request.id, bruno.id, RequestStatus::Accepted).await?;
        assert_eq!(response.request.status, RequestStatus::Accepted);
        let friendship = response.friendship.unwrap();
        assert_eq!(friendship.user1_id, ana.id);
        assert_eq!(friendship.user2_id, bruno.id);
        assert_eq!(friendship.status, RequestStatus::Accepted);

        assert!(are_friends(&db, ana.id, bruno.id).await?);
        assert!(are_friends(&db, bruno.id, ana.id).await?);
        assert_eq!(get_friends(&db, ana.id).await?, vec![bruno.clone()]);
        assert_eq!(get_friends(&db, bruno.id).await?, vec![ana.clone()]);

        let notifications = get_notifications_for_user(&db, ana.id).await?;
        assert_eq!(notifications[0].kind, "amistad_aceptada");

        // Friends cannot request each other again
        let err = send_friend_request(&db, bruno.id, ana.id).await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_reject_creates_no_friendship() -> Result<()> {
        let (db, ana, bruno) = setup_with_users().await?;
        let request = send_friend_request(&db, ana.id, bruno.id).await?;

        let response =
            respond_to_friend_request(&db, request.id, bruno.id, RequestStatus::Rejected).await?;
        assert_eq!(response.request.status, RequestStatus::Rejected);
        assert!(response.friendship.is_none());
        assert_eq!(Friendship::find().count(&db).await?, 0);

        let notifications = get_notifications_for_user(&db, ana.id).await?;
        assert_eq!(notifications[0].kind, "amistad_rechazada");

        // A rejected request no longer blocks a new one
        send_friend_request(&db, ana.id, bruno.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_only_receiver_answers_once() -> Result<()> {
        let (db, ana, bruno) = setup_with_users().await?;
        let request = send_friend_request(&db, ana.id, bruno.id).await?;

        let err = respond_to_friend_request(&db, request.id, ana.id, RequestStatus::Accepted)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));

        respond_to_friend_request(&db, request.id, bruno.id, RequestStatus::Accepted).await?;
        let err = respond_to_friend_request(&db, request.id, bruno.id, RequestStatus::Rejected)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        assert_eq!(Friendship::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_long_usernames_still_notify() -> Result<()> {
        let (db, ana, _) = setup_with_users().await?;
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

        let request = send_friend_request(&db, long_name.id, ana.id).await?;
        let message = &get_notifications_for_user(&db, ana.id).await?[0].message;
        assert!(message.chars().count() <= MESSAGE_MAX);
        assert!(message.ends_with("te envio una solicitud de amistad"));

        respond_to_friend_request(&db, request.id, ana.id, RequestStatus::Accepted).await?;
        let second = create_custom_user(
            &db,
            NewUser {
                email: "otro@artiverse.app".to_string(),
                password_hash: "hash".to_string(),
                username: Some("y".repeat(240)),
                ..Default::default()
            },
        )
        .await?;
        let request = send_friend_request(&db, ana.id, second.id).await?;
        respond_to_friend_request(&db, request.id, second.id, RequestStatus::Rejected).await?;

        let message = &get_notifications_for_user(&db, ana.id).await?[0].message;
        assert!(message.chars().count() <= MESSAGE_MAX);
        assert!(message.ends_with("rechazo tu solicitud de amistad"));
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_friend() -> Result<()> {
        let (db, ana, bruno) = setup_with_users().await?;
        let request = send_friend_request(&db, ana.id, bruno.id).await?;
        respond_to_friend_request(&db, request.id, bruno.id, RequestStatus::Accepted).await?;

        // Either side can end it
        assert!(remove_friend(&db, bruno.id, ana.id).await?);
        assert!(!remove_friend(&db, ana.id, bruno.id).await?);
        assert!(!are_friends(&db, ana.id, bruno.id).await?);
        assert!(get_friends(&db, ana.id).await?.is_empty());
        Ok(())
    }
}
