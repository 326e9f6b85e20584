//! Notification operations - creating alerts and tracking their read state.

use crate::{
    entities::{Notification, notification},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*, sea_query::Expr};
use tracing::debug;

/// Creates a notification for `user_id`.
///
/// Generic over the connection so that social graph operations can notify inside
/// their own transaction. New notifications start unread.
pub async fn create_notification<C>(
    db: &C,
    user_id: i32,
    kind: &str,
    message: &str,
    reference_id: Option<i32>,
) -> Result<notification::Model>
where
    C: ConnectionTrait,
{
    if message.trim().is_empty() {
        return Err(Error::validation("Notification message cannot be empty"));
    }

    if message.chars().count() > notification::MESSAGE_MAX {
        return Err(Error::validation(format!(
            "Notification message cannot exceed {} characters",
            notification::MESSAGE_MAX
        )));
    }

    let created = notification::ActiveModel {
        user_id: Set(user_id),
        message: Set(message.to_string()),
        kind: Set(kind.to_string()),
        reference_id: Set(reference_id),
        ..Default::default()
    }
    .insert(db)
    .await?;

    debug!(user_id, kind, "Notification created");
    Ok(created)
}

/// Formats `"{actor} {action}"`, shortening `actor` so the whole message fits in
/// [`notification::MESSAGE_MAX`] characters.
#[must_use]
pub fn actor_message(actor: &str, action: &str) -> String {
    const ELLIPSIS: &str = "...";
    let budget = notification::MESSAGE_MAX.saturating_sub(action.chars().count() + 1);

    if actor.chars().count() <= budget {
        return format!("{actor} {action}");
    }

    let shortened: String = actor
        .chars()
        .take(budget.saturating_sub(ELLIPSIS.len()))
        .collect();
    format!("{shortened}{ELLIPSIS} {action}")
}

/// Returns the notifications of `user_id`, newest first.
pub async fn get_notifications_for_user(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<notification::Model>> {
    Notification::find()
        .filter(notification::Column::UserId.eq(user_id))
        .order_by_desc(notification::Column::CreatedAt)
        .order_by_desc(notification::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Number of unread notifications for `user_id`.
pub async fn count_unread(db: &DatabaseConnection, user_id: i32) -> Result<u64> {
    Notification::find()
        .filter(notification::Column::UserId.eq(user_id))
        .filter(notification::Column::Read.eq(false))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Marks every notification of `user_id` as read, returning how many changed.
pub async fn mark_all_as_read(db: &DatabaseConnection, user_id: i32) -> Result<u64> {
    let result = Notification::update_many()
        .col_expr(notification::Column::Read, Expr::value(true))
        .filter(notification::Column::UserId.eq(user_id))
        .filter(notification::Column::Read.eq(false))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
