//! Post operations - publishing, listing and deleting user content.

use crate::{
    core::user::require_user,
    entities::{Post, post},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use tracing::{debug, warn};

/// Publishes a post for `user_id`. The creation timestamp is filled in on insert.
pub async fn create_post(
    db: &DatabaseConnection,
    user_id: i32,
    content: &str,
    image: Option<String>,
) -> Result<post::Model> {
    if content.trim().is_empty() {
        return Err(Error::validation("Post content cannot be empty"));
    }

    require_user(db, user_id).await?;

    let post = post::ActiveModel {
        user_id: Set(user_id),
        content: Set(content.to_string()),
        image: Set(image.filter(|path| !path.trim().is_empty())),
        ..Default::default()
    }
    .insert(db)
    .await?;

    debug!(user_id, post_id = post.id, "Post created");
    Ok(post)
}

/// Finds a post by primary key.
pub async fn get_post_by_id(db: &DatabaseConnection, post_id: i32) -> Result<Option<post::Model>> {
    Post::find_by_id(post_id).one(db).await.map_err(Into::into)
}

/// Returns the global feed, newest first.
pub async fn get_all_posts(db: &DatabaseConnection) -> Result<Vec<post::Model>> {
    Post::find()
        .order_by_desc(post::Column::CreatedAt)
        .order_by_desc(post::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Returns the posts written by `user_id`, newest first.
pub async fn get_posts_by_user(db: &DatabaseConnection, user_id: i32) -> Result<Vec<post::Model>> {
    Post::find()
        .filter(post::Column::UserId.eq(user_id))
        .order_by_desc(post::Column::CreatedAt)
        .order_by_desc(post::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Number of posts written by `user_id`.
pub async fn count_posts_by_user(db: &DatabaseConnection, user_id: i32) -> Result<u64> {
    Post::find()
        .filter(post::Column::UserId.eq(user_id))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Deletes a post. Only its author may delete it; anything else reports the post as not found.
pub async fn delete_post(db: &DatabaseConnection, post_id: i32, author_id: i32) -> Result<()> {
    let result = Post::delete_many()
        .filter(post::Column::Id.eq(post_id))
        .filter(post::Column::UserId.eq(author_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        warn!(post_id, author_id, "Post not found or not owned by requester");
        return Err(Error::NotFound {
            entity: "Post",
            id: post_id,
        });
    }

    Ok(())
}
