//! Profile operations - the one-to-one public profile attached to each user.

use crate::{
    core::user::require_user,
    entities::{
        Profile,
        profile::{self, BIOGRAPHY_MAX, SHORT_TEXT_MAX},
    },
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::debug;

/// Editable profile fields. `None` clears the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFields {
    pub description: Option<String>,
    pub avatar: Option<String>,
    pub biography: Option<String>,
}

fn check_length(field: &str, value: Option<&String>, max: usize) -> Result<()> {
    match value {
        Some(text) if text.chars().count() > max => Err(Error::validation(format!(
            "{field} cannot exceed {max} characters"
        ))),
        _ => Ok(()),
    }
}

impl ProfileFields {
    fn validate(&self) -> Result<()> {
        check_length("Description", self.description.as_ref(), SHORT_TEXT_MAX)?;
        check_length("Avatar", self.avatar.as_ref(), SHORT_TEXT_MAX)?;
        check_length("Biography", self.biography.as_ref(), BIOGRAPHY_MAX)
    }
}

/// Inserts a profile row for `user_id`.
///
/// Registration already creates one; a second insert for the same user is
/// rejected by the unique constraint on `id_usuario`.
pub async fn create_profile(
    db: &DatabaseConnection,
    user_id: i32,
    fields: ProfileFields,
) -> Result<profile::Model> {
    fields.validate()?;

    profile::ActiveModel {
        user_id: Set(user_id),
        description: Set(fields.description),
        avatar: Set(fields.avatar),
        biography: Set(fields.biography),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Returns the profile of `user_id`, if any.
pub async fn get_profile_for_user(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Option<profile::Model>> {
    Profile::find()
        .filter(profile::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Replaces the editable fields of a user's profile, creating the row if it is missing.
pub async fn update_profile(
    db: &DatabaseConnection,
    user_id: i32,
    fields: ProfileFields,
) -> Result<profile::Model> {
    fields.validate()?;

    let txn = db.begin().await?;
    require_user(&txn, user_id).await?;

    let existing = Profile::find()
        .filter(profile::Column::UserId.eq(user_id))
        .one(&txn)
        .await?;

    let saved = if let Some(profile) = existing {
        let mut active_model: profile::ActiveModel = profile.into();
        active_model.description = Set(fields.description);
        active_model.avatar = Set(fields.avatar);
        active_model.biography = Set(fields.biography);
        active_model.update(&txn).await?
    } else {
        profile::ActiveModel {
            user_id: Set(user_id),
            description: Set(fields.description),
            avatar: Set(fields.avatar),
            biography: Set(fields.biography),
            ..Default::default()
        }
        .insert(&txn)
        .await?
    };

    txn.commit().await?;

    debug!(user_id, "Profile updated");
    Ok(saved)
}
