//! Password reset tokens - issuing, redeeming and purging single-use grants.
//!
//! Password hashing happens outside this crate: `reset_password` receives the new hash.

use crate::{
    entities::{PasswordResetToken, User, password_reset_token, user},
    errors::{Error, Result},
};
use chrono::{Duration, Utc};
use rand::{Rng, distributions::Alphanumeric};
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::{debug, info, warn};

/// How long an issued token stays valid
pub const TOKEN_TTL_MINUTES: i64 = 60;
/// Number of alphanumeric characters in a token
pub const TOKEN_LENGTH: usize = 48;

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// A freshly issued token together with the account it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Owner of the token
    pub user: user::Model,
    /// Stored token row; `token.token` goes into the reset link
    pub token: password_reset_token::Model,
}

/// Issues a reset token for the account registered under `email`.
///
/// Returns `Ok(None)` for unknown emails so callers can answer identically either way.
/// Earlier tokens of the same user are discarded.
pub async fn issue_reset_token(db: &DatabaseConnection, email: &str) -> Result<Option<IssuedToken>> {
    let txn = db.begin().await?;

    let Some(user) = User::find()
        .filter(user::Column::Email.eq(email.trim()))
        .one(&txn)
        .await?
    else {
        debug!("Password reset requested for unknown email");
        return Ok(None);
    };

    PasswordResetToken::delete_many()
        .filter(password_reset_token::Column::UserId.eq(user.id))
        .exec(&txn)
        .await?;

    let token = password_reset_token::ActiveModel {
        user_id: Set(user.id),
        token: Set(generate_token()),
        expires_at: Set((Utc::now() + Duration::minutes(TOKEN_TTL_MINUTES)).naive_utc()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(user_id = user.id, "Password reset token issued");
    Ok(Some(IssuedToken { user, token }))
}

/// Redeems `token`, replacing the user's password hash.
///
/// The token is deleted whether it was valid or expired, so it can be used once at most.
pub async fn reset_password(
    db: &DatabaseConnection,
    token: &str,
    new_password_hash: &str,
) -> Result<user::Model> {
    if new_password_hash.is_empty() {
        return Err(Error::validation("Password hash cannot be empty"));
    }

    let txn = db.begin().await?;

    let grant = PasswordResetToken::find()
        .filter(password_reset_token::Column::Token.eq(token))
        .one(&txn)
        .await?
        .ok_or(Error::InvalidResetToken)?;

    if grant.is_expired_at(Utc::now().naive_utc()) {
        grant.delete(&txn).await?;
        txn.commit().await?;
        warn!("Expired password reset token presented");
        return Err(Error::InvalidResetToken);
    }

    let user = User::find_by_id(grant.user_id)
        .one(&txn)
        .await?
        .ok_or(Error::UserNotFound { id: grant.user_id })?;

    let mut active_model: user::ActiveModel = user.into();
    active_model.password_hash = Set(new_password_hash.to_string());
    let user = active_model.update(&txn).await?;

    grant.delete(&txn).await?;
    txn.commit().await?;

    info!(user_id = user.id, "Password reset completed");
    Ok(user)
}

/// Deletes every expired token, returning how many were removed.
pub async fn purge_expired_tokens(db: &DatabaseConnection) -> Result<u64> {
    let result = PasswordResetToken::delete_many()
        .filter(password_reset_token::Column::ExpiresAt.lte(Utc::now().naive_utc()))
        .exec(db)
        .await?;

    if result.rows_affected > 0 {
        info!(removed = result.rows_affected, "Purged expired password reset tokens");
    }
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::PaginatorTrait;

    async fn expire(db: &DatabaseConnection, token: password_reset_token::Model) -> Result<()> {
        let mut active_model: password_reset_token::ActiveModel = token.into();
        active_model.expires_at = Set((Utc::now() - Duration::minutes(1)).naive_utc());
        active_model.update(db).await?;
        Ok(())
    }

    #[test]
    fn test_generated_tokens() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), TOKEN_LENGTH);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_unknown_email_yields_none() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(issue_reset_token(&db, "ghost@artiverse.app").await?.is_none());
        assert_eq!(PasswordResetToken::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_issue_replaces_previous_token() -> Result<()> {
        let (db, ana, _) = setup_with_users().await?;

        let first = issue_reset_token(&db, &ana.email).await?.unwrap();
        let second = issue_reset_token(&db, &ana.email).await?.unwrap();

        assert_eq!(second.user.id, ana.id);
        assert_ne!(first.token.token, second.token.token);
        assert!(second.token.expires_at > Utc::now().naive_utc());
        assert_eq!(PasswordResetToken::find().count(&db).await?, 1);

        let err = reset_password(&db, &first.token.token, "new-hash").await.unwrap_err();
        assert!(matches!(err, Error::InvalidResetToken));
        Ok(())
    }

    #[tokio::test]
    async fn test_token_is_single_use() -> Result<()> {
        let (db, ana, _) = setup_with_users().await?;
        let issued = issue_reset_token(&db, &ana.email).await?.unwrap();

        let user = reset_password(&db, &issued.token.token, "$argon2id$new").await?;
        assert_eq!(user.id, ana.id);
        assert_eq!(user.password_hash, "$argon2id$new");

        let err = reset_password(&db, &issued.token.token, "$argon2id$again")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidResetToken));
        Ok(())
    }

    #[tokio::test]
    async fn test_expired_token_rejected_and_removed() -> Result<()> {
        let (db, ana, _) = setup_with_users().await?;
        let issued = issue_reset_token(&db, &ana.email).await?.unwrap();
        let value = issued.token.token.clone();
        expire(&db, issued.token).await?;

        let err = reset_password(&db, &value, "new-hash").await.unwrap_err();
        assert!(matches!(err, Error::InvalidResetToken));
        assert_eq!(PasswordResetToken::find().count(&db).await?, 0);

        let unchanged = User::find_by_id(ana.id).one(&db).await?.unwrap();
        assert_eq!(unchanged.password_hash, "test-hash");
        Ok(())
    }

    #[tokio::test]
    async fn test_purge_expired_tokens() -> Result<()> {
        let (db, ana, bruno) = setup_with_users().await?;
        let stale = issue_reset_token(&db, &ana.email).await?.unwrap();
        issue_reset_token(&db, &bruno.email).await?.unwrap();
        expire(&db, stale.token).await?;

        assert_eq!(purge_expired_tokens(&db).await?, 1);
        assert_eq!(purge_expired_tokens(&db).await?, 0);
        assert_eq!(PasswordResetToken::find().count(&db).await?, 1);
        Ok(())
    }
}
