//! User report operations for moderation.

use crate::{
    core::user::require_user,
    entities::{Report, report},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Files a report by `reporter_id` against `reported_id`.
///
/// The reason is required; evidence is an optional link to a screenshot or post.
pub async fn report_user(
    db: &DatabaseConnection,
    reporter_id: i32,
    reported_id: i32,
    reason: &str,
    evidence_url: Option<String>,
) -> Result<report::Model> {
    if reason.trim().is_empty() {
        return Err(Error::validation("A report needs a reason"));
    }

    if reporter_id == reported_id {
        return Err(Error::validation("Users cannot report themselves"));
    }

    let txn = db.begin().await?;
    require_user(&txn, reporter_id).await?;
    require_user(&txn, reported_id).await?;

    let report = report::ActiveModel {
        reporter_id: Set(reporter_id),
        reported_id: Set(reported_id),
        reason: Set(reason.trim().to_string()),
        evidence_url: Set(evidence_url.filter(|url| !url.trim().is_empty())),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(report_id = report.id, reported_id, "User reported");
    Ok(report)
}

/// Reports filed against `user_id`, newest first.
pub async fn get_reports_against(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<report::Model>> {
    Report::find()
        .filter(report::Column::ReportedId.eq(user_id))
        .order_by_desc(report::Column::ReportedAt)
        .order_by_desc(report::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Reports filed by `user_id`, newest first.
pub async fn get_reports_by(db: &DatabaseConnection, user_id: i32) -> Result<Vec<report::Model>> {
    Report::find()
        .filter(report::Column::ReporterId.eq(user_id))
        .order_by_desc(report::Column::ReportedAt)
        .order_by_desc(report::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_report_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let err = report_user(&db, 1, 2, "  ", None).await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        let err = report_user(&db, 1, 1, "spam", None).await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_report_user() -> Result<()> {
        let (db, ana, bruno) = setup_with_users().await?;

        let report = report_user(
            &db,
            ana.id,
            bruno.id,
            " Plagio de mi obra ",
            Some("https://artiverse.app/p/31".to_string()),
        )
        .await?;
        assert_eq!(report.reason, "Plagio de mi obra");
        assert_eq!(
            report.evidence_url.as_deref(),
            Some("https://artiverse.app/p/31")
        );

        assert_eq!(get_reports_against(&db, bruno.id).await?, vec![report.clone()]);
        assert_eq!(get_reports_by(&db, ana.id).await?, vec![report]);
        assert!(get_reports_against(&db, ana.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_report_unknown_user() -> Result<()> {
        let (db, ana, _) = setup_with_users().await?;
        let err = report_user(&db, ana.id, 321, "spam", None).await.unwrap_err();
        assert!(matches!(err, Error::UserNotFound { id: 321 }));
        Ok(())
    }

    #[tokio::test]
    async fn test_store_rejects_dangling_report() -> Result<()> {
        let (db, ana, _) = setup_with_users().await?;

        let err: Error = report::ActiveModel {
            reporter_id: Set(ana.id),
            reported_id: Set(321),
            reason: Set("spam".to_string()),
            evidence_url: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap_err()
        .into();
        assert!(err.is_foreign_key_violation(), "unexpected error: {err:?}");
        Ok(())
    }
}
