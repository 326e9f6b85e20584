//! Report entity - One user flagging another for moderation.

use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// Report database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reportes_usuarios")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "id_reporte")]
    pub id: i32,
    /// User who filed the report
    #[sea_orm(column_name = "id_reportante")]
    pub reporter_id: i32,
    /// User being reported
    #[sea_orm(column_name = "id_reportado")]
    pub reported_id: i32,
    /// Free-text reason, required
    #[sea_orm(column_name = "motivo")]
    pub reason: String,
    /// Optional link to supporting evidence (screenshot, post URL)
    #[sea_orm(column_name = "evidencia_url")]
    pub evidence_url: Option<String>,
    #[sea_orm(column_name = "fecha")]
    pub reported_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ReporterId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Reporter,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ReportedId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Reported,
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert && self.reported_at.is_not_set() {
            self.reported_at = Set(Utc::now().naive_utc());
        }
        Ok(self)
    }
}
