//! Resolution state shared by friend requests and friendships.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Tri-state status stored in the `estado` columns.
///
/// The stored strings match the values the Artiverse front end already sends
/// and displays (`pendiente`, `aceptada`, `rechazada`).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(50))")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[sea_orm(string_value = "pendiente")]
    #[serde(alias = "pendiente")]
    Pending,
    #[sea_orm(string_value = "aceptada")]
    #[serde(alias = "aceptada")]
    Accepted,
    #[sea_orm(string_value = "rechazada")]
    #[serde(alias = "rechazada")]
    Rejected,
}

impl RequestStatus {
    /// Whether the request still awaits an answer.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        match self {
            Self::Pending => true,
            Self::Accepted | Self::Rejected => false,
        }
    }
}
