//! Payment initialization attempt entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Status of an initialization attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum InitializationStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "success")]
    Success,
}

/// One attempt to start a gateway checkout. Append-only: a registration may
/// accumulate several attempts (retries); only the reference the gateway
/// confirms is authoritative.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_initialization")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub registration_code: String,
    pub email: String,

    /// Amount in minor currency units.
    pub amount: i64,

    /// Gateway reference (`<code>-<epoch-ms>`).
    #[sea_orm(unique)]
    pub reference: String,

    pub status: InitializationStatus,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::registration::Entity",
        from = "Column::RegistrationCode",
        to = "super::registration::Column::RegistrationCode",
        on_delete = "Cascade"
    )]
    Registration,
}

impl Related<super::registration::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Registration.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
