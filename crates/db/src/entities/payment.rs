//! Confirmed payment transaction entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One confirmed gateway transaction. Created exactly once per successful
/// confirmation, guarded by a lookup-before-insert check on
/// `transaction_id` inside the confirmation transaction.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Owning registration.
    pub registration_id: String,

    /// Gateway-assigned transaction identifier.
    #[sea_orm(unique)]
    pub transaction_id: String,

    /// Amount in minor currency units.
    pub amount: i64,

    /// Gateway-reported status string (`success` for every row the
    /// confirmation path inserts).
    pub status: String,

    pub payment_method: String,
    pub currency: String,
    pub payment_date: DateTimeWithTimeZone,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::registration::Entity",
        from = "Column::RegistrationId",
        to = "super::registration::Column::Id",
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
