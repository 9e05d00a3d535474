//! Delegate registration entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment status for a registration.
///
/// Status only ever moves forward: `pending` to `paid` directly (gateway
/// confirmation), or `pending` to `pending_verification` to `paid` (manual
/// mobile-money proof). There is no failed or expired state; an abandoned
/// registration stays `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum PaymentStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "pending_verification")]
    PendingVerification,
    #[sea_orm(string_value = "paid")]
    Paid,
}

/// How a registration was paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "paystack")]
    Paystack,
    #[sea_orm(string_value = "momo")]
    Momo,
}

/// Delegate registration. Aggregate root: payments and initialization
/// attempts reference it and share its lifetime.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "registration")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Client-generated code (`MUNC-<timestamp>-<random>`). Immutable after
    /// creation; correlates the form submission with payment and lookup.
    #[sea_orm(unique)]
    pub registration_code: String,

    pub first_name: String,
    pub surname: String,
    #[sea_orm(nullable)]
    pub other_names: Option<String>,
    pub date_of_birth: String,
    pub gender: String,

    #[sea_orm(unique)]
    pub email: String,
    pub phone: String,

    pub institution: String,
    pub education_level: String,
    pub nationality: String,
    pub city: String,

    pub emergency_contact_name: String,
    pub emergency_contact_phone: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub special_needs: Option<String>,
    pub has_mun_experience: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub experience_details: Option<String>,

    /// Payment projection.
    pub payment_status: PaymentStatus,
    #[sea_orm(nullable)]
    pub payment_method: Option<PaymentMethod>,
    #[sea_orm(nullable)]
    pub payment_reference: Option<String>,

    /// Assignment projection. Null until `payment_status` becomes `paid`,
    /// then set exactly once and never recomputed.
    #[sea_orm(nullable)]
    pub assigned_committee: Option<String>,
    #[sea_orm(nullable)]
    pub assigned_country: Option<String>,

    pub created_at: DateTimeWithTimeZone,
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payment::Entity")]
    Payment,
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether this registration has completed payment.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}
