//! Create payment table.

use sea_orm_migration::prelude::*;

use super::m20250601_000001_create_registration_table::Registration;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Payment::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Payment::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Payment::RegistrationId).string().not_null())
                    .col(
                        ColumnDef::new(Payment::TransactionId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Payment::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Payment::Status).string().not_null())
                    .col(ColumnDef::new(Payment::PaymentMethod).string().not_null())
                    .col(ColumnDef::new(Payment::Currency).string().not_null())
                    .col(
                        ColumnDef::new(Payment::PaymentDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Payment::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_registration")
                            .from(Payment::Table, Payment::RegistrationId)
                            .to(Registration::Table, Registration::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payment_registration_id")
                    .table(Payment::Table)
                    .col(Payment::RegistrationId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Payment::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Payment {
    Table,
    Id,
    RegistrationId,
    TransactionId,
    Amount,
    Status,
    PaymentMethod,
    Currency,
    PaymentDate,
    CreatedAt,
}
