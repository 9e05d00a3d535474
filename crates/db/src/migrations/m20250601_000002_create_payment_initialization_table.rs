//! Create payment initialization table.

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
                    .table(PaymentInitialization::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PaymentInitialization::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PaymentInitialization::RegistrationCode)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PaymentInitialization::Email).string().not_null())
                    .col(
                        ColumnDef::new(PaymentInitialization::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PaymentInitialization::Reference)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(PaymentInitialization::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(PaymentInitialization::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_initialization_registration")
                            .from(
                                PaymentInitialization::Table,
                                PaymentInitialization::RegistrationCode,
                            )
                            .to(Registration::Table, Registration::RegistrationCode)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Retries are looked up per registration
        manager
            .create_index(
                Index::create()
                    .name("idx_payment_initialization_registration_code")
                    .table(PaymentInitialization::Table)
                    .col(PaymentInitialization::RegistrationCode)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PaymentInitialization::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum PaymentInitialization {
    Table,
    Id,
    RegistrationCode,
    Email,
    Amount,
    Reference,
    Status,
    CreatedAt,
}
