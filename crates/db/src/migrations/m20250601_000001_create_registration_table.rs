//! Create registration table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Registration::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Registration::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Registration::RegistrationCode)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Registration::FirstName).string().not_null())
                    .col(ColumnDef::new(Registration::Surname).string().not_null())
                    .col(ColumnDef::new(Registration::OtherNames).string().null())
                    .col(ColumnDef::new(Registration::DateOfBirth).string().not_null())
                    .col(ColumnDef::new(Registration::Gender).string().not_null())
                    .col(
                        ColumnDef::new(Registration::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Registration::Phone).string().not_null())
                    .col(ColumnDef::new(Registration::Institution).string().not_null())
                    .col(
                        ColumnDef::new(Registration::EducationLevel)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Registration::Nationality).string().not_null())
                    .col(ColumnDef::new(Registration::City).string().not_null())
                    .col(
                        ColumnDef::new(Registration::EmergencyContactName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Registration::EmergencyContactPhone)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Registration::SpecialNeeds).text().null())
                    .col(
                        ColumnDef::new(Registration::HasMunExperience)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Registration::ExperienceDetails).text().null())
                    .col(
                        ColumnDef::new(Registration::PaymentStatus)
                            .string_len(32)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Registration::PaymentMethod).string_len(16).null())
                    .col(ColumnDef::new(Registration::PaymentReference).string().null())
                    .col(ColumnDef::new(Registration::AssignedCommittee).string().null())
                    .col(ColumnDef::new(Registration::AssignedCountry).string().null())
                    .col(
                        ColumnDef::new(Registration::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Registration::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Lookup by payment status backs the admin summary
        manager
            .create_index(
                Index::create()
                    .name("idx_registration_payment_status")
                    .table(Registration::Table)
                    .col(Registration::PaymentStatus)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Registration::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Registration {
    Table,
    Id,
    RegistrationCode,
    FirstName,
    Surname,
    OtherNames,
    DateOfBirth,
    Gender,
    Email,
    Phone,
    Institution,
    EducationLevel,
    Nationality,
    City,
    EmergencyContactName,
    EmergencyContactPhone,
    SpecialNeeds,
    HasMunExperience,
    ExperienceDetails,
    PaymentStatus,
    PaymentMethod,
    PaymentReference,
    AssignedCommittee,
    AssignedCountry,
    CreatedAt,
    UpdatedAt,
}
