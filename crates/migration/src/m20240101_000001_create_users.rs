//! Create `users` table.
//!
//! Email uniqueness is enforced among live rows by the repository, since soft-deleted
//! users keep their email.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(uuid(Users::Id).primary_key())
                    .col(string_len(Users::Email, 255).not_null())
                    .col(string_len_null(Users::FirstName, 80))
                    .col(string_len_null(Users::LastName, 175))
                    .col(string_len_null(Users::FullName, 255))
                    .col(string_len_null(Users::PhoneNumber, 24))
                    .col(boolean(Users::EmailVerified).default(false))
                    .col(string_len_null(Users::PasswordResetToken, 255))
                    .col(timestamp_with_time_zone_null(Users::PasswordResetTokenExpiresAt))
                    .col(timestamp_with_time_zone_null(Users::JwtTokenInvalidBefore))
                    .col(uuid_null(Users::CreatedById))
                    .col(uuid_null(Users::UpdatedById))
                    .col(timestamp_with_time_zone(Users::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Users::UpdatedAt).not_null())
                    // Explicitly define nullable deleted_at to avoid conflicting NULL/NOT NULL
                    .col(
                        ColumnDef::new(Users::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Users::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    FirstName,
    LastName,
    FullName,
    PhoneNumber,
    EmailVerified,
    PasswordResetToken,
    PasswordResetTokenExpiresAt,
    JwtTokenInvalidBefore,
    CreatedById,
    UpdatedById,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
