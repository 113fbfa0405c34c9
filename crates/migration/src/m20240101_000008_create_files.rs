//! Create `files` table.
//!
//! A file row is attached to any record through the polymorphic triple
//! (`belongs_to`, `belongs_to_id`, `belongs_to_column`).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Files::Table)
                    .if_not_exists()
                    .col(uuid(Files::Id).primary_key())
                    .col(string_len(Files::BelongsTo, 255).not_null())
                    .col(uuid(Files::BelongsToId).not_null())
                    .col(string_len(Files::BelongsToColumn, 255).not_null())
                    .col(string_len(Files::Name, 2083).not_null())
                    .col(big_integer_null(Files::SizeInBytes))
                    .col(string_len_null(Files::PrivateUrl, 2083))
                    .col(string_len_null(Files::PublicUrl, 2083))
                    .col(uuid_null(Files::CreatedById))
                    .col(uuid_null(Files::UpdatedById))
                    .col(timestamp_with_time_zone(Files::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Files::UpdatedAt).not_null())
                    .col(timestamp_with_time_zone_null(Files::DeletedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Files::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Files {
    Table,
    Id,
    BelongsTo,
    BelongsToId,
    BelongsToColumn,
    Name,
    SizeInBytes,
    PrivateUrl,
    PublicUrl,
    CreatedById,
    UpdatedById,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
