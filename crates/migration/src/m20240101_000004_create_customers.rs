//! Create `customers` table (soft-deleted via `deleted_at`).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(uuid(Customers::Id).primary_key())
                    .col(string_len(Customers::Name, 255).not_null())
                    .col(date_null(Customers::Birthdate))
                    .col(string_len_null(Customers::Gender, 16))
                    .col(uuid_null(Customers::CreatedById))
                    .col(uuid_null(Customers::UpdatedById))
                    .col(timestamp_with_time_zone(Customers::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Customers::UpdatedAt).not_null())
                    .col(timestamp_with_time_zone_null(Customers::DeletedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Customers::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
    Name,
    Birthdate,
    Gender,
    CreatedById,
    UpdatedById,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
