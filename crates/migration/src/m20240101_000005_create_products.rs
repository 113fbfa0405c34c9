//! Create `products` table; `unit_price` is a fixed-point decimal(24, 2).
//! SQLite caps decimal precision at 16, so it gets decimal(16, 2) there.
use sea_orm_migration::{prelude::*, schema::*, sea_orm::DatabaseBackend};

const PRICE_PRECISION: u32 = 24;
const SQLITE_PRICE_PRECISION: u32 = 16;
const PRICE_SCALE: u32 = 2;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let precision = match manager.get_database_backend() {
            DatabaseBackend::Sqlite => SQLITE_PRICE_PRECISION,
            _ => PRICE_PRECISION,
        };
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(uuid(Products::Id).primary_key())
                    .col(string_len(Products::Name, 255).not_null())
                    .col(text_null(Products::Description))
                    .col(decimal_len(Products::UnitPrice, precision, PRICE_SCALE).not_null())
                    .col(uuid_null(Products::CreatedById))
                    .col(uuid_null(Products::UpdatedById))
                    .col(timestamp_with_time_zone(Products::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Products::UpdatedAt).not_null())
                    .col(timestamp_with_time_zone_null(Products::DeletedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Products::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Name,
    Description,
    UnitPrice,
    CreatedById,
    UpdatedById,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
