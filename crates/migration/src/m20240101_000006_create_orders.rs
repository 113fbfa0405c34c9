//! Create `orders` table.
//!
//! `customer_id` and `employee_id` carry no FK: referenced rows are only ever
//! soft-deleted, and a dangling reference simply resolves to nothing.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(uuid(Orders::Id).primary_key())
                    .col(boolean(Orders::Delivered).default(false))
                    .col(uuid_null(Orders::CustomerId))
                    .col(uuid_null(Orders::EmployeeId))
                    .col(uuid_null(Orders::CreatedById))
                    .col(uuid_null(Orders::UpdatedById))
                    .col(timestamp_with_time_zone(Orders::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Orders::UpdatedAt).not_null())
                    .col(timestamp_with_time_zone_null(Orders::DeletedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Orders::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    Delivered,
    CustomerId,
    EmployeeId,
    CreatedById,
    UpdatedById,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
