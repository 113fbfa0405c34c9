use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Users: lookups by email on sign-in / invite
        manager
            .create_index(
                Index::create()
                    .name("idx_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .to_owned(),
            )
            .await?;

        // Files: composite lookup by owning relation
        manager
            .create_index(
                Index::create()
                    .name("idx_files_relation")
                    .table(Files::Table)
                    .col(Files::BelongsTo)
                    .col(Files::BelongsToId)
                    .col(Files::BelongsToColumn)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_customer")
                    .table(Orders::Table)
                    .col(Orders::CustomerId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_orders_employee")
                    .table(Orders::Table)
                    .col(Orders::EmployeeId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_users_email").table(Users::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_files_relation").table(Files::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_orders_customer").table(Orders::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_orders_employee").table(Orders::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users { Table, Email }

#[derive(DeriveIden)]
enum Files { Table, BelongsTo, BelongsToId, BelongsToColumn }

#[derive(DeriveIden)]
enum Orders { Table, CustomerId, EmployeeId }
