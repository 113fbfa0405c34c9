//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users;
mod m20240101_000002_create_user_credentials;
mod m20240101_000003_create_user_roles;
mod m20240101_000004_create_customers;
mod m20240101_000005_create_products;
mod m20240101_000006_create_orders;
mod m20240101_000007_create_order_products;
mod m20240101_000008_create_files;
mod m20240101_000009_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users::Migration),
            Box::new(m20240101_000002_create_user_credentials::Migration),
            Box::new(m20240101_000003_create_user_roles::Migration),
            Box::new(m20240101_000004_create_customers::Migration),
            Box::new(m20240101_000005_create_products::Migration),
            Box::new(m20240101_000006_create_orders::Migration),
            Box::new(m20240101_000007_create_order_products::Migration),
            Box::new(m20240101_000008_create_files::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000009_add_indexes::Migration),
        ]
    }
}
