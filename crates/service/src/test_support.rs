#![cfg(test)]
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use models::db::{connect_with_config, DatabaseConfig};

use crate::security::{CurrentUser, Role};
use crate::storage::LocalStorage;

pub const TEST_SECRET: &str = "test-secret";

/// Fresh in-memory database with the full schema. Each call is isolated.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let cfg = DatabaseConfig { url: "sqlite::memory:".into(), ..Default::default() };
    let db = connect_with_config(&cfg).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

pub fn test_storage() -> LocalStorage {
    let dir = std::env::temp_dir().join(format!("crud_admin_uploads_{}", Uuid::new_v4()));
    LocalStorage::new(dir, "http://localhost:8080", TEST_SECRET)
}

pub fn admin() -> CurrentUser {
    CurrentUser { id: Uuid::new_v4(), email: "admin@example.com".into(), roles: vec![Role::Admin] }
}
