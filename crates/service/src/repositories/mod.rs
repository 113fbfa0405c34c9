//! Data access per entity.
//!
//! Every function is generic over [`ConnectionTrait`] so services can run
//! several calls inside one transaction. Soft-deleted rows are never returned.

use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::security::CurrentUser;
use crate::storage::LocalStorage;

pub mod file;
pub mod customer;
pub mod product;
pub mod order;
pub mod user;

/// Connection, caller and storage shared by repository calls.
pub struct RepoCtx<'a, C: ConnectionTrait> {
    pub conn: &'a C,
    pub current_user: Option<&'a CurrentUser>,
    pub storage: &'a LocalStorage,
}

impl<'a, C: ConnectionTrait> RepoCtx<'a, C> {
    pub fn new(conn: &'a C, current_user: Option<&'a CurrentUser>, storage: &'a LocalStorage) -> Self {
        Self { conn, current_user, storage }
    }

    /// Id recorded in `created_by_id`/`updated_by_id`.
    pub fn user_id(&self) -> Option<Uuid> {
        self.current_user.map(|u| u.id)
    }
}
