//! Business services. Every mutating call runs its repository calls inside
//! one transaction; dropping the transaction on error rolls it back.

use sea_orm::{ConnectionTrait, DatabaseConnection};

use crate::repositories::RepoCtx;
use crate::security::CurrentUser;
use crate::storage::LocalStorage;

pub mod customer;
pub mod product;
pub mod order;
pub mod user;

pub use customer::CustomerService;
pub use order::OrderService;
pub use product::ProductService;
pub use user::{UserCreator, UserDestroyer, UserEditor, UserService};

/// Per-request dependencies shared by all services.
#[derive(Clone, Copy)]
pub struct ServiceContext<'a> {
    pub db: &'a DatabaseConnection,
    pub storage: &'a LocalStorage,
    pub current_user: Option<&'a CurrentUser>,
}

impl<'a> ServiceContext<'a> {
    pub fn new(db: &'a DatabaseConnection, storage: &'a LocalStorage, current_user: Option<&'a CurrentUser>) -> Self {
        Self { db, storage, current_user }
    }

    pub(crate) fn repo<'c, C: ConnectionTrait>(&'c self, conn: &'c C) -> RepoCtx<'c, C> {
        RepoCtx::new(conn, self.current_user, self.storage)
    }

    pub(crate) fn read(&self) -> RepoCtx<'a, DatabaseConnection> {
        RepoCtx::new(self.db, self.current_user, self.storage)
    }
}
