//! Role-based access control: the role list, upload storages, the permission
//! table and the checker evaluated for each request.

pub mod roles;
pub mod storage;
pub mod permissions;
pub mod checker;

pub use checker::{CurrentUser, PermissionChecker};
pub use permissions::Permission;
pub use roles::Role;
pub use storage::Storage;
