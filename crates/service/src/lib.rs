//! Service layer providing business-oriented CRUD operations on top of models.
//! - Separates business logic from data access.
//! - Reuses validation and entity definitions in `models` crate.
//! - Gates nothing itself: callers check [`security::PermissionChecker`] first.

pub mod errors;
pub mod i18n;
pub mod security;
pub mod filter;
pub mod pagination;
pub mod storage;
pub mod repositories;
pub mod services;
pub mod auth;
pub mod runtime;
#[cfg(test)]
pub mod test_support;
