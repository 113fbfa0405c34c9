//! SeaORM entities for the admin backend, plus the field-level validation
//! shared by repositories and request handlers.

pub mod errors;
pub mod db;
pub mod user;
pub mod user_role;
pub mod user_credentials;
pub mod customer;
pub mod product;
pub mod order;
pub mod order_product;
pub mod file;
