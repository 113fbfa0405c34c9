//! File storage for uploads.

pub mod local;

pub use local::{LocalStorage, UploadClaims, UploadCredentials};
