use sea_orm::DbErr;
use thiserror::Error;

use crate::auth::errors::AuthError;

/// Service-level errors. `Validation` and `NotFound` carry i18n message keys
/// that the HTTP layer translates for the caller's language.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("forbidden")]
    Forbidden,
    #[error("unauthorized")]
    Unauthorized,
    #[error("database error: {0}")]
    Db(String),
    #[error("internal error: {0}")]
    Internal(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found() -> Self { Self::NotFound("errors.notFound.message".into()) }

    pub fn validation(key: impl Into<String>) -> Self { Self::Validation(key.into()) }
}

impl From<DbErr> for ServiceError {
    fn from(e: DbErr) -> Self { Self::Db(e.to_string()) }
}

impl From<AuthError> for ServiceError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidToken => ServiceError::Unauthorized,
            AuthError::HashError(msg) | AuthError::TokenError(msg) => ServiceError::Internal(msg),
            AuthError::Repository(msg) => ServiceError::Db(msg),
            other => ServiceError::Validation(other.message_key().to_string()),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
