use thiserror::Error;

use crate::errors::ServiceError;

/// Business errors for auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("email already in use")]
    EmailAlreadyInUse,
    #[error("user not found")]
    UserNotFound,
    #[error("wrong password")]
    WrongPassword,
    #[error("password too weak")]
    WeakPassword,
    #[error("invalid or revoked token")]
    InvalidToken,
    #[error("email is not configured")]
    EmailNotConfigured,
    #[error("password reset could not be issued")]
    PasswordResetError,
    #[error("invalid or expired password reset token")]
    PasswordResetInvalidToken,
    #[error("old password does not match")]
    InvalidOldPassword,
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("token error: {0}")]
    TokenError(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::EmailAlreadyInUse => 1002,
            AuthError::UserNotFound => 1003,
            AuthError::WrongPassword => 1004,
            AuthError::WeakPassword => 1005,
            AuthError::InvalidToken => 1006,
            AuthError::EmailNotConfigured => 1007,
            AuthError::PasswordResetError => 1008,
            AuthError::PasswordResetInvalidToken => 1009,
            AuthError::InvalidOldPassword => 1010,
            AuthError::HashError(_) => 1101,
            AuthError::TokenError(_) => 1102,
            AuthError::Repository(_) => 1200,
        }
    }

    /// i18n key shown to the caller.
    pub fn message_key(&self) -> &str {
        match self {
            AuthError::Validation(key) => key,
            AuthError::EmailAlreadyInUse => "auth.emailAlreadyInUse",
            AuthError::UserNotFound => "auth.userNotFound",
            AuthError::WrongPassword => "auth.wrongPassword",
            AuthError::WeakPassword => "auth.weakPassword",
            AuthError::InvalidToken => "errors.unauthorized.message",
            AuthError::EmailNotConfigured => "email.error",
            AuthError::PasswordResetError => "auth.passwordReset.error",
            AuthError::PasswordResetInvalidToken => "auth.passwordReset.invalidToken",
            AuthError::InvalidOldPassword => "auth.passwordChange.invalidPassword",
            AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Repository(_) => "errors.internal.message",
        }
    }
}

impl From<ServiceError> for AuthError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(key) => AuthError::Validation(key),
            ServiceError::Model(models::errors::ModelError::Validation(key)) => AuthError::Validation(key),
            ServiceError::NotFound(_) => AuthError::UserNotFound,
            other => AuthError::Repository(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(AuthError::Validation("x".into()).code(), 1001);
        assert_eq!(AuthError::WrongPassword.code(), 1004);
        assert_eq!(AuthError::Repository("db".into()).code(), 1200);
    }

    #[test]
    fn converts_into_service_errors() {
        assert!(matches!(ServiceError::from(AuthError::InvalidToken), ServiceError::Unauthorized));
        assert!(matches!(ServiceError::from(AuthError::WeakPassword), ServiceError::Validation(k) if k == "auth.weakPassword"));
        assert!(matches!(ServiceError::from(AuthError::Repository("x".into())), ServiceError::Db(_)));
    }
}
