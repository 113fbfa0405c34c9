use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{AuthUser, StoredPassword};
use super::errors::AuthError;
use crate::repositories::user::ProfileInput;
use crate::security::{CurrentUser, Role};

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError>;
    async fn count_users(&self) -> Result<u64, AuthError>;
    /// Create a user together with its password and roles, atomically.
    async fn create_user(&self, email: &str, first_name: &str, roles: &[Role], password_hash: String) -> Result<AuthUser, AuthError>;

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<StoredPassword>, AuthError>;
    /// Store a new hash and revoke tokens issued before now.
    async fn update_password(&self, user_id: Uuid, password_hash: String) -> Result<(), AuthError>;

    /// `None` when no live user has this email.
    async fn generate_password_reset_token(&self, email: &str) -> Result<Option<String>, AuthError>;
    async fn find_user_by_password_reset_token(&self, token: &str) -> Result<Option<AuthUser>, AuthError>;

    async fn update_profile(&self, current_user: &CurrentUser, profile: ProfileInput) -> Result<AuthUser, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::{Mutex, MutexGuard};

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<Uuid, AuthUser>>,
        creds: Mutex<HashMap<Uuid, StoredPassword>>, // key: user_id
        reset_tokens: Mutex<HashMap<String, Uuid>>,
    }

    fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>, AuthError> {
        m.lock().map_err(|_| AuthError::Repository("mock repository lock poisoned".into()))
    }

    impl MockAuthRepository {
        /// Seed an invited user (no password).
        pub fn invite(&self, email: &str, roles: Vec<Role>) -> Result<AuthUser, AuthError> {
            let user = AuthUser {
                id: Uuid::new_v4(),
                email: email.to_string(),
                first_name: None,
                last_name: None,
                full_name: None,
                phone_number: None,
                email_verified: false,
                roles,
                avatars: Vec::new(),
                jwt_token_invalid_before: None,
            };
            lock(&self.users)?.insert(user.id, user.clone());
            Ok(user)
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            Ok(lock(&self.users)?.values().find(|u| u.email == email.trim()).cloned())
        }

        async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
            Ok(lock(&self.users)?.get(&id).cloned())
        }

        async fn count_users(&self) -> Result<u64, AuthError> {
            Ok(lock(&self.users)?.len() as u64)
        }

        async fn create_user(&self, email: &str, first_name: &str, roles: &[Role], password_hash: String) -> Result<AuthUser, AuthError> {
            let mut users = lock(&self.users)?;
            if users.values().any(|u| u.email == email) {
                return Err(AuthError::EmailAlreadyInUse);
            }
            let user = AuthUser {
                id: Uuid::new_v4(),
                email: email.to_string(),
                first_name: Some(first_name.to_string()),
                last_name: None,
                full_name: Some(first_name.to_string()),
                phone_number: None,
                email_verified: false,
                roles: roles.to_vec(),
                avatars: Vec::new(),
                jwt_token_invalid_before: None,
            };
            users.insert(user.id, user.clone());
            lock(&self.creds)?.insert(
                user.id,
                StoredPassword { user_id: user.id, password_hash, password_algorithm: "argon2".into() },
            );
            Ok(user)
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<StoredPassword>, AuthError> {
            Ok(lock(&self.creds)?.get(&user_id).cloned())
        }

        async fn update_password(&self, user_id: Uuid, password_hash: String) -> Result<(), AuthError> {
            let mut users = lock(&self.users)?;
            let user = users.get_mut(&user_id).ok_or(AuthError::UserNotFound)?;
            user.jwt_token_invalid_before = Some(Utc::now().fixed_offset());
            lock(&self.creds)?.insert(
                user_id,
                StoredPassword { user_id, password_hash, password_algorithm: "argon2".into() },
            );
            lock(&self.reset_tokens)?.retain(|_, id| *id != user_id);
            Ok(())
        }

        async fn generate_password_reset_token(&self, email: &str) -> Result<Option<String>, AuthError> {
            let Some(user) = self.find_user_by_email(email).await? else {
                return Ok(None);
            };
            let token = Uuid::new_v4().simple().to_string();
            lock(&self.reset_tokens)?.insert(token.clone(), user.id);
            Ok(Some(token))
        }

        async fn find_user_by_password_reset_token(&self, token: &str) -> Result<Option<AuthUser>, AuthError> {
            let id = lock(&self.reset_tokens)?.get(token).copied();
            match id {
                Some(id) => self.find_user_by_id(id).await,
                None => Ok(None),
            }
        }

        async fn update_profile(&self, current_user: &CurrentUser, profile: ProfileInput) -> Result<AuthUser, AuthError> {
            let mut users = lock(&self.users)?;
            let user = users.get_mut(&current_user.id).ok_or(AuthError::UserNotFound)?;
            user.first_name = models::user::trim_optional(profile.first_name.as_deref());
            user.last_name = models::user::trim_optional(profile.last_name.as_deref());
            user.full_name = models::user::build_full_name(user.first_name.as_deref(), user.last_name.as_deref());
            user.phone_number = models::user::trim_optional(profile.phone_number.as_deref());
            Ok(user.clone())
        }
    }
}
