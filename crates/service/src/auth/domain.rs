use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repositories::file::FileRecord;
use crate::repositories::user::UserRecord;
use crate::security::{CurrentUser, Role};

/// Sign-up / sign-in input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Domain user (business view)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub email_verified: bool,
    pub roles: Vec<Role>,
    pub avatars: Vec<FileRecord>,
    #[serde(skip)]
    pub jwt_token_invalid_before: Option<DateTime<FixedOffset>>,
}

impl AuthUser {
    pub fn current_user(&self) -> CurrentUser {
        CurrentUser { id: self.id, email: self.email.clone(), roles: self.roles.clone() }
    }
}

impl From<UserRecord> for AuthUser {
    fn from(r: UserRecord) -> Self {
        Self {
            id: r.user.id,
            email: r.user.email,
            first_name: r.user.first_name,
            last_name: r.user.last_name,
            full_name: r.user.full_name,
            phone_number: r.user.phone_number,
            email_verified: r.user.email_verified,
            roles: r.roles,
            avatars: r.avatars,
            jwt_token_invalid_before: r.user.jwt_token_invalid_before,
        }
    }
}

/// Domain credentials (hashed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPassword {
    pub user_id: Uuid,
    pub password_hash: String,
    pub password_algorithm: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordReset {
    pub token: String,
    pub password: String,
}

/// Bearer token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub iat: i64,
    pub exp: i64,
}
