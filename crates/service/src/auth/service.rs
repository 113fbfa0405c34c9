use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument, warn};

use super::domain::{AuthUser, Claims, Credentials, PasswordChange, PasswordReset};
use super::errors::AuthError;
use super::mailer::Mailer;
use super::repository::AuthRepository;
use crate::repositories::user::ProfileInput;
use crate::security::{CurrentUser, Role};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expires_in_secs: u64,
    /// Base of the links placed in outgoing emails.
    pub frontend_url: String,
}

impl AuthConfig {
    pub fn from_app_config(cfg: &configs::AppConfig) -> Self {
        Self {
            jwt_secret: cfg.auth.jwt_secret.clone(),
            jwt_expires_in_secs: cfg.auth.jwt_expires_in_secs,
            frontend_url: cfg.email.frontend_url.clone(),
        }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
    mailer: Option<Arc<dyn Mailer>>,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg, mailer: None } }

    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn is_email_configured(&self) -> bool { self.mailer.is_some() }

    /// Register with email and password and return a bearer token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::Credentials;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let cfg = AuthConfig { jwt_secret: "secret".into(), jwt_expires_in_secs: 3600, frontend_url: String::new() };
    /// let svc = AuthService::new(repo, cfg);
    /// let token = tokio_test::block_on(svc.sign_up(Credentials { email: "user@example.com".into(), password: "Secret123".into() })).unwrap();
    /// let me = tokio_test::block_on(svc.find_by_token(&token)).unwrap();
    /// assert_eq!(me.email, "user@example.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn sign_up(&self, input: Credentials) -> Result<String, AuthError> {
        let email = input.email.trim();
        models::user::validate_email(email).map_err(|_| AuthError::Validation("auth.invalidEmail".into()))?;
        validate_password(&input.password)?;

        if let Some(invited) = self.repo.find_user_by_email(email).await? {
            if self.repo.get_credentials(invited.id).await?.is_some() {
                debug!("user exists: {}", invited.email);
                return Err(AuthError::EmailAlreadyInUse);
            }
            let hash = hash_password(&input.password)?;
            self.repo.update_password(invited.id, hash).await?;
            info!(user_id = %invited.id, "invited_user_signed_up");
            return self.issue_token(&invited);
        }

        // the very first account administers the system
        let roles = if self.repo.count_users().await? == 0 { vec![Role::Admin] } else { Vec::new() };
        let first_name = email.split('@').next().unwrap_or(email);
        let hash = hash_password(&input.password)?;
        let user = self.repo.create_user(email, first_name, &roles, hash).await?;
        info!(user_id = %user.id, email = %user.email, admin = !roles.is_empty(), "user_registered");
        self.issue_token(&user)
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn sign_in(&self, input: Credentials) -> Result<String, AuthError> {
        let user = self.repo
            .find_user_by_email(input.email.trim())
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::WrongPassword)?;

        if !verify_password(&input.password, &cred.password_hash)? {
            warn!(user_id = %user.id, "sign_in_wrong_password");
            return Err(AuthError::WrongPassword);
        }
        info!(user_id = %user.id, "user_signed_in");
        self.issue_token(&user)
    }

    /// Resolve a bearer token to its user. Tokens issued before the user's
    /// `jwt_token_invalid_before` second are rejected.
    pub async fn find_by_token(&self, token: &str) -> Result<AuthUser, AuthError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.cfg.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| AuthError::InvalidToken)?;
        let claims = data.claims;

        let mut user = self.repo.find_user_by_id(claims.id).await?.ok_or(AuthError::InvalidToken)?;
        if let Some(invalid_before) = user.jwt_token_invalid_before {
            if claims.iat < invalid_before.timestamp() {
                debug!(user_id = %user.id, "token revoked");
                return Err(AuthError::InvalidToken);
            }
        }
        if !self.is_email_configured() {
            user.email_verified = true;
        }
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn send_password_reset_email(&self, email: &str) -> Result<(), AuthError> {
        let mailer = self.mailer.as_ref().ok_or(AuthError::EmailNotConfigured)?;
        let token = self.repo
            .generate_password_reset_token(email)
            .await?
            .ok_or(AuthError::PasswordResetError)?;
        let link = format!("{}/auth/password-reset?token={}", self.cfg.frontend_url, token);
        mailer.send_password_reset(email.trim(), &link).await
    }

    #[instrument(skip(self, input))]
    pub async fn password_reset(&self, input: PasswordReset) -> Result<(), AuthError> {
        let user = self.repo
            .find_user_by_password_reset_token(&input.token)
            .await?
            .ok_or(AuthError::PasswordResetInvalidToken)?;
        validate_password(&input.password)?;
        let hash = hash_password(&input.password)?;
        self.repo.update_password(user.id, hash).await?;
        info!(user_id = %user.id, "password_reset");
        Ok(())
    }

    /// Replace the password after checking the old one. Earlier tokens stop
    /// working, so a fresh token is returned.
    #[instrument(skip(self, current_user, input), fields(user_id = %current_user.id))]
    pub async fn change_password(&self, current_user: &CurrentUser, input: PasswordChange) -> Result<String, AuthError> {
        let user = self.repo.find_user_by_id(current_user.id).await?.ok_or(AuthError::UserNotFound)?;
        let cred = self.repo.get_credentials(user.id).await?.ok_or(AuthError::InvalidOldPassword)?;
        if !verify_password(&input.old_password, &cred.password_hash)? {
            return Err(AuthError::InvalidOldPassword);
        }
        validate_password(&input.new_password)?;
        let hash = hash_password(&input.new_password)?;
        self.repo.update_password(user.id, hash).await?;
        info!("password_changed");
        self.issue_token(&user)
    }

    pub async fn update_profile(&self, current_user: &CurrentUser, profile: ProfileInput) -> Result<AuthUser, AuthError> {
        self.repo.update_profile(current_user, profile).await
    }

    fn issue_token(&self, user: &AuthUser) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims { id: user.id, iat: now, exp: now + self.cfg.jwt_expires_in_secs as i64 };
        encode(&JwtHeader::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }
    Ok(())
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::HashError(e.to_string()))?
        .to_string())
}

fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::HashError(e.to_string()))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}
