use async_trait::async_trait;
use sea_orm::{DatabaseConnection, TransactionTrait};
use uuid::Uuid;

use crate::auth::domain::{AuthUser, StoredPassword};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;
use crate::errors::ServiceError;
use crate::repositories::user::{self as users, ProfileInput};
use crate::repositories::RepoCtx;
use crate::security::{CurrentUser, Role};
use crate::storage::LocalStorage;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
    pub storage: LocalStorage,
}

impl SeaOrmAuthRepository {
    pub fn new(db: DatabaseConnection, storage: LocalStorage) -> Self {
        Self { db, storage }
    }

    async fn load(&self, user: models::user::Model) -> Result<AuthUser, AuthError> {
        let ctx = RepoCtx::new(&self.db, None, &self.storage);
        Ok(users::with_relations(&ctx, user).await?.into())
    }
}

fn db_err(e: sea_orm::DbErr) -> AuthError {
    AuthError::Repository(e.to_string())
}

#[async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        match users::find_by_email(&self.db, email).await? {
            Some(u) => Ok(Some(self.load(u).await?)),
            None => Ok(None),
        }
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
        match users::find_live(&self.db, id).await? {
            Some(u) => Ok(Some(self.load(u).await?)),
            None => Ok(None),
        }
    }

    async fn count_users(&self) -> Result<u64, AuthError> {
        Ok(users::count(&self.db).await?)
    }

    async fn create_user(&self, email: &str, first_name: &str, roles: &[Role], password_hash: String) -> Result<AuthUser, AuthError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let created = users::create_from_auth(&txn, email, Some(first_name), roles, password_hash).await?;
        txn.commit().await.map_err(db_err)?;
        self.load(created).await
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<StoredPassword>, AuthError> {
        let res = models::user_credentials::find_by_user(&self.db, user_id)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(|c| StoredPassword { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm }))
    }

    async fn update_password(&self, user_id: Uuid, password_hash: String) -> Result<(), AuthError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        users::update_password(&txn, user_id, password_hash).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn generate_password_reset_token(&self, email: &str) -> Result<Option<String>, AuthError> {
        match users::generate_password_reset_token(&self.db, email).await {
            Ok(token) => Ok(Some(token)),
            Err(ServiceError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user_by_password_reset_token(&self, token: &str) -> Result<Option<AuthUser>, AuthError> {
        match users::find_by_password_reset_token(&self.db, token).await? {
            Some(u) => Ok(Some(self.load(u).await?)),
            None => Ok(None),
        }
    }

    async fn update_profile(&self, current_user: &CurrentUser, profile: ProfileInput) -> Result<AuthUser, AuthError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let record = {
            let ctx = RepoCtx::new(&txn, Some(current_user), &self.storage);
            users::update_profile(&ctx, current_user.id, profile).await?
        };
        txn.commit().await.map_err(db_err)?;
        Ok(record.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, test_storage};

    #[tokio::test]
    async fn create_then_find_with_roles_and_credentials() -> anyhow::Result<()> {
        let repo = SeaOrmAuthRepository::new(get_db().await?, test_storage());
        assert_eq!(repo.count_users().await?, 0);

        let user = repo.create_user("first@example.com", "first", &[Role::Admin], "hash".into()).await?;
        assert_eq!(user.roles, vec![Role::Admin]);
        assert_eq!(user.first_name.as_deref(), Some("first"));

        let found = repo.find_user_by_email("first@example.com").await?.expect("user");
        assert_eq!(found.id, user.id);
        let creds = repo.get_credentials(user.id).await?.expect("credentials");
        assert_eq!(creds.password_hash, "hash");
        assert_eq!(repo.count_users().await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn reset_token_roundtrip_and_unknown_email() -> anyhow::Result<()> {
        let repo = SeaOrmAuthRepository::new(get_db().await?, test_storage());
        let user = repo.create_user("reset@example.com", "reset", &[], "hash".into()).await?;

        assert!(repo.generate_password_reset_token("nobody@example.com").await?.is_none());
        let token = repo.generate_password_reset_token("reset@example.com").await?.expect("token");
        assert_eq!(token.len(), 40);
        let found = repo.find_user_by_password_reset_token(&token).await?.expect("user");
        assert_eq!(found.id, user.id);

        repo.update_password(user.id, "new-hash".into()).await?;
        assert!(repo.find_user_by_password_reset_token(&token).await?.is_none());
        let reloaded = repo.find_user_by_id(user.id).await?.expect("user");
        assert!(reloaded.jwt_token_invalid_before.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn update_profile_rebuilds_full_name() -> anyhow::Result<()> {
        let repo = SeaOrmAuthRepository::new(get_db().await?, test_storage());
        let user = repo.create_user("me@example.com", "me", &[], "hash".into()).await?;
        let profile = ProfileInput { first_name: Some("Ana".into()), last_name: Some("Lima".into()), ..Default::default() };
        let updated = repo.update_profile(&user.current_user(), profile).await?;
        assert_eq!(updated.full_name.as_deref(), Some("Ana Lima"));
        Ok(())
    }
}
