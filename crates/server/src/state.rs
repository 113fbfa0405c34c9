use std::sync::Arc;

use sea_orm::DatabaseConnection;

use service::auth::service::AuthConfig;
use service::auth::{AuthService, LogMailer, SeaOrmAuthRepository};
use service::security::CurrentUser;
use service::services::ServiceContext;
use service::storage::LocalStorage;

/// Shared handler state; cheap to clone.
#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub storage: Arc<LocalStorage>,
    pub auth: Arc<AuthService<SeaOrmAuthRepository>>,
}

impl ServerState {
    pub fn new(cfg: &configs::AppConfig, db: DatabaseConnection) -> Self {
        let storage = LocalStorage::from_config(&cfg.storage, &cfg.auth);
        let repo = Arc::new(SeaOrmAuthRepository::new(db.clone(), storage.clone()));
        let mut auth = AuthService::new(repo, AuthConfig::from_app_config(cfg));
        // 未启用邮件时不挂载 mailer，密码重置接口返回 email.error
        if cfg.email.enabled {
            auth = auth.with_mailer(Arc::new(LogMailer));
        }
        Self { db, storage: Arc::new(storage), auth: Arc::new(auth) }
    }

    pub fn services<'a>(&'a self, current_user: Option<&'a CurrentUser>) -> ServiceContext<'a> {
        ServiceContext::new(&self.db, self.storage.as_ref(), current_user)
    }
}
