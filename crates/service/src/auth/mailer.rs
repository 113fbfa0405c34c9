use async_trait::async_trait;
use tracing::info;

use super::errors::AuthError;

/// Outgoing mail seam. Only password reset links are sent today.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_password_reset(&self, to: &str, link: &str) -> Result<(), AuthError>;
}

/// Writes the message to the log instead of delivering it.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_password_reset(&self, to: &str, link: &str) -> Result<(), AuthError> {
        info!(to = %to, link = %link, "password_reset_email");
        Ok(())
    }
}
