use std::path::{Component, Path, PathBuf};

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info, instrument};
use url::form_urlencoded;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::security::Storage;

/// Default lifetime of an upload token.
pub const UPLOAD_TOKEN_TTL_MINUTES: i64 = 10;

/// Claims carried by an upload token. The token fixes where the upload lands
/// and how large it may be.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadClaims {
    pub private_url: String,
    pub max_size_in_bytes: u64,
    pub exp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadCredentials {
    pub url: String,
}

/// Filesystem-backed file storage rooted at `upload_dir`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    backend_url: String,
    secret: String,
}

impl LocalStorage {
    pub fn new(upload_dir: impl Into<PathBuf>, backend_url: impl Into<String>, secret: impl Into<String>) -> Self {
        let backend_url: String = backend_url.into();
        Self {
            root: upload_dir.into(),
            backend_url: backend_url.trim_end_matches('/').to_string(),
            secret: secret.into(),
        }
    }

    pub fn from_config(storage: &configs::StorageConfig, auth: &configs::AuthConfig) -> Self {
        Self::new(&storage.upload_dir, &storage.backend_url, &auth.jwt_secret)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Private URLs are relative paths without `..`, root or prefix components.
    pub fn validate_private_url(private_url: &str) -> Result<(), ServiceError> {
        let invalid = || ServiceError::validation("file.errors.invalidPrivateUrl");
        if private_url.trim().is_empty() || private_url.contains('\\') {
            return Err(invalid());
        }
        let path = Path::new(private_url);
        if path.is_absolute() {
            return Err(invalid());
        }
        for component in path.components() {
            match component {
                Component::Normal(_) => {}
                _ => return Err(invalid()),
            }
        }
        Ok(())
    }

    /// Private URL for a new upload into `storage` by `user_id`.
    pub fn private_url_for(storage: &Storage, user_id: Uuid, filename: &str) -> Result<String, ServiceError> {
        let filename = filename.trim();
        if filename.is_empty()
            || filename == "."
            || filename == ".."
            || filename.chars().any(|c| c.is_control() || matches!(c, '/' | '\\' | '"'))
        {
            return Err(ServiceError::validation("file.errors.invalidPrivateUrl"));
        }
        let private_url = format!("{}/{}", storage.folder_for(user_id), filename);
        Self::validate_private_url(&private_url)?;
        Ok(private_url)
    }

    /// Signed upload URL for `private_url`, valid until `expires_at`
    /// (ten minutes from now when not given).
    #[instrument(skip(self))]
    pub fn upload_credentials(
        &self,
        private_url: &str,
        max_size_in_bytes: u64,
        expires_at: Option<chrono::DateTime<Utc>>,
    ) -> Result<UploadCredentials, ServiceError> {
        Self::validate_private_url(private_url)?;
        let exp = expires_at.unwrap_or_else(|| Utc::now() + Duration::minutes(UPLOAD_TOKEN_TTL_MINUTES));
        let claims = UploadClaims { private_url: private_url.to_string(), max_size_in_bytes, exp: exp.timestamp() };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(self.secret.as_bytes()))
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        Ok(UploadCredentials { url: format!("{}/api/file/upload?token={}", self.backend_url, token) })
    }

    /// Decode an upload token; invalid or expired tokens are a 403.
    pub fn verify_upload_token(&self, token: &str) -> Result<UploadClaims, ServiceError> {
        let data = decode::<UploadClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| {
            debug!(error = %e, "upload token rejected");
            ServiceError::Forbidden
        })?;
        Self::validate_private_url(&data.claims.private_url)?;
        Ok(data.claims)
    }

    /// Write `bytes` to `private_url`, creating parent directories.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload(&self, private_url: &str, bytes: &[u8]) -> Result<String, ServiceError> {
        let path = self.download(private_url)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| ServiceError::Internal(e.to_string()))?;
        }
        fs::write(&path, bytes).await.map_err(|e| ServiceError::Internal(e.to_string()))?;
        info!(private_url, "file stored");
        Ok(self.download_url(private_url))
    }

    pub fn download_url(&self, private_url: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new()).append_pair("privateUrl", private_url).finish();
        format!("{}/api/file/download?{query}", self.backend_url)
    }

    /// Absolute path of `private_url` inside the upload directory.
    pub fn download(&self, private_url: &str) -> Result<PathBuf, ServiceError> {
        Self::validate_private_url(private_url)?;
        Ok(self.root.join(private_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(dir: &Path) -> LocalStorage {
        LocalStorage::new(dir, "http://localhost:8080/", "test-secret")
    }

    #[test]
    fn rejects_escaping_paths() {
        assert!(LocalStorage::validate_private_url("product/photos/a.png").is_ok());
        assert!(LocalStorage::validate_private_url("../etc/passwd").is_err());
        assert!(LocalStorage::validate_private_url("product/../../x").is_err());
        assert!(LocalStorage::validate_private_url("/etc/passwd").is_err());
        assert!(LocalStorage::validate_private_url("").is_err());
    }

    #[test]
    fn builds_private_url_from_storage() {
        let user = Uuid::new_v4();
        let url = LocalStorage::private_url_for(&Storage::USER_AVATARS_PROFILES, user, "me.png").unwrap();
        assert_eq!(url, format!("user/avatars/profile/{user}/me.png"));
        assert!(LocalStorage::private_url_for(&Storage::PRODUCT_PHOTOS, user, "../x").is_err());
    }

    #[test]
    fn filenames_with_control_chars_or_quotes_are_refused() {
        let user = Uuid::new_v4();
        for name in ["a\r\nSet-Cookie: x=1.png", "tab\there.png", "say\"hi\".png", "nul\0.png", "back\\slash.png"] {
            assert!(
                matches!(LocalStorage::private_url_for(&Storage::PRODUCT_PHOTOS, user, name), Err(ServiceError::Validation(_))),
                "{name:?} should be refused"
            );
        }
        assert!(LocalStorage::private_url_for(&Storage::PRODUCT_PHOTOS, user, "résumé v2.png").is_ok());
    }

    #[test]
    fn download_url_is_encoded() {
        let s = storage(Path::new("/tmp"));
        assert_eq!(
            s.download_url("product/photos/a b.png"),
            "http://localhost:8080/api/file/download?privateUrl=product%2Fphotos%2Fa+b.png"
        );
    }

    #[test]
    fn upload_token_roundtrip() {
        let s = storage(Path::new("/tmp"));
        let creds = s.upload_credentials("order/attachments/x.pdf", 1000, None).unwrap();
        let token = creds.url.split("token=").nth(1).unwrap();
        assert!(creds.url.starts_with("http://localhost:8080/api/file/upload?token="));
        let claims = s.verify_upload_token(token).unwrap();
        assert_eq!(claims.private_url, "order/attachments/x.pdf");
        assert_eq!(claims.max_size_in_bytes, 1000);
    }

    #[test]
    fn expired_or_foreign_tokens_are_rejected() {
        let s = storage(Path::new("/tmp"));
        let past = Utc::now() - Duration::hours(1);
        let creds = s.upload_credentials("a/b.txt", 10, Some(past)).unwrap();
        let token = creds.url.split("token=").nth(1).unwrap();
        assert!(matches!(s.verify_upload_token(token), Err(ServiceError::Forbidden)));

        let other = LocalStorage::new("/tmp", "http://x", "another-secret");
        let creds = other.upload_credentials("a/b.txt", 10, None).unwrap();
        let token = creds.url.split("token=").nth(1).unwrap();
        assert!(s.verify_upload_token(token).is_err());
    }

    #[tokio::test]
    async fn upload_writes_under_root() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let s = storage(dir.path());
        let url = s.upload("product/photos/p.txt", b"hello").await?;
        assert!(url.ends_with("privateUrl=product%2Fphotos%2Fp.txt"));
        let path = s.download("product/photos/p.txt")?;
        assert_eq!(tokio::fs::read(path).await?, b"hello");
        Ok(())
    }
}
