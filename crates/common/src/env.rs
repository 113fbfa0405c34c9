//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::{info, warn};

/// Ensure the upload directory exists; warn when the optional static directory is missing.
pub async fn ensure_env(static_dir: Option<&str>, upload_dir: &str) -> anyhow::Result<()> {
    if let Some(dir) = static_dir {
        if tokio::fs::metadata(dir).await.is_err() {
            warn!(static_dir = %dir, "static assets directory not found; static assets may 404");
        }
    }
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {upload_dir}: {e}"))?;
    info!(%upload_dir, "upload directory ready");
    Ok(())
}
