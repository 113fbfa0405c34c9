use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use service::errors::ServiceError;
use service::security::Storage;
use service::storage::{LocalStorage, UploadCredentials};

use crate::errors::{ApiResultExt, JsonApiError};
use crate::extract::{ApiQuery, RequestCtx};
use crate::state::ServerState;

// multipart 额外开销
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

pub fn router() -> Router<ServerState> {
    let body_limit = Storage::all().iter().map(|s| s.max_size_in_bytes).max().unwrap_or(0) + MULTIPART_OVERHEAD;
    Router::new()
        .route("/api/file/credentials", get(credentials))
        .route("/api/file/upload", post(upload).layer(DefaultBodyLimit::max(body_limit as usize)))
        .route("/api/file/download", get(download))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsQuery {
    pub storage_id: String,
    pub filename: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsOutput {
    pub private_url: String,
    pub download_url: String,
    pub upload_credentials: UploadCredentials,
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutput {
    pub private_url: String,
    pub download_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadQuery {
    pub private_url: String,
}

/// Signed upload URL for one file into a storage the caller may write to.
#[utoipa::path(get, path = "/api/file/credentials", tag = "file", params(("storageId" = String, Query, description = "Storage id"), ("filename" = String, Query, description = "File name")), responses((status = 200, description = "Upload credentials", body = crate::openapi::FileCredentialsDoc), (status = 403, description = "Forbidden", body = crate::openapi::ErrorDoc)))]
pub async fn credentials(State(state): State<ServerState>, ctx: RequestCtx, ApiQuery(q): ApiQuery<CredentialsQuery>) -> Result<Json<CredentialsOutput>, JsonApiError> {
    let storage = Storage::find(&q.storage_id).ok_or_else(|| ctx.err(ServiceError::validation("file.errors.invalidStorage")))?;
    ctx.checker().validate_can_write_to(&storage).api(ctx.lang)?;
    let user = ctx.authenticated()?;

    let private_url = LocalStorage::private_url_for(&storage, user.id, &q.filename).api(ctx.lang)?;
    let upload_credentials = state.storage.upload_credentials(&private_url, storage.max_size_in_bytes, None).api(ctx.lang)?;
    Ok(Json(CredentialsOutput {
        download_url: state.storage.download_url(&private_url),
        private_url,
        upload_credentials,
    }))
}

/// Multipart upload of the `file` field, authorised by the token alone.
#[utoipa::path(post, path = "/api/file/upload", tag = "file", params(("token" = String, Query, description = "Upload token")), responses((status = 200, description = "Stored", body = crate::openapi::UploadedDoc), (status = 400, description = "Bad Request", body = crate::openapi::ErrorDoc), (status = 403, description = "Forbidden", body = crate::openapi::ErrorDoc)))]
#[instrument(skip_all)]
pub async fn upload(State(state): State<ServerState>, ctx: RequestCtx, ApiQuery(q): ApiQuery<UploadQuery>, multipart: Result<Multipart, MultipartRejection>) -> Result<Json<UploadOutput>, JsonApiError> {
    let claims = state.storage.verify_upload_token(&q.token).api(ctx.lang)?;

    let invalid = || ctx.err(ServiceError::validation("errors.validation.message"));
    let mut multipart = multipart.map_err(|_| invalid())?;
    let mut bytes = None;
    while let Some(field) = multipart.next_field().await.map_err(|_| invalid())? {
        if field.name() == Some("file") {
            bytes = Some(field.bytes().await.map_err(|_| invalid())?);
            break;
        }
    }
    let bytes = bytes.ok_or_else(invalid)?;
    if bytes.len() as u64 > claims.max_size_in_bytes {
        return Err(ctx.err(ServiceError::validation("file.errors.maxSize")));
    }

    let download_url = state.storage.upload(&claims.private_url, &bytes).await.api(ctx.lang)?;
    info!(private_url = %claims.private_url, size = bytes.len(), "upload accepted");
    Ok(Json(UploadOutput { private_url: claims.private_url, download_url }))
}

#[utoipa::path(get, path = "/api/file/download", tag = "file", params(("privateUrl" = String, Query, description = "Private URL")), responses((status = 200, description = "File bytes"), (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)))]
pub async fn download(State(state): State<ServerState>, ctx: RequestCtx, ApiQuery(q): ApiQuery<DownloadQuery>) -> Result<impl IntoResponse, JsonApiError> {
    let path = state.storage.download(&q.private_url).api(ctx.lang)?;
    let bytes = tokio::fs::read(&path).await.map_err(|_| ctx.err(ServiceError::not_found()))?;
    let filename = path.file_name().map(|n| n.to_string_lossy().replace('"', "")).unwrap_or_default();
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        bytes,
    ))
}
