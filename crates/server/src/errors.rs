use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use models::errors::ModelError;
use service::errors::ServiceError;
use service::i18n::{translate, Language};

/// Error body returned by every `/api` endpoint: `{ error, message }`, where
/// `message` is translated for the request language.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: &'a str,
}

impl JsonApiError {
    pub fn new(err: impl Into<ServiceError>, lang: Language) -> Self {
        let err = err.into();
        let (status, key) = match &err {
            ServiceError::Validation(key) => (StatusCode::BAD_REQUEST, key.as_str()),
            ServiceError::Model(ModelError::Validation(msg)) => (StatusCode::BAD_REQUEST, msg.as_str()),
            ServiceError::NotFound(key) => (StatusCode::NOT_FOUND, key.as_str()),
            ServiceError::Forbidden => (StatusCode::FORBIDDEN, "errors.forbidden.message"),
            ServiceError::Unauthorized => (StatusCode::UNAUTHORIZED, "errors.unauthorized.message"),
            ServiceError::Db(_) | ServiceError::Internal(_) | ServiceError::Model(ModelError::Db(_)) => {
                error!(error = %err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "errors.internal.message")
            }
        };
        Self { status, message: translate(lang, key) }
    }

    pub fn unauthorized(lang: Language) -> Self {
        Self::new(ServiceError::Unauthorized, lang)
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let title = self.status.canonical_reason().unwrap_or("Error");
        let body = ErrorBody { error: title, message: &self.message };
        (self.status, Json(body)).into_response()
    }
}

/// Attach the request language to a service result.
pub trait ApiResultExt<T> {
    fn api(self, lang: Language) -> Result<T, JsonApiError>;
}

impl<T, E: Into<ServiceError>> ApiResultExt<T> for Result<T, E> {
    fn api(self, lang: Language) -> Result<T, JsonApiError> {
        self.map_err(|e| JsonApiError::new(e, lang))
    }
}
