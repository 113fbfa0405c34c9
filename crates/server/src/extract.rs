//! Request-scoped extractors and shared query/body shapes.

use std::convert::Infallible;

use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use service::auth::domain::AuthUser;
use service::errors::ServiceError;
use service::i18n::Language;
use service::security::{CurrentUser, Permission, PermissionChecker};

use crate::errors::JsonApiError;

/// Caller language plus the user resolved by the auth middleware, if any.
#[derive(Debug, Clone)]
pub struct RequestCtx {
    pub lang: Language,
    pub user: Option<AuthUser>,
    current: Option<CurrentUser>,
}

impl RequestCtx {
    pub fn current_user(&self) -> Option<&CurrentUser> {
        self.current.as_ref()
    }

    pub fn checker(&self) -> PermissionChecker<'_> {
        PermissionChecker::new(self.current_user())
    }

    pub fn require(&self, permission: &Permission) -> Result<(), JsonApiError> {
        self.checker().validate_has(permission).map_err(|e| self.err(e))
    }

    /// The signed-in user, or 401.
    pub fn authenticated(&self) -> Result<&AuthUser, JsonApiError> {
        self.user.as_ref().ok_or_else(|| JsonApiError::unauthorized(self.lang))
    }

    pub fn err(&self, e: impl Into<ServiceError>) -> JsonApiError {
        JsonApiError::new(e, self.lang)
    }
}

pub fn language(headers: &HeaderMap) -> Language {
    Language::from_accept_language(headers.get(ACCEPT_LANGUAGE).and_then(|v| v.to_str().ok()))
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RequestCtx {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts.extensions.get::<AuthUser>().cloned();
        let current = user.as_ref().map(AuthUser::current_user);
        Ok(RequestCtx { lang: language(&parts.headers), user, current })
    }
}

// 提取失败统一返回带翻译的 400，不暴露 serde 细节
fn rejected(lang: Language, detail: String) -> JsonApiError {
    debug!(%detail, "request rejected");
    JsonApiError::new(ServiceError::validation("errors.validation.message"), lang)
}

/// `Json` body whose rejection is a translated 400.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = JsonApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let lang = language(req.headers());
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| ApiJson(value))
            .map_err(|e| rejected(lang, e.body_text()))
    }
}

/// Query string whose rejection is a translated 400.
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| ApiQuery(value))
            .map_err(|e| rejected(language(&parts.headers), e.body_text()))
    }
}

/// Path parameters whose rejection is a translated 400.
#[derive(Debug)]
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| ApiPath(value))
            .map_err(|e| rejected(language(&parts.headers), e.body_text()))
    }
}

/// Body of a permission-gated handler. Deserialisation errors are held back
/// so the permission check answers first.
pub type GatedBody<T> = Result<ApiJson<DataBody<T>>, JsonApiError>;

/// `{ "data": ... }` request envelope.
#[derive(Debug, Deserialize)]
pub struct DataBody<T> {
    pub data: T,
}

/// `?ids=a,b` on bulk deletes.
#[derive(Debug, Deserialize)]
pub struct IdsQuery {
    #[serde(default)]
    pub ids: String,
}

impl IdsQuery {
    pub fn parse(&self) -> Result<Vec<Uuid>, ServiceError> {
        let ids = self
            .ids
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Uuid::parse_str(s).map_err(|_| ServiceError::validation("errors.validation.message")))
            .collect::<Result<Vec<_>, _>>()?;
        if ids.is_empty() {
            return Err(ServiceError::validation("errors.validation.message"));
        }
        Ok(ids)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AutocompleteQuery {
    pub query: Option<String>,
    pub limit: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_ids() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let q = IdsQuery { ids: format!("{a}, {b},") };
        assert_eq!(q.parse().unwrap(), vec![a, b]);
        assert!(IdsQuery { ids: "nope".into() }.parse().is_err());
        assert!(IdsQuery { ids: String::new() }.parse().is_err());
    }
}
