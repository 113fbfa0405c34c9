use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::warn;

use service::auth::domain::{AuthUser, Credentials, PasswordChange, PasswordReset};
use service::repositories::user::ProfileInput;

use crate::errors::{ApiResultExt, JsonApiError};
use crate::extract::{language, ApiJson, GatedBody, RequestCtx};
use crate::state::ServerState;

pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Debug, Deserialize)]
pub struct EmailBody {
    pub email: String,
}

fn token_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(AUTH_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

/// Bearer token from `Authorization`, falling back to the `auth_token` cookie.
/// A malformed `Authorization` header is an error.
fn request_token(headers: &HeaderMap) -> Result<Option<String>, ()> {
    if let Some(value) = headers.get(AUTHORIZATION) {
        let value = value.to_str().map_err(|_| ())?;
        return match value.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
            _ => Err(()),
        };
    }
    Ok(CookieJar::from_headers(headers)
        .get(AUTH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty()))
}

// 这些路径上的失效 token 直接忽略，避免旧 cookie 阻塞登录
fn tolerates_stale_token(path: &str) -> bool {
    matches!(
        path,
        "/health"
            | "/api/auth/sign-in"
            | "/api/auth/sign-up"
            | "/api/auth/sign-out"
            | "/api/auth/send-password-reset-email"
            | "/api/auth/password-reset"
            | "/api/auth/email-configured"
    ) || path.starts_with("/docs")
        || path.starts_with("/api-docs")
}

/// 全局中间件：解析 Bearer token（或 auth_token cookie），成功则将用户注入请求扩展。
/// 无 token 时匿名放行；token 非法、过期或已吊销返回 401。
pub async fn resolve_current_user(State(state): State<ServerState>, mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let lang = language(req.headers());

    let token = match request_token(req.headers()) {
        Ok(token) => token,
        Err(()) if tolerates_stale_token(&path) => None,
        Err(()) => {
            warn!(path = %path, "invalid Authorization format (expect Bearer)");
            return JsonApiError::unauthorized(lang).into_response();
        }
    };

    if let Some(token) = token {
        match state.auth.find_by_token(&token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) if tolerates_stale_token(&path) => {
                tracing::debug!(path = %path, error = %e, "ignoring stale token");
            }
            Err(e) => {
                warn!(path = %path, error = %e, "token validation failed");
                return JsonApiError::new(e, lang).into_response();
            }
        }
    }
    next.run(req).await
}

#[utoipa::path(post, path = "/api/auth/sign-up", tag = "auth", request_body = crate::openapi::CredentialsDoc, responses((status = 200, description = "Bearer token", body = String), (status = 400, description = "Bad Request", body = crate::openapi::ErrorDoc)))]
pub async fn sign_up(State(state): State<ServerState>, ctx: RequestCtx, jar: CookieJar, ApiJson(input): ApiJson<Credentials>) -> Result<(CookieJar, Json<String>), JsonApiError> {
    let token = state.auth.sign_up(input).await.api(ctx.lang)?;
    Ok((jar.add(token_cookie(token.clone())), Json(token)))
}

#[utoipa::path(post, path = "/api/auth/sign-in", tag = "auth", request_body = crate::openapi::CredentialsDoc, responses((status = 200, description = "Bearer token", body = String), (status = 400, description = "Bad Request", body = crate::openapi::ErrorDoc)))]
pub async fn sign_in(State(state): State<ServerState>, ctx: RequestCtx, jar: CookieJar, ApiJson(input): ApiJson<Credentials>) -> Result<(CookieJar, Json<String>), JsonApiError> {
    let token = state.auth.sign_in(input).await.api(ctx.lang)?;
    Ok((jar.add(token_cookie(token.clone())), Json(token)))
}

#[utoipa::path(post, path = "/api/auth/sign-out", tag = "auth", responses((status = 204, description = "Cookie cleared")))]
pub async fn sign_out(jar: CookieJar) -> (CookieJar, StatusCode) {
    // 无论请求是否携带 cookie，都下发过期的空 auth_token
    let mut cookie = token_cookie(String::new());
    cookie.make_removal();
    (jar.add(cookie), StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/api/auth/me", tag = "auth", responses((status = 200, description = "Current user", body = crate::openapi::UserDoc), (status = 401, description = "Unauthorized", body = crate::openapi::ErrorDoc)))]
pub async fn me(ctx: RequestCtx) -> Result<Json<AuthUser>, JsonApiError> {
    Ok(Json(ctx.authenticated()?.clone()))
}

#[utoipa::path(put, path = "/api/auth/profile", tag = "auth", request_body = crate::openapi::ProfileBodyDoc, responses((status = 200, description = "Updated user", body = crate::openapi::UserDoc), (status = 401, description = "Unauthorized", body = crate::openapi::ErrorDoc)))]
pub async fn update_profile(State(state): State<ServerState>, ctx: RequestCtx, body: GatedBody<ProfileInput>) -> Result<Json<AuthUser>, JsonApiError> {
    let user = ctx.authenticated()?.current_user();
    let ApiJson(body) = body?;
    let updated = state.auth.update_profile(&user, body.data).await.api(ctx.lang)?;
    Ok(Json(updated))
}

#[utoipa::path(put, path = "/api/auth/change-password", tag = "auth", request_body = crate::openapi::PasswordChangeDoc, responses((status = 200, description = "Fresh bearer token", body = String), (status = 400, description = "Bad Request", body = crate::openapi::ErrorDoc)))]
pub async fn change_password(State(state): State<ServerState>, ctx: RequestCtx, jar: CookieJar, input: Result<ApiJson<PasswordChange>, JsonApiError>) -> Result<(CookieJar, Json<String>), JsonApiError> {
    let user = ctx.authenticated()?.current_user();
    let ApiJson(input) = input?;
    let token = state.auth.change_password(&user, input).await.api(ctx.lang)?;
    Ok((jar.add(token_cookie(token.clone())), Json(token)))
}

#[utoipa::path(post, path = "/api/auth/send-password-reset-email", tag = "auth", request_body = crate::openapi::EmailDoc, responses((status = 200, description = "Sent", body = bool), (status = 400, description = "Bad Request", body = crate::openapi::ErrorDoc)))]
pub async fn send_password_reset_email(State(state): State<ServerState>, ctx: RequestCtx, ApiJson(input): ApiJson<EmailBody>) -> Result<Json<bool>, JsonApiError> {
    state.auth.send_password_reset_email(&input.email).await.api(ctx.lang)?;
    Ok(Json(true))
}

#[utoipa::path(put, path = "/api/auth/password-reset", tag = "auth", request_body = crate::openapi::PasswordResetDoc, responses((status = 200, description = "Password replaced", body = bool), (status = 400, description = "Bad Request", body = crate::openapi::ErrorDoc)))]
pub async fn password_reset(State(state): State<ServerState>, ctx: RequestCtx, ApiJson(input): ApiJson<PasswordReset>) -> Result<Json<bool>, JsonApiError> {
    state.auth.password_reset(input).await.api(ctx.lang)?;
    Ok(Json(true))
}

#[utoipa::path(get, path = "/api/auth/email-configured", tag = "auth", responses((status = 200, description = "Whether reset emails can be sent", body = bool)))]
pub async fn email_configured(State(state): State<ServerState>) -> Json<bool> {
    Json(state.auth.is_email_configured())
}
