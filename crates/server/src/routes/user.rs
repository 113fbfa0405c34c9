use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use service::pagination::{AutocompleteItem, FindAndCountAll, ListParams, ListQuery};
use service::repositories::user::{UserFilter, UserRecord};
use service::security::Permission;
use service::services::user::{UserEdit, UserInvite};
use service::services::{UserCreator, UserDestroyer, UserEditor, UserService};

use crate::errors::{ApiResultExt, JsonApiError};
use crate::extract::{ApiJson, ApiPath, ApiQuery, AutocompleteQuery, GatedBody, IdsQuery, RequestCtx};
use crate::state::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/user", get(list).post(invite).put(edit).delete(destroy))
        .route("/api/user/autocomplete", get(autocomplete))
        .route("/api/user/:id", get(find))
}

/// Invite one or more emails with the given roles.
#[utoipa::path(post, path = "/api/user", tag = "user", request_body = crate::openapi::UserInviteBodyDoc, responses((status = 204, description = "Invited"), (status = 400, description = "Bad Request", body = crate::openapi::ErrorDoc), (status = 403, description = "Forbidden", body = crate::openapi::ErrorDoc)))]
pub async fn invite(State(state): State<ServerState>, ctx: RequestCtx, body: GatedBody<UserInvite>) -> Result<StatusCode, JsonApiError> {
    ctx.require(&Permission::USER_CREATE)?;
    let ApiJson(body) = body?;
    UserCreator::new(state.services(ctx.current_user())).execute(body.data).await.api(ctx.lang)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(put, path = "/api/user", tag = "user", request_body = crate::openapi::UserEditBodyDoc, responses((status = 200, description = "Updated user", body = crate::openapi::UserDoc), (status = 400, description = "Bad Request", body = crate::openapi::ErrorDoc)))]
pub async fn edit(State(state): State<ServerState>, ctx: RequestCtx, body: GatedBody<UserEdit>) -> Result<Json<UserRecord>, JsonApiError> {
    ctx.require(&Permission::USER_EDIT)?;
    let ApiJson(body) = body?;
    let record = UserEditor::new(state.services(ctx.current_user())).update(body.data).await.api(ctx.lang)?;
    Ok(Json(record))
}

#[utoipa::path(delete, path = "/api/user", tag = "user", params(("ids" = String, Query, description = "Comma separated ids")), responses((status = 204, description = "Deleted"), (status = 400, description = "Bad Request", body = crate::openapi::ErrorDoc)))]
pub async fn destroy(State(state): State<ServerState>, ctx: RequestCtx, ApiQuery(q): ApiQuery<IdsQuery>) -> Result<StatusCode, JsonApiError> {
    ctx.require(&Permission::USER_DESTROY)?;
    let ids = q.parse().api(ctx.lang)?;
    UserDestroyer::new(state.services(ctx.current_user())).destroy_all(&ids).await.api(ctx.lang)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/api/user/autocomplete", tag = "user", params(("query" = Option<String>, Query, description = "Search text"), ("limit" = Option<u64>, Query, description = "Max items")), responses((status = 200, description = "Matches", body = [crate::openapi::AutocompleteDoc])))]
pub async fn autocomplete(State(state): State<ServerState>, ctx: RequestCtx, ApiQuery(q): ApiQuery<AutocompleteQuery>) -> Result<Json<Vec<AutocompleteItem>>, JsonApiError> {
    ctx.require(&Permission::USER_AUTOCOMPLETE)?;
    let items = UserService::new(state.services(ctx.current_user()))
        .find_all_autocomplete(q.query.as_deref(), q.limit)
        .await
        .api(ctx.lang)?;
    Ok(Json(items))
}

#[utoipa::path(get, path = "/api/user", tag = "user", params(("fullName" = Option<String>, Query, description = "Full name contains"), ("email" = Option<String>, Query, description = "Email contains"), ("role" = Option<String>, Query, description = "Has role"), ("status" = Option<String>, Query, description = "enabled or disabled"), ("createdAtRange" = Option<String>, Query, description = "start,end timestamps"), ("limit" = Option<u64>, Query, description = "Page size"), ("offset" = Option<u64>, Query, description = "Rows to skip"), ("orderBy" = Option<String>, Query, description = "field_ASC or field_DESC")), responses((status = 200, description = "Page of users with total count")))]
pub async fn list(State(state): State<ServerState>, ctx: RequestCtx, ApiQuery(params): ApiQuery<ListParams>, ApiQuery(filter): ApiQuery<UserFilter>) -> Result<Json<FindAndCountAll<UserRecord>>, JsonApiError> {
    ctx.require(&Permission::USER_READ)?;
    let page = UserService::new(state.services(ctx.current_user()))
        .find_and_count_all(&ListQuery { filter, params })
        .await
        .api(ctx.lang)?;
    Ok(Json(page))
}

#[utoipa::path(get, path = "/api/user/{id}", tag = "user", params(("id" = Uuid, Path, description = "User id")), responses((status = 200, description = "User", body = crate::openapi::UserDoc), (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)))]
pub async fn find(State(state): State<ServerState>, ctx: RequestCtx, ApiPath(id): ApiPath<Uuid>) -> Result<Json<UserRecord>, JsonApiError> {
    ctx.require(&Permission::USER_READ)?;
    let record = UserService::new(state.services(ctx.current_user())).find_by_id(id).await.api(ctx.lang)?;
    Ok(Json(record))
}
