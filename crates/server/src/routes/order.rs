use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use service::pagination::{AutocompleteItem, FindAndCountAll, ListParams, ListQuery};
use service::repositories::order::{OrderFilter, OrderInput, OrderRecord};
use service::security::Permission;
use service::services::OrderService;

use crate::errors::{ApiResultExt, JsonApiError};
use crate::extract::{ApiJson, ApiPath, ApiQuery, AutocompleteQuery, GatedBody, IdsQuery, RequestCtx};
use crate::state::ServerState;

/// Orders reference a customer, an employee (user) and products; all must be live.
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/order", post(create).get(list).delete(destroy))
        .route("/api/order/autocomplete", get(autocomplete))
        .route("/api/order/:id", put(update).get(find))
}

#[utoipa::path(post, path = "/api/order", tag = "order", request_body = crate::openapi::OrderBodyDoc, responses((status = 200, description = "Created order"), (status = 400, description = "Bad Request", body = crate::openapi::ErrorDoc), (status = 403, description = "Forbidden", body = crate::openapi::ErrorDoc)))]
pub async fn create(State(state): State<ServerState>, ctx: RequestCtx, body: GatedBody<OrderInput>) -> Result<Json<OrderRecord>, JsonApiError> {
    ctx.require(&Permission::ORDER_CREATE)?;
    let ApiJson(body) = body?;
    let record = OrderService::new(state.services(ctx.current_user())).create(body.data).await.api(ctx.lang)?;
    Ok(Json(record))
}

#[utoipa::path(put, path = "/api/order/{id}", tag = "order", params(("id" = Uuid, Path, description = "Order id")), request_body = crate::openapi::OrderBodyDoc, responses((status = 200, description = "Updated order"), (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)))]
pub async fn update(State(state): State<ServerState>, ctx: RequestCtx, ApiPath(id): ApiPath<Uuid>, body: GatedBody<OrderInput>) -> Result<Json<OrderRecord>, JsonApiError> {
    ctx.require(&Permission::ORDER_EDIT)?;
    let ApiJson(body) = body?;
    let record = OrderService::new(state.services(ctx.current_user())).update(id, body.data).await.api(ctx.lang)?;
    Ok(Json(record))
}

#[utoipa::path(delete, path = "/api/order", tag = "order", params(("ids" = String, Query, description = "Comma separated ids")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)))]
pub async fn destroy(State(state): State<ServerState>, ctx: RequestCtx, ApiQuery(q): ApiQuery<IdsQuery>) -> Result<StatusCode, JsonApiError> {
    ctx.require(&Permission::ORDER_DESTROY)?;
    let ids = q.parse().api(ctx.lang)?;
    OrderService::new(state.services(ctx.current_user())).destroy_all(&ids).await.api(ctx.lang)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/api/order/autocomplete", tag = "order", params(("query" = Option<String>, Query, description = "Search text"), ("limit" = Option<u64>, Query, description = "Max items")), responses((status = 200, description = "Matches", body = [crate::openapi::AutocompleteDoc])))]
pub async fn autocomplete(State(state): State<ServerState>, ctx: RequestCtx, ApiQuery(q): ApiQuery<AutocompleteQuery>) -> Result<Json<Vec<AutocompleteItem>>, JsonApiError> {
    ctx.require(&Permission::ORDER_AUTOCOMPLETE)?;
    let items = OrderService::new(state.services(ctx.current_user()))
        .find_all_autocomplete(q.query.as_deref(), q.limit)
        .await
        .api(ctx.lang)?;
    Ok(Json(items))
}

#[utoipa::path(get, path = "/api/order", tag = "order", params(("customer" = Option<String>, Query, description = "Customer id"), ("employee" = Option<String>, Query, description = "Employee id"), ("createdAtRange" = Option<String>, Query, description = "start,end timestamps"), ("limit" = Option<u64>, Query, description = "Page size"), ("offset" = Option<u64>, Query, description = "Rows to skip"), ("orderBy" = Option<String>, Query, description = "field_ASC or field_DESC")), responses((status = 200, description = "Page of orders with total count")))]
pub async fn list(State(state): State<ServerState>, ctx: RequestCtx, ApiQuery(params): ApiQuery<ListParams>, ApiQuery(filter): ApiQuery<OrderFilter>) -> Result<Json<FindAndCountAll<OrderRecord>>, JsonApiError> {
    ctx.require(&Permission::ORDER_READ)?;
    let page = OrderService::new(state.services(ctx.current_user()))
        .find_and_count_all(&ListQuery { filter, params })
        .await
        .api(ctx.lang)?;
    Ok(Json(page))
}

#[utoipa::path(get, path = "/api/order/{id}", tag = "order", params(("id" = Uuid, Path, description = "Order id")), responses((status = 200, description = "Order"), (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)))]
pub async fn find(State(state): State<ServerState>, ctx: RequestCtx, ApiPath(id): ApiPath<Uuid>) -> Result<Json<OrderRecord>, JsonApiError> {
    ctx.require(&Permission::ORDER_READ)?;
    let record = OrderService::new(state.services(ctx.current_user())).find_by_id(id).await.api(ctx.lang)?;
    Ok(Json(record))
}
