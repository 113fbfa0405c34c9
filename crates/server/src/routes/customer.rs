use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use models::customer;

use service::pagination::{AutocompleteItem, FindAndCountAll, ListParams, ListQuery};
use service::repositories::customer::{CustomerFilter, CustomerInput};
use service::security::Permission;
use service::services::CustomerService;

use crate::errors::{ApiResultExt, JsonApiError};
use crate::extract::{ApiJson, ApiPath, ApiQuery, AutocompleteQuery, GatedBody, IdsQuery, RequestCtx};
use crate::state::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/customer", post(create).get(list).delete(destroy))
        .route("/api/customer/autocomplete", get(autocomplete))
        .route("/api/customer/:id", put(update).get(find))
}

#[utoipa::path(post, path = "/api/customer", tag = "customer", request_body = crate::openapi::CustomerBodyDoc, responses((status = 200, description = "Created customer"), (status = 400, description = "Bad Request", body = crate::openapi::ErrorDoc), (status = 403, description = "Forbidden", body = crate::openapi::ErrorDoc)))]
pub async fn create(State(state): State<ServerState>, ctx: RequestCtx, body: GatedBody<CustomerInput>) -> Result<Json<customer::Model>, JsonApiError> {
    ctx.require(&Permission::CUSTOMER_CREATE)?;
    let ApiJson(body) = body?;
    let record = CustomerService::new(state.services(ctx.current_user())).create(body.data).await.api(ctx.lang)?;
    Ok(Json(record))
}

#[utoipa::path(put, path = "/api/customer/{id}", tag = "customer", params(("id" = Uuid, Path, description = "Customer id")), request_body = crate::openapi::CustomerBodyDoc, responses((status = 200, description = "Updated customer"), (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)))]
pub async fn update(State(state): State<ServerState>, ctx: RequestCtx, ApiPath(id): ApiPath<Uuid>, body: GatedBody<CustomerInput>) -> Result<Json<customer::Model>, JsonApiError> {
    ctx.require(&Permission::CUSTOMER_EDIT)?;
    let ApiJson(body) = body?;
    let record = CustomerService::new(state.services(ctx.current_user())).update(id, body.data).await.api(ctx.lang)?;
    Ok(Json(record))
}

#[utoipa::path(delete, path = "/api/customer", tag = "customer", params(("ids" = String, Query, description = "Comma separated ids")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)))]
pub async fn destroy(State(state): State<ServerState>, ctx: RequestCtx, ApiQuery(q): ApiQuery<IdsQuery>) -> Result<StatusCode, JsonApiError> {
    ctx.require(&Permission::CUSTOMER_DESTROY)?;
    let ids = q.parse().api(ctx.lang)?;
    CustomerService::new(state.services(ctx.current_user())).destroy_all(&ids).await.api(ctx.lang)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/api/customer/autocomplete", tag = "customer", params(("query" = Option<String>, Query, description = "Search text"), ("limit" = Option<u64>, Query, description = "Max items")), responses((status = 200, description = "Matches", body = [crate::openapi::AutocompleteDoc])))]
pub async fn autocomplete(State(state): State<ServerState>, ctx: RequestCtx, ApiQuery(q): ApiQuery<AutocompleteQuery>) -> Result<Json<Vec<AutocompleteItem>>, JsonApiError> {
    ctx.require(&Permission::CUSTOMER_AUTOCOMPLETE)?;
    let items = CustomerService::new(state.services(ctx.current_user()))
        .find_all_autocomplete(q.query.as_deref(), q.limit)
        .await
        .api(ctx.lang)?;
    Ok(Json(items))
}

#[utoipa::path(get, path = "/api/customer", tag = "customer", params(("name" = Option<String>, Query, description = "Name contains"), ("birthdateRange" = Option<String>, Query, description = "start,end dates"), ("gender" = Option<String>, Query, description = "male or female"), ("createdAtRange" = Option<String>, Query, description = "start,end timestamps"), ("limit" = Option<u64>, Query, description = "Page size"), ("offset" = Option<u64>, Query, description = "Rows to skip"), ("orderBy" = Option<String>, Query, description = "field_ASC or field_DESC")), responses((status = 200, description = "Page of customers with total count")))]
pub async fn list(State(state): State<ServerState>, ctx: RequestCtx, ApiQuery(params): ApiQuery<ListParams>, ApiQuery(filter): ApiQuery<CustomerFilter>) -> Result<Json<FindAndCountAll<customer::Model>>, JsonApiError> {
    ctx.require(&Permission::CUSTOMER_READ)?;
    let page = CustomerService::new(state.services(ctx.current_user()))
        .find_and_count_all(&ListQuery { filter, params })
        .await
        .api(ctx.lang)?;
    Ok(Json(page))
}

#[utoipa::path(get, path = "/api/customer/{id}", tag = "customer", params(("id" = Uuid, Path, description = "Customer id")), responses((status = 200, description = "Customer"), (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)))]
pub async fn find(State(state): State<ServerState>, ctx: RequestCtx, ApiPath(id): ApiPath<Uuid>) -> Result<Json<customer::Model>, JsonApiError> {
    ctx.require(&Permission::CUSTOMER_READ)?;
    let record = CustomerService::new(state.services(ctx.current_user())).find_by_id(id).await.api(ctx.lang)?;
    Ok(Json(record))
}
