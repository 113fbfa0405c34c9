use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use service::pagination::{AutocompleteItem, FindAndCountAll, ListParams, ListQuery};
use service::repositories::product::{ProductFilter, ProductInput, ProductRecord};
use service::security::Permission;
use service::services::ProductService;

use crate::errors::{ApiResultExt, JsonApiError};
use crate::extract::{ApiJson, ApiPath, ApiQuery, AutocompleteQuery, GatedBody, IdsQuery, RequestCtx};
use crate::state::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/product", post(create).get(list).delete(destroy))
        .route("/api/product/autocomplete", get(autocomplete))
        .route("/api/product/:id", put(update).get(find))
}

#[utoipa::path(post, path = "/api/product", tag = "product", request_body = crate::openapi::ProductBodyDoc, responses((status = 200, description = "Created product"), (status = 400, description = "Bad Request", body = crate::openapi::ErrorDoc), (status = 403, description = "Forbidden", body = crate::openapi::ErrorDoc)))]
pub async fn create(State(state): State<ServerState>, ctx: RequestCtx, body: GatedBody<ProductInput>) -> Result<Json<ProductRecord>, JsonApiError> {
    ctx.require(&Permission::PRODUCT_CREATE)?;
    let ApiJson(body) = body?;
    let record = ProductService::new(state.services(ctx.current_user())).create(body.data).await.api(ctx.lang)?;
    Ok(Json(record))
}

#[utoipa::path(put, path = "/api/product/{id}", tag = "product", params(("id" = Uuid, Path, description = "Product id")), request_body = crate::openapi::ProductBodyDoc, responses((status = 200, description = "Updated product"), (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)))]
pub async fn update(State(state): State<ServerState>, ctx: RequestCtx, ApiPath(id): ApiPath<Uuid>, body: GatedBody<ProductInput>) -> Result<Json<ProductRecord>, JsonApiError> {
    ctx.require(&Permission::PRODUCT_EDIT)?;
    let ApiJson(body) = body?;
    let record = ProductService::new(state.services(ctx.current_user())).update(id, body.data).await.api(ctx.lang)?;
    Ok(Json(record))
}

#[utoipa::path(delete, path = "/api/product", tag = "product", params(("ids" = String, Query, description = "Comma separated ids")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)))]
pub async fn destroy(State(state): State<ServerState>, ctx: RequestCtx, ApiQuery(q): ApiQuery<IdsQuery>) -> Result<StatusCode, JsonApiError> {
    ctx.require(&Permission::PRODUCT_DESTROY)?;
    let ids = q.parse().api(ctx.lang)?;
    ProductService::new(state.services(ctx.current_user())).destroy_all(&ids).await.api(ctx.lang)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/api/product/autocomplete", tag = "product", params(("query" = Option<String>, Query, description = "Search text"), ("limit" = Option<u64>, Query, description = "Max items")), responses((status = 200, description = "Matches", body = [crate::openapi::AutocompleteDoc])))]
pub async fn autocomplete(State(state): State<ServerState>, ctx: RequestCtx, ApiQuery(q): ApiQuery<AutocompleteQuery>) -> Result<Json<Vec<AutocompleteItem>>, JsonApiError> {
    ctx.require(&Permission::PRODUCT_AUTOCOMPLETE)?;
    let items = ProductService::new(state.services(ctx.current_user()))
        .find_all_autocomplete(q.query.as_deref(), q.limit)
        .await
        .api(ctx.lang)?;
    Ok(Json(items))
}

#[utoipa::path(get, path = "/api/product", tag = "product", params(("name" = Option<String>, Query, description = "Name contains"), ("unitPriceRange" = Option<String>, Query, description = "min,max price"), ("createdAtRange" = Option<String>, Query, description = "start,end timestamps"), ("limit" = Option<u64>, Query, description = "Page size"), ("offset" = Option<u64>, Query, description = "Rows to skip"), ("orderBy" = Option<String>, Query, description = "field_ASC or field_DESC")), responses((status = 200, description = "Page of products with total count")))]
pub async fn list(State(state): State<ServerState>, ctx: RequestCtx, ApiQuery(params): ApiQuery<ListParams>, ApiQuery(filter): ApiQuery<ProductFilter>) -> Result<Json<FindAndCountAll<ProductRecord>>, JsonApiError> {
    ctx.require(&Permission::PRODUCT_READ)?;
    let page = ProductService::new(state.services(ctx.current_user()))
        .find_and_count_all(&ListQuery { filter, params })
        .await
        .api(ctx.lang)?;
    Ok(Json(page))
}

#[utoipa::path(get, path = "/api/product/{id}", tag = "product", params(("id" = Uuid, Path, description = "Product id")), responses((status = 200, description = "Product"), (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)))]
pub async fn find(State(state): State<ServerState>, ctx: RequestCtx, ApiPath(id): ApiPath<Uuid>) -> Result<Json<ProductRecord>, JsonApiError> {
    ctx.require(&Permission::PRODUCT_READ)?;
    let record = ProductService::new(state.services(ctx.current_user())).find_by_id(id).await.api(ctx.lang)?;
    Ok(Json(record))
}
