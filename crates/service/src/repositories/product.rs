use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, Order, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::product;

use super::file::{self as files, FileInput, FileRecord, Relation};
use super::RepoCtx;
use crate::errors::ServiceError;
use crate::filter::{add_range, ilike, non_blank, now, order_by, uuid_or_random, Timestamp};
use crate::pagination::{AutocompleteItem, FindAndCountAll, ListQuery};

pub const TABLE: &str = "products";
pub const PHOTOS: &str = "photos";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub unit_price: Decimal,
    #[serde(default)]
    pub photos: Vec<FileInput>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    #[serde(flatten)]
    pub product: product::Model,
    pub photos: Vec<FileRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub id: Option<String>,
    pub name: Option<String>,
    pub unit_price_range: Option<String>,
    pub created_at_range: Option<String>,
}

const SORTABLE: &[(&str, product::Column)] = &[
    ("id", product::Column::Id),
    ("name", product::Column::Name),
    ("unitPrice", product::Column::UnitPrice),
    ("createdAt", product::Column::CreatedAt),
    ("updatedAt", product::Column::UpdatedAt),
];

async fn find_live<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<product::Model, ServiceError> {
    product::Entity::find_by_id(id)
        .filter(product::Column::DeletedAt.is_null())
        .one(conn)
        .await?
        .ok_or_else(ServiceError::not_found)
}

/// Products referenced by id that are live; missing ids are a validation error.
pub async fn find_live_many<C: ConnectionTrait>(conn: &C, ids: &[Uuid]) -> Result<Vec<product::Model>, ServiceError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let found = product::Entity::find()
        .filter(product::Column::Id.is_in(ids.iter().copied()))
        .filter(product::Column::DeletedAt.is_null())
        .all(conn)
        .await?;
    if found.len() != ids.len() {
        return Err(ServiceError::validation("errors.validation.message"));
    }
    Ok(found)
}

fn trimmed_description(description: Option<String>) -> Option<String> {
    description.map(|d| d.trim().to_string()).filter(|d| !d.is_empty())
}

pub async fn create<C: ConnectionTrait>(ctx: &RepoCtx<'_, C>, data: ProductInput) -> Result<ProductRecord, ServiceError> {
    product::validate_name(&data.name)?;
    let unit_price = product::normalize_unit_price(data.unit_price)?;
    let ts = now();
    let created = product::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(data.name.trim().to_string()),
        description: Set(trimmed_description(data.description)),
        unit_price: Set(unit_price),
        created_by_id: Set(ctx.user_id()),
        updated_by_id: Set(ctx.user_id()),
        created_at: Set(ts),
        updated_at: Set(ts),
        deleted_at: Set(None),
    }
    .insert(ctx.conn)
    .await?;
    files::replace_relation_files(ctx, Relation::new(TABLE, PHOTOS, created.id), &data.photos).await?;
    find_by_id(ctx, created.id).await
}

pub async fn update<C: ConnectionTrait>(ctx: &RepoCtx<'_, C>, id: Uuid, data: ProductInput) -> Result<ProductRecord, ServiceError> {
    product::validate_name(&data.name)?;
    let unit_price = product::normalize_unit_price(data.unit_price)?;
    let existing = find_live(ctx.conn, id).await?;
    let mut am: product::ActiveModel = existing.into();
    am.name = Set(data.name.trim().to_string());
    am.description = Set(trimmed_description(data.description));
    am.unit_price = Set(unit_price);
    am.updated_by_id = Set(ctx.user_id());
    am.updated_at = Set(now());
    am.update(ctx.conn).await?;
    files::replace_relation_files(ctx, Relation::new(TABLE, PHOTOS, id), &data.photos).await?;
    find_by_id(ctx, id).await
}

pub async fn destroy<C: ConnectionTrait>(ctx: &RepoCtx<'_, C>, id: Uuid) -> Result<(), ServiceError> {
    let existing = find_live(ctx.conn, id).await?;
    let mut am: product::ActiveModel = existing.into();
    am.deleted_at = Set(Some(now()));
    am.updated_by_id = Set(ctx.user_id());
    am.update(ctx.conn).await?;
    Ok(())
}

async fn with_relations<C: ConnectionTrait>(ctx: &RepoCtx<'_, C>, mut product: product::Model) -> Result<ProductRecord, ServiceError> {
    // some backends hand back the price without its scale
    product.unit_price.rescale(2);
    let photos = files::find_records(ctx, Relation::new(TABLE, PHOTOS, product.id)).await?;
    Ok(ProductRecord { product, photos })
}

pub async fn find_by_id<C: ConnectionTrait>(ctx: &RepoCtx<'_, C>, id: Uuid) -> Result<ProductRecord, ServiceError> {
    let product = find_live(ctx.conn, id).await?;
    with_relations(ctx, product).await
}

pub async fn count<C: ConnectionTrait>(conn: &C) -> Result<u64, ServiceError> {
    Ok(product::Entity::find().filter(product::Column::DeletedAt.is_null()).count(conn).await?)
}

fn build_condition(filter: &ProductFilter) -> Result<Condition, ServiceError> {
    let mut cond = Condition::all().add(product::Column::DeletedAt.is_null());
    if let Some(id) = non_blank(&filter.id) {
        cond = cond.add(product::Column::Id.eq(uuid_or_random(id)));
    }
    if let Some(name) = non_blank(&filter.name) {
        cond = cond.add(ilike(product::Column::Name, name));
    }
    cond = add_range::<Decimal, _>(cond, product::Column::UnitPrice, &filter.unit_price_range)?;
    cond = add_range::<Timestamp, _>(cond, product::Column::CreatedAt, &filter.created_at_range)?;
    Ok(cond)
}

pub async fn find_and_count_all<C: ConnectionTrait>(
    ctx: &RepoCtx<'_, C>,
    query: &ListQuery<ProductFilter>,
) -> Result<FindAndCountAll<ProductRecord>, ServiceError> {
    let select = product::Entity::find().filter(build_condition(&query.filter)?);
    let count = select.clone().count(ctx.conn).await?;

    let (column, order) = order_by(query.params.order_by.as_deref(), SORTABLE, (product::Column::CreatedAt, Order::Desc));
    let products = query.params.pagination().apply(select.order_by(column, order)).all(ctx.conn).await?;

    let mut rows = Vec::with_capacity(products.len());
    for p in products {
        rows.push(with_relations(ctx, p).await?);
    }
    Ok(FindAndCountAll { rows, count })
}

pub async fn find_all_autocomplete<C: ConnectionTrait>(
    conn: &C,
    search: Option<&str>,
    limit: Option<u64>,
) -> Result<Vec<AutocompleteItem>, ServiceError> {
    let mut select = product::Entity::find().filter(product::Column::DeletedAt.is_null());
    if let Some(q) = search.map(str::trim).filter(|q| !q.is_empty()) {
        select = select.filter(
            Condition::any()
                .add(product::Column::Id.eq(uuid_or_random(q)))
                .add(ilike(product::Column::Name, q)),
        );
    }
    let records = select
        .order_by_asc(product::Column::Name)
        .limit(limit.filter(|l| *l > 0))
        .all(conn)
        .await?;
    Ok(records.into_iter().map(|p| AutocompleteItem { id: p.id.to_string(), label: p.name }).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::ListParams;
    use crate::test_support::{admin, get_db, test_storage};

    fn input(name: &str, price: Decimal) -> ProductInput {
        ProductInput { name: name.into(), description: Some("  ".into()), unit_price: price, photos: vec![] }
    }

    #[tokio::test]
    async fn create_with_photos() -> anyhow::Result<()> {
        let db = get_db().await?;
        let storage = test_storage();
        let user = admin();
        let ctx = RepoCtx::new(&db, Some(&user), &storage);

        let mut data = input("Green Tea", Decimal::new(1999, 3));
        data.photos = vec![FileInput {
            name: "tea.png".into(),
            private_url: Some("product/photos/tea.png".into()),
            new: true,
            ..Default::default()
        }];
        let created = create(&ctx, data).await?;
        assert_eq!(created.product.unit_price, Decimal::new(200, 2));
        assert_eq!(created.product.description, None);
        assert_eq!(created.photos.len(), 1);
        assert_eq!(
            created.photos[0].download_url.as_deref(),
            Some("http://localhost:8080/api/file/download?privateUrl=product%2Fphotos%2Ftea.png")
        );

        let json = serde_json::to_value(&created)?;
        assert_eq!(json["name"], "Green Tea");
        assert!(json["photos"].is_array());
        Ok(())
    }

    #[tokio::test]
    async fn rejects_out_of_range_price() -> anyhow::Result<()> {
        let db = get_db().await?;
        let storage = test_storage();
        let ctx = RepoCtx::new(&db, None, &storage);
        assert!(create(&ctx, input("Gold", Decimal::new(100000, 0))).await.is_err());
        assert_eq!(count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn filters_by_price_range() -> anyhow::Result<()> {
        let db = get_db().await?;
        let storage = test_storage();
        let ctx = RepoCtx::new(&db, None, &storage);
        create(&ctx, input("Cheap", Decimal::new(5, 0))).await?;
        create(&ctx, input("Mid", Decimal::new(50, 0))).await?;
        create(&ctx, input("Pricey", Decimal::new(500, 0))).await?;

        let q = ListQuery {
            filter: ProductFilter { unit_price_range: Some("10,100".into()), ..Default::default() },
            params: ListParams::default(),
        };
        let page = find_and_count_all(&ctx, &q).await?;
        assert_eq!(page.count, 1);
        assert_eq!(page.rows[0].product.name, "Mid");

        let sorted = ListQuery { filter: ProductFilter::default(), params: ListParams { order_by: Some("unitPrice_DESC".into()), ..Default::default() } };
        let names: Vec<String> = find_and_count_all(&ctx, &sorted).await?.rows.into_iter().map(|r| r.product.name).collect();
        assert_eq!(names, vec!["Pricey", "Mid", "Cheap"]);
        Ok(())
    }

    #[tokio::test]
    async fn destroyed_products_disappear_from_autocomplete() -> anyhow::Result<()> {
        let db = get_db().await?;
        let storage = test_storage();
        let ctx = RepoCtx::new(&db, None, &storage);
        let p = create(&ctx, input("Coffee", Decimal::new(3, 0))).await?;
        assert_eq!(find_all_autocomplete(&db, Some("cof"), None).await?.len(), 1);
        destroy(&ctx, p.product.id).await?;
        assert!(find_all_autocomplete(&db, Some("cof"), None).await?.is_empty());
        Ok(())
    }
}
