use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, ModelTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::{customer, order, order_product, product, user};

use super::file::{self as files, FileInput, FileRecord, Relation};
use super::RepoCtx;
use crate::errors::ServiceError;
use crate::filter::{add_range, non_blank, now, order_by, uuid_or_random, Timestamp};
use crate::pagination::{AutocompleteItem, FindAndCountAll, ListQuery};

pub const TABLE: &str = "orders";
pub const ATTACHMENTS: &str = "attachments";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInput {
    #[serde(default)]
    pub delivered: bool,
    pub customer: Option<Uuid>,
    pub employee: Option<Uuid>,
    #[serde(default)]
    pub products: Vec<Uuid>,
    #[serde(default)]
    pub attachments: Vec<FileInput>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    #[serde(flatten)]
    pub order: order::Model,
    pub customer: Option<customer::Model>,
    pub employee: Option<user::Model>,
    pub products: Vec<product::Model>,
    pub attachments: Vec<FileRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilter {
    pub id: Option<String>,
    pub customer: Option<String>,
    pub employee: Option<String>,
    pub created_at_range: Option<String>,
}

const SORTABLE: &[(&str, order::Column)] = &[
    ("id", order::Column::Id),
    ("delivered", order::Column::Delivered),
    ("createdAt", order::Column::CreatedAt),
    ("updatedAt", order::Column::UpdatedAt),
];

async fn find_live<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<order::Model, ServiceError> {
    order::Entity::find_by_id(id)
        .filter(order::Column::DeletedAt.is_null())
        .one(conn)
        .await?
        .ok_or_else(ServiceError::not_found)
}

/// Referenced customer and employee must exist and be live.
async fn check_references<C: ConnectionTrait>(conn: &C, data: &OrderInput) -> Result<Vec<Uuid>, ServiceError> {
    if let Some(customer_id) = data.customer {
        customer::Entity::find_by_id(customer_id)
            .filter(customer::Column::DeletedAt.is_null())
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::validation("errors.validation.message"))?;
    }
    if let Some(employee_id) = data.employee {
        user::Entity::find_by_id(employee_id)
            .filter(user::Column::DeletedAt.is_null())
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::validation("user.errors.userNotFound"))?;
    }
    let mut product_ids = data.products.clone();
    product_ids.sort();
    product_ids.dedup();
    super::product::find_live_many(conn, &product_ids).await?;
    Ok(product_ids)
}

async fn set_products<C: ConnectionTrait>(conn: &C, order_id: Uuid, product_ids: &[Uuid]) -> Result<(), ServiceError> {
    order_product::Entity::delete_many()
        .filter(order_product::Column::OrderId.eq(order_id))
        .exec(conn)
        .await?;
    for product_id in product_ids {
        order_product::ActiveModel { order_id: Set(order_id), product_id: Set(*product_id) }
            .insert(conn)
            .await?;
    }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(ctx: &RepoCtx<'_, C>, data: OrderInput) -> Result<OrderRecord, ServiceError> {
    let product_ids = check_references(ctx.conn, &data).await?;
    let ts = now();
    let created = order::ActiveModel {
        id: Set(Uuid::new_v4()),
        delivered: Set(data.delivered),
        customer_id: Set(data.customer),
        employee_id: Set(data.employee),
        created_by_id: Set(ctx.user_id()),
        updated_by_id: Set(ctx.user_id()),
        created_at: Set(ts),
        updated_at: Set(ts),
        deleted_at: Set(None),
    }
    .insert(ctx.conn)
    .await?;
    set_products(ctx.conn, created.id, &product_ids).await?;
    files::replace_relation_files(ctx, Relation::new(TABLE, ATTACHMENTS, created.id), &data.attachments).await?;
    find_by_id(ctx, created.id).await
}

pub async fn update<C: ConnectionTrait>(ctx: &RepoCtx<'_, C>, id: Uuid, data: OrderInput) -> Result<OrderRecord, ServiceError> {
    let existing = find_live(ctx.conn, id).await?;
    let product_ids = check_references(ctx.conn, &data).await?;
    let mut am: order::ActiveModel = existing.into();
    am.delivered = Set(data.delivered);
    am.customer_id = Set(data.customer);
    am.employee_id = Set(data.employee);
    am.updated_by_id = Set(ctx.user_id());
    am.updated_at = Set(now());
    am.update(ctx.conn).await?;
    set_products(ctx.conn, id, &product_ids).await?;
    files::replace_relation_files(ctx, Relation::new(TABLE, ATTACHMENTS, id), &data.attachments).await?;
    find_by_id(ctx, id).await
}

pub async fn destroy<C: ConnectionTrait>(ctx: &RepoCtx<'_, C>, id: Uuid) -> Result<(), ServiceError> {
    let existing = find_live(ctx.conn, id).await?;
    let mut am: order::ActiveModel = existing.into();
    am.deleted_at = Set(Some(now()));
    am.updated_by_id = Set(ctx.user_id());
    am.update(ctx.conn).await?;
    Ok(())
}

async fn with_relations<C: ConnectionTrait>(ctx: &RepoCtx<'_, C>, order: order::Model) -> Result<OrderRecord, ServiceError> {
    let customer = order
        .find_related(customer::Entity)
        .filter(customer::Column::DeletedAt.is_null())
        .one(ctx.conn)
        .await?;
    let employee = order
        .find_related(user::Entity)
        .filter(user::Column::DeletedAt.is_null())
        .one(ctx.conn)
        .await?;
    let mut products = order
        .find_related(product::Entity)
        .filter(product::Column::DeletedAt.is_null())
        .order_by_asc(product::Column::Name)
        .all(ctx.conn)
        .await?;
    for p in products.iter_mut() {
        p.unit_price.rescale(2);
    }
    let attachments = files::find_records(ctx, Relation::new(TABLE, ATTACHMENTS, order.id)).await?;
    Ok(OrderRecord { order, customer, employee, products, attachments })
}

pub async fn find_by_id<C: ConnectionTrait>(ctx: &RepoCtx<'_, C>, id: Uuid) -> Result<OrderRecord, ServiceError> {
    let order = find_live(ctx.conn, id).await?;
    with_relations(ctx, order).await
}

pub async fn count<C: ConnectionTrait>(conn: &C) -> Result<u64, ServiceError> {
    Ok(order::Entity::find().filter(order::Column::DeletedAt.is_null()).count(conn).await?)
}

fn build_condition(filter: &OrderFilter) -> Result<Condition, ServiceError> {
    let mut cond = Condition::all().add(order::Column::DeletedAt.is_null());
    if let Some(id) = non_blank(&filter.id) {
        cond = cond.add(order::Column::Id.eq(uuid_or_random(id)));
    }
    if let Some(customer) = non_blank(&filter.customer) {
        cond = cond.add(order::Column::CustomerId.eq(uuid_or_random(customer)));
    }
    if let Some(employee) = non_blank(&filter.employee) {
        cond = cond.add(order::Column::EmployeeId.eq(uuid_or_random(employee)));
    }
    cond = add_range::<Timestamp, _>(cond, order::Column::CreatedAt, &filter.created_at_range)?;
    Ok(cond)
}

pub async fn find_and_count_all<C: ConnectionTrait>(
    ctx: &RepoCtx<'_, C>,
    query: &ListQuery<OrderFilter>,
) -> Result<FindAndCountAll<OrderRecord>, ServiceError> {
    let select = order::Entity::find().filter(build_condition(&query.filter)?);
    let count = select.clone().count(ctx.conn).await?;

    let (column, direction) = order_by(query.params.order_by.as_deref(), SORTABLE, (order::Column::CreatedAt, Order::Desc));
    let orders = query.params.pagination().apply(select.order_by(column, direction)).all(ctx.conn).await?;

    let mut rows = Vec::with_capacity(orders.len());
    for o in orders {
        rows.push(with_relations(ctx, o).await?);
    }
    Ok(FindAndCountAll { rows, count })
}

/// Orders have no display name; they are matched and labelled by id.
pub async fn find_all_autocomplete<C: ConnectionTrait>(
    conn: &C,
    search: Option<&str>,
    limit: Option<u64>,
) -> Result<Vec<AutocompleteItem>, ServiceError> {
    let mut select = order::Entity::find().filter(order::Column::DeletedAt.is_null());
    if let Some(q) = search.map(str::trim).filter(|q| !q.is_empty()) {
        select = select.filter(order::Column::Id.eq(uuid_or_random(q)));
    }
    let records = select
        .order_by_asc(order::Column::Id)
        .limit(limit.filter(|l| *l > 0))
        .all(conn)
        .await?;
    Ok(records
        .into_iter()
        .map(|o| AutocompleteItem { id: o.id.to_string(), label: o.id.to_string() })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::ListParams;
    use crate::repositories::{customer as customers, product as products};
    use crate::test_support::{get_db, test_storage};
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn create_links_customer_and_products() -> anyhow::Result<()> {
        let db = get_db().await?;
        let storage = test_storage();
        let ctx = RepoCtx::new(&db, None, &storage);

        let c = customers::create(&ctx, customers::CustomerInput { name: "Acme".into(), birthdate: None, gender: None }).await?;
        let p1 = products::create(&ctx, products::ProductInput { name: "Bolt".into(), description: None, unit_price: Decimal::new(1, 0), photos: vec![] }).await?;
        let p2 = products::create(&ctx, products::ProductInput { name: "Anvil".into(), description: None, unit_price: Decimal::new(90, 0), photos: vec![] }).await?;

        let data = OrderInput {
            customer: Some(c.id),
            products: vec![p1.product.id, p2.product.id, p1.product.id],
            ..Default::default()
        };
        let created = create(&ctx, data).await?;
        assert!(!created.order.delivered);
        assert_eq!(created.customer.as_ref().map(|c| c.name.as_str()), Some("Acme"));
        assert_eq!(created.products.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(), vec!["Anvil", "Bolt"]);

        let updated = update(&ctx, created.order.id, OrderInput { delivered: true, products: vec![p2.product.id], ..Default::default() }).await?;
        assert!(updated.order.delivered);
        assert!(updated.customer.is_none());
        assert_eq!(updated.products.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_product_is_rejected() -> anyhow::Result<()> {
        let db = get_db().await?;
        let storage = test_storage();
        let ctx = RepoCtx::new(&db, None, &storage);
        let data = OrderInput { products: vec![Uuid::new_v4()], ..Default::default() };
        assert!(matches!(create(&ctx, data).await, Err(ServiceError::Validation(_))));
        assert_eq!(count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn filters_by_customer_and_autocompletes_by_id() -> anyhow::Result<()> {
        let db = get_db().await?;
        let storage = test_storage();
        let ctx = RepoCtx::new(&db, None, &storage);
        let c = customers::create(&ctx, customers::CustomerInput { name: "Acme".into(), birthdate: None, gender: None }).await?;
        let mine = create(&ctx, OrderInput { customer: Some(c.id), ..Default::default() }).await?;
        create(&ctx, OrderInput::default()).await?;

        let q = ListQuery { filter: OrderFilter { customer: Some(c.id.to_string()), ..Default::default() }, params: ListParams::default() };
        let page = find_and_count_all(&ctx, &q).await?;
        assert_eq!(page.count, 1);
        assert_eq!(page.rows[0].order.id, mine.order.id);

        let items = find_all_autocomplete(&db, Some(&mine.order.id.to_string()), None).await?;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, mine.order.id.to_string());
        assert_eq!(find_all_autocomplete(&db, None, Some(1)).await?.len(), 1);
        Ok(())
    }
}
