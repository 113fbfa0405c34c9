use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, Order, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::Deserialize;
use uuid::Uuid;

use models::customer::{self, Gender};

use super::RepoCtx;
use crate::errors::ServiceError;
use crate::filter::{add_range, ilike, non_blank, now, order_by, uuid_or_random, Timestamp};
use crate::pagination::{AutocompleteItem, FindAndCountAll, ListQuery};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    pub name: String,
    pub birthdate: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerFilter {
    pub id: Option<String>,
    pub name: Option<String>,
    pub birthdate_range: Option<String>,
    pub gender: Option<String>,
    pub created_at_range: Option<String>,
}

const SORTABLE: &[(&str, customer::Column)] = &[
    ("id", customer::Column::Id),
    ("name", customer::Column::Name),
    ("birthdate", customer::Column::Birthdate),
    ("gender", customer::Column::Gender),
    ("createdAt", customer::Column::CreatedAt),
    ("updatedAt", customer::Column::UpdatedAt),
];

async fn find_live<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<customer::Model, ServiceError> {
    customer::Entity::find_by_id(id)
        .filter(customer::Column::DeletedAt.is_null())
        .one(conn)
        .await?
        .ok_or_else(ServiceError::not_found)
}

pub async fn create<C: ConnectionTrait>(ctx: &RepoCtx<'_, C>, data: CustomerInput) -> Result<customer::Model, ServiceError> {
    customer::validate_name(&data.name)?;
    let ts = now();
    let created = customer::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(data.name.trim().to_string()),
        birthdate: Set(data.birthdate),
        gender: Set(data.gender),
        created_by_id: Set(ctx.user_id()),
        updated_by_id: Set(ctx.user_id()),
        created_at: Set(ts),
        updated_at: Set(ts),
        deleted_at: Set(None),
    }
    .insert(ctx.conn)
    .await?;
    find_by_id(ctx, created.id).await
}

pub async fn update<C: ConnectionTrait>(ctx: &RepoCtx<'_, C>, id: Uuid, data: CustomerInput) -> Result<customer::Model, ServiceError> {
    customer::validate_name(&data.name)?;
    let existing = find_live(ctx.conn, id).await?;
    let mut am: customer::ActiveModel = existing.into();
    am.name = Set(data.name.trim().to_string());
    am.birthdate = Set(data.birthdate);
    am.gender = Set(data.gender);
    am.updated_by_id = Set(ctx.user_id());
    am.updated_at = Set(now());
    am.update(ctx.conn).await?;
    find_by_id(ctx, id).await
}

pub async fn destroy<C: ConnectionTrait>(ctx: &RepoCtx<'_, C>, id: Uuid) -> Result<(), ServiceError> {
    let existing = find_live(ctx.conn, id).await?;
    let mut am: customer::ActiveModel = existing.into();
    am.deleted_at = Set(Some(now()));
    am.updated_by_id = Set(ctx.user_id());
    am.update(ctx.conn).await?;
    Ok(())
}

pub async fn find_by_id<C: ConnectionTrait>(ctx: &RepoCtx<'_, C>, id: Uuid) -> Result<customer::Model, ServiceError> {
    find_live(ctx.conn, id).await
}

pub async fn count<C: ConnectionTrait>(conn: &C) -> Result<u64, ServiceError> {
    Ok(customer::Entity::find().filter(customer::Column::DeletedAt.is_null()).count(conn).await?)
}

fn build_condition(filter: &CustomerFilter) -> Result<Condition, ServiceError> {
    let mut cond = Condition::all().add(customer::Column::DeletedAt.is_null());
    if let Some(id) = non_blank(&filter.id) {
        cond = cond.add(customer::Column::Id.eq(uuid_or_random(id)));
    }
    if let Some(name) = non_blank(&filter.name) {
        cond = cond.add(ilike(customer::Column::Name, name));
    }
    cond = add_range::<NaiveDate, _>(cond, customer::Column::Birthdate, &filter.birthdate_range)?;
    if let Some(gender) = non_blank(&filter.gender) {
        cond = cond.add(customer::Column::Gender.eq(gender));
    }
    cond = add_range::<Timestamp, _>(cond, customer::Column::CreatedAt, &filter.created_at_range)?;
    Ok(cond)
}

pub async fn find_and_count_all<C: ConnectionTrait>(
    ctx: &RepoCtx<'_, C>,
    query: &ListQuery<CustomerFilter>,
) -> Result<FindAndCountAll<customer::Model>, ServiceError> {
    let select = customer::Entity::find().filter(build_condition(&query.filter)?);
    let count = select.clone().count(ctx.conn).await?;

    let (column, order) = order_by(query.params.order_by.as_deref(), SORTABLE, (customer::Column::CreatedAt, Order::Desc));
    let rows = query.params.pagination().apply(select.order_by(column, order)).all(ctx.conn).await?;
    Ok(FindAndCountAll { rows, count })
}

pub async fn find_all_autocomplete<C: ConnectionTrait>(
    conn: &C,
    search: Option<&str>,
    limit: Option<u64>,
) -> Result<Vec<AutocompleteItem>, ServiceError> {
    let mut select = customer::Entity::find().filter(customer::Column::DeletedAt.is_null());
    if let Some(q) = search.map(str::trim).filter(|q| !q.is_empty()) {
        select = select.filter(
            Condition::any()
                .add(customer::Column::Id.eq(uuid_or_random(q)))
                .add(ilike(customer::Column::Name, q)),
        );
    }
    let records = select
        .order_by_asc(customer::Column::Name)
        .limit(limit.filter(|l| *l > 0))
        .all(conn)
        .await?;
    Ok(records.into_iter().map(|c| AutocompleteItem { id: c.id.to_string(), label: c.name }).collect())
}
