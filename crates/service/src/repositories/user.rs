use chrono::Duration;
use rand::RngCore;
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, Order, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use models::{user, user_credentials, user_role};

use super::file::{self as files, FileInput, FileRecord, Relation};
use super::RepoCtx;
use crate::errors::ServiceError;
use crate::filter::{add_range, ilike, non_blank, now, order_by, uuid_or_random, Timestamp};
use crate::pagination::{AutocompleteItem, FindAndCountAll, ListQuery};
use crate::security::roles::parse_stored;
use crate::security::{CurrentUser, Role};

pub const TABLE: &str = "users";
pub const AVATARS: &str = "avatars";
pub const PASSWORD_ALGORITHM: &str = "argon2";
pub const RESET_TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(flatten)]
    pub user: user::Model,
    pub roles: Vec<Role>,
    pub avatars: Vec<FileRecord>,
}

impl UserRecord {
    pub fn current_user(&self) -> CurrentUser {
        CurrentUser { id: self.user.id, email: self.user.email.clone(), roles: self.roles.clone() }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub avatars: Vec<FileInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    #[serde(default)]
    pub avatars: Vec<FileInput>,
}

/// Full edit: profile fields, avatars and, when given, the role set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub roles: Option<Vec<Role>>,
    #[serde(default)]
    pub avatars: Vec<FileInput>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolesUpdateMode {
    /// the given roles become the full set
    Replace,
    /// union with existing roles
    Add,
    /// drop only the given roles
    RemoveOnly,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilter {
    pub id: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    /// `enabled` (has a role) or `disabled` (no roles)
    pub status: Option<String>,
    pub created_at_range: Option<String>,
}

const SORTABLE: &[(&str, user::Column)] = &[
    ("id", user::Column::Id),
    ("email", user::Column::Email),
    ("fullName", user::Column::FullName),
    ("firstName", user::Column::FirstName),
    ("lastName", user::Column::LastName),
    ("createdAt", user::Column::CreatedAt),
    ("updatedAt", user::Column::UpdatedAt),
];

pub fn label(user: &user::Model) -> String {
    match user.full_name.as_deref().filter(|n| !n.is_empty()) {
        Some(name) => format!("{name} <{}>", user.email),
        None => user.email.clone(),
    }
}

pub async fn find_live<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<user::Model>, ServiceError> {
    Ok(user::Entity::find_by_id(id)
        .filter(user::Column::DeletedAt.is_null())
        .one(conn)
        .await?)
}

async fn require_live<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<user::Model, ServiceError> {
    find_live(conn, id).await?.ok_or_else(ServiceError::not_found)
}

pub async fn find_by_email<C: ConnectionTrait>(conn: &C, email: &str) -> Result<Option<user::Model>, ServiceError> {
    Ok(user::Entity::find()
        .filter(user::Column::Email.eq(email.trim()))
        .filter(user::Column::DeletedAt.is_null())
        .one(conn)
        .await?)
}

pub async fn find_roles<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<Vec<Role>, ServiceError> {
    let rows = user_role::Entity::find()
        .filter(user_role::Column::UserId.eq(user_id))
        .order_by_asc(user_role::Column::Role)
        .all(conn)
        .await?;
    Ok(parse_stored(rows.into_iter().map(|r| r.role)))
}

/// Stored password hash, if the user has signed up.
pub async fn find_password<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<Option<String>, ServiceError> {
    Ok(user_credentials::find_by_user(conn, user_id).await?.map(|c| c.password_hash))
}

async fn insert_user<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    first_name: Option<&str>,
    last_name: Option<&str>,
    phone_number: Option<&str>,
    actor: Option<Uuid>,
) -> Result<user::Model, ServiceError> {
    let email = email.trim();
    user::validate_email(email)?;
    user::validate_profile(first_name, last_name, phone_number)?;
    if find_by_email(conn, email).await?.is_some() {
        return Err(ServiceError::validation("user.errors.userAlreadyExists"));
    }
    let first_name = user::trim_optional(first_name);
    let last_name = user::trim_optional(last_name);
    let ts = now();
    let created = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        full_name: Set(user::build_full_name(first_name.as_deref(), last_name.as_deref())),
        first_name: Set(first_name),
        last_name: Set(last_name),
        phone_number: Set(user::trim_optional(phone_number)),
        email_verified: Set(false),
        password_reset_token: Set(None),
        password_reset_token_expires_at: Set(None),
        jwt_token_invalid_before: Set(None),
        created_by_id: Set(actor),
        updated_by_id: Set(actor),
        created_at: Set(ts),
        updated_at: Set(ts),
        deleted_at: Set(None),
    }
    .insert(conn)
    .await?;
    Ok(created)
}

/// Invite a user: profile, roles and avatars, no password.
pub async fn create<C: ConnectionTrait>(ctx: &RepoCtx<'_, C>, data: UserInput) -> Result<UserRecord, ServiceError> {
    let created = insert_user(
        ctx.conn,
        &data.email,
        data.first_name.as_deref(),
        data.last_name.as_deref(),
        data.phone_number.as_deref(),
        ctx.user_id(),
    )
    .await?;
    update_roles(ctx.conn, created.id, &data.roles, RolesUpdateMode::Replace).await?;
    files::replace_relation_files(ctx, Relation::new(TABLE, AVATARS, created.id), &data.avatars).await?;
    info!(user_id = %created.id, "user created");
    find_by_id(ctx, created.id).await
}

/// Sign-up path: user plus credentials, with the given roles.
pub async fn create_from_auth<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    first_name: Option<&str>,
    roles: &[Role],
    password_hash: String,
) -> Result<user::Model, ServiceError> {
    let created = insert_user(conn, email, first_name, None, None, None).await?;
    user_credentials::upsert_password(conn, created.id, password_hash, PASSWORD_ALGORITHM).await?;
    update_roles(conn, created.id, roles, RolesUpdateMode::Replace).await?;
    Ok(created)
}

pub async fn update_profile<C: ConnectionTrait>(ctx: &RepoCtx<'_, C>, id: Uuid, data: ProfileInput) -> Result<UserRecord, ServiceError> {
    let existing = require_live(ctx.conn, id).await?;
    apply_profile(ctx, existing, data.first_name, data.last_name, data.phone_number).await?;
    files::replace_relation_files(ctx, Relation::new(TABLE, AVATARS, id), &data.avatars).await?;
    find_by_id(ctx, id).await
}

async fn apply_profile<C: ConnectionTrait>(
    ctx: &RepoCtx<'_, C>,
    existing: user::Model,
    first_name: Option<String>,
    last_name: Option<String>,
    phone_number: Option<String>,
) -> Result<(), ServiceError> {
    user::validate_profile(first_name.as_deref(), last_name.as_deref(), phone_number.as_deref())?;
    let first_name = user::trim_optional(first_name.as_deref());
    let last_name = user::trim_optional(last_name.as_deref());
    let mut am: user::ActiveModel = existing.into();
    am.full_name = Set(user::build_full_name(first_name.as_deref(), last_name.as_deref()));
    am.first_name = Set(first_name);
    am.last_name = Set(last_name);
    am.phone_number = Set(user::trim_optional(phone_number.as_deref()));
    am.updated_by_id = Set(ctx.user_id());
    am.updated_at = Set(now());
    am.update(ctx.conn).await?;
    Ok(())
}

pub async fn update<C: ConnectionTrait>(ctx: &RepoCtx<'_, C>, id: Uuid, data: UserUpdateInput) -> Result<UserRecord, ServiceError> {
    let existing = require_live(ctx.conn, id).await?;
    apply_profile(ctx, existing, data.first_name, data.last_name, data.phone_number).await?;
    if let Some(roles) = &data.roles {
        update_roles(ctx.conn, id, roles, RolesUpdateMode::Replace).await?;
    }
    files::replace_relation_files(ctx, Relation::new(TABLE, AVATARS, id), &data.avatars).await?;
    find_by_id(ctx, id).await
}

/// Store a new password hash. Tokens issued before now stop working and any
/// pending reset token is consumed.
pub async fn update_password<C: ConnectionTrait>(conn: &C, id: Uuid, password_hash: String) -> Result<(), ServiceError> {
    let existing = require_live(conn, id).await?;
    user_credentials::upsert_password(conn, id, password_hash, PASSWORD_ALGORITHM).await?;
    let ts = now();
    let mut am: user::ActiveModel = existing.into();
    am.jwt_token_invalid_before = Set(Some(ts));
    am.password_reset_token = Set(None);
    am.password_reset_token_expires_at = Set(None);
    am.updated_at = Set(ts);
    am.update(conn).await?;
    debug!(user_id = %id, "password updated");
    Ok(())
}

pub async fn update_roles<C: ConnectionTrait>(conn: &C, id: Uuid, roles: &[Role], mode: RolesUpdateMode) -> Result<(), ServiceError> {
    let mut wanted: Vec<Role> = roles.to_vec();
    wanted.sort_by_key(|r| r.as_str());
    wanted.dedup();

    match mode {
        RolesUpdateMode::Replace => {
            user_role::Entity::delete_many().filter(user_role::Column::UserId.eq(id)).exec(conn).await?;
            insert_roles(conn, id, &wanted).await?;
        }
        RolesUpdateMode::Add => {
            let existing = find_roles(conn, id).await?;
            let missing: Vec<Role> = wanted.into_iter().filter(|r| !existing.contains(r)).collect();
            insert_roles(conn, id, &missing).await?;
        }
        RolesUpdateMode::RemoveOnly => {
            if !wanted.is_empty() {
                user_role::Entity::delete_many()
                    .filter(user_role::Column::UserId.eq(id))
                    .filter(user_role::Column::Role.is_in(wanted.iter().map(|r| r.as_str())))
                    .exec(conn)
                    .await?;
            }
        }
    }
    Ok(())
}

async fn insert_roles<C: ConnectionTrait>(conn: &C, id: Uuid, roles: &[Role]) -> Result<(), ServiceError> {
    for role in roles {
        user_role::ActiveModel { user_id: Set(id), role: Set(role.as_str().to_string()) }
            .insert(conn)
            .await?;
    }
    Ok(())
}

pub async fn destroy<C: ConnectionTrait>(ctx: &RepoCtx<'_, C>, id: Uuid) -> Result<(), ServiceError> {
    let existing = require_live(ctx.conn, id).await?;
    let mut am: user::ActiveModel = existing.into();
    am.deleted_at = Set(Some(now()));
    am.updated_by_id = Set(ctx.user_id());
    am.update(ctx.conn).await?;
    Ok(())
}

/// Issue a 40-hex-char reset token valid for 24 hours. Unknown email is `NotFound`.
pub async fn generate_password_reset_token<C: ConnectionTrait>(conn: &C, email: &str) -> Result<String, ServiceError> {
    let existing = find_by_email(conn, email).await?.ok_or_else(ServiceError::not_found)?;
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    let token = hex::encode(bytes);

    let ts = now();
    let mut am: user::ActiveModel = existing.into();
    am.password_reset_token = Set(Some(token.clone()));
    am.password_reset_token_expires_at = Set(Some(ts + Duration::hours(RESET_TOKEN_TTL_HOURS)));
    am.updated_at = Set(ts);
    am.update(conn).await?;
    Ok(token)
}

/// Live user holding `token`, provided it has not expired.
pub async fn find_by_password_reset_token<C: ConnectionTrait>(conn: &C, token: &str) -> Result<Option<user::Model>, ServiceError> {
    if token.trim().is_empty() {
        return Ok(None);
    }
    Ok(user::Entity::find()
        .filter(user::Column::PasswordResetToken.eq(token.trim()))
        .filter(user::Column::PasswordResetTokenExpiresAt.gt(now()))
        .filter(user::Column::DeletedAt.is_null())
        .one(conn)
        .await?)
}

pub async fn with_relations<C: ConnectionTrait>(ctx: &RepoCtx<'_, C>, user: user::Model) -> Result<UserRecord, ServiceError> {
    let roles = find_roles(ctx.conn, user.id).await?;
    let avatars = files::find_records(ctx, Relation::new(TABLE, AVATARS, user.id)).await?;
    Ok(UserRecord { user, roles, avatars })
}

pub async fn find_by_id<C: ConnectionTrait>(ctx: &RepoCtx<'_, C>, id: Uuid) -> Result<UserRecord, ServiceError> {
    let user = require_live(ctx.conn, id).await?;
    with_relations(ctx, user).await
}

pub async fn count<C: ConnectionTrait>(conn: &C) -> Result<u64, ServiceError> {
    Ok(user::Entity::find().filter(user::Column::DeletedAt.is_null()).count(conn).await?)
}

fn build_condition(filter: &UserFilter) -> Result<Condition, ServiceError> {
    let mut cond = Condition::all().add(user::Column::DeletedAt.is_null());
    if let Some(id) = non_blank(&filter.id) {
        cond = cond.add(user::Column::Id.eq(uuid_or_random(id)));
    }
    if let Some(full_name) = non_blank(&filter.full_name) {
        cond = cond.add(ilike(user::Column::FullName, full_name));
    }
    if let Some(email) = non_blank(&filter.email) {
        cond = cond.add(ilike(user::Column::Email, email));
    }
    if let Some(role) = non_blank(&filter.role) {
        let with_role = Query::select()
            .column(user_role::Column::UserId)
            .from(user_role::Entity)
            .and_where(user_role::Column::Role.eq(role))
            .to_owned();
        cond = cond.add(user::Column::Id.in_subquery(with_role));
    }
    if let Some(status) = non_blank(&filter.status) {
        let with_any_role = Query::select()
            .column(user_role::Column::UserId)
            .from(user_role::Entity)
            .to_owned();
        match status {
            "enabled" => cond = cond.add(user::Column::Id.in_subquery(with_any_role)),
            "disabled" => cond = cond.add(user::Column::Id.not_in_subquery(with_any_role)),
            _ => {}
        }
    }
    cond = add_range::<Timestamp, _>(cond, user::Column::CreatedAt, &filter.created_at_range)?;
    Ok(cond)
}

pub async fn find_and_count_all<C: ConnectionTrait>(
    ctx: &RepoCtx<'_, C>,
    query: &ListQuery<UserFilter>,
) -> Result<FindAndCountAll<UserRecord>, ServiceError> {
    let select = user::Entity::find().filter(build_condition(&query.filter)?);
    let count = select.clone().count(ctx.conn).await?;

    let (column, order) = order_by(query.params.order_by.as_deref(), SORTABLE, (user::Column::Email, Order::Asc));
    let users = query.params.pagination().apply(select.order_by(column, order)).all(ctx.conn).await?;

    let mut rows = Vec::with_capacity(users.len());
    for u in users {
        rows.push(with_relations(ctx, u).await?);
    }
    Ok(FindAndCountAll { rows, count })
}

pub async fn find_all_autocomplete<C: ConnectionTrait>(
    conn: &C,
    search: Option<&str>,
    limit: Option<u64>,
) -> Result<Vec<AutocompleteItem>, ServiceError> {
    let mut select = user::Entity::find().filter(user::Column::DeletedAt.is_null());
    if let Some(q) = search.map(str::trim).filter(|q| !q.is_empty()) {
        select = select.filter(
            Condition::any()
                .add(user::Column::Id.eq(uuid_or_random(q)))
                .add(ilike(user::Column::FullName, q))
                .add(ilike(user::Column::Email, q)),
        );
    }
    let records = select
        .order_by_asc(user::Column::FullName)
        .order_by_asc(user::Column::Email)
        .limit(limit.filter(|l| *l > 0))
        .all(conn)
        .await?;
    Ok(records.iter().map(|u| AutocompleteItem { id: u.id.to_string(), label: label(u) }).collect())
}
