use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub email_verified: bool,
    #[serde(skip_serializing)]
    pub password_reset_token: Option<String>,
    #[serde(skip_serializing)]
    pub password_reset_token_expires_at: Option<DateTimeWithTimeZone>,
    #[serde(skip_serializing)]
    pub jwt_token_invalid_before: Option<DateTimeWithTimeZone>,
    pub created_by_id: Option<Uuid>,
    pub updated_by_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Roles,
    Credentials,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Roles => Entity::has_many(crate::user_role::Entity).into(),
            Relation::Credentials => Entity::has_one(crate::user_credentials::Entity).into(),
        }
    }
}

impl Related<crate::user_role::Entity> for Entity {
    fn to() -> RelationDef { Relation::Roles.def() }
}

impl Related<crate::user_credentials::Entity> for Entity {
    fn to() -> RelationDef { Relation::Credentials.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub const FIRST_NAME_MAX: usize = 80;
pub const LAST_NAME_MAX: usize = 175;
pub const PHONE_NUMBER_MAX: usize = 24;

/// Minimal email shape check: a non-empty local part and domain around a single `@`.
pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@') && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid || email.len() > 255 {
        return Err(ModelError::Validation("auth.invalidEmail".into()));
    }
    Ok(())
}

pub fn validate_profile(first_name: Option<&str>, last_name: Option<&str>, phone_number: Option<&str>) -> Result<(), ModelError> {
    fn check(field: &str, value: Option<&str>, max: usize) -> Result<(), ModelError> {
        match value {
            Some(v) if v.trim().chars().count() > max => {
                Err(ModelError::Validation(format!("user.{field} must be at most {max} characters")))
            }
            _ => Ok(()),
        }
    }
    check("firstName", first_name, FIRST_NAME_MAX)?;
    check("lastName", last_name, LAST_NAME_MAX)?;
    check("phoneNumber", phone_number, PHONE_NUMBER_MAX)?;
    Ok(())
}

/// Trim an optional text field, mapping blank input to `None`.
pub fn trim_optional(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// `"{first} {last}"` trimmed; `None` when both parts are missing.
pub fn build_full_name(first_name: Option<&str>, last_name: Option<&str>) -> Option<String> {
    if first_name.is_none() && last_name.is_none() {
        return None;
    }
    let full = format!("{} {}", first_name.unwrap_or("").trim(), last_name.unwrap_or("").trim());
    let full = full.trim();
    if full.is_empty() { None } else { Some(full.to_string()) }
}
