use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((24, 2)))")]
    pub unit_price: Decimal,
    pub created_by_id: Option<Uuid>,
    pub updated_by_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<crate::order::Entity> for Entity {
    fn to() -> RelationDef { crate::order_product::Relation::Order.def() }
    fn via() -> Option<RelationDef> { Some(crate::order_product::Relation::Product.def().rev()) }
}

impl ActiveModelBehavior for ActiveModel {}

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 255;

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    let len = name.trim().chars().count();
    if !(NAME_MIN..=NAME_MAX).contains(&len) {
        return Err(ModelError::Validation(format!(
            "product.name must be between {NAME_MIN} and {NAME_MAX} characters"
        )));
    }
    Ok(())
}

/// Unit price must lie within 0.01..=99999 and is stored with two decimal places.
pub fn normalize_unit_price(price: Decimal) -> Result<Decimal, ModelError> {
    let min = Decimal::new(1, 2);
    let max = Decimal::new(99999, 0);
    if price < min || price > max {
        return Err(ModelError::Validation("product.unitPrice must be between 0.01 and 99999".into()));
    }
    Ok(price.round_dp(2))
}
