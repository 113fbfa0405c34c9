use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub delivered: bool,
    pub customer_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    pub created_by_id: Option<Uuid>,
    pub updated_by_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Customer,
    Employee,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Customer => Entity::belongs_to(crate::customer::Entity)
                .from(Column::CustomerId)
                .to(crate::customer::Column::Id)
                .into(),
            Relation::Employee => Entity::belongs_to(crate::user::Entity)
                .from(Column::EmployeeId)
                .to(crate::user::Column::Id)
                .into(),
        }
    }
}

impl Related<crate::customer::Entity> for Entity {
    fn to() -> RelationDef { Relation::Customer.def() }
}

impl Related<crate::user::Entity> for Entity {
    fn to() -> RelationDef { Relation::Employee.def() }
}

impl Related<crate::product::Entity> for Entity {
    fn to() -> RelationDef { crate::order_product::Relation::Product.def() }
    fn via() -> Option<RelationDef> { Some(crate::order_product::Relation::Order.def().rev()) }
}

impl ActiveModelBehavior for ActiveModel {}
