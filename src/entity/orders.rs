use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub subtotal: i64,
    pub total_amount: i64,
    pub status: String,
    pub payment_status: String,
    pub payment_method: String,
    pub payment_ref: Option<String>,
    pub amount_received: Option<i64>,
    pub change_due: Option<i64>,
    pub paid_at: Option<DateTimeWithTimeZone>,
    pub refund_reason: Option<String>,
    pub refunded_at: Option<DateTimeWithTimeZone>,
    pub delivery_method: String,
    pub delivery_time: String,
    pub special_instructions: Option<String>,
    pub assigned_chef: Option<Uuid>,
    pub chef_assigned_at: Option<DateTimeWithTimeZone>,
    pub assigned_delivery: Option<Uuid>,
    pub delivery_assigned_at: Option<DateTimeWithTimeZone>,
    pub cooking_started_at: Option<DateTimeWithTimeZone>,
    pub cooking_completed_at: Option<DateTimeWithTimeZone>,
    pub cooking_minutes: Option<i32>,
    pub delivery_started_at: Option<DateTimeWithTimeZone>,
    pub delivery_completed_at: Option<DateTimeWithTimeZone>,
    pub delivery_minutes: Option<i32>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CustomerId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(has_many = "super::order_items::Entity")]
    OrderItems,
    #[sea_orm(has_many = "super::order_status_history::Entity")]
    OrderStatusHistory,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl Related<super::order_status_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderStatusHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
