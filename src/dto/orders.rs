use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Order, OrderItem, StatusHistoryEntry};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    pub menu_item_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
    pub customer_info: CustomerInfo,
    /// One of `cash|card|tele_birr|bank`.
    pub payment_method: String,
    /// One of `delivery|pickup`.
    pub delivery_method: String,
    pub delivery_time: Option<String>,
    pub special_instructions: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// Requested order status as a wire string; anything outside the
    /// status enum is rejected before the transition table is consulted.
    pub status: String,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CashPaymentRequest {
    /// Amount handed over, in minor currency units.
    pub amount_received: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConfirmPaymentRequest {
    pub payment_ref: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefundRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub status_history: Vec<StatusHistoryEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChargeResponse {
    pub order_id: Uuid,
    pub payment_ref: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentView {
    pub order_id: Uuid,
    pub order_number: String,
    pub payment_status: crate::models::PaymentStatus,
    pub payment_method: crate::models::PaymentMethod,
    pub amount_received: Option<i64>,
    pub change_due: Option<i64>,
    pub paid_at: Option<chrono::DateTime<chrono::Utc>>,
}
