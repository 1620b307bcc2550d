use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Customer-facing fulfillment stage of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Financial settlement stage. Evolves independently of [`OrderStatus`]
/// except for the cancellation coupling (processing -> failed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 5] = [
        PaymentStatus::Pending,
        PaymentStatus::Processing,
        PaymentStatus::Completed,
        PaymentStatus::Failed,
        PaymentStatus::Refunded,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Processing => "processing",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    TeleBirr,
    Bank,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::TeleBirr => "tele_birr",
            PaymentMethod::Bank => "bank",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        [
            PaymentMethod::Cash,
            PaymentMethod::Card,
            PaymentMethod::TeleBirr,
            PaymentMethod::Bank,
        ]
        .into_iter()
        .find(|v| v.as_str() == s)
    }

    /// Initial payment status seeded at order creation. Card charges are
    /// opened by the client right away, so they start in `processing`.
    pub fn initial_payment_status(self) -> PaymentStatus {
        match self {
            PaymentMethod::Card => PaymentStatus::Processing,
            _ => PaymentStatus::Pending,
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    Delivery,
    Pickup,
}

impl DeliveryMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryMethod::Delivery => "delivery",
            DeliveryMethod::Pickup => "pickup",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        [DeliveryMethod::Delivery, DeliveryMethod::Pickup]
            .into_iter()
            .find(|v| v.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Customer,
    Admin,
    Cashier,
    Cook,
    Delivery,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Customer => "customer",
            UserRole::Admin => "admin",
            UserRole::Cashier => "cashier",
            UserRole::Cook => "cook",
            UserRole::Delivery => "delivery",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        [
            UserRole::Customer,
            UserRole::Admin,
            UserRole::Cashier,
            UserRole::Cook,
            UserRole::Delivery,
        ]
        .into_iter()
        .find(|v| v.as_str() == s)
    }

    pub fn is_staff(self) -> bool {
        !matches!(self, UserRole::Customer)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MenuItem {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Price in minor currency units.
    pub price: i64,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub subtotal: i64,
    pub total_amount: i64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub payment_ref: Option<String>,
    pub amount_received: Option<i64>,
    pub change_due: Option<i64>,
    pub paid_at: Option<DateTime<Utc>>,
    pub refund_reason: Option<String>,
    pub refunded_at: Option<DateTime<Utc>>,
    pub delivery_method: DeliveryMethod,
    pub delivery_time: String,
    pub special_instructions: Option<String>,
    pub assigned_chef: Option<Uuid>,
    pub chef_assigned_at: Option<DateTime<Utc>>,
    pub assigned_delivery: Option<Uuid>,
    pub delivery_assigned_at: Option<DateTime<Utc>>,
    pub cooking_started_at: Option<DateTime<Utc>>,
    pub cooking_completed_at: Option<DateTime<Utc>>,
    pub cooking_minutes: Option<i32>,
    pub delivery_started_at: Option<DateTime<Utc>>,
    pub delivery_completed_at: Option<DateTime<Utc>>,
    pub delivery_minutes: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One line of an order. Name and price are snapshots taken at order
/// time; later menu edits never alter historical orders.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub menu_item_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub price: i64,
}

/// Append-only audit entry for a status change.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusHistoryEntry {
    pub status: OrderStatus,
    pub changed_by: Uuid,
    pub changed_at: DateTime<Utc>,
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_round_trip() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("shipped"), None);
    }

    #[test]
    fn payment_method_seeds_initial_status() {
        assert_eq!(
            PaymentMethod::Card.initial_payment_status(),
            PaymentStatus::Processing
        );
        assert_eq!(
            PaymentMethod::Cash.initial_payment_status(),
            PaymentStatus::Pending
        );
        assert_eq!(
            PaymentMethod::TeleBirr.initial_payment_status(),
            PaymentStatus::Pending
        );
        assert_eq!(
            PaymentMethod::Bank.initial_payment_status(),
            PaymentStatus::Pending
        );
    }

    #[test]
    fn tele_birr_wire_string() {
        assert_eq!(PaymentMethod::TeleBirr.as_str(), "tele_birr");
        assert_eq!(
            PaymentMethod::parse("tele_birr"),
            Some(PaymentMethod::TeleBirr)
        );
    }
}
