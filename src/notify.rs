//! Notification Emitter.
//!
//! Translates committed order-state changes into room-addressed broadcast
//! events. Delivery is at-most-once, best-effort: events go only to
//! listeners subscribed at emission time, nothing is persisted or retried,
//! and a listener that was offline reconciles by re-querying the API.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::broadcast;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::lifecycle::status_message;
use crate::models::{OrderStatus, PaymentMethod, UserRole};

/// Broadcast channel capacity per room. Enough to absorb a burst while a
/// subscriber drains; laggards drop events (best-effort contract).
const ROOM_CAPACITY: usize = 256;

/// An addressable broadcast group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Room {
    /// Listeners interested in one specific order (the placing customer).
    Order(Uuid),
    /// All connected staff of one role.
    Staff(UserRole),
}

impl Room {
    pub fn key(&self) -> String {
        match self {
            Room::Order(id) => format!("order:{id}"),
            Room::Staff(role) => format!("staff:{role}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum OrderEvent {
    NewOrder {
        order_id: Uuid,
        order_number: String,
        status: OrderStatus,
        total_amount: i64,
    },
    OrderStatusUpdated {
        order_id: Uuid,
        order_number: String,
        old_status: OrderStatus,
        new_status: OrderStatus,
        message: String,
    },
    OrderCancelled {
        order_id: Uuid,
        order_number: String,
    },
    PaymentCompleted {
        order_id: Uuid,
        order_number: String,
        payment_method: PaymentMethod,
    },
    PaymentRefunded {
        order_id: Uuid,
        order_number: String,
        reason: Option<String>,
    },
}

impl OrderEvent {
    pub fn status_updated(
        order_id: Uuid,
        order_number: String,
        old_status: OrderStatus,
        new_status: OrderStatus,
    ) -> Self {
        OrderEvent::OrderStatusUpdated {
            order_id,
            order_number,
            old_status,
            new_status,
            message: status_message(new_status).to_string(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OrderEvent::NewOrder { .. } => "new-order",
            OrderEvent::OrderStatusUpdated { .. } => "order-status-updated",
            OrderEvent::OrderCancelled { .. } => "order-cancelled",
            OrderEvent::PaymentCompleted { .. } => "payment-completed",
            OrderEvent::PaymentRefunded { .. } => "payment-refunded",
        }
    }
}

/// Staff rooms that should hear about an order sitting in `status`:
/// admin and cashier always, plus the role that acts next.
pub fn staff_rooms_for(status: OrderStatus) -> Vec<Room> {
    let mut rooms = vec![Room::Staff(UserRole::Admin), Room::Staff(UserRole::Cashier)];
    match status {
        OrderStatus::Preparing => rooms.push(Room::Staff(UserRole::Cook)),
        OrderStatus::Ready => rooms.push(Room::Staff(UserRole::Delivery)),
        _ => {}
    }
    rooms
}

/// Injected seam between the lifecycle services and the live channel.
/// Implementations must never fail the triggering operation.
pub trait Notifier: Send + Sync {
    fn notify(&self, rooms: &[Room], event: OrderEvent);
}

/// In-process hub: one broadcast channel per room, created lazily on the
/// first subscribe or send, dropped once the last receiver is gone.
#[derive(Clone, Default)]
pub struct BroadcastNotifier {
    rooms: Arc<DashMap<String, broadcast::Sender<OrderEvent>>>,
}

impl BroadcastNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, room: &Room) -> broadcast::Receiver<OrderEvent> {
        self.rooms
            .entry(room.key())
            .or_insert_with(|| broadcast::channel(ROOM_CAPACITY).0)
            .subscribe()
    }

    /// Number of listeners currently in a room.
    pub fn listener_count(&self, room: &Room) -> usize {
        self.rooms
            .get(&room.key())
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, rooms: &[Room], event: OrderEvent) {
        for room in rooms {
            let key = room.key();
            let Some(tx) = self.rooms.get(&key) else {
                continue;
            };
            // send() errors only when no receiver is subscribed; an empty
            // room is fine under the at-most-once contract.
            if tx.send(event.clone()).is_err() {
                drop(tx);
                self.rooms
                    .remove_if(&key, |_, sender| sender.receiver_count() == 0);
            }
        }
        tracing::debug!(event = event.name(), rooms = rooms.len(), "event emitted");
    }
}

/// Notifier that drops everything. Used by tests and offline tooling.
#[derive(Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _rooms: &[Room], _event: OrderEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_order_event() -> OrderEvent {
        OrderEvent::NewOrder {
            order_id: Uuid::new_v4(),
            order_number: "ORD123456001".into(),
            status: OrderStatus::Pending,
            total_amount: 500,
        }
    }

    #[tokio::test]
    async fn subscriber_receives_room_events() {
        let hub = BroadcastNotifier::new();
        let room = Room::Staff(UserRole::Admin);
        let mut rx = hub.subscribe(&room);

        hub.notify(&[room], new_order_event());

        match rx.recv().await.unwrap() {
            OrderEvent::NewOrder { total_amount, .. } => assert_eq!(total_amount, 500),
            other => panic!("expected NewOrder, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rooms_are_isolated() {
        let hub = BroadcastNotifier::new();
        let admin = Room::Staff(UserRole::Admin);
        let cook = Room::Staff(UserRole::Cook);
        let mut admin_rx = hub.subscribe(&admin);
        let mut cook_rx = hub.subscribe(&cook);

        hub.notify(&[admin], new_order_event());

        assert!(admin_rx.try_recv().is_ok());
        assert!(cook_rx.try_recv().is_err());
    }

    #[test]
    fn notify_with_zero_subscribers_is_not_an_error() {
        let hub = BroadcastNotifier::new();
        hub.notify(
            &[Room::Order(Uuid::new_v4()), Room::Staff(UserRole::Cashier)],
            new_order_event(),
        );
    }

    #[test]
    fn empty_rooms_are_garbage_collected() {
        let hub = BroadcastNotifier::new();
        let room = Room::Staff(UserRole::Delivery);
        let rx = hub.subscribe(&room);
        drop(rx);

        // First send hits a receiver-less channel and removes the room.
        hub.notify(&[room], new_order_event());
        assert_eq!(hub.listener_count(&room), 0);
        assert!(hub.rooms.is_empty());
    }

    #[test]
    fn staff_fanout_includes_next_actor() {
        let base = staff_rooms_for(OrderStatus::Confirmed);
        assert_eq!(
            base,
            vec![Room::Staff(UserRole::Admin), Room::Staff(UserRole::Cashier)]
        );

        assert!(staff_rooms_for(OrderStatus::Preparing).contains(&Room::Staff(UserRole::Cook)));
        assert!(staff_rooms_for(OrderStatus::Ready).contains(&Room::Staff(UserRole::Delivery)));
        assert!(!staff_rooms_for(OrderStatus::Ready).contains(&Room::Staff(UserRole::Cook)));
    }

    #[test]
    fn event_names_match_the_wire_contract() {
        assert_eq!(new_order_event().name(), "new-order");
        let ev = OrderEvent::status_updated(
            Uuid::new_v4(),
            "ORD000000000".into(),
            OrderStatus::Pending,
            OrderStatus::Confirmed,
        );
        assert_eq!(ev.name(), "order-status-updated");
        match &ev {
            OrderEvent::OrderStatusUpdated { message, .. } => {
                assert_eq!(message, "Your order has been confirmed");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
