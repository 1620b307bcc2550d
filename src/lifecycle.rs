//! Status Transition Authority.
//!
//! Pure decision logic for the order state machine: which role may move an
//! order from one status to another. No I/O, no side effects; the services
//! layer consults this before touching the database.

use crate::models::{OrderStatus, UserRole};

/// Allowed target statuses for `(role, current)`. Pairs with no entry get
/// the empty slice, which denies every request.
///
/// `delivered` and `cancelled` are terminal for admin/cashier. Cook and
/// delivery may step one status backwards to repair a mistake
/// (ready -> preparing, delivered -> ready); those are the only sanctioned
/// backward moves.
pub fn allowed_targets(role: UserRole, current: OrderStatus) -> &'static [OrderStatus] {
    use OrderStatus::*;
    use UserRole::*;

    match (role, current) {
        (Admin | Cashier, Pending) => &[Confirmed, Cancelled],
        (Admin | Cashier, Confirmed) => &[Preparing, Cancelled],
        (Admin | Cashier, Preparing) => &[Ready, Cancelled],
        (Admin | Cashier, Ready) => &[Delivered, Cancelled],
        (Cook, Preparing) => &[Ready],
        (Cook, Ready) => &[Preparing],
        (Delivery, Ready) => &[Delivered],
        (Delivery, Delivered) => &[Ready],
        _ => &[],
    }
}

/// Deterministic gate for a single transition request.
pub fn can_transition(role: UserRole, current: OrderStatus, requested: OrderStatus) -> bool {
    allowed_targets(role, current).contains(&requested)
}

/// Human-readable message broadcast alongside `order-status-updated`.
pub fn status_message(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "Your order has been received",
        OrderStatus::Confirmed => "Your order has been confirmed",
        OrderStatus::Preparing => "Your order is being prepared",
        OrderStatus::Ready => "Your order is ready",
        OrderStatus::Delivered => "Your order has been delivered",
        OrderStatus::Cancelled => "Your order has been cancelled",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrderStatus::*, UserRole::*};

    #[test]
    fn admin_and_cashier_share_the_forward_path() {
        for role in [Admin, Cashier] {
            assert!(can_transition(role, Pending, Confirmed));
            assert!(can_transition(role, Confirmed, Preparing));
            assert!(can_transition(role, Preparing, Ready));
            assert!(can_transition(role, Ready, Delivered));
        }
    }

    #[test]
    fn admin_may_cancel_any_non_terminal_status() {
        for current in [Pending, Confirmed, Preparing, Ready] {
            assert!(can_transition(Admin, current, Cancelled));
        }
        assert!(!can_transition(Admin, Delivered, Cancelled));
        assert!(!can_transition(Admin, Cancelled, Cancelled));
    }

    #[test]
    fn delivered_and_cancelled_are_terminal_for_admin() {
        for requested in OrderStatus::ALL {
            assert!(!can_transition(Admin, Delivered, requested));
            assert!(!can_transition(Admin, Cancelled, requested));
        }
    }

    #[test]
    fn cook_can_only_flip_preparing_and_ready() {
        assert!(can_transition(Cook, Preparing, Ready));
        assert!(can_transition(Cook, Ready, Preparing));
        assert!(!can_transition(Cook, Preparing, Delivered));
        assert!(!can_transition(Cook, Pending, Confirmed));
        assert!(!can_transition(Cook, Ready, Cancelled));
    }

    #[test]
    fn delivery_can_only_flip_ready_and_delivered() {
        assert!(can_transition(Delivery, Ready, Delivered));
        assert!(can_transition(Delivery, Delivered, Ready));
        assert!(!can_transition(Delivery, Preparing, Ready));
        assert!(!can_transition(Delivery, Delivered, Preparing));
    }

    #[test]
    fn customers_have_no_table_entries() {
        for current in OrderStatus::ALL {
            for requested in OrderStatus::ALL {
                assert!(!can_transition(Customer, current, requested));
            }
        }
    }

    // Any (role, current, requested) triple outside the published table is
    // denied, checked by rebuilding the table independently.
    #[test]
    fn everything_outside_the_table_is_denied() {
        let table: &[(UserRole, OrderStatus, OrderStatus)] = &[
            (Admin, Pending, Confirmed),
            (Admin, Pending, Cancelled),
            (Admin, Confirmed, Preparing),
            (Admin, Confirmed, Cancelled),
            (Admin, Preparing, Ready),
            (Admin, Preparing, Cancelled),
            (Admin, Ready, Delivered),
            (Admin, Ready, Cancelled),
            (Cashier, Pending, Confirmed),
            (Cashier, Pending, Cancelled),
            (Cashier, Confirmed, Preparing),
            (Cashier, Confirmed, Cancelled),
            (Cashier, Preparing, Ready),
            (Cashier, Preparing, Cancelled),
            (Cashier, Ready, Delivered),
            (Cashier, Ready, Cancelled),
            (Cook, Preparing, Ready),
            (Cook, Ready, Preparing),
            (Delivery, Ready, Delivered),
            (Delivery, Delivered, Ready),
        ];

        for role in [Customer, Admin, Cashier, Cook, Delivery] {
            for current in OrderStatus::ALL {
                for requested in OrderStatus::ALL {
                    let expected = table.contains(&(role, current, requested));
                    assert_eq!(
                        can_transition(role, current, requested),
                        expected,
                        "role={role} current={current} requested={requested}"
                    );
                }
            }
        }
    }

    #[test]
    fn no_role_may_request_the_current_status() {
        for role in [Admin, Cashier, Cook, Delivery] {
            for current in OrderStatus::ALL {
                assert!(!can_transition(role, current, current));
            }
        }
    }
}
