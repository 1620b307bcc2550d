use std::sync::Arc;

use restaurant_order_api::{
    db::{create_orm_conn, create_pool},
    dto::{
        orders::{
            CashPaymentRequest, ConfirmPaymentRequest, CreateOrderRequest, CustomerInfo,
            OrderItemRequest, RefundRequest, UpdateStatusRequest,
        },
        staff::AssignStaffRequest,
    },
    entity::{
        menu_items::ActiveModel as MenuItemActive, orders::Entity as Orders,
        users::ActiveModel as UserActive,
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::{OrderStatus, PaymentStatus, UserRole},
    notify::{BroadcastNotifier, OrderEvent, Room},
    payments::{OfflineGateway, RejectingGateway},
    services::{order_service, staff_service},
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use uuid::Uuid;

// Integration tests need a live Postgres; they skip themselves when no
// database is configured in the environment.
async fn test_state() -> anyhow::Result<Option<AppState>> {
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests."
                );
                return Ok(None);
            }
        };

    let pool = create_pool(&database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    let orm = create_orm_conn(&database_url).await?;

    Ok(Some(AppState {
        pool,
        orm,
        hub: BroadcastNotifier::new(),
        gateway: Arc::new(OfflineGateway),
    }))
}

async fn create_user(state: &AppState, role: UserRole) -> anyhow::Result<AuthUser> {
    let id = Uuid::new_v4();
    UserActive {
        id: Set(id),
        name: Set(format!("{role} {id}")),
        email: Set(format!("{id}@example.com")),
        phone: Set(None),
        password_hash: Set("dummy".into()),
        role: Set(role.as_str().into()),
        is_active: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(AuthUser { user_id: id, role })
}

async fn create_menu_item(
    state: &AppState,
    price: i64,
    available: bool,
) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    MenuItemActive {
        id: Set(id),
        name: Set(format!("Dish {id}")),
        description: Set(None),
        price: Set(price),
        is_available: Set(available),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(id)
}

fn order_request(items: Vec<OrderItemRequest>, payment_method: &str) -> CreateOrderRequest {
    CreateOrderRequest {
        items,
        customer_info: CustomerInfo {
            name: "Abebe".into(),
            phone: "0911000000".into(),
            email: Some("abebe@example.com".into()),
        },
        payment_method: payment_method.into(),
        delivery_method: "pickup".into(),
        delivery_time: None,
        special_instructions: None,
    }
}

#[tokio::test]
async fn full_lifecycle_from_placement_to_delivery() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };

    let customer = create_user(&state, UserRole::Customer).await?;
    let admin = create_user(&state, UserRole::Admin).await?;
    let cashier = create_user(&state, UserRole::Cashier).await?;
    let cook = create_user(&state, UserRole::Cook).await?;
    let driver = create_user(&state, UserRole::Delivery).await?;
    let dish = create_menu_item(&state, 25000, true).await?;

    let created = order_service::create_order(
        &state,
        &customer,
        order_request(
            vec![OrderItemRequest {
                menu_item_id: dish,
                quantity: 2,
            }],
            "cash",
        ),
    )
    .await?;
    let created = created.data.expect("order payload");
    let order_id = created.order.id;
    assert_eq!(created.order.status, OrderStatus::Pending);
    assert_eq!(created.order.payment_status, PaymentStatus::Pending);
    assert_eq!(created.order.total_amount, 50000);
    assert!(created.order.order_number.starts_with("ORD"));
    assert_eq!(created.items.len(), 1);
    assert_eq!(created.items[0].quantity, 2);
    assert_eq!(created.status_history.len(), 1);
    assert_eq!(created.status_history[0].status, OrderStatus::Pending);

    // Admin confirms.
    let confirmed = order_service::update_status(
        &state,
        &admin,
        order_id,
        UpdateStatusRequest {
            status: "confirmed".into(),
            note: None,
        },
    )
    .await?;
    assert_eq!(confirmed.data.expect("order").status, OrderStatus::Confirmed);

    // Kitchen assignment and cooking.
    staff_service::assign_chef(
        &state,
        &cashier,
        order_id,
        AssignStaffRequest {
            staff_id: cook.user_id,
        },
    )
    .await?;
    let preparing = staff_service::start_cooking(&state, &cook, order_id).await?;
    let preparing = preparing.data.expect("order");
    assert_eq!(preparing.status, OrderStatus::Preparing);
    assert!(preparing.cooking_started_at.is_some());

    let ready = staff_service::complete_cooking(&state, &cook, order_id).await?;
    let ready = ready.data.expect("order");
    assert_eq!(ready.status, OrderStatus::Ready);
    assert!(ready.cooking_minutes.is_some());

    // Delivery leg.
    staff_service::assign_delivery(
        &state,
        &admin,
        order_id,
        AssignStaffRequest {
            staff_id: driver.user_id,
        },
    )
    .await?;
    let out = staff_service::start_delivery(&state, &driver, order_id).await?;
    // Starting delivery does not move the status.
    assert_eq!(out.data.expect("order").status, OrderStatus::Ready);

    let delivered = staff_service::complete_delivery(&state, &driver, order_id).await?;
    let delivered = delivered.data.expect("order");
    assert_eq!(delivered.status, OrderStatus::Delivered);
    assert!(delivered.delivery_minutes.is_some());

    // Every accepted transition left a history row.
    let full = order_service::get_order(&state, &customer, order_id).await?;
    let history = full.data.expect("order").status_history;
    let statuses: Vec<OrderStatus> = history.iter().map(|h| h.status).collect();
    assert_eq!(
        statuses,
        vec![
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Delivered,
        ]
    );

    Ok(())
}

#[tokio::test]
async fn order_creation_is_all_or_nothing() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };

    let customer = create_user(&state, UserRole::Customer).await?;
    let good = create_menu_item(&state, 10000, true).await?;
    let sold_out = create_menu_item(&state, 12000, false).await?;

    let err = order_service::create_order(
        &state,
        &customer,
        order_request(
            vec![
                OrderItemRequest {
                    menu_item_id: good,
                    quantity: 1,
                },
                OrderItemRequest {
                    menu_item_id: sold_out,
                    quantity: 1,
                },
            ],
            "cash",
        ),
    )
    .await
    .expect_err("unavailable item must fail the whole order");
    assert!(matches!(err, AppError::Validation(_)));

    // Nothing was persisted for this customer.
    use sea_orm::{ColumnTrait, QueryFilter};
    let count = Orders::find()
        .filter(restaurant_order_api::entity::orders::Column::CustomerId.eq(customer.user_id))
        .all(&state.orm)
        .await?;
    assert!(count.is_empty());

    Ok(())
}

#[tokio::test]
async fn transition_table_is_enforced_per_role() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };

    let customer = create_user(&state, UserRole::Customer).await?;
    let admin = create_user(&state, UserRole::Admin).await?;
    let cook = create_user(&state, UserRole::Cook).await?;
    let dish = create_menu_item(&state, 15000, true).await?;

    let created = order_service::create_order(
        &state,
        &customer,
        order_request(
            vec![OrderItemRequest {
                menu_item_id: dish,
                quantity: 1,
            }],
            "cash",
        ),
    )
    .await?;
    let order_id = created.data.expect("order").order.id;

    // Cooks cannot confirm a pending order.
    let err = order_service::update_status(
        &state,
        &cook,
        order_id,
        UpdateStatusRequest {
            status: "confirmed".into(),
            note: None,
        },
    )
    .await
    .expect_err("cook may not confirm");
    assert!(matches!(err, AppError::InvalidTransition { .. }));

    // Unknown wire strings are a validation error, not a transition error.
    let err = order_service::update_status(
        &state,
        &admin,
        order_id,
        UpdateStatusRequest {
            status: "on-the-moon".into(),
            note: None,
        },
    )
    .await
    .expect_err("unknown status must be rejected");
    assert!(matches!(err, AppError::Validation(_)));

    // Customers are not staff at all.
    let err = order_service::update_status(
        &state,
        &customer,
        order_id,
        UpdateStatusRequest {
            status: "confirmed".into(),
            note: None,
        },
    )
    .await
    .expect_err("customer may not drive staff transitions");
    assert!(matches!(err, AppError::Authorization(_)));

    Ok(())
}

#[tokio::test]
async fn cash_settlement_computes_change_and_rejects_shortfall() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };

    let customer = create_user(&state, UserRole::Customer).await?;
    let cashier = create_user(&state, UserRole::Cashier).await?;
    let dish = create_menu_item(&state, 50000, true).await?;

    let created = order_service::create_order(
        &state,
        &customer,
        order_request(
            vec![OrderItemRequest {
                menu_item_id: dish,
                quantity: 1,
            }],
            "cash",
        ),
    )
    .await?;
    let order_id = created.data.expect("order").order.id;

    // 450 towards a 500 bill: rejected with the exact shortfall.
    let err = order_service::cash_payment(
        &state,
        &cashier,
        order_id,
        CashPaymentRequest {
            amount_received: 45000,
        },
    )
    .await
    .expect_err("shortfall must be rejected");
    match err {
        AppError::InsufficientPayment { shortfall } => assert_eq!(shortfall, 5000),
        other => panic!("expected InsufficientPayment, got {other:?}"),
    }

    // The failed attempt left the order untouched.
    let view = order_service::get_payment(&state, &cashier, order_id).await?;
    assert_eq!(view.data.expect("payment").payment_status, PaymentStatus::Pending);

    // 600 settles it with 100 change.
    let paid = order_service::cash_payment(
        &state,
        &cashier,
        order_id,
        CashPaymentRequest {
            amount_received: 60000,
        },
    )
    .await?;
    let paid = paid.data.expect("order");
    assert_eq!(paid.payment_status, PaymentStatus::Completed);
    assert_eq!(paid.amount_received, Some(60000));
    assert_eq!(paid.change_due, Some(10000));
    assert!(paid.paid_at.is_some());

    // A second settlement is refused.
    let err = order_service::cash_payment(
        &state,
        &cashier,
        order_id,
        CashPaymentRequest {
            amount_received: 50000,
        },
    )
    .await
    .expect_err("already paid");
    assert!(matches!(err, AppError::Validation(_)));

    Ok(())
}

#[tokio::test]
async fn cancelling_marks_inflight_card_payment_failed() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };

    let customer = create_user(&state, UserRole::Customer).await?;
    let dish = create_menu_item(&state, 20000, true).await?;

    let created = order_service::create_order(
        &state,
        &customer,
        order_request(
            vec![OrderItemRequest {
                menu_item_id: dish,
                quantity: 1,
            }],
            "card",
        ),
    )
    .await?;
    let order = created.data.expect("order").order;
    // Card orders start their payment tracker in processing.
    assert_eq!(order.payment_status, PaymentStatus::Processing);

    let charge = order_service::create_charge(&state, &customer, order.id).await?;
    assert!(!charge.data.expect("charge").payment_ref.is_empty());

    let cancelled = order_service::cancel_order(&state, &customer, order.id).await?;
    let cancelled = cancelled.data.expect("order");
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(cancelled.payment_status, PaymentStatus::Failed);

    // Too late to cancel twice.
    let err = order_service::cancel_order(&state, &customer, order.id)
        .await
        .expect_err("already cancelled");
    assert!(matches!(err, AppError::Validation(_)));

    Ok(())
}

#[tokio::test]
async fn refund_requires_admin_and_completed_payment() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };

    let customer = create_user(&state, UserRole::Customer).await?;
    let admin = create_user(&state, UserRole::Admin).await?;
    let cashier = create_user(&state, UserRole::Cashier).await?;
    let dish = create_menu_item(&state, 30000, true).await?;

    let created = order_service::create_order(
        &state,
        &customer,
        order_request(
            vec![OrderItemRequest {
                menu_item_id: dish,
                quantity: 1,
            }],
            "cash",
        ),
    )
    .await?;
    let order_id = created.data.expect("order").order.id;

    // Nothing to refund yet.
    let err = order_service::refund_payment(&state, &admin, order_id, RefundRequest { reason: None })
        .await
        .expect_err("unpaid order cannot be refunded");
    assert!(matches!(err, AppError::InvalidTransition { .. }));

    order_service::cash_payment(
        &state,
        &cashier,
        order_id,
        CashPaymentRequest {
            amount_received: 30000,
        },
    )
    .await?;

    // Cashiers cannot refund.
    let err = order_service::refund_payment(&state, &cashier, order_id, RefundRequest { reason: None })
        .await
        .expect_err("refund is admin only");
    assert!(matches!(err, AppError::Authorization(_)));

    let refunded = order_service::refund_payment(
        &state,
        &admin,
        order_id,
        RefundRequest {
            reason: Some("wrong order".into()),
        },
    )
    .await?;
    let refunded = refunded.data.expect("order");
    assert_eq!(refunded.payment_status, PaymentStatus::Refunded);
    assert_eq!(refunded.refund_reason.as_deref(), Some("wrong order"));
    assert!(refunded.refunded_at.is_some());

    Ok(())
}

#[tokio::test]
async fn card_refund_aborts_when_gateway_rejects() -> anyhow::Result<()> {
    let Some(mut state) = test_state().await? else {
        return Ok(());
    };

    let customer = create_user(&state, UserRole::Customer).await?;
    let admin = create_user(&state, UserRole::Admin).await?;
    let dish = create_menu_item(&state, 40000, true).await?;

    let created = order_service::create_order(
        &state,
        &customer,
        order_request(
            vec![OrderItemRequest {
                menu_item_id: dish,
                quantity: 1,
            }],
            "card",
        ),
    )
    .await?;
    let order_id = created.data.expect("order").order.id;

    order_service::create_charge(&state, &customer, order_id).await?;
    order_service::confirm_payment(
        &state,
        &customer,
        order_id,
        ConfirmPaymentRequest {
            payment_ref: "ext_12345".into(),
        },
    )
    .await?;

    // Swap in a gateway that refuses reversals.
    state.gateway = Arc::new(RejectingGateway);
    let err = order_service::refund_payment(&state, &admin, order_id, RefundRequest { reason: None })
        .await
        .expect_err("gateway failure must abort the refund");
    assert!(matches!(err, AppError::ExternalPayment(_)));

    // The order is untouched.
    let view = order_service::get_payment(&state, &admin, order_id).await?;
    assert_eq!(
        view.data.expect("payment").payment_status,
        PaymentStatus::Completed
    );

    Ok(())
}

#[tokio::test]
async fn new_orders_are_broadcast_to_staff_rooms() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };

    let customer = create_user(&state, UserRole::Customer).await?;
    let dish = create_menu_item(&state, 10000, true).await?;

    let mut admin_rx = state.hub.subscribe(&Room::Staff(UserRole::Admin));
    let mut cook_rx = state.hub.subscribe(&Room::Staff(UserRole::Cook));

    let created = order_service::create_order(
        &state,
        &customer,
        order_request(
            vec![OrderItemRequest {
                menu_item_id: dish,
                quantity: 1,
            }],
            "cash",
        ),
    )
    .await?;
    let order_id = created.data.expect("order").order.id;

    match admin_rx.try_recv() {
        Ok(OrderEvent::NewOrder {
            order_id: event_order,
            status,
            ..
        }) => {
            assert_eq!(event_order, order_id);
            assert_eq!(status, OrderStatus::Pending);
        }
        other => panic!("expected NewOrder in the admin room, got {other:?}"),
    }

    // Cooks only hear about orders once they reach preparing.
    assert!(cook_rx.try_recv().is_err());

    Ok(())
}
