use chrono::Utc;
use rand::Rng;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{
        CashPaymentRequest, ChargeResponse, ConfirmPaymentRequest, CreateOrderRequest, OrderList,
        OrderWithItems, PaymentView, RefundRequest, UpdateStatusRequest,
    },
    entity::{
        menu_items::Entity as MenuItems,
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        order_status_history::{
            ActiveModel as HistoryActive, Column as HistoryCol, Entity as OrderStatusHistory,
            Model as HistoryModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
    },
    error::{AppError, AppResult},
    lifecycle,
    middleware::auth::{AuthUser, ensure_admin, ensure_admin_or_cashier, ensure_staff},
    models::{
        DeliveryMethod, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus,
        StatusHistoryEntry,
    },
    notify::{OrderEvent, Room, staff_rooms_for},
    payments::ChargeRequest,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, Pagination, SortOrder},
    state::AppState,
};

/// Create an order from the live menu. All-or-nothing: any unresolvable or
/// unavailable item aborts the transaction before anything is persisted.
pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    if payload.items.is_empty() {
        return Err(AppError::Validation(
            "Order must contain at least one item".into(),
        ));
    }
    if payload.customer_info.name.trim().is_empty() || payload.customer_info.phone.trim().is_empty()
    {
        return Err(AppError::Validation(
            "Customer name and phone are required".into(),
        ));
    }
    let payment_method = PaymentMethod::parse(&payload.payment_method).ok_or_else(|| {
        AppError::Validation(format!("Unknown payment method '{}'", payload.payment_method))
    })?;
    let delivery_method = DeliveryMethod::parse(&payload.delivery_method).ok_or_else(|| {
        AppError::Validation(format!(
            "Unknown delivery method '{}'",
            payload.delivery_method
        ))
    })?;

    let txn = state.orm.begin().await?;

    let mut subtotal: i64 = 0;
    let mut lines: Vec<(Uuid, String, i32, i64)> = Vec::with_capacity(payload.items.len());
    for item in &payload.items {
        if item.quantity < 1 {
            return Err(AppError::Validation("Item quantity must be at least 1".into()));
        }
        let menu_item = MenuItems::find_by_id(item.menu_item_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                AppError::Validation(format!("Menu item {} not found", item.menu_item_id))
            })?;
        if !menu_item.is_available {
            return Err(AppError::Validation(format!(
                "{} is currently unavailable",
                menu_item.name
            )));
        }
        subtotal += menu_item.price * i64::from(item.quantity);
        // Snapshot name and price; later menu edits must not touch this order.
        lines.push((menu_item.id, menu_item.name, item.quantity, menu_item.price));
    }
    let total_amount = subtotal;

    let order_id = Uuid::new_v4();
    let order = OrderActive {
        id: Set(order_id),
        order_number: Set(generate_order_number()),
        customer_id: Set(user.user_id),
        customer_name: Set(payload.customer_info.name.clone()),
        customer_phone: Set(payload.customer_info.phone.clone()),
        customer_email: Set(payload.customer_info.email.clone()),
        subtotal: Set(subtotal),
        total_amount: Set(total_amount),
        status: Set(OrderStatus::Pending.as_str().into()),
        payment_status: Set(payment_method.initial_payment_status().as_str().into()),
        payment_method: Set(payment_method.as_str().into()),
        delivery_method: Set(delivery_method.as_str().into()),
        delivery_time: Set(payload.delivery_time.unwrap_or_else(|| "asap".into())),
        special_instructions: Set(payload.special_instructions.clone()),
        payment_ref: Set(None),
        amount_received: Set(None),
        change_due: Set(None),
        paid_at: Set(None),
        refund_reason: Set(None),
        refunded_at: Set(None),
        assigned_chef: Set(None),
        chef_assigned_at: Set(None),
        assigned_delivery: Set(None),
        delivery_assigned_at: Set(None),
        cooking_started_at: Set(None),
        cooking_completed_at: Set(None),
        cooking_minutes: Set(None),
        delivery_started_at: Set(None),
        delivery_completed_at: Set(None),
        delivery_minutes: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<OrderItem> = Vec::with_capacity(lines.len());
    for (menu_item_id, name, quantity, price) in lines {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            menu_item_id: Set(menu_item_id),
            name: Set(name),
            quantity: Set(quantity),
            price: Set(price),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(order_item_from_entity(item));
    }

    push_history(
        &txn,
        order.id,
        OrderStatus::Pending,
        user.user_id,
        Some("Order placed"),
    )
    .await?;

    let history = load_history(&txn, order.id).await?;
    txn.commit().await?;

    audit(state, user, "order_created", &order).await;

    let order = order_from_entity(order)?;
    state.notifier().notify(
        &staff_rooms_for(OrderStatus::Pending),
        OrderEvent::NewOrder {
            order_id: order.id,
            order_number: order.order_number.clone(),
            status: order.status,
            total_amount: order.total_amount,
        },
    );

    Ok(ApiResponse::success(
        "Order created",
        OrderWithItems {
            order,
            items,
            status_history: history,
        },
        Some(Meta::empty()),
    ))
}

/// Staff-driven status change, gated by the transition authority.
pub async fn update_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_staff(user)?;
    // Unknown wire strings are rejected outright, before the table lookup.
    let requested = OrderStatus::parse(&payload.status).ok_or_else(|| {
        AppError::Validation(format!("Unknown order status '{}'", payload.status))
    })?;

    let txn = state.orm.begin().await?;
    let existing = load_for_update(&txn, id).await?;
    let current = stored_order_status(&existing.status)?;

    if !lifecycle::can_transition(user.role, current, requested) {
        return Err(AppError::InvalidTransition {
            role: user.role.to_string(),
            from: current.to_string(),
            to: requested.to_string(),
        });
    }

    let payment_status = stored_payment_status(&existing.payment_status)?;
    let mut active: OrderActive = existing.into();
    active.status = Set(requested.as_str().into());
    // An in-flight card payment on a cancelled order is marked failed
    // rather than left dangling.
    if requested == OrderStatus::Cancelled && payment_status == PaymentStatus::Processing {
        active.payment_status = Set(PaymentStatus::Failed.as_str().into());
    }
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;

    push_history(&txn, updated.id, requested, user.user_id, payload.note.as_deref()).await?;
    txn.commit().await?;

    audit(state, user, "order_status_update", &updated).await;

    let order = order_from_entity(updated)?;
    emit_status_change(state, &order, current, requested);

    Ok(ApiResponse::success(
        format!("Order status updated to {requested}"),
        order,
        Some(Meta::empty()),
    ))
}

/// Customer-side cancellation, allowed only while the order is pending.
pub async fn cancel_order(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<Order>> {
    let txn = state.orm.begin().await?;
    let existing = load_for_update(&txn, id).await?;
    if existing.customer_id != user.user_id {
        return Err(AppError::Authorization(
            "Not authorized to cancel this order".into(),
        ));
    }
    let current = stored_order_status(&existing.status)?;
    if current != OrderStatus::Pending {
        return Err(AppError::Validation(
            "Order cannot be cancelled at this stage".into(),
        ));
    }

    let payment_status = stored_payment_status(&existing.payment_status)?;
    let mut active: OrderActive = existing.into();
    active.status = Set(OrderStatus::Cancelled.as_str().into());
    if payment_status == PaymentStatus::Processing {
        active.payment_status = Set(PaymentStatus::Failed.as_str().into());
    }
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;

    push_history(
        &txn,
        updated.id,
        OrderStatus::Cancelled,
        user.user_id,
        Some("Cancelled by customer"),
    )
    .await?;
    txn.commit().await?;

    audit(state, user, "order_cancelled", &updated).await;

    let order = order_from_entity(updated)?;
    emit_status_change(state, &order, current, OrderStatus::Cancelled);

    Ok(ApiResponse::success("Order cancelled", order, Some(Meta::empty())))
}

/// Open an external charge for a card order and store its reference.
pub async fn create_charge(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<ChargeResponse>> {
    let txn = state.orm.begin().await?;
    let existing = load_for_update(&txn, id).await?;
    if existing.customer_id != user.user_id {
        return Err(AppError::Authorization(
            "Not authorized to pay for this order".into(),
        ));
    }
    let method = stored_payment_method(&existing.payment_method)?;
    if method != PaymentMethod::Card {
        return Err(AppError::Validation("Not a card payment order".into()));
    }
    let payment_status = stored_payment_status(&existing.payment_status)?;
    if !matches!(payment_status, PaymentStatus::Pending | PaymentStatus::Processing) {
        return Err(AppError::Validation("Order payment already processed".into()));
    }

    let reference = state
        .gateway
        .create_charge(ChargeRequest {
            order_id: existing.id,
            order_number: existing.order_number.clone(),
            amount: existing.total_amount,
            customer_email: existing.customer_email.clone(),
        })
        .await?;

    let order_id = existing.id;
    let mut active: OrderActive = existing.into();
    active.payment_ref = Set(Some(reference.clone()));
    active.payment_status = Set(PaymentStatus::Processing.as_str().into());
    active.updated_at = Set(Utc::now().into());
    active.update(&txn).await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Charge created",
        ChargeResponse {
            order_id,
            payment_ref: reference,
        },
        Some(Meta::empty()),
    ))
}

/// Cash settlement at the counter or on delivery. Idempotence is enforced
/// by the `completed` terminal check.
pub async fn cash_payment(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: CashPaymentRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin_or_cashier(user)?;

    let txn = state.orm.begin().await?;
    let existing = load_for_update(&txn, id).await?;
    let method = stored_payment_method(&existing.payment_method)?;
    if method != PaymentMethod::Cash {
        return Err(AppError::Validation("Not a cash order".into()));
    }
    let payment_status = stored_payment_status(&existing.payment_status)?;
    if payment_status == PaymentStatus::Completed {
        return Err(AppError::Validation("Order already paid".into()));
    }

    let change = payload.amount_received - existing.total_amount;
    if change < 0 {
        return Err(AppError::InsufficientPayment { shortfall: -change });
    }

    let mut active: OrderActive = existing.into();
    active.payment_status = Set(PaymentStatus::Completed.as_str().into());
    active.amount_received = Set(Some(payload.amount_received));
    active.change_due = Set(Some(change));
    active.paid_at = Set(Some(Utc::now().into()));
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    audit(state, user, "cash_payment", &updated).await;

    let order = order_from_entity(updated)?;
    emit_payment_event(
        state,
        &order,
        OrderEvent::PaymentCompleted {
            order_id: order.id,
            order_number: order.order_number.clone(),
            payment_method: order.payment_method,
        },
    );

    Ok(ApiResponse::success(
        "Cash payment processed",
        order,
        Some(Meta::empty()),
    ))
}

/// Record a confirmed external card payment against the order.
pub async fn confirm_payment(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: ConfirmPaymentRequest,
) -> AppResult<ApiResponse<Order>> {
    let txn = state.orm.begin().await?;
    let existing = load_for_update(&txn, id).await?;
    if existing.customer_id != user.user_id && !user.role.is_staff() {
        return Err(AppError::Authorization("Not authorized".into()));
    }
    let method = stored_payment_method(&existing.payment_method)?;
    if method != PaymentMethod::Card {
        return Err(AppError::Validation("Not a card payment order".into()));
    }
    let payment_status = stored_payment_status(&existing.payment_status)?;
    if payment_status == PaymentStatus::Completed {
        return Err(AppError::Validation("Order already paid".into()));
    }

    let mut active: OrderActive = existing.into();
    active.payment_status = Set(PaymentStatus::Completed.as_str().into());
    active.payment_ref = Set(Some(payload.payment_ref));
    active.paid_at = Set(Some(Utc::now().into()));
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    audit(state, user, "payment_confirmed", &updated).await;

    let order = order_from_entity(updated)?;
    emit_payment_event(
        state,
        &order,
        OrderEvent::PaymentCompleted {
            order_id: order.id,
            order_number: order.order_number.clone(),
            payment_method: order.payment_method,
        },
    );

    Ok(ApiResponse::success("Payment confirmed", order, Some(Meta::empty())))
}

/// Admin-only refund. Card refunds delegate the monetary reversal to the
/// gateway first; a reversal failure aborts with the order untouched.
pub async fn refund_payment(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: RefundRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    let existing = load_for_update(&txn, id).await?;
    let payment_status = stored_payment_status(&existing.payment_status)?;
    if payment_status != PaymentStatus::Completed {
        return Err(AppError::InvalidTransition {
            role: user.role.to_string(),
            from: payment_status.to_string(),
            to: PaymentStatus::Refunded.to_string(),
        });
    }

    let method = stored_payment_method(&existing.payment_method)?;
    if method == PaymentMethod::Card {
        let reference = existing
            .payment_ref
            .as_deref()
            .ok_or_else(|| AppError::ExternalPayment("No payment reference on order".into()))?;
        state.gateway.refund_charge(reference).await?;
    }

    let mut active: OrderActive = existing.into();
    active.payment_status = Set(PaymentStatus::Refunded.as_str().into());
    active.refund_reason = Set(payload.reason.clone());
    active.refunded_at = Set(Some(Utc::now().into()));
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    audit(state, user, "payment_refunded", &updated).await;

    let order = order_from_entity(updated)?;
    emit_payment_event(
        state,
        &order,
        OrderEvent::PaymentRefunded {
            order_id: order.id,
            order_number: order.order_number.clone(),
            reason: payload.reason,
        },
    );

    Ok(ApiResponse::success("Payment refunded", order, Some(Meta::empty())))
}

pub async fn get_payment(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<PaymentView>> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if order.customer_id != user.user_id
        && !matches!(user.role, crate::models::UserRole::Admin | crate::models::UserRole::Cashier)
    {
        return Err(AppError::Authorization("Not authorized".into()));
    }

    let view = PaymentView {
        order_id: order.id,
        order_number: order.order_number.clone(),
        payment_status: stored_payment_status(&order.payment_status)?,
        payment_method: stored_payment_method(&order.payment_method)?,
        amount_received: order.amount_received,
        change_due: order.change_due,
        paid_at: order.paid_at.map(|dt| dt.with_timezone(&Utc)),
    };
    Ok(ApiResponse::success("OK", view, Some(Meta::empty())))
}

pub async fn list_my_orders(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Orders::find()
        .filter(OrderCol::CustomerId.eq(user.user_id))
        .order_by_desc(OrderCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Ok", OrderList { items: orders }, Some(meta)))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin_or_cashier(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status.as_deref().filter(|s| !s.is_empty()) {
        let status = OrderStatus::parse(status)
            .ok_or_else(|| AppError::Validation(format!("Unknown order status '{status}'")))?;
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Orders", OrderList { items: orders }, Some(meta)))
}

pub async fn list_by_payment_status(
    state: &AppState,
    user: &AuthUser,
    status: &str,
    pagination: Pagination,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin_or_cashier(user)?;
    let status = PaymentStatus::parse(status)
        .ok_or_else(|| AppError::Validation(format!("Unknown payment status '{status}'")))?;

    let (page, limit, offset) = pagination.normalize();
    let finder = Orders::find()
        .filter(OrderCol::PaymentStatus.eq(status.as_str()))
        .order_by_desc(OrderCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Orders", OrderList { items: orders }, Some(meta)))
}

pub async fn get_order(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if order.customer_id != user.user_id && !user.role.is_staff() {
        return Err(AppError::Authorization(
            "Not authorized to view this order".into(),
        ));
    }

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();
    let history = load_history(&state.orm, order.id).await?;

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: order_from_entity(order)?,
            items,
            status_history: history,
        },
        Some(Meta::empty()),
    ))
}

// ---- shared helpers (also used by staff_service) ----

pub(crate) async fn load_for_update(txn: &DatabaseTransaction, id: Uuid) -> AppResult<OrderModel> {
    // Row lock serializes concurrent mutations of the same order.
    Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or(AppError::NotFound)
}

pub(crate) async fn push_history(
    txn: &DatabaseTransaction,
    order_id: Uuid,
    status: OrderStatus,
    changed_by: Uuid,
    note: Option<&str>,
) -> AppResult<()> {
    HistoryActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order_id),
        status: Set(status.as_str().into()),
        changed_by: Set(changed_by),
        changed_at: Set(Utc::now().into()),
        note: Set(note.map(str::to_owned)),
    }
    .insert(txn)
    .await?;
    Ok(())
}

pub(crate) async fn load_history<C: sea_orm::ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> AppResult<Vec<StatusHistoryEntry>> {
    OrderStatusHistory::find()
        .filter(HistoryCol::OrderId.eq(order_id))
        .order_by_asc(HistoryCol::ChangedAt)
        .all(conn)
        .await?
        .into_iter()
        .map(history_from_entity)
        .collect()
}

/// Broadcast a committed status change to the order room and the staff
/// rooms that need to act on the new status.
pub(crate) fn emit_status_change(
    state: &AppState,
    order: &Order,
    old_status: OrderStatus,
    new_status: OrderStatus,
) {
    let mut rooms = vec![Room::Order(order.id)];
    rooms.extend(staff_rooms_for(new_status));
    let event = if new_status == OrderStatus::Cancelled {
        OrderEvent::OrderCancelled {
            order_id: order.id,
            order_number: order.order_number.clone(),
        }
    } else {
        OrderEvent::status_updated(order.id, order.order_number.clone(), old_status, new_status)
    };
    state.notifier().notify(&rooms, event);
}

fn emit_payment_event(state: &AppState, order: &Order, event: OrderEvent) {
    let rooms = [
        Room::Order(order.id),
        Room::Staff(crate::models::UserRole::Admin),
        Room::Staff(crate::models::UserRole::Cashier),
    ];
    state.notifier().notify(&rooms, event);
}

pub(crate) async fn audit(state: &AppState, user: &AuthUser, action: &str, order: &OrderModel) {
    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        action,
        Some("orders"),
        Some(serde_json::json!({
            "order_id": order.id,
            "order_number": order.order_number,
            "status": order.status,
            "payment_status": order.payment_status,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }
}

pub(crate) fn stored_order_status(s: &str) -> AppResult<OrderStatus> {
    OrderStatus::parse(s)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("corrupt order status '{s}'")))
}

pub(crate) fn stored_payment_status(s: &str) -> AppResult<PaymentStatus> {
    PaymentStatus::parse(s)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("corrupt payment status '{s}'")))
}

pub(crate) fn stored_payment_method(s: &str) -> AppResult<PaymentMethod> {
    PaymentMethod::parse(s)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("corrupt payment method '{s}'")))
}

pub(crate) fn order_from_entity(model: OrderModel) -> AppResult<Order> {
    Ok(Order {
        id: model.id,
        order_number: model.order_number,
        customer_id: model.customer_id,
        customer_name: model.customer_name,
        customer_phone: model.customer_phone,
        customer_email: model.customer_email,
        subtotal: model.subtotal,
        total_amount: model.total_amount,
        status: stored_order_status(&model.status)?,
        payment_status: stored_payment_status(&model.payment_status)?,
        payment_method: stored_payment_method(&model.payment_method)?,
        payment_ref: model.payment_ref,
        amount_received: model.amount_received,
        change_due: model.change_due,
        paid_at: model.paid_at.map(|dt| dt.with_timezone(&Utc)),
        refund_reason: model.refund_reason,
        refunded_at: model.refunded_at.map(|dt| dt.with_timezone(&Utc)),
        delivery_method: DeliveryMethod::parse(&model.delivery_method).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "corrupt delivery method '{}'",
                model.delivery_method
            ))
        })?,
        delivery_time: model.delivery_time,
        special_instructions: model.special_instructions,
        assigned_chef: model.assigned_chef,
        chef_assigned_at: model.chef_assigned_at.map(|dt| dt.with_timezone(&Utc)),
        assigned_delivery: model.assigned_delivery,
        delivery_assigned_at: model.delivery_assigned_at.map(|dt| dt.with_timezone(&Utc)),
        cooking_started_at: model.cooking_started_at.map(|dt| dt.with_timezone(&Utc)),
        cooking_completed_at: model.cooking_completed_at.map(|dt| dt.with_timezone(&Utc)),
        cooking_minutes: model.cooking_minutes,
        delivery_started_at: model.delivery_started_at.map(|dt| dt.with_timezone(&Utc)),
        delivery_completed_at: model.delivery_completed_at.map(|dt| dt.with_timezone(&Utc)),
        delivery_minutes: model.delivery_minutes,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

pub(crate) fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        menu_item_id: model.menu_item_id,
        name: model.name,
        quantity: model.quantity,
        price: model.price,
    }
}

fn history_from_entity(model: HistoryModel) -> AppResult<StatusHistoryEntry> {
    Ok(StatusHistoryEntry {
        status: stored_order_status(&model.status)?,
        changed_by: model.changed_by,
        changed_at: model.changed_at.with_timezone(&Utc),
        note: model.note,
    })
}

/// Human-facing order number: time-based digits plus a random suffix.
/// Collisions are accepted as negligible.
fn generate_order_number() -> String {
    let millis = Utc::now().timestamp_millis().to_string();
    let tail: String = millis.chars().rev().take(6).collect::<Vec<_>>().into_iter().rev().collect();
    let suffix: u32 = rand::thread_rng().gen_range(0..1000);
    format!("ORD{tail}{suffix:03}")
}

#[cfg(test)]
mod tests {
    use super::generate_order_number;

    #[test]
    fn order_numbers_have_the_expected_shape() {
        let n = generate_order_number();
        assert!(n.starts_with("ORD"));
        assert_eq!(n.len(), 12);
        assert!(n[3..].chars().all(|c| c.is_ascii_digit()));
    }
}
