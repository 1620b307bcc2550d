use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait};
use uuid::Uuid;

use crate::{
    dto::staff::{AssignStaffRequest, StaffList},
    entity::{
        orders::ActiveModel as OrderActive,
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    lifecycle,
    middleware::auth::{AuthUser, ensure_admin_or_cashier, ensure_role},
    models::{Order, OrderStatus, User, UserRole},
    response::{ApiResponse, Meta},
    services::order_service::{
        audit, emit_status_change, load_for_update, order_from_entity, push_history,
        stored_order_status,
    },
    state::AppState,
};

/// Active staff members of one role, for assignment pickers.
pub async fn list_staff(state: &AppState, user: &AuthUser, role: &str) -> AppResult<ApiResponse<StaffList>> {
    ensure_admin_or_cashier(user)?;
    let role = UserRole::parse(role)
        .filter(|r| r.is_staff())
        .ok_or_else(|| AppError::Validation(format!("Unknown staff role '{role}'")))?;

    let members = Users::find()
        .filter(UserCol::Role.eq(role.as_str()))
        .filter(UserCol::IsActive.eq(true))
        .order_by_asc(UserCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|u| User {
            id: u.id,
            name: u.name,
            email: u.email,
            phone: u.phone,
            role,
            is_active: u.is_active,
            created_at: u.created_at.with_timezone(&Utc),
        })
        .collect();

    Ok(ApiResponse::success(
        "Staff",
        StaffList { items: members },
        Some(Meta::empty()),
    ))
}

pub async fn assign_chef(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
    payload: AssignStaffRequest,
) -> AppResult<ApiResponse<Order>> {
    assign(state, user, order_id, payload, UserRole::Cook).await
}

pub async fn assign_delivery(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
    payload: AssignStaffRequest,
) -> AppResult<ApiResponse<Order>> {
    assign(state, user, order_id, payload, UserRole::Delivery).await
}

async fn assign(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
    payload: AssignStaffRequest,
    role: UserRole,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin_or_cashier(user)?;

    let staff = Users::find_by_id(payload.staff_id)
        .one(&state.orm)
        .await?
        .filter(|u| u.is_active && u.role == role.as_str())
        .ok_or_else(|| AppError::Validation(format!("No active {role} with that id")))?;

    let txn = state.orm.begin().await?;
    let existing = load_for_update(&txn, order_id).await?;
    let now = Utc::now();
    let mut active: OrderActive = existing.into();
    match role {
        UserRole::Cook => {
            active.assigned_chef = Set(Some(staff.id));
            active.chef_assigned_at = Set(Some(now.into()));
        }
        _ => {
            active.assigned_delivery = Set(Some(staff.id));
            active.delivery_assigned_at = Set(Some(now.into()));
        }
    }
    active.updated_at = Set(now.into());
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    audit(state, user, "staff_assigned", &updated).await;

    Ok(ApiResponse::success(
        format!("{} assigned", staff.name),
        order_from_entity(updated)?,
        Some(Meta::empty()),
    ))
}

/// The assigned chef picks the order up. Moves it to `preparing` and
/// starts the cooking clock.
pub async fn start_cooking(state: &AppState, user: &AuthUser, order_id: Uuid) -> AppResult<ApiResponse<Order>> {
    ensure_role(user, &[UserRole::Cook])?;

    let txn = state.orm.begin().await?;
    let existing = load_for_update(&txn, order_id).await?;
    if existing.assigned_chef != Some(user.user_id) {
        return Err(AppError::Authorization(
            "This order is not assigned to you".into(),
        ));
    }
    let current = stored_order_status(&existing.status)?;
    if !matches!(current, OrderStatus::Confirmed | OrderStatus::Preparing) {
        return Err(AppError::InvalidTransition {
            role: user.role.to_string(),
            from: current.to_string(),
            to: OrderStatus::Preparing.to_string(),
        });
    }

    let now = Utc::now();
    let mut active: OrderActive = existing.into();
    active.status = Set(OrderStatus::Preparing.as_str().into());
    active.cooking_started_at = Set(Some(now.into()));
    active.updated_at = Set(now.into());
    let updated = active.update(&txn).await?;
    push_history(&txn, order_id, OrderStatus::Preparing, user.user_id, Some("Started cooking")).await?;
    txn.commit().await?;

    audit(state, user, "cooking_started", &updated).await;

    let order = order_from_entity(updated)?;
    if current != OrderStatus::Preparing {
        emit_status_change(state, &order, current, OrderStatus::Preparing);
    }

    Ok(ApiResponse::success("Cooking started", order, Some(Meta::empty())))
}

/// The assigned chef finishes. Records the elapsed minutes and moves the
/// order to `ready` through the regular transition gate.
pub async fn complete_cooking(state: &AppState, user: &AuthUser, order_id: Uuid) -> AppResult<ApiResponse<Order>> {
    ensure_role(user, &[UserRole::Cook])?;

    let txn = state.orm.begin().await?;
    let existing = load_for_update(&txn, order_id).await?;
    if existing.assigned_chef != Some(user.user_id) {
        return Err(AppError::Authorization(
            "This order is not assigned to you".into(),
        ));
    }
    let started = existing
        .cooking_started_at
        .ok_or_else(|| AppError::Validation("Cooking has not been started".into()))?;
    let current = stored_order_status(&existing.status)?;
    if !lifecycle::can_transition(user.role, current, OrderStatus::Ready) {
        return Err(AppError::InvalidTransition {
            role: user.role.to_string(),
            from: current.to_string(),
            to: OrderStatus::Ready.to_string(),
        });
    }

    let now = Utc::now();
    let mut active: OrderActive = existing.into();
    active.status = Set(OrderStatus::Ready.as_str().into());
    active.cooking_completed_at = Set(Some(now.into()));
    active.cooking_minutes = Set(Some(elapsed_minutes(started.with_timezone(&Utc), now)));
    active.updated_at = Set(now.into());
    let updated = active.update(&txn).await?;
    push_history(&txn, order_id, OrderStatus::Ready, user.user_id, Some("Cooking completed")).await?;
    txn.commit().await?;

    audit(state, user, "cooking_completed", &updated).await;

    let order = order_from_entity(updated)?;
    emit_status_change(state, &order, current, OrderStatus::Ready);

    Ok(ApiResponse::success("Cooking completed", order, Some(Meta::empty())))
}

/// Starts the delivery clock. The order status does not change here; it
/// stays `ready` until the driver confirms the handover.
pub async fn start_delivery(state: &AppState, user: &AuthUser, order_id: Uuid) -> AppResult<ApiResponse<Order>> {
    ensure_role(user, &[UserRole::Delivery])?;

    let txn = state.orm.begin().await?;
    let existing = load_for_update(&txn, order_id).await?;
    if existing.assigned_delivery != Some(user.user_id) {
        return Err(AppError::Authorization(
            "This order is not assigned to you".into(),
        ));
    }
    let current = stored_order_status(&existing.status)?;
    if current != OrderStatus::Ready {
        return Err(AppError::Validation("Order is not ready for delivery".into()));
    }

    let now = Utc::now();
    let mut active: OrderActive = existing.into();
    active.delivery_started_at = Set(Some(now.into()));
    active.updated_at = Set(now.into());
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    audit(state, user, "delivery_started", &updated).await;

    Ok(ApiResponse::success(
        "Delivery started",
        order_from_entity(updated)?,
        Some(Meta::empty()),
    ))
}

pub async fn complete_delivery(state: &AppState, user: &AuthUser, order_id: Uuid) -> AppResult<ApiResponse<Order>> {
    ensure_role(user, &[UserRole::Delivery])?;

    let txn = state.orm.begin().await?;
    let existing = load_for_update(&txn, order_id).await?;
    if existing.assigned_delivery != Some(user.user_id) {
        return Err(AppError::Authorization(
            "This order is not assigned to you".into(),
        ));
    }
    let started = existing
        .delivery_started_at
        .ok_or_else(|| AppError::Validation("Delivery has not been started".into()))?;
    let current = stored_order_status(&existing.status)?;
    if !lifecycle::can_transition(user.role, current, OrderStatus::Delivered) {
        return Err(AppError::InvalidTransition {
            role: user.role.to_string(),
            from: current.to_string(),
            to: OrderStatus::Delivered.to_string(),
        });
    }

    let now = Utc::now();
    let mut active: OrderActive = existing.into();
    active.status = Set(OrderStatus::Delivered.as_str().into());
    active.delivery_completed_at = Set(Some(now.into()));
    active.delivery_minutes = Set(Some(elapsed_minutes(started.with_timezone(&Utc), now)));
    active.updated_at = Set(now.into());
    let updated = active.update(&txn).await?;
    push_history(&txn, order_id, OrderStatus::Delivered, user.user_id, Some("Delivered")).await?;
    txn.commit().await?;

    audit(state, user, "delivery_completed", &updated).await;

    let order = order_from_entity(updated)?;
    emit_status_change(state, &order, current, OrderStatus::Delivered);

    Ok(ApiResponse::success("Order delivered", order, Some(Meta::empty())))
}

/// Wall-clock duration in whole minutes, rounded half-up.
fn elapsed_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i32 {
    let millis = (end - start).num_milliseconds().max(0);
    ((millis as f64) / 60_000.0).round() as i32
}

#[cfg(test)]
mod tests {
    use super::elapsed_minutes;
    use chrono::{Duration, Utc};

    #[test]
    fn elapsed_minutes_rounds_to_nearest() {
        let start = Utc::now();
        assert_eq!(elapsed_minutes(start, start + Duration::seconds(29)), 0);
        assert_eq!(elapsed_minutes(start, start + Duration::seconds(30)), 1);
        assert_eq!(elapsed_minutes(start, start + Duration::seconds(90)), 2);
        assert_eq!(elapsed_minutes(start, start + Duration::minutes(17)), 17);
    }

    #[test]
    fn elapsed_minutes_never_goes_negative() {
        let start = Utc::now();
        assert_eq!(elapsed_minutes(start, start - Duration::minutes(5)), 0);
    }
}
