use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::staff::{AssignStaffRequest, StaffList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Order,
    response::ApiResponse,
    services::staff_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{role}", get(list_staff))
        .route("/orders/{id}/assign-chef", post(assign_chef))
        .route("/orders/{id}/assign-delivery", post(assign_delivery))
        .route("/orders/{id}/start-cooking", post(start_cooking))
        .route("/orders/{id}/complete-cooking", post(complete_cooking))
        .route("/orders/{id}/start-delivery", post(start_delivery))
        .route("/orders/{id}/complete-delivery", post(complete_delivery))
}

#[utoipa::path(
    get,
    path = "/api/staff/{role}",
    responses(
        (status = 200, description = "Active staff of a role", body = ApiResponse<StaffList>),
        (status = 400, description = "Unknown staff role"),
        (status = 403, description = "Admin or cashier only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn list_staff(
    State(state): State<AppState>,
    user: AuthUser,
    Path(role): Path<String>,
) -> AppResult<Json<ApiResponse<StaffList>>> {
    let res = staff_service::list_staff(&state, &user, &role).await?;
    Ok(Json(res))
}

#[utoipa::path(
    post,
    path = "/api/staff/orders/{id}/assign-chef",
    request_body = AssignStaffRequest,
    responses(
        (status = 200, description = "Chef assigned", body = ApiResponse<Order>),
        (status = 400, description = "No active cook with that id"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn assign_chef(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignStaffRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let res = staff_service::assign_chef(&state, &user, id, payload).await?;
    Ok(Json(res))
}

#[utoipa::path(
    post,
    path = "/api/staff/orders/{id}/assign-delivery",
    request_body = AssignStaffRequest,
    responses(
        (status = 200, description = "Delivery person assigned", body = ApiResponse<Order>),
        (status = 400, description = "No active delivery person with that id"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn assign_delivery(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignStaffRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let res = staff_service::assign_delivery(&state, &user, id, payload).await?;
    Ok(Json(res))
}

#[utoipa::path(
    post,
    path = "/api/staff/orders/{id}/start-cooking",
    responses(
        (status = 200, description = "Cooking started", body = ApiResponse<Order>),
        (status = 403, description = "Order not assigned to the caller"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn start_cooking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let res = staff_service::start_cooking(&state, &user, id).await?;
    Ok(Json(res))
}

#[utoipa::path(
    post,
    path = "/api/staff/orders/{id}/complete-cooking",
    responses(
        (status = 200, description = "Cooking completed with elapsed minutes", body = ApiResponse<Order>),
        (status = 400, description = "Cooking was never started"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn complete_cooking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let res = staff_service::complete_cooking(&state, &user, id).await?;
    Ok(Json(res))
}

#[utoipa::path(
    post,
    path = "/api/staff/orders/{id}/start-delivery",
    responses(
        (status = 200, description = "Delivery clock started; status unchanged", body = ApiResponse<Order>),
        (status = 400, description = "Order is not ready"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn start_delivery(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let res = staff_service::start_delivery(&state, &user, id).await?;
    Ok(Json(res))
}

#[utoipa::path(
    post,
    path = "/api/staff/orders/{id}/complete-delivery",
    responses(
        (status = 200, description = "Order delivered with elapsed minutes", body = ApiResponse<Order>),
        (status = 400, description = "Delivery was never started"),
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn complete_delivery(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let res = staff_service::complete_delivery(&state, &user, id).await?;
    Ok(Json(res))
}
