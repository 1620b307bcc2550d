use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::{
        CashPaymentRequest, ChargeResponse, ConfirmPaymentRequest, CreateOrderRequest, OrderList,
        OrderWithItems, PaymentView, RefundRequest, UpdateStatusRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Order,
    response::ApiResponse,
    routes::params::{OrderListQuery, Pagination},
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order))
        .route("/", get(list_orders))
        .route("/my", get(list_my_orders))
        .route("/payment-status/{status}", get(list_by_payment_status))
        .route("/{id}", get(get_order))
        .route("/{id}/status", patch(update_status))
        .route("/{id}/cancel", post(cancel_order))
        .route("/{id}/charge", post(create_charge))
        .route("/{id}/cash-payment", post(cash_payment))
        .route("/{id}/confirm-payment", post(confirm_payment))
        .route("/{id}/refund", post(refund_payment))
        .route("/{id}/payment", get(get_payment))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order created", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Empty order, unknown method, or unavailable item"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let res = order_service::create_order(&state, &user, payload).await?;
    Ok(Json(res))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by order status"),
        ("sort_order" = Option<String>, Query, description = "asc or desc by created_at"),
    ),
    responses(
        (status = 200, description = "All orders", body = ApiResponse<OrderList>),
        (status = 403, description = "Admin or cashier only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let res = order_service::list_orders(&state, &user, query).await?;
    Ok(Json(res))
}

#[utoipa::path(
    get,
    path = "/api/orders/my",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "Caller's orders", body = ApiResponse<OrderList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_my_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let res = order_service::list_my_orders(&state, &user, pagination).await?;
    Ok(Json(res))
}

#[utoipa::path(
    get,
    path = "/api/orders/payment-status/{status}",
    responses(
        (status = 200, description = "Orders in a payment state", body = ApiResponse<OrderList>),
        (status = 403, description = "Admin or cashier only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn list_by_payment_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(status): Path<String>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let res = order_service::list_by_payment_status(&state, &user, &status, pagination).await?;
    Ok(Json(res))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    responses(
        (status = 200, description = "Order with items and history", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let res = order_service::get_order(&state, &user, id).await?;
    Ok(Json(res))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/status",
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<Order>),
        (status = 400, description = "Unknown status string"),
        (status = 403, description = "Transition not allowed for this role"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let res = order_service::update_status(&state, &user, id, payload).await?;
    Ok(Json(res))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/cancel",
    responses(
        (status = 200, description = "Order cancelled", body = ApiResponse<Order>),
        (status = 400, description = "Order is past the pending stage"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let res = order_service::cancel_order(&state, &user, id).await?;
    Ok(Json(res))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/charge",
    responses(
        (status = 200, description = "Charge opened", body = ApiResponse<ChargeResponse>),
        (status = 502, description = "Gateway rejected the charge"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn create_charge(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ChargeResponse>>> {
    let res = order_service::create_charge(&state, &user, id).await?;
    Ok(Json(res))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/cash-payment",
    request_body = CashPaymentRequest,
    responses(
        (status = 200, description = "Cash settled", body = ApiResponse<Order>),
        (status = 400, description = "Insufficient amount or already paid"),
        (status = 403, description = "Admin or cashier only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn cash_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CashPaymentRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let res = order_service::cash_payment(&state, &user, id, payload).await?;
    Ok(Json(res))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/confirm-payment",
    request_body = ConfirmPaymentRequest,
    responses(
        (status = 200, description = "Payment recorded", body = ApiResponse<Order>),
        (status = 400, description = "Not a card order or already paid"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn confirm_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ConfirmPaymentRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let res = order_service::confirm_payment(&state, &user, id, payload).await?;
    Ok(Json(res))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/refund",
    request_body = RefundRequest,
    responses(
        (status = 200, description = "Payment refunded", body = ApiResponse<Order>),
        (status = 403, description = "Admin only, or payment not completed"),
        (status = 502, description = "Gateway reversal failed; order unchanged"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn refund_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RefundRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let res = order_service::refund_payment(&state, &user, id, payload).await?;
    Ok(Json(res))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}/payment",
    responses(
        (status = 200, description = "Payment details", body = ApiResponse<PaymentView>),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn get_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PaymentView>>> {
    let res = order_service::get_payment(&state, &user, id).await?;
    Ok(Json(res))
}
