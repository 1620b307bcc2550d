use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::menu::{CreateMenuItemRequest, MenuItemList, UpdateMenuItemRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::MenuItem,
    response::ApiResponse,
    routes::params::MenuQuery,
    services::menu_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_menu))
        .route("/", post(create_menu_item))
        .route("/{id}", get(get_menu_item))
        .route("/{id}", put(update_menu_item))
}

#[utoipa::path(
    get,
    path = "/api/menu",
    params(
        ("available_only" = Option<bool>, Query, description = "Only items currently orderable"),
    ),
    responses(
        (status = 200, description = "Menu items", body = ApiResponse<MenuItemList>)
    ),
    tag = "Menu"
)]
pub async fn list_menu(
    State(state): State<AppState>,
    Query(query): Query<MenuQuery>,
) -> AppResult<Json<ApiResponse<MenuItemList>>> {
    let res = menu_service::list_menu(&state, query.available_only.unwrap_or(false)).await?;
    Ok(Json(res))
}

#[utoipa::path(
    get,
    path = "/api/menu/{id}",
    responses(
        (status = 200, description = "Menu item", body = ApiResponse<MenuItem>),
        (status = 404, description = "Not found"),
    ),
    tag = "Menu"
)]
pub async fn get_menu_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    let res = menu_service::get_menu_item(&state, id).await?;
    Ok(Json(res))
}

#[utoipa::path(
    post,
    path = "/api/menu",
    request_body = CreateMenuItemRequest,
    responses(
        (status = 200, description = "Created", body = ApiResponse<MenuItem>),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn create_menu_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateMenuItemRequest>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    let res = menu_service::create_menu_item(&state, &user, payload).await?;
    Ok(Json(res))
}

#[utoipa::path(
    put,
    path = "/api/menu/{id}",
    request_body = UpdateMenuItemRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<MenuItem>),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn update_menu_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMenuItemRequest>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    let res = menu_service::update_menu_item(&state, &user, id, payload).await?;
    Ok(Json(res))
}
