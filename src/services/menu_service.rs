use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    dto::menu::{CreateMenuItemRequest, MenuItemList, UpdateMenuItemRequest},
    entity::menu_items::{
        ActiveModel as MenuItemActive, Column as MenuItemCol, Entity as MenuItems,
        Model as MenuItemModel,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::MenuItem,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_menu(state: &AppState, available_only: bool) -> AppResult<ApiResponse<MenuItemList>> {
    let mut finder = MenuItems::find().order_by_asc(MenuItemCol::Name);
    if available_only {
        finder = finder.filter(MenuItemCol::IsAvailable.eq(true));
    }
    let items = finder
        .all(&state.orm)
        .await?
        .into_iter()
        .map(menu_item_from_entity)
        .collect();
    Ok(ApiResponse::success(
        "Menu",
        MenuItemList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_menu_item(state: &AppState, id: Uuid) -> AppResult<ApiResponse<MenuItem>> {
    let item = MenuItems::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "OK",
        menu_item_from_entity(item),
        Some(Meta::empty()),
    ))
}

pub async fn create_menu_item(
    state: &AppState,
    user: &AuthUser,
    payload: CreateMenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    ensure_admin(user)?;
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Menu item name is required".into()));
    }
    if payload.price < 0 {
        return Err(AppError::Validation("Price cannot be negative".into()));
    }

    let item = MenuItemActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        description: Set(payload.description),
        price: Set(payload.price),
        is_available: Set(payload.is_available.unwrap_or(true)),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Menu item created",
        menu_item_from_entity(item),
        Some(Meta::empty()),
    ))
}

pub async fn update_menu_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateMenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    ensure_admin(user)?;
    let existing = MenuItems::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: MenuItemActive = existing.into();
    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(AppError::Validation("Menu item name is required".into()));
        }
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        if price < 0 {
            return Err(AppError::Validation("Price cannot be negative".into()));
        }
        active.price = Set(price);
    }
    if let Some(is_available) = payload.is_available {
        active.is_available = Set(is_available);
    }
    let updated = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Menu item updated",
        menu_item_from_entity(updated),
        Some(Meta::empty()),
    ))
}

fn menu_item_from_entity(model: MenuItemModel) -> MenuItem {
    MenuItem {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        is_available: model.is_available,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
