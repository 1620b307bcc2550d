use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::MenuItem;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMenuItemRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub is_available: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMenuItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuItemList {
    pub items: Vec<MenuItem>,
}
