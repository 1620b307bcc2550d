use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::User;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignStaffRequest {
    pub staff_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StaffList {
    pub items: Vec<User>,
}
