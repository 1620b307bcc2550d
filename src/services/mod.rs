pub mod menu_service;
pub mod order_service;
pub mod staff_service;
