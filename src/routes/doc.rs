use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        menu::{CreateMenuItemRequest, MenuItemList, UpdateMenuItemRequest},
        orders::{
            CashPaymentRequest, ChargeResponse, ConfirmPaymentRequest, CreateOrderRequest,
            CustomerInfo, OrderItemRequest, OrderList, OrderWithItems, PaymentView, RefundRequest,
            UpdateStatusRequest,
        },
        staff::{AssignStaffRequest, StaffList},
    },
    models::{
        DeliveryMethod, MenuItem, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus,
        StatusHistoryEntry, User, UserRole,
    },
    notify::OrderEvent,
    response::{ApiResponse, Meta},
    routes::{health, menu, orders, params, staff, ws},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        menu::list_menu,
        menu::get_menu_item,
        menu::create_menu_item,
        menu::update_menu_item,
        orders::create_order,
        orders::list_orders,
        orders::list_my_orders,
        orders::list_by_payment_status,
        orders::get_order,
        orders::update_status,
        orders::cancel_order,
        orders::create_charge,
        orders::cash_payment,
        orders::confirm_payment,
        orders::refund_payment,
        orders::get_payment,
        staff::list_staff,
        staff::assign_chef,
        staff::assign_delivery,
        staff::start_cooking,
        staff::complete_cooking,
        staff::start_delivery,
        staff::complete_delivery,
        ws::subscribe_ws,
    ),
    components(
        schemas(
            User,
            UserRole,
            MenuItem,
            Order,
            OrderItem,
            OrderStatus,
            PaymentStatus,
            PaymentMethod,
            DeliveryMethod,
            StatusHistoryEntry,
            OrderEvent,
            CustomerInfo,
            OrderItemRequest,
            CreateOrderRequest,
            UpdateStatusRequest,
            CashPaymentRequest,
            ConfirmPaymentRequest,
            RefundRequest,
            ChargeResponse,
            PaymentView,
            OrderList,
            OrderWithItems,
            CreateMenuItemRequest,
            UpdateMenuItemRequest,
            MenuItemList,
            AssignStaffRequest,
            StaffList,
            params::Pagination,
            params::OrderListQuery,
            params::MenuQuery,
            Meta,
            ApiResponse<Order>,
            ApiResponse<OrderList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<PaymentView>,
            ApiResponse<MenuItem>,
            ApiResponse<MenuItemList>,
            ApiResponse<StaffList>,
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness probe"),
        (name = "Menu", description = "Menu catalog"),
        (name = "Orders", description = "Order lifecycle"),
        (name = "Payments", description = "Payment tracking"),
        (name = "Staff", description = "Assignment and timing"),
        (name = "Live", description = "WebSocket notifications"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<openapi::OpenApi> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
