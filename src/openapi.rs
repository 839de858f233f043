use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "RMS API",
        version = "0.1.0",
        description = r#"
# Restaurant Management API

A multi-tenant backend for restaurant operations: point-of-sale orders,
inventory control with automatic recipe deduction, menu management, and
table service.

## Authentication

All `/api/v1` endpoints require a bearer token issued by one of the
role-scoped login endpoints (`/auth/admin/login`, `/auth/owner/login`,
`/auth/staff/login`):

```
Authorization: Bearer <your-jwt-token>
```

## Tenancy

Every resource is partitioned by restaurant. Sessions are pinned to their
own restaurant; platform administrators select a tenant with the
`restaurant_id` query parameter.

## Pagination

List endpoints accept `page` and `limit` query parameters and return a
paginated envelope with `total` and `total_pages`.
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        crate::handlers::inventory::list_inventory,
        crate::handlers::inventory::get_low_stock_items,
        crate::handlers::inventory::get_inventory,
        crate::handlers::inventory::create_inventory,
        crate::handlers::inventory::update_inventory,
        crate::handlers::inventory::delete_inventory,
        crate::handlers::inventory::record_transaction,
        crate::handlers::inventory::list_transactions,
        crate::handlers::menu::list_categories,
        crate::handlers::menu::create_category,
        crate::handlers::menu::list_items,
        crate::handlers::menu::get_item,
        crate::handlers::menu::create_item,
        crate::handlers::menu::update_item,
        crate::handlers::menu::delete_item,
        crate::handlers::menu::list_ingredients,
        crate::handlers::menu::set_ingredients,
        crate::handlers::orders::list_orders,
        crate::handlers::orders::create_order,
        crate::handlers::orders::get_order,
        crate::handlers::orders::update_order_status,
        crate::handlers::orders::void_order,
        crate::handlers::orders::process_payment,
        crate::handlers::orders::apply_discount,
        crate::handlers::orders::order_counts,
        crate::handlers::orders::daily_revenue,
        crate::handlers::tables::list_tables,
        crate::handlers::tables::create_table,
        crate::handlers::tables::update_table,
        crate::handlers::tables::delete_table,
        crate::handlers::tables::update_table_status,
        crate::handlers::tables::update_chair_status,
        crate::handlers::restaurants::register_restaurant,
        crate::handlers::restaurants::list_restaurants,
        crate::handlers::restaurants::get_restaurant,
        crate::handlers::restaurants::create_staff_user,
        crate::handlers::settings::get_pos_settings,
        crate::handlers::settings::update_pos_settings,
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        crate::units::Unit,
        crate::entities::inventory_item::StockStatus,
        crate::entities::inventory_transaction::TransactionReason,
        crate::entities::order::OrderStatus,
        crate::entities::order::OrderType,
        crate::entities::order::PaymentStatus,
        crate::entities::order_item::OrderItemStatus,
        crate::entities::dining_table::OccupancyStatus,
        crate::entities::pos_settings::RoundingMode,
        crate::services::inventory::CreateInventoryItemRequest,
        crate::services::inventory::UpdateInventoryItemRequest,
        crate::services::inventory::RecordTransactionRequest,
        crate::services::menu::CreateMenuCategoryRequest,
        crate::services::menu::CreateMenuItemRequest,
        crate::services::menu::UpdateMenuItemRequest,
        crate::services::menu::IngredientInput,
        crate::services::orders::CreateOrderRequest,
        crate::services::orders::CreateOrderItemRequest,
        crate::services::orders::UpdateOrderStatusRequest,
        crate::services::orders::VoidOrderRequest,
        crate::services::orders::ProcessPaymentRequest,
        crate::services::orders::ApplyDiscountRequest,
        crate::services::orders::OrderTotals,
        crate::services::orders::OrderCounts,
        crate::services::tables::CreateTableRequest,
        crate::services::tables::UpdateTableRequest,
        crate::services::tables::UpdateOccupancyRequest,
        crate::services::restaurants::RegisterRestaurantRequest,
        crate::services::restaurants::CreateStaffUserRequest,
        crate::services::settings::PosSettingsView,
        crate::services::settings::UpdatePosSettingsRequest,
        crate::auth::LoginCredentials,
        crate::auth::LoginResponse,
        crate::auth::UserInfo,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Inventory", description = "Inventory items and the stock transaction ledger"),
        (name = "Menu", description = "Menu categories, items and ingredient recipes"),
        (name = "Orders", description = "Point-of-sale order lifecycle"),
        (name = "Tables", description = "Seating plan: tables and chairs"),
        (name = "Restaurants", description = "Tenant registration and users"),
        (name = "Settings", description = "Per-tenant POS settings"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "Bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Swagger UI mounted at /docs, serving the generated document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
