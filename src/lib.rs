//! RMS API Library
//!
//! Multi-tenant restaurant management backend: point-of-sale orders,
//! inventory control with automatic recipe deduction, menu management,
//! and table service.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;
pub mod units;

use axum::{extract::State, response::Json, routing::get, Router};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::auth::AuthRouterExt;
use crate::auth::consts as perm;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

// Common query parameters for list endpoints
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub search: Option<String>,
}

fn default_page() -> u64 {
    1
}
fn default_limit() -> u64 {
    20
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

// Versioned API routes, permission-gated per resource group
pub fn api_v1_routes() -> Router<AppState> {
    // Inventory routes with permission gating
    let inventory_read = Router::new()
        .route("/inventory", get(handlers::inventory::list_inventory))
        .route(
            "/inventory/low-stock",
            get(handlers::inventory::get_low_stock_items),
        )
        .route(
            "/inventory/transactions",
            get(handlers::inventory::list_transactions),
        )
        .route("/inventory/:id", get(handlers::inventory::get_inventory))
        .with_permission(perm::INVENTORY_READ);

    let inventory_mutate = Router::new()
        .route(
            "/inventory",
            axum::routing::post(handlers::inventory::create_inventory),
        )
        .route(
            "/inventory/:id",
            axum::routing::put(handlers::inventory::update_inventory),
        )
        .route(
            "/inventory/:id",
            axum::routing::delete(handlers::inventory::delete_inventory),
        )
        .route(
            "/inventory/transactions",
            axum::routing::post(handlers::inventory::record_transaction),
        )
        .with_permission(perm::INVENTORY_ADJUST);

    // Menu routes with permission gating
    let menu_read = Router::new()
        .route("/menu/categories", get(handlers::menu::list_categories))
        .route("/menu/items", get(handlers::menu::list_items))
        .route("/menu/items/:id", get(handlers::menu::get_item))
        .route(
            "/menu/items/:id/ingredients",
            get(handlers::menu::list_ingredients),
        )
        .with_permission(perm::MENU_READ);

    let menu_manage = Router::new()
        .route(
            "/menu/categories",
            axum::routing::post(handlers::menu::create_category),
        )
        .route(
            "/menu/items",
            axum::routing::post(handlers::menu::create_item),
        )
        .route(
            "/menu/items/:id",
            axum::routing::put(handlers::menu::update_item),
        )
        .route(
            "/menu/items/:id",
            axum::routing::delete(handlers::menu::delete_item),
        )
        .route(
            "/menu/items/:id/ingredients",
            axum::routing::put(handlers::menu::set_ingredients),
        )
        .with_permission(perm::MENU_MANAGE);

    // Orders routes with permission gating
    let orders_read = Router::new()
        .route("/orders", get(handlers::orders::list_orders))
        .route("/orders/:id", get(handlers::orders::get_order))
        .with_permission(perm::ORDERS_READ);

    let orders_create = Router::new()
        .route(
            "/orders",
            axum::routing::post(handlers::orders::create_order),
        )
        .with_permission(perm::ORDERS_CREATE);

    let orders_update = Router::new()
        .route(
            "/orders/:id/status",
            axum::routing::put(handlers::orders::update_order_status),
        )
        .route(
            "/orders/:id/discount",
            axum::routing::post(handlers::orders::apply_discount),
        )
        .with_permission(perm::ORDERS_UPDATE);

    let orders_void = Router::new()
        .route(
            "/orders/:id/void",
            axum::routing::post(handlers::orders::void_order),
        )
        .with_permission(perm::ORDERS_CANCEL);

    let orders_pay = Router::new()
        .route(
            "/orders/:id/pay",
            axum::routing::post(handlers::orders::process_payment),
        )
        .with_permission(perm::ORDERS_PAY);

    let reports = Router::new()
        .route("/orders/counts", get(handlers::orders::order_counts))
        .route(
            "/orders/revenue/daily",
            get(handlers::orders::daily_revenue),
        )
        .with_permission(perm::REPORTS_READ);

    // Tables routes with permission gating
    let tables_read = Router::new()
        .route("/tables", get(handlers::tables::list_tables))
        .with_permission(perm::TABLES_READ);

    let tables_manage = Router::new()
        .route(
            "/tables",
            axum::routing::post(handlers::tables::create_table),
        )
        .route(
            "/tables/:id",
            axum::routing::put(handlers::tables::update_table),
        )
        .route(
            "/tables/:id",
            axum::routing::delete(handlers::tables::delete_table),
        )
        .with_permission(perm::TABLES_MANAGE);

    let tables_status = Router::new()
        .route(
            "/tables/:id/status",
            axum::routing::put(handlers::tables::update_table_status),
        )
        .route(
            "/tables/:table_id/chairs/:chair_id/status",
            axum::routing::put(handlers::tables::update_chair_status),
        )
        .with_permission(perm::TABLES_UPDATE_STATUS);

    // Tenant administration
    let restaurants_admin = Router::new()
        .route(
            "/restaurants",
            axum::routing::post(handlers::restaurants::register_restaurant),
        )
        .route("/restaurants", get(handlers::restaurants::list_restaurants))
        .with_permission(perm::RESTAURANTS_MANAGE);

    let restaurants_read = Router::new()
        .route(
            "/restaurants/:id",
            get(handlers::restaurants::get_restaurant),
        )
        .with_auth();

    let restaurant_users = Router::new()
        .route(
            "/restaurants/users",
            axum::routing::post(handlers::restaurants::create_staff_user),
        )
        .with_permission(perm::USERS_CREATE);

    // POS settings
    let settings_read = Router::new()
        .route("/settings/pos", get(handlers::settings::get_pos_settings))
        .with_permission(perm::SETTINGS_READ);

    let settings_update = Router::new()
        .route(
            "/settings/pos",
            axum::routing::put(handlers::settings::update_pos_settings),
        )
        .with_permission(perm::SETTINGS_UPDATE);

    Router::new()
        // Status and health endpoints
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        // Inventory API (auth + permissions)
        .merge(inventory_read)
        .merge(inventory_mutate)
        // Menu API (auth + permissions)
        .merge(menu_read)
        .merge(menu_manage)
        // Orders API (auth + permissions)
        .merge(orders_read)
        .merge(orders_create)
        .merge(orders_update)
        .merge(orders_void)
        .merge(orders_pay)
        .merge(reports)
        // Tables API (auth + permissions)
        .merge(tables_read)
        .merge(tables_manage)
        .merge(tables_status)
        // Tenant administration
        .merge(restaurants_admin)
        .merge(restaurants_read)
        .merge(restaurant_users)
        // POS settings
        .merge(settings_read)
        .merge(settings_update)
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let version = env!("CARGO_PKG_VERSION");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "service": "rms-api",
        "timestamp": Utc::now().to_rfc3339(),
        "environment": std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[tokio::test]
    async fn error_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-err"), async {
                ApiResponse::<()>::error("oops".into())
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-err"));
        assert!(!meta.timestamp.is_empty());
    }

    #[tokio::test]
    async fn validation_errors_response_includes_metadata() {
        let response = crate::tracing::scope_request_id(
            crate::tracing::RequestId::new("meta-validation"),
            async { ApiResponse::<()>::validation_errors(vec!["missing".into()]) },
        )
        .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-validation"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }
}
