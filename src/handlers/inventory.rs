use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::auth::{consts as perm, AuthUser};
use crate::entities::{inventory_item, inventory_transaction};
use crate::errors::ServiceError;
use crate::handlers::{resolve_tenant, TenantQuery};
use crate::services::inventory::{
    CreateInventoryItemRequest, RecordTransactionRequest, UpdateInventoryItemRequest,
};
use crate::{ApiResponse, AppState, ListQuery, PaginatedResponse};

#[derive(Debug, Deserialize, IntoParams)]
pub struct InventoryListQuery {
    pub restaurant_id: Option<Uuid>,
    /// Filter by derived stock status
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TransactionListQuery {
    pub restaurant_id: Option<Uuid>,
    pub inventory_item_id: Option<Uuid>,
}

/// List inventory items
#[utoipa::path(
    get,
    path = "/api/v1/inventory",
    params(ListQuery, InventoryListQuery),
    responses(
        (status = 200, description = "Inventory items retrieved", body = ApiResponse<PaginatedResponse<inventory_item::Model>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_inventory(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filter): Query<InventoryListQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<PaginatedResponse<inventory_item::Model>>>, ServiceError> {
    if !auth_user.has_permission(perm::INVENTORY_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to read inventory".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let (items, total) = state
        .services
        .inventory
        .list_items(&ctx, query.page, query.limit, query.search, filter.status)
        .await?;
    let total_pages = total.div_ceil(query.limit.max(1));

    Ok(Json(ApiResponse::success(PaginatedResponse {
        items,
        total,
        page: query.page,
        limit: query.limit,
        total_pages,
    })))
}

/// Items at or below their minimum stock level
#[utoipa::path(
    get,
    path = "/api/v1/inventory/low-stock",
    params(TenantQuery),
    responses(
        (status = 200, description = "Low stock items retrieved", body = ApiResponse<Vec<inventory_item::Model>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_low_stock_items(
    State(state): State<AppState>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<inventory_item::Model>>>, ServiceError> {
    if !auth_user.has_permission(perm::INVENTORY_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to read inventory".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let items = state.services.inventory.low_stock_items(&ctx).await?;
    Ok(Json(ApiResponse::success(items)))
}

/// Get one inventory item
#[utoipa::path(
    get,
    path = "/api/v1/inventory/{id}",
    params(("id" = Uuid, Path, description = "Inventory item id"), TenantQuery),
    responses(
        (status = 200, description = "Inventory item retrieved", body = ApiResponse<inventory_item::Model>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_inventory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<inventory_item::Model>>, ServiceError> {
    if !auth_user.has_permission(perm::INVENTORY_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to read inventory".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let item = state.services.inventory.get_item(&ctx, id).await?;
    Ok(Json(ApiResponse::success(item)))
}

/// Create an inventory item
#[utoipa::path(
    post,
    path = "/api/v1/inventory",
    params(TenantQuery),
    request_body = CreateInventoryItemRequest,
    responses(
        (status = 201, description = "Inventory item created", body = ApiResponse<inventory_item::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_inventory(
    State(state): State<AppState>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
    Json(request): Json<CreateInventoryItemRequest>,
) -> Result<(StatusCode, Json<ApiResponse<inventory_item::Model>>), ServiceError> {
    if !auth_user.has_permission(perm::INVENTORY_CREATE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to create inventory items".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let item = state.services.inventory.create_item(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(item))))
}

/// Update an inventory item
#[utoipa::path(
    put,
    path = "/api/v1/inventory/{id}",
    params(("id" = Uuid, Path, description = "Inventory item id"), TenantQuery),
    request_body = UpdateInventoryItemRequest,
    responses(
        (status = 200, description = "Inventory item updated", body = ApiResponse<inventory_item::Model>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_inventory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
    Json(request): Json<UpdateInventoryItemRequest>,
) -> Result<Json<ApiResponse<inventory_item::Model>>, ServiceError> {
    if !auth_user.has_permission(perm::INVENTORY_UPDATE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to update inventory items".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let item = state
        .services
        .inventory
        .update_item(&ctx, id, request)
        .await?;
    Ok(Json(ApiResponse::success(item)))
}

/// Delete an inventory item (refused while referenced by menu recipes)
#[utoipa::path(
    delete,
    path = "/api/v1/inventory/{id}",
    params(("id" = Uuid, Path, description = "Inventory item id"), TenantQuery),
    responses(
        (status = 200, description = "Inventory item deleted", body = ApiResponse<serde_json::Value>),
        (status = 409, description = "Item is referenced by menu recipes", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_inventory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, ServiceError> {
    if !auth_user.has_permission(perm::INVENTORY_DELETE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to delete inventory items".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    state.services.inventory.delete_item(&ctx, id).await?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": id }),
    )))
}

/// Record a stock transaction (ledger entry plus stock update)
#[utoipa::path(
    post,
    path = "/api/v1/inventory/transactions",
    params(TenantQuery),
    request_body = RecordTransactionRequest,
    responses(
        (status = 201, description = "Transaction recorded", body = ApiResponse<inventory_transaction::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn record_transaction(
    State(state): State<AppState>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
    Json(request): Json<RecordTransactionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<inventory_transaction::Model>>), ServiceError> {
    if !auth_user.has_permission(perm::INVENTORY_ADJUST) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to adjust inventory".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let row = state
        .services
        .inventory
        .record_transaction(&ctx, request)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(row))))
}

/// The transaction ledger, newest first
#[utoipa::path(
    get,
    path = "/api/v1/inventory/transactions",
    params(ListQuery, TransactionListQuery),
    responses(
        (status = 200, description = "Transactions retrieved", body = ApiResponse<PaginatedResponse<inventory_transaction::Model>>),
    ),
    security(("Bearer" = []))
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filter): Query<TransactionListQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<PaginatedResponse<inventory_transaction::Model>>>, ServiceError> {
    if !auth_user.has_permission(perm::INVENTORY_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to read inventory".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let (items, total) = state
        .services
        .inventory
        .list_transactions(&ctx, filter.inventory_item_id, query.page, query.limit)
        .await?;
    let total_pages = total.div_ceil(query.limit.max(1));

    Ok(Json(ApiResponse::success(PaginatedResponse {
        items,
        total,
        page: query.page,
        limit: query.limit,
        total_pages,
    })))
}
