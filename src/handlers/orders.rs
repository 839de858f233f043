use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::{consts as perm, AuthUser};
use crate::entities::order;
use crate::errors::ServiceError;
use crate::handlers::{flatten_validation_errors, resolve_tenant, TenantQuery};
use crate::services::orders::{
    ApplyDiscountRequest, CreateOrderRequest, OrderCounts, OrderWithItems, ProcessPaymentRequest,
    UpdateOrderStatusRequest, VoidOrderRequest,
};
use crate::{ApiResponse, AppState, ListQuery, PaginatedResponse};
use validator::Validate;

#[derive(Debug, Deserialize, IntoParams)]
pub struct OrderListQuery {
    pub restaurant_id: Option<Uuid>,
    /// "active" or a concrete status (pending, preparing, completed, ...)
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DailyRevenue {
    pub revenue: Decimal,
}

/// List orders, newest first
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(ListQuery, OrderListQuery),
    responses(
        (status = 200, description = "Orders retrieved", body = ApiResponse<PaginatedResponse<order::Model>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filter): Query<OrderListQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<PaginatedResponse<order::Model>>>, ServiceError> {
    if !auth_user.has_permission(perm::ORDERS_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to read orders".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let (orders, total) = state
        .services
        .orders
        .list_orders(&ctx, filter.status, query.page, query.limit)
        .await?;
    let total_pages = total.div_ceil(query.limit.max(1));

    Ok(Json(ApiResponse::success(PaginatedResponse {
        items: orders,
        total,
        page: query.page,
        limit: query.limit,
        total_pages,
    })))
}

/// Create an order; totals, order number and ingredient deduction happen
/// atomically
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    params(TenantQuery),
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Menu item not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_order(
    State(state): State<AppState>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderWithItems>>), ServiceError> {
    if !auth_user.has_permission(perm::ORDERS_CREATE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to create orders".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    if let Err(validation_errors) = request.validate() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::validation_errors(flatten_validation_errors(
                &validation_errors,
            ))),
        ));
    }

    let created = state.services.orders.create_order(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// Get an order with its line items
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id"), TenantQuery),
    responses(
        (status = 200, description = "Order retrieved", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<OrderWithItems>>, ServiceError> {
    if !auth_user.has_permission(perm::ORDERS_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to read orders".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let order = state.services.orders.get_order(&ctx, id).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Advance an order's lifecycle status (guarded transitions)
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order id"), TenantQuery),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<order::Model>),
        (status = 400, description = "Illegal transition", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> Result<Json<ApiResponse<order::Model>>, ServiceError> {
    if !auth_user.has_permission(perm::ORDERS_UPDATE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to update orders".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let updated = state
        .services
        .orders
        .update_status(&ctx, id, request)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// Void an order, restoring deducted inventory in the same transaction
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/void",
    params(("id" = Uuid, Path, description = "Order id"), TenantQuery),
    request_body = VoidOrderRequest,
    responses(
        (status = 200, description = "Order voided", body = ApiResponse<order::Model>),
        (status = 400, description = "Order is in a terminal status", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn void_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
    Json(request): Json<VoidOrderRequest>,
) -> Result<Json<ApiResponse<order::Model>>, ServiceError> {
    if !auth_user.has_permission(perm::ORDERS_CANCEL) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to void orders".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let voided = state.services.orders.void_order(&ctx, id, request).await?;
    Ok(Json(ApiResponse::success(voided)))
}

/// Settle payment for a served order
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/pay",
    params(("id" = Uuid, Path, description = "Order id"), TenantQuery),
    request_body = ProcessPaymentRequest,
    responses(
        (status = 200, description = "Payment processed", body = ApiResponse<order::Model>),
        (status = 409, description = "Already paid", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn process_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
    Json(request): Json<ProcessPaymentRequest>,
) -> Result<Json<ApiResponse<order::Model>>, ServiceError> {
    if !auth_user.has_permission(perm::ORDERS_PAY) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to settle orders".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let paid = state
        .services
        .orders
        .process_payment(&ctx, id, request)
        .await?;
    Ok(Json(ApiResponse::success(paid)))
}

/// Apply a flat or percentage discount to an open order
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/discount",
    params(("id" = Uuid, Path, description = "Order id"), TenantQuery),
    request_body = ApplyDiscountRequest,
    responses(
        (status = 200, description = "Discount applied", body = ApiResponse<order::Model>),
        (status = 400, description = "Invalid discount", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn apply_discount(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
    Json(request): Json<ApplyDiscountRequest>,
) -> Result<Json<ApiResponse<order::Model>>, ServiceError> {
    if !auth_user.has_permission(perm::ORDERS_UPDATE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to update orders".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let updated = state
        .services
        .orders
        .apply_discount(&ctx, id, request)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// Today's order counts by bucket
#[utoipa::path(
    get,
    path = "/api/v1/orders/counts",
    params(TenantQuery),
    responses(
        (status = 200, description = "Counts retrieved", body = ApiResponse<OrderCounts>),
    ),
    security(("Bearer" = []))
)]
pub async fn order_counts(
    State(state): State<AppState>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<OrderCounts>>, ServiceError> {
    if !auth_user.has_permission(perm::REPORTS_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to read reports".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let counts = state.services.orders.order_counts(&ctx).await?;
    Ok(Json(ApiResponse::success(counts)))
}

/// Revenue from completed orders since midnight
#[utoipa::path(
    get,
    path = "/api/v1/orders/revenue/daily",
    params(TenantQuery),
    responses(
        (status = 200, description = "Revenue retrieved", body = ApiResponse<DailyRevenue>),
    ),
    security(("Bearer" = []))
)]
pub async fn daily_revenue(
    State(state): State<AppState>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<DailyRevenue>>, ServiceError> {
    if !auth_user.has_permission(perm::REPORTS_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to read reports".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let revenue = state.services.orders.daily_revenue(&ctx).await?;
    Ok(Json(ApiResponse::success(DailyRevenue { revenue })))
}
