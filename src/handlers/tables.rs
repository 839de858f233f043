use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::auth::{consts as perm, AuthUser};
use crate::entities::{chair, dining_table};
use crate::errors::ServiceError;
use crate::handlers::{resolve_tenant, TenantQuery};
use crate::services::tables::{
    CreateTableRequest, TableWithChairs, UpdateOccupancyRequest, UpdateTableRequest,
};
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize, IntoParams)]
pub struct TableListQuery {
    pub restaurant_id: Option<Uuid>,
    pub section: Option<String>,
}

/// List tables with their chairs
#[utoipa::path(
    get,
    path = "/api/v1/tables",
    params(TableListQuery),
    responses(
        (status = 200, description = "Tables retrieved", body = ApiResponse<Vec<TableWithChairs>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_tables(
    State(state): State<AppState>,
    Query(filter): Query<TableListQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<TableWithChairs>>>, ServiceError> {
    if !auth_user.has_permission(perm::TABLES_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to read tables".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let tables = state
        .services
        .tables
        .list_tables(&ctx, filter.section)
        .await?;
    Ok(Json(ApiResponse::success(tables)))
}

/// Create a table; chairs are generated one per seat
#[utoipa::path(
    post,
    path = "/api/v1/tables",
    params(TenantQuery),
    request_body = CreateTableRequest,
    responses(
        (status = 201, description = "Table created", body = ApiResponse<TableWithChairs>),
        (status = 409, description = "Duplicate table number", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_table(
    State(state): State<AppState>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
    Json(request): Json<CreateTableRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TableWithChairs>>), ServiceError> {
    if !auth_user.has_permission(perm::TABLES_MANAGE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to manage tables".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let created = state.services.tables.create_table(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// Update a table's number or section
#[utoipa::path(
    put,
    path = "/api/v1/tables/{id}",
    params(("id" = Uuid, Path, description = "Table id"), TenantQuery),
    request_body = UpdateTableRequest,
    responses(
        (status = 200, description = "Table updated", body = ApiResponse<dining_table::Model>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_table(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
    Json(request): Json<UpdateTableRequest>,
) -> Result<Json<ApiResponse<dining_table::Model>>, ServiceError> {
    if !auth_user.has_permission(perm::TABLES_MANAGE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to manage tables".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let updated = state.services.tables.update_table(&ctx, id, request).await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// Delete a table and its chairs
#[utoipa::path(
    delete,
    path = "/api/v1/tables/{id}",
    params(("id" = Uuid, Path, description = "Table id"), TenantQuery),
    responses(
        (status = 200, description = "Table deleted", body = ApiResponse<serde_json::Value>),
        (status = 409, description = "Table has open orders", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_table(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, ServiceError> {
    if !auth_user.has_permission(perm::TABLES_MANAGE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to manage tables".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    state.services.tables.delete_table(&ctx, id).await?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": id }),
    )))
}

/// Update a table's occupancy status
#[utoipa::path(
    put,
    path = "/api/v1/tables/{id}/status",
    params(("id" = Uuid, Path, description = "Table id"), TenantQuery),
    request_body = UpdateOccupancyRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<dining_table::Model>),
        (status = 400, description = "Unknown status", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_table_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
    Json(request): Json<UpdateOccupancyRequest>,
) -> Result<Json<ApiResponse<dining_table::Model>>, ServiceError> {
    if !auth_user.has_permission(perm::TABLES_UPDATE_STATUS) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to update table status".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let updated = state
        .services
        .tables
        .update_table_status(&ctx, id, request)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// Update one chair's occupancy status
#[utoipa::path(
    put,
    path = "/api/v1/tables/{table_id}/chairs/{chair_id}/status",
    params(
        ("table_id" = Uuid, Path, description = "Table id"),
        ("chair_id" = Uuid, Path, description = "Chair id"),
        TenantQuery
    ),
    responses(
        (status = 200, description = "Chair status updated", body = ApiResponse<chair::Model>),
        (status = 404, description = "Chair not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_chair_status(
    State(state): State<AppState>,
    Path((table_id, chair_id)): Path<(Uuid, Uuid)>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
    Json(request): Json<UpdateOccupancyRequest>,
) -> Result<Json<ApiResponse<chair::Model>>, ServiceError> {
    if !auth_user.has_permission(perm::TABLES_UPDATE_STATUS) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to update chair status".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let updated = state
        .services
        .tables
        .update_chair_status(&ctx, table_id, chair_id, request)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}
