use axum::{
    extract::{Query, State},
    response::Json,
};

use crate::auth::{consts as perm, AuthUser};
use crate::errors::ServiceError;
use crate::handlers::{resolve_tenant, TenantQuery};
use crate::services::settings::{PosSettingsView, UpdatePosSettingsRequest};
use crate::{ApiResponse, AppState};

/// Resolved POS settings for the tenant (stored row or configured defaults)
#[utoipa::path(
    get,
    path = "/api/v1/settings/pos",
    params(TenantQuery),
    responses(
        (status = 200, description = "Settings retrieved", body = ApiResponse<PosSettingsView>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_pos_settings(
    State(state): State<AppState>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<PosSettingsView>>, ServiceError> {
    if !auth_user.has_permission(perm::SETTINGS_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to read settings".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let settings = state.services.settings.get(ctx.restaurant_id).await?;
    Ok(Json(ApiResponse::success(settings)))
}

/// Update POS settings for the tenant
#[utoipa::path(
    put,
    path = "/api/v1/settings/pos",
    params(TenantQuery),
    request_body = UpdatePosSettingsRequest,
    responses(
        (status = 200, description = "Settings updated", body = ApiResponse<PosSettingsView>),
        (status = 400, description = "Invalid settings", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_pos_settings(
    State(state): State<AppState>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
    Json(request): Json<UpdatePosSettingsRequest>,
) -> Result<Json<ApiResponse<PosSettingsView>>, ServiceError> {
    if !auth_user.has_permission(perm::SETTINGS_UPDATE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to update settings".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let settings = state
        .services
        .settings
        .update(ctx.restaurant_id, request)
        .await?;
    Ok(Json(ApiResponse::success(settings)))
}
