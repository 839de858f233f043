use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::auth::{consts as perm, AuthUser};
use crate::entities::{menu_category, menu_ingredient, menu_item};
use crate::errors::ServiceError;
use crate::handlers::{resolve_tenant, TenantQuery};
use crate::services::menu::{
    CreateMenuCategoryRequest, CreateMenuItemRequest, IngredientInput, UpdateMenuItemRequest,
};
use crate::{ApiResponse, AppState, ListQuery, PaginatedResponse};

#[derive(Debug, Deserialize, IntoParams)]
pub struct MenuListQuery {
    pub restaurant_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    /// Only items currently marked available
    #[serde(default)]
    pub available_only: bool,
}

/// List menu categories
#[utoipa::path(
    get,
    path = "/api/v1/menu/categories",
    params(TenantQuery),
    responses(
        (status = 200, description = "Categories retrieved", body = ApiResponse<Vec<menu_category::Model>>),
    ),
    security(("Bearer" = []))
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<menu_category::Model>>>, ServiceError> {
    if !auth_user.has_permission(perm::MENU_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to read the menu".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let categories = state.services.menu.list_categories(&ctx).await?;
    Ok(Json(ApiResponse::success(categories)))
}

/// Create a menu category
#[utoipa::path(
    post,
    path = "/api/v1/menu/categories",
    params(TenantQuery),
    request_body = CreateMenuCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<menu_category::Model>),
    ),
    security(("Bearer" = []))
)]
pub async fn create_category(
    State(state): State<AppState>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
    Json(request): Json<CreateMenuCategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<menu_category::Model>>), ServiceError> {
    if !auth_user.has_permission(perm::MENU_MANAGE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to manage the menu".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let category = state.services.menu.create_category(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(category))))
}

/// List menu items
#[utoipa::path(
    get,
    path = "/api/v1/menu/items",
    params(ListQuery, MenuListQuery),
    responses(
        (status = 200, description = "Menu items retrieved", body = ApiResponse<PaginatedResponse<menu_item::Model>>),
    ),
    security(("Bearer" = []))
)]
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filter): Query<MenuListQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<PaginatedResponse<menu_item::Model>>>, ServiceError> {
    if !auth_user.has_permission(perm::MENU_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to read the menu".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let (items, total) = state
        .services
        .menu
        .list_items(
            &ctx,
            query.page,
            query.limit,
            filter.category_id,
            filter.available_only,
        )
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

/// Get one menu item
#[utoipa::path(
    get,
    path = "/api/v1/menu/items/{id}",
    params(("id" = Uuid, Path, description = "Menu item id"), TenantQuery),
    responses(
        (status = 200, description = "Menu item retrieved", body = ApiResponse<menu_item::Model>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<menu_item::Model>>, ServiceError> {
    if !auth_user.has_permission(perm::MENU_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to read the menu".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let item = state.services.menu.get_item(&ctx, id).await?;
    Ok(Json(ApiResponse::success(item)))
}

/// Create a menu item
#[utoipa::path(
    post,
    path = "/api/v1/menu/items",
    params(TenantQuery),
    request_body = CreateMenuItemRequest,
    responses(
        (status = 201, description = "Menu item created", body = ApiResponse<menu_item::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_item(
    State(state): State<AppState>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
    Json(request): Json<CreateMenuItemRequest>,
) -> Result<(StatusCode, Json<ApiResponse<menu_item::Model>>), ServiceError> {
    if !auth_user.has_permission(perm::MENU_MANAGE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to manage the menu".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let item = state.services.menu.create_item(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(item))))
}

/// Update a menu item
#[utoipa::path(
    put,
    path = "/api/v1/menu/items/{id}",
    params(("id" = Uuid, Path, description = "Menu item id"), TenantQuery),
    request_body = UpdateMenuItemRequest,
    responses(
        (status = 200, description = "Menu item updated", body = ApiResponse<menu_item::Model>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
    Json(request): Json<UpdateMenuItemRequest>,
) -> Result<Json<ApiResponse<menu_item::Model>>, ServiceError> {
    if !auth_user.has_permission(perm::MENU_MANAGE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to manage the menu".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let item = state.services.menu.update_item(&ctx, id, request).await?;
    Ok(Json(ApiResponse::success(item)))
}

/// Delete a menu item and its recipe
#[utoipa::path(
    delete,
    path = "/api/v1/menu/items/{id}",
    params(("id" = Uuid, Path, description = "Menu item id"), TenantQuery),
    responses(
        (status = 200, description = "Menu item deleted", body = ApiResponse<serde_json::Value>),
        (status = 409, description = "Item appears on existing orders", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, ServiceError> {
    if !auth_user.has_permission(perm::MENU_MANAGE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to manage the menu".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    state.services.menu.delete_item(&ctx, id).await?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": id }),
    )))
}

/// List a menu item's ingredient recipe
#[utoipa::path(
    get,
    path = "/api/v1/menu/items/{id}/ingredients",
    params(("id" = Uuid, Path, description = "Menu item id"), TenantQuery),
    responses(
        (status = 200, description = "Ingredients retrieved", body = ApiResponse<Vec<menu_ingredient::Model>>),
    ),
    security(("Bearer" = []))
)]
pub async fn list_ingredients(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<menu_ingredient::Model>>>, ServiceError> {
    if !auth_user.has_permission(perm::MENU_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to read the menu".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let ingredients = state.services.menu.list_ingredients(&ctx, id).await?;
    Ok(Json(ApiResponse::success(ingredients)))
}

/// Replace a menu item's ingredient recipe
#[utoipa::path(
    put,
    path = "/api/v1/menu/items/{id}/ingredients",
    params(("id" = Uuid, Path, description = "Menu item id"), TenantQuery),
    request_body = Vec<IngredientInput>,
    responses(
        (status = 200, description = "Recipe replaced", body = ApiResponse<Vec<menu_ingredient::Model>>),
        (status = 400, description = "Invalid recipe", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn set_ingredients(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
    Json(ingredients): Json<Vec<IngredientInput>>,
) -> Result<Json<ApiResponse<Vec<menu_ingredient::Model>>>, ServiceError> {
    if !auth_user.has_permission(perm::MENU_MANAGE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to manage the menu".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let saved = state
        .services
        .menu
        .set_ingredients(&ctx, id, ingredients)
        .await?;
    Ok(Json(ApiResponse::success(saved)))
}
