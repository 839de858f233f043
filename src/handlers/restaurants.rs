use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::auth::{consts as perm, AuthUser};
use crate::entities::{restaurant, user};
use crate::errors::ServiceError;
use crate::handlers::{resolve_tenant, TenantQuery};
use crate::services::restaurants::{
    CreateStaffUserRequest, RegisterRestaurantRequest, RegisteredRestaurant,
};
use crate::{ApiResponse, AppState, ListQuery, PaginatedResponse};

/// Register a restaurant with its owner account (platform admins only)
#[utoipa::path(
    post,
    path = "/api/v1/restaurants",
    request_body = RegisterRestaurantRequest,
    responses(
        (status = 201, description = "Restaurant registered", body = ApiResponse<RegisteredRestaurant>),
        (status = 409, description = "Owner email already in use", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn register_restaurant(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<RegisterRestaurantRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegisteredRestaurant>>), ServiceError> {
    if !auth_user.has_permission(perm::RESTAURANTS_MANAGE) {
        return Err(ServiceError::Forbidden(
            "Only platform administrators can register restaurants".to_string(),
        ));
    }

    let registered = state.services.restaurants.register(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(registered))))
}

/// List all restaurants (platform admins only)
#[utoipa::path(
    get,
    path = "/api/v1/restaurants",
    params(ListQuery),
    responses(
        (status = 200, description = "Restaurants retrieved", body = ApiResponse<PaginatedResponse<restaurant::Model>>),
    ),
    security(("Bearer" = []))
)]
pub async fn list_restaurants(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<PaginatedResponse<restaurant::Model>>>, ServiceError> {
    if !auth_user.has_permission(perm::RESTAURANTS_MANAGE) {
        return Err(ServiceError::Forbidden(
            "Only platform administrators can list restaurants".to_string(),
        ));
    }

    let (restaurants, total) = state
        .services
        .restaurants
        .list(query.page, query.limit)
        .await?;
    let total_pages = total.div_ceil(query.limit.max(1));

    Ok(Json(ApiResponse::success(PaginatedResponse {
        items: restaurants,
        total,
        page: query.page,
        limit: query.limit,
        total_pages,
    })))
}

/// Get one restaurant
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{id}",
    params(("id" = Uuid, Path, description = "Restaurant id")),
    responses(
        (status = 200, description = "Restaurant retrieved", body = ApiResponse<restaurant::Model>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<restaurant::Model>>, ServiceError> {
    // Admins may inspect any tenant; everyone else only their own.
    if !auth_user.is_admin() && auth_user.restaurant_id() != Some(id) {
        return Err(ServiceError::Forbidden(
            "Cannot inspect another restaurant".to_string(),
        ));
    }

    let restaurant = state.services.restaurants.get(id).await?;
    Ok(Json(ApiResponse::success(restaurant)))
}

/// Create a manager, staff or kitchen account for a tenant
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/users",
    params(TenantQuery),
    request_body = CreateStaffUserRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<user::Model>),
        (status = 409, description = "Email already in use", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_staff_user(
    State(state): State<AppState>,
    Query(filter): Query<TenantQuery>,
    auth_user: AuthUser,
    Json(request): Json<CreateStaffUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<user::Model>>), ServiceError> {
    if !auth_user.has_permission(perm::USERS_CREATE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to create users".to_string(),
        ));
    }
    let ctx = resolve_tenant(&auth_user, filter.restaurant_id)?;

    let created = state
        .services
        .restaurants
        .create_staff_user(&ctx, request)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}
