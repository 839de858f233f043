//! HTTP handlers: request validation, permission checks, tenant scoping.
//! Business rules live in the services; handlers stay thin.

pub mod inventory;
pub mod menu;
pub mod orders;
pub mod restaurants;
pub mod settings;
pub mod tables;

use crate::auth::{AuthService, AuthUser};
use crate::config::PosDefaults;
use crate::errors::ServiceError;
use crate::events::EventSender;
use crate::services::{self, RequestCtx};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::ValidationErrors;

/// Aggregated services handed to HTTP handlers via `AppState`.
#[derive(Clone)]
pub struct AppServices {
    pub inventory: services::inventory::InventoryService,
    pub menu: services::menu::MenuService,
    pub orders: services::orders::OrderService,
    pub tables: services::tables::TableService,
    pub restaurants: services::restaurants::RestaurantService,
    pub settings: services::settings::SettingsService,
    pub auth: Arc<AuthService>,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: EventSender,
        auth: Arc<AuthService>,
        pos_defaults: PosDefaults,
    ) -> Self {
        let settings = services::settings::SettingsService::new(db.clone(), pos_defaults);
        Self {
            inventory: services::inventory::InventoryService::new(
                db.clone(),
                event_sender.clone(),
            ),
            menu: services::menu::MenuService::new(db.clone()),
            orders: services::orders::OrderService::new(
                db.clone(),
                event_sender.clone(),
                settings.clone(),
            ),
            tables: services::tables::TableService::new(db.clone(), event_sender.clone()),
            restaurants: services::restaurants::RestaurantService::new(
                db,
                event_sender,
                settings.clone(),
            ),
            settings,
            auth,
        }
    }
}

/// Optional tenant override, honored for platform administrators only.
#[derive(Debug, Deserialize, IntoParams)]
pub struct TenantQuery {
    pub restaurant_id: Option<Uuid>,
}

/// Build the explicit request context from the authenticated user.
///
/// Non-admin sessions are pinned to their own tenant; an admin must name
/// the tenant it is acting on.
pub fn resolve_tenant(
    auth: &AuthUser,
    explicit: Option<Uuid>,
) -> Result<RequestCtx, ServiceError> {
    let user_id = Uuid::parse_str(&auth.user_id)
        .map_err(|_| ServiceError::Unauthorized("Malformed user id in token".to_string()))?;

    let restaurant_id = if auth.is_admin() {
        explicit.ok_or_else(|| {
            ServiceError::ValidationError(
                "Administrators must pass restaurant_id to act on a tenant".to_string(),
            )
        })?
    } else {
        let own = auth.restaurant_id().ok_or_else(|| {
            ServiceError::Forbidden("No restaurant associated with this account".to_string())
        })?;
        if let Some(requested) = explicit {
            if requested != own {
                return Err(ServiceError::Forbidden(
                    "Cannot act on another restaurant".to_string(),
                ));
            }
        }
        own
    };

    Ok(RequestCtx {
        restaurant_id,
        user_id,
    })
}

/// Flatten validator errors into user-facing strings.
pub fn flatten_validation_errors(validation_errors: &ValidationErrors) -> Vec<String> {
    validation_errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            let field = *field;
            errors.iter().map(move |error| {
                format!(
                    "{}: {}",
                    field,
                    error.message.as_ref().unwrap_or(&"Invalid value".into())
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{permissions_for_role, UserRole};
    use assert_matches::assert_matches;

    fn auth_user(role: UserRole, restaurant_id: Option<Uuid>) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4().to_string(),
            name: None,
            email: None,
            role: role.as_str().to_string(),
            permissions: permissions_for_role(role)
                .into_iter()
                .map(String::from)
                .collect(),
            restaurant_id: restaurant_id.map(|id| id.to_string()),
            token_id: "jti".to_string(),
        }
    }

    #[test]
    fn staff_is_pinned_to_its_own_tenant() {
        let tenant = Uuid::new_v4();
        let auth = auth_user(UserRole::Staff, Some(tenant));

        let ctx = resolve_tenant(&auth, None).unwrap();
        assert_eq!(ctx.restaurant_id, tenant);

        // Naming its own tenant explicitly is fine.
        let ctx = resolve_tenant(&auth, Some(tenant)).unwrap();
        assert_eq!(ctx.restaurant_id, tenant);

        // Any other tenant is rejected.
        assert_matches!(
            resolve_tenant(&auth, Some(Uuid::new_v4())),
            Err(ServiceError::Forbidden(_))
        );
    }

    #[test]
    fn admin_must_name_a_tenant() {
        let auth = auth_user(UserRole::Admin, None);
        assert_matches!(
            resolve_tenant(&auth, None),
            Err(ServiceError::ValidationError(_))
        );

        let tenant = Uuid::new_v4();
        let ctx = resolve_tenant(&auth, Some(tenant)).unwrap();
        assert_eq!(ctx.restaurant_id, tenant);
    }

    #[test]
    fn tenantless_non_admin_is_rejected() {
        let auth = auth_user(UserRole::Owner, None);
        assert_matches!(resolve_tenant(&auth, None), Err(ServiceError::Forbidden(_)));
    }
}
