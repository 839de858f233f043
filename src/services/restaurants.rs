use crate::auth::{hash_password, UserRole};
use crate::entities::restaurant::{self, Entity as RestaurantEntity};
use crate::entities::user::{self, Entity as UserEntity};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::settings::SettingsService;
use crate::services::RequestCtx;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RegisterRestaurantRequest {
    #[validate(length(min = 1, max = 120, message = "Restaurant name must be 1-120 characters"))]
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "Restaurant email must be valid"))]
    pub email: Option<String>,

    #[validate(length(min = 1, max = 120, message = "Owner name must be 1-120 characters"))]
    pub owner_name: String,
    #[validate(email(message = "Owner email must be valid"))]
    pub owner_email: String,
    #[validate(length(min = 8, message = "Owner password must be at least 8 characters"))]
    pub owner_password: String,
}

/// Owner- and manager-created accounts for on-premise roles.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateStaffUserRequest {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: String,
    #[validate(email(message = "Email must be valid"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    /// One of: manager, staff, kitchen
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisteredRestaurant {
    pub restaurant: restaurant::Model,
    pub owner: user::Model,
}

/// Service for tenant registration and tenant-scoped user management.
#[derive(Clone)]
pub struct RestaurantService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
    settings: SettingsService,
}

impl RestaurantService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: EventSender,
        settings: SettingsService,
    ) -> Self {
        Self {
            db,
            event_sender,
            settings,
        }
    }

    /// Register a tenant: restaurant, owner account, and default POS
    /// settings in one transaction.
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn register(
        &self,
        request: RegisterRestaurantRequest,
    ) -> Result<RegisteredRestaurant, ServiceError> {
        request.validate()?;

        let db = &*self.db;
        let owner_email = request.owner_email.trim().to_ascii_lowercase();

        let email_taken = UserEntity::find()
            .filter(user::Column::Email.eq(owner_email.clone()))
            .count(db)
            .await?;
        if email_taken > 0 {
            return Err(ServiceError::Conflict(format!(
                "A user with email {owner_email} already exists"
            )));
        }

        let password_hash = hash_password(&request.owner_password)?;

        let txn = db.begin().await?;

        let restaurant_id = Uuid::new_v4();
        let restaurant = restaurant::ActiveModel {
            id: Set(restaurant_id),
            name: Set(request.name),
            address: Set(request.address),
            phone: Set(request.phone),
            email: Set(request.email),
            active: Set(true),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;

        let owner = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            restaurant_id: Set(Some(restaurant_id)),
            name: Set(request.owner_name),
            email: Set(owner_email),
            password_hash: Set(password_hash),
            role: Set(UserRole::Owner.as_str().to_string()),
            active: Set(true),
            last_login: Set(None),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&txn)
        .await?;

        self.settings
            .initial_row(restaurant_id)
            .insert(&txn)
            .await?;

        txn.commit().await?;

        info!(restaurant_id = %restaurant_id, "Restaurant registered");
        if let Err(e) = self
            .event_sender
            .send(Event::RestaurantRegistered(restaurant_id))
            .await
        {
            warn!(error = %e, "Failed to publish registration event");
        }

        Ok(RegisteredRestaurant { restaurant, owner })
    }

    /// Create a manager/staff/kitchen account inside the caller's tenant.
    #[instrument(skip(self, request), fields(restaurant_id = %ctx.restaurant_id, role = %request.role))]
    pub async fn create_staff_user(
        &self,
        ctx: &RequestCtx,
        request: CreateStaffUserRequest,
    ) -> Result<user::Model, ServiceError> {
        request.validate()?;

        let role = UserRole::from_str(&request.role).ok_or_else(|| {
            ServiceError::ValidationError(format!("Unknown role: {}", request.role))
        })?;
        if !matches!(role, UserRole::Manager | UserRole::Staff | UserRole::Kitchen) {
            return Err(ServiceError::ValidationError(
                "Only manager, staff and kitchen accounts can be created here".to_string(),
            ));
        }

        let db = &*self.db;
        let email = request.email.trim().to_ascii_lowercase();

        let email_taken = UserEntity::find()
            .filter(user::Column::Email.eq(email.clone()))
            .count(db)
            .await?;
        if email_taken > 0 {
            return Err(ServiceError::Conflict(format!(
                "A user with email {email} already exists"
            )));
        }

        let password_hash = hash_password(&request.password)?;

        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            restaurant_id: Set(Some(ctx.restaurant_id)),
            name: Set(request.name),
            email: Set(email),
            password_hash: Set(password_hash),
            role: Set(role.as_str().to_string()),
            active: Set(true),
            last_login: Set(None),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(db)
        .await?;

        Ok(model)
    }

    /// Platform-wide restaurant listing (admin only at the handler layer).
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<restaurant::Model>, u64), ServiceError> {
        let paginator = RestaurantEntity::find()
            .order_by_asc(restaurant::Column::Name)
            .paginate(&*self.db, limit.max(1));
        let total = paginator.num_items().await?;
        let restaurants = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((restaurants, total))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<restaurant::Model, ServiceError> {
        RestaurantEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Restaurant {id} not found")))
    }
}
