use crate::entities::inventory_item::{self, Entity as InventoryItemEntity};
use crate::entities::menu_category::{self, Entity as MenuCategoryEntity};
use crate::entities::menu_ingredient::{self, Entity as MenuIngredientEntity};
use crate::entities::menu_item::{self, Entity as MenuItemEntity};
use crate::entities::order_item::{self, Entity as OrderItemEntity};
use crate::errors::ServiceError;
use crate::services::RequestCtx;
use crate::units::Unit;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateMenuCategoryRequest {
    #[validate(length(min = 1, max = 80, message = "Category name must be 1-80 characters"))]
    pub name: String,
    pub display_order: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateMenuItemRequest {
    #[validate(length(min = 1, max = 120, message = "Menu item name must be 1-120 characters"))]
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub price: Decimal,
    pub available: Option<bool>,
    #[validate(range(min = 0, max = 240, message = "Preparation time must be 0-240 minutes"))]
    pub preparation_time_minutes: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateMenuItemRequest {
    #[validate(length(min = 1, max = 120, message = "Menu item name must be 1-120 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub price: Option<Decimal>,
    pub available: Option<bool>,
    #[validate(range(min = 0, max = 240, message = "Preparation time must be 0-240 minutes"))]
    pub preparation_time_minutes: Option<i32>,
}

/// One recipe line when replacing a menu item's ingredient list.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct IngredientInput {
    pub inventory_item_id: Uuid,
    pub quantity: Decimal,
    /// Unit symbol the recipe is written in; converted to the stock unit
    /// at deduction time.
    pub unit: String,
    #[serde(default)]
    pub optional: bool,
}

/// Service for menu categories, items, and their ingredient recipes.
#[derive(Clone)]
pub struct MenuService {
    db: Arc<DatabaseConnection>,
}

impl MenuService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_categories(
        &self,
        ctx: &RequestCtx,
    ) -> Result<Vec<menu_category::Model>, ServiceError> {
        let categories = MenuCategoryEntity::find()
            .filter(menu_category::Column::RestaurantId.eq(ctx.restaurant_id))
            .order_by_asc(menu_category::Column::DisplayOrder)
            .order_by_asc(menu_category::Column::Name)
            .all(&*self.db)
            .await?;
        Ok(categories)
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_category(
        &self,
        ctx: &RequestCtx,
        request: CreateMenuCategoryRequest,
    ) -> Result<menu_category::Model, ServiceError> {
        request.validate()?;

        let model = menu_category::ActiveModel {
            id: Set(Uuid::new_v4()),
            restaurant_id: Set(ctx.restaurant_id),
            name: Set(request.name),
            display_order: Set(request.display_order.unwrap_or(0)),
            active: Set(true),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn list_items(
        &self,
        ctx: &RequestCtx,
        page: u64,
        limit: u64,
        category_id: Option<Uuid>,
        available_only: bool,
    ) -> Result<(Vec<menu_item::Model>, u64), ServiceError> {
        let mut query = MenuItemEntity::find()
            .filter(menu_item::Column::RestaurantId.eq(ctx.restaurant_id))
            .order_by_asc(menu_item::Column::Name);

        if let Some(category_id) = category_id {
            query = query.filter(menu_item::Column::CategoryId.eq(category_id));
        }
        if available_only {
            query = query.filter(menu_item::Column::Available.eq(true));
        }

        let paginator = query.paginate(&*self.db, limit.max(1));
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((items, total))
    }

    #[instrument(skip(self))]
    pub async fn get_item(
        &self,
        ctx: &RequestCtx,
        id: Uuid,
    ) -> Result<menu_item::Model, ServiceError> {
        MenuItemEntity::find_by_id(id)
            .filter(menu_item::Column::RestaurantId.eq(ctx.restaurant_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Menu item {id} not found")))
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_item(
        &self,
        ctx: &RequestCtx,
        request: CreateMenuItemRequest,
    ) -> Result<menu_item::Model, ServiceError> {
        request.validate()?;
        if request.price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Price must be non-negative".to_string(),
            ));
        }

        if let Some(category_id) = request.category_id {
            self.ensure_category(ctx, category_id).await?;
        }

        let model = menu_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            restaurant_id: Set(ctx.restaurant_id),
            category_id: Set(request.category_id),
            name: Set(request.name),
            description: Set(request.description),
            price: Set(request.price),
            available: Set(request.available.unwrap_or(true)),
            preparation_time_minutes: Set(request.preparation_time_minutes.unwrap_or(15)),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.db)
        .await?;

        Ok(model)
    }

    #[instrument(skip(self, request), fields(item_id = %id))]
    pub async fn update_item(
        &self,
        ctx: &RequestCtx,
        id: Uuid,
        request: UpdateMenuItemRequest,
    ) -> Result<menu_item::Model, ServiceError> {
        request.validate()?;
        if let Some(price) = request.price {
            if price < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Price must be non-negative".to_string(),
                ));
            }
        }
        if let Some(category_id) = request.category_id {
            self.ensure_category(ctx, category_id).await?;
        }

        let existing = self.get_item(ctx, id).await?;
        let mut active: menu_item::ActiveModel = existing.into();

        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(category_id) = request.category_id {
            active.category_id = Set(Some(category_id));
        }
        if let Some(price) = request.price {
            active.price = Set(price);
        }
        if let Some(available) = request.available {
            active.available = Set(available);
        }
        if let Some(minutes) = request.preparation_time_minutes {
            active.preparation_time_minutes = Set(minutes);
        }

        let model = active.update(&*self.db).await?;
        Ok(model)
    }

    /// Delete a menu item and its recipe. Refused once the item appears on
    /// any order, since order lines keep pointing at it.
    #[instrument(skip(self), fields(item_id = %id))]
    pub async fn delete_item(&self, ctx: &RequestCtx, id: Uuid) -> Result<(), ServiceError> {
        let item = self.get_item(ctx, id).await?;

        let referenced = OrderItemEntity::find()
            .filter(order_item::Column::MenuItemId.eq(id))
            .count(&*self.db)
            .await?;
        if referenced > 0 {
            return Err(ServiceError::Conflict(format!(
                "Menu item appears on {referenced} order line(s); mark it unavailable instead"
            )));
        }

        let txn = self.db.begin().await?;
        MenuIngredientEntity::delete_many()
            .filter(menu_ingredient::Column::MenuItemId.eq(item.id))
            .exec(&txn)
            .await?;
        MenuItemEntity::delete_by_id(item.id).exec(&txn).await?;
        txn.commit().await?;

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_ingredients(
        &self,
        ctx: &RequestCtx,
        menu_item_id: Uuid,
    ) -> Result<Vec<menu_ingredient::Model>, ServiceError> {
        // Tenant check rides on the menu item lookup.
        self.get_item(ctx, menu_item_id).await?;

        let ingredients = MenuIngredientEntity::find()
            .filter(menu_ingredient::Column::MenuItemId.eq(menu_item_id))
            .all(&*self.db)
            .await?;
        Ok(ingredients)
    }

    /// Replace a menu item's recipe wholesale, validating every referenced
    /// inventory item belongs to the tenant.
    #[instrument(skip(self, ingredients), fields(item_id = %menu_item_id, count = ingredients.len()))]
    pub async fn set_ingredients(
        &self,
        ctx: &RequestCtx,
        menu_item_id: Uuid,
        ingredients: Vec<IngredientInput>,
    ) -> Result<Vec<menu_ingredient::Model>, ServiceError> {
        self.get_item(ctx, menu_item_id).await?;

        for input in &ingredients {
            input.validate()?;
            if input.quantity <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Ingredient quantities must be positive".to_string(),
                ));
            }
            Unit::parse(&input.unit).ok_or_else(|| {
                ServiceError::ValidationError(format!("Unknown unit: {}", input.unit))
            })?;

            let exists = InventoryItemEntity::find_by_id(input.inventory_item_id)
                .filter(inventory_item::Column::RestaurantId.eq(ctx.restaurant_id))
                .count(&*self.db)
                .await?;
            if exists == 0 {
                return Err(ServiceError::NotFound(format!(
                    "Inventory item {} not found",
                    input.inventory_item_id
                )));
            }
        }

        let txn = self.db.begin().await?;

        MenuIngredientEntity::delete_many()
            .filter(menu_ingredient::Column::MenuItemId.eq(menu_item_id))
            .exec(&txn)
            .await?;

        let mut saved = Vec::with_capacity(ingredients.len());
        for input in ingredients {
            let model = menu_ingredient::ActiveModel {
                id: Set(Uuid::new_v4()),
                menu_item_id: Set(menu_item_id),
                inventory_item_id: Set(input.inventory_item_id),
                quantity: Set(input.quantity),
                unit: Set(input.unit),
                optional: Set(input.optional),
            }
            .insert(&txn)
            .await?;
            saved.push(model);
        }

        txn.commit().await?;
        Ok(saved)
    }

    async fn ensure_category(&self, ctx: &RequestCtx, category_id: Uuid) -> Result<(), ServiceError> {
        let exists = MenuCategoryEntity::find_by_id(category_id)
            .filter(menu_category::Column::RestaurantId.eq(ctx.restaurant_id))
            .count(&*self.db)
            .await?;
        if exists == 0 {
            return Err(ServiceError::NotFound(format!(
                "Menu category {category_id} not found"
            )));
        }
        Ok(())
    }
}
