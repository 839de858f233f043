use crate::entities::inventory_item::{self, Entity as InventoryItemEntity, StockStatus};
use crate::entities::inventory_transaction::{
    self, Entity as InventoryTransactionEntity, TransactionReason,
};
use crate::entities::menu_ingredient::{self, Entity as MenuIngredientEntity};
use crate::entities::waste_log;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::RequestCtx;
use crate::units::Unit;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateInventoryItemRequest {
    #[validate(length(min = 1, max = 120, message = "Item name must be 1-120 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 80, message = "Category must be 1-80 characters"))]
    pub category: String,

    pub current_stock: Decimal,
    pub min_stock: Decimal,
    pub max_stock: Decimal,

    /// Unit symbol, e.g. "kg" or "pcs"
    pub unit: String,

    pub cost_per_unit: Decimal,
    pub supplier_id: Option<Uuid>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub location: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateInventoryItemRequest {
    #[validate(length(min = 1, max = 120, message = "Item name must be 1-120 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 80, message = "Category must be 1-80 characters"))]
    pub category: Option<String>,
    pub current_stock: Option<Decimal>,
    pub min_stock: Option<Decimal>,
    pub max_stock: Option<Decimal>,
    pub unit: Option<String>,
    pub cost_per_unit: Option<Decimal>,
    pub supplier_id: Option<Uuid>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub location: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RecordTransactionRequest {
    pub inventory_item_id: Uuid,
    pub order_id: Option<Uuid>,
    /// Signed delta in the item's unit; negative values deduct stock.
    pub quantity: Decimal,
    /// One of: order-use, restock, waste, adjustment, transfer, expired
    pub reason: String,
    pub notes: Option<String>,
}

/// Service for managing inventory items and their append-only transaction
/// ledger. Every stock write pairs the ledger insert with the item update
/// inside one database transaction, so the ledger always reconciles with
/// `current_stock`.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl InventoryService {
    /// Creates a new inventory service instance
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    fn parse_unit(raw: &str) -> Result<Unit, ServiceError> {
        Unit::parse(raw)
            .ok_or_else(|| ServiceError::ValidationError(format!("Unknown unit: {raw}")))
    }

    /// Lists inventory items for a tenant with pagination and optional
    /// name search / status filter.
    #[instrument(skip(self))]
    pub async fn list_items(
        &self,
        ctx: &RequestCtx,
        page: u64,
        limit: u64,
        search: Option<String>,
        status: Option<String>,
    ) -> Result<(Vec<inventory_item::Model>, u64), ServiceError> {
        let db = &*self.db;

        let mut query = InventoryItemEntity::find()
            .filter(inventory_item::Column::RestaurantId.eq(ctx.restaurant_id))
            .order_by_asc(inventory_item::Column::Name);

        if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
            query = query.filter(inventory_item::Column::Name.contains(search.trim()));
        }
        if let Some(status) = status {
            let status = StockStatus::from_str(&status).ok_or_else(|| {
                ServiceError::ValidationError(format!("Unknown stock status: {status}"))
            })?;
            query = query.filter(inventory_item::Column::Status.eq(status.as_str()));
        }

        let paginator = query.paginate(db, limit.max(1));
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((items, total))
    }

    #[instrument(skip(self))]
    pub async fn get_item(
        &self,
        ctx: &RequestCtx,
        id: Uuid,
    ) -> Result<inventory_item::Model, ServiceError> {
        let db = &*self.db;
        InventoryItemEntity::find_by_id(id)
            .filter(inventory_item::Column::RestaurantId.eq(ctx.restaurant_id))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Inventory item {id} not found")))
    }

    /// Items at or below their minimum stock level (or depleted/expired).
    #[instrument(skip(self))]
    pub async fn low_stock_items(
        &self,
        ctx: &RequestCtx,
    ) -> Result<Vec<inventory_item::Model>, ServiceError> {
        let db = &*self.db;
        let items = InventoryItemEntity::find()
            .filter(inventory_item::Column::RestaurantId.eq(ctx.restaurant_id))
            .filter(
                inventory_item::Column::Status.is_in([
                    StockStatus::LowStock.as_str(),
                    StockStatus::OutOfStock.as_str(),
                ]),
            )
            .order_by_asc(inventory_item::Column::Name)
            .all(db)
            .await?;
        Ok(items)
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_item(
        &self,
        ctx: &RequestCtx,
        request: CreateInventoryItemRequest,
    ) -> Result<inventory_item::Model, ServiceError> {
        request.validate()?;
        let unit = Self::parse_unit(&request.unit)?;

        if request.min_stock < Decimal::ZERO || request.max_stock < request.min_stock {
            return Err(ServiceError::ValidationError(
                "min_stock must be non-negative and max_stock must be at least min_stock"
                    .to_string(),
            ));
        }

        let status = StockStatus::classify(
            request.current_stock,
            request.min_stock,
            request.expiry_date,
            Utc::now().date_naive(),
        );

        let model = inventory_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            restaurant_id: Set(ctx.restaurant_id),
            name: Set(request.name),
            category: Set(request.category),
            current_stock: Set(request.current_stock),
            min_stock: Set(request.min_stock),
            max_stock: Set(request.max_stock),
            unit: Set(unit.as_str().to_string()),
            cost_per_unit: Set(request.cost_per_unit),
            supplier_id: Set(request.supplier_id),
            sku: Set(request.sku),
            barcode: Set(request.barcode),
            location: Set(request.location),
            expiry_date: Set(request.expiry_date),
            status: Set(status.as_str().to_string()),
            last_restocked: Set(None),
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
        request: UpdateInventoryItemRequest,
    ) -> Result<inventory_item::Model, ServiceError> {
        request.validate()?;

        let existing = self.get_item(ctx, id).await?;

        let unit = match &request.unit {
            Some(raw) => Some(Self::parse_unit(raw)?),
            None => None,
        };

        let current_stock = request.current_stock.unwrap_or(existing.current_stock);
        let min_stock = request.min_stock.unwrap_or(existing.min_stock);
        let max_stock = request.max_stock.unwrap_or(existing.max_stock);
        let expiry_date = request.expiry_date.or(existing.expiry_date);

        if min_stock < Decimal::ZERO || max_stock < min_stock {
            return Err(ServiceError::ValidationError(
                "min_stock must be non-negative and max_stock must be at least min_stock"
                    .to_string(),
            ));
        }

        let status =
            StockStatus::classify(current_stock, min_stock, expiry_date, Utc::now().date_naive());

        let mut active: inventory_item::ActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(category) = request.category {
            active.category = Set(category);
        }
        active.current_stock = Set(current_stock);
        active.min_stock = Set(min_stock);
        active.max_stock = Set(max_stock);
        if let Some(unit) = unit {
            active.unit = Set(unit.as_str().to_string());
        }
        if let Some(cost) = request.cost_per_unit {
            active.cost_per_unit = Set(cost);
        }
        if let Some(supplier) = request.supplier_id {
            active.supplier_id = Set(Some(supplier));
        }
        if let Some(sku) = request.sku {
            active.sku = Set(Some(sku));
        }
        if let Some(barcode) = request.barcode {
            active.barcode = Set(Some(barcode));
        }
        if let Some(location) = request.location {
            active.location = Set(Some(location));
        }
        if let Some(expiry) = request.expiry_date {
            active.expiry_date = Set(Some(expiry));
        }
        active.status = Set(status.as_str().to_string());

        let model = active.update(&*self.db).await?;
        Ok(model)
    }

    /// Delete an item, refused while any menu recipe still references it.
    #[instrument(skip(self), fields(item_id = %id))]
    pub async fn delete_item(&self, ctx: &RequestCtx, id: Uuid) -> Result<(), ServiceError> {
        let item = self.get_item(ctx, id).await?;

        let references = MenuIngredientEntity::find()
            .filter(menu_ingredient::Column::InventoryItemId.eq(id))
            .count(&*self.db)
            .await?;
        if references > 0 {
            return Err(ServiceError::Conflict(format!(
                "Inventory item is used by {references} menu item(s); remove it from those recipes first"
            )));
        }

        InventoryItemEntity::delete_by_id(item.id)
            .exec(&*self.db)
            .await?;
        Ok(())
    }

    /// Record a stock movement: ledger insert plus stock/status update in
    /// one transaction, with a waste-log side record for waste write-offs.
    #[instrument(skip(self, request), fields(item_id = %request.inventory_item_id, reason = %request.reason))]
    pub async fn record_transaction(
        &self,
        ctx: &RequestCtx,
        request: RecordTransactionRequest,
    ) -> Result<inventory_transaction::Model, ServiceError> {
        request.validate()?;
        let reason = TransactionReason::from_str(&request.reason).ok_or_else(|| {
            ServiceError::ValidationError(format!("Unknown transaction reason: {}", request.reason))
        })?;
        if request.quantity == Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Transaction quantity must be non-zero".to_string(),
            ));
        }

        let db = &*self.db;
        let txn = db.begin().await?;

        let item = InventoryItemEntity::find_by_id(request.inventory_item_id)
            .filter(inventory_item::Column::RestaurantId.eq(ctx.restaurant_id))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Inventory item {} not found",
                    request.inventory_item_id
                ))
            })?;

        let (ledger_row, updated_item) = Self::apply_transaction(
            &txn,
            ctx,
            item,
            request.order_id,
            request.quantity,
            reason,
            request.notes,
        )
        .await?;

        txn.commit().await?;

        self.publish_stock_events(&ledger_row, &updated_item, reason)
            .await;

        Ok(ledger_row)
    }

    /// The ledger in paginated form, optionally narrowed to one item.
    #[instrument(skip(self))]
    pub async fn list_transactions(
        &self,
        ctx: &RequestCtx,
        inventory_item_id: Option<Uuid>,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<inventory_transaction::Model>, u64), ServiceError> {
        let db = &*self.db;

        let mut query = InventoryTransactionEntity::find()
            .filter(inventory_transaction::Column::RestaurantId.eq(ctx.restaurant_id))
            .order_by_desc(inventory_transaction::Column::CreatedAt);
        if let Some(item_id) = inventory_item_id {
            query = query.filter(inventory_transaction::Column::InventoryItemId.eq(item_id));
        }

        let paginator = query.paginate(db, limit.max(1));
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((rows, total))
    }

    /// Core stock mutation, usable inside a larger transaction (order
    /// creation and voiding call this per ingredient). Inserts the ledger
    /// row, moves `current_stock`, recomputes the derived status, and logs
    /// waste write-offs.
    pub(crate) async fn apply_transaction<C: ConnectionTrait>(
        conn: &C,
        ctx: &RequestCtx,
        item: inventory_item::Model,
        order_id: Option<Uuid>,
        quantity: Decimal,
        reason: TransactionReason,
        notes: Option<String>,
    ) -> Result<(inventory_transaction::Model, inventory_item::Model), ServiceError> {
        let ledger_row = inventory_transaction::ActiveModel {
            id: Set(Uuid::new_v4()),
            restaurant_id: Set(ctx.restaurant_id),
            inventory_item_id: Set(item.id),
            order_id: Set(order_id),
            quantity: Set(quantity),
            reason: Set(reason.as_str().to_string()),
            notes: Set(notes.clone()),
            created_by: Set(ctx.user_id),
            created_at: Set(Utc::now()),
        }
        .insert(conn)
        .await?;

        if reason == TransactionReason::Waste && quantity < Decimal::ZERO {
            waste_log::ActiveModel {
                id: Set(Uuid::new_v4()),
                restaurant_id: Set(ctx.restaurant_id),
                inventory_item_id: Set(item.id),
                quantity: Set(quantity.abs()),
                reason: Set(notes.unwrap_or_else(|| "Waste".to_string())),
                cost: Set(quantity.abs() * item.cost_per_unit),
                reported_by: Set(ctx.user_id),
                created_at: Set(Utc::now()),
            }
            .insert(conn)
            .await?;
        }

        let new_stock = item.current_stock + quantity;
        let status = StockStatus::classify(
            new_stock,
            item.min_stock,
            item.expiry_date,
            Utc::now().date_naive(),
        );
        let restocked = reason == TransactionReason::Restock && quantity > Decimal::ZERO;

        let mut active: inventory_item::ActiveModel = item.into();
        active.current_stock = Set(new_stock);
        active.status = Set(status.as_str().to_string());
        if restocked {
            active.last_restocked = Set(Some(Utc::now()));
        }
        let updated_item = active.update(conn).await?;

        Ok((ledger_row, updated_item))
    }

    /// Post-commit event fan-out for a recorded transaction.
    async fn publish_stock_events(
        &self,
        ledger_row: &inventory_transaction::Model,
        item: &inventory_item::Model,
        reason: TransactionReason,
    ) {
        let events = stock_events(ledger_row, item, reason);
        for event in events {
            if let Err(e) = self.event_sender.send(event).await {
                warn!(error = %e, "Failed to publish inventory event");
            }
        }
    }
}

/// Events describing one applied transaction, including the low-stock
/// alert when the item landed at or below its minimum.
pub(crate) fn stock_events(
    ledger_row: &inventory_transaction::Model,
    item: &inventory_item::Model,
    reason: TransactionReason,
) -> Vec<Event> {
    let mut events = vec![Event::InventoryTransactionRecorded {
        inventory_item_id: item.id,
        order_id: ledger_row.order_id,
        reason: reason.as_str().to_string(),
        quantity: ledger_row.quantity,
    }];

    if reason == TransactionReason::Waste && ledger_row.quantity < Decimal::ZERO {
        events.push(Event::WasteRecorded {
            inventory_item_id: item.id,
            quantity: ledger_row.quantity.abs(),
            cost: ledger_row.quantity.abs() * item.cost_per_unit,
        });
    }

    match StockStatus::from_str(&item.status) {
        Some(StockStatus::LowStock) | Some(StockStatus::OutOfStock) => {
            events.push(Event::LowStockDetected {
                inventory_item_id: item.id,
                current_stock: item.current_stock,
                min_stock: item.min_stock,
            });
        }
        _ => {}
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item_with(current: Decimal, min: Decimal, status: StockStatus) -> inventory_item::Model {
        inventory_item::Model {
            id: Uuid::new_v4(),
            restaurant_id: Uuid::new_v4(),
            name: "Tomatoes".to_string(),
            category: "Produce".to_string(),
            current_stock: current,
            min_stock: min,
            max_stock: dec!(100),
            unit: "kg".to_string(),
            cost_per_unit: dec!(2.50),
            supplier_id: None,
            sku: None,
            barcode: None,
            location: None,
            expiry_date: None,
            status: status.as_str().to_string(),
            last_restocked: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn ledger_row_for(item: &inventory_item::Model, quantity: Decimal) -> inventory_transaction::Model {
        inventory_transaction::Model {
            id: Uuid::new_v4(),
            restaurant_id: item.restaurant_id,
            inventory_item_id: item.id,
            order_id: None,
            quantity,
            reason: "adjustment".to_string(),
            notes: None,
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn low_stock_transaction_raises_alert_event() {
        let item = item_with(dec!(5), dec!(10), StockStatus::LowStock);
        let row = ledger_row_for(&item, dec!(-3));

        let events = stock_events(&row, &item, TransactionReason::Adjustment);
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::LowStockDetected { .. })));
    }

    #[test]
    fn healthy_stock_raises_no_alert() {
        let item = item_with(dec!(50), dec!(10), StockStatus::InStock);
        let row = ledger_row_for(&item, dec!(-3));

        let events = stock_events(&row, &item, TransactionReason::OrderUse);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            Event::InventoryTransactionRecorded { .. }
        ));
    }

    #[test]
    fn waste_transactions_carry_costed_event() {
        let item = item_with(dec!(20), dec!(10), StockStatus::InStock);
        let row = ledger_row_for(&item, dec!(-4));

        let events = stock_events(&row, &item, TransactionReason::Waste);
        let waste = events
            .iter()
            .find_map(|e| match e {
                Event::WasteRecorded { quantity, cost, .. } => Some((*quantity, *cost)),
                _ => None,
            })
            .expect("waste event");
        assert_eq!(waste.0, dec!(4));
        assert_eq!(waste.1, dec!(10.00)); // 4 x 2.50
    }
}
