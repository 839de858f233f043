use crate::entities::inventory_item::{self, Entity as InventoryItemEntity};
use crate::entities::inventory_transaction::{
    self, Entity as InventoryTransactionEntity, TransactionReason,
};
use crate::entities::menu_ingredient::{self, Entity as MenuIngredientEntity};
use crate::entities::menu_item::{self, Entity as MenuItemEntity};
use crate::entities::order::{self, Entity as OrderEntity, OrderStatus, OrderType, PaymentStatus};
use crate::entities::order_item::{self, Entity as OrderItemEntity, OrderItemStatus};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::inventory::{stock_events, InventoryService};
use crate::services::settings::{ChargeRates, SettingsService};
use crate::services::RequestCtx;
use crate::units::{self, Unit};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Computed money breakdown for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub service_charge: Decimal,
    pub total: Decimal,
}

impl OrderTotals {
    /// subtotal = sum(price x qty); a percentage discount comes off first,
    /// then tax and service charge apply to the discounted amount, then
    /// the configured cash rounding hits the final total.
    pub fn calculate(
        lines: &[(Decimal, i32)],
        discount_percent: Decimal,
        rates: &ChargeRates,
    ) -> Result<Self, ServiceError> {
        if discount_percent < Decimal::ZERO || discount_percent > Decimal::ONE_HUNDRED {
            return Err(ServiceError::ValidationError(
                "Discount percentage must be between 0 and 100".to_string(),
            ));
        }

        let subtotal: Decimal = lines
            .iter()
            .map(|(price, qty)| *price * Decimal::from(*qty))
            .sum();

        let discount = (subtotal * discount_percent / Decimal::ONE_HUNDRED).min(subtotal);
        let taxable = subtotal - discount;
        let tax = taxable * rates.tax_rate / Decimal::ONE_HUNDRED;
        let service_charge = taxable * rates.service_charge_rate / Decimal::ONE_HUNDRED;
        let total = rates.rounding.apply(taxable + tax + service_charge);

        Ok(Self {
            subtotal,
            discount,
            tax,
            service_charge,
            total,
        })
    }
}

/// The quantity ledgered for one recipe line: the ingredient amount,
/// converted into the stock item's unit, scaled by the order line quantity
/// and negated.
pub fn deduction_quantity(
    ingredient_quantity: Decimal,
    ingredient_unit: &str,
    stock_unit: &str,
    line_quantity: i32,
) -> Decimal {
    let converted = match (Unit::parse(ingredient_unit), Unit::parse(stock_unit)) {
        (Some(from), Some(to)) => units::convert(ingredient_quantity, from, to),
        _ => {
            warn!(
                ingredient_unit,
                stock_unit, "Unknown unit on recipe line; deducting unconverted quantity"
            );
            ingredient_quantity
        }
    };
    -(converted * Decimal::from(line_quantity))
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateOrderItemRequest {
    pub menu_item_id: Uuid,
    #[validate(range(min = 1, max = 100, message = "Quantity must be between 1 and 100"))]
    pub quantity: i32,
    pub chair_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateOrderRequest {
    pub table_id: Option<Uuid>,
    pub chair_id: Option<Uuid>,
    /// One of: dine-in, takeaway, delivery, room-service
    pub order_type: String,
    #[validate]
    pub items: Vec<CreateOrderItemRequest>,
    /// Percentage discount in [0, 100]
    pub discount_percent: Option<Decimal>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateOrderStatusRequest {
    /// Target lifecycle status; cancellation goes through the void endpoint
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct VoidOrderRequest {
    #[validate(length(min = 1, max = 500, message = "A void reason is required"))]
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ProcessPaymentRequest {
    #[validate(length(min = 1, max = 40, message = "Payment method is required"))]
    pub method: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ApplyDiscountRequest {
    pub amount: Decimal,
    #[serde(default)]
    pub is_percentage: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: order::Model,
    pub items: Vec<order_item::Model>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderCounts {
    pub pending: u64,
    pub active: u64,
    pub completed: u64,
}

/// Service for the point-of-sale order flow. Order creation, ingredient
/// deduction, and voiding with inventory restoration each run inside a
/// single database transaction; a failure anywhere rolls the whole step
/// back instead of leaving the ledger half-written.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
    settings: SettingsService,
}

impl OrderService {
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

    /// Creates an order: totals, order number allocation, line persistence
    /// and automatic ingredient deduction, all in one transaction.
    #[instrument(skip(self, request), fields(restaurant_id = %ctx.restaurant_id))]
    pub async fn create_order(
        &self,
        ctx: &RequestCtx,
        request: CreateOrderRequest,
    ) -> Result<OrderWithItems, ServiceError> {
        request.validate()?;
        if request.items.is_empty() {
            return Err(ServiceError::ValidationError(
                "An order needs at least one item".to_string(),
            ));
        }
        let order_type = OrderType::from_str(&request.order_type).ok_or_else(|| {
            ServiceError::ValidationError(format!("Unknown order type: {}", request.order_type))
        })?;
        let discount_percent = request.discount_percent.unwrap_or(Decimal::ZERO);

        let db = &*self.db;
        let txn = db.begin().await?;

        let settings = self.settings.get_in(&txn, ctx.restaurant_id).await?;

        // Resolve menu items and freeze their prices.
        let menu_ids: Vec<Uuid> = request.items.iter().map(|i| i.menu_item_id).collect();
        let menu_items: HashMap<Uuid, menu_item::Model> = MenuItemEntity::find()
            .filter(menu_item::Column::RestaurantId.eq(ctx.restaurant_id))
            .filter(menu_item::Column::Id.is_in(menu_ids.clone()))
            .all(&txn)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        let mut lines: Vec<(Decimal, i32)> = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let menu_item = menu_items.get(&item.menu_item_id).ok_or_else(|| {
                ServiceError::NotFound(format!("Menu item {} not found", item.menu_item_id))
            })?;
            if !menu_item.available {
                return Err(ServiceError::InvalidOperation(format!(
                    "Menu item {} is not available",
                    menu_item.name
                )));
            }
            lines.push((menu_item.price, item.quantity));
        }

        let totals = OrderTotals::calculate(&lines, discount_percent, &settings.charge_rates())?;
        let order_number = self
            .settings
            .issue_order_number(&txn, ctx.restaurant_id)
            .await?;

        let order_id = Uuid::new_v4();
        let now = Utc::now();
        let order_model = order::ActiveModel {
            id: Set(order_id),
            restaurant_id: Set(ctx.restaurant_id),
            order_number: Set(order_number.clone()),
            table_id: Set(request.table_id),
            chair_id: Set(request.chair_id),
            server_id: Set(ctx.user_id),
            order_type: Set(order_type.as_str().to_string()),
            status: Set(OrderStatus::Pending.as_str().to_string()),
            subtotal: Set(totals.subtotal),
            tax: Set(totals.tax),
            service_charge: Set(totals.service_charge),
            discount: Set(totals.discount),
            total: Set(totals.total),
            payment_method: Set(request
                .payment_method
                .or(settings.default_payment_method.clone())),
            payment_status: Set(PaymentStatus::Pending.as_str().to_string()),
            notes: Set(request.notes),
            created_at: Set(now),
            updated_at: Set(Some(now)),
            version: Set(1),
        }
        .insert(&txn)
        .await?;

        let mut item_models = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let menu_item = &menu_items[&item.menu_item_id];
            let model = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                menu_item_id: Set(item.menu_item_id),
                chair_id: Set(item.chair_id),
                quantity: Set(item.quantity),
                price_at_time: Set(menu_item.price),
                status: Set(OrderItemStatus::Pending.as_str().to_string()),
                notes: Set(item.notes.clone()),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;
            item_models.push(model);
        }

        let mut deferred_events = Vec::new();
        if settings.enable_auto_inventory {
            deferred_events = self
                .deduct_for_order(&txn, ctx, order_id, &order_number, &request.items)
                .await?;
        }

        txn.commit().await?;

        info!(order_id = %order_id, order_number = %order_number, "Order created");

        self.send_event(Event::OrderCreated(order_id)).await;
        for event in deferred_events {
            self.send_event(event).await;
        }

        Ok(OrderWithItems {
            order: order_model,
            items: item_models,
        })
    }

    /// Ledger one `order-use` row per non-optional ingredient per line,
    /// converting recipe units into stock units. Idempotent per order: if
    /// deduction rows already exist for this order nothing is written, so
    /// retrying a failed creation can never double-deduct.
    async fn deduct_for_order<C: ConnectionTrait>(
        &self,
        conn: &C,
        ctx: &RequestCtx,
        order_id: Uuid,
        order_number: &str,
        items: &[CreateOrderItemRequest],
    ) -> Result<Vec<Event>, ServiceError> {
        let already_deducted = InventoryTransactionEntity::find()
            .filter(inventory_transaction::Column::OrderId.eq(order_id))
            .filter(inventory_transaction::Column::Reason.eq(TransactionReason::OrderUse.as_str()))
            .count(conn)
            .await?;
        if already_deducted > 0 {
            info!(order_id = %order_id, "Inventory already deducted for order; skipping");
            return Ok(Vec::new());
        }

        let menu_ids: Vec<Uuid> = items.iter().map(|i| i.menu_item_id).collect();
        let mut recipes: HashMap<Uuid, Vec<menu_ingredient::Model>> = HashMap::new();
        for ingredient in MenuIngredientEntity::find()
            .filter(menu_ingredient::Column::MenuItemId.is_in(menu_ids))
            .all(conn)
            .await?
        {
            recipes
                .entry(ingredient.menu_item_id)
                .or_default()
                .push(ingredient);
        }

        let mut events = Vec::new();
        for item in items {
            let Some(ingredients) = recipes.get(&item.menu_item_id) else {
                continue;
            };
            for ingredient in ingredients {
                if ingredient.optional {
                    continue;
                }

                let stock_item = InventoryItemEntity::find_by_id(ingredient.inventory_item_id)
                    .filter(inventory_item::Column::RestaurantId.eq(ctx.restaurant_id))
                    .one(conn)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::InventoryError(format!(
                            "Recipe references missing inventory item {}",
                            ingredient.inventory_item_id
                        ))
                    })?;

                let quantity = deduction_quantity(
                    ingredient.quantity,
                    &ingredient.unit,
                    &stock_item.unit,
                    item.quantity,
                );

                let (ledger_row, updated_item) = InventoryService::apply_transaction(
                    conn,
                    ctx,
                    stock_item,
                    Some(order_id),
                    quantity,
                    TransactionReason::OrderUse,
                    Some(format!("Used in order {}", order_number)),
                )
                .await?;
                events.extend(stock_events(&ledger_row, &updated_item, TransactionReason::OrderUse));
            }
        }

        Ok(events)
    }

    /// Voids an order: status flips to cancelled and, when inventory was
    /// deducted, one compensating `adjustment` row per deduction is written
    /// in the same transaction. Idempotent on both sides: restoration only
    /// runs when deduction rows exist and no restoration rows do.
    #[instrument(skip(self, request), fields(order_id = %id))]
    pub async fn void_order(
        &self,
        ctx: &RequestCtx,
        id: Uuid,
        request: VoidOrderRequest,
    ) -> Result<order::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db;
        let txn = db.begin().await?;

        let existing = self.find_order(&txn, ctx, id).await?;
        let current = parse_status(&existing.status)?;
        if !current.can_transition_to(OrderStatus::Cancelled) {
            return Err(ServiceError::InvalidStatus(format!(
                "Cannot void an order in status {}",
                existing.status
            )));
        }

        let order_number = existing.order_number.clone();
        let old_status = existing.status.clone();
        let notes = match &existing.notes {
            Some(notes) => format!("{}\nVoided: {}", notes, request.reason),
            None => format!("Voided: {}", request.reason),
        };
        let version = existing.version;

        let mut active: order::ActiveModel = existing.into();
        active.status = Set(OrderStatus::Cancelled.as_str().to_string());
        active.notes = Set(Some(notes));
        active.updated_at = Set(Some(Utc::now()));
        active.version = Set(version + 1);
        let updated = active.update(&txn).await?;

        let (restored, restore_events) = self
            .restore_for_order(&txn, ctx, id, &order_number, &request.reason)
            .await?;

        txn.commit().await?;

        info!(order_id = %id, restored, "Order voided");

        self.send_event(Event::OrderStatusChanged {
            order_id: id,
            old_status,
            new_status: OrderStatus::Cancelled.as_str().to_string(),
        })
        .await;
        self.send_event(Event::OrderVoided {
            order_id: id,
            inventory_restored: restored,
        })
        .await;
        for event in restore_events {
            self.send_event(event).await;
        }

        Ok(updated)
    }

    /// Mirror of `deduct_for_order`: writes one positive `adjustment` per
    /// `order-use` row. Skipped when nothing was deducted or when a
    /// restoration already ran for this order.
    async fn restore_for_order<C: ConnectionTrait>(
        &self,
        conn: &C,
        ctx: &RequestCtx,
        order_id: Uuid,
        order_number: &str,
        reason: &str,
    ) -> Result<(bool, Vec<Event>), ServiceError> {
        let deductions = InventoryTransactionEntity::find()
            .filter(inventory_transaction::Column::OrderId.eq(order_id))
            .filter(inventory_transaction::Column::Reason.eq(TransactionReason::OrderUse.as_str()))
            .all(conn)
            .await?;
        if deductions.is_empty() {
            return Ok((false, Vec::new()));
        }

        let already_restored = InventoryTransactionEntity::find()
            .filter(inventory_transaction::Column::OrderId.eq(order_id))
            .filter(
                inventory_transaction::Column::Reason.eq(TransactionReason::Adjustment.as_str()),
            )
            .count(conn)
            .await?;
        if already_restored > 0 {
            info!(order_id = %order_id, "Inventory already restored for order; skipping");
            return Ok((false, Vec::new()));
        }

        let mut events = Vec::new();
        for deduction in deductions {
            let stock_item = InventoryItemEntity::find_by_id(deduction.inventory_item_id)
                .filter(inventory_item::Column::RestaurantId.eq(ctx.restaurant_id))
                .one(conn)
                .await?
                .ok_or_else(|| {
                    ServiceError::InventoryError(format!(
                        "Ledger references missing inventory item {}",
                        deduction.inventory_item_id
                    ))
                })?;

            let (ledger_row, updated_item) = InventoryService::apply_transaction(
                conn,
                ctx,
                stock_item,
                Some(order_id),
                -deduction.quantity,
                TransactionReason::Adjustment,
                Some(format!("Order {} voided: {}", order_number, reason)),
            )
            .await?;
            events.extend(stock_events(
                &ledger_row,
                &updated_item,
                TransactionReason::Adjustment,
            ));
        }

        Ok((true, events))
    }

    /// Advance the order lifecycle. Cancellation must go through
    /// `void_order` so inventory restoration cannot be skipped.
    #[instrument(skip(self, request), fields(order_id = %id, new_status = %request.status))]
    pub async fn update_status(
        &self,
        ctx: &RequestCtx,
        id: Uuid,
        request: UpdateOrderStatusRequest,
    ) -> Result<order::Model, ServiceError> {
        request.validate()?;
        let target = parse_status(&request.status)?;
        if target == OrderStatus::Cancelled {
            return Err(ServiceError::InvalidOperation(
                "Use the void endpoint to cancel an order".to_string(),
            ));
        }

        let db = &*self.db;
        let txn = db.begin().await?;

        let existing = self.find_order(&txn, ctx, id).await?;
        let current = parse_status(&existing.status)?;
        if !current.can_transition_to(target) {
            return Err(ServiceError::InvalidStatus(format!(
                "Illegal status transition {} -> {}",
                current.as_str(),
                target.as_str()
            )));
        }

        let old_status = existing.status.clone();
        let version = existing.version;
        let mut active: order::ActiveModel = existing.into();
        active.status = Set(target.as_str().to_string());
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(Some(Utc::now()));
        active.version = Set(version + 1);
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        self.send_event(Event::OrderStatusChanged {
            order_id: id,
            old_status,
            new_status: target.as_str().to_string(),
        })
        .await;

        Ok(updated)
    }

    /// Settle a served order: marks it paid and completes it.
    #[instrument(skip(self, request), fields(order_id = %id))]
    pub async fn process_payment(
        &self,
        ctx: &RequestCtx,
        id: Uuid,
        request: ProcessPaymentRequest,
    ) -> Result<order::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db;
        let txn = db.begin().await?;

        let existing = self.find_order(&txn, ctx, id).await?;
        let current = parse_status(&existing.status)?;
        if !current.can_transition_to(OrderStatus::Completed) {
            return Err(ServiceError::InvalidStatus(format!(
                "Order in status {} cannot be settled",
                existing.status
            )));
        }
        if existing.payment_status == PaymentStatus::Paid.as_str() {
            return Err(ServiceError::Conflict(
                "Order is already paid".to_string(),
            ));
        }

        let old_status = existing.status.clone();
        let version = existing.version;
        let mut active: order::ActiveModel = existing.into();
        active.payment_method = Set(Some(request.method));
        active.payment_status = Set(PaymentStatus::Paid.as_str().to_string());
        active.status = Set(OrderStatus::Completed.as_str().to_string());
        active.updated_at = Set(Some(Utc::now()));
        active.version = Set(version + 1);
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        self.send_event(Event::OrderPaid(id)).await;
        self.send_event(Event::OrderStatusChanged {
            order_id: id,
            old_status,
            new_status: OrderStatus::Completed.as_str().to_string(),
        })
        .await;

        Ok(updated)
    }

    /// Re-derive the money breakdown with a flat or percentage discount.
    #[instrument(skip(self, request), fields(order_id = %id))]
    pub async fn apply_discount(
        &self,
        ctx: &RequestCtx,
        id: Uuid,
        request: ApplyDiscountRequest,
    ) -> Result<order::Model, ServiceError> {
        if request.amount < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Discount must be non-negative".to_string(),
            ));
        }
        if request.is_percentage && request.amount > Decimal::ONE_HUNDRED {
            return Err(ServiceError::ValidationError(
                "Discount percentage must be between 0 and 100".to_string(),
            ));
        }

        let db = &*self.db;
        let txn = db.begin().await?;

        let existing = self.find_order(&txn, ctx, id).await?;
        let current = parse_status(&existing.status)?;
        if current.is_terminal() {
            return Err(ServiceError::InvalidStatus(format!(
                "Cannot discount an order in status {}",
                existing.status
            )));
        }

        let settings = self.settings.get_in(&txn, ctx.restaurant_id).await?;
        let rates = settings.charge_rates();

        let discount = if request.is_percentage {
            existing.subtotal * request.amount / Decimal::ONE_HUNDRED
        } else {
            request.amount
        }
        .min(existing.subtotal);

        let taxable = existing.subtotal - discount;
        let tax = taxable * rates.tax_rate / Decimal::ONE_HUNDRED;
        let service_charge = taxable * rates.service_charge_rate / Decimal::ONE_HUNDRED;
        let total = rates.rounding.apply(taxable + tax + service_charge);

        let version = existing.version;
        let mut active: order::ActiveModel = existing.into();
        active.discount = Set(discount);
        active.tax = Set(tax);
        active.service_charge = Set(service_charge);
        active.total = Set(total);
        active.updated_at = Set(Some(Utc::now()));
        active.version = Set(version + 1);
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, ctx: &RequestCtx, id: Uuid) -> Result<OrderWithItems, ServiceError> {
        let db = &*self.db;
        let order = self.find_order(db, ctx, id).await?;
        let items = OrderItemEntity::find()
            .filter(order_item::Column::OrderId.eq(order.id))
            .all(db)
            .await?;
        Ok(OrderWithItems { order, items })
    }

    /// List orders; `scope` is either "active" (not completed/cancelled) or
    /// a concrete status.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        ctx: &RequestCtx,
        scope: Option<String>,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<order::Model>, u64), ServiceError> {
        let db = &*self.db;

        let mut query = OrderEntity::find()
            .filter(order::Column::RestaurantId.eq(ctx.restaurant_id))
            .order_by_desc(order::Column::CreatedAt);

        match scope.as_deref() {
            None => {}
            Some("active") => {
                query = query.filter(
                    order::Column::Status.is_not_in([
                        OrderStatus::Completed.as_str(),
                        OrderStatus::Cancelled.as_str(),
                    ]),
                );
            }
            Some(raw) => {
                let status = parse_status(raw)?;
                query = query.filter(order::Column::Status.eq(status.as_str()));
            }
        }

        let paginator = query.paginate(db, limit.max(1));
        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((orders, total))
    }

    /// Today's order counts by bucket (since UTC midnight).
    #[instrument(skip(self))]
    pub async fn order_counts(&self, ctx: &RequestCtx) -> Result<OrderCounts, ServiceError> {
        let db = &*self.db;
        let midnight = Utc::now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .expect("midnight is a valid time")
            .and_utc();

        let base = OrderEntity::find()
            .filter(order::Column::RestaurantId.eq(ctx.restaurant_id))
            .filter(order::Column::CreatedAt.gte(midnight));

        let pending = base
            .clone()
            .filter(order::Column::Status.eq(OrderStatus::Pending.as_str()))
            .count(db)
            .await?;
        let active = base
            .clone()
            .filter(order::Column::Status.is_not_in([
                OrderStatus::Completed.as_str(),
                OrderStatus::Cancelled.as_str(),
            ]))
            .count(db)
            .await?;
        let completed = base
            .filter(order::Column::Status.eq(OrderStatus::Completed.as_str()))
            .count(db)
            .await?;

        Ok(OrderCounts {
            pending,
            active,
            completed,
        })
    }

    /// Revenue from completed orders since UTC midnight.
    #[instrument(skip(self))]
    pub async fn daily_revenue(&self, ctx: &RequestCtx) -> Result<Decimal, ServiceError> {
        let db = &*self.db;
        let midnight = Utc::now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .expect("midnight is a valid time")
            .and_utc();

        let orders = OrderEntity::find()
            .filter(order::Column::RestaurantId.eq(ctx.restaurant_id))
            .filter(order::Column::Status.eq(OrderStatus::Completed.as_str()))
            .filter(order::Column::CreatedAt.gte(midnight))
            .all(db)
            .await?;

        Ok(orders.iter().map(|o| o.total).sum())
    }

    async fn find_order<C: ConnectionTrait>(
        &self,
        conn: &C,
        ctx: &RequestCtx,
        id: Uuid,
    ) -> Result<order::Model, ServiceError> {
        OrderEntity::find_by_id(id)
            .filter(order::Column::RestaurantId.eq(ctx.restaurant_id))
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {id} not found")))
    }

    async fn send_event(&self, event: Event) {
        if let Err(e) = self.event_sender.send(event).await {
            warn!(error = %e, "Failed to publish order event");
        }
    }
}

fn parse_status(raw: &str) -> Result<OrderStatus, ServiceError> {
    OrderStatus::from_str(raw)
        .ok_or_else(|| ServiceError::InvalidStatus(format!("Unknown order status: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::pos_settings::RoundingMode;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn rates(tax: Decimal, service: Decimal, rounding: RoundingMode) -> ChargeRates {
        ChargeRates {
            tax_rate: tax,
            service_charge_rate: service,
            rounding,
        }
    }

    #[test]
    fn worked_example_from_the_terminal() {
        // subtotal 100, 10% discount, 10% tax, 5% service -> 103.5
        let totals = OrderTotals::calculate(
            &[(dec!(25), 4)],
            dec!(10),
            &rates(dec!(10), dec!(5), RoundingMode::None),
        )
        .unwrap();

        assert_eq!(totals.subtotal, dec!(100));
        assert_eq!(totals.discount, dec!(10));
        assert_eq!(totals.tax, dec!(9.0));
        assert_eq!(totals.service_charge, dec!(4.5));
        assert_eq!(totals.total, dec!(103.5));
    }

    #[test]
    fn zero_discount_keeps_full_subtotal_taxable() {
        let totals = OrderTotals::calculate(
            &[(dec!(12.50), 2), (dec!(3.00), 1)],
            Decimal::ZERO,
            &rates(dec!(10), dec!(5), RoundingMode::None),
        )
        .unwrap();

        assert_eq!(totals.subtotal, dec!(28.00));
        assert_eq!(totals.discount, Decimal::ZERO);
        assert_eq!(totals.total, dec!(28.00) + dec!(2.8000) + dec!(1.4000));
    }

    #[test]
    fn full_discount_zeroes_the_bill() {
        let totals = OrderTotals::calculate(
            &[(dec!(40), 1)],
            dec!(100),
            &rates(dec!(10), dec!(5), RoundingMode::None),
        )
        .unwrap();

        assert_eq!(totals.discount, dec!(40));
        assert_eq!(totals.tax, Decimal::ZERO);
        assert_eq!(totals.service_charge, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn out_of_range_discount_is_rejected() {
        let result = OrderTotals::calculate(
            &[(dec!(10), 1)],
            dec!(101),
            &rates(dec!(10), dec!(5), RoundingMode::None),
        );
        assert_matches!(result, Err(ServiceError::ValidationError(_)));

        let result = OrderTotals::calculate(
            &[(dec!(10), 1)],
            dec!(-1),
            &rates(dec!(10), dec!(5), RoundingMode::None),
        );
        assert_matches!(result, Err(ServiceError::ValidationError(_)));
    }

    #[test]
    fn rounding_applies_to_the_final_total_only() {
        let totals = OrderTotals::calculate(
            &[(dec!(33.33), 1)],
            Decimal::ZERO,
            &rates(dec!(10), dec!(5), RoundingMode::Half),
        )
        .unwrap();

        // 33.33 * 1.15 = 38.3295 -> 38.5; components stay exact.
        assert_eq!(totals.total, dec!(38.5));
        assert_eq!(totals.tax, dec!(3.333));
        assert_eq!(totals.service_charge, dec!(1.6665));
    }

    #[test]
    fn empty_line_list_totals_to_zero() {
        let totals = OrderTotals::calculate(
            &[],
            Decimal::ZERO,
            &rates(dec!(10), dec!(5), RoundingMode::None),
        )
        .unwrap();
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn deduction_scales_by_line_quantity() {
        // ingredient quantity 2, line quantity 3 -> one ledger row of -6
        assert_eq!(deduction_quantity(dec!(2), "pcs", "pcs", 3), dec!(-6));
    }

    #[test]
    fn deduction_converts_recipe_units_into_stock_units() {
        // recipe says 250 g per serving, stock is kept in kg
        assert_eq!(deduction_quantity(dec!(250), "g", "kg", 2), dec!(-0.5));
    }

    #[test]
    fn deduction_with_incompatible_units_deducts_raw_quantity() {
        // conversion falls back to the input value
        assert_eq!(deduction_quantity(dec!(2), "ml", "pcs", 1), dec!(-2));
    }
}
