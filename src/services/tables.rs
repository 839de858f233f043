use crate::entities::chair::{self, Entity as ChairEntity};
use crate::entities::dining_table::{self, Entity as DiningTableEntity, OccupancyStatus};
use crate::entities::order::{self, Entity as OrderEntity, OrderStatus};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::RequestCtx;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateTableRequest {
    #[validate(length(min = 1, max = 20, message = "Table number must be 1-20 characters"))]
    pub number: String,
    pub section: Option<String>,
    #[validate(range(min = 1, max = 20, message = "Capacity must be between 1 and 20 seats"))]
    pub capacity: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateTableRequest {
    #[validate(length(min = 1, max = 20, message = "Table number must be 1-20 characters"))]
    pub number: Option<String>,
    pub section: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateOccupancyRequest {
    /// One of: available, occupied, reserved, cleaning
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TableWithChairs {
    #[serde(flatten)]
    pub table: dining_table::Model,
    pub chairs: Vec<chair::Model>,
}

/// Service for the seating plan: tables and their per-seat chairs.
#[derive(Clone)]
pub struct TableService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl TableService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Create a table and generate one chair per seat in the same
    /// transaction, numbered 1..=capacity.
    #[instrument(skip(self, request), fields(number = %request.number))]
    pub async fn create_table(
        &self,
        ctx: &RequestCtx,
        request: CreateTableRequest,
    ) -> Result<TableWithChairs, ServiceError> {
        request.validate()?;

        let db = &*self.db;
        let txn = db.begin().await?;

        let duplicate = DiningTableEntity::find()
            .filter(dining_table::Column::RestaurantId.eq(ctx.restaurant_id))
            .filter(dining_table::Column::Number.eq(request.number.clone()))
            .count(&txn)
            .await?;
        if duplicate > 0 {
            return Err(ServiceError::Conflict(format!(
                "Table {} already exists",
                request.number
            )));
        }

        let table_id = Uuid::new_v4();
        let table = dining_table::ActiveModel {
            id: Set(table_id),
            restaurant_id: Set(ctx.restaurant_id),
            number: Set(request.number),
            section: Set(request.section),
            capacity: Set(request.capacity),
            status: Set(OccupancyStatus::Available.as_str().to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;

        let mut chairs = Vec::with_capacity(request.capacity as usize);
        for seat in 1..=request.capacity {
            let model = chair::ActiveModel {
                id: Set(Uuid::new_v4()),
                table_id: Set(table_id),
                number: Set(seat.to_string()),
                status: Set(OccupancyStatus::Available.as_str().to_string()),
            }
            .insert(&txn)
            .await?;
            chairs.push(model);
        }

        txn.commit().await?;

        info!(table_id = %table_id, seats = chairs.len(), "Table created");
        self.send_event(Event::TableCreated(table_id)).await;

        Ok(TableWithChairs { table, chairs })
    }

    /// All tables with their chairs, optionally narrowed to one section.
    #[instrument(skip(self))]
    pub async fn list_tables(
        &self,
        ctx: &RequestCtx,
        section: Option<String>,
    ) -> Result<Vec<TableWithChairs>, ServiceError> {
        let db = &*self.db;

        let mut query = DiningTableEntity::find()
            .filter(dining_table::Column::RestaurantId.eq(ctx.restaurant_id))
            .order_by_asc(dining_table::Column::Number);
        if let Some(section) = section.filter(|s| !s.trim().is_empty()) {
            query = query.filter(dining_table::Column::Section.eq(section));
        }
        let tables = query.all(db).await?;

        let table_ids: Vec<Uuid> = tables.iter().map(|t| t.id).collect();
        let mut chairs_by_table: HashMap<Uuid, Vec<chair::Model>> = HashMap::new();
        for chair in ChairEntity::find()
            .filter(chair::Column::TableId.is_in(table_ids))
            .order_by_asc(chair::Column::Number)
            .all(db)
            .await?
        {
            chairs_by_table.entry(chair.table_id).or_default().push(chair);
        }

        Ok(tables
            .into_iter()
            .map(|table| {
                let chairs = chairs_by_table.remove(&table.id).unwrap_or_default();
                TableWithChairs { table, chairs }
            })
            .collect())
    }

    #[instrument(skip(self, request), fields(table_id = %id))]
    pub async fn update_table(
        &self,
        ctx: &RequestCtx,
        id: Uuid,
        request: UpdateTableRequest,
    ) -> Result<dining_table::Model, ServiceError> {
        request.validate()?;

        let existing = self.find_table(ctx, id).await?;
        let mut active: dining_table::ActiveModel = existing.into();
        if let Some(number) = request.number {
            active.number = Set(number);
        }
        if let Some(section) = request.section {
            active.section = Set(Some(section));
        }

        let model = active.update(&*self.db).await?;
        Ok(model)
    }

    /// Delete a table and its chairs; refused while any open order still
    /// points at the table.
    #[instrument(skip(self), fields(table_id = %id))]
    pub async fn delete_table(&self, ctx: &RequestCtx, id: Uuid) -> Result<(), ServiceError> {
        let table = self.find_table(ctx, id).await?;

        let open_orders = OrderEntity::find()
            .filter(order::Column::TableId.eq(id))
            .filter(order::Column::Status.is_not_in([
                OrderStatus::Completed.as_str(),
                OrderStatus::Cancelled.as_str(),
            ]))
            .count(&*self.db)
            .await?;
        if open_orders > 0 {
            return Err(ServiceError::Conflict(format!(
                "Table has {open_orders} open order(s)"
            )));
        }

        let txn = self.db.begin().await?;
        ChairEntity::delete_many()
            .filter(chair::Column::TableId.eq(table.id))
            .exec(&txn)
            .await?;
        DiningTableEntity::delete_by_id(table.id).exec(&txn).await?;
        txn.commit().await?;

        Ok(())
    }

    #[instrument(skip(self, request), fields(table_id = %id))]
    pub async fn update_table_status(
        &self,
        ctx: &RequestCtx,
        id: Uuid,
        request: UpdateOccupancyRequest,
    ) -> Result<dining_table::Model, ServiceError> {
        let status = parse_occupancy(&request.status)?;

        let existing = self.find_table(ctx, id).await?;
        let mut active: dining_table::ActiveModel = existing.into();
        active.status = Set(status.as_str().to_string());
        let model = active.update(&*self.db).await?;

        self.send_event(Event::TableStatusChanged {
            table_id: id,
            status: status.as_str().to_string(),
        })
        .await;

        Ok(model)
    }

    #[instrument(skip(self, request), fields(table_id = %table_id, chair_id = %chair_id))]
    pub async fn update_chair_status(
        &self,
        ctx: &RequestCtx,
        table_id: Uuid,
        chair_id: Uuid,
        request: UpdateOccupancyRequest,
    ) -> Result<chair::Model, ServiceError> {
        let status = parse_occupancy(&request.status)?;

        // Tenant check rides on the table lookup.
        self.find_table(ctx, table_id).await?;

        let chair = ChairEntity::find_by_id(chair_id)
            .filter(chair::Column::TableId.eq(table_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Chair {chair_id} not found")))?;

        let mut active: chair::ActiveModel = chair.into();
        active.status = Set(status.as_str().to_string());
        let model = active.update(&*self.db).await?;

        self.send_event(Event::ChairStatusChanged {
            table_id,
            chair_id,
            status: status.as_str().to_string(),
        })
        .await;

        Ok(model)
    }

    async fn find_table(
        &self,
        ctx: &RequestCtx,
        id: Uuid,
    ) -> Result<dining_table::Model, ServiceError> {
        DiningTableEntity::find_by_id(id)
            .filter(dining_table::Column::RestaurantId.eq(ctx.restaurant_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Table {id} not found")))
    }

    async fn send_event(&self, event: Event) {
        if let Err(e) = self.event_sender.send(event).await {
            warn!(error = %e, "Failed to publish table event");
        }
    }
}

fn parse_occupancy(raw: &str) -> Result<OccupancyStatus, ServiceError> {
    OccupancyStatus::from_str(raw)
        .ok_or_else(|| ServiceError::ValidationError(format!("Unknown occupancy status: {raw}")))
}
