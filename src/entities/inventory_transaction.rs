use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Why stock moved. `OrderUse` and the compensating `Adjustment` rows
/// written by order voiding both carry the originating `order_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TransactionReason {
    #[serde(rename = "order-use")]
    OrderUse,
    #[serde(rename = "restock")]
    Restock,
    #[serde(rename = "waste")]
    Waste,
    #[serde(rename = "adjustment")]
    Adjustment,
    #[serde(rename = "transfer")]
    Transfer,
    #[serde(rename = "expired")]
    Expired,
}

impl TransactionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionReason::OrderUse => "order-use",
            TransactionReason::Restock => "restock",
            TransactionReason::Waste => "waste",
            TransactionReason::Adjustment => "adjustment",
            TransactionReason::Transfer => "transfer",
            TransactionReason::Expired => "expired",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "order-use" => Some(TransactionReason::OrderUse),
            "restock" => Some(TransactionReason::Restock),
            "waste" => Some(TransactionReason::Waste),
            "adjustment" => Some(TransactionReason::Adjustment),
            "transfer" => Some(TransactionReason::Transfer),
            "expired" => Some(TransactionReason::Expired),
            _ => None,
        }
    }
}

/// Append-only stock ledger entry: a signed quantity delta against one
/// inventory item, in that item's unit. Rows are never updated or deleted;
/// initial stock plus the signed sum of a ledger equals `current_stock`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "inventory_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub inventory_item_id: Uuid,
    pub order_id: Option<Uuid>,
    pub quantity: Decimal,
    /// Stored as string in the DB; converted to/from `TransactionReason`.
    pub reason: String,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::inventory_item::Entity",
        from = "Column::InventoryItemId",
        to = "super::inventory_item::Column::Id"
    )]
    InventoryItem,
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
}

impl Related<super::inventory_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryItem.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        if let ActiveValue::NotSet = active_model.created_at {
            active_model.created_at = Set(Utc::now());
        }
        Ok(active_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_round_trips() {
        for reason in [
            TransactionReason::OrderUse,
            TransactionReason::Restock,
            TransactionReason::Waste,
            TransactionReason::Adjustment,
            TransactionReason::Transfer,
            TransactionReason::Expired,
        ] {
            assert_eq!(TransactionReason::from_str(reason.as_str()), Some(reason));
        }
        assert_eq!(TransactionReason::from_str("theft"), None);
    }
}
