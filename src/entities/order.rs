use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use strum::EnumIter as StrumEnumIter;
use utoipa::ToSchema;
use uuid::Uuid;

/// Order lifecycle. Transitions are guarded by `can_transition_to`; direct
/// status writes that skip the guard are a bug.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, StrumEnumIter, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Served,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Served => "served",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "confirmed" => Some(OrderStatus::Confirmed),
            "preparing" => Some(OrderStatus::Preparing),
            "ready" => Some(OrderStatus::Ready),
            "served" => Some(OrderStatus::Served),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" | "canceled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Whether moving from `self` to `target` is a legal lifecycle step.
    /// Cancellation is allowed from any non-terminal state.
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        use OrderStatus::*;
        if self.is_terminal() {
            return false;
        }
        if target == Cancelled {
            return true;
        }
        matches!(
            (self, target),
            (Pending, Confirmed)
                | (Confirmed, Preparing)
                | (Preparing, Ready)
                | (Ready, Served)
                | (Served, Completed)
        )
    }
}

/// How the order reaches the guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum OrderType {
    #[serde(rename = "dine-in")]
    DineIn,
    #[serde(rename = "takeaway")]
    Takeaway,
    #[serde(rename = "delivery")]
    Delivery,
    #[serde(rename = "room-service")]
    RoomService,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::DineIn => "dine-in",
            OrderType::Takeaway => "takeaway",
            OrderType::Delivery => "delivery",
            OrderType::RoomService => "room-service",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "dine-in" => Some(OrderType::DineIn),
            "takeaway" => Some(OrderType::Takeaway),
            "delivery" => Some(OrderType::Delivery),
            "room-service" => Some(OrderType::RoomService),
            _ => None,
        }
    }
}

/// Payment settlement state, tracked separately from the order lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "paid" => Some(PaymentStatus::Paid),
            "refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub order_number: String,
    pub table_id: Option<Uuid>,
    pub chair_id: Option<Uuid>,
    pub server_id: Uuid,
    pub order_type: String,
    pub status: String,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub service_charge: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub payment_method: Option<String>,
    pub payment_status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::restaurant::Entity",
        from = "Column::RestaurantId",
        to = "super::restaurant::Column::Id"
    )]
    Restaurant,
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
    #[sea_orm(has_many = "super::inventory_transaction::Entity")]
    InventoryTransactions,
}

impl Related<super::restaurant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Restaurant.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl Related<super::inventory_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryTransactions.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        if insert {
            if let ActiveValue::NotSet = active_model.created_at {
                active_model.created_at = Set(Utc::now());
            }
        } else {
            active_model.updated_at = Set(Some(Utc::now()));
        }
        Ok(active_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn happy_path_transitions_are_legal() {
        use OrderStatus::*;
        for (from, to) in [
            (Pending, Confirmed),
            (Confirmed, Preparing),
            (Preparing, Ready),
            (Ready, Served),
            (Served, Completed),
        ] {
            assert!(from.can_transition_to(to), "{from:?} -> {to:?}");
        }
    }

    #[test]
    fn cancellation_is_legal_from_any_non_terminal_state() {
        use OrderStatus::*;
        for from in [Pending, Confirmed, Preparing, Ready, Served] {
            assert!(from.can_transition_to(Cancelled), "{from:?} -> Cancelled");
        }
    }

    #[test]
    fn terminal_states_accept_no_transitions() {
        use OrderStatus::*;
        for target in OrderStatus::iter() {
            assert!(!Completed.can_transition_to(target));
            assert!(!Cancelled.can_transition_to(target));
        }
    }

    #[test]
    fn skipping_lifecycle_steps_is_rejected() {
        use OrderStatus::*;
        assert!(!Pending.can_transition_to(Ready));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Confirmed.can_transition_to(Served));
        // And nothing moves backwards.
        assert!(!Served.can_transition_to(Preparing));
        assert!(!Ready.can_transition_to(Pending));
    }

    #[test]
    fn status_parsing_accepts_both_cancelled_spellings() {
        assert_eq!(OrderStatus::from_str("cancelled"), Some(OrderStatus::Cancelled));
        assert_eq!(OrderStatus::from_str("canceled"), Some(OrderStatus::Cancelled));
        assert_eq!(OrderStatus::from_str("voided"), None);
    }
}
