use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Derived stock classification, recomputed server-side on every stock
/// write. Clients only ever read this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum StockStatus {
    #[serde(rename = "in-stock")]
    InStock,
    #[serde(rename = "low-stock")]
    LowStock,
    #[serde(rename = "out-of-stock")]
    OutOfStock,
    #[serde(rename = "expired")]
    Expired,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "in-stock",
            StockStatus::LowStock => "low-stock",
            StockStatus::OutOfStock => "out-of-stock",
            StockStatus::Expired => "expired",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "in-stock" => Some(StockStatus::InStock),
            "low-stock" => Some(StockStatus::LowStock),
            "out-of-stock" => Some(StockStatus::OutOfStock),
            "expired" => Some(StockStatus::Expired),
            _ => None,
        }
    }

    /// Classify a stock level. Depletion outranks expiry, expiry outranks
    /// the low-stock threshold.
    pub fn classify(
        current_stock: Decimal,
        min_stock: Decimal,
        expiry_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Self {
        if current_stock <= Decimal::ZERO {
            return StockStatus::OutOfStock;
        }
        if let Some(expiry) = expiry_date {
            if expiry < today {
                return StockStatus::Expired;
            }
        }
        if current_stock <= min_stock {
            return StockStatus::LowStock;
        }
        StockStatus::InStock
    }
}

/// An inventory line owned by one restaurant. Stock is denominated in
/// `unit` and mutated only through inventory transactions or manual edits.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema, Validate)]
#[sea_orm(table_name = "inventory_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub restaurant_id: Uuid,

    #[validate(length(min = 1, max = 120, message = "Item name must be 1-120 characters"))]
    pub name: String,

    pub category: String,
    pub current_stock: Decimal,
    pub min_stock: Decimal,
    pub max_stock: Decimal,

    /// Stored as the unit symbol string; parsed via `units::Unit`.
    pub unit: String,

    pub cost_per_unit: Decimal,
    pub supplier_id: Option<Uuid>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub location: Option<String>,
    pub expiry_date: Option<NaiveDate>,

    /// Derived `StockStatus`, see `StockStatus::classify`.
    pub status: String,

    pub last_restocked: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::restaurant::Entity",
        from = "Column::RestaurantId",
        to = "super::restaurant::Column::Id"
    )]
    Restaurant,
    #[sea_orm(has_many = "super::inventory_transaction::Entity")]
    Transactions,
    #[sea_orm(has_many = "super::menu_ingredient::Entity")]
    MenuIngredients,
}

impl Related<super::restaurant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Restaurant.def()
    }
}

impl Related<super::inventory_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::menu_ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MenuIngredients.def()
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
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn stock_at_or_below_minimum_is_low() {
        let status = StockStatus::classify(dec!(5), dec!(10), None, today());
        assert_eq!(status, StockStatus::LowStock);

        let status = StockStatus::classify(dec!(10), dec!(10), None, today());
        assert_eq!(status, StockStatus::LowStock);
    }

    #[test]
    fn depleted_stock_is_out_of_stock() {
        let status = StockStatus::classify(dec!(0), dec!(10), None, today());
        assert_eq!(status, StockStatus::OutOfStock);

        // Over-deduction can push stock negative; still out of stock.
        let status = StockStatus::classify(dec!(-2), dec!(10), None, today());
        assert_eq!(status, StockStatus::OutOfStock);
    }

    #[test]
    fn past_expiry_outranks_low_stock() {
        let expired = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let status = StockStatus::classify(dec!(5), dec!(10), Some(expired), today());
        assert_eq!(status, StockStatus::Expired);
    }

    #[test]
    fn expiry_today_is_not_expired() {
        let status = StockStatus::classify(dec!(50), dec!(10), Some(today()), today());
        assert_eq!(status, StockStatus::InStock);
    }

    #[test]
    fn healthy_stock_is_in_stock() {
        let future = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let status = StockStatus::classify(dec!(50), dec!(10), Some(future), today());
        assert_eq!(status, StockStatus::InStock);
    }
}
