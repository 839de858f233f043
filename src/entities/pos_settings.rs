use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Cash-total rounding applied after tax and service charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMode {
    /// No rounding.
    None,
    /// Round to the nearest 0.5 currency unit.
    Half,
    /// Round to the nearest whole currency unit.
    Unit,
}

impl RoundingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundingMode::None => "none",
            RoundingMode::Half => "half",
            RoundingMode::Unit => "unit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "none" => Some(RoundingMode::None),
            "half" | "0.5" => Some(RoundingMode::Half),
            "unit" | "1" => Some(RoundingMode::Unit),
            _ => None,
        }
    }

    pub fn apply(&self, total: Decimal) -> Decimal {
        match self {
            RoundingMode::None => total,
            RoundingMode::Half => (total * dec!(2)).round() / dec!(2),
            RoundingMode::Unit => total.round(),
        }
    }
}

/// Per-restaurant point-of-sale configuration: charge rates, the invoice
/// number sequence, and the automatic-deduction toggle. One row per tenant,
/// created at registration.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "pos_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub restaurant_id: Uuid,
    /// Percentage, e.g. 10 for 10%.
    pub tax_rate: Decimal,
    /// Percentage, e.g. 5 for 5%.
    pub service_charge_rate: Decimal,
    pub invoice_prefix: String,
    pub next_invoice_number: i64,
    pub enable_auto_inventory: bool,
    pub default_payment_method: Option<String>,
    pub rounding: String,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_to_nearest_half() {
        assert_eq!(RoundingMode::Half.apply(dec!(103.24)), dec!(103.0));
        assert_eq!(RoundingMode::Half.apply(dec!(103.26)), dec!(103.5));
        assert_eq!(RoundingMode::Half.apply(dec!(103.5)), dec!(103.5));
    }

    #[test]
    fn rounding_to_nearest_unit() {
        assert_eq!(RoundingMode::Unit.apply(dec!(103.49)), dec!(103));
        assert_eq!(RoundingMode::Unit.apply(dec!(103.51)), dec!(104));
    }

    #[test]
    fn no_rounding_leaves_total_unchanged() {
        assert_eq!(RoundingMode::None.apply(dec!(103.51)), dec!(103.51));
    }

    #[test]
    fn legacy_rounding_spellings_parse() {
        assert_eq!(RoundingMode::from_str("0.5"), Some(RoundingMode::Half));
        assert_eq!(RoundingMode::from_str("1"), Some(RoundingMode::Unit));
        assert_eq!(RoundingMode::from_str("none"), Some(RoundingMode::None));
    }
}
