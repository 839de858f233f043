use crate::config::PosDefaults;
use crate::entities::pos_settings::{self, Entity as PosSettingsEntity, RoundingMode};
use crate::errors::ServiceError;
use chrono::Utc;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Charge rates feeding order total calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargeRates {
    /// Percentage, e.g. 10 for 10%
    pub tax_rate: Decimal,
    /// Percentage, e.g. 5 for 5%
    pub service_charge_rate: Decimal,
    pub rounding: RoundingMode,
}

/// Resolved POS settings for one tenant: the stored row when present,
/// otherwise the configured defaults.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PosSettingsView {
    pub restaurant_id: Uuid,
    pub tax_rate: Decimal,
    pub service_charge_rate: Decimal,
    pub invoice_prefix: String,
    pub next_invoice_number: i64,
    pub enable_auto_inventory: bool,
    pub default_payment_method: Option<String>,
    pub rounding: RoundingMode,
}

impl PosSettingsView {
    pub fn charge_rates(&self) -> ChargeRates {
        ChargeRates {
            tax_rate: self.tax_rate,
            service_charge_rate: self.service_charge_rate,
            rounding: self.rounding,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdatePosSettingsRequest {
    pub tax_rate: Option<Decimal>,
    pub service_charge_rate: Option<Decimal>,
    #[validate(length(min = 1, max = 10, message = "Invoice prefix must be 1-10 characters"))]
    pub invoice_prefix: Option<String>,
    pub enable_auto_inventory: Option<bool>,
    pub default_payment_method: Option<String>,
    /// "none", "half" or "unit"
    pub rounding: Option<String>,
}

/// Service for per-tenant point-of-sale settings.
#[derive(Clone)]
pub struct SettingsService {
    db: Arc<DatabaseConnection>,
    defaults: PosDefaults,
}

impl SettingsService {
    pub fn new(db: Arc<DatabaseConnection>, defaults: PosDefaults) -> Self {
        Self { db, defaults }
    }

    fn default_view(&self, restaurant_id: Uuid) -> PosSettingsView {
        PosSettingsView {
            restaurant_id,
            tax_rate: Decimal::from_f64(self.defaults.tax_rate).unwrap_or(Decimal::TEN),
            service_charge_rate: Decimal::from_f64(self.defaults.service_charge_rate)
                .unwrap_or(Decimal::new(5, 0)),
            invoice_prefix: self.defaults.invoice_prefix.clone(),
            next_invoice_number: self.defaults.next_invoice_number,
            enable_auto_inventory: self.defaults.enable_auto_inventory,
            default_payment_method: Some(self.defaults.default_payment_method.clone()),
            rounding: RoundingMode::from_str(&self.defaults.rounding).unwrap_or(RoundingMode::None),
        }
    }

    fn view_from_model(model: pos_settings::Model) -> PosSettingsView {
        PosSettingsView {
            restaurant_id: model.restaurant_id,
            tax_rate: model.tax_rate,
            service_charge_rate: model.service_charge_rate,
            invoice_prefix: model.invoice_prefix,
            next_invoice_number: model.next_invoice_number,
            enable_auto_inventory: model.enable_auto_inventory,
            default_payment_method: model.default_payment_method,
            rounding: RoundingMode::from_str(&model.rounding).unwrap_or(RoundingMode::None),
        }
    }

    /// Build the row inserted for a freshly registered tenant.
    pub fn initial_row(&self, restaurant_id: Uuid) -> pos_settings::ActiveModel {
        let view = self.default_view(restaurant_id);
        pos_settings::ActiveModel {
            restaurant_id: Set(restaurant_id),
            tax_rate: Set(view.tax_rate),
            service_charge_rate: Set(view.service_charge_rate),
            invoice_prefix: Set(view.invoice_prefix),
            next_invoice_number: Set(view.next_invoice_number),
            enable_auto_inventory: Set(view.enable_auto_inventory),
            default_payment_method: Set(view.default_payment_method),
            rounding: Set(view.rounding.as_str().to_string()),
            updated_at: Set(Some(Utc::now())),
        }
    }

    /// Resolve settings on an arbitrary connection (used inside order
    /// transactions).
    pub async fn get_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        restaurant_id: Uuid,
    ) -> Result<PosSettingsView, ServiceError> {
        let row = PosSettingsEntity::find_by_id(restaurant_id).one(conn).await?;
        Ok(match row {
            Some(model) => Self::view_from_model(model),
            None => self.default_view(restaurant_id),
        })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, restaurant_id: Uuid) -> Result<PosSettingsView, ServiceError> {
        self.get_in(&*self.db, restaurant_id).await
    }

    /// Upsert settings for a tenant.
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        restaurant_id: Uuid,
        request: UpdatePosSettingsRequest,
    ) -> Result<PosSettingsView, ServiceError> {
        request.validate()?;

        for rate in [&request.tax_rate, &request.service_charge_rate]
            .into_iter()
            .flatten()
        {
            if *rate < Decimal::ZERO || *rate > Decimal::ONE_HUNDRED {
                return Err(ServiceError::ValidationError(
                    "rates are percentages and must be between 0 and 100".to_string(),
                ));
            }
        }

        let rounding = match &request.rounding {
            Some(raw) => Some(RoundingMode::from_str(raw).ok_or_else(|| {
                ServiceError::ValidationError(format!("Unknown rounding mode: {raw}"))
            })?),
            None => None,
        };

        let db = &*self.db;
        let txn = db.begin().await?;

        let existing = PosSettingsEntity::find_by_id(restaurant_id).one(&txn).await?;
        let exists = existing.is_some();
        let mut active = match existing {
            Some(model) => pos_settings::ActiveModel::from(model),
            None => self.initial_row(restaurant_id),
        };

        if let Some(rate) = request.tax_rate {
            active.tax_rate = Set(rate);
        }
        if let Some(rate) = request.service_charge_rate {
            active.service_charge_rate = Set(rate);
        }
        if let Some(prefix) = request.invoice_prefix {
            active.invoice_prefix = Set(prefix);
        }
        if let Some(enabled) = request.enable_auto_inventory {
            active.enable_auto_inventory = Set(enabled);
        }
        if let Some(method) = request.default_payment_method {
            active.default_payment_method = Set(Some(method));
        }
        if let Some(mode) = rounding {
            active.rounding = Set(mode.as_str().to_string());
        }
        active.updated_at = Set(Some(Utc::now()));

        let model = if exists {
            active.update(&txn).await?
        } else {
            active.insert(&txn).await?
        };

        txn.commit().await?;

        Ok(Self::view_from_model(model))
    }

    /// Allocate the next invoice number inside the caller's transaction and
    /// return the formatted order number.
    pub async fn issue_order_number<C: ConnectionTrait>(
        &self,
        conn: &C,
        restaurant_id: Uuid,
    ) -> Result<String, ServiceError> {
        let existing = PosSettingsEntity::find_by_id(restaurant_id).one(conn).await?;

        match existing {
            Some(model) => {
                let number = model.next_invoice_number;
                let prefix = model.invoice_prefix.clone();
                let mut active = pos_settings::ActiveModel::from(model);
                active.next_invoice_number = Set(number + 1);
                active.updated_at = Set(Some(Utc::now()));
                active.update(conn).await?;
                Ok(format_order_number(&prefix, number))
            }
            None => {
                // First order for a tenant that never saved settings:
                // persist the row so the sequence continues from here.
                let number = self.defaults.next_invoice_number;
                let mut row = self.initial_row(restaurant_id);
                row.next_invoice_number = Set(number + 1);
                row.insert(conn).await?;
                Ok(format_order_number(&self.defaults.invoice_prefix, number))
            }
        }
    }
}

pub fn format_order_number(prefix: &str, number: i64) -> String {
    format!("{}{:04}", prefix, number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_numbers_are_zero_padded() {
        assert_eq!(format_order_number("INV", 1001), "INV1001");
        assert_eq!(format_order_number("INV", 7), "INV0007");
        assert_eq!(format_order_number("T-", 12345), "T-12345");
    }

    #[test]
    fn defaults_resolve_to_a_usable_view() {
        let service = SettingsService::new(
            Arc::new(DatabaseConnection::Disconnected),
            PosDefaults::default(),
        );
        let view = service.default_view(Uuid::new_v4());
        assert_eq!(view.tax_rate, Decimal::TEN);
        assert_eq!(view.service_charge_rate, Decimal::new(5, 0));
        assert_eq!(view.rounding, RoundingMode::None);
        assert!(view.enable_auto_inventory);
    }
}
