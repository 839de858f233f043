//! End-to-end service tests for the order/inventory flow: atomic creation
//! with automatic deduction, voiding with restoration, and ledger
//! reconciliation.
//!
//! These run against a real database and are ignored by default; set
//! DATABASE_URL and run `cargo test -- --ignored` to execute them.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use rms_api::config::PosDefaults;
use rms_api::entities::inventory_transaction::{
    Column as LedgerColumn, Entity as LedgerEntity, TransactionReason,
};
use rms_api::entities::order::OrderStatus;
use rms_api::errors::ServiceError;
use rms_api::events::EventSender;
use rms_api::handlers::AppServices;
use rms_api::services::inventory::CreateInventoryItemRequest;
use rms_api::services::menu::{CreateMenuItemRequest, IngredientInput};
use rms_api::services::orders::{CreateOrderItemRequest, CreateOrderRequest, VoidOrderRequest};
use rms_api::services::restaurants::RegisterRestaurantRequest;
use rms_api::services::RequestCtx;

struct TestEnv {
    services: AppServices,
    // Keeps the event channel open for the lifetime of the test.
    _event_rx: mpsc::Receiver<rms_api::events::Event>,
}

async fn test_env() -> TestEnv {
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");
    let db = rms_api::db::establish_connection(&database_url)
        .await
        .expect("database connection");
    rms_api::db::run_migrations(&db).await.expect("migrations");

    let db = Arc::new(db);
    let (event_tx, event_rx) = mpsc::channel(256);
    let event_sender = EventSender::new(event_tx);

    let auth_cfg = rms_api::auth::AuthConfig::new(
        "integration_test_secret_that_is_long_enough_for_hs256".to_string(),
        "rms-auth".to_string(),
        "rms-api".to_string(),
        std::time::Duration::from_secs(3600),
    );
    let auth = Arc::new(rms_api::auth::AuthService::new(auth_cfg, db.clone()));

    TestEnv {
        services: AppServices::new(db, event_sender, auth, PosDefaults::default()),
        _event_rx: event_rx,
    }
}

async fn register_tenant(env: &TestEnv) -> RequestCtx {
    let suffix = Uuid::new_v4().simple().to_string();
    let registered = env
        .services
        .restaurants
        .register(RegisterRestaurantRequest {
            name: format!("Test Bistro {suffix}"),
            address: None,
            phone: None,
            email: None,
            owner_name: "Owner".to_string(),
            owner_email: format!("owner-{suffix}@example.com"),
            owner_password: "a-long-enough-password".to_string(),
        })
        .await
        .expect("registration");

    RequestCtx {
        restaurant_id: registered.restaurant.id,
        user_id: registered.owner.id,
    }
}

/// Seed one inventory item and a menu item whose recipe uses 2 units per
/// serving (the non-optional line) plus an optional garnish.
async fn seed_menu(env: &TestEnv, ctx: &RequestCtx, stock: Decimal) -> (Uuid, Uuid) {
    let flour = env
        .services
        .inventory
        .create_item(
            ctx,
            CreateInventoryItemRequest {
                name: "Flatbread base".to_string(),
                category: "Bakery".to_string(),
                current_stock: stock,
                min_stock: dec!(4),
                max_stock: dec!(500),
                unit: "pcs".to_string(),
                cost_per_unit: dec!(0.40),
                supplier_id: None,
                sku: None,
                barcode: None,
                location: None,
                expiry_date: None,
            },
        )
        .await
        .expect("inventory item");

    let garnish = env
        .services
        .inventory
        .create_item(
            ctx,
            CreateInventoryItemRequest {
                name: "Parsley".to_string(),
                category: "Produce".to_string(),
                current_stock: dec!(100),
                min_stock: dec!(5),
                max_stock: dec!(200),
                unit: "g".to_string(),
                cost_per_unit: dec!(0.02),
                supplier_id: None,
                sku: None,
                barcode: None,
                location: None,
                expiry_date: None,
            },
        )
        .await
        .expect("garnish item");

    let menu_item = env
        .services
        .menu
        .create_item(
            ctx,
            CreateMenuItemRequest {
                name: "Mezze plate".to_string(),
                description: None,
                category_id: None,
                price: dec!(10.00),
                available: Some(true),
                preparation_time_minutes: Some(10),
            },
        )
        .await
        .expect("menu item");

    env.services
        .menu
        .set_ingredients(
            ctx,
            menu_item.id,
            vec![
                IngredientInput {
                    inventory_item_id: flour.id,
                    quantity: dec!(2),
                    unit: "pcs".to_string(),
                    optional: false,
                },
                IngredientInput {
                    inventory_item_id: garnish.id,
                    quantity: dec!(3),
                    unit: "g".to_string(),
                    optional: true,
                },
            ],
        )
        .await
        .expect("recipe");

    (menu_item.id, flour.id)
}

fn order_request(menu_item_id: Uuid, quantity: i32) -> CreateOrderRequest {
    CreateOrderRequest {
        table_id: None,
        chair_id: None,
        order_type: "takeaway".to_string(),
        items: vec![CreateOrderItemRequest {
            menu_item_id,
            quantity,
            chair_id: None,
            notes: None,
        }],
        discount_percent: None,
        payment_method: None,
        notes: None,
    }
}

#[tokio::test]
#[ignore = "requires a database via DATABASE_URL"]
async fn order_creation_deducts_non_optional_ingredients_atomically() {
    let env = test_env().await;
    let ctx = register_tenant(&env).await;
    let (menu_item_id, stock_item_id) = seed_menu(&env, &ctx, dec!(20)).await;

    // One line of quantity 3, recipe needs 2 per serving -> one -6 row.
    let created = env
        .services
        .orders
        .create_order(&ctx, order_request(menu_item_id, 3))
        .await
        .expect("order");

    assert_eq!(created.order.subtotal, dec!(30.00));
    assert_eq!(created.order.tax, dec!(3.0000));
    assert_eq!(created.order.service_charge, dec!(1.5000));
    assert_eq!(created.order.total, dec!(34.5000));
    assert_eq!(created.items.len(), 1);

    let deductions = LedgerEntity::find()
        .filter(LedgerColumn::OrderId.eq(created.order.id))
        .filter(LedgerColumn::Reason.eq(TransactionReason::OrderUse.as_str()))
        .all(&*env.services.auth.db)
        .await
        .expect("ledger");
    // The optional garnish is skipped.
    assert_eq!(deductions.len(), 1);
    assert_eq!(deductions[0].quantity, dec!(-6));
    assert_eq!(deductions[0].inventory_item_id, stock_item_id);

    let stock_item = env
        .services
        .inventory
        .get_item(&ctx, stock_item_id)
        .await
        .expect("stock item");
    assert_eq!(stock_item.current_stock, dec!(14));
}

#[tokio::test]
#[ignore = "requires a database via DATABASE_URL"]
async fn voiding_restores_inventory_exactly_once() {
    let env = test_env().await;
    let ctx = register_tenant(&env).await;
    let (menu_item_id, stock_item_id) = seed_menu(&env, &ctx, dec!(20)).await;

    let created = env
        .services
        .orders
        .create_order(&ctx, order_request(menu_item_id, 3))
        .await
        .expect("order");

    let voided = env
        .services
        .orders
        .void_order(
            &ctx,
            created.order.id,
            VoidOrderRequest {
                reason: "guest walked out".to_string(),
            },
        )
        .await
        .expect("void");
    assert_eq!(voided.status, OrderStatus::Cancelled.as_str());

    let stock_item = env
        .services
        .inventory
        .get_item(&ctx, stock_item_id)
        .await
        .expect("stock item");
    assert_eq!(stock_item.current_stock, dec!(20));

    // A second void fails on the terminal status and must not touch the
    // ledger again.
    let second = env
        .services
        .orders
        .void_order(
            &ctx,
            created.order.id,
            VoidOrderRequest {
                reason: "double click".to_string(),
            },
        )
        .await;
    assert!(matches!(second, Err(ServiceError::InvalidStatus(_))));

    let adjustments = LedgerEntity::find()
        .filter(LedgerColumn::OrderId.eq(created.order.id))
        .filter(LedgerColumn::Reason.eq(TransactionReason::Adjustment.as_str()))
        .all(&*env.services.auth.db)
        .await
        .expect("ledger");
    assert_eq!(adjustments.len(), 1);
    assert_eq!(adjustments[0].quantity, dec!(6));
}

#[tokio::test]
#[ignore = "requires a database via DATABASE_URL"]
async fn ledger_always_reconciles_with_current_stock() {
    let env = test_env().await;
    let ctx = register_tenant(&env).await;
    let (menu_item_id, stock_item_id) = seed_menu(&env, &ctx, dec!(50)).await;

    for quantity in [1, 2, 5] {
        env.services
            .orders
            .create_order(&ctx, order_request(menu_item_id, quantity))
            .await
            .expect("order");
    }

    let signed_sum: Decimal = LedgerEntity::find()
        .filter(LedgerColumn::InventoryItemId.eq(stock_item_id))
        .all(&*env.services.auth.db)
        .await
        .expect("ledger")
        .iter()
        .map(|row| row.quantity)
        .sum();

    let stock_item = env
        .services
        .inventory
        .get_item(&ctx, stock_item_id)
        .await
        .expect("stock item");
    // Initial stock plus the signed ledger sum equals current stock.
    assert_eq!(dec!(50) + signed_sum, stock_item.current_stock);
}

#[tokio::test]
#[ignore = "requires a database via DATABASE_URL"]
async fn items_created_below_minimum_are_classified_low_stock() {
    let env = test_env().await;
    let ctx = register_tenant(&env).await;

    let item = env
        .services
        .inventory
        .create_item(
            &ctx,
            CreateInventoryItemRequest {
                name: "Saffron".to_string(),
                category: "Spices".to_string(),
                current_stock: dec!(5),
                min_stock: dec!(10),
                max_stock: dec!(50),
                unit: "g".to_string(),
                cost_per_unit: dec!(4.00),
                supplier_id: None,
                sku: None,
                barcode: None,
                location: None,
                expiry_date: None,
            },
        )
        .await
        .expect("item");

    assert_eq!(item.status, "low-stock");
}
