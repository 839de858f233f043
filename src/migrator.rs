//! Embedded schema migrations, run at startup when `auto_migrate` is set.

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_restaurants_and_users::Migration),
            Box::new(m20240101_000002_create_inventory_tables::Migration),
            Box::new(m20240101_000003_create_menu_tables::Migration),
            Box::new(m20240101_000004_create_order_tables::Migration),
            Box::new(m20240101_000005_create_seating_tables::Migration),
            Box::new(m20240101_000006_create_pos_settings::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_restaurants_and_users {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_restaurants_and_users"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Restaurants::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Restaurants::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Restaurants::Name).string().not_null())
                        .col(ColumnDef::new(Restaurants::Address).string().null())
                        .col(ColumnDef::new(Restaurants::Phone).string().null())
                        .col(ColumnDef::new(Restaurants::Email).string().null())
                        .col(
                            ColumnDef::new(Restaurants::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Restaurants::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Users::RestaurantId).uuid().null())
                        .col(ColumnDef::new(Users::Name).string().not_null())
                        .col(ColumnDef::new(Users::Email).string().not_null())
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Users::Role).string().not_null())
                        .col(
                            ColumnDef::new(Users::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Users::LastLogin)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Users::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_users_restaurant")
                                .from(Users::Table, Users::RestaurantId)
                                .to(Restaurants::Table, Restaurants::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_users_email")
                        .table(Users::Table)
                        .col(Users::Email)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_users_restaurant_id")
                        .table(Users::Table)
                        .col(Users::RestaurantId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Restaurants::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Restaurants {
        Table,
        Id,
        Name,
        Address,
        Phone,
        Email,
        Active,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
        RestaurantId,
        Name,
        Email,
        PasswordHash,
        Role,
        Active,
        LastLogin,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_inventory_tables {
    use super::m20240101_000001_create_restaurants_and_users::Restaurants;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_inventory_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::RestaurantId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryItems::Name).string().not_null())
                        .col(ColumnDef::new(InventoryItems::Category).string().not_null())
                        .col(
                            ColumnDef::new(InventoryItems::CurrentStock)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::MinStock)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::MaxStock)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(InventoryItems::Unit).string().not_null())
                        .col(
                            ColumnDef::new(InventoryItems::CostPerUnit)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(InventoryItems::SupplierId).uuid().null())
                        .col(ColumnDef::new(InventoryItems::Sku).string().null())
                        .col(ColumnDef::new(InventoryItems::Barcode).string().null())
                        .col(ColumnDef::new(InventoryItems::Location).string().null())
                        .col(ColumnDef::new(InventoryItems::ExpiryDate).date().null())
                        .col(ColumnDef::new(InventoryItems::Status).string().not_null())
                        .col(
                            ColumnDef::new(InventoryItems::LastRestocked)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventory_items_restaurant")
                                .from(InventoryItems::Table, InventoryItems::RestaurantId)
                                .to(Restaurants::Table, Restaurants::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_items_restaurant_id")
                        .table(InventoryItems::Table)
                        .col(InventoryItems::RestaurantId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_items_status")
                        .table(InventoryItems::Table)
                        .col(InventoryItems::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(InventoryTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryTransactions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::RestaurantId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::InventoryItemId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryTransactions::OrderId).uuid().null())
                        .col(
                            ColumnDef::new(InventoryTransactions::Quantity)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::Reason)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryTransactions::Notes).string().null())
                        .col(
                            ColumnDef::new(InventoryTransactions::CreatedBy)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventory_transactions_item")
                                .from(
                                    InventoryTransactions::Table,
                                    InventoryTransactions::InventoryItemId,
                                )
                                .to(InventoryItems::Table, InventoryItems::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_transactions_item_id")
                        .table(InventoryTransactions::Table)
                        .col(InventoryTransactions::InventoryItemId)
                        .to_owned(),
                )
                .await?;

            // Order-linked rows back the idempotency checks in deduction
            // and restoration.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_transactions_order_id")
                        .table(InventoryTransactions::Table)
                        .col(InventoryTransactions::OrderId)
                        .col(InventoryTransactions::Reason)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(WasteLog::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(WasteLog::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(WasteLog::RestaurantId).uuid().not_null())
                        .col(ColumnDef::new(WasteLog::InventoryItemId).uuid().not_null())
                        .col(ColumnDef::new(WasteLog::Quantity).decimal().not_null())
                        .col(ColumnDef::new(WasteLog::Reason).string().not_null())
                        .col(
                            ColumnDef::new(WasteLog::Cost)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(WasteLog::ReportedBy).uuid().not_null())
                        .col(
                            ColumnDef::new(WasteLog::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_waste_log_item")
                                .from(WasteLog::Table, WasteLog::InventoryItemId)
                                .to(InventoryItems::Table, InventoryItems::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(WasteLog::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(InventoryTransactions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(InventoryItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum InventoryItems {
        Table,
        Id,
        RestaurantId,
        Name,
        Category,
        CurrentStock,
        MinStock,
        MaxStock,
        Unit,
        CostPerUnit,
        SupplierId,
        Sku,
        Barcode,
        Location,
        ExpiryDate,
        Status,
        LastRestocked,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum InventoryTransactions {
        Table,
        Id,
        RestaurantId,
        InventoryItemId,
        OrderId,
        Quantity,
        Reason,
        Notes,
        CreatedBy,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum WasteLog {
        Table,
        Id,
        RestaurantId,
        InventoryItemId,
        Quantity,
        Reason,
        Cost,
        ReportedBy,
        CreatedAt,
    }
}

mod m20240101_000003_create_menu_tables {
    use super::m20240101_000002_create_inventory_tables::InventoryItems;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_menu_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MenuCategories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MenuCategories::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MenuCategories::RestaurantId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MenuCategories::Name).string().not_null())
                        .col(
                            ColumnDef::new(MenuCategories::DisplayOrder)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(MenuCategories::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(MenuCategories::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(MenuItems::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(MenuItems::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(MenuItems::RestaurantId).uuid().not_null())
                        .col(ColumnDef::new(MenuItems::CategoryId).uuid().null())
                        .col(ColumnDef::new(MenuItems::Name).string().not_null())
                        .col(ColumnDef::new(MenuItems::Description).string().null())
                        .col(
                            ColumnDef::new(MenuItems::Price)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(MenuItems::Available)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(MenuItems::PreparationTimeMinutes)
                                .integer()
                                .not_null()
                                .default(15),
                        )
                        .col(
                            ColumnDef::new(MenuItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MenuItems::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_menu_items_category")
                                .from(MenuItems::Table, MenuItems::CategoryId)
                                .to(MenuCategories::Table, MenuCategories::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_menu_items_restaurant_id")
                        .table(MenuItems::Table)
                        .col(MenuItems::RestaurantId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(MenuIngredients::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MenuIngredients::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MenuIngredients::MenuItemId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MenuIngredients::InventoryItemId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MenuIngredients::Quantity)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MenuIngredients::Unit).string().not_null())
                        .col(
                            ColumnDef::new(MenuIngredients::Optional)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_menu_ingredients_menu_item")
                                .from(MenuIngredients::Table, MenuIngredients::MenuItemId)
                                .to(MenuItems::Table, MenuItems::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_menu_ingredients_inventory_item")
                                .from(MenuIngredients::Table, MenuIngredients::InventoryItemId)
                                .to(InventoryItems::Table, InventoryItems::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_menu_ingredients_menu_item_id")
                        .table(MenuIngredients::Table)
                        .col(MenuIngredients::MenuItemId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_menu_ingredients_inventory_item_id")
                        .table(MenuIngredients::Table)
                        .col(MenuIngredients::InventoryItemId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MenuIngredients::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(MenuItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(MenuCategories::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum MenuCategories {
        Table,
        Id,
        RestaurantId,
        Name,
        DisplayOrder,
        Active,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum MenuItems {
        Table,
        Id,
        RestaurantId,
        CategoryId,
        Name,
        Description,
        Price,
        Available,
        PreparationTimeMinutes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum MenuIngredients {
        Table,
        Id,
        MenuItemId,
        InventoryItemId,
        Quantity,
        Unit,
        Optional,
    }
}

mod m20240101_000004_create_order_tables {
    use super::m20240101_000003_create_menu_tables::MenuItems;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Orders::RestaurantId).uuid().not_null())
                        .col(ColumnDef::new(Orders::OrderNumber).string().not_null())
                        .col(ColumnDef::new(Orders::TableId).uuid().null())
                        .col(ColumnDef::new(Orders::ChairId).uuid().null())
                        .col(ColumnDef::new(Orders::ServerId).uuid().not_null())
                        .col(ColumnDef::new(Orders::OrderType).string().not_null())
                        .col(ColumnDef::new(Orders::Status).string().not_null())
                        .col(
                            ColumnDef::new(Orders::Subtotal)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Orders::Tax).decimal().not_null().default(0))
                        .col(
                            ColumnDef::new(Orders::ServiceCharge)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::Discount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::Total)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Orders::PaymentMethod).string().null())
                        .col(ColumnDef::new(Orders::PaymentStatus).string().not_null())
                        .col(ColumnDef::new(Orders::Notes).string().null())
                        .col(
                            ColumnDef::new(Orders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(Orders::Version).integer().not_null().default(1))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_restaurant_id")
                        .table(Orders::Table)
                        .col(Orders::RestaurantId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_status")
                        .table(Orders::Table)
                        .col(Orders::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_order_number")
                        .table(Orders::Table)
                        .col(Orders::RestaurantId)
                        .col(Orders::OrderNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderItems::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::MenuItemId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::ChairId).uuid().null())
                        .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(OrderItems::PriceAtTime)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(OrderItems::Status).string().not_null())
                        .col(ColumnDef::new(OrderItems::Notes).string().null())
                        .col(
                            ColumnDef::new(OrderItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_order")
                                .from(OrderItems::Table, OrderItems::OrderId)
                                .to(Orders::Table, Orders::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_menu_item")
                                .from(OrderItems::Table, OrderItems::MenuItemId)
                                .to(MenuItems::Table, MenuItems::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_items_order_id")
                        .table(OrderItems::Table)
                        .col(OrderItems::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
        RestaurantId,
        OrderNumber,
        TableId,
        ChairId,
        ServerId,
        OrderType,
        Status,
        Subtotal,
        Tax,
        ServiceCharge,
        Discount,
        Total,
        PaymentMethod,
        PaymentStatus,
        Notes,
        CreatedAt,
        UpdatedAt,
        Version,
    }

    #[derive(DeriveIden)]
    enum OrderItems {
        Table,
        Id,
        OrderId,
        MenuItemId,
        ChairId,
        Quantity,
        PriceAtTime,
        Status,
        Notes,
        CreatedAt,
    }
}

mod m20240101_000005_create_seating_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_seating_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(DiningTables::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DiningTables::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DiningTables::RestaurantId).uuid().not_null())
                        .col(ColumnDef::new(DiningTables::Number).string().not_null())
                        .col(ColumnDef::new(DiningTables::Section).string().null())
                        .col(ColumnDef::new(DiningTables::Capacity).integer().not_null())
                        .col(ColumnDef::new(DiningTables::Status).string().not_null())
                        .col(
                            ColumnDef::new(DiningTables::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_dining_tables_restaurant_number")
                        .table(DiningTables::Table)
                        .col(DiningTables::RestaurantId)
                        .col(DiningTables::Number)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Chairs::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Chairs::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Chairs::TableId).uuid().not_null())
                        .col(ColumnDef::new(Chairs::Number).string().not_null())
                        .col(ColumnDef::new(Chairs::Status).string().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_chairs_table")
                                .from(Chairs::Table, Chairs::TableId)
                                .to(DiningTables::Table, DiningTables::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_chairs_table_id")
                        .table(Chairs::Table)
                        .col(Chairs::TableId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Chairs::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(DiningTables::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum DiningTables {
        Table,
        Id,
        RestaurantId,
        Number,
        Section,
        Capacity,
        Status,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Chairs {
        Table,
        Id,
        TableId,
        Number,
        Status,
    }
}

mod m20240101_000006_create_pos_settings {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_pos_settings"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PosSettings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PosSettings::RestaurantId)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PosSettings::TaxRate)
                                .decimal()
                                .not_null()
                                .default(10),
                        )
                        .col(
                            ColumnDef::new(PosSettings::ServiceChargeRate)
                                .decimal()
                                .not_null()
                                .default(5),
                        )
                        .col(
                            ColumnDef::new(PosSettings::InvoicePrefix)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PosSettings::NextInvoiceNumber)
                                .big_integer()
                                .not_null()
                                .default(1001),
                        )
                        .col(
                            ColumnDef::new(PosSettings::EnableAutoInventory)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(PosSettings::DefaultPaymentMethod)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(PosSettings::Rounding).string().not_null())
                        .col(
                            ColumnDef::new(PosSettings::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PosSettings::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum PosSettings {
        Table,
        RestaurantId,
        TaxRate,
        ServiceChargeRate,
        InvoicePrefix,
        NextInvoiceNumber,
        EnableAutoInventory,
        DefaultPaymentMethod,
        Rounding,
        UpdatedAt,
    }
}
