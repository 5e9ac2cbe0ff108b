//! Initial schema migration - creates all tables from scratch.
//!
//! It creates the complete schema for Opificio:
//!
//! - `employees`: authentication and operator identity
//! - `stores`: physical locations holding inventory
//! - `store_operators`: which employees may operate against a store
//! - `units`: measurement units (mass/volume and packing)
//! - `items`: raw material reference data
//! - `inventory_lots`: one (item, store, unit) row with a quantity
//! - `depletion_records`: immutable audit trail of inventory decrements
//! - `manufacturing_runs`: one manufacturing attempt with its items payload

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Employees {
    Table,
    Id,
    Name,
    Password,
}

#[derive(Iden)]
enum Stores {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum StoreOperators {
    Table,
    StoreId,
    EmployeeId,
}

#[derive(Iden)]
enum Units {
    Table,
    Id,
    Name,
    Abbreviation,
}

#[derive(Iden)]
enum Items {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum InventoryLots {
    Table,
    Id,
    ItemId,
    StoreId,
    UnitId,
    Quantity,
}

#[derive(Iden)]
enum DepletionRecords {
    Table,
    Id,
    ItemId,
    StoreId,
    UnitId,
    Category,
    Quantity,
    Remaining,
    Source,
    Description,
    RecordedBy,
    CreatedAt,
}

#[derive(Iden)]
enum ManufacturingRuns {
    Table,
    Id,
    StoreId,
    PrimaryUnitId,
    PackingUnitId,
    TotalQuantity,
    EstimatedOutput,
    ActualOutput,
    Status,
    Items,
    CreatedBy,
    Note,
    CreatedAt,
    UpdatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Employees
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Employees::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Employees::Name).string().not_null())
                    .col(ColumnDef::new(Employees::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Stores
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Stores::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Stores::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Stores::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Store Operators
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(StoreOperators::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(StoreOperators::StoreId).string().not_null())
                    .col(
                        ColumnDef::new(StoreOperators::EmployeeId)
                            .string()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(StoreOperators::StoreId)
                            .col(StoreOperators::EmployeeId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-store_operators-store_id")
                            .from(StoreOperators::Table, StoreOperators::StoreId)
                            .to(Stores::Table, Stores::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-store_operators-employee_id")
                            .from(StoreOperators::Table, StoreOperators::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-store_operators-employee_id")
                    .table(StoreOperators::Table)
                    .col(StoreOperators::EmployeeId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Units
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Units::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Units::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Units::Name).string().not_null())
                    .col(ColumnDef::new(Units::Abbreviation).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Items
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Items::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Items::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Items::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Inventory Lots
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(InventoryLots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InventoryLots::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InventoryLots::ItemId).string().not_null())
                    .col(ColumnDef::new(InventoryLots::StoreId).string().not_null())
                    .col(ColumnDef::new(InventoryLots::UnitId).string().not_null())
                    .col(
                        ColumnDef::new(InventoryLots::Quantity)
                            .double()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-inventory_lots-item_id")
                            .from(InventoryLots::Table, InventoryLots::ItemId)
                            .to(Items::Table, Items::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-inventory_lots-store_id")
                            .from(InventoryLots::Table, InventoryLots::StoreId)
                            .to(Stores::Table, Stores::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-inventory_lots-unit_id")
                            .from(InventoryLots::Table, InventoryLots::UnitId)
                            .to(Units::Table, Units::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // One lot per (item, store, unit) triple.
        manager
            .create_index(
                Index::create()
                    .name("idx-inventory_lots-item-store-unit-unique")
                    .table(InventoryLots::Table)
                    .col(InventoryLots::ItemId)
                    .col(InventoryLots::StoreId)
                    .col(InventoryLots::UnitId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-inventory_lots-store_id")
                    .table(InventoryLots::Table)
                    .col(InventoryLots::StoreId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Depletion Records
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(DepletionRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DepletionRecords::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DepletionRecords::ItemId).string().not_null())
                    .col(
                        ColumnDef::new(DepletionRecords::StoreId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DepletionRecords::UnitId).string().not_null())
                    .col(
                        ColumnDef::new(DepletionRecords::Category)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DepletionRecords::Quantity)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DepletionRecords::Remaining)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DepletionRecords::Source).string().not_null())
                    .col(
                        ColumnDef::new(DepletionRecords::Description)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DepletionRecords::RecordedBy)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DepletionRecords::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-depletion_records-item_id")
                            .from(DepletionRecords::Table, DepletionRecords::ItemId)
                            .to(Items::Table, Items::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-depletion_records-store_id")
                            .from(DepletionRecords::Table, DepletionRecords::StoreId)
                            .to(Stores::Table, Stores::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-depletion_records-store_id-created_at")
                    .table(DepletionRecords::Table)
                    .col(DepletionRecords::StoreId)
                    .col(DepletionRecords::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Manufacturing Runs
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ManufacturingRuns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ManufacturingRuns::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ManufacturingRuns::StoreId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ManufacturingRuns::PrimaryUnitId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ManufacturingRuns::PackingUnitId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ManufacturingRuns::TotalQuantity)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ManufacturingRuns::EstimatedOutput)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ManufacturingRuns::ActualOutput).double())
                    .col(ColumnDef::new(ManufacturingRuns::Status).string().not_null())
                    .col(ColumnDef::new(ManufacturingRuns::Items).text().not_null())
                    .col(
                        ColumnDef::new(ManufacturingRuns::CreatedBy)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ManufacturingRuns::Note).string())
                    .col(
                        ColumnDef::new(ManufacturingRuns::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ManufacturingRuns::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-manufacturing_runs-store_id")
                            .from(ManufacturingRuns::Table, ManufacturingRuns::StoreId)
                            .to(Stores::Table, Stores::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-manufacturing_runs-primary_unit_id")
                            .from(ManufacturingRuns::Table, ManufacturingRuns::PrimaryUnitId)
                            .to(Units::Table, Units::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-manufacturing_runs-packing_unit_id")
                            .from(ManufacturingRuns::Table, ManufacturingRuns::PackingUnitId)
                            .to(Units::Table, Units::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-manufacturing_runs-created_by")
                            .from(ManufacturingRuns::Table, ManufacturingRuns::CreatedBy)
                            .to(Employees::Table, Employees::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-manufacturing_runs-store_id-created_at")
                    .table(ManufacturingRuns::Table)
                    .col(ManufacturingRuns::StoreId)
                    .col(ManufacturingRuns::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(ManufacturingRuns::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DepletionRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InventoryLots::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Items::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Units::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StoreOperators::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Stores::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Employees::Table).to_owned())
            .await?;
        Ok(())
    }
}
