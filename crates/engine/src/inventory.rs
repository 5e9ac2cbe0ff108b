//! Inventory lots.
//!
//! A lot is one (item, store, unit) row with a non-negative quantity; the
//! triple is unique (enforced by a database index). Lot quantities are
//! mutated exclusively by the engine's depletion step.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

/// A single inventory lot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventoryLot {
    pub id: Uuid,
    pub item_id: Uuid,
    pub store_id: String,
    pub unit_id: Uuid,
    pub quantity: f64,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "inventory_lots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub item_id: String,
    pub store_id: String,
    pub unit_id: String,
    pub quantity: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stores::Entity",
        from = "Column::StoreId",
        to = "super::stores::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Stores,
    #[sea_orm(
        belongs_to = "super::items::Entity",
        from = "Column::ItemId",
        to = "super::items::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Items,
    #[sea_orm(
        belongs_to = "super::units::Entity",
        from = "Column::UnitId",
        to = "super::units::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Units,
}

impl Related<super::stores::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stores.def()
    }
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::units::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Units.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for InventoryLot {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&model.id)
            .map_err(|_| EngineError::InvalidId("invalid lot id".to_string()))?;
        let item_id = Uuid::parse_str(&model.item_id)
            .map_err(|_| EngineError::InvalidId("invalid item id".to_string()))?;
        let unit_id = Uuid::parse_str(&model.unit_id)
            .map_err(|_| EngineError::InvalidId("invalid unit id".to_string()))?;
        Ok(Self {
            id,
            item_id,
            store_id: model.store_id,
            unit_id,
            quantity: model.quantity,
        })
    }
}
