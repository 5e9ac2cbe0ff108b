//! Stores table.
//!
//! A store is a physical location holding inventory lots. The set of
//! employees allowed to operate against a store lives in the
//! `store_operators` membership table; the engine only ever reads both.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "stores")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::store_operators::Entity")]
    StoreOperators,
    #[sea_orm(has_many = "super::inventory::Entity")]
    InventoryLots,
}

impl Related<super::store_operators::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StoreOperators.def()
    }
}

impl Related<super::inventory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryLots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
