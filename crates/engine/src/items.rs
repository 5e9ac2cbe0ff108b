//! Items table (raw materials).
//!
//! Items are reference data to the engine: resolved as a set during
//! eligibility validation, never mutated here. The display name recorded on
//! runs travels in the request payload, so a later rename of an item does not
//! rewrite history.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
