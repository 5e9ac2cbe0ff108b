//! The module contains the `Unit` struct and the primary-unit classifier.
//!
//! Raw-material depletion always happens in a mass or volume unit (the
//! Kilogram/Litre family); packing units carry no such restriction.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

/// Unit name fragments that mark a mass or volume unit.
const PRIMARY_NAME_TOKENS: [&str; 4] = ["KILOGRAM", "KILO", "LITRE", "LITER"];

/// Abbreviations accepted as mass or volume units.
///
/// Single-letter tokens are matched exactly against the abbreviation only,
/// never as a name substring ("L" would otherwise match almost any name).
const PRIMARY_ABBREVIATIONS: [&str; 6] = ["KG", "L", "KILO", "KILOGRAM", "LITRE", "LITER"];

/// Returns true when the unit belongs to the Kilogram/Litre family.
///
/// Pure function of the unit's name and abbreviation: case-insensitive
/// substring match on the name, exact (case-insensitive) match on the
/// abbreviation.
pub fn is_litre_or_kg(name: &str, abbreviation: &str) -> bool {
    let name = name.to_uppercase();
    let abbreviation = abbreviation.trim().to_uppercase();

    PRIMARY_NAME_TOKENS.iter().any(|token| name.contains(*token))
        || PRIMARY_ABBREVIATIONS
            .iter()
            .any(|token| abbreviation == *token)
}

/// A measurement unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: Uuid,
    pub name: String,
    pub abbreviation: String,
}

impl Unit {
    /// Short human-readable label used in depletion failure messages.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.abbreviation)
    }

    pub fn is_primary(&self) -> bool {
        is_litre_or_kg(&self.name, &self.abbreviation)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "units")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub abbreviation: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Unit {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&model.id)
            .map_err(|_| EngineError::InvalidId("invalid unit id".to_string()))?;
        Ok(Self {
            id,
            name: model.name,
            abbreviation: model.abbreviation,
        })
    }
}
