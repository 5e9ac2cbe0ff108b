//! Depletion records and the depletion planner.
//!
//! Depletion is split in two explicit phases. [`plan_depletions`] is phase
//! one: a pure function that, given the primary unit, the requested items and
//! the lots on hand, decides per item either a planned decrement or a typed
//! failure reason, accumulating every failure instead of stopping at the
//! first. Phase two (applying the decrements and writing the audit records)
//! lives in the engine ops and only runs when phase one produced no failure.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::commands::RunItemRequest;
use crate::{EngineError, InventoryLot, Unit};

/// Category stamped on every depletion record.
pub const DEPLETION_CATEGORY: &str = "DEPLETION";

/// Source tag identifying decrements performed by the manufacturing engine.
pub const DEPLETION_SOURCE: &str = "manufacturing";

/// Why a single item could not be depleted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DepletionReason {
    /// No lot for the item exists in the store, in any unit.
    NotInInventory,
    /// Lots exist, but none in the required primary unit.
    NotInRequiredUnit { unit_label: String },
    /// The matching lot holds less than the requested quantity.
    InsufficientStock { available: f64, required: f64 },
}

impl fmt::Display for DepletionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInInventory => write!(f, "Not found in store inventory"),
            Self::NotInRequiredUnit { unit_label } => {
                write!(f, "Not available in the required unit ({unit_label})")
            }
            Self::InsufficientStock {
                available,
                required,
            } => write!(
                f,
                "Insufficient stock. Available: {available}, Required: {required}"
            ),
        }
    }
}

/// One item that could not be depleted, with its reason.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DepletionFailure {
    pub item_id: Uuid,
    pub item_name: String,
    pub reason: DepletionReason,
}

impl fmt::Display for DepletionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.item_name, self.reason)
    }
}

/// A decrement decided by the planner but not yet applied.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedDepletion {
    pub lot_id: Uuid,
    pub item_id: Uuid,
    pub item_name: String,
    pub quantity: f64,
    pub remaining: f64,
}

/// Plans the depletion of every requested item against the lots on hand.
///
/// Returns one entry per request, in request order. Performs no I/O and
/// mutates nothing; failures accumulate so a caller sees every problem at
/// once. `remaining` is non-negative by construction: a plan is only produced
/// when the lot holds at least the requested quantity.
pub fn plan_depletions(
    primary_unit: &Unit,
    requests: &[RunItemRequest],
    lots_by_item: &HashMap<Uuid, Vec<InventoryLot>>,
) -> Vec<Result<PlannedDepletion, DepletionFailure>> {
    requests
        .iter()
        .map(|request| {
            let lots = lots_by_item
                .get(&request.item_id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            plan_one(primary_unit, request, lots)
        })
        .collect()
}

fn plan_one(
    primary_unit: &Unit,
    request: &RunItemRequest,
    lots: &[InventoryLot],
) -> Result<PlannedDepletion, DepletionFailure> {
    let fail = |reason| DepletionFailure {
        item_id: request.item_id,
        item_name: request.item_name.clone(),
        reason,
    };

    if lots.is_empty() {
        return Err(fail(DepletionReason::NotInInventory));
    }

    let lot = lots
        .iter()
        .find(|lot| lot.unit_id == primary_unit.id)
        .ok_or_else(|| {
            fail(DepletionReason::NotInRequiredUnit {
                unit_label: primary_unit.label(),
            })
        })?;

    if lot.quantity < request.quantity {
        return Err(fail(DepletionReason::InsufficientStock {
            available: lot.quantity,
            required: request.quantity,
        }));
    }

    Ok(PlannedDepletion {
        lot_id: lot.id,
        item_id: request.item_id,
        item_name: request.item_name.clone(),
        quantity: request.quantity,
        remaining: lot.quantity - request.quantity,
    })
}

/// An immutable audit entry for one applied decrement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DepletionRecord {
    pub id: Uuid,
    pub item_id: Uuid,
    pub store_id: String,
    pub unit_id: Uuid,
    pub category: String,
    pub quantity: f64,
    pub remaining: f64,
    pub source: String,
    pub description: String,
    pub recorded_by: String,
    pub created_at: DateTime<Utc>,
}

impl DepletionRecord {
    pub fn new(
        planned: &PlannedDepletion,
        store_id: String,
        unit_id: Uuid,
        recorded_by: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            item_id: planned.item_id,
            store_id,
            unit_id,
            category: DEPLETION_CATEGORY.to_string(),
            quantity: planned.quantity,
            remaining: planned.remaining,
            source: DEPLETION_SOURCE.to_string(),
            description: format!(
                "Raw material consumed for manufacturing: {}",
                planned.item_name
            ),
            recorded_by,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "depletion_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub item_id: String,
    pub store_id: String,
    pub unit_id: String,
    pub category: String,
    pub quantity: f64,
    pub remaining: f64,
    pub source: String,
    pub description: String,
    pub recorded_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::items::Entity",
        from = "Column::ItemId",
        to = "super::items::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Items,
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&DepletionRecord> for ActiveModel {
    fn from(record: &DepletionRecord) -> Self {
        Self {
            id: ActiveValue::Set(record.id.to_string()),
            item_id: ActiveValue::Set(record.item_id.to_string()),
            store_id: ActiveValue::Set(record.store_id.clone()),
            unit_id: ActiveValue::Set(record.unit_id.to_string()),
            category: ActiveValue::Set(record.category.clone()),
            quantity: ActiveValue::Set(record.quantity),
            remaining: ActiveValue::Set(record.remaining),
            source: ActiveValue::Set(record.source.clone()),
            description: ActiveValue::Set(record.description.clone()),
            recorded_by: ActiveValue::Set(record.recorded_by.clone()),
            created_at: ActiveValue::Set(record.created_at),
        }
    }
}

impl TryFrom<Model> for DepletionRecord {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&model.id)
            .map_err(|_| EngineError::InvalidId("invalid depletion record id".to_string()))?;
        let item_id = Uuid::parse_str(&model.item_id)
            .map_err(|_| EngineError::InvalidId("invalid item id".to_string()))?;
        let unit_id = Uuid::parse_str(&model.unit_id)
            .map_err(|_| EngineError::InvalidId("invalid unit id".to_string()))?;
        Ok(Self {
            id,
            item_id,
            store_id: model.store_id,
            unit_id,
            category: model.category,
            quantity: model.quantity,
            remaining: model.remaining,
            source: model.source,
            description: model.description,
            recorded_by: model.recorded_by,
            created_at: model.created_at,
        })
    }
}
