//! Manufacturing runs.
//!
//! A run is born `PENDING` and moves exactly once to one of the three
//! terminal yield-variance statuses when it is completed. The requested items
//! travel with the run as a versioned payload: a stable historical record of
//! what was asked for at creation time, never re-validated against live
//! inventory afterwards.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{DepletionRecord, EngineError, ResultEngine};

/// Output shortfall (estimated − actual) at or above which a completed run is
/// flagged as wastage.
pub const WASTAGE_THRESHOLD: f64 = 5.0;

/// Current version of the items payload written to new runs.
pub const ITEMS_PAYLOAD_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Pending,
    GoodUtilization,
    WastageDetected,
    Normal,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::GoodUtilization => "GOOD_UTILIZATION",
            Self::WastageDetected => "WASTAGE_DETECTED",
            Self::Normal => "NORMAL",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl TryFrom<&str> for RunStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "PENDING" => Ok(Self::Pending),
            "GOOD_UTILIZATION" => Ok(Self::GoodUtilization),
            "WASTAGE_DETECTED" => Ok(Self::WastageDetected),
            "NORMAL" => Ok(Self::Normal),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid run status: {other}"
            ))),
        }
    }
}

/// Derives the terminal status of a completed run.
///
/// Producing more than estimated is good utilization, falling short by
/// [`WASTAGE_THRESHOLD`] or more is wastage, anything else (including exact
/// equality, where the difference is 0) is normal.
pub fn derive_status(estimated_output: f64, actual_output: f64) -> RunStatus {
    if actual_output > estimated_output {
        RunStatus::GoodUtilization
    } else if estimated_output - actual_output >= WASTAGE_THRESHOLD {
        RunStatus::WastageDetected
    } else {
        RunStatus::Normal
    }
}

/// One requested item as recorded on the run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunItem {
    pub item_id: Uuid,
    pub item_name: String,
    pub requested_qty: f64,
}

/// The versioned items payload stored on the run row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunItemsPayload {
    pub version: u32,
    pub items: Vec<RunItem>,
}

impl RunItemsPayload {
    pub fn new(items: Vec<RunItem>) -> Self {
        Self {
            version: ITEMS_PAYLOAD_VERSION,
            items,
        }
    }

    pub(crate) fn encode(&self) -> ResultEngine<String> {
        serde_json::to_string(self)
            .map_err(|_| EngineError::InvalidAmount("invalid items payload".to_string()))
    }

    fn decode(raw: &str) -> ResultEngine<Self> {
        serde_json::from_str(raw)
            .map_err(|_| EngineError::InvalidAmount("invalid items payload".to_string()))
    }
}

/// A manufacturing run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManufacturingRun {
    pub id: Uuid,
    pub store_id: String,
    pub primary_unit_id: Uuid,
    pub packing_unit_id: Uuid,
    pub total_quantity: f64,
    pub estimated_output: f64,
    pub actual_output: Option<f64>,
    pub status: RunStatus,
    pub items: Vec<RunItem>,
    pub created_by: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ManufacturingRun {
    pub fn new(
        store_id: String,
        primary_unit_id: Uuid,
        packing_unit_id: Uuid,
        total_quantity: f64,
        estimated_output: f64,
        items: Vec<RunItem>,
        created_by: String,
        note: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            store_id,
            primary_unit_id,
            packing_unit_id,
            total_quantity,
            estimated_output,
            actual_output: None,
            status: RunStatus::Pending,
            items,
            created_by,
            note,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The result of a successful run creation: the run plus the depletion
/// records written alongside it in the same transaction.
#[derive(Clone, Debug, PartialEq)]
pub struct RunCreation {
    pub run: ManufacturingRun,
    pub depletions: Vec<DepletionRecord>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "manufacturing_runs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub store_id: String,
    pub primary_unit_id: String,
    pub packing_unit_id: String,
    pub total_quantity: f64,
    pub estimated_output: f64,
    pub actual_output: Option<f64>,
    pub status: String,
    pub items: String,
    pub created_by: String,
    pub note: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
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
}

impl Related<super::stores::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stores.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&ManufacturingRun> for ActiveModel {
    type Error = EngineError;

    fn try_from(run: &ManufacturingRun) -> Result<Self, Self::Error> {
        let items = RunItemsPayload::new(run.items.clone()).encode()?;
        Ok(Self {
            id: ActiveValue::Set(run.id.to_string()),
            store_id: ActiveValue::Set(run.store_id.clone()),
            primary_unit_id: ActiveValue::Set(run.primary_unit_id.to_string()),
            packing_unit_id: ActiveValue::Set(run.packing_unit_id.to_string()),
            total_quantity: ActiveValue::Set(run.total_quantity),
            estimated_output: ActiveValue::Set(run.estimated_output),
            actual_output: ActiveValue::Set(run.actual_output),
            status: ActiveValue::Set(run.status.as_str().to_string()),
            items: ActiveValue::Set(items),
            created_by: ActiveValue::Set(run.created_by.clone()),
            note: ActiveValue::Set(run.note.clone()),
            created_at: ActiveValue::Set(run.created_at),
            updated_at: ActiveValue::Set(run.updated_at),
        })
    }
}

impl TryFrom<Model> for ManufacturingRun {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&model.id)
            .map_err(|_| EngineError::InvalidId("invalid run id".to_string()))?;
        let primary_unit_id = Uuid::parse_str(&model.primary_unit_id)
            .map_err(|_| EngineError::InvalidId("invalid unit id".to_string()))?;
        let packing_unit_id = Uuid::parse_str(&model.packing_unit_id)
            .map_err(|_| EngineError::InvalidId("invalid unit id".to_string()))?;
        let status = RunStatus::try_from(model.status.as_str())?;
        let items = RunItemsPayload::decode(&model.items)?.items;
        Ok(Self {
            id,
            store_id: model.store_id,
            primary_unit_id,
            packing_unit_id,
            total_quantity: model.total_quantity,
            estimated_output: model.estimated_output,
            actual_output: model.actual_output,
            status,
            items,
            created_by: model.created_by,
            note: model.note,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
