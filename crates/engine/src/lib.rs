//! Manufacturing transaction engine.
//!
//! The engine owns every mutation of inventory lots and manufacturing run
//! records. A run is created in a single database transaction: eligibility
//! checks, raw-material depletion and the run row itself either all commit
//! or none of them do.

pub use commands::{CreateRunCmd, RunItemRequest, UpdateRunCmd};
pub use depletions::{
    DEPLETION_CATEGORY, DEPLETION_SOURCE, DepletionFailure, DepletionReason, DepletionRecord,
    PlannedDepletion, plan_depletions,
};
pub use error::EngineError;
pub use inventory::InventoryLot;
pub use ops::{Engine, EngineBuilder};
pub use runs::{
    ITEMS_PAYLOAD_VERSION, ManufacturingRun, RunCreation, RunItem, RunItemsPayload, RunStatus,
    derive_status,
};
pub use units::{Unit, is_litre_or_kg};

mod commands;
pub mod depletions;
pub mod employees;
mod error;
pub mod inventory;
pub mod items;
mod ops;
pub mod runs;
pub mod store_operators;
pub mod stores;
pub mod units;

pub type ResultEngine<T> = Result<T, EngineError>;
