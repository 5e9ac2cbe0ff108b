use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod run {
    use super::*;

    /// Lifecycle status of a manufacturing run.
    ///
    /// A run starts `PENDING` and moves exactly once to one of the three
    /// terminal yield-variance statuses when it is completed.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum RunStatus {
        Pending,
        GoodUtilization,
        WastageDetected,
        Normal,
    }

    /// One raw material requested for a run.
    ///
    /// The name is echoed into the run's historical payload as given; the id
    /// is validated for existence at creation time.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RunItemNew {
        pub item_id: Uuid,
        pub item_name: String,
        /// Quantity to deplete, in the run's primary unit. Must be > 0.
        pub quantity: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RunNew {
        pub store_id: String,
        pub primary_unit_id: Uuid,
        pub packing_unit_id: Uuid,
        pub total_quantity: f64,
        pub estimated_output: f64,
        pub items: Vec<RunItemNew>,
        pub note: Option<String>,
    }

    /// One item as recorded on a run.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RunItemView {
        pub item_id: Uuid,
        pub item_name: String,
        pub requested_qty: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RunView {
        pub id: Uuid,
        pub store_id: String,
        pub primary_unit_id: Uuid,
        pub packing_unit_id: Uuid,
        pub total_quantity: f64,
        pub estimated_output: f64,
        /// Absent until the run is completed.
        pub actual_output: Option<f64>,
        pub status: RunStatus,
        pub items: Vec<RunItemView>,
        pub created_by: String,
        pub note: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RunListResponse {
        pub runs: Vec<RunView>,
    }

    /// Response for a successful creation: the run plus the depletion
    /// records written alongside it.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RunCreated {
        pub run: RunView,
        pub depletions: Vec<super::depletion::DepletionView>,
    }

    /// Partial update; absent fields are left unchanged.
    ///
    /// Patching `items` replaces the recorded payload verbatim and never
    /// re-triggers depletion.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RunUpdate {
        pub store_id: Option<String>,
        pub primary_unit_id: Option<Uuid>,
        pub packing_unit_id: Option<Uuid>,
        pub total_quantity: Option<f64>,
        pub estimated_output: Option<f64>,
        pub items: Option<Vec<RunItemNew>>,
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RunComplete {
        pub actual_output: f64,
    }
}

pub mod depletion {
    use super::*;

    /// An immutable audit entry for one inventory decrement.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DepletionView {
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

    /// One item that could not be depleted, with a display-ready reason.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DepletionFailureView {
        pub item_id: Uuid,
        pub item_name: String,
        pub reason: String,
    }
}
