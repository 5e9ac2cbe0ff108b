//! Command structs for engine operations.
//!
//! These types group parameters for write operations (create/update),
//! keeping call sites readable and avoiding long argument lists.

use uuid::Uuid;

/// One raw material requested for a run: id, display name and quantity in
/// the run's primary unit. The name is echoed into the run payload and the
/// depletion audit trail as given.
#[derive(Clone, Debug, PartialEq)]
pub struct RunItemRequest {
    pub item_id: Uuid,
    pub item_name: String,
    pub quantity: f64,
}

impl RunItemRequest {
    #[must_use]
    pub fn new(item_id: Uuid, item_name: impl Into<String>, quantity: f64) -> Self {
        Self {
            item_id,
            item_name: item_name.into(),
            quantity,
        }
    }
}

/// Create a manufacturing run, depleting its raw materials.
#[derive(Clone, Debug)]
pub struct CreateRunCmd {
    pub store_id: String,
    pub operator_id: String,
    pub primary_unit_id: Uuid,
    pub packing_unit_id: Uuid,
    pub total_quantity: f64,
    pub estimated_output: f64,
    pub items: Vec<RunItemRequest>,
    pub note: Option<String>,
}

impl CreateRunCmd {
    #[must_use]
    pub fn new(
        store_id: impl Into<String>,
        operator_id: impl Into<String>,
        primary_unit_id: Uuid,
        packing_unit_id: Uuid,
        total_quantity: f64,
        estimated_output: f64,
    ) -> Self {
        Self {
            store_id: store_id.into(),
            operator_id: operator_id.into(),
            primary_unit_id,
            packing_unit_id,
            total_quantity,
            estimated_output,
            items: Vec::new(),
            note: None,
        }
    }

    #[must_use]
    pub fn item(mut self, item_id: Uuid, item_name: impl Into<String>, quantity: f64) -> Self {
        self.items
            .push(RunItemRequest::new(item_id, item_name, quantity));
        self
    }

    #[must_use]
    pub fn items(mut self, items: Vec<RunItemRequest>) -> Self {
        self.items = items;
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Update an existing run.
///
/// Only the fields set on the command are patched. The items payload is
/// replaced verbatim; no depletion is re-triggered by an update.
#[derive(Clone, Debug)]
pub struct UpdateRunCmd {
    pub run_id: Uuid,

    pub store_id: Option<String>,
    pub primary_unit_id: Option<Uuid>,
    pub packing_unit_id: Option<Uuid>,
    pub total_quantity: Option<f64>,
    pub estimated_output: Option<f64>,
    pub items: Option<Vec<RunItemRequest>>,
    pub note: Option<String>,
}

impl UpdateRunCmd {
    #[must_use]
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            store_id: None,
            primary_unit_id: None,
            packing_unit_id: None,
            total_quantity: None,
            estimated_output: None,
            items: None,
            note: None,
        }
    }

    #[must_use]
    pub fn store_id(mut self, store_id: impl Into<String>) -> Self {
        self.store_id = Some(store_id.into());
        self
    }

    #[must_use]
    pub fn primary_unit_id(mut self, unit_id: Uuid) -> Self {
        self.primary_unit_id = Some(unit_id);
        self
    }

    #[must_use]
    pub fn packing_unit_id(mut self, unit_id: Uuid) -> Self {
        self.packing_unit_id = Some(unit_id);
        self
    }

    #[must_use]
    pub fn total_quantity(mut self, total_quantity: f64) -> Self {
        self.total_quantity = Some(total_quantity);
        self
    }

    #[must_use]
    pub fn estimated_output(mut self, estimated_output: f64) -> Self {
        self.estimated_output = Some(estimated_output);
        self
    }

    #[must_use]
    pub fn items(mut self, items: Vec<RunItemRequest>) -> Self {
        self.items = Some(items);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}
