//! Run lifecycle operations.

use chrono::Utc;
use sea_orm::{ActiveValue, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::commands::{CreateRunCmd, RunItemRequest, UpdateRunCmd};
use crate::runs::RunItemsPayload;
use crate::{
    EngineError, ManufacturingRun, ResultEngine, RunCreation, RunItem, derive_status, runs,
};

use super::{Engine, normalize_optional_text, with_tx};

fn require_positive_quantities(items: &[RunItemRequest]) -> ResultEngine<()> {
    for item in items {
        if item.quantity <= 0.0 {
            return Err(EngineError::InvalidAmount(format!(
                "requested quantity for {} must be > 0",
                item.item_name
            )));
        }
    }
    Ok(())
}

fn run_items(requests: Vec<RunItemRequest>) -> Vec<RunItem> {
    requests
        .into_iter()
        .map(|request| RunItem {
            item_id: request.item_id,
            item_name: request.item_name,
            requested_qty: request.quantity,
        })
        .collect()
}

impl Engine {
    /// Creates a manufacturing run, depleting its raw materials.
    ///
    /// Eligibility checks, per-item depletion and the run row all happen in
    /// one transaction: the run exists if and only if every requested item
    /// was depleted in full.
    pub async fn create_run(&self, cmd: CreateRunCmd) -> ResultEngine<RunCreation> {
        if cmd.items.is_empty() {
            return Err(EngineError::InvalidAmount(
                "run must request at least one item".to_string(),
            ));
        }
        require_positive_quantities(&cmd.items)?;
        if cmd.total_quantity <= 0.0 {
            return Err(EngineError::InvalidAmount(
                "total_quantity must be > 0".to_string(),
            ));
        }
        if cmd.estimated_output <= 0.0 {
            return Err(EngineError::InvalidAmount(
                "estimated_output must be > 0".to_string(),
            ));
        }
        let note = normalize_optional_text(cmd.note.as_deref());

        with_tx!(self, |db_tx| {
            let store = self.require_store(&db_tx, &cmd.store_id).await?;
            let employee = self.require_employee(&db_tx, &cmd.operator_id).await?;
            self.require_store_operator(&db_tx, &store.id, &employee.id)
                .await?;
            let primary_unit = self.require_primary_unit(&db_tx, cmd.primary_unit_id).await?;
            let packing_unit = self.require_unit(&db_tx, cmd.packing_unit_id).await?;
            self.require_items(&db_tx, &cmd.items).await?;

            let depletions = self
                .deplete_run_inputs(&db_tx, &store.id, &primary_unit, &employee.id, &cmd.items)
                .await?;

            let run = ManufacturingRun::new(
                store.id,
                primary_unit.id,
                packing_unit.id,
                cmd.total_quantity,
                cmd.estimated_output,
                run_items(cmd.items),
                employee.id,
                note,
            );
            runs::ActiveModel::try_from(&run)?.insert(&db_tx).await?;

            Ok(RunCreation { run, depletions })
        })
    }

    /// Return a run by id.
    pub async fn run(&self, run_id: Uuid) -> ResultEngine<ManufacturingRun> {
        let model = runs::Entity::find_by_id(run_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("run not exists".to_string()))?;
        ManufacturingRun::try_from(model)
    }

    /// Lists runs, newest first.
    pub async fn list_runs(&self) -> ResultEngine<Vec<ManufacturingRun>> {
        let models = runs::Entity::find()
            .order_by_desc(runs::Column::CreatedAt)
            .all(&self.database)
            .await?;
        models.into_iter().map(ManufacturingRun::try_from).collect()
    }

    /// Completes a run, deriving its terminal yield-variance status.
    ///
    /// Completion is one-shot: a run whose status is no longer `PENDING`
    /// cannot be completed again. Inventory is not touched.
    pub async fn complete_run(
        &self,
        run_id: Uuid,
        actual_output: f64,
    ) -> ResultEngine<ManufacturingRun> {
        if actual_output < 0.0 {
            return Err(EngineError::InvalidAmount(
                "actual_output must be >= 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let model = runs::Entity::find_by_id(run_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("run not exists".to_string()))?;
            let mut run = ManufacturingRun::try_from(model)?;
            if run.status.is_terminal() {
                return Err(EngineError::AlreadyCompleted(format!(
                    "run {run_id} is already {}",
                    run.status.as_str()
                )));
            }

            let status = derive_status(run.estimated_output, actual_output);
            let now = Utc::now();
            let active = runs::ActiveModel {
                id: ActiveValue::Set(run.id.to_string()),
                actual_output: ActiveValue::Set(Some(actual_output)),
                status: ActiveValue::Set(status.as_str().to_string()),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            };
            active.update(&db_tx).await?;

            run.actual_output = Some(actual_output);
            run.status = status;
            run.updated_at = now;
            Ok(run)
        })
    }

    /// Patches the fields set on the command.
    ///
    /// Store and unit ids present in the patch must resolve, but no
    /// authorization or unit-classification re-check happens here, and a
    /// patched items payload never re-triggers depletion.
    pub async fn update_run(&self, cmd: UpdateRunCmd) -> ResultEngine<ManufacturingRun> {
        if let Some(items) = &cmd.items {
            require_positive_quantities(items)?;
        }
        if matches!(cmd.total_quantity, Some(quantity) if quantity <= 0.0) {
            return Err(EngineError::InvalidAmount(
                "total_quantity must be > 0".to_string(),
            ));
        }
        if matches!(cmd.estimated_output, Some(output) if output <= 0.0) {
            return Err(EngineError::InvalidAmount(
                "estimated_output must be > 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let model = runs::Entity::find_by_id(cmd.run_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("run not exists".to_string()))?;
            let mut run = ManufacturingRun::try_from(model)?;

            if let Some(store_id) = &cmd.store_id {
                self.require_store(&db_tx, store_id).await?;
            }
            if let Some(unit_id) = cmd.primary_unit_id {
                self.require_unit(&db_tx, unit_id).await?;
            }
            if let Some(unit_id) = cmd.packing_unit_id {
                self.require_unit(&db_tx, unit_id).await?;
            }

            let now = Utc::now();
            let mut active = runs::ActiveModel {
                id: ActiveValue::Set(run.id.to_string()),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            };
            if let Some(store_id) = cmd.store_id {
                active.store_id = ActiveValue::Set(store_id.clone());
                run.store_id = store_id;
            }
            if let Some(unit_id) = cmd.primary_unit_id {
                active.primary_unit_id = ActiveValue::Set(unit_id.to_string());
                run.primary_unit_id = unit_id;
            }
            if let Some(unit_id) = cmd.packing_unit_id {
                active.packing_unit_id = ActiveValue::Set(unit_id.to_string());
                run.packing_unit_id = unit_id;
            }
            if let Some(total_quantity) = cmd.total_quantity {
                active.total_quantity = ActiveValue::Set(total_quantity);
                run.total_quantity = total_quantity;
            }
            if let Some(estimated_output) = cmd.estimated_output {
                active.estimated_output = ActiveValue::Set(estimated_output);
                run.estimated_output = estimated_output;
            }
            if let Some(requests) = cmd.items {
                let items = run_items(requests);
                active.items = ActiveValue::Set(RunItemsPayload::new(items.clone()).encode()?);
                run.items = items;
            }
            if let Some(note) = normalize_optional_text(cmd.note.as_deref()) {
                active.note = ActiveValue::Set(Some(note.clone()));
                run.note = Some(note);
            }
            active.update(&db_tx).await?;

            run.updated_at = now;
            Ok(run)
        })
    }

    /// Deletes a run.
    ///
    /// Record cleanup only: the inventory its creation consumed stays
    /// consumed.
    pub async fn delete_run(&self, run_id: Uuid) -> ResultEngine<ManufacturingRun> {
        with_tx!(self, |db_tx| {
            let model = runs::Entity::find_by_id(run_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("run not exists".to_string()))?;
            let run = ManufacturingRun::try_from(model)?;

            runs::Entity::delete_by_id(run_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(run)
        })
    }
}
