//! Depletion execution: phase two of the depletion protocol.
//!
//! The pure planner decides what to decrement; this module fetches the lots,
//! gates on the accumulated failures and applies the decrements plus audit
//! records inside the ambient transaction. An error anywhere leaves the
//! transaction uncommitted, so no decrement or record survives a failed run.

use std::collections::HashMap;

use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::commands::RunItemRequest;
use crate::{
    DepletionFailure, DepletionReason, DepletionRecord, EngineError, InventoryLot,
    PlannedDepletion, ResultEngine, Unit, depletions, inventory, plan_depletions,
};

use super::Engine;

impl Engine {
    async fn lots_for_item(
        &self,
        db: &DatabaseTransaction,
        store_id: &str,
        item_id: Uuid,
    ) -> ResultEngine<Vec<InventoryLot>> {
        let models = inventory::Entity::find()
            .filter(inventory::Column::ItemId.eq(item_id.to_string()))
            .filter(inventory::Column::StoreId.eq(store_id.to_string()))
            .all(db)
            .await?;
        models.into_iter().map(InventoryLot::try_from).collect()
    }

    /// Applies one planned decrement.
    ///
    /// The quantity guard is part of the UPDATE itself, so a row changed by a
    /// concurrent writer since planning cannot be pushed negative; a guard
    /// miss surfaces as the same insufficient-stock failure the planner would
    /// have produced.
    async fn apply_planned_depletion(
        &self,
        db: &DatabaseTransaction,
        planned: &PlannedDepletion,
    ) -> ResultEngine<()> {
        let result = inventory::Entity::update_many()
            .col_expr(
                inventory::Column::Quantity,
                Expr::col(inventory::Column::Quantity).sub(planned.quantity),
            )
            .filter(inventory::Column::Id.eq(planned.lot_id.to_string()))
            .filter(inventory::Column::Quantity.gte(planned.quantity))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            let available = inventory::Entity::find_by_id(planned.lot_id.to_string())
                .one(db)
                .await?
                .map(|lot| lot.quantity)
                .unwrap_or(0.0);
            return Err(EngineError::DepletionFailed(vec![DepletionFailure {
                item_id: planned.item_id,
                item_name: planned.item_name.clone(),
                reason: DepletionReason::InsufficientStock {
                    available,
                    required: planned.quantity,
                },
            }]));
        }

        Ok(())
    }

    /// Depletes every requested item in the primary unit, all or nothing.
    ///
    /// Returns the audit records written alongside the decrements. Fails with
    /// `DepletionFailed` carrying every per-item reason when any item cannot
    /// be depleted; in that case nothing has been written that the enclosing
    /// transaction will keep.
    pub(super) async fn deplete_run_inputs(
        &self,
        db: &DatabaseTransaction,
        store_id: &str,
        primary_unit: &Unit,
        recorded_by: &str,
        requests: &[RunItemRequest],
    ) -> ResultEngine<Vec<DepletionRecord>> {
        let mut lots_by_item: HashMap<Uuid, Vec<InventoryLot>> =
            HashMap::with_capacity(requests.len());
        for request in requests {
            let lots = self.lots_for_item(db, store_id, request.item_id).await?;
            lots_by_item.insert(request.item_id, lots);
        }

        let mut planned = Vec::with_capacity(requests.len());
        let mut failures = Vec::new();
        for entry in plan_depletions(primary_unit, requests, &lots_by_item) {
            match entry {
                Ok(depletion) => planned.push(depletion),
                Err(failure) => failures.push(failure),
            }
        }
        if !failures.is_empty() {
            return Err(EngineError::DepletionFailed(failures));
        }

        let mut records = Vec::with_capacity(planned.len());
        for depletion in &planned {
            self.apply_planned_depletion(db, depletion).await?;
            let record = DepletionRecord::new(
                depletion,
                store_id.to_string(),
                primary_unit.id,
                recorded_by.to_string(),
            );
            depletions::ActiveModel::from(&record).insert(db).await?;
            records.push(record);
        }

        Ok(records)
    }
}
