//! Eligibility checks for run creation and update.
//!
//! Every helper runs against the ambient transaction, so a validated context
//! stays consistent with what the depletion step will read.

use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::commands::RunItemRequest;
use crate::{EngineError, ResultEngine, Unit, employees, items, store_operators, stores, units};

use super::Engine;

impl Engine {
    pub(super) async fn require_store(
        &self,
        db: &DatabaseTransaction,
        store_id: &str,
    ) -> ResultEngine<stores::Model> {
        stores::Entity::find_by_id(store_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("store not exists".to_string()))
    }

    /// Checks that the employee is in the store's operator set.
    ///
    /// Membership and employee existence are independent checks; both must
    /// pass before a run touches the store's inventory.
    pub(super) async fn require_store_operator(
        &self,
        db: &DatabaseTransaction,
        store_id: &str,
        employee_id: &str,
    ) -> ResultEngine<()> {
        let member =
            store_operators::Entity::find_by_id((store_id.to_string(), employee_id.to_string()))
                .one(db)
                .await?;
        if member.is_none() {
            return Err(EngineError::Forbidden(format!(
                "employee {employee_id} is not an operator of store {store_id}"
            )));
        }
        Ok(())
    }

    pub(super) async fn require_employee(
        &self,
        db: &DatabaseTransaction,
        employee_id: &str,
    ) -> ResultEngine<employees::Model> {
        employees::Entity::find_by_id(employee_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("employee not exists".to_string()))
    }

    pub(super) async fn require_unit(
        &self,
        db: &DatabaseTransaction,
        unit_id: Uuid,
    ) -> ResultEngine<Unit> {
        let model = units::Entity::find_by_id(unit_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("unit not exists".to_string()))?;
        Unit::try_from(model)
    }

    /// Resolves the unit and gates it on the Kilogram/Litre classification.
    pub(super) async fn require_primary_unit(
        &self,
        db: &DatabaseTransaction,
        unit_id: Uuid,
    ) -> ResultEngine<Unit> {
        let unit = self.require_unit(db, unit_id).await?;
        if !unit.is_primary() {
            return Err(EngineError::InvalidUnit(format!(
                "{} is not a litre or kilogram unit",
                unit.label()
            )));
        }
        Ok(unit)
    }

    /// Resolves the requested item ids as a set.
    ///
    /// Any id that fails to resolve aborts the whole run before inventory is
    /// touched; the count comparison catches unknown and duplicate ids alike.
    pub(super) async fn require_items(
        &self,
        db: &DatabaseTransaction,
        requests: &[RunItemRequest],
    ) -> ResultEngine<Vec<items::Model>> {
        let ids: Vec<String> = requests
            .iter()
            .map(|request| request.item_id.to_string())
            .collect();
        let found = items::Entity::find()
            .filter(items::Column::Id.is_in(ids))
            .all(db)
            .await?;
        if found.len() != requests.len() {
            return Err(EngineError::KeyNotFound(
                "one or more items not exists".to_string(),
            ));
        }
        Ok(found)
    }
}
