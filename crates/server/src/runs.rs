//! Manufacturing run API endpoints

use api_types::depletion::DepletionView;
use api_types::run::{
    RunComplete, RunCreated, RunItemNew, RunItemView, RunListResponse, RunNew,
    RunStatus as ApiStatus, RunUpdate, RunView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{ServerError, employee, server::ServerState};

fn map_status(status: engine::RunStatus) -> ApiStatus {
    match status {
        engine::RunStatus::Pending => ApiStatus::Pending,
        engine::RunStatus::GoodUtilization => ApiStatus::GoodUtilization,
        engine::RunStatus::WastageDetected => ApiStatus::WastageDetected,
        engine::RunStatus::Normal => ApiStatus::Normal,
    }
}

fn map_run(run: engine::ManufacturingRun) -> RunView {
    RunView {
        id: run.id,
        store_id: run.store_id,
        primary_unit_id: run.primary_unit_id,
        packing_unit_id: run.packing_unit_id,
        total_quantity: run.total_quantity,
        estimated_output: run.estimated_output,
        actual_output: run.actual_output,
        status: map_status(run.status),
        items: run
            .items
            .into_iter()
            .map(|item| RunItemView {
                item_id: item.item_id,
                item_name: item.item_name,
                requested_qty: item.requested_qty,
            })
            .collect(),
        created_by: run.created_by,
        note: run.note,
        created_at: run.created_at,
        updated_at: run.updated_at,
    }
}

fn map_depletion(record: engine::DepletionRecord) -> DepletionView {
    DepletionView {
        id: record.id,
        item_id: record.item_id,
        store_id: record.store_id,
        unit_id: record.unit_id,
        category: record.category,
        quantity: record.quantity,
        remaining: record.remaining,
        source: record.source,
        description: record.description,
        recorded_by: record.recorded_by,
        created_at: record.created_at,
    }
}

fn map_item_requests(items: Vec<RunItemNew>) -> Vec<engine::RunItemRequest> {
    items
        .into_iter()
        .map(|item| engine::RunItemRequest::new(item.item_id, item.item_name, item.quantity))
        .collect()
}

pub async fn create(
    Extension(employee): Extension<employee::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<RunNew>,
) -> Result<Json<RunCreated>, ServerError> {
    let mut cmd = engine::CreateRunCmd::new(
        payload.store_id,
        employee.id,
        payload.primary_unit_id,
        payload.packing_unit_id,
        payload.total_quantity,
        payload.estimated_output,
    )
    .items(map_item_requests(payload.items));
    if let Some(note) = payload.note {
        cmd = cmd.note(note);
    }

    let creation = state.engine.create_run(cmd).await?;

    Ok(Json(RunCreated {
        run: map_run(creation.run),
        depletions: creation.depletions.into_iter().map(map_depletion).collect(),
    }))
}

pub async fn list(
    _: Extension<employee::Model>,
    State(state): State<ServerState>,
) -> Result<Json<RunListResponse>, ServerError> {
    let runs = state.engine.list_runs().await?;

    Ok(Json(RunListResponse {
        runs: runs.into_iter().map(map_run).collect(),
    }))
}

pub async fn get_run(
    _: Extension<employee::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RunView>, ServerError> {
    let run = state.engine.run(id).await?;

    Ok(Json(map_run(run)))
}

pub async fn update(
    _: Extension<employee::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RunUpdate>,
) -> Result<Json<RunView>, ServerError> {
    let mut cmd = engine::UpdateRunCmd::new(id);
    if let Some(store_id) = payload.store_id {
        cmd = cmd.store_id(store_id);
    }
    if let Some(unit_id) = payload.primary_unit_id {
        cmd = cmd.primary_unit_id(unit_id);
    }
    if let Some(unit_id) = payload.packing_unit_id {
        cmd = cmd.packing_unit_id(unit_id);
    }
    if let Some(total_quantity) = payload.total_quantity {
        cmd = cmd.total_quantity(total_quantity);
    }
    if let Some(estimated_output) = payload.estimated_output {
        cmd = cmd.estimated_output(estimated_output);
    }
    if let Some(items) = payload.items {
        cmd = cmd.items(map_item_requests(items));
    }
    if let Some(note) = payload.note {
        cmd = cmd.note(note);
    }

    let run = state.engine.update_run(cmd).await?;

    Ok(Json(map_run(run)))
}

pub async fn complete(
    _: Extension<employee::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RunComplete>,
) -> Result<Json<RunView>, ServerError> {
    let run = state.engine.complete_run(id, payload.actual_output).await?;

    Ok(Json(map_run(run)))
}

pub async fn remove(
    _: Extension<employee::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RunView>, ServerError> {
    let run = state.engine.delete_run(id).await?;

    Ok(Json(map_run(run)))
}
