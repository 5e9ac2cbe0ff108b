use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use api_types::depletion::DepletionFailureView;
use serde::Serialize;
pub use server::{run, run_with_listener, spawn_with_listener};

mod employee;
mod runs;
mod server;

pub mod types {
    pub mod run {
        pub use api_types::run::{
            RunComplete, RunCreated, RunItemNew, RunItemView, RunListResponse, RunNew, RunStatus,
            RunUpdate, RunView,
        };
    }

    pub mod depletion {
        pub use api_types::depletion::{DepletionFailureView, DepletionView};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

/// JSON error body.
///
/// `kind` distinguishes the error class for clients; `reasons` is present
/// only for depletion failures and carries one display-ready entry per item
/// that could not be depleted.
#[derive(Serialize)]
struct Error {
    error: String,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasons: Option<Vec<DepletionFailureView>>,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::AlreadyCompleted(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidUnit(_)
        | EngineError::DepletionFailed(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidId(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn kind_for_engine_error(err: &EngineError) -> &'static str {
    match err {
        EngineError::Forbidden(_) => "forbidden",
        EngineError::KeyNotFound(_) => "not_found",
        EngineError::AlreadyCompleted(_) => "already_completed",
        EngineError::Database(_) => "internal",
        EngineError::InvalidUnit(_) => "invalid_unit",
        EngineError::DepletionFailed(_) => "depletion_failed",
        EngineError::InvalidAmount(_) => "invalid_amount",
        EngineError::InvalidId(_) => "invalid_id",
    }
}

fn body_for_engine_error(err: EngineError) -> Error {
    let kind = kind_for_engine_error(&err);
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            Error {
                error: "internal server error".to_string(),
                kind,
                reasons: None,
            }
        }
        EngineError::DepletionFailed(failures) => {
            let reasons = failures
                .iter()
                .map(|failure| DepletionFailureView {
                    item_id: failure.item_id,
                    item_name: failure.item_name.clone(),
                    reason: failure.reason.to_string(),
                })
                .collect();
            Error {
                error: EngineError::DepletionFailed(failures).to_string(),
                kind,
                reasons: Some(reasons),
            }
        }
        other => Error {
            error: other.to_string(),
            kind,
            reasons: None,
        },
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), body_for_engine_error(err)),
            ServerError::Generic(err) => (
                StatusCode::BAD_REQUEST,
                Error {
                    error: err,
                    kind: "bad_request",
                    reasons: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
