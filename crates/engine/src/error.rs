//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`KeyNotFound`] thrown when a referenced record is not found.
//! - [`DepletionFailed`] thrown when one or more raw materials could not be
//!   depleted; it carries every per-item reason so a caller can fix the whole
//!   request in one round trip.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`DepletionFailed`]: EngineError::DepletionFailed
use sea_orm::DbErr;
use thiserror::Error;

use crate::depletions::DepletionFailure;

fn render_failures(failures: &[DepletionFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid unit: {0}")]
    InvalidUnit(String),
    #[error("Depletion failed: {}", render_failures(.0))]
    DepletionFailed(Vec<DepletionFailure>),
    #[error("Already completed: {0}")]
    AlreadyCompleted(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::InvalidUnit(a), Self::InvalidUnit(b)) => a == b,
            (Self::DepletionFailed(a), Self::DepletionFailed(b)) => a == b,
            (Self::AlreadyCompleted(a), Self::AlreadyCompleted(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
