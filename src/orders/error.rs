//! Order domain errors

use crate::db::models::OrderStatus;
use crate::db::repository::RepoError;
use crate::utils::AppError;
use thiserror::Error;

/// Failures of order creation and status transitions
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order {0} not found")]
    NotFound(String),

    /// Unrecognized action string
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// The order's current status does not match the action's source state
    #[error("Cannot apply action '{action}' to order in status {status}")]
    IllegalTransition {
        status: OrderStatus,
        action: String,
    },

    /// A tracked item could not be reserved; no stock or status change applied
    #[error("Insufficient stock for menu '{0}'")]
    InsufficientStock(String),

    /// Malformed or missing order fields
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<RepoError> for OrderError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(msg) => OrderError::NotFound(msg),
            RepoError::Validation(msg) => OrderError::InvalidInput(msg),
            RepoError::Duplicate(msg) | RepoError::Database(msg) => OrderError::Database(msg),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::NotFound(msg) => AppError::NotFound(msg),
            OrderError::InvalidAction(action) => AppError::InvalidAction(action),
            OrderError::IllegalTransition { status, action } => AppError::IllegalTransition {
                status: status.to_string(),
                action,
            },
            e @ OrderError::InsufficientStock(_) => AppError::InsufficientStock(e.to_string()),
            OrderError::InvalidInput(msg) => AppError::Invalid(msg),
            OrderError::Database(msg) => AppError::Database(msg),
        }
    }
}
