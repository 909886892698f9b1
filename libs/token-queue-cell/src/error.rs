use thiserror::Error;
use uuid::Uuid;

use doctor_cell::DoctorError;
use shared_models::error::AppError;
use shared_utils::validation::ValidationError;

use crate::TokenStatus;

#[derive(Error, Debug)]
pub enum TokenQueueError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Doctor {0} not found")]
    UnknownDoctor(Uuid),

    #[error("Token {0} not found")]
    NotFound(Uuid),

    #[error("Invalid token status transition from {from} to {to}")]
    InvalidTransition { from: TokenStatus, to: TokenStatus },

    /// Another writer won the race for the same doctor and date. Retried internally.
    #[error("Concurrent allocation conflict")]
    AllocationConflict,

    #[error("Token allocation failed: {0}")]
    AllocationFailed(String),

    #[error("Token ledger unavailable: {0}")]
    Storage(String),
}

impl From<ValidationError> for TokenQueueError {
    fn from(err: ValidationError) -> Self {
        TokenQueueError::Validation(err.0)
    }
}

impl From<DoctorError> for TokenQueueError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::Validation(msg) => TokenQueueError::Validation(msg),
            DoctorError::NotFound(id) => TokenQueueError::UnknownDoctor(id),
            DoctorError::Storage(msg) => TokenQueueError::Storage(msg),
        }
    }
}

impl From<TokenQueueError> for AppError {
    fn from(err: TokenQueueError) -> Self {
        match err {
            TokenQueueError::Validation(msg) => AppError::ValidationError(msg),
            TokenQueueError::UnknownDoctor(_) | TokenQueueError::NotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            TokenQueueError::InvalidTransition { .. } | TokenQueueError::AllocationConflict => {
                AppError::Conflict(err.to_string())
            }
            TokenQueueError::AllocationFailed(msg) => AppError::Internal(msg),
            TokenQueueError::Storage(msg) => AppError::ExternalService(msg),
        }
    }
}
