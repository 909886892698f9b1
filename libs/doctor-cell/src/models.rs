use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;
use shared_utils::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub specialization: String,
    pub created_at: DateTime<Utc>,
}

/// Validated, trimmed input for a directory insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDoctor {
    pub name: String,
    pub specialization: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDoctorRequest {
    pub name: String,
    pub specialization: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoctorOrder {
    /// Alphabetic, as used by doctor pickers.
    #[default]
    Name,
    /// Newest registrations first.
    CreatedAtDesc,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorListQuery {
    pub order_by: Option<DoctorOrder>,
}

#[derive(Debug, Error)]
pub enum DoctorError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Doctor {0} not found")]
    NotFound(Uuid),

    #[error("Doctor directory unavailable: {0}")]
    Storage(String),
}

impl From<ValidationError> for DoctorError {
    fn from(err: ValidationError) -> Self {
        DoctorError::Validation(err.0)
    }
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::Validation(msg) => AppError::ValidationError(msg),
            DoctorError::NotFound(_) => AppError::NotFound(err.to_string()),
            DoctorError::Storage(msg) => AppError::ExternalService(msg),
        }
    }
}
