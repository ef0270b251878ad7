use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub duration_minutes: i64,
    pub price_cents: i64,
    /// Calendar to book against; services sharing one conflict with each
    /// other. Defaults to a calendar of the service's own.
    pub resource_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClientRequest {
    pub name: String,
    pub contact: Option<String>,
}

#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Record still has scheduled future appointments")]
    HasFutureAppointments,

    #[error("{0}")]
    Validation(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for DirectoryError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => DirectoryError::NotFound,
            other => DirectoryError::Unavailable(other.to_string()),
        }
    }
}

impl From<DirectoryError> for AppError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::NotFound => AppError::NotFound(e.to_string()),
            DirectoryError::HasFutureAppointments => AppError::Conflict(e.to_string()),
            DirectoryError::Validation(msg) => AppError::BadRequest(msg),
            DirectoryError::Unavailable(msg) => AppError::Unavailable(msg),
        }
    }
}
