use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::error::AppError;
use shared_models::records::AppointmentStatus;

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub service_id: Uuid,
    pub client_id: Uuid,
    pub start_time: DateTime<Utc>,
    /// When absent, the end is computed from the service's slot length.
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub new_start_time: DateTime<Utc>,
    /// When absent, the appointment keeps its current slot length.
    pub new_end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Error)]
pub enum SchedulingError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Service not found")]
    ServiceNotFound,

    #[error("Client not found")]
    ClientNotFound,

    #[error("Appointment interval must end after it starts")]
    InvalidInterval,

    #[error("Date range must end after it starts")]
    InvalidRange,

    #[error("Appointment conflicts with {} existing booking(s)", .0.len())]
    Conflict(Vec<Uuid>),

    #[error("Appointment cannot change state from {0}")]
    InvalidState(AppointmentStatus),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for SchedulingError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => SchedulingError::NotFound,
            other => SchedulingError::Unavailable(other.to_string()),
        }
    }
}

impl From<SchedulingError> for AppError {
    fn from(e: SchedulingError) -> Self {
        match e {
            SchedulingError::NotFound
            | SchedulingError::ServiceNotFound
            | SchedulingError::ClientNotFound => AppError::NotFound(e.to_string()),
            SchedulingError::InvalidInterval | SchedulingError::InvalidRange => {
                AppError::BadRequest(e.to_string())
            }
            SchedulingError::Conflict(ids) => AppError::SchedulingConflict(ids),
            SchedulingError::InvalidState(_) => AppError::Conflict(e.to_string()),
            SchedulingError::Unavailable(msg) => AppError::Unavailable(msg),
        }
    }
}
