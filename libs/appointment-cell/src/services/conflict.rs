use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::store::AppointmentStore;
use shared_models::records::Appointment;

use crate::models::SchedulingError;

pub struct ConflictDetectionService {
    store: Arc<dyn AppointmentStore>,
}

impl ConflictDetectionService {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self { store }
    }

    /// All scheduled appointments on the resource colliding with
    /// `[start, end)`. Overlap is half-open: an appointment ending exactly at
    /// `start` does not collide.
    pub async fn check(
        &self,
        resource_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        debug!(
            "Checking conflicts for resource {} from {} to {}",
            resource_id, start, end
        );

        let conflicting = self
            .store
            .list_overlapping(resource_id, start, end, exclude)
            .await
            .map_err(|e| SchedulingError::Unavailable(e.to_string()))?;

        if !conflicting.is_empty() {
            warn!(
                "Conflict detected for resource {} - {} colliding appointment(s)",
                resource_id,
                conflicting.len()
            );
        }

        Ok(conflicting)
    }
}
