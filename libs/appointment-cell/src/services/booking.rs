use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use notification_cell::NotificationEmitter;
use shared_database::store::AppointmentStore;
use shared_database::{AppState, StoreError};
use shared_models::records::{
    Appointment, AppointmentPatch, AppointmentStatus, NewAppointment, NotificationKind,
};

use crate::models::{BookAppointmentRequest, RescheduleAppointmentRequest, SchedulingError};
use crate::services::conflict::ConflictDetectionService;
use crate::services::lifecycle::AppointmentLifecycleService;

pub struct AppointmentBookingService {
    store: Arc<dyn AppointmentStore>,
    conflict_service: ConflictDetectionService,
    lifecycle_service: AppointmentLifecycleService,
    emitter: NotificationEmitter,
}

impl AppointmentBookingService {
    pub fn new(state: &AppState) -> Self {
        let store = Arc::clone(&state.store);
        Self {
            conflict_service: ConflictDetectionService::new(Arc::clone(&store)),
            lifecycle_service: AppointmentLifecycleService::new(),
            emitter: NotificationEmitter::new(Arc::clone(&store)),
            store,
        }
    }

    /// Book an appointment for the calling user.
    ///
    /// The conflict check and the insert run under the resource's advisory
    /// lock, so two concurrent bookings against the same calendar serialize
    /// and at most one of an overlapping pair succeeds.
    pub async fn book_appointment(
        &self,
        owner_user_id: Uuid,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        info!(
            "Booking service {} for client {} at {}",
            request.service_id, request.client_id, request.start_time
        );

        let service = self
            .store
            .get_service(request.service_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => SchedulingError::ServiceNotFound,
                other => other.into(),
            })?;

        let client = self
            .store
            .get_client(request.client_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => SchedulingError::ClientNotFound,
                other => other.into(),
            })?;

        let _guard = self.store.resource_lock(service.resource_id).await;

        let start = request.start_time;
        let end = request
            .end_time
            .unwrap_or(start + ChronoDuration::minutes(service.duration_minutes));

        if end <= start {
            return Err(SchedulingError::InvalidInterval);
        }

        let conflicting = self
            .conflict_service
            .check(service.resource_id, start, end, None)
            .await?;
        if !conflicting.is_empty() {
            return Err(SchedulingError::Conflict(
                conflicting.iter().map(|a| a.id).collect(),
            ));
        }

        let appointment = self
            .store
            .create_appointment(NewAppointment {
                service_id: service.id,
                client_id: client.id,
                owner_user_id,
                resource_id: service.resource_id,
                start_time: start,
                end_time: end,
                status: AppointmentStatus::Scheduled,
            })
            .await
            .map_err(|e| SchedulingError::Unavailable(e.to_string()))?;

        self.emitter
            .emit_all(
                [owner_user_id, client.owner_user_id],
                appointment.id,
                NotificationKind::Booked,
            )
            .await;

        info!("Appointment {} booked on resource {}", appointment.id, appointment.resource_id);
        Ok(appointment)
    }

    /// Move an appointment to a new interval. On conflict nothing is written.
    pub async fn reschedule_appointment(
        &self,
        appointment_id: Uuid,
        request: RescheduleAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        debug!("Rescheduling appointment: {}", appointment_id);

        let current = self.get_appointment(appointment_id).await?;
        let _guard = self.store.resource_lock(current.resource_id).await;

        // Re-read under the lock: another caller may have raced a state change.
        let current = self.get_appointment(appointment_id).await?;
        self.lifecycle_service
            .validate_status_transition(&current.status, &AppointmentStatus::Scheduled)?;

        let new_start = request.new_start_time;
        let new_end = request
            .new_end_time
            .unwrap_or(new_start + (current.end_time - current.start_time));

        if new_end <= new_start {
            return Err(SchedulingError::InvalidInterval);
        }

        let conflicting = self
            .conflict_service
            .check(current.resource_id, new_start, new_end, Some(appointment_id))
            .await?;
        if !conflicting.is_empty() {
            return Err(SchedulingError::Conflict(
                conflicting.iter().map(|a| a.id).collect(),
            ));
        }

        let updated = self
            .store
            .update_appointment(
                appointment_id,
                AppointmentPatch {
                    start_time: Some(new_start),
                    end_time: Some(new_end),
                    status: None,
                },
            )
            .await?;

        self.emitter
            .emit_all(
                self.notification_recipients(&updated).await,
                updated.id,
                NotificationKind::Rescheduled,
            )
            .await;

        info!("Appointment {} rescheduled to {}", appointment_id, new_start);
        Ok(updated)
    }

    /// Cancel an appointment. Cancelling one that already reached a terminal
    /// state fails with `InvalidState` rather than silently succeeding.
    pub async fn cancel_appointment(&self, appointment_id: Uuid) -> Result<Appointment, SchedulingError> {
        debug!("Cancelling appointment: {}", appointment_id);

        let current = self.get_appointment(appointment_id).await?;
        let _guard = self.store.resource_lock(current.resource_id).await;

        let current = self.get_appointment(appointment_id).await?;
        self.lifecycle_service
            .validate_status_transition(&current.status, &AppointmentStatus::Cancelled)?;

        let cancelled = self
            .store
            .update_appointment(
                appointment_id,
                AppointmentPatch {
                    status: Some(AppointmentStatus::Cancelled),
                    ..Default::default()
                },
            )
            .await?;

        self.emitter
            .emit_all(
                self.notification_recipients(&cancelled).await,
                cancelled.id,
                NotificationKind::Cancelled,
            )
            .await;

        info!("Appointment {} cancelled", appointment_id);
        Ok(cancelled)
    }

    /// Mark an appointment completed.
    pub async fn complete_appointment(&self, appointment_id: Uuid) -> Result<Appointment, SchedulingError> {
        debug!("Completing appointment: {}", appointment_id);

        let current = self.get_appointment(appointment_id).await?;
        let _guard = self.store.resource_lock(current.resource_id).await;

        let current = self.get_appointment(appointment_id).await?;
        self.lifecycle_service
            .validate_status_transition(&current.status, &AppointmentStatus::Completed)?;

        let completed = self
            .store
            .update_appointment(
                appointment_id,
                AppointmentPatch {
                    status: Some(AppointmentStatus::Completed),
                    ..Default::default()
                },
            )
            .await?;

        info!("Appointment {} completed", appointment_id);
        Ok(completed)
    }

    /// Physically remove an appointment record. Reserved for administrative
    /// cleanup; regular removal is the cancel transition.
    pub async fn purge_appointment(&self, appointment_id: Uuid) -> Result<(), SchedulingError> {
        debug!("Purging appointment: {}", appointment_id);
        self.store
            .delete_appointment(appointment_id)
            .await
            .map_err(Into::into)
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, SchedulingError> {
        self.store
            .get_appointment(appointment_id)
            .await
            .map_err(Into::into)
    }

    // ==========================================================================
    // QUERY SURFACE
    // ==========================================================================

    pub async fn my_appointments(&self, owner_user_id: Uuid) -> Result<Vec<Appointment>, SchedulingError> {
        self.store
            .list_by_owner(owner_user_id)
            .await
            .map_err(Into::into)
    }

    pub async fn appointments_by_service(&self, service_id: Uuid) -> Result<Vec<Appointment>, SchedulingError> {
        self.store.get_service(service_id).await.map_err(|e| match e {
            StoreError::NotFound => SchedulingError::ServiceNotFound,
            other => other.into(),
        })?;

        self.store
            .list_by_service(service_id)
            .await
            .map_err(Into::into)
    }

    pub async fn appointments_by_client(&self, client_id: Uuid) -> Result<Vec<Appointment>, SchedulingError> {
        self.store.get_client(client_id).await.map_err(|e| match e {
            StoreError::NotFound => SchedulingError::ClientNotFound,
            other => other.into(),
        })?;

        self.store
            .list_by_client(client_id)
            .await
            .map_err(Into::into)
    }

    pub async fn appointments_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        if to <= from {
            return Err(SchedulingError::InvalidRange);
        }

        self.store
            .list_by_date_range(from, to)
            .await
            .map_err(Into::into)
    }

    // ==========================================================================
    // PRIVATE HELPERS
    // ==========================================================================

    /// The owner and the client's owning user. A client purged after booking
    /// downgrades to owner-only emission.
    async fn notification_recipients(&self, appointment: &Appointment) -> Vec<Uuid> {
        match self.store.get_client(appointment.client_id).await {
            Ok(client) => vec![appointment.owner_user_id, client.owner_user_id],
            Err(_) => vec![appointment.owner_user_id],
        }
    }
}
