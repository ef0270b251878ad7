use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

use shared_models::records::{
    Appointment, AppointmentPatch, Client, NewAppointment, NewClient, NewNotification,
    NewService, NewUser, Notification, Service, User,
};

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("duplicate record: {0}")]
    Duplicate(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence seam consumed by the scheduling engine and the cells.
///
/// The store enforces no business rules: it persists what it is given and
/// answers queries. Conflict and transition rules live in the engine. The one
/// concurrency guarantee it provides is [`AppointmentStore::resource_lock`],
/// which callers hold across a conflict-check-then-write sequence so that
/// bookings against the same resource serialize.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    // --- users -----------------------------------------------------------
    async fn create_user(&self, record: NewUser) -> StoreResult<User>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn get_user(&self, id: Uuid) -> StoreResult<User>;

    // --- clients ---------------------------------------------------------
    async fn create_client(&self, record: NewClient) -> StoreResult<Client>;
    async fn get_client(&self, id: Uuid) -> StoreResult<Client>;
    async fn list_clients(&self, owner_user_id: Uuid) -> StoreResult<Vec<Client>>;
    async fn delete_client(&self, id: Uuid) -> StoreResult<()>;

    // --- services --------------------------------------------------------
    async fn create_service(&self, record: NewService) -> StoreResult<Service>;
    async fn get_service(&self, id: Uuid) -> StoreResult<Service>;
    async fn list_services(&self) -> StoreResult<Vec<Service>>;
    async fn delete_service(&self, id: Uuid) -> StoreResult<()>;

    // --- appointments ----------------------------------------------------
    async fn get_appointment(&self, id: Uuid) -> StoreResult<Appointment>;
    async fn list_by_client(&self, client_id: Uuid) -> StoreResult<Vec<Appointment>>;
    async fn list_by_service(&self, service_id: Uuid) -> StoreResult<Vec<Appointment>>;
    async fn list_by_owner(&self, owner_user_id: Uuid) -> StoreResult<Vec<Appointment>>;

    /// All `scheduled` appointments on the resource whose `[start, end)`
    /// interval intersects the given one, optionally excluding one id (used
    /// during reschedule so an appointment does not conflict with itself).
    async fn list_overlapping(
        &self,
        resource_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> StoreResult<Vec<Appointment>>;

    async fn list_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<Appointment>>;

    async fn create_appointment(&self, record: NewAppointment) -> StoreResult<Appointment>;
    async fn update_appointment(
        &self,
        id: Uuid,
        patch: AppointmentPatch,
    ) -> StoreResult<Appointment>;
    async fn delete_appointment(&self, id: Uuid) -> StoreResult<()>;

    // --- notifications ---------------------------------------------------
    async fn create_notification(&self, record: NewNotification) -> StoreResult<Notification>;
    async fn list_notifications(&self, recipient_user_id: Uuid) -> StoreResult<Vec<Notification>>;
    async fn mark_notification_read(
        &self,
        id: Uuid,
        recipient_user_id: Uuid,
    ) -> StoreResult<Notification>;

    // --- concurrency -----------------------------------------------------

    /// Advisory lock serializing check-then-write sequences per resource.
    /// Bookings against different resources proceed in parallel.
    async fn resource_lock(&self, resource_id: Uuid) -> OwnedMutexGuard<()>;
}
