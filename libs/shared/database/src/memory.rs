use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::debug;
use uuid::Uuid;

use shared_models::records::{
    Appointment, AppointmentPatch, AppointmentStatus, Client, NewAppointment, NewClient,
    NewNotification, NewService, NewUser, Notification, Service, User,
};

use crate::store::{AppointmentStore, StoreError, StoreResult};

/// In-memory reference implementation of [`AppointmentStore`].
///
/// Reads take shared locks; the per-resource advisory mutexes are allocated
/// lazily and live for the process lifetime.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    clients: RwLock<HashMap<Uuid, Client>>,
    services: RwLock<HashMap<Uuid, Service>>,
    appointments: RwLock<HashMap<Uuid, Appointment>>,
    notifications: RwLock<HashMap<Uuid, Notification>>,
    resource_locks: StdMutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sort_by_start(mut appointments: Vec<Appointment>) -> Vec<Appointment> {
        // Ordering by start time ascending is part of the listing contract.
        appointments.sort_by_key(|a| a.start_time);
        appointments
    }

    async fn collect_appointments<F>(&self, predicate: F) -> Vec<Appointment>
    where
        F: Fn(&Appointment) -> bool,
    {
        let table = self.appointments.read().await;
        Self::sort_by_start(table.values().filter(|a| predicate(a)).cloned().collect())
    }
}

#[async_trait]
impl AppointmentStore for MemoryStore {
    async fn create_user(&self, record: NewUser) -> StoreResult<User> {
        let mut table = self.users.write().await;
        let email = record.email.to_lowercase();

        if table.values().any(|u| u.email == email) {
            return Err(StoreError::Duplicate(format!(
                "user with email {} already exists",
                email
            )));
        }

        let user = User {
            id: Uuid::new_v4(),
            display_name: record.display_name,
            email,
            password_hash: record.password_hash,
            role: record.role,
            created_at: Utc::now(),
        };
        table.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let email = email.to_lowercase();
        let table = self.users.read().await;
        Ok(table.values().find(|u| u.email == email).cloned())
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<User> {
        let table = self.users.read().await;
        table.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn create_client(&self, record: NewClient) -> StoreResult<Client> {
        let client = Client {
            id: Uuid::new_v4(),
            name: record.name,
            contact: record.contact,
            owner_user_id: record.owner_user_id,
            created_at: Utc::now(),
        };
        self.clients.write().await.insert(client.id, client.clone());
        Ok(client)
    }

    async fn get_client(&self, id: Uuid) -> StoreResult<Client> {
        let table = self.clients.read().await;
        table.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn list_clients(&self, owner_user_id: Uuid) -> StoreResult<Vec<Client>> {
        let table = self.clients.read().await;
        let mut clients: Vec<Client> = table
            .values()
            .filter(|c| c.owner_user_id == owner_user_id)
            .cloned()
            .collect();
        clients.sort_by_key(|c| c.created_at);
        Ok(clients)
    }

    async fn delete_client(&self, id: Uuid) -> StoreResult<()> {
        match self.clients.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }

    async fn create_service(&self, record: NewService) -> StoreResult<Service> {
        let id = Uuid::new_v4();
        let service = Service {
            id,
            name: record.name,
            duration_minutes: record.duration_minutes,
            price_cents: record.price_cents,
            // A standalone service is its own calendar.
            resource_id: record.resource_id.unwrap_or(id),
            created_at: Utc::now(),
        };
        self.services.write().await.insert(id, service.clone());
        Ok(service)
    }

    async fn get_service(&self, id: Uuid) -> StoreResult<Service> {
        let table = self.services.read().await;
        table.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn list_services(&self) -> StoreResult<Vec<Service>> {
        let table = self.services.read().await;
        let mut services: Vec<Service> = table.values().cloned().collect();
        services.sort_by_key(|s| s.created_at);
        Ok(services)
    }

    async fn delete_service(&self, id: Uuid) -> StoreResult<()> {
        match self.services.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }

    async fn get_appointment(&self, id: Uuid) -> StoreResult<Appointment> {
        let table = self.appointments.read().await;
        table.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn list_by_client(&self, client_id: Uuid) -> StoreResult<Vec<Appointment>> {
        Ok(self.collect_appointments(|a| a.client_id == client_id).await)
    }

    async fn list_by_service(&self, service_id: Uuid) -> StoreResult<Vec<Appointment>> {
        Ok(self
            .collect_appointments(|a| a.service_id == service_id)
            .await)
    }

    async fn list_by_owner(&self, owner_user_id: Uuid) -> StoreResult<Vec<Appointment>> {
        Ok(self
            .collect_appointments(|a| a.owner_user_id == owner_user_id)
            .await)
    }

    async fn list_overlapping(
        &self,
        resource_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> StoreResult<Vec<Appointment>> {
        Ok(self
            .collect_appointments(|a| {
                a.resource_id == resource_id
                    && a.status == AppointmentStatus::Scheduled
                    && Some(a.id) != exclude
                    && a.overlaps(start, end)
            })
            .await)
    }

    async fn list_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<Appointment>> {
        Ok(self.collect_appointments(|a| a.overlaps(start, end)).await)
    }

    async fn create_appointment(&self, record: NewAppointment) -> StoreResult<Appointment> {
        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            service_id: record.service_id,
            client_id: record.client_id,
            owner_user_id: record.owner_user_id,
            resource_id: record.resource_id,
            start_time: record.start_time,
            end_time: record.end_time,
            status: record.status,
            created_at: now,
            updated_at: now,
        };
        self.appointments
            .write()
            .await
            .insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn update_appointment(
        &self,
        id: Uuid,
        patch: AppointmentPatch,
    ) -> StoreResult<Appointment> {
        let mut table = self.appointments.write().await;
        let appointment = table.get_mut(&id).ok_or(StoreError::NotFound)?;

        if let Some(start_time) = patch.start_time {
            appointment.start_time = start_time;
        }
        if let Some(end_time) = patch.end_time {
            appointment.end_time = end_time;
        }
        if let Some(status) = patch.status {
            appointment.status = status;
        }
        appointment.updated_at = Utc::now();

        Ok(appointment.clone())
    }

    async fn delete_appointment(&self, id: Uuid) -> StoreResult<()> {
        match self.appointments.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }

    async fn create_notification(&self, record: NewNotification) -> StoreResult<Notification> {
        let notification = Notification {
            id: Uuid::new_v4(),
            recipient_user_id: record.recipient_user_id,
            appointment_id: record.appointment_id,
            kind: record.kind,
            read: false,
            created_at: Utc::now(),
        };
        self.notifications
            .write()
            .await
            .insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn list_notifications(&self, recipient_user_id: Uuid) -> StoreResult<Vec<Notification>> {
        let table = self.notifications.read().await;
        let mut notifications: Vec<Notification> = table
            .values()
            .filter(|n| n.recipient_user_id == recipient_user_id)
            .cloned()
            .collect();
        // Newest first for the inbox view.
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    async fn mark_notification_read(
        &self,
        id: Uuid,
        recipient_user_id: Uuid,
    ) -> StoreResult<Notification> {
        let mut table = self.notifications.write().await;
        let notification = table.get_mut(&id).ok_or(StoreError::NotFound)?;
        // A notification addressed to someone else is indistinguishable from
        // a missing one.
        if notification.recipient_user_id != recipient_user_id {
            return Err(StoreError::NotFound);
        }
        notification.read = true;
        Ok(notification.clone())
    }

    async fn resource_lock(&self, resource_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.resource_locks.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(
                locks
                    .entry(resource_id)
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        debug!("acquiring scheduling lock for resource {}", resource_id);
        lock.lock_owned().await
    }
}
