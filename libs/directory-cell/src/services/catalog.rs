use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::store::AppointmentStore;
use shared_database::AppState;
use shared_models::records::{
    Appointment, AppointmentStatus, Client, NewClient, NewService, Service,
};

use crate::models::{CreateClientRequest, CreateServiceRequest, DirectoryError};

pub struct CatalogService {
    store: Arc<dyn AppointmentStore>,
}

impl CatalogService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
        }
    }

    pub async fn create_service(&self, request: CreateServiceRequest) -> Result<Service, DirectoryError> {
        if request.name.trim().is_empty() {
            return Err(DirectoryError::Validation(
                "Service name must not be empty".to_string(),
            ));
        }
        if request.duration_minutes <= 0 {
            return Err(DirectoryError::Validation(
                "Service duration must be positive".to_string(),
            ));
        }
        if request.price_cents < 0 {
            return Err(DirectoryError::Validation(
                "Service price must not be negative".to_string(),
            ));
        }

        let service = self
            .store
            .create_service(NewService {
                name: request.name,
                duration_minutes: request.duration_minutes,
                price_cents: request.price_cents,
                resource_id: request.resource_id,
            })
            .await?;

        info!("Created service {} ({})", service.id, service.name);
        Ok(service)
    }

    pub async fn get_service(&self, id: Uuid) -> Result<Service, DirectoryError> {
        self.store.get_service(id).await.map_err(Into::into)
    }

    pub async fn list_services(&self) -> Result<Vec<Service>, DirectoryError> {
        self.store.list_services().await.map_err(Into::into)
    }

    /// A service with scheduled future appointments cannot be deleted.
    pub async fn delete_service(&self, id: Uuid) -> Result<(), DirectoryError> {
        self.store.get_service(id).await?;

        let appointments = self.store.list_by_service(id).await?;
        if Self::any_future_scheduled(&appointments) {
            return Err(DirectoryError::HasFutureAppointments);
        }

        self.store.delete_service(id).await?;
        info!("Deleted service {}", id);
        Ok(())
    }

    pub async fn create_client(
        &self,
        owner_user_id: Uuid,
        request: CreateClientRequest,
    ) -> Result<Client, DirectoryError> {
        if request.name.trim().is_empty() {
            return Err(DirectoryError::Validation(
                "Client name must not be empty".to_string(),
            ));
        }

        let client = self
            .store
            .create_client(NewClient {
                name: request.name,
                contact: request.contact,
                owner_user_id,
            })
            .await?;

        debug!("Created client {} for user {}", client.id, owner_user_id);
        Ok(client)
    }

    pub async fn get_client(&self, id: Uuid) -> Result<Client, DirectoryError> {
        self.store.get_client(id).await.map_err(Into::into)
    }

    pub async fn list_clients(&self, owner_user_id: Uuid) -> Result<Vec<Client>, DirectoryError> {
        self.store.list_clients(owner_user_id).await.map_err(Into::into)
    }

    /// A client with scheduled future appointments cannot be deleted; past
    /// history does not block removal.
    pub async fn delete_client(&self, id: Uuid) -> Result<(), DirectoryError> {
        self.store.get_client(id).await?;

        let appointments = self.store.list_by_client(id).await?;
        if Self::any_future_scheduled(&appointments) {
            return Err(DirectoryError::HasFutureAppointments);
        }

        self.store.delete_client(id).await?;
        info!("Deleted client {}", id);
        Ok(())
    }

    fn any_future_scheduled(appointments: &[Appointment]) -> bool {
        let now = Utc::now();
        appointments
            .iter()
            .any(|a| a.status == AppointmentStatus::Scheduled && a.end_time > now)
    }
}
