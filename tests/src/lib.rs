//! Shared fixture for endpoint-level tests: the full application router over
//! a fresh in-memory store, mirroring the wiring in `apps/api`.

use std::sync::Arc;

use axum::{routing::get, Router};
use uuid::Uuid;

use appointment_cell::router::appointment_routes;
use auth_cell::router::auth_routes;
use auth_cell::CredentialService;
use directory_cell::router::{client_routes, service_routes};
use notification_cell::router::notification_routes;
use shared_config::AppConfig;
use shared_database::store::AppointmentStore;
use shared_database::{AppState, MemoryStore};
use shared_models::auth::Role;
use shared_models::records::NewUser;
use shared_utils::jwt::issue_token;

pub const TEST_SECRET: &str = "endpoint-test-secret";

pub fn build_test_app() -> (Router, AppState) {
    let config = AppConfig {
        jwt_secret: TEST_SECRET.to_string(),
        token_ttl_hours: 24,
        port: 0,
    };
    let state = AppState::new(Arc::new(config), Arc::new(MemoryStore::new()));

    let app = Router::new()
        .route("/", get(|| async { "Reserva API is running!" }))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/services", service_routes(state.clone()))
        .nest("/clients", client_routes(state.clone()))
        .nest("/notifications", notification_routes(state.clone()));

    (app, state)
}

/// Admins are provisioned out of band, so tests seed one directly.
pub async fn seed_admin(state: &AppState) -> (Uuid, String) {
    let password_hash = CredentialService::hash_password("admin password").unwrap();
    let admin = state
        .store
        .create_user(NewUser {
            display_name: "Admin".to_string(),
            email: format!("admin-{}@example.com", Uuid::new_v4()),
            password_hash,
            role: Role::Admin,
        })
        .await
        .unwrap();

    let token = issue_token(admin.id, Role::Admin, TEST_SECRET, 24).unwrap();
    (admin.id, token)
}
