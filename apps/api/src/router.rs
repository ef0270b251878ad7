use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use auth_cell::router::auth_routes;
use directory_cell::router::{client_routes, service_routes};
use notification_cell::router::notification_routes;
use shared_database::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Reserva API is running!" }))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/services", service_routes(state.clone()))
        .nest("/clients", client_routes(state.clone()))
        .nest("/notifications", notification_routes(state))
}
