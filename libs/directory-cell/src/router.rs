use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use shared_database::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn service_routes(state: AppState) -> Router {
    Router::new()
        .route("/", post(handlers::create_service))
        .route("/", get(handlers::list_services))
        .route("/{service_id}", get(handlers::get_service))
        .route("/{service_id}", delete(handlers::delete_service))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

pub fn client_routes(state: AppState) -> Router {
    Router::new()
        .route("/", post(handlers::create_client))
        .route("/", get(handlers::list_clients))
        .route("/{client_id}", delete(handlers::delete_client))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ))
        .with_state(state)
}
