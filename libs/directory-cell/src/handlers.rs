use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::AppState;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;

use crate::models::{CreateClientRequest, CreateServiceRequest};
use crate::services::catalog::CatalogService;

// ==============================================================================
// SERVICES
// ==============================================================================

#[axum::debug_handler]
pub async fn create_service(
    State(state): State<AppState>,
    Json(request): Json<CreateServiceRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let catalog = CatalogService::new(&state);

    let service = catalog.create_service(request).await?;

    Ok((StatusCode::CREATED, Json(json!(service))))
}

#[axum::debug_handler]
pub async fn get_service(
    State(state): State<AppState>,
    Path(service_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let catalog = CatalogService::new(&state);

    let service = catalog.get_service(service_id).await?;

    Ok(Json(json!(service)))
}

#[axum::debug_handler]
pub async fn list_services(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let catalog = CatalogService::new(&state);

    let services = catalog.list_services().await?;

    Ok(Json(json!(services)))
}

#[axum::debug_handler]
pub async fn delete_service(
    State(state): State<AppState>,
    Path(service_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let catalog = CatalogService::new(&state);

    catalog.delete_service(service_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ==============================================================================
// CLIENTS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_client(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let catalog = CatalogService::new(&state);

    let client = catalog.create_client(user.id, request).await?;

    Ok((StatusCode::CREATED, Json(json!(client))))
}

#[axum::debug_handler]
pub async fn list_clients(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let catalog = CatalogService::new(&state);

    let clients = catalog.list_clients(user.id).await?;

    Ok(Json(json!(clients)))
}

#[axum::debug_handler]
pub async fn delete_client(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
    Extension(user): Extension<AuthUser>,
) -> Result<StatusCode, AppError> {
    let catalog = CatalogService::new(&state);

    let client = catalog.get_client(client_id).await?;
    if client.owner_user_id != user.id && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to delete this client".to_string(),
        ));
    }

    catalog.delete_client(client_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
