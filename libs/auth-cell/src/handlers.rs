use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::debug;

use shared_database::AppState;
use shared_models::error::AppError;

use crate::models::{CredentialError, LoginRequest, RegisterRequest};
use crate::services::credentials::CredentialService;

fn map_credential_error(e: CredentialError) -> AppError {
    match e {
        CredentialError::InvalidCredentials => AppError::Auth(e.to_string()),
        CredentialError::EmailTaken => AppError::Conflict(e.to_string()),
        CredentialError::Validation(msg) => AppError::BadRequest(msg),
        CredentialError::Unavailable(msg) => AppError::Unavailable(msg),
        CredentialError::Hashing | CredentialError::TokenSigning(_) => {
            AppError::Internal(e.to_string())
        }
    }
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    debug!("Registering account for {}", request.email);

    let service = CredentialService::new(&state);
    let token = service
        .register(request)
        .await
        .map_err(map_credential_error)?;

    Ok((StatusCode::CREATED, Json(json!({ "token": token }))))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("Login attempt for {}", request.email);

    let service = CredentialService::new(&state);
    let token = service.login(request).await.map_err(map_credential_error)?;

    Ok(Json(json!({ "token": token })))
}
