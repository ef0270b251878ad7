use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_database::{AppState, AppointmentStore, StoreError};
use shared_models::auth::AuthUser;
use shared_models::error::AppError;

fn map_store_error(e: StoreError) -> AppError {
    match e {
        StoreError::NotFound => AppError::NotFound("Notification not found".to_string()),
        other => AppError::Unavailable(other.to_string()),
    }
}

#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    debug!("Listing notifications for user {}", user.id);

    let notifications = state
        .store
        .list_notifications(user.id)
        .await
        .map_err(map_store_error)?;

    Ok(Json(json!(notifications)))
}

#[axum::debug_handler]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    debug!(
        "Marking notification {} read for user {}",
        notification_id, user.id
    );

    let notification = state
        .store
        .mark_notification_read(notification_id, user.id)
        .await
        .map_err(map_store_error)?;

    Ok(Json(json!(notification)))
}
