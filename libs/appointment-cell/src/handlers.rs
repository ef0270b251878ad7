use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::AppState;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_models::records::Appointment;

use crate::models::{BookAppointmentRequest, DateRangeQuery, RescheduleAppointmentRequest};
use crate::services::booking::AppointmentBookingService;

/// Access to an existing appointment is limited to its owner and to admins.
fn authorize_owner(user: &AuthUser, appointment: &Appointment) -> Result<(), AppError> {
    if appointment.owner_user_id != user.id && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to access this appointment".to_string(),
        ));
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointment = booking_service.book_appointment(user.id, request).await?;

    Ok((StatusCode::CREATED, Json(json!(appointment))))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointment = booking_service.get_appointment(appointment_id).await?;
    authorize_owner(&user, &appointment)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointment = booking_service.get_appointment(appointment_id).await?;
    authorize_owner(&user, &appointment)?;

    let updated = booking_service
        .reschedule_appointment(appointment_id, request)
        .await?;

    Ok(Json(json!(updated)))
}

/// Removal is the `cancelled` transition; records stay behind for history.
#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<AuthUser>,
) -> Result<StatusCode, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointment = booking_service.get_appointment(appointment_id).await?;
    authorize_owner(&user, &appointment)?;

    booking_service.cancel_appointment(appointment_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointment = booking_service.get_appointment(appointment_id).await?;
    authorize_owner(&user, &appointment)?;

    let completed = booking_service.complete_appointment(appointment_id).await?;

    Ok(Json(json!(completed)))
}

/// Physical deletion, admin only.
#[axum::debug_handler]
pub async fn purge_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<AuthUser>,
) -> Result<StatusCode, AppError> {
    if !user.is_admin() {
        return Err(AppError::Forbidden(
            "Only administrators may purge appointments".to_string(),
        ));
    }

    let booking_service = AppointmentBookingService::new(&state);
    booking_service.purge_appointment(appointment_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn my_appointments(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointments = booking_service.my_appointments(user.id).await?;

    Ok(Json(json!(appointments)))
}

#[axum::debug_handler]
pub async fn appointments_by_service(
    State(state): State<AppState>,
    Path(service_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointments = booking_service.appointments_by_service(service_id).await?;

    Ok(Json(json!(appointments)))
}

#[axum::debug_handler]
pub async fn appointments_by_client(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointments = booking_service.appointments_by_client(client_id).await?;

    Ok(Json(json!(appointments)))
}

#[axum::debug_handler]
pub async fn appointments_by_date_range(
    State(state): State<AppState>,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointments = booking_service
        .appointments_in_range(range.from, range.to)
        .await?;

    Ok(Json(json!(appointments)))
}
