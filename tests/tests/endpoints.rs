use axum::body::{to_bytes, Body};
use axum::Router;
use http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use endpoint_integration_tests::{build_test_app, seed_admin};
use shared_database::store::AppointmentStore;

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn register(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/auth/register",
        None,
        Some(json!({
            "display_name": "Test User",
            "email": email,
            "password": "a long enough password",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_string()
}

async fn create_service(app: &Router, token: &str, duration_minutes: i64) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/services",
        Some(token),
        Some(json!({
            "name": "Consultation",
            "duration_minutes": duration_minutes,
            "price_cents": 9_000,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn create_client(app: &Router, token: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/clients",
        Some(token),
        Some(json!({ "name": "Casey", "contact": "casey@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn book(
    app: &Router,
    token: &str,
    service_id: &str,
    client_id: &str,
    start: &str,
    end: Option<&str>,
) -> (StatusCode, Value) {
    let mut payload = json!({
        "service_id": service_id,
        "client_id": client_id,
        "start_time": start,
    });
    if let Some(end) = end {
        payload["end_time"] = json!(end);
    }
    send(app, "POST", "/appointments", Some(token), Some(payload)).await
}

#[tokio::test]
async fn unauthenticated_mutations_are_rejected_without_store_writes() {
    let (app, state) = build_test_app();

    let (status, _) = send(&app, "POST", "/appointments", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A non-bearer scheme is rejected the same way.
    let request = Request::builder()
        .method("POST")
        .uri("/appointments")
        .header("Authorization", "Token abc123")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // A garbage bearer token is rejected too.
    let (status, _) = send(
        &app,
        "GET",
        "/appointments/my-appointments",
        Some("not.a.token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Nothing reached the store.
    let start = "2000-01-01T00:00:00Z".parse().unwrap();
    let end = "2100-01-01T00:00:00Z".parse().unwrap();
    assert!(state
        .store
        .list_by_date_range(start, end)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn register_book_and_conflicting_rebook_end_to_end() {
    let (app, _state) = build_test_app();

    let token = register(&app, "u1@example.com").await;
    let service_id = create_service(&app, &token, 30).await;
    let client_id = create_client(&app, &token).await;

    let (status, appointment) = book(
        &app,
        &token,
        &service_id,
        &client_id,
        "2025-01-01T10:00:00Z",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(appointment["start_time"], "2025-01-01T10:00:00Z");
    assert_eq!(appointment["end_time"], "2025-01-01T10:30:00Z");
    assert_eq!(appointment["status"], "scheduled");
    let first_id = appointment["id"].as_str().unwrap().to_string();

    let (status, conflict) = book(
        &app,
        &token,
        &service_id,
        &client_id,
        "2025-01-01T10:10:00Z",
        Some("2025-01-01T10:25:00Z"),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        conflict["conflicting_appointment_ids"],
        json!([first_id])
    );

    // Touching interval right at the boundary is accepted.
    let (status, _) = book(
        &app,
        &token,
        &service_id,
        &client_id,
        "2025-01-01T10:30:00Z",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn login_returns_a_usable_token() {
    let (app, _state) = build_test_app();
    register(&app, "login@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "login@example.com", "password": "a long enough password" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap();

    let (status, _) = send(&app, "GET", "/appointments/my-appointments", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "login@example.com", "password": "wrong password here" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn delete_cancels_and_double_cancel_conflicts() {
    let (app, _state) = build_test_app();
    let token = register(&app, "cancel@example.com").await;
    let service_id = create_service(&app, &token, 30).await;
    let client_id = create_client(&app, &token).await;

    let (_, appointment) = book(
        &app,
        &token,
        &service_id,
        &client_id,
        "2025-01-01T10:00:00Z",
        None,
    )
    .await;
    let id = appointment["id"].as_str().unwrap().to_string();

    let uri = format!("/appointments/{}", id);
    let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The record survives as a cancelled appointment.
    let (status, stored) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["status"], "cancelled");

    let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn purge_is_admin_gated() {
    let (app, state) = build_test_app();
    let token = register(&app, "purge@example.com").await;
    let service_id = create_service(&app, &token, 30).await;
    let client_id = create_client(&app, &token).await;

    let (_, appointment) = book(
        &app,
        &token,
        &service_id,
        &client_id,
        "2025-01-01T10:00:00Z",
        None,
    )
    .await;
    let id = appointment["id"].as_str().unwrap().to_string();
    let uri = format!("/appointments/{}/purge", id);

    let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, admin_token) = seed_admin(&state).await;
    let (status, _) = send(&app, "DELETE", &uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/appointments/{}", id),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn date_range_endpoint_validates_and_sorts() {
    let (app, _state) = build_test_app();
    let token = register(&app, "range@example.com").await;
    let service_id = create_service(&app, &token, 30).await;
    let client_id = create_client(&app, &token).await;

    for start in ["2025-01-01T14:00:00Z", "2025-01-01T09:00:00Z"] {
        let (status, _) = book(&app, &token, &service_id, &client_id, start, None).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        "GET",
        "/appointments/date-range?from=2025-01-01T00:00:00Z&to=2025-01-02T00:00:00Z",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["start_time"], "2025-01-01T09:00:00Z");
    assert_eq!(listed[1]["start_time"], "2025-01-01T14:00:00Z");

    let (status, _) = send(
        &app,
        "GET",
        "/appointments/date-range?from=2025-01-02T00:00:00Z&to=2025-01-01T00:00:00Z",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reschedule_endpoint_moves_or_conflicts() {
    let (app, _state) = build_test_app();
    let token = register(&app, "reschedule@example.com").await;
    let service_id = create_service(&app, &token, 30).await;
    let client_id = create_client(&app, &token).await;

    let (_, blocker) = book(
        &app,
        &token,
        &service_id,
        &client_id,
        "2025-01-01T11:00:00Z",
        None,
    )
    .await;
    let (_, appointment) = book(
        &app,
        &token,
        &service_id,
        &client_id,
        "2025-01-01T10:00:00Z",
        None,
    )
    .await;
    let uri = format!("/appointments/{}", appointment["id"].as_str().unwrap());

    let (status, moved) = send(
        &app,
        "PUT",
        &uri,
        Some(&token),
        Some(json!({ "new_start_time": "2025-01-01T12:00:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["start_time"], "2025-01-01T12:00:00Z");
    assert_eq!(moved["end_time"], "2025-01-01T12:30:00Z");

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(&token),
        Some(json!({ "new_start_time": "2025-01-01T11:15:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["conflicting_appointment_ids"],
        json!([blocker["id"].as_str().unwrap()])
    );
}

#[tokio::test]
async fn notifications_are_listed_and_marked_read() {
    let (app, _state) = build_test_app();
    let token = register(&app, "notify@example.com").await;
    let service_id = create_service(&app, &token, 30).await;
    let client_id = create_client(&app, &token).await;

    book(
        &app,
        &token,
        &service_id,
        &client_id,
        "2025-01-01T10:00:00Z",
        None,
    )
    .await;

    let (status, inbox) = send(&app, "GET", "/notifications", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let inbox = inbox.as_array().unwrap().clone();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0]["kind"], "booked");
    assert_eq!(inbox[0]["read"], false);
    let notification_id = inbox[0]["id"].as_str().unwrap().to_string();

    // Another account cannot touch this notification.
    let other_token = register(&app, "other@example.com").await;
    let uri = format!("/notifications/{}/read", notification_id);
    let (status, _) = send(&app, "POST", &uri, Some(&other_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, updated) = send(&app, "POST", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["read"], true);
}

#[tokio::test]
async fn client_deletion_is_blocked_while_appointments_are_scheduled() {
    let (app, _state) = build_test_app();
    let token = register(&app, "client-del@example.com").await;
    let service_id = create_service(&app, &token, 30).await;
    let client_id = create_client(&app, &token).await;

    // A booking far in the future blocks removal.
    let (status, appointment) = book(
        &app,
        &token,
        &service_id,
        &client_id,
        "2035-06-01T10:00:00Z",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/clients/{}", client_id);
    let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let cancel_uri = format!("/appointments/{}", appointment["id"].as_str().unwrap());
    let (status, _) = send(&app, "DELETE", &cancel_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn my_appointments_only_lists_the_callers_bookings() {
    let (app, _state) = build_test_app();
    let token_a = register(&app, "a@example.com").await;
    let token_b = register(&app, "b@example.com").await;
    let service_id = create_service(&app, &token_a, 30).await;
    let client_a = create_client(&app, &token_a).await;
    let client_b = create_client(&app, &token_b).await;

    book(&app, &token_a, &service_id, &client_a, "2025-01-01T10:00:00Z", None).await;
    book(&app, &token_b, &service_id, &client_b, "2025-01-01T11:00:00Z", None).await;

    let (status, mine) = send(
        &app,
        "GET",
        "/appointments/my-appointments",
        Some(&token_a),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let mine = mine.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["start_time"], "2025-01-01T10:00:00Z");
}
