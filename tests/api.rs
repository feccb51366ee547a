// tests/api.rs
//
// Testes de integração da API completa: router real, stores em memória e
// notificador de gravação. Cada teste monta sua própria aplicação.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method, Request, StatusCode,
    },
    Router,
};
use chrono::{Days, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use securehome_backend::{
    build_router,
    config::{AppState, Stores},
    services::notifications::RecordingNotifier,
};

fn test_app() -> (Router, RecordingNotifier) {
    let notifier = RecordingNotifier::new();
    let state = AppState::with_stores(
        Stores::in_memory(),
        Arc::new(notifier.clone()),
        "integration-test-secret".to_string(),
    );
    (build_router(state), notifier)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn register(app: &Router, username: &str, role: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "hunter22",
            "fullName": format!("Test {username}"),
            "role": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register {username}: {body}");
    body["token"].as_str().unwrap().to_string()
}

async fn me(app: &Router, token: &str) -> Value {
    let (status, body) = send(app, Method::GET, "/api/users/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    body
}

fn booking_payload(days_ahead: u64) -> Value {
    let date = Utc::now().date_naive() + Days::new(days_ahead);
    json!({
        "fullName": "Jordan Pierce",
        "email": "jordan@example.com",
        "phone": "555-0100",
        "address": "12 Elm Street",
        "preferredDate": date.format("%Y-%m-%d").to_string(),
        "preferredTime": "1:00 PM",
        "hasReceiptsReady": true,
    })
}

fn item_payload(appointment_id: &str, description: &str, value: &str) -> Value {
    json!({
        "appointmentId": appointment_id,
        "category": "electronics",
        "description": description,
        "estimatedValue": value,
    })
}

#[tokio::test]
async fn health_probe_answers() {
    let (app, _) = test_app();
    let (status, _) = send(&app, Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn full_audit_flow_from_booking_to_report() {
    let (app, notifier) = test_app();

    let homeowner = register(&app, "homeowner", "homeowner").await;
    let officer = register(&app, "officer", "officer").await;
    let admin = register(&app, "admin", "admin").await;
    let officer_id = me(&app, &officer).await["id"].as_str().unwrap().to_string();

    // Cliente agenda a visita
    let (status, appointment) = send(
        &app,
        Method::POST,
        "/api/appointments",
        Some(&homeowner),
        Some(booking_payload(2)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(appointment["status"], "scheduled");
    let appointment_id = appointment["id"].as_str().unwrap().to_string();
    assert_eq!(notifier.count_of("confirmation"), 1);

    // Admin atribui o oficial
    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/api/appointments/{appointment_id}/assign-officer"),
        Some(&admin),
        Some(json!({ "officerId": officer_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(notifier.count_of("agreement"), 1);

    // Oficial documenta três itens
    for (description, value) in [
        ("Television", "100"),
        ("Laptop", "200"),
        ("Camera kit", "300.50"),
    ] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/audit-items",
            Some(&officer),
            Some(item_payload(&appointment_id, description, value)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    // O primeiro item abriu a visita
    let (_, appointments) = send(&app, Method::GET, "/api/appointments", Some(&admin), None).await;
    assert_eq!(appointments[0]["status"], "in_progress");

    // Oficial gera o laudo
    let (status, report) = send(
        &app,
        Method::POST,
        &format!("/api/reports/generate/{appointment_id}"),
        Some(&officer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{report}");
    assert_eq!(report["totalItemsDocumented"], 3);
    assert_eq!(report["totalEstimatedValue"], "600.50");
    assert_eq!(report["status"], "completed");
    assert!(report["reportNumber"].as_str().unwrap().starts_with("RPT-"));
    assert!(!report["pdfData"].as_str().unwrap().is_empty());
    assert_eq!(notifier.count_of("report-ready"), 1);

    // O agendamento fechou junto
    let (_, appointments) = send(
        &app,
        Method::GET,
        "/api/appointments",
        Some(&homeowner),
        None,
    )
    .await;
    assert_eq!(appointments.as_array().unwrap().len(), 1);
    assert_eq!(appointments[0]["status"], "completed");
    assert!(!appointments[0]["completedAt"].is_null());

    // Segundo laudo para o mesmo agendamento é recusado
    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/reports/generate/{appointment_id}"),
        Some(&officer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn guest_booking_needs_no_session() {
    let (app, _) = test_app();
    let (status, appointment) = send(
        &app,
        Method::POST,
        "/api/appointments",
        None,
        Some(booking_payload(3)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(appointment["customerId"].is_null());
}

#[tokio::test]
async fn booking_outside_the_window_is_rejected() {
    let (app, _) = test_app();
    for days_ahead in [0, 10] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/appointments",
            None,
            Some(booking_payload(days_ahead)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{days_ahead} days ahead");
    }
}

#[tokio::test]
async fn protected_routes_reject_missing_or_bad_tokens() {
    let (app, _) = test_app();
    let cases = [
        (Method::GET, "/api/appointments"),
        (Method::GET, "/api/users/me"),
        (Method::GET, "/api/payments"),
    ];
    for (method, uri) in cases {
        let (status, _) = send(&app, method.clone(), uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri} without token");
        let (status, _) = send(&app, method, uri, Some("not-a-jwt"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri} with garbage token");
    }
}

#[tokio::test]
async fn admin_routes_are_fenced_by_role() {
    let (app, _) = test_app();
    let homeowner = register(&app, "morgan", "homeowner").await;

    for uri in ["/api/officers", "/api/dashboard/stats"] {
        let (status, _) = send(&app, Method::GET, uri, Some(&homeowner), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri} as homeowner");
    }

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/audit-items",
        Some(&homeowner),
        Some(item_payload(&Uuid::new_v4().to_string(), "TV", "10")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_appointment_is_a_404() {
    let (app, _) = test_app();
    let admin = register(&app, "supervisor", "admin").await;
    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/api/appointments/{}/status", Uuid::new_v4()),
        Some(&admin),
        Some(json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let (app, _) = test_app();
    register(&app, "taken", "homeowner").await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "username": "taken",
            "email": "taken@example.com",
            "password": "hunter22",
            "fullName": "Test taken",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_round_trip() {
    let (app, _) = test_app();
    register(&app, "casey", "homeowner").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "casey@example.com", "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap();
    assert_eq!(me(&app, token).await["username"], "casey");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "casey@example.com", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn payments_record_and_scoped_history() {
    let (app, _) = test_app();
    let admin = register(&app, "billing", "admin").await;
    let homeowner = register(&app, "payer", "homeowner").await;
    let other = register(&app, "bystander", "homeowner").await;
    let homeowner_id = me(&app, &homeowner).await["id"].as_str().unwrap().to_string();

    let (status, payment) = send(
        &app,
        Method::POST,
        "/api/payments",
        Some(&admin),
        Some(json!({
            "customerId": homeowner_id,
            "amount": "75.00",
            "service": "security_audit",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{payment}");
    assert_eq!(payment["status"], "completed");
    assert_eq!(payment["currency"], "USD");

    let (_, own) = send(&app, Method::GET, "/api/payments", Some(&homeowner), None).await;
    assert_eq!(own.as_array().unwrap().len(), 1);
    let (_, others) = send(&app, Method::GET, "/api/payments", Some(&other), None).await;
    assert!(others.as_array().unwrap().is_empty());

    // Registrar pagamento não é papel de cliente
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/payments",
        Some(&homeowner),
        Some(json!({
            "customerId": homeowner_id,
            "amount": "75.00",
            "service": "security_audit",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn dashboard_reflects_activity() {
    let (app, _) = test_app();
    let admin = register(&app, "overseer", "admin").await;
    register(&app, "patrol-one", "officer").await;
    register(&app, "patrol-two", "officer").await;

    send(
        &app,
        Method::POST,
        "/api/appointments",
        None,
        Some(booking_payload(2)),
    )
    .await;

    let (status, stats) = send(
        &app,
        Method::GET,
        "/api/dashboard/stats",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["appointmentsToday"], 1);
    assert_eq!(stats["activeOfficers"], 2);
    assert_eq!(stats["reportsGenerated"], 0);
    assert_eq!(stats["monthlyRevenue"], "0");
}

#[tokio::test]
async fn audit_item_listing_is_scoped_to_the_appointment() {
    let (app, _) = test_app();
    let admin = register(&app, "dispatcher", "admin").await;
    let officer = register(&app, "inspector", "officer").await;
    let officer_id = me(&app, &officer).await["id"].as_str().unwrap().to_string();

    let (_, appointment) = send(
        &app,
        Method::POST,
        "/api/appointments",
        None,
        Some(booking_payload(2)),
    )
    .await;
    let appointment_id = appointment["id"].as_str().unwrap().to_string();
    send(
        &app,
        Method::PATCH,
        &format!("/api/appointments/{appointment_id}/assign-officer"),
        Some(&admin),
        Some(json!({ "officerId": officer_id })),
    )
    .await;

    send(
        &app,
        Method::POST,
        "/api/audit-items",
        Some(&officer),
        Some(item_payload(&appointment_id, "Painting", "1200")),
    )
    .await;

    let (status, items) = send(
        &app,
        Method::GET,
        &format!("/api/audit-items/{appointment_id}"),
        Some(&officer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(items.as_array().unwrap().len(), 1);
    assert_eq!(items[0]["category"], "electronics");

    let (status, progress) = send(
        &app,
        Method::GET,
        &format!("/api/audit-items/{appointment_id}/progress"),
        Some(&officer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["documented"], 1);
    assert_eq!(progress["target"], 15);

    let (_, none) = send(
        &app,
        Method::GET,
        &format!("/api/audit-items/{}", Uuid::new_v4()),
        Some(&officer),
        None,
    )
    .await;
    assert!(none.as_array().unwrap().is_empty());
}
