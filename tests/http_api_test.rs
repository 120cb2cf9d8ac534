mod common;

use axum::{body::Body, Extension, Router};
use http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use washline_api::auth::{AuthConfig, AuthService, Role};
use washline_api::config::AppConfig;
use washline_api::events::EventSender;
use washline_api::{api_routes, AppState};

use common::test_db;

const TEST_SECRET: &str = "an_integration_test_secret_that_is_long_enough";

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        auth_issuer: "washline-auth".to_string(),
        auth_audience: "washline-api".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "development".to_string(),
        log_level: "warn".to_string(),
        log_json: false,
        auto_migrate: false,
        cors_allowed_origins: None,
        db_max_connections: 1,
        db_min_connections: 1,
        db_connect_timeout_secs: 5,
        db_acquire_timeout_secs: 5,
        db_idle_timeout_secs: 60,
    }
}

struct TestApp {
    router: Router,
    auth: Arc<AuthService>,
    // keeps the event channel open for the lifetime of the test
    _event_rx: mpsc::Receiver<washline_api::events::Event>,
}

async fn test_app() -> TestApp {
    let db = test_db().await;
    let config = test_config();

    let (event_tx, event_rx) = mpsc::channel(64);
    let event_sender = EventSender::new(event_tx);

    let auth = Arc::new(AuthService::new(AuthConfig::from(&config)));
    let state = AppState::new(db, config, event_sender);

    let router = Router::new()
        .nest("/api", api_routes())
        .layer(Extension(auth.clone()))
        .with_state(state);

    TestApp {
        router,
        auth,
        _event_rx: event_rx,
    }
}

impl TestApp {
    fn token_for(&self, subject: Uuid, role: Role) -> String {
        self.auth.issue_token(subject, role).unwrap()
    }
}

fn order_payload() -> Value {
    json!({
        "customerName": "Asha Rao",
        "phone": "+91-9000000001",
        "address": "12 Lakeview Road",
        "pickupDate": "2025-08-01",
        "pickupTime": "10:00 AM - 12:00 PM",
        "services": [
            { "id": 1, "name": "Wash & Fold", "price": "40", "unit": "per kg", "quantity": "3" }
        ]
    })
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn requests_without_a_token_are_unauthorized() {
    let app = test_app().await;

    let response = app
        .router
        .oneshot(request("GET", "/api/orders", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn wrong_role_is_forbidden() {
    let app = test_app().await;
    let token = app.token_for(Uuid::new_v4(), Role::Delivery);

    let response = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/api/orders",
            Some(&token),
            Some(order_payload()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let customer_token = app.token_for(Uuid::new_v4(), Role::Customer);
    let response = app
        .router
        .oneshot(request("GET", "/api/orders/all", Some(&customer_token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn customer_places_an_order_and_sees_it_listed() {
    let app = test_app().await;
    let customer = Uuid::new_v4();
    let token = app.token_for(customer, Role::Customer);

    let response = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/api/orders",
            Some(&token),
            Some(order_payload()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = read_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["status"], json!("Pending"));
    let order_id = body["data"]["orderId"].as_str().unwrap().to_string();
    assert!(order_id.starts_with("ORD-"));

    let response = app
        .router
        .oneshot(request("GET", "/api/orders", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    let orders = body["data"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["id"], json!(order_id));
    assert_eq!(orders[0]["trackingStage"], json!("Picked Up"));
    assert_eq!(orders[0]["deliveryDate"], json!("2025-08-03"));
}

#[tokio::test]
async fn delivery_agent_claims_and_completes_by_order_number() {
    let app = test_app().await;
    let customer_token = app.token_for(Uuid::new_v4(), Role::Customer);
    let agent_token = app.token_for(Uuid::new_v4(), Role::Delivery);

    let response = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/api/orders",
            Some(&customer_token),
            Some(order_payload()),
        ))
        .await
        .unwrap();
    let body = read_json(response).await;
    let order_id = body["data"]["orderId"].as_str().unwrap().to_string();

    let response = app
        .router
        .clone()
        .oneshot(request(
            "PATCH",
            &format!("/api/orders/{order_id}/accept"),
            Some(&agent_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["orderId"], json!(order_id));

    let response = app
        .router
        .clone()
        .oneshot(request(
            "PATCH",
            &format!("/api/orders/{order_id}/complete"),
            Some(&agent_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Gone for the customer as well
    let response = app
        .router
        .oneshot(request("GET", "/api/orders", Some(&customer_token), None))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn missing_required_field_is_an_enveloped_400() {
    let app = test_app().await;
    let token = app.token_for(Uuid::new_v4(), Role::Customer);

    let mut payload = order_payload();
    payload.as_object_mut().unwrap().remove("pickupDate");

    let response = app
        .router
        .oneshot(request("POST", "/api/orders", Some(&token), Some(payload)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["success"], json!(false));
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("pickupDate"), "message was: {message}");
}

#[tokio::test]
async fn admin_rejects_unknown_status_values() {
    let app = test_app().await;
    let customer_token = app.token_for(Uuid::new_v4(), Role::Customer);
    let admin_token = app.token_for(Uuid::new_v4(), Role::Admin);

    let response = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/api/orders",
            Some(&customer_token),
            Some(order_payload()),
        ))
        .await
        .unwrap();
    let body = read_json(response).await;
    let order_id = body["data"]["orderId"].as_str().unwrap().to_string();

    let response = app
        .router
        .clone()
        .oneshot(request(
            "PUT",
            "/api/orders/status",
            Some(&admin_token),
            Some(json!({ "orderId": order_id, "status": "Shipped" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["success"], json!(false));

    let response = app
        .router
        .oneshot(request(
            "PUT",
            "/api/orders/status",
            Some(&admin_token),
            Some(json!({ "orderId": order_id, "status": "In Progress" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["status"], json!("In Progress"));
}

#[tokio::test]
async fn health_endpoints_need_no_token() {
    let app = test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(request("GET", "/api/status", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router
        .oneshot(request("GET", "/api/health", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["checks"]["database"], json!("healthy"));
}
