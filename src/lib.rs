#![forbid(unsafe_code)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use axum::{
    routing::{get, patch, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::auth::{AuthRouterExt, Role};
use crate::config::AppConfig;
use crate::events::EventSender;
use crate::services::orders::OrderService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: AppConfig,
    pub event_sender: EventSender,
    pub orders: OrderService,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: AppConfig, event_sender: EventSender) -> Self {
        let orders = OrderService::new(db.clone(), Some(Arc::new(event_sender.clone())));
        Self {
            db,
            config,
            event_sender,
            orders,
        }
    }
}

/// Uniform response envelope; errors use the same shape via
/// [`errors::ErrorResponse`]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message),
        }
    }
}

/// All API routes, grouped by the role allowed to call them. Role gating is a
/// router-layer concern; ownership checks live in the service layer.
pub fn api_routes() -> Router<AppState> {
    let customer_routes = Router::new()
        .route("/orders", post(handlers::orders::create_order))
        .route("/orders", get(handlers::orders::my_orders))
        .route(
            "/orders/:id/cancel",
            patch(handlers::orders::cancel_order),
        )
        .with_role(Role::Customer);

    let admin_routes = Router::new()
        .route("/orders/all", get(handlers::orders::all_orders))
        .route("/orders/status", put(handlers::orders::update_status))
        .with_role(Role::Admin);

    let staff_routes = Router::new()
        .route(
            "/orders/:id/status",
            patch(handlers::orders::update_status_by_id),
        )
        .with_any_role(&[Role::Admin, Role::Delivery]);

    let delivery_routes = Router::new()
        .route(
            "/orders/delivery-available",
            get(handlers::orders::available_orders),
        )
        .route(
            "/orders/my-deliveries",
            get(handlers::orders::my_deliveries),
        )
        .route(
            "/orders/:id/accept",
            patch(handlers::orders::accept_order),
        )
        .route(
            "/orders/:id/release",
            patch(handlers::orders::release_order),
        )
        .route(
            "/orders/:id/complete",
            patch(handlers::orders::complete_order),
        )
        .with_role(Role::Delivery);

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/status", get(handlers::health::api_status));

    Router::new()
        .merge(customer_routes)
        .merge(admin_routes)
        .merge(staff_routes)
        .merge(delivery_routes)
        .merge(public_routes)
}
