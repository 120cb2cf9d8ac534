//! OpenAPI document, served as plain JSON at `/api-docs/openapi.json`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::auth::Role;
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::orders::create_order,
        handlers::orders::my_orders,
        handlers::orders::all_orders,
        handlers::orders::update_status,
        handlers::orders::update_status_by_id,
        handlers::orders::available_orders,
        handlers::orders::my_deliveries,
        handlers::orders::accept_order,
        handlers::orders::release_order,
        handlers::orders::complete_order,
        handlers::orders::cancel_order,
        handlers::health::health_check,
        handlers::health::api_status,
    ),
    components(schemas(Role)),
    modifiers(&SecurityAddon),
    tags(
        (name = "Orders", description = "Order placement and lifecycle"),
        (name = "Delivery", description = "Delivery agent workflow"),
        (name = "Health", description = "Liveness and readiness"),
    ),
    info(
        title = "Washline API",
        description = "Laundry pickup and delivery order management",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub async fn serve_openapi() -> axum::Json<utoipa::openapi::OpenApi> {
    axum::Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_includes_every_order_path() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/api/orders",
            "/api/orders/all",
            "/api/orders/status",
            "/api/orders/{id}/status",
            "/api/orders/delivery-available",
            "/api/orders/my-deliveries",
            "/api/orders/{id}/accept",
            "/api/orders/{id}/release",
            "/api/orders/{id}/complete",
            "/api/orders/{id}/cancel",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing path {expected}"
            );
        }
    }
}
