use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::AppJson;
use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::orders::{
    AdminOrderView, AssignedOrderView, AvailableOrderView, CustomerOrderView, NewOrder,
    NewOrderLine, OrderStatus,
};
use crate::{ApiResponse, AppState};

// Order DTOs

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "customerName is required"))]
    pub customer_name: String,

    #[validate(length(min = 1, message = "phone is required"))]
    pub phone: String,

    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,

    pub pickup_date: NaiveDate,

    #[validate(length(min = 1, message = "pickupTime is required"))]
    pub pickup_time: String,

    pub delivery_date: Option<NaiveDate>,
    pub instructions: Option<String>,

    #[validate(length(min = 1, message = "at least one service is required"))]
    pub services: Vec<CreateOrderLine>,

    /// Client-side sum; the server recomputes and persists its own total
    pub total: Option<Decimal>,
}

/// One selected catalog service; name/price/unit are snapshotted onto the
/// order line as submitted
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderLine {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub unit: String,
    pub quantity: Decimal,
    pub total: Option<Decimal>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order_id: String,
    pub status: String,
    pub total: Decimal,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub order_id: String,
    pub status: String,
    pub total: Decimal,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusBodyRequest {
    #[validate(length(min = 1, message = "orderId is required"))]
    pub order_id: String,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcceptResponse {
    pub order_id: String,
    pub delivery_agent_id: uuid::Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderIdResponse {
    pub order_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelResponse {
    pub order_id: String,
    pub status: String,
    pub total: Decimal,
    pub cancelled_at: Option<DateTime<Utc>>,
}

/// Place a new order
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = ApiResponse<CreateOrderResponse>),
        (status = 400, description = "Validation failure", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_order(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppJson(request): AppJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreateOrderResponse>>), ServiceError> {
    request.validate().map_err(ServiceError::from)?;

    let new_order = NewOrder {
        customer_name: request.customer_name,
        customer_phone: request.phone,
        address: request.address,
        pickup_date: request.pickup_date,
        pickup_time: request.pickup_time,
        delivery_date: request.delivery_date,
        instructions: request.instructions,
        lines: request
            .services
            .into_iter()
            .map(|line| NewOrderLine {
                service_id: line.id,
                service_name: line.name,
                unit: line.unit,
                unit_price: line.price,
                quantity: line.quantity,
            })
            .collect(),
    };

    let order = state.orders.create_order(auth_user.id, new_order).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreateOrderResponse {
            order_id: order.order_number,
            status: order.status,
            total: order.total_amount,
        })),
    ))
}

/// Customer: list own orders with tracking stage
#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Orders",
    responses(
        (status = 200, description = "Orders for the caller", body = ApiResponse<Vec<CustomerOrderView>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn my_orders(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<CustomerOrderView>>>, ServiceError> {
    let views = state.orders.list_for_customer(auth_user.id).await?;
    Ok(Json(ApiResponse::success(views)))
}

/// Admin: list all orders, newest first
#[utoipa::path(
    get,
    path = "/api/orders/all",
    tag = "Orders",
    responses(
        (status = 200, description = "All orders", body = ApiResponse<Vec<AdminOrderView>>),
        (status = 403, description = "Role mismatch", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn all_orders(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<AdminOrderView>>>, ServiceError> {
    let views = state.orders.list_all().await?;
    Ok(Json(ApiResponse::success(views)))
}

/// Admin: overwrite an order's status (order id in the body)
#[utoipa::path(
    put,
    path = "/api/orders/status",
    tag = "Orders",
    request_body = UpdateStatusBodyRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<OrderSummary>),
        (status = 400, description = "Unknown status value", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_status(
    State(state): State<AppState>,
    AppJson(request): AppJson<UpdateStatusBodyRequest>,
) -> Result<Json<ApiResponse<OrderSummary>>, ServiceError> {
    request.validate().map_err(ServiceError::from)?;
    let status = OrderStatus::parse(&request.status)?;
    let order_id = state.orders.resolve_order_id(&request.order_id).await?;

    let updated = state.orders.set_status(order_id, status).await?;

    Ok(Json(ApiResponse::success(OrderSummary {
        order_id: updated.order_number,
        status: updated.status,
        total: updated.total_amount,
    })))
}

/// Admin or delivery: overwrite an order's status (order id in the path)
#[utoipa::path(
    patch,
    path = "/api/orders/{id}/status",
    tag = "Orders",
    params(("id" = String, Path, description = "Order number or internal id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<OrderSummary>),
        (status = 400, description = "Unknown status value", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_status_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(request): AppJson<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<OrderSummary>>, ServiceError> {
    let status = OrderStatus::parse(&request.status)?;
    let order_id = state.orders.resolve_order_id(&id).await?;

    let updated = state.orders.set_status(order_id, status).await?;

    Ok(Json(ApiResponse::success(OrderSummary {
        order_id: updated.order_number,
        status: updated.status,
        total: updated.total_amount,
    })))
}

/// Delivery: list claimable, unassigned orders
#[utoipa::path(
    get,
    path = "/api/orders/delivery-available",
    tag = "Delivery",
    responses(
        (status = 200, description = "Unclaimed orders", body = ApiResponse<Vec<AvailableOrderView>>),
        (status = 403, description = "Role mismatch", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn available_orders(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<AvailableOrderView>>>, ServiceError> {
    let views = state.orders.list_available_for_delivery().await?;
    Ok(Json(ApiResponse::success(views)))
}

/// Delivery: list orders assigned to the caller
#[utoipa::path(
    get,
    path = "/api/orders/my-deliveries",
    tag = "Delivery",
    responses(
        (status = 200, description = "Assigned orders", body = ApiResponse<Vec<AssignedOrderView>>),
        (status = 403, description = "Role mismatch", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn my_deliveries(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<AssignedOrderView>>>, ServiceError> {
    let views = state.orders.list_assigned_to(auth_user.id).await?;
    Ok(Json(ApiResponse::success(views)))
}

/// Delivery: claim an unassigned order
#[utoipa::path(
    patch,
    path = "/api/orders/{id}/accept",
    tag = "Delivery",
    params(("id" = String, Path, description = "Order number or internal id")),
    responses(
        (status = 200, description = "Order claimed", body = ApiResponse<AcceptResponse>),
        (status = 400, description = "Order no longer available", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn accept_order(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<AcceptResponse>>, ServiceError> {
    let order_id = state.orders.resolve_order_id(&id).await?;
    let updated = state.orders.accept(order_id, auth_user.id).await?;

    Ok(Json(ApiResponse::success(AcceptResponse {
        order_id: updated.order_number,
        delivery_agent_id: auth_user.id,
    })))
}

/// Delivery: release a claimed order back to the pool
#[utoipa::path(
    patch,
    path = "/api/orders/{id}/release",
    tag = "Delivery",
    params(("id" = String, Path, description = "Order number or internal id")),
    responses(
        (status = 200, description = "Order released", body = ApiResponse<OrderIdResponse>),
        (status = 404, description = "Order not found or not assigned to caller", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn release_order(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<OrderIdResponse>>, ServiceError> {
    let order_id = state.orders.resolve_order_id(&id).await?;
    let updated = state.orders.release(order_id, auth_user.id).await?;

    Ok(Json(ApiResponse::success(OrderIdResponse {
        order_id: updated.order_number,
    })))
}

/// Delivery: finalize delivery. Permanently removes the order and its items.
#[utoipa::path(
    patch,
    path = "/api/orders/{id}/complete",
    tag = "Delivery",
    params(("id" = String, Path, description = "Order number or internal id")),
    responses(
        (status = 200, description = "Order delivered and removed", body = ApiResponse<OrderIdResponse>),
        (status = 404, description = "Order not found or not assigned to caller", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn complete_order(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<OrderIdResponse>>, ServiceError> {
    let order_id = state.orders.resolve_order_id(&id).await?;
    let order_number = state
        .orders
        .finalize_delivery(order_id, auth_user.id)
        .await?;

    Ok(Json(ApiResponse::success_with_message(
        OrderIdResponse {
            order_id: order_number,
        },
        "Order delivered and removed".to_string(),
    )))
}

/// Customer: cancel an own order while still Pending or In Progress
#[utoipa::path(
    patch,
    path = "/api/orders/{id}/cancel",
    tag = "Orders",
    params(("id" = String, Path, description = "Order number or internal id")),
    responses(
        (status = 200, description = "Order cancelled", body = ApiResponse<CancelResponse>),
        (status = 400, description = "Not cancellable in current status", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CancelResponse>>, ServiceError> {
    let order_id = state.orders.resolve_order_id(&id).await?;
    let updated = state.orders.cancel(order_id, auth_user.id).await?;

    Ok(Json(ApiResponse::success(CancelResponse {
        order_id: updated.order_number,
        status: updated.status,
        total: updated.total_amount,
        cancelled_at: updated.cancelled_at,
    })))
}
