//! Order lifecycle engine and role-scoped read views.
//!
//! The state machine is `Pending -> In Progress -> Ready for Delivery ->
//! Completed`, with `Cancelled` reachable only from the first two states.
//! "Completed" means two different things on purpose: the admin's
//! [`OrderService::set_status`] is an unguarded field overwrite that keeps the
//! row, while the assigned agent's [`OrderService::finalize_delivery`] deletes
//! the order and its line items permanently. The two paths must never be
//! unified.

use crate::{
    entities::order::{
        self, ActiveModel as OrderActiveModel, Entity as OrderEntity, Model as OrderModel,
    },
    entities::order_item::{self, ActiveModel as OrderItemActiveModel, Entity as OrderItemEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Order status enum. Wire strings are the display forms ("In Progress",
/// "Ready for Delivery"), matched case-insensitively on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum OrderStatus {
    Pending,
    #[strum(serialize = "In Progress")]
    InProgress,
    #[strum(serialize = "Ready for Delivery")]
    ReadyForDelivery,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Parse a client-supplied status, rejecting anything outside the enum
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        Self::from_str(raw.trim())
            .map_err(|_| ServiceError::InvalidStatus(format!("Unknown order status: {raw}")))
    }

    /// States in which an unassigned order can be claimed by an agent
    pub fn is_claimable(self) -> bool {
        matches!(self, Self::Pending | Self::ReadyForDelivery)
    }

    /// States from which the owning customer may cancel
    pub fn is_cancellable(self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }
}

// Input matching is case-insensitive and tolerates the US spelling of
// "canceled", which strum's derive cannot express alongside the display forms.
impl OrderStatus {
    fn from_str_relaxed(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Some(Self::Pending),
            "in progress" => Some(Self::InProgress),
            "ready for delivery" => Some(Self::ReadyForDelivery),
            "completed" => Some(Self::Completed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl FromStr for OrderStatus {
    type Err = strum::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::from_str_relaxed(s).ok_or(strum::ParseError::VariantNotFound)
    }
}

/// Display stage derived from status on read; never persisted
pub fn tracking_stage(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "Picked Up",
        OrderStatus::InProgress => "Processing",
        OrderStatus::ReadyForDelivery => "Ready",
        OrderStatus::Completed => "Delivered",
        OrderStatus::Cancelled => "Picked Up",
    }
}

/// Stage for a raw status string; unknown strings fall back to the first stage
pub fn tracking_stage_for(status: &str) -> &'static str {
    OrderStatus::from_str_relaxed(status)
        .map(tracking_stage)
        .unwrap_or("Picked Up")
}

/// Delivery defaults to two days after pickup when the customer does not pick
/// a date
pub fn default_delivery_date(pickup_date: NaiveDate) -> NaiveDate {
    pickup_date + Duration::days(2)
}

/// Input to [`OrderService::create_order`]; already shaped by the handler
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_phone: String,
    pub address: String,
    pub pickup_date: NaiveDate,
    pub pickup_time: String,
    pub delivery_date: Option<NaiveDate>,
    pub instructions: Option<String>,
    pub lines: Vec<NewOrderLine>,
}

/// One service selection; price/name/unit are the catalog snapshot
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub service_id: i64,
    pub service_name: String,
    pub unit: String,
    pub unit_price: Decimal,
    pub quantity: Decimal,
}

// ---- Role-scoped read views ----
//
// Each role gets its own response struct so fields can never leak across
// roles (an agent's available list must not expose other agents' identities,
// the admin list has no derived tracking stage, and so on).

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerOrderView {
    pub id: String,
    pub status: String,
    pub pickup_date: NaiveDate,
    pub delivery_date: NaiveDate,
    pub total: Decimal,
    pub services: Vec<OrderLineView>,
    pub tracking_stage: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineView {
    pub name: String,
    pub quantity: String,
    pub price: Decimal,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderView {
    pub id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub status: String,
    pub pickup_date: NaiveDate,
    pub delivery_date: NaiveDate,
    pub total: Decimal,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailableOrderView {
    pub id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub status: String,
    pub pickup_date: NaiveDate,
    pub delivery_date: NaiveDate,
    pub address: String,
    pub total: Decimal,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignedOrderView {
    pub id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub address: String,
    pub status: String,
    pub total: Decimal,
    pub pickup_date: NaiveDate,
    pub delivery_date: NaiveDate,
    pub accepted_at: Option<DateTime<Utc>>,
    pub instructions: Option<String>,
}

/// Service owning order persistence and every lifecycle transition
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self { db, event_sender }
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "Failed to send domain event");
            }
        }
    }

    /// Resolve an order identifier that may be an internal UUID or the
    /// external order number
    pub async fn resolve_order_id(&self, id: &str) -> Result<Uuid, ServiceError> {
        if let Ok(uuid) = Uuid::parse_str(id) {
            return Ok(uuid);
        }
        let found = OrderEntity::find()
            .filter(order::Column::OrderNumber.eq(id))
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        match found {
            Some(model) => Ok(model.id),
            None => Err(ServiceError::NotFound(format!("Order {id} not found"))),
        }
    }

    /// Creates an order and its line items in one transaction. The persisted
    /// total is recomputed from the lines; an order without at least one line
    /// is rejected before any write.
    #[instrument(skip(self, request), fields(customer_id = %customer_id))]
    pub async fn create_order(
        &self,
        customer_id: Uuid,
        request: NewOrder,
    ) -> Result<OrderModel, ServiceError> {
        if request.lines.is_empty() {
            return Err(ServiceError::ValidationError(
                "At least one service is required".to_string(),
            ));
        }
        if request.pickup_time.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "pickupTime is required".to_string(),
            ));
        }
        for line in &request.lines {
            if line.quantity <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "Quantity for '{}' must be positive",
                    line.service_name
                )));
            }
            if line.unit_price < Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "Price for '{}' must not be negative",
                    line.service_name
                )));
            }
        }

        let now = Utc::now();
        let order_id = Uuid::new_v4();
        let order_number = generate_order_number();
        let delivery_date = request
            .delivery_date
            .unwrap_or_else(|| default_delivery_date(request.pickup_date));
        let total_amount: Decimal = request
            .lines
            .iter()
            .map(|line| line.unit_price * line.quantity)
            .sum();

        let txn = self.db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for order creation");
            ServiceError::DatabaseError(e)
        })?;

        let order_active_model = OrderActiveModel {
            id: Set(order_id),
            order_number: Set(order_number.clone()),
            customer_id: Set(customer_id),
            customer_name: Set(request.customer_name),
            customer_phone: Set(request.customer_phone),
            address: Set(request.address),
            pickup_date: Set(request.pickup_date),
            pickup_time: Set(request.pickup_time),
            delivery_date: Set(delivery_date),
            instructions: Set(request.instructions),
            total_amount: Set(total_amount),
            status: Set(OrderStatus::Pending.to_string()),
            delivery_agent_id: Set(None),
            accepted_at: Set(None),
            cancelled_at: Set(None),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let order_model = order_active_model.insert(&txn).await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to insert order");
            ServiceError::DatabaseError(e)
        })?;

        for line in request.lines {
            let item = OrderItemActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                service_id: Set(line.service_id),
                service_name: Set(line.service_name),
                unit: Set(line.unit),
                unit_price: Set(line.unit_price),
                quantity: Set(line.quantity),
                item_total: Set(line.unit_price * line.quantity),
                created_at: Set(now),
            };
            item.insert(&txn).await.map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to insert order line item");
                ServiceError::DatabaseError(e)
            })?;
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to commit order creation");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %order_id, order_number = %order_number, "Order created");
        self.emit(Event::OrderCreated(order_id)).await;

        Ok(order_model)
    }

    /// Customer view: own orders with nested services and derived tracking
    /// stage, newest first
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn list_for_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<CustomerOrderView>, ServiceError> {
        let rows = OrderEntity::find()
            .filter(order::Column::CustomerId.eq(customer_id))
            .find_with_related(OrderItemEntity)
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(rows
            .into_iter()
            .map(|(order, items)| CustomerOrderView {
                id: order.order_number,
                tracking_stage: tracking_stage_for(&order.status).to_string(),
                status: order.status,
                pickup_date: order.pickup_date,
                delivery_date: order.delivery_date,
                total: order.total_amount,
                services: items
                    .into_iter()
                    .map(|item| OrderLineView {
                        name: item.service_name,
                        quantity: format!("{} {}", item.quantity, item.unit),
                        price: item.item_total,
                    })
                    .collect(),
            })
            .collect())
    }

    /// Admin view: all orders newest first, customer identity inline
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<AdminOrderView>, ServiceError> {
        let orders = OrderEntity::find()
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(orders
            .into_iter()
            .map(|order| AdminOrderView {
                id: order.order_number,
                customer_name: order.customer_name,
                customer_phone: order.customer_phone,
                status: order.status,
                pickup_date: order.pickup_date,
                delivery_date: order.delivery_date,
                total: order.total_amount,
            })
            .collect())
    }

    /// Agent view: claimable, unassigned orders. The null agent check here is
    /// the concurrency gate that keeps two agents from racing to the same
    /// order.
    #[instrument(skip(self))]
    pub async fn list_available_for_delivery(
        &self,
    ) -> Result<Vec<AvailableOrderView>, ServiceError> {
        let orders = OrderEntity::find()
            .filter(order::Column::DeliveryAgentId.is_null())
            .filter(order::Column::Status.is_in([
                OrderStatus::Pending.to_string(),
                OrderStatus::ReadyForDelivery.to_string(),
            ]))
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(orders
            .into_iter()
            .map(|order| AvailableOrderView {
                id: order.order_number,
                customer_name: order.customer_name,
                customer_phone: order.customer_phone,
                status: order.status,
                pickup_date: order.pickup_date,
                delivery_date: order.delivery_date,
                address: order.address,
                total: order.total_amount,
            })
            .collect())
    }

    /// Agent view: orders assigned to the caller, most recently accepted
    /// first
    #[instrument(skip(self), fields(agent_id = %agent_id))]
    pub async fn list_assigned_to(
        &self,
        agent_id: Uuid,
    ) -> Result<Vec<AssignedOrderView>, ServiceError> {
        let orders = OrderEntity::find()
            .filter(order::Column::DeliveryAgentId.eq(agent_id))
            .order_by_desc(order::Column::AcceptedAt)
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(orders
            .into_iter()
            .map(|order| AssignedOrderView {
                id: order.order_number,
                customer_name: order.customer_name,
                customer_phone: order.customer_phone,
                address: order.address,
                status: order.status,
                total: order.total_amount,
                pickup_date: order.pickup_date,
                delivery_date: order.delivery_date,
                accepted_at: order.accepted_at,
                instructions: order.instructions,
            })
            .collect())
    }

    /// Admin status overwrite. Deliberately unguarded beyond enum membership:
    /// trusted operators may set any status, including "Completed", and the
    /// row always stays in storage.
    #[instrument(skip(self), fields(order_id = %order_id, new_status = %status))]
    pub async fn set_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<OrderModel, ServiceError> {
        let order = OrderEntity::find_by_id(order_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        let old_status = order.status.clone();

        let mut active: OrderActiveModel = order.into();
        active.status = Set(status.to_string());
        active.updated_at = Set(Some(Utc::now()));

        let updated = active
            .update(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        info!(order_id = %order_id, old_status = %old_status, new_status = %status, "Order status updated");
        self.emit(Event::OrderStatusChanged {
            order_id,
            old_status,
            new_status: status.to_string(),
        })
        .await;

        Ok(updated)
    }

    /// Agent claims an unassigned order. A single guarded UPDATE with the
    /// `delivery_agent_id IS NULL` predicate serializes concurrent accepts:
    /// whoever commits first wins, the loser sees zero affected rows and gets
    /// told why against post-commit state.
    #[instrument(skip(self), fields(order_id = %order_id, agent_id = %agent_id))]
    pub async fn accept(&self, order_id: Uuid, agent_id: Uuid) -> Result<OrderModel, ServiceError> {
        let now = Utc::now();
        let result = OrderEntity::update_many()
            .col_expr(order::Column::DeliveryAgentId, Expr::value(agent_id))
            .col_expr(order::Column::AcceptedAt, Expr::value(Some(now)))
            .col_expr(order::Column::UpdatedAt, Expr::value(Some(now)))
            .filter(order::Column::Id.eq(order_id))
            .filter(order::Column::DeliveryAgentId.is_null())
            .filter(order::Column::Status.is_in([
                OrderStatus::Pending.to_string(),
                OrderStatus::ReadyForDelivery.to_string(),
            ]))
            .exec(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if result.rows_affected == 0 {
            // Precondition failed; re-read to name the reason
            let current = OrderEntity::find_by_id(order_id)
                .one(&*self.db)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

            if current.delivery_agent_id.is_some() {
                return Err(ServiceError::Conflict(
                    "Order is no longer available: already assigned".to_string(),
                ));
            }
            return Err(ServiceError::Conflict(format!(
                "Order in status '{}' cannot be accepted",
                current.status
            )));
        }

        let updated = OrderEntity::find_by_id(order_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        info!(order_id = %order_id, agent_id = %agent_id, "Order accepted");
        self.emit(Event::OrderAccepted { order_id, agent_id }).await;

        Ok(updated)
    }

    /// Assigned agent releases an order back to the unclaimed pool
    #[instrument(skip(self), fields(order_id = %order_id, agent_id = %agent_id))]
    pub async fn release(&self, order_id: Uuid, agent_id: Uuid) -> Result<OrderModel, ServiceError> {
        let result = OrderEntity::update_many()
            .col_expr(order::Column::DeliveryAgentId, Expr::value(None::<Uuid>))
            .col_expr(
                order::Column::AcceptedAt,
                Expr::value(None::<DateTime<Utc>>),
            )
            .col_expr(order::Column::UpdatedAt, Expr::value(Some(Utc::now())))
            .filter(order::Column::Id.eq(order_id))
            .filter(order::Column::DeliveryAgentId.eq(agent_id))
            .filter(order::Column::Status.ne(OrderStatus::Completed.to_string()))
            .exec(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if result.rows_affected == 0 {
            // Ambiguous on purpose: does not reveal whether the order exists
            return Err(ServiceError::NotFound(
                "Order not found or not assigned to you".to_string(),
            ));
        }

        let updated = OrderEntity::find_by_id(order_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        info!(order_id = %order_id, agent_id = %agent_id, "Order released");
        self.emit(Event::OrderReleased { order_id, agent_id }).await;

        Ok(updated)
    }

    /// Terminal delivery by the assigned agent: deletes line items then the
    /// order row in one transaction. Permanent; there is no soft delete and
    /// no audit copy. Distinct from the admin's "Completed" status overwrite.
    #[instrument(skip(self), fields(order_id = %order_id, agent_id = %agent_id))]
    pub async fn finalize_delivery(
        &self,
        order_id: Uuid,
        agent_id: Uuid,
    ) -> Result<String, ServiceError> {
        let txn = self.db.begin().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to start finalize transaction");
            ServiceError::DatabaseError(e)
        })?;

        let order = OrderEntity::find_by_id(order_id)
            .filter(order::Column::DeliveryAgentId.eq(agent_id))
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound("Order not found or not assigned to you".to_string())
            })?;

        let order_number = order.order_number.clone();

        OrderItemEntity::delete_many()
            .filter(order_item::Column::OrderId.eq(order_id))
            .exec(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let deleted = OrderEntity::delete_many()
            .filter(order::Column::Id.eq(order_id))
            .filter(order::Column::DeliveryAgentId.eq(agent_id))
            .exec(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if deleted.rows_affected != 1 {
            txn.rollback().await.map_err(ServiceError::DatabaseError)?;
            return Err(ServiceError::NotFound(
                "Order not found or not assigned to you".to_string(),
            ));
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to commit finalize transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %order_id, order_number = %order_number, "Order delivered and removed");
        self.emit(Event::OrderDelivered(order_id)).await;

        Ok(order_number)
    }

    /// Owning customer cancels; only reachable from Pending or In Progress
    #[instrument(skip(self), fields(order_id = %order_id, customer_id = %customer_id))]
    pub async fn cancel(
        &self,
        order_id: Uuid,
        customer_id: Uuid,
    ) -> Result<OrderModel, ServiceError> {
        let order = OrderEntity::find_by_id(order_id)
            .filter(order::Column::CustomerId.eq(customer_id))
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        let status = OrderStatus::parse(&order.status)?;
        if !status.is_cancellable() {
            return Err(ServiceError::Conflict(format!(
                "Order in status '{}' cannot be cancelled",
                order.status
            )));
        }

        let now = Utc::now();
        let result = OrderEntity::update_many()
            .col_expr(
                order::Column::Status,
                Expr::value(OrderStatus::Cancelled.to_string()),
            )
            .col_expr(order::Column::CancelledAt, Expr::value(Some(now)))
            .col_expr(order::Column::UpdatedAt, Expr::value(Some(now)))
            .filter(order::Column::Id.eq(order_id))
            .filter(order::Column::CustomerId.eq(customer_id))
            .filter(order::Column::Status.is_in([
                OrderStatus::Pending.to_string(),
                OrderStatus::InProgress.to_string(),
            ]))
            .exec(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if result.rows_affected == 0 {
            return Err(ServiceError::Conflict(
                "Order can no longer be cancelled".to_string(),
            ));
        }

        let updated = OrderEntity::find_by_id(order_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        info!(order_id = %order_id, "Order cancelled");
        self.emit(Event::OrderCancelled(order_id)).await;

        Ok(updated)
    }
}

fn generate_order_number() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("ORD-{}", id[..8].to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn tracking_stage_maps_every_status() {
        assert_eq!(tracking_stage(OrderStatus::Pending), "Picked Up");
        assert_eq!(tracking_stage(OrderStatus::InProgress), "Processing");
        assert_eq!(tracking_stage(OrderStatus::ReadyForDelivery), "Ready");
        assert_eq!(tracking_stage(OrderStatus::Completed), "Delivered");
        assert_eq!(tracking_stage(OrderStatus::Cancelled), "Picked Up");
        assert_eq!(tracking_stage_for("garbage"), "Picked Up");
    }

    #[test]
    fn status_parses_display_forms() {
        assert_eq!(OrderStatus::parse("Pending").unwrap(), OrderStatus::Pending);
        assert_eq!(
            OrderStatus::parse("In Progress").unwrap(),
            OrderStatus::InProgress
        );
        assert_eq!(
            OrderStatus::parse("ready for delivery").unwrap(),
            OrderStatus::ReadyForDelivery
        );
        assert_eq!(
            OrderStatus::parse("canceled").unwrap(),
            OrderStatus::Cancelled
        );
        assert!(OrderStatus::parse("Shipped").is_err());
    }

    #[test]
    fn status_round_trips_through_display() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::InProgress,
            OrderStatus::ReadyForDelivery,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::parse(&status.to_string()).unwrap(), status);
        }
    }

    #[test]
    fn delivery_defaults_to_pickup_plus_two_days() {
        let pickup = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        assert_eq!(
            default_delivery_date(pickup),
            NaiveDate::from_ymd_opt(2025, 8, 3).unwrap()
        );
    }

    #[test]
    fn cancellable_and_claimable_sets() {
        assert!(OrderStatus::Pending.is_cancellable());
        assert!(OrderStatus::InProgress.is_cancellable());
        assert!(!OrderStatus::ReadyForDelivery.is_cancellable());
        assert!(!OrderStatus::Completed.is_cancellable());
        assert!(!OrderStatus::Cancelled.is_cancellable());

        assert!(OrderStatus::Pending.is_claimable());
        assert!(OrderStatus::ReadyForDelivery.is_claimable());
        assert!(!OrderStatus::InProgress.is_claimable());
    }

    #[test]
    fn order_numbers_are_prefixed_and_unique_enough() {
        let a = generate_order_number();
        let b = generate_order_number();
        assert!(a.starts_with("ORD-"));
        assert_eq!(a.len(), 12);
        assert_ne!(a, b);
    }

    #[test]
    fn line_totals_multiply_price_and_quantity() {
        let line = NewOrderLine {
            service_id: 1,
            service_name: "Wash & Fold".to_string(),
            unit: "per kg".to_string(),
            unit_price: dec!(40),
            quantity: dec!(3),
        };
        assert_eq!(line.unit_price * line.quantity, dec!(120));
    }
}
