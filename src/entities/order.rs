use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One laundry service request.
///
/// `customer_name` and `customer_phone` are deliberate snapshots taken at
/// creation time alongside the live `customer_id` foreign reference, so
/// historical orders display correctly even after the customer edits their
/// profile.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Externally visible identifier, distinct from the storage key
    pub order_number: String,

    pub customer_id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub address: String,
    pub pickup_date: NaiveDate,
    pub pickup_time: String,
    pub delivery_date: NaiveDate,
    pub instructions: Option<String>,
    pub total_amount: Decimal,
    pub status: String,
    pub delivery_agent_id: Option<Uuid>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItem,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItem.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {}
