use chrono::NaiveDate;
use rust_decimal_macros::dec;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;

use washline_api::migrator::Migrator;
use washline_api::services::orders::{NewOrder, NewOrderLine, OrderService};

/// Fresh in-memory SQLite database with the schema applied. A single
/// connection is mandatory: every pooled connection to `sqlite::memory:`
/// would otherwise get its own empty database.
pub async fn test_db() -> Arc<DatabaseConnection> {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).sqlx_logging(false);

    let db = Database::connect(opt).await.expect("connect test db");
    Migrator::up(&db, None).await.expect("apply migrations");
    Arc::new(db)
}

pub async fn test_order_service() -> (Arc<DatabaseConnection>, OrderService) {
    let db = test_db().await;
    let service = OrderService::new(db.clone(), None);
    (db, service)
}

/// A one-line Wash & Fold order: 3 kg at 40 each, pickup 2025-08-01
pub fn sample_order() -> NewOrder {
    NewOrder {
        customer_name: "Asha Rao".to_string(),
        customer_phone: "+91-9000000001".to_string(),
        address: "12 Lakeview Road".to_string(),
        pickup_date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
        pickup_time: "10:00 AM - 12:00 PM".to_string(),
        delivery_date: None,
        instructions: None,
        lines: vec![NewOrderLine {
            service_id: 1,
            service_name: "Wash & Fold".to_string(),
            unit: "per kg".to_string(),
            unit_price: dec!(40),
            quantity: dec!(3),
        }],
    }
}

/// Two-line order useful for total arithmetic checks
pub fn two_line_order() -> NewOrder {
    let mut order = sample_order();
    order.lines.push(NewOrderLine {
        service_id: 4,
        service_name: "Dry Cleaning".to_string(),
        unit: "per piece".to_string(),
        unit_price: dec!(150),
        quantity: dec!(2),
    });
    order
}
