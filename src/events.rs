//! Domain events emitted after committed state changes. Consumers are
//! best-effort: a full channel or dropped receiver is logged, never surfaced
//! to the API caller.

use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum Event {
    OrderCreated(Uuid),
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
    },
    OrderAccepted {
        order_id: Uuid,
        agent_id: Uuid,
    },
    OrderReleased {
        order_id: Uuid,
        agent_id: Uuid,
    },
    OrderCancelled(Uuid),
    /// Terminal delivery: the order row no longer exists
    OrderDelivered(Uuid),
}

#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(tx: mpsc::Sender<Event>) -> Self {
        Self { tx }
    }

    pub async fn send(&self, event: Event) -> Result<(), mpsc::error::SendError<Event>> {
        self.tx.send(event).await
    }
}

/// Drains the event channel, logging each event. Spawned once at startup.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    while let Some(event) = rx.recv().await {
        match &event {
            Event::OrderCreated(id) => info!(order_id = %id, "event: order created"),
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => info!(
                order_id = %order_id,
                old_status = %old_status,
                new_status = %new_status,
                "event: order status changed"
            ),
            Event::OrderAccepted { order_id, agent_id } => {
                info!(order_id = %order_id, agent_id = %agent_id, "event: order accepted")
            }
            Event::OrderReleased { order_id, agent_id } => {
                info!(order_id = %order_id, agent_id = %agent_id, "event: order released")
            }
            Event::OrderCancelled(id) => info!(order_id = %id, "event: order cancelled"),
            Event::OrderDelivered(id) => info!(order_id = %id, "event: order delivered"),
        }
    }
}
