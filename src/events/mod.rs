//! Domain events, fanned out over a tokio mpsc channel and consumed by a
//! background task. Event delivery is best-effort and never blocks the
//! request path; all state changes are already committed when an event is
//! sent.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

// Define the various events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Order events
    OrderCreated(Uuid),
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
    },
    OrderVoided {
        order_id: Uuid,
        inventory_restored: bool,
    },
    OrderPaid(Uuid),

    // Inventory events
    InventoryTransactionRecorded {
        inventory_item_id: Uuid,
        order_id: Option<Uuid>,
        reason: String,
        quantity: Decimal,
    },
    LowStockDetected {
        inventory_item_id: Uuid,
        current_stock: Decimal,
        min_stock: Decimal,
    },
    WasteRecorded {
        inventory_item_id: Uuid,
        quantity: Decimal,
        cost: Decimal,
    },

    // Seating events
    TableCreated(Uuid),
    TableStatusChanged {
        table_id: Uuid,
        status: String,
    },
    ChairStatusChanged {
        table_id: Uuid,
        chair_id: Uuid,
        status: String,
    },

    // Tenant events
    RestaurantRegistered(Uuid),
}

/// Background consumer draining the event channel. Currently the events
/// feed structured logs; a queue or webhook fan-out would plug in here.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    info!("Event processor started");
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::LowStockDetected {
                inventory_item_id,
                current_stock,
                min_stock,
            } => {
                warn!(
                    inventory_item_id = %inventory_item_id,
                    current_stock = %current_stock,
                    min_stock = %min_stock,
                    "Inventory item is at or below its minimum stock level"
                );
            }
            Event::OrderVoided {
                order_id,
                inventory_restored,
            } if !inventory_restored => {
                info!(order_id = %order_id, "Order voided; no inventory to restore");
            }
            other => {
                info!(event = ?other, "Processing event");
            }
        }
    }
    info!("Event processor stopped; channel closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_flow_through_the_channel() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);

        let order_id = Uuid::new_v4();
        sender.send(Event::OrderCreated(order_id)).await.unwrap();

        match rx.recv().await {
            Some(Event::OrderCreated(id)) => assert_eq!(id, order_id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_fails_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        let result = sender.send(Event::OrderCreated(Uuid::new_v4())).await;
        assert!(result.is_err());
    }
}
