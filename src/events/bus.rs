use tokio::sync::broadcast;

use super::DomainEvent;
use crate::constants::EVENT_BUS_CAPACITY;

/// Lightweight broadcast bus that fans domain events out to observers.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(EVENT_BUS_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: DomainEvent) {
        // Lagging or absent listeners are ignored to avoid blocking producers.
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bus_delivers_to_subscribers() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(DomainEvent::budgets_changed(3));

        let event = rx.recv().await.unwrap();
        assert_eq!(event, DomainEvent::budgets_changed(3));
    }

    #[test]
    fn test_publish_without_subscribers_does_not_panic() {
        let bus = EventBus::new();
        bus.publish(DomainEvent::users_changed(1));
    }
}
