//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use super::types::{Event, Topic};

/// Topic-based event bus.
///
/// Allows consumers to subscribe to specific topics and only receive events
/// they care about. Publishing is best-effort: a frame never blocks on slow
/// or absent observers.
pub struct EventBus {
    channels: Arc<RwLock<HashMap<Topic, broadcast::Sender<Event>>>>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic.
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut channels = HashMap::new();

        // Pre-create channels for each topic
        channels.insert(Topic::Ability, broadcast::channel(capacity).0);
        channels.insert(Topic::Attribute, broadcast::channel(capacity).0);
        channels.insert(Topic::Inventory, broadcast::channel(capacity).0);

        Self {
            channels: Arc::new(RwLock::new(channels)),
        }
    }

    /// Publish an event to its corresponding topic.
    pub fn publish(&self, event: Event) {
        let topic = event.topic();

        // Use try_read to avoid blocking in async context.
        // If we can't get the lock, just skip (events are best-effort).
        match self.channels.try_read() {
            Ok(channels) => {
                if let Some(tx) = channels.get(&topic)
                    && tx.send(event).is_err()
                {
                    // No subscribers for this topic - this is normal, not an error
                    tracing::trace!("No subscribers for topic {:?}", topic);
                }
            }
            Err(_) => {
                tracing::debug!("Failed to acquire event bus lock for topic {:?}", topic);
            }
        }
    }

    /// Subscribe to a specific topic.
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        let channels = self
            .channels
            .try_read()
            .expect("Failed to acquire read lock on event channels");
        channels
            .get(&topic)
            .expect("Topic channel not initialized")
            .subscribe()
    }

    /// Subscribe to multiple topics.
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        let channels = self
            .channels
            .try_read()
            .expect("Failed to acquire read lock on event channels");

        topics
            .iter()
            .filter_map(|topic| {
                channels
                    .get(topic)
                    .map(|tx| (*topic, tx.subscribe()))
            })
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            channels: Arc::clone(&self.channels),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::types::{AttributeEvent, InventoryEvent};
    use arpg_core::{ActorId, AttributeId, InventoryId};

    #[test]
    fn subscribers_only_see_their_topic() {
        let bus = EventBus::new();
        let mut attribute_rx = bus.subscribe(Topic::Attribute);
        let mut inventory_rx = bus.subscribe(Topic::Inventory);

        bus.publish(Event::Attribute(AttributeEvent {
            actor: ActorId(1),
            attribute: AttributeId::Health,
            old: 100.0,
            new: 90.0,
        }));

        assert!(matches!(
            attribute_rx.try_recv(),
            Ok(Event::Attribute(_))
        ));
        assert!(inventory_rx.try_recv().is_err());
    }

    #[test]
    fn publish_without_subscribers_is_quiet() {
        let bus = EventBus::new();
        bus.publish(Event::Inventory(InventoryEvent::Changed {
            actor: ActorId(1),
            inventory: InventoryId(7),
        }));
    }
}
