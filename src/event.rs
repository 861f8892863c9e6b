//! Domain event fan-out
//!
//! Handlers publish events here; whoever owns the receiver (UI,
//! automation, tests) decides what to do with them, including duplicate
//! handling. Publication is synchronous and never blocks, so the
//! relative order of inbound frames from a node is preserved into event
//! order.

use meshwave_shared::{HomeId, NodeId};
use tokio::sync::mpsc;

/// Events raised by command class handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A remote node asked for a scene to be activated
    SceneActivated {
        home_id: HomeId,
        node_id: NodeId,
        scene_id: u8,
    },
}

/// Cloneable publishing handle for domain events
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: mpsc::UnboundedSender<Event>,
}

impl EventBus {
    /// Create a bus and the receiver its subscriber drains
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Publish an event; a departed subscriber is not this layer's
    /// problem, so send failures are swallowed
    pub fn publish(&self, event: Event) {
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_delivers_in_order() {
        let (bus, mut rx) = EventBus::new();

        for scene_id in 1..=3 {
            bus.publish(Event::SceneActivated {
                home_id: 0x00c0ffee,
                node_id: 4,
                scene_id,
            });
        }

        for scene_id in 1..=3 {
            assert_eq!(
                rx.try_recv().expect("missing event"),
                Event::SceneActivated {
                    home_id: 0x00c0ffee,
                    node_id: 4,
                    scene_id,
                }
            );
        }
    }

    #[test]
    fn test_publish_without_subscriber_does_not_panic() {
        let (bus, rx) = EventBus::new();
        drop(rx);

        bus.publish(Event::SceneActivated {
            home_id: 1,
            node_id: 2,
            scene_id: 3,
        });
    }
}
