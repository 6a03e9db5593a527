//! # Outbound Event Channel
//!
//! Carries world notifications out of the simulation thread.
//!
//! ```text
//! ┌─────────────┐  WorldEvent  ┌─────────────────┐  bounded  ┌─────────────┐
//! │    World    │─────────────>│ ChannelObserver │──────────>│  Consumers  │
//! │  (kernel)   │  synchronous │                 │  channel  │ (audio, UI) │
//! └─────────────┘              └─────────────────┘           └─────────────┘
//! ```
//!
//! In-kernel collaborators (the spatial index) subscribe to the world
//! directly and stay consistent. Everything else reads from this channel and
//! may lag. When the channel is full new events are dropped, never blocking
//! the tick.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tessera_core::{WorldEvent, WorldObserver, WorldView};
use tracing::warn;

/// Bounded multi-producer, multi-consumer channel of [`WorldEvent`]s.
pub struct EventBus {
    sender: Sender<WorldEvent>,
    receiver: Receiver<WorldEvent>,
}

impl EventBus {
    /// Creates a bus holding at most `capacity` undelivered events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// Creates a sender handle.
    #[must_use]
    pub fn sender(&self) -> EventSender {
        EventSender {
            sender: self.sender.clone(),
        }
    }

    /// Creates a receiver handle. Receivers compete for events.
    #[must_use]
    pub fn receiver(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.receiver.clone(),
        }
    }

    /// Creates a bus and returns one handle of each kind.
    #[must_use]
    pub fn create_pair(capacity: usize) -> (EventSender, EventReceiver) {
        let bus = Self::new(capacity);
        (bus.sender(), bus.receiver())
    }
}

/// Handle for sending events.
#[derive(Clone)]
pub struct EventSender {
    sender: Sender<WorldEvent>,
}

impl EventSender {
    /// Sends without blocking.
    ///
    /// Returns `false` if the channel is full or every receiver is gone; the
    /// event is dropped.
    #[inline]
    pub fn send(&self, event: WorldEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Handle for receiving events.
#[derive(Clone)]
pub struct EventReceiver {
    receiver: Receiver<WorldEvent>,
}

impl EventReceiver {
    /// Takes every pending event without blocking.
    #[inline]
    pub fn drain(&self) -> Vec<WorldEvent> {
        self.receiver.try_iter().collect()
    }

    /// Takes one event if available.
    #[inline]
    pub fn try_recv(&self) -> Option<WorldEvent> {
        self.receiver.try_recv().ok()
    }

    /// Number of undelivered events.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// True when at least one event is waiting.
    #[inline]
    #[must_use]
    pub fn has_events(&self) -> bool {
        !self.receiver.is_empty()
    }
}

/// World observer that forwards every notification onto an [`EventBus`].
pub struct ChannelObserver {
    sender: EventSender,
    dropped: u64,
}

impl ChannelObserver {
    /// Forwards to `sender`.
    #[must_use]
    pub fn new(sender: EventSender) -> Self {
        Self { sender, dropped: 0 }
    }
}

impl WorldObserver for ChannelObserver {
    fn on_event(&mut self, event: &WorldEvent, _world: &WorldView<'_>) {
        match self.sender.sender.try_send(*event) {
            // Nobody is listening; nothing to report.
            Ok(()) | Err(TrySendError::Disconnected(_)) => return,
            Err(TrySendError::Full(_)) => self.dropped += 1,
        }
        // Power-of-two counts keep a stalled consumer from flooding the log.
        if self.dropped.is_power_of_two() {
            warn!(
                dropped = self.dropped,
                entity = %event.entity(),
                "event channel full, dropping world events"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{Position, World};
    use tessera_shared::Vec2;

    #[test]
    fn test_bus_roundtrip_keeps_order() {
        let mut world = World::new();
        let a = world.create_entity();
        let b = world.create_entity();

        let (tx, rx) = EventBus::create_pair(8);
        assert!(tx.send(WorldEvent::EntityEnabled(a)));
        assert!(tx.send(WorldEvent::EntityDestroyed(b)));

        assert_eq!(rx.pending_count(), 2);
        assert_eq!(
            rx.drain(),
            vec![
                WorldEvent::EntityEnabled(a),
                WorldEvent::EntityDestroyed(b),
            ]
        );
        assert!(!rx.has_events());
        assert_eq!(rx.try_recv(), None);
    }

    #[test]
    fn test_full_channel_drops_instead_of_blocking() {
        let mut world = World::new();
        let e = world.create_entity();
        let (tx, rx) = EventBus::create_pair(1);

        assert!(tx.send(WorldEvent::EntityEnabled(e)));
        assert!(!tx.send(WorldEvent::EntityDisabled(e)));
        assert_eq!(rx.drain(), vec![WorldEvent::EntityEnabled(e)]);
    }

    #[test]
    fn test_observer_forwards_world_notifications() {
        let bus = EventBus::new(16);
        let rx = bus.receiver();
        let mut world = World::new();
        world.subscribe(ChannelObserver::new(bus.sender()));

        let e = world.create_entity();
        world.add_component(e, Position::new(0.0, 0.0));
        world.enable_entity(e);
        world.refresh();
        world.notify_moved(e, Vec2::new(1.0, 0.0));
        world.destroy_entity(e);
        world.refresh();

        assert_eq!(
            rx.drain(),
            vec![
                WorldEvent::EntityEnabled(e),
                WorldEvent::EntityMoved {
                    entity: e,
                    offset: Vec2::new(1.0, 0.0),
                },
                WorldEvent::EntityDestroyed(e),
            ]
        );
    }

    #[test]
    fn test_observer_survives_full_channel() {
        let bus = EventBus::new(1);
        let rx = bus.receiver();
        let mut world = World::new();
        world.subscribe(ChannelObserver::new(bus.sender()));

        let e = world.create_entity();
        world.enable_entity(e);
        world.refresh();
        for _ in 0..5 {
            world.notify_moved(e, Vec2::new(0.5, 0.5));
        }

        assert_eq!(rx.drain(), vec![WorldEvent::EntityEnabled(e)]);
        assert!(world.is_enabled(e));
    }
}
