//! Broadcast bridge between the state machine and its listeners.

use tokio::sync::broadcast;

use super::{CoachSignal, SystemUpdate, UpdateEvent};

/// Default capacity for the update broadcast channel.
pub const DEFAULT_UPDATE_CHANNEL_CAPACITY: usize = 256;

/// Fans system updates and signals out to any number of subscribers.
///
/// Subscribing returns a receiver; dropping the receiver unsubscribes.
#[derive(Debug)]
pub struct NotificationBridge {
    updates: broadcast::Sender<SystemUpdate>,
    signals: broadcast::Sender<CoachSignal>,
    capacity: usize,
    agent_connected: bool,
}

impl NotificationBridge {
    /// Create a bridge with the default channel capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_UPDATE_CHANNEL_CAPACITY)
    }

    /// Create a bridge with a custom channel capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (updates, _) = broadcast::channel(capacity);
        let (signals, _) = broadcast::channel(capacity);
        Self {
            updates,
            signals,
            capacity,
            agent_connected: false,
        }
    }

    /// Subscribe to system updates.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SystemUpdate> {
        self.updates.subscribe()
    }

    /// Subscribe to keep-alive and cue signals.
    #[must_use]
    pub fn subscribe_signals(&self) -> broadcast::Receiver<CoachSignal> {
        self.signals.subscribe()
    }

    /// Number of live update subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.updates.receiver_count()
    }

    /// Broadcast an update and return it.
    pub fn emit(&self, event: UpdateEvent, data: serde_json::Value) -> SystemUpdate {
        let update = SystemUpdate::new(event, data);
        if self.updates.send(update.clone()).is_err() {
            tracing::trace!(event = %event, "No update subscribers");
        }
        update
    }

    /// Broadcast a signal.
    pub fn signal(&self, signal: CoachSignal) {
        if self.signals.send(signal).is_err() {
            tracing::trace!(signal = ?signal, "No signal subscribers");
        }
    }

    /// Whether the remote agent is currently connected.
    #[must_use]
    pub fn agent_connected(&self) -> bool {
        self.agent_connected
    }

    /// Record the agent connection state.
    ///
    /// Returns `true` only on a disconnected to connected transition.
    pub fn set_agent_connected(&mut self, connected: bool) -> bool {
        let became_connected = connected && !self.agent_connected;
        if connected != self.agent_connected {
            tracing::info!(connected, "Voice agent connection changed");
        }
        self.agent_connected = connected;
        became_connected
    }

    /// Drop every subscriber and forget the agent connection.
    ///
    /// Existing receivers observe a closed channel.
    pub fn reset(&mut self) {
        let (updates, _) = broadcast::channel(self.capacity);
        let (signals, _) = broadcast::channel(self.capacity);
        self.updates = updates;
        self.signals = signals;
        self.agent_connected = false;
    }
}

impl Default for NotificationBridge {
    fn default() -> Self {
        Self::new()
    }
}
