//! Shared playback state
//!
//! Thread-safe shared state for the viewing session, plus the event
//! broadcast channel observers subscribe to. One instance lives for the
//! lifetime of the session.

use courtside_common::events::PlayerEvent;
use tokio::sync::{broadcast, RwLock};

pub use courtside_common::events::TransportState;

/// Shared state accessible by all components
///
/// `position_secs` is a monotonically-refreshed cache of the primary
/// stream's reported position; last-writer-wins is safe for it.
pub struct SharedState {
    transport: RwLock<TransportState>,
    position_secs: RwLock<f64>,
    duration_secs: RwLock<Option<f64>>,
    /// Master volume, 0-100
    volume: RwLock<u8>,
    muted: RwLock<bool>,
    event_tx: broadcast::Sender<PlayerEvent>,
}

impl SharedState {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(100); // Buffer up to 100 events
        Self {
            transport: RwLock::new(TransportState::Idle),
            position_secs: RwLock::new(0.0),
            duration_secs: RwLock::new(None),
            volume: RwLock::new(100),
            muted: RwLock::new(false),
            event_tx,
        }
    }

    /// Broadcast an event to all listeners
    pub fn broadcast_event(&self, event: PlayerEvent) {
        // Ignore send errors (no receivers is OK)
        let _ = self.event_tx.send(event);
    }

    /// Subscribe to the event stream
    pub fn subscribe_events(&self) -> broadcast::Receiver<PlayerEvent> {
        self.event_tx.subscribe()
    }

    pub async fn transport(&self) -> TransportState {
        *self.transport.read().await
    }

    pub async fn set_transport(&self, state: TransportState) {
        *self.transport.write().await = state;
    }

    pub async fn position(&self) -> f64 {
        *self.position_secs.read().await
    }

    /// Set current position, clamped to `[0, duration]` when the duration
    /// is known
    pub async fn set_position(&self, position_secs: f64) {
        let mut position = position_secs.max(0.0);
        if let Some(duration) = *self.duration_secs.read().await {
            position = position.min(duration);
        }
        *self.position_secs.write().await = position;
    }

    pub async fn duration(&self) -> Option<f64> {
        *self.duration_secs.read().await
    }

    pub async fn set_duration(&self, duration_secs: Option<f64>) {
        *self.duration_secs.write().await = duration_secs;
    }

    /// Get master volume (0-100)
    pub async fn volume(&self) -> u8 {
        *self.volume.read().await
    }

    /// Set master volume, clamped to 0-100
    pub async fn set_volume(&self, volume: u8) {
        *self.volume.write().await = volume.min(100);
    }

    pub async fn muted(&self) -> bool {
        *self.muted.read().await
    }

    pub async fn set_muted(&self, muted: bool) {
        *self.muted.write().await = muted;
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
