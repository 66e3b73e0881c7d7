//! External stream handle contract
//!
//! The host media layer implements `StreamHandle` for each of the two
//! synchronized resources. The engine only issues commands and consumes
//! lifecycle events; it never owns the underlying media.

use async_trait::async_trait;
use courtside_common::Result;

pub use courtside_common::events::StreamRole;

/// Command surface of one externally-managed media stream
///
/// `play` is the only fallible command: media may need to buffer, and the
/// host may refuse playback outright. Everything else is fire-and-forget.
#[async_trait]
pub trait StreamHandle: Send + Sync + 'static {
    /// Begin playback; may not resolve until the media has buffered
    async fn play(&self) -> Result<()>;

    async fn pause(&self);

    /// Reposition the stream (seconds from start)
    async fn set_position(&self, seconds: f64);

    /// Set stream volume on a 0.0-1.0 scale
    async fn set_volume(&self, volume: f64);

    async fn set_muted(&self, muted: bool);

    /// Most recently reported playback position (seconds)
    async fn position(&self) -> f64;

    /// Stream duration, once metadata has arrived
    async fn duration(&self) -> Option<f64>;

    /// Whether the stream has played through to its end
    async fn ended(&self) -> bool;
}

/// Lifecycle callbacks from a stream, delivered to the sync engine by the
/// host via `SyncEngine::handle_stream_event`
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Periodic position report; `duration_secs` is included when the host
    /// already knows it (used as a fallback if metadata never fired)
    PositionUpdate {
        position_secs: f64,
        duration_secs: Option<f64>,
    },

    /// Stream metadata loaded
    MetadataReady { duration_secs: f64 },

    /// Stream started playing
    Play,

    /// Stream paused
    Pause,

    /// Stream reached its end
    Ended,

    /// Stream failed
    Error { detail: String },
}
