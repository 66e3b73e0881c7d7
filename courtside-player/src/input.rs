//! Keyboard input routing
//!
//! Maps host keyboard events to engine operations using the familiar
//! video-player bindings (space/k toggle, j/l long skips, digits jump to
//! tenths of the duration). Events originating from text-entry controls are
//! dropped so typing never drives the transport.

use crate::playback::{StreamHandle, SyncEngine};
use courtside_common::events::PlayerEvent;
use courtside_common::time;
use std::sync::Arc;
use tracing::debug;

const SHORT_SKIP_SECS: f64 = 5.0;
const LONG_SKIP_SECS: f64 = 10.0;
const VOLUME_STEP: i16 = 5;

/// Keys the router understands; everything else is ignored by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    KeyK,
    KeyJ,
    KeyL,
    KeyM,
    KeyF,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    /// Digit keys 0-9
    Digit(u8),
}

/// Routes key events into sync engine operations
pub struct InputRouter<S: StreamHandle> {
    engine: Arc<SyncEngine<S>>,
}

impl<S: StreamHandle> InputRouter<S> {
    pub fn new(engine: Arc<SyncEngine<S>>) -> Self {
        Self { engine }
    }

    /// Route one key event
    ///
    /// `from_text_entry` marks events whose target is a text-entry control.
    pub async fn handle_key(&self, key: Key, from_text_entry: bool) {
        if from_text_entry {
            debug!("Ignoring {:?} from a text-entry control", key);
            return;
        }

        match key {
            Key::Space | Key::KeyK => self.engine.toggle_play().await,
            Key::ArrowLeft => self.engine.skip(-SHORT_SKIP_SECS).await,
            Key::ArrowRight => self.engine.skip(SHORT_SKIP_SECS).await,
            Key::KeyJ => self.engine.skip(-LONG_SKIP_SECS).await,
            Key::KeyL => self.engine.skip(LONG_SKIP_SECS).await,
            Key::ArrowUp => self.engine.nudge_volume(VOLUME_STEP).await,
            Key::ArrowDown => self.engine.nudge_volume(-VOLUME_STEP).await,
            Key::KeyM => self.engine.toggle_mute().await,
            Key::KeyF => {
                // Full-presentation mode belongs to the host environment
                self.engine
                    .state()
                    .broadcast_event(PlayerEvent::FullscreenToggleRequested {
                        timestamp: time::now(),
                    });
            }
            Key::Digit(digit) => {
                let Some(duration) = self.engine.state().duration().await else {
                    return;
                };
                let fraction = f64::from(digit.min(9)) / 10.0;
                self.engine.seek(duration * fraction).await;
            }
            Key::Home => self.engine.seek(0.0).await,
            Key::End => {
                let Some(duration) = self.engine.state().duration().await else {
                    return;
                };
                self.engine.seek(duration).await;
            }
        }
    }
}
