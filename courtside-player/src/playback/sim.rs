//! Simulated stream backend
//!
//! A deterministic `StreamHandle` whose position advances with the tokio
//! clock while playing. The demo binary drives a whole session with two of
//! these; tests use them under a paused clock.

use crate::playback::stream::StreamHandle;
use async_trait::async_trait;
use courtside_common::{Error, Result};
use std::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug)]
struct SimInner {
    playing: bool,
    /// Position at the last play/pause/reposition transition
    base_secs: f64,
    resumed_at: Option<Instant>,
    duration_secs: f64,
    volume: f64,
    muted: bool,
    refuse_play: bool,
}

/// Clock-driven stream with a fixed duration
pub struct SimulatedStream {
    inner: Mutex<SimInner>,
}

impl SimulatedStream {
    pub fn new(duration_secs: f64) -> Self {
        Self {
            inner: Mutex::new(SimInner {
                playing: false,
                base_secs: 0.0,
                resumed_at: None,
                duration_secs,
                volume: 1.0,
                muted: false,
                refuse_play: false,
            }),
        }
    }

    /// Make subsequent `play` calls fail, modeling an unloadable resource
    pub fn refuse_play(&self) {
        self.inner.lock().unwrap().refuse_play = true;
    }

    pub fn current_volume(&self) -> f64 {
        self.inner.lock().unwrap().volume
    }

    pub fn is_muted(&self) -> bool {
        self.inner.lock().unwrap().muted
    }

    pub fn is_playing(&self) -> bool {
        self.inner.lock().unwrap().playing
    }

    fn position_now(inner: &SimInner) -> f64 {
        let mut position = inner.base_secs;
        if inner.playing {
            if let Some(resumed_at) = inner.resumed_at {
                position += resumed_at.elapsed().as_secs_f64();
            }
        }
        position.min(inner.duration_secs)
    }
}

#[async_trait]
impl StreamHandle for SimulatedStream {
    async fn play(&self) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.refuse_play {
            return Err(Error::Stream("simulated stream refused to play".into()));
        }
        if !inner.playing {
            inner.playing = true;
            inner.resumed_at = Some(Instant::now());
        }
        Ok(())
    }

    async fn pause(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.playing {
            inner.base_secs = Self::position_now(&inner);
            inner.playing = false;
            inner.resumed_at = None;
        }
    }

    async fn set_position(&self, seconds: f64) {
        let mut inner = self.inner.lock().unwrap();
        inner.base_secs = seconds.clamp(0.0, inner.duration_secs);
        if inner.playing {
            inner.resumed_at = Some(Instant::now());
        }
    }

    async fn set_volume(&self, volume: f64) {
        self.inner.lock().unwrap().volume = volume.clamp(0.0, 1.0);
    }

    async fn set_muted(&self, muted: bool) {
        self.inner.lock().unwrap().muted = muted;
    }

    async fn position(&self) -> f64 {
        let inner = self.inner.lock().unwrap();
        Self::position_now(&inner)
    }

    async fn duration(&self) -> Option<f64> {
        Some(self.inner.lock().unwrap().duration_secs)
    }

    async fn ended(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        Self::position_now(&inner) >= inner.duration_secs
    }
}
