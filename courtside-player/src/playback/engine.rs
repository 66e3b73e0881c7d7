//! Dual-stream sync engine
//!
//! Owns the primary (video) and optional secondary (commentary audio)
//! stream handles, arbitrates transport operations through the transport
//! lock, and keeps the secondary stream within a bounded drift of the
//! primary. The primary stream is always the timing reference; the
//! secondary never drives position, transport state, or drift correction
//! of the primary.

use crate::commentary::{CommentaryCue, CommentaryIndex};
use crate::playback::stream::{StreamEvent, StreamHandle, StreamRole};
use crate::playback::transport_lock::{Acquisition, TransportGuard, TransportLock};
use crate::session::CommentaryPayload;
use crate::state::SharedState;
use courtside_common::events::{PlayerEvent, TransportState};
use courtside_common::{time, SyncTuning};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

/// The primary stream's native audio is ducked to 20% of master so the
/// commentary dominates the mix
const PRIMARY_DUCK: f64 = 0.2;

/// Sync engine - coordinates the two streams, the transport lock, and the
/// commentary index
pub struct SyncEngine<S: StreamHandle> {
    primary: Arc<S>,

    /// Best-effort commentary audio; absent when no audio was produced
    /// upstream
    secondary: Option<Arc<S>>,

    state: Arc<SharedState>,

    /// Gate for all transport operations
    lock: TransportLock,

    /// Current commentary timeline, replaced wholesale per payload
    index: Arc<RwLock<CommentaryIndex>>,

    /// Index of the cue last resolved as active
    active_cue: Arc<RwLock<Option<usize>>>,

    tuning: SyncTuning,

    /// Drift loop running flag
    running: Arc<RwLock<bool>>,
}

impl<S: StreamHandle> SyncEngine<S> {
    /// Create a new sync engine over the session's stream handles
    pub fn new(
        primary: Arc<S>,
        secondary: Option<Arc<S>>,
        state: Arc<SharedState>,
        tuning: SyncTuning,
    ) -> Self {
        let lock = TransportLock::new(tuning.lock_staleness());
        Self {
            primary,
            secondary,
            state,
            lock,
            index: Arc::new(RwLock::new(CommentaryIndex::default())),
            active_cue: Arc::new(RwLock::new(None)),
            tuning,
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// Shared session state (also the event broadcaster)
    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    /// Parse a commentary payload and replace the cue timeline
    pub async fn load_commentary(&self, payload: &CommentaryPayload) {
        let index = CommentaryIndex::from_text(&payload.commentary_text);
        let cue_count = index.len();
        info!("Loaded commentary: {} cues", cue_count);

        *self.index.write().await = index;
        *self.active_cue.write().await = None;

        self.state.broadcast_event(PlayerEvent::CommentaryLoaded {
            job_id: payload.job_id,
            cue_count,
            has_audio: payload.audio_url.is_some(),
            timestamp: time::now(),
        });
    }

    /// Get a cue by timeline index
    pub async fn cue(&self, index: usize) -> Option<CommentaryCue> {
        self.index.read().await.get(index).cloned()
    }

    /// Index of the currently active cue, if any
    pub async fn active_cue(&self) -> Option<usize> {
        *self.active_cue.read().await
    }

    /// Start background work (the drift-correction loop)
    pub async fn start(&self) {
        *self.running.write().await = true;

        if self.secondary.is_some() {
            info!(
                "Drift correction active ({} ms interval, {:.2}s threshold)",
                self.tuning.drift_check_interval_ms, self.tuning.drift_threshold_secs
            );
            let engine = self.clone_handles();
            tokio::spawn(async move {
                engine.drift_loop().await;
            });
        } else {
            info!("No commentary audio stream; drift correction disabled");
        }
    }

    /// Stop background work
    pub async fn stop(&self) {
        *self.running.write().await = false;
    }

    /// Toggle between playing and paused
    ///
    /// A denied lock is a silent no-op: the prior transport operation is
    /// still in flight.
    pub async fn toggle_play(&self) {
        let Some(_guard) = self.acquire("toggle_play") else {
            return;
        };

        match self.state.transport().await {
            TransportState::Playing => {
                self.primary.pause().await;
                if let Some(secondary) = &self.secondary {
                    secondary.pause().await;
                }
                self.set_transport(TransportState::Paused).await;
            }
            TransportState::Idle | TransportState::Paused => {
                // Primary first; a primary failure aborts, a secondary
                // failure never does
                if let Err(e) = self.primary.play().await {
                    error!("Primary stream refused to play: {}", e);
                    self.stream_error(StreamRole::Primary, e.to_string());
                    return;
                }
                if let Some(secondary) = &self.secondary {
                    if let Err(e) = secondary.play().await {
                        warn!("Commentary audio failed to start: {}", e);
                        self.stream_error(StreamRole::Secondary, e.to_string());
                    }
                }
                self.apply_stream_volumes().await;
                self.set_transport(TransportState::Playing).await;
            }
        }
    }

    /// Seek both streams to an absolute position (seconds)
    pub async fn seek(&self, target_secs: f64) {
        let Some(_guard) = self.acquire("seek") else {
            return;
        };
        self.reposition(target_secs).await;
    }

    /// Seek both streams relative to the current position
    pub async fn skip(&self, delta_secs: f64) {
        let Some(_guard) = self.acquire("skip") else {
            return;
        };
        let target = self.state.position().await + delta_secs;
        self.reposition(target).await;
    }

    /// Seek to the timestamp of a commentary cue selected from the timeline
    pub async fn seek_to_cue(&self, cue_index: usize) {
        let timestamp = self
            .index
            .read()
            .await
            .get(cue_index)
            .map(|cue| cue.timestamp_secs);

        match timestamp {
            Some(timestamp_secs) => self.seek(timestamp_secs).await,
            None => warn!("seek_to_cue: no cue at index {}", cue_index),
        }
    }

    /// Reposition both streams. Caller must hold the transport lock.
    ///
    /// Pausing both streams around the position change keeps them from
    /// briefly reporting divergent positions mid-seek.
    async fn reposition(&self, target_secs: f64) {
        let duration = self.state.duration().await;
        let mut target = target_secs.max(0.0);
        if let Some(duration) = duration {
            target = target.min(duration);
        }

        let was_playing = self.state.transport().await == TransportState::Playing;

        if was_playing {
            self.primary.pause().await;
            if let Some(secondary) = &self.secondary {
                secondary.pause().await;
            }
        }

        self.primary.set_position(target).await;
        if let Some(secondary) = &self.secondary {
            secondary.set_position(target).await;
        }

        // Reflect the new position immediately rather than waiting for the
        // stream's own position callback
        self.state.set_position(target).await;
        self.emit_position(target).await;
        self.refresh_active_cue(target).await;

        if was_playing {
            if let Err(e) = self.primary.play().await {
                error!("Primary stream failed to resume after seek: {}", e);
                self.stream_error(StreamRole::Primary, e.to_string());
            }
            if let Some(secondary) = &self.secondary {
                if let Err(e) = secondary.play().await {
                    warn!("Commentary audio failed to resume after seek: {}", e);
                    self.stream_error(StreamRole::Secondary, e.to_string());
                }
            }
        }
    }

    /// Set master volume (0-100)
    ///
    /// Primary stream volume is `level/100 * 0.2`; secondary is `level/100`.
    /// A level of zero implies muted.
    pub async fn set_volume(&self, level: u8) {
        let Some(_guard) = self.acquire("set_volume") else {
            return;
        };

        let level = level.min(100);
        self.state.set_volume(level).await;
        self.apply_stream_volumes().await;

        let muted = level == 0;
        self.state.set_muted(muted).await;
        self.state.broadcast_event(PlayerEvent::VolumeChanged {
            volume: level,
            muted,
            timestamp: time::now(),
        });
    }

    /// Adjust master volume by a signed step (keyboard volume keys)
    ///
    /// Raising the volume unmutes; lowering it leaves the mute flag alone.
    pub async fn nudge_volume(&self, delta: i16) {
        let Some(_guard) = self.acquire("nudge_volume") else {
            return;
        };

        let current = i16::from(self.state.volume().await);
        let level = (current + delta).clamp(0, 100) as u8;
        self.state.set_volume(level).await;
        self.apply_stream_volumes().await;

        let mut muted = self.state.muted().await;
        if delta > 0 && muted {
            muted = false;
            self.primary.set_muted(false).await;
            if let Some(secondary) = &self.secondary {
                secondary.set_muted(false).await;
            }
            self.state.set_muted(false).await;
        }

        self.state.broadcast_event(PlayerEvent::VolumeChanged {
            volume: level,
            muted,
            timestamp: time::now(),
        });
    }

    /// Flip the mute flag on both streams without touching the stored
    /// volume level, so un-muting restores the prior mix
    pub async fn toggle_mute(&self) {
        let Some(_guard) = self.acquire("toggle_mute") else {
            return;
        };

        let muted = !self.state.muted().await;
        self.primary.set_muted(muted).await;
        if let Some(secondary) = &self.secondary {
            secondary.set_muted(muted).await;
        }
        self.state.set_muted(muted).await;

        self.state.broadcast_event(PlayerEvent::MuteChanged {
            muted,
            timestamp: time::now(),
        });
    }

    /// Deliver a stream lifecycle callback to the engine
    ///
    /// Only primary-role events drive position, duration, transport state,
    /// and cue resolution.
    pub async fn handle_stream_event(&self, role: StreamRole, event: StreamEvent) {
        match role {
            StreamRole::Primary => self.handle_primary_event(event).await,
            StreamRole::Secondary => self.handle_secondary_event(event).await,
        }
    }

    async fn handle_primary_event(&self, event: StreamEvent) {
        match event {
            StreamEvent::PositionUpdate {
                position_secs,
                duration_secs,
            } => {
                // Fallback: adopt the duration if metadata never fired
                if self.state.duration().await.is_none() {
                    if let Some(duration) = duration_secs {
                        self.state.set_duration(Some(duration)).await;
                    }
                }
                self.state.set_position(position_secs).await;
                let position = self.state.position().await;
                self.emit_position(position).await;
                self.refresh_active_cue(position).await;
            }
            StreamEvent::MetadataReady { duration_secs } => {
                self.state.set_duration(Some(duration_secs)).await;
                self.apply_stream_volumes().await;
            }
            StreamEvent::Play => {
                self.apply_stream_volumes().await;
                self.set_transport(TransportState::Playing).await;
            }
            StreamEvent::Pause => {
                self.set_transport(TransportState::Paused).await;
            }
            StreamEvent::Ended => {
                info!("Primary stream ended");
                self.set_transport(TransportState::Paused).await;
            }
            StreamEvent::Error { detail } => {
                error!("Primary stream error: {}", detail);
                self.stream_error(StreamRole::Primary, detail);
            }
        }
    }

    async fn handle_secondary_event(&self, event: StreamEvent) {
        match event {
            StreamEvent::Ended => {
                info!("Commentary audio ended; primary continues without it");
            }
            StreamEvent::Error { detail } => {
                warn!("Commentary audio error: {}", detail);
                self.stream_error(StreamRole::Secondary, detail);
            }
            other => {
                debug!("Ignoring secondary stream event: {:?}", other);
            }
        }
    }

    /// Periodic drift check, active only while playing
    ///
    /// Runs without the transport lock: a correction racing a concurrent
    /// seek is harmless and simply superseded on the next tick.
    async fn drift_loop(self) {
        let Some(secondary) = self.secondary.clone() else {
            return;
        };
        let threshold = self.tuning.drift_threshold_secs;
        let mut tick = interval(self.tuning.drift_check_interval());

        loop {
            tick.tick().await;

            if !*self.running.read().await {
                debug!("Drift loop stopping");
                break;
            }
            if self.state.transport().await != TransportState::Playing {
                continue;
            }
            // An ended stream cannot be usefully resynced
            if secondary.ended().await {
                debug!("Commentary audio has ended, skipping sync");
                continue;
            }

            let primary_secs = self.primary.position().await;
            let secondary_secs = secondary.position().await;
            let Some(secondary_duration) = secondary.duration().await else {
                continue;
            };

            let diff = (primary_secs - secondary_secs).abs();
            if diff > threshold && primary_secs < secondary_duration {
                info!(
                    "Resyncing commentary audio: primary={:.2}s secondary={:.2}s",
                    primary_secs, secondary_secs
                );
                secondary.set_position(primary_secs).await;
                self.state.broadcast_event(PlayerEvent::DriftCorrected {
                    primary_secs,
                    secondary_secs,
                    timestamp: time::now(),
                });
            }
        }
    }

    /// Acquire the transport lock, logging denials and reclamations
    fn acquire(&self, op: &str) -> Option<TransportGuard> {
        match self.lock.try_acquire() {
            Acquisition::Granted(guard) => Some(guard),
            Acquisition::Reclaimed { guard, held } => {
                warn!("{}: reclaimed transport lock stuck for {:?}", op, held);
                self.state.broadcast_event(PlayerEvent::LockReclaimed {
                    held_ms: held.as_millis() as u64,
                    timestamp: time::now(),
                });
                Some(guard)
            }
            Acquisition::Busy { held } => {
                debug!("{} ignored: transport operation in flight ({:?})", op, held);
                None
            }
        }
    }

    /// Apply the master volume to both streams with the primary ducked
    async fn apply_stream_volumes(&self) {
        let level = f64::from(self.state.volume().await) / 100.0;
        self.primary.set_volume(level * PRIMARY_DUCK).await;
        if let Some(secondary) = &self.secondary {
            secondary.set_volume(level).await;
        }
    }

    async fn set_transport(&self, transport: TransportState) {
        if self.state.transport().await == transport {
            return;
        }
        self.state.set_transport(transport).await;
        self.state.broadcast_event(PlayerEvent::TransportChanged {
            state: transport,
            timestamp: time::now(),
        });
    }

    async fn emit_position(&self, position_secs: f64) {
        self.state.broadcast_event(PlayerEvent::PositionChanged {
            position_secs,
            duration_secs: self.state.duration().await,
            timestamp: time::now(),
        });
    }

    /// Re-resolve the active cue and broadcast when it changes
    async fn refresh_active_cue(&self, position_secs: f64) {
        let resolved = self.index.read().await.active(position_secs);

        let mut active = self.active_cue.write().await;
        if *active == resolved {
            return;
        }
        *active = resolved;
        drop(active);

        let cue_secs = match resolved {
            Some(i) => self
                .index
                .read()
                .await
                .get(i)
                .map(|cue| cue.timestamp_secs),
            None => None,
        };

        self.state.broadcast_event(PlayerEvent::ActiveCueChanged {
            cue_index: resolved,
            cue_secs,
            timestamp: time::now(),
        });
    }

    fn stream_error(&self, role: StreamRole, detail: String) {
        self.state.broadcast_event(PlayerEvent::StreamError {
            role,
            detail,
            timestamp: time::now(),
        });
    }

    /// Clone handles for spawned tasks
    fn clone_handles(&self) -> Self {
        Self {
            primary: Arc::clone(&self.primary),
            secondary: self.secondary.clone(),
            state: Arc::clone(&self.state),
            lock: self.lock.clone(),
            index: Arc::clone(&self.index),
            active_cue: Arc::clone(&self.active_cue),
            tuning: self.tuning.clone(),
            running: Arc::clone(&self.running),
        }
    }
}
