//! Shared helpers for integration tests

// Each test binary compiles this module separately and uses a subset of it
#![allow(dead_code)]

use async_trait::async_trait;
use courtside_common::events::PlayerEvent;
use courtside_common::{Error, Result, SyncTuning};
use courtside_player::playback::{StreamHandle, SyncEngine};
use courtside_player::state::SharedState;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, Notify};

/// One command the engine issued to a stream, in issue order
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Play,
    Pause,
    SetPosition(f64),
    SetVolume(f64),
    SetMuted(bool),
}

#[derive(Debug)]
struct ScriptedInner {
    commands: Vec<Command>,
    position_secs: f64,
    duration_secs: Option<f64>,
    ended: bool,
    fail_play: bool,
    stall_plays: bool,
}

/// A stream handle that records every command and reports whatever the
/// test scripts. `stall_plays` parks `play` calls on a notify so tests can
/// hold the transport lock open across a controlled window.
pub struct ScriptedStream {
    inner: Mutex<ScriptedInner>,
    release: Notify,
}

impl ScriptedStream {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(ScriptedInner {
                commands: Vec::new(),
                position_secs: 0.0,
                duration_secs: None,
                ended: false,
                fail_play: false,
                stall_plays: false,
            }),
            release: Notify::new(),
        }
    }

    pub fn commands(&self) -> Vec<Command> {
        self.inner.lock().unwrap().commands.clone()
    }

    pub fn clear_commands(&self) {
        self.inner.lock().unwrap().commands.clear();
    }

    pub fn set_reported_position(&self, position_secs: f64) {
        self.inner.lock().unwrap().position_secs = position_secs;
    }

    pub fn set_reported_duration(&self, duration_secs: Option<f64>) {
        self.inner.lock().unwrap().duration_secs = duration_secs;
    }

    pub fn set_ended(&self, ended: bool) {
        self.inner.lock().unwrap().ended = ended;
    }

    pub fn fail_plays(&self) {
        self.inner.lock().unwrap().fail_play = true;
    }

    /// Park subsequent `play` calls until `release_stalled`
    pub fn stall_plays(&self) {
        self.inner.lock().unwrap().stall_plays = true;
    }

    pub fn release_stalled(&self) {
        self.inner.lock().unwrap().stall_plays = false;
        self.release.notify_waiters();
    }

    fn log(&self, command: Command) {
        self.inner.lock().unwrap().commands.push(command);
    }
}

impl Default for ScriptedStream {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StreamHandle for ScriptedStream {
    async fn play(&self) -> Result<()> {
        self.log(Command::Play);
        let (fail, stall) = {
            let inner = self.inner.lock().unwrap();
            (inner.fail_play, inner.stall_plays)
        };
        if fail {
            return Err(Error::Stream("scripted play failure".into()));
        }
        if stall {
            self.release.notified().await;
        }
        Ok(())
    }

    async fn pause(&self) {
        self.log(Command::Pause);
    }

    async fn set_position(&self, seconds: f64) {
        self.log(Command::SetPosition(seconds));
        self.inner.lock().unwrap().position_secs = seconds;
    }

    async fn set_volume(&self, volume: f64) {
        self.log(Command::SetVolume(volume));
    }

    async fn set_muted(&self, muted: bool) {
        self.log(Command::SetMuted(muted));
    }

    async fn position(&self) -> f64 {
        self.inner.lock().unwrap().position_secs
    }

    async fn duration(&self) -> Option<f64> {
        self.inner.lock().unwrap().duration_secs
    }

    async fn ended(&self) -> bool {
        self.inner.lock().unwrap().ended
    }
}

/// Engine over a scripted primary and secondary, plus handles to both
pub struct ScriptedSession {
    pub engine: Arc<SyncEngine<ScriptedStream>>,
    pub primary: Arc<ScriptedStream>,
    pub secondary: Arc<ScriptedStream>,
    pub state: Arc<SharedState>,
}

pub fn scripted_session() -> ScriptedSession {
    let primary = Arc::new(ScriptedStream::new());
    let secondary = Arc::new(ScriptedStream::new());
    let state = Arc::new(SharedState::new());
    let engine = Arc::new(SyncEngine::new(
        Arc::clone(&primary),
        Some(Arc::clone(&secondary)),
        Arc::clone(&state),
        SyncTuning::default(),
    ));
    ScriptedSession {
        engine,
        primary,
        secondary,
        state,
    }
}

/// Collect everything currently queued on an event receiver
pub fn drain_events(rx: &mut broadcast::Receiver<PlayerEvent>) -> Vec<PlayerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
