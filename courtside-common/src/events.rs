//! Event types for the courtside event system
//!
//! Events are broadcast by the player's shared state so that any number of
//! observers (UI layers, loggers, tests) can follow playback without polling.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Transport state of the playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportState {
    /// Session loaded, nothing started yet
    Idle,
    Playing,
    Paused,
}

impl std::fmt::Display for TransportState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportState::Idle => write!(f, "idle"),
            TransportState::Playing => write!(f, "playing"),
            TransportState::Paused => write!(f, "paused"),
        }
    }
}

/// Which of the two synchronized streams an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamRole {
    /// Main visual media; the timing reference for synchronization
    Primary,
    /// Optional commentary audio played alongside the primary
    Secondary,
}

impl std::fmt::Display for StreamRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamRole::Primary => write!(f, "primary"),
            StreamRole::Secondary => write!(f, "secondary"),
        }
    }
}

/// Courtside player event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerEvent {
    /// Transport state changed (idle/playing/paused)
    TransportChanged {
        state: TransportState,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback position moved (primary stream position updates and seeks)
    PositionChanged {
        position_secs: f64,
        duration_secs: Option<f64>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Master volume changed
    VolumeChanged {
        volume: u8,
        muted: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Mute toggled independently of the volume level
    MuteChanged {
        muted: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A commentary payload was loaded and indexed
    CommentaryLoaded {
        job_id: Option<Uuid>,
        cue_count: usize,
        has_audio: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The active commentary cue changed (None = no cue at current position)
    ActiveCueChanged {
        cue_index: Option<usize>,
        cue_secs: Option<f64>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Secondary stream was forced back to the primary position
    DriftCorrected {
        primary_secs: f64,
        secondary_secs: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A stale transport lock was reclaimed from a stuck operation
    LockReclaimed {
        held_ms: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A stream reported a failure
    StreamError {
        role: StreamRole,
        detail: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Host environment should toggle full-presentation mode
    FullscreenToggleRequested {
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}
