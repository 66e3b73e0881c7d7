//! # Courtside Player Library
//!
//! Dual-stream synchronized playback controller.
//!
//! **Purpose:** Keep a primary video stream and an optional commentary-audio
//! stream in temporal lock-step, serialize all transport operations through
//! a stale-recoverable transport lock, and resolve an active commentary cue
//! from generated commentary text as playback advances.
//!
//! **Architecture:** The engine is generic over an external [`playback::StreamHandle`]
//! capability; the host media layer issues lifecycle callbacks into it and
//! receives commands back. Synchronization is perceptual (bounded drift),
//! not sample-accurate.

pub mod commentary;
pub mod input;
pub mod playback;
pub mod session;
pub mod state;

pub use courtside_common::{Error, Result};
pub use playback::SyncEngine;
pub use state::SharedState;
