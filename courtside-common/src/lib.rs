//! # Courtside Common Library
//!
//! Shared code for the courtside playback controller:
//! - Error types
//! - Player event types (PlayerEvent enum)
//! - Sync tuning parameters and config loading
//! - Time formatting utilities

pub mod error;
pub mod events;
pub mod time;
pub mod tuning;

pub use error::{Error, Result};
pub use tuning::SyncTuning;
