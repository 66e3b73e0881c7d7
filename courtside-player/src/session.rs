//! Session-scoped storage and the commentary payload
//!
//! The host hands the player a keyed blob store that is read exactly once
//! at mount: an optionally pre-supplied primary media locator, and the
//! payload produced by the commentary generation service. The store itself
//! is owned by the host; this module only defines the read-side contract.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

/// Well-known session keys
pub mod keys {
    /// Locator for an uploaded primary media resource
    pub const PRIMARY_MEDIA_URL: &str = "primary_media_url";
    /// JSON-encoded `CommentaryPayload` from the generation service
    pub const COMMENTARY_PAYLOAD: &str = "commentary_payload";
}

/// Read-side contract of the host's session store
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// In-memory session store
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().unwrap().get(key).cloned()
    }
}

/// Output of the commentary generation service, consumed once per session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentaryPayload {
    /// Generation-service job that produced this payload
    #[serde(default)]
    pub job_id: Option<Uuid>,

    /// Free-form commentary text with one timestamped cue per line
    pub commentary_text: String,

    /// Locator for the synthesized commentary audio; absent when synthesis
    /// was skipped or failed upstream
    #[serde(default)]
    pub audio_url: Option<String>,
}

/// One-time read of session state at mount
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub primary_media_url: Option<String>,
    pub payload: Option<CommentaryPayload>,
}

impl SessionSnapshot {
    /// Read the well-known keys from the store
    ///
    /// An unreadable payload degrades to no commentary rather than failing;
    /// a payload without an audio locator degrades to text-only commentary.
    pub fn load(store: &dyn SessionStore) -> Self {
        let primary_media_url = store.get(keys::PRIMARY_MEDIA_URL);

        let payload = store.get(keys::COMMENTARY_PAYLOAD).and_then(|raw| {
            match serde_json::from_str::<CommentaryPayload>(&raw) {
                Ok(payload) => Some(payload),
                Err(e) => {
                    warn!("Discarding unreadable commentary payload: {}", e);
                    None
                }
            }
        });

        if let Some(payload) = &payload {
            if payload.audio_url.is_none() {
                warn!("Commentary audio unavailable; continuing with text-only commentary");
            }
        }

        Self {
            primary_media_url,
            payload,
        }
    }
}
