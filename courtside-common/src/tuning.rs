//! Synchronization tuning parameters
//!
//! The drift-correction cadence, drift threshold, and transport-lock
//! staleness window are tuning choices rather than correctness requirements,
//! so they are loaded from configuration instead of being hardcoded.
//!
//! Resolution priority order:
//! 1. Explicit file path (command-line argument, highest priority)
//! 2. `COURTSIDE_TUNING` environment variable (path to a TOML file)
//! 3. Compiled defaults (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

fn default_drift_check_interval_ms() -> u64 {
    1000
}

fn default_drift_threshold_secs() -> f64 {
    0.3
}

fn default_lock_staleness_ms() -> u64 {
    2000
}

/// Tunable synchronization parameters
///
/// Partial TOML files are accepted; missing fields take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncTuning {
    /// How often the drift-correction tick runs while playing (ms)
    #[serde(default = "default_drift_check_interval_ms")]
    pub drift_check_interval_ms: u64,

    /// Primary/secondary position divergence that triggers a resync (seconds)
    #[serde(default = "default_drift_threshold_secs")]
    pub drift_threshold_secs: f64,

    /// How long a transport lock may be held before it is considered stuck
    /// and eligible for forced reclamation (ms)
    #[serde(default = "default_lock_staleness_ms")]
    pub lock_staleness_ms: u64,
}

impl Default for SyncTuning {
    fn default() -> Self {
        Self {
            drift_check_interval_ms: default_drift_check_interval_ms(),
            drift_threshold_secs: default_drift_threshold_secs(),
            lock_staleness_ms: default_lock_staleness_ms(),
        }
    }
}

impl SyncTuning {
    /// Load tuning parameters from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Resolve tuning parameters following the priority order
    ///
    /// Unreadable or malformed files are logged and skipped, falling through
    /// to the next priority level.
    pub fn resolve(cli_path: Option<&Path>) -> Self {
        if let Some(path) = cli_path {
            match Self::load(path) {
                Ok(tuning) => return tuning,
                Err(e) => warn!("Ignoring tuning file {}: {}", path.display(), e),
            }
        }

        if let Ok(env_path) = std::env::var("COURTSIDE_TUNING") {
            let path = Path::new(&env_path);
            match Self::load(path) {
                Ok(tuning) => return tuning,
                Err(e) => warn!("Ignoring tuning file {}: {}", path.display(), e),
            }
        }

        Self::default()
    }

    /// Drift-correction tick period
    pub fn drift_check_interval(&self) -> Duration {
        Duration::from_millis(self.drift_check_interval_ms)
    }

    /// Transport-lock staleness window
    pub fn lock_staleness(&self) -> Duration {
        Duration::from_millis(self.lock_staleness_ms)
    }
}
