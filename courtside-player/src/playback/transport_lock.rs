//! Transport lock
//!
//! Single-slot mutual-exclusion gate for transport operations (play-toggle,
//! seek, skip). At most one operation is in flight at any instant; a second
//! request while one is in flight is denied and the caller no-ops rather
//! than queueing.
//!
//! Two recovery layers keep a stuck holder from locking out all future
//! transport operations:
//! - A requester finding the lock held past the staleness window reclaims it.
//! - A watchdog task force-releases each acquisition after the same window,
//!   even if the holder never returns.
//!
//! Non-reentrant: an operation that repositions internally must do so
//! without re-acquiring.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

#[derive(Debug)]
struct LockInner {
    held: bool,
    acquired_at: Option<Instant>,
    /// Bumped on every grant so a guard or watchdog from an earlier
    /// acquisition can never release a later one
    generation: u64,
}

/// Timed single-slot lock with stale-holder eviction
#[derive(Debug, Clone)]
pub struct TransportLock {
    inner: Arc<Mutex<LockInner>>,
    staleness: Duration,
}

/// Outcome of a `try_acquire` request
#[derive(Debug)]
pub enum Acquisition {
    /// Lock was free
    Granted(TransportGuard),
    /// Lock was held past the staleness window and has been taken over
    Reclaimed { guard: TransportGuard, held: Duration },
    /// Lock is held by an in-flight operation; caller should no-op
    Busy { held: Duration },
}

/// Releases the lock on drop, covering every exit path of the guarded
/// operation
#[derive(Debug)]
pub struct TransportGuard {
    inner: Arc<Mutex<LockInner>>,
    generation: u64,
}

impl TransportLock {
    pub fn new(staleness: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LockInner {
                held: false,
                acquired_at: None,
                generation: 0,
            })),
            staleness,
        }
    }

    /// Request the lock without blocking
    ///
    /// Must be called from within a tokio runtime (each grant spawns a
    /// watchdog task).
    pub fn try_acquire(&self) -> Acquisition {
        let mut inner = self.inner.lock().unwrap();

        let reclaimed = if inner.held {
            let held = inner
                .acquired_at
                .map(|at| at.elapsed())
                .unwrap_or_default();
            if held < self.staleness {
                return Acquisition::Busy { held };
            }
            warn!("Transport lock stuck for {:?}, reclaiming", held);
            Some(held)
        } else {
            None
        };

        inner.held = true;
        inner.acquired_at = Some(Instant::now());
        inner.generation += 1;
        let generation = inner.generation;
        drop(inner);

        self.spawn_watchdog(generation);

        let guard = TransportGuard {
            inner: Arc::clone(&self.inner),
            generation,
        };

        match reclaimed {
            Some(held) => Acquisition::Reclaimed { guard, held },
            None => Acquisition::Granted(guard),
        }
    }

    /// Force-release this acquisition after the staleness window in case the
    /// holder hangs and its guard is never dropped
    fn spawn_watchdog(&self, generation: u64) {
        let inner = Arc::clone(&self.inner);
        let staleness = self.staleness;
        tokio::spawn(async move {
            tokio::time::sleep(staleness).await;
            let mut inner = inner.lock().unwrap();
            if inner.held && inner.generation == generation {
                warn!(
                    "Transport operation exceeded {:?}, force-releasing lock",
                    staleness
                );
                inner.held = false;
                inner.acquired_at = None;
            }
        });
    }

    /// Whether the lock is currently held
    pub fn is_held(&self) -> bool {
        self.inner.lock().unwrap().held
    }

    /// Mark the lock held as of now without spawning a watchdog, so tests
    /// can age the acquisition with the paused clock
    #[cfg(test)]
    fn seize_for_test(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.held = true;
        inner.acquired_at = Some(Instant::now());
        inner.generation += 1;
    }
}

impl Drop for TransportGuard {
    fn drop(&mut self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.held && inner.generation == self.generation {
            inner.held = false;
            inner.acquired_at = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::task::yield_now;
    use tokio::time::advance;

    const STALENESS: Duration = Duration::from_millis(2000);

    #[tokio::test(start_paused = true)]
    async fn test_grant_then_busy_while_held() {
        let lock = TransportLock::new(STALENESS);

        let guard = match lock.try_acquire() {
            Acquisition::Granted(guard) => guard,
            other => panic!("expected grant, got {:?}", other),
        };
        assert!(lock.is_held());

        assert!(matches!(lock.try_acquire(), Acquisition::Busy { .. }));

        drop(guard);
        assert!(!lock.is_held());
        assert!(matches!(lock.try_acquire(), Acquisition::Granted(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_guard_released_on_early_exit() {
        let lock = TransportLock::new(STALENESS);

        // Guarded operation bails out partway through
        let result: Result<(), &str> = (|| {
            let _guard = match lock.try_acquire() {
                Acquisition::Granted(guard) => guard,
                _ => panic!("expected grant"),
            };
            Err("stream command failed")
        })();
        assert!(result.is_err());

        assert!(!lock.is_held());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_holder_is_reclaimed() {
        let lock = TransportLock::new(STALENESS);
        lock.seize_for_test();
        advance(Duration::from_millis(2500)).await;

        match lock.try_acquire() {
            Acquisition::Reclaimed { held, .. } => {
                assert!(held >= STALENESS);
            }
            other => panic!("expected reclaim, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_just_under_staleness_still_busy() {
        let lock = TransportLock::new(STALENESS);
        lock.seize_for_test();
        advance(Duration::from_millis(1999)).await;

        assert!(matches!(lock.try_acquire(), Acquisition::Busy { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_force_releases_leaked_guard() {
        let lock = TransportLock::new(STALENESS);

        let guard = match lock.try_acquire() {
            Acquisition::Granted(guard) => guard,
            _ => panic!("expected grant"),
        };
        // Holder hangs: guard never dropped
        std::mem::forget(guard);

        // Let the watchdog task register its timer before advancing the clock
        yield_now().await;
        advance(Duration::from_millis(2100)).await;
        for _ in 0..5 {
            yield_now().await;
        }

        assert!(!lock.is_held());
        assert!(matches!(lock.try_acquire(), Acquisition::Granted(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_guard_drop_does_not_release_new_holder() {
        let lock = TransportLock::new(STALENESS);
        let stale_guard = match lock.try_acquire() {
            Acquisition::Granted(guard) => guard,
            _ => panic!("expected grant"),
        };

        // Let the watchdog task register its timer before advancing the clock
        yield_now().await;
        advance(Duration::from_millis(2100)).await;
        for _ in 0..5 {
            yield_now().await;
        }

        // Watchdog released the lock; a new operation takes it over
        let _new_guard = match lock.try_acquire() {
            Acquisition::Granted(guard) => guard,
            other => panic!("expected grant, got {:?}", other),
        };
        assert!(lock.is_held());

        // The superseded operation finally returns; its guard must not
        // release the new holder's acquisition
        drop(stale_guard);
        assert!(lock.is_held());
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_ignores_completed_acquisitions() {
        let lock = TransportLock::new(STALENESS);

        {
            let _guard = match lock.try_acquire() {
                Acquisition::Granted(guard) => guard,
                _ => panic!("expected grant"),
            };
        }

        // Re-acquire 1s later; the first watchdog is still pending
        advance(Duration::from_millis(1000)).await;
        let _guard = match lock.try_acquire() {
            Acquisition::Granted(guard) => guard,
            _ => panic!("expected grant"),
        };

        // First watchdog fires at 2000ms; it must not release the second
        // acquisition, which started later and is still fresh at that point
        advance(Duration::from_millis(1100)).await;
        for _ in 0..5 {
            yield_now().await;
        }
        assert!(lock.is_held());
    }
}
