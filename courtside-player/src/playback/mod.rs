//! Playback control: stream contract, transport lock, and sync engine

pub mod engine;
pub mod sim;
pub mod stream;
pub mod transport_lock;

pub use engine::SyncEngine;
pub use stream::{StreamEvent, StreamHandle, StreamRole};
pub use transport_lock::{Acquisition, TransportGuard, TransportLock};
