//! Sensor transport abstraction.
//!
//! The concrete BLE backend lives outside this crate. What the pipeline
//! needs is narrow: a [`Transport`] delivers raw measurement frames to a
//! callback from its own delivery thread, and hands back a [`Subscription`]
//! that releases the underlying notification stream exactly once no matter
//! how the consumer exits.

pub mod frame;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

pub use frame::{parse_beat_intervals, FLAG_HR_UINT16, FLAG_RR_PRESENT, MIN_FRAME_LEN};

/// Callback invoked with each raw frame from the sensor's delivery thread.
pub type FrameCallback = Box<dyn FnMut(&[u8]) + Send>;

/// Errors raised while establishing a sensor stream.
///
/// Both variants move the session to the simulated fallback; neither is
/// fatal to the run.
#[derive(Debug)]
pub enum TransportError {
    /// No device answered within the discovery window.
    DiscoveryTimeout,
    /// A device was found but the connection could not be established.
    ConnectionFailed(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::DiscoveryTimeout => write!(f, "sensor discovery timed out"),
            TransportError::ConnectionFailed(e) => write!(f, "sensor connection failed: {e}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// A live sensor transport.
///
/// `subscribe` starts frame delivery and returns a [`Subscription`] owning
/// the notification stream. Implementations deliver frames from a single
/// thread and must stop delivery when the subscription is released.
pub trait Transport {
    fn subscribe(&mut self, callback: FrameCallback) -> Result<Subscription, TransportError>;
}

/// Handle to an active frame stream.
///
/// Dropping the handle releases the stream. The release action runs at
/// most once even if `release` is also called explicitly.
pub struct Subscription {
    released: AtomicBool,
    release_fn: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(release_fn: Box<dyn FnOnce() + Send>) -> Self {
        Self {
            released: AtomicBool::new(false),
            release_fn: Some(release_fn),
        }
    }

    /// Release the underlying stream now instead of at drop time.
    pub fn release(&mut self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            if let Some(f) = self.release_fn.take() {
                f();
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

/// Scan for a wearable monitor and return a connected transport.
///
/// No hardware backend is linked into this crate; callers integrating a
/// real BLE stack provide their own [`Transport`] to the orchestrator.
/// This entry point therefore reports a discovery timeout, which routes
/// the standalone binary onto the simulated fallback path.
pub fn discover(timeout: Duration) -> Result<Box<dyn Transport>, TransportError> {
    tracing::debug!(timeout_s = timeout.as_secs_f64(), "no transport backend linked");
    Err(TransportError::DiscoveryTimeout)
}
