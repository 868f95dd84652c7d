//! Simulated z-score source.
//!
//! Stands in for the live sensor when discovery or connection fails: a
//! slow sinusoidal stress wave with bounded uniform noise, produced at a
//! fixed interval on its own thread through the same single-slot channel
//! contract as the live stream.

use crate::hrv::stream::{push_lossy, SourceRecvError, ZScoreSource};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Period of the underlying stress wave, in seconds.
const WAVE_PERIOD_S: f64 = 90.0;

/// Peak amplitude of the stress wave, in z units.
const WAVE_AMPLITUDE: f64 = 0.6;

/// Half-width of the uniform noise band, in z units.
const NOISE_BAND: f64 = 0.15;

/// Synthetic z-score generator implementing the live stream contract.
pub struct SimulatedZScores {
    rx: Receiver<f64>,
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl SimulatedZScores {
    /// Start the generator thread, emitting one sample per `interval`.
    pub fn start(interval: Duration) -> Self {
        let (tx, rx) = bounded(1);
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();

        let handle = thread::spawn(move || {
            let mut rng = rand::thread_rng();
            let t0 = Instant::now();

            while flag.load(Ordering::SeqCst) {
                let t = t0.elapsed().as_secs_f64();
                let slow = WAVE_AMPLITUDE * (2.0 * std::f64::consts::PI * t / WAVE_PERIOD_S).sin();
                let noise = rng.gen_range(-NOISE_BAND..NOISE_BAND);
                push_lossy(&tx, slow + noise);

                thread::sleep(interval);
            }
        });

        tracing::info!(interval_s = interval.as_secs_f64(), "simulated z-score source started");
        Self {
            rx,
            running,
            handle: Some(handle),
        }
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl ZScoreSource for SimulatedZScores {
    fn recv_timeout(&mut self, timeout: Duration) -> Result<f64, SourceRecvError> {
        self.rx.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => SourceRecvError::Timeout,
            RecvTimeoutError::Disconnected => SourceRecvError::Closed,
        })
    }
}

impl Drop for SimulatedZScores {
    fn drop(&mut self) {
        self.stop();
    }
}
