//! Live z-score streaming.
//!
//! Wires the transport's frame callback through the interval window, the
//! RMSSD calculator, and the baseline calibrator, and delivers normalized
//! z-scores to the session loop through a single-slot channel. The
//! producer never blocks: if the consumer has not drained the previous
//! value, the new one is dropped. The control loop follows the trend, not
//! an exact sample count.

use crate::hrv::baseline::BaselineCalibrator;
use crate::hrv::window::IntervalWindow;
use crate::transport::{parse_beat_intervals, Subscription, Transport, TransportError};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

/// Why a timed receive returned without a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRecvError {
    /// No sample within the timeout; the stream is still live.
    Timeout,
    /// The producer is gone; no further samples will arrive.
    Closed,
}

/// Contract shared by the live stream and the simulated fallback.
///
/// A source yields standardized z-scores through a blocking timed pull.
/// Dropping a source releases whatever feeds it.
pub trait ZScoreSource {
    fn recv_timeout(&mut self, timeout: Duration) -> Result<f64, SourceRecvError>;
}

/// Frame-to-z state machine, independent of any transport thread.
///
/// Owns the interval window and the calibrator; fed raw frames, it emits
/// a z-score for each post-baseline RMSSD sample.
#[derive(Debug)]
pub struct ZScorePipeline {
    window: IntervalWindow,
    calibrator: BaselineCalibrator,
}

impl ZScorePipeline {
    pub fn new(window_capacity: usize, baseline_duration_s: f64) -> Self {
        Self {
            window: IntervalWindow::new(window_capacity),
            calibrator: BaselineCalibrator::new(baseline_duration_s),
        }
    }

    /// Process one raw frame observed `elapsed_s` after stream start.
    ///
    /// Malformed or interval-less frames are dropped here without error.
    /// During calibration every RMSSD sample feeds the baseline and
    /// nothing is emitted; afterwards each sample becomes a z-score.
    pub fn handle_frame(&mut self, data: &[u8], elapsed_s: f64) -> Option<f64> {
        let intervals = parse_beat_intervals(data);
        if intervals.is_empty() {
            return None;
        }

        self.window.extend(&intervals);
        let rmssd = self.window.rmssd()?;

        match self.calibrator.baseline() {
            Some(baseline) => Some(baseline.z_score(rmssd)),
            None => {
                // Still calibrating; the closing sample is consumed by the
                // calibrator rather than emitted.
                let _ = self.calibrator.ingest(rmssd, elapsed_s);
                None
            }
        }
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibrator.is_closed()
    }
}

/// Live z-score stream backed by a sensor transport.
///
/// Owns the transport and its subscription for its whole lifetime;
/// dropping the stream (normal end, cancellation, error — any exit path)
/// releases the subscription exactly once, before the transport itself
/// goes away.
pub struct ZScoreStream {
    rx: Receiver<f64>,
    _subscription: Subscription,
    _transport: Box<dyn Transport>,
}

impl ZScoreStream {
    /// Subscribe to `transport` and start producing z-scores.
    ///
    /// The returned stream emits nothing until the baseline closes.
    pub fn open(
        mut transport: Box<dyn Transport>,
        window_capacity: usize,
        baseline_duration_s: f64,
    ) -> Result<Self, TransportError> {
        let (tx, rx) = bounded(1);
        let mut pipeline = ZScorePipeline::new(window_capacity, baseline_duration_s);
        let started = Instant::now();

        let subscription = transport.subscribe(Box::new(move |data: &[u8]| {
            let elapsed = started.elapsed().as_secs_f64();
            if let Some(z) = pipeline.handle_frame(data, elapsed) {
                push_lossy(&tx, z);
            }
        }))?;

        tracing::info!(window_capacity, baseline_duration_s, "z-score stream open");
        Ok(Self {
            rx,
            _subscription: subscription,
            _transport: transport,
        })
    }
}

impl ZScoreSource for ZScoreStream {
    fn recv_timeout(&mut self, timeout: Duration) -> Result<f64, SourceRecvError> {
        self.rx.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => SourceRecvError::Timeout,
            RecvTimeoutError::Disconnected => SourceRecvError::Closed,
        })
    }
}

/// Push into the single-slot channel, dropping the sample if it is full.
pub(crate) fn push_lossy(tx: &Sender<f64>, z: f64) {
    if tx.try_send(z).is_err() {
        tracing::debug!(z, "consumer busy, sample dropped");
    }
}
