//! Session orchestration.
//!
//! The orchestrator owns everything a run needs — z-score source, audio
//! sink, controller state, sample accumulator — and drives the tick loop:
//! pull a z-score, derive the phase from elapsed time, step the
//! controller, forward parameters to the sink, append a sample. Every way
//! a session can end converges on one teardown path.

use crate::audio::AudioSink;
use crate::config::Config;
use crate::control::{update_audio_params, AudioParams, ControlConfig};
use crate::hrv::{SimulatedZScores, SourceRecvError, ZScoreSource, ZScoreStream};
use crate::session::log::{
    append_summary_row, write_sample_log, LogError, SessionIdentity, SUMMARY_FILE,
};
use crate::session::phase::SessionPhase;
use crate::session::record::{compute_summary, SessionSample, SessionSummary, SummaryError};
use crate::transport;
use chrono::Local;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How long one consumer pull waits before re-checking termination flags.
const RECV_TIMEOUT: Duration = Duration::from_millis(100);

/// Monotonic elapsed-seconds source, swappable for scripted tests.
pub trait SessionClock {
    /// Seconds since an arbitrary fixed origin. Must never decrease.
    fn now(&mut self) -> f64;
}

/// Wall clock backed by `Instant`.
pub struct MonotonicClock(Instant);

impl MonotonicClock {
    pub fn new() -> Self {
        Self(Instant::now())
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionClock for MonotonicClock {
    fn now(&mut self) -> f64 {
        self.0.elapsed().as_secs_f64()
    }
}

/// What ended the tick loop. All reasons share the same teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// External cancellation (Ctrl+C or caller flag).
    Cancelled,
    /// The audio sink reported the track finished.
    AudioFinished,
    /// The z-score source closed or errored out.
    StreamEnded,
}

/// Result of a completed run.
#[derive(Debug)]
pub struct SessionReport {
    pub identity: SessionIdentity,
    pub end_reason: EndReason,
    pub summary: SessionSummary,
    pub sample_count: usize,
    pub sample_log_path: PathBuf,
    pub summary_path: PathBuf,
}

/// Session-level failures surfaced after teardown.
#[derive(Debug)]
pub enum SessionError {
    Summary(SummaryError),
    Log(LogError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Summary(e) => write!(f, "summary failed: {e}"),
            SessionError::Log(e) => write!(f, "log persistence failed: {e}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<SummaryError> for SessionError {
    fn from(e: SummaryError) -> Self {
        SessionError::Summary(e)
    }
}

impl From<LogError> for SessionError {
    fn from(e: LogError) -> Self {
        SessionError::Log(e)
    }
}

/// Pick the z-score source for a run.
///
/// Unless simulation is forced, try discovery and a live stream first; a
/// discovery timeout or connection failure falls back to the simulated
/// generator for the rest of the run. There is no reconnection — one
/// failure commits the session to simulation.
pub fn select_source(config: &Config, force_sim: bool) -> Box<dyn ZScoreSource> {
    if !force_sim {
        let live = transport::discover(config.discovery_timeout).and_then(|t| {
            ZScoreStream::open(t, config.window_capacity, config.schedule.baseline_s)
        });
        match live {
            Ok(stream) => return Box::new(stream),
            Err(e) => {
                tracing::warn!("live sensor unavailable ({e}), switching to simulation");
            }
        }
    }
    Box::new(SimulatedZScores::start(config.tick_interval))
}

/// One biofeedback session, owning its collaborators for its lifetime.
pub struct Session {
    config: Config,
    control: ControlConfig,
    source: Box<dyn ZScoreSource>,
    sink: Box<dyn AudioSink>,
    clock: Box<dyn SessionClock>,
    running: Arc<AtomicBool>,
}

impl Session {
    pub fn new(config: Config, source: Box<dyn ZScoreSource>, sink: Box<dyn AudioSink>) -> Self {
        Self {
            config,
            control: ControlConfig::default(),
            source,
            sink,
            clock: Box::new(MonotonicClock::new()),
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Replace the wall clock. Test hook for deterministic elapsed time.
    pub fn with_clock(mut self, clock: Box<dyn SessionClock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the control law configuration.
    pub fn with_control(mut self, control: ControlConfig) -> Self {
        self.control = control;
        self
    }

    /// Flag that ends the session when cleared (wire to Ctrl+C).
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    /// Drive the session to completion and persist its outputs.
    pub fn run(mut self) -> Result<SessionReport, SessionError> {
        let start = Local::now();
        let identity = SessionIdentity {
            subject_id: self.config.subject_id.clone(),
            session_label: self.config.session_label.clone(),
            session_id: start.format("%Y%m%d_%H%M%S").to_string(),
            t_start_iso: start.format("%Y-%m-%dT%H:%M:%S").to_string(),
        };

        tracing::info!(
            session_id = %identity.session_id,
            subject = %identity.subject_id,
            baseline_s = self.config.schedule.baseline_s,
            pre_window_s = self.config.schedule.pre_window_s,
            post_window_s = self.config.schedule.post_window_s,
            "session starting"
        );

        let mut params = AudioParams::default();
        self.sink.apply(&params);

        let mut samples: Vec<SessionSample> = Vec::new();
        let mut t0: Option<f64> = None;

        let end_reason = loop {
            if !self.running.load(Ordering::SeqCst) {
                break EndReason::Cancelled;
            }
            if self.sink.is_finished() {
                break EndReason::AudioFinished;
            }

            let z = match self.source.recv_timeout(RECV_TIMEOUT) {
                Ok(z) => z,
                Err(SourceRecvError::Timeout) => continue,
                Err(SourceRecvError::Closed) => break EndReason::StreamEnded,
            };

            // The session clock starts at the first sample, not at connect
            // time, so calibration hand-off does not skew t_rel.
            let now = self.clock.now();
            let t_rel = now - *t0.get_or_insert(now);

            let phase = self.config.schedule.phase_at(t_rel, None);
            let is_baseline = phase == SessionPhase::Baseline;

            params = update_audio_params(&self.control, &params, Some(z), None, is_baseline);
            self.sink.apply(&params);

            samples.push(SessionSample {
                t_rel,
                z,
                tempo: params.tempo,
                pitch: params.pitch,
                volume: params.volume,
            });

            tracing::debug!(
                t_rel = format_args!("{t_rel:.1}"),
                z = format_args!("{z:+.3}"),
                ?phase,
                tempo = format_args!("{:.3}", params.tempo),
                pitch = format_args!("{:.2}", params.pitch),
                volume = format_args!("{:.1}", params.volume),
                "tick"
            );
        };

        self.teardown(identity, end_reason, samples)
    }

    /// The one cleanup path shared by every exit: stop the sink, persist
    /// the per-sample log, compute the summary, append the summary row.
    /// Collected samples are never discarded on failure.
    fn teardown(
        &mut self,
        identity: SessionIdentity,
        end_reason: EndReason,
        samples: Vec<SessionSample>,
    ) -> Result<SessionReport, SessionError> {
        self.sink.stop();
        tracing::info!(?end_reason, samples = samples.len(), "session ended");

        let sample_log_path =
            write_sample_log(&self.config.log_dir, &identity.session_id, &samples)?;
        tracing::info!(path = %sample_log_path.display(), "per-sample log written");

        let summary = compute_summary(&samples, &self.config.schedule)?;

        let summary_path = self.config.data_dir.join(SUMMARY_FILE);
        append_summary_row(&summary_path, &identity, &self.config.schedule, &summary)?;
        tracing::info!(path = %summary_path.display(), "summary row appended");

        Ok(SessionReport {
            identity,
            end_reason,
            summary,
            sample_count: samples.len(),
            sample_log_path,
            summary_path,
        })
    }
}
