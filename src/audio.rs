//! Audio sink capability interface.
//!
//! The playback engine itself lives outside this crate. Every sink must
//! satisfy the full interface — apply parameters, report completion,
//! stop — so the orchestrator never probes for optional methods.

use crate::control::AudioParams;

/// Mandatory capability surface of a playback sink.
pub trait AudioSink {
    /// Apply the latest parameters to the active stream.
    ///
    /// Best effort: a sink that cannot honor a parameter logs and moves
    /// on rather than failing the control loop.
    fn apply(&mut self, params: &AudioParams);

    /// Whether the underlying track has finished playing.
    fn is_finished(&self) -> bool;

    /// Stop playback. Safe to call more than once.
    fn stop(&mut self);
}

/// Playback-rate bias applied on top of the tempo factor.
const BASE_RATE: f64 = 1.05;

/// Bounds on the derived playback rate.
const RATE_MIN: f64 = 0.90;
const RATE_MAX: f64 = 1.20;

/// Sink for engine-less runs: derives the playback rate the way a real
/// engine would and logs every update instead of rendering audio.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    stopped: bool,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Playback rate a real engine would run at for these parameters.
    pub fn playback_rate(params: &AudioParams) -> f64 {
        (BASE_RATE * params.tempo).max(RATE_MIN).min(RATE_MAX)
    }
}

impl AudioSink for ConsoleSink {
    fn apply(&mut self, params: &AudioParams) {
        tracing::info!(
            tempo = format_args!("{:.3}", params.tempo),
            pitch = format_args!("{:.2}", params.pitch),
            volume = format_args!("{:.0}", params.volume),
            rate = format_args!("{:.3}", Self::playback_rate(params)),
            "audio params"
        );
    }

    fn is_finished(&self) -> bool {
        // Nothing is playing, so nothing ever finishes; the session ends
        // by cancellation or stream exhaustion.
        false
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            tracing::info!("audio sink stopped");
        }
    }
}
