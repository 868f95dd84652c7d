//! Pulseloop - closed-loop HRV biofeedback for adaptive music sessions.
//!
//! This library turns a wearable heart-rate monitor's beat-to-beat
//! interval stream into a normalized stress signal and feeds it back into
//! audio playback parameters in real time.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Pulseloop Agent                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌──────────┐   ┌──────────┐   ┌─────────┐  │
//! │  │ Transport │──▶│ Interval │──▶│ Baseline │──▶│ Z-score │  │
//! │  │  (frames) │   │  window  │   │ calibr.  │   │ channel │  │
//! │  └───────────┘   └──────────┘   └──────────┘   └────┬────┘  │
//! │        │ fallback: simulated z-score source         │       │
//! │        ▼                                            ▼       │
//! │  ┌───────────┐   ┌────────────┐   ┌──────────────────────┐  │
//! │  │ Simulator │   │  Integral  │◀──│ Session orchestrator │  │
//! │  │           │   │ controller │──▶│ (phases, logs,       │  │
//! │  └───────────┘   └────────────┘   │  summary, audio sink)│  │
//! │                                   └──────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use pulseloop_agent::audio::ConsoleSink;
//! use pulseloop_agent::config::Config;
//! use pulseloop_agent::session::{select_source, Session};
//!
//! let config = Config::default();
//! let source = select_source(&config, /* force_sim */ true);
//! let session = Session::new(config, source, Box::new(ConsoleSink::new()));
//!
//! let report = session.run().expect("session failed");
//! println!("delta z = {:+.3}", report.summary.delta);
//! ```

pub mod audio;
pub mod config;
pub mod control;
pub mod hrv;
pub mod session;
pub mod transport;

// Re-export key types at crate root for convenience
pub use audio::{AudioSink, ConsoleSink};
pub use config::{Config, ConfigError};
pub use control::{update_audio_params, AudioParams, ControlConfig};
pub use hrv::{Baseline, BaselineCalibrator, IntervalWindow, SimulatedZScores, ZScoreSource};
pub use session::{
    select_source, EndReason, Session, SessionPhase, SessionReport, SessionSchedule,
    SessionSummary,
};
pub use transport::{Transport, TransportError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
