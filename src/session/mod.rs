//! Session orchestration: phase machine, tick loop, logs, and summary.

pub mod log;
pub mod orchestrator;
pub mod phase;
pub mod record;

pub use log::{append_summary_row, write_sample_log, LogError, SessionIdentity, SUMMARY_FILE};
pub use orchestrator::{
    select_source, EndReason, MonotonicClock, Session, SessionClock, SessionError, SessionReport,
};
pub use phase::{SessionPhase, SessionSchedule};
pub use record::{compute_summary, SessionSample, SessionSummary, SummaryError};
