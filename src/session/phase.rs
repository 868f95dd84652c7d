//! Session phase derivation.
//!
//! A phase is never stored: it is recomputed from elapsed time on every
//! tick, so it cannot drift out of sync with the clock. The pre-window
//! duration is the full span from session start (it contains the
//! baseline); the post-window is anchored to the session end and is only
//! decidable while running if the end is known ahead of time.

use serde::{Deserialize, Serialize};

/// Where in the session a given instant falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Calibration window; controller relaxes toward neutral.
    Baseline,
    /// Post-baseline portion of the pre-measurement window.
    PreWindow,
    /// Closed-loop biofeedback.
    Active,
    /// Final measurement window before the end.
    PostWindow,
}

/// The three durations governing phase boundaries, in seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SessionSchedule {
    pub baseline_s: f64,
    pub pre_window_s: f64,
    pub post_window_s: f64,
}

impl Default for SessionSchedule {
    fn default() -> Self {
        Self {
            baseline_s: 60.0,
            pre_window_s: 120.0,
            post_window_s: 60.0,
        }
    }
}

impl SessionSchedule {
    /// Phase at `elapsed_s` seconds into the session.
    ///
    /// `end_hint_s` is the expected session end when the sink knows its
    /// track length; without it the post-window cannot be identified live
    /// and the tail of the session reads as Active. Summary computation
    /// re-derives the post-window from the actual end either way.
    pub fn phase_at(&self, elapsed_s: f64, end_hint_s: Option<f64>) -> SessionPhase {
        if elapsed_s <= self.baseline_s {
            return SessionPhase::Baseline;
        }
        if elapsed_s <= self.pre_window_s {
            return SessionPhase::PreWindow;
        }
        if let Some(end) = end_hint_s {
            if elapsed_s >= (end - self.post_window_s).max(0.0) {
                return SessionPhase::PostWindow;
            }
        }
        SessionPhase::Active
    }

    pub fn is_baseline(&self, elapsed_s: f64) -> bool {
        self.phase_at(elapsed_s, None) == SessionPhase::Baseline
    }
}
