//! Session time series and end-of-session summary.

use crate::session::phase::SessionSchedule;
use statrs::statistics::Statistics;

/// One tick of the session time series. Immutable once appended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSample {
    /// Seconds since the first sample of the session.
    pub t_rel: f64,
    /// HRV z-score at this tick.
    pub z: f64,
    pub tempo: f64,
    pub pitch: f64,
    pub volume: f64,
}

/// Pre/post comparison computed once from the frozen sample sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSummary {
    pub pre_mean: f64,
    pub post_mean: f64,
    pub delta: f64,
    /// Timestamp of the last sample; the session duration.
    pub t_last: f64,
    pub pre_n: usize,
    pub post_n: usize,
}

impl SessionSummary {
    /// Stress reads opposite to HRV: a score that goes up when the
    /// subject tenses is just the negated z mean.
    pub fn pre_stress(&self) -> f64 {
        -self.pre_mean
    }

    pub fn post_stress(&self) -> f64 {
        -self.post_mean
    }

    pub fn delta_stress(&self) -> f64 {
        self.post_stress() - self.pre_stress()
    }
}

/// Summary computation failures. Fatal for the summary only; the
/// per-sample log is still written.
#[derive(Debug)]
pub enum SummaryError {
    NoSamples,
    EmptyPreWindow,
    EmptyPostWindow,
}

impl std::fmt::Display for SummaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummaryError::NoSamples => write!(f, "no samples collected"),
            SummaryError::EmptyPreWindow => write!(f, "no samples in the pre window"),
            SummaryError::EmptyPostWindow => write!(f, "no samples in the post window"),
        }
    }
}

impl std::error::Error for SummaryError {}

/// Compute the pre/post summary over a finished sample sequence.
///
/// Pre window: samples with `t_rel <= pre_window_s`. Post window: samples
/// with `t_rel >= t_last - post_window_s` (clamped at zero for sessions
/// shorter than the post window).
pub fn compute_summary(
    samples: &[SessionSample],
    schedule: &SessionSchedule,
) -> Result<SessionSummary, SummaryError> {
    let t_last = samples.last().ok_or(SummaryError::NoSamples)?.t_rel;

    let pre: Vec<f64> = samples
        .iter()
        .filter(|s| s.t_rel <= schedule.pre_window_s)
        .map(|s| s.z)
        .collect();

    let post_start = (t_last - schedule.post_window_s).max(0.0);
    let post: Vec<f64> = samples
        .iter()
        .filter(|s| s.t_rel >= post_start)
        .map(|s| s.z)
        .collect();

    if pre.is_empty() {
        return Err(SummaryError::EmptyPreWindow);
    }
    if post.is_empty() {
        return Err(SummaryError::EmptyPostWindow);
    }

    let pre_mean = Statistics::mean(&pre);
    let post_mean = Statistics::mean(&post);

    Ok(SessionSummary {
        pre_mean,
        post_mean,
        delta: post_mean - pre_mean,
        t_last,
        pre_n: pre.len(),
        post_n: post.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(t_rel: f64, z: f64) -> SessionSample {
        SessionSample {
            t_rel,
            z,
            tempo: 1.0,
            pitch: -2.0,
            volume: 60.0,
        }
    }

    fn schedule() -> SessionSchedule {
        SessionSchedule {
            baseline_s: 10.0,
            pre_window_s: 20.0,
            post_window_s: 10.0,
        }
    }

    #[test]
    fn test_empty_sequence_fails() {
        assert!(matches!(
            compute_summary(&[], &schedule()),
            Err(SummaryError::NoSamples)
        ));
    }

    #[test]
    fn test_windows_and_delta() {
        let samples: Vec<SessionSample> = vec![
            sample(0.0, 1.0),
            sample(10.0, 3.0),
            sample(20.0, 2.0), // boundary: still pre
            sample(30.0, 9.0), // neither window
            sample(45.0, -1.0),
            sample(50.0, -2.0),
            sample(55.0, -3.0),
        ];

        let summary = compute_summary(&samples, &schedule()).unwrap();
        assert_eq!(summary.pre_n, 3);
        assert!((summary.pre_mean - 2.0).abs() < 1e-12);
        // Post window starts at 55 - 10 = 45.
        assert_eq!(summary.post_n, 3);
        assert!((summary.post_mean - (-2.0)).abs() < 1e-12);
        assert!((summary.delta - (-4.0)).abs() < 1e-12);
        assert_eq!(summary.t_last, 55.0);
    }

    #[test]
    fn test_short_session_post_window_clamps_to_start() {
        // Session shorter than the post window: every sample is post.
        let samples = vec![sample(0.0, 1.0), sample(3.0, 2.0)];
        let summary = compute_summary(&samples, &schedule()).unwrap();
        assert_eq!(summary.post_n, 2);
        assert!((summary.post_mean - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_pre_window_fails() {
        let schedule = SessionSchedule {
            baseline_s: 1.0,
            pre_window_s: 1.0,
            post_window_s: 5.0,
        };
        let samples = vec![sample(2.0, 1.0), sample(4.0, 1.0)];
        assert!(matches!(
            compute_summary(&samples, &schedule),
            Err(SummaryError::EmptyPreWindow)
        ));
    }

    #[test]
    fn test_stress_is_negated_z() {
        let samples = vec![sample(0.0, 1.0), sample(55.0, -2.0)];
        let summary = compute_summary(&samples, &schedule()).unwrap();
        assert_eq!(summary.pre_stress(), -summary.pre_mean);
        assert_eq!(summary.delta_stress(), -summary.delta);
    }
}
