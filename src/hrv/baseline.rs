//! Per-session baseline calibration.
//!
//! The calibrator accumulates RMSSD samples for a fixed duration, then
//! freezes a (mean, std) pair used to normalize everything that follows.
//! Calibration is one-way: once closed, the baseline never changes for
//! the rest of the session.

use statrs::statistics::Statistics;

/// Minimum samples before a baseline may close, regardless of elapsed time.
pub const MIN_BASELINE_SAMPLES: usize = 3;

/// Floor applied to the baseline standard deviation, in seconds.
///
/// A degenerate run of identical RMSSD values would otherwise produce a
/// zero std and unbounded z-scores.
pub const STD_FLOOR: f64 = 0.01;

/// Frozen calibration result, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    pub mean: f64,
    pub std: f64,
}

impl Baseline {
    /// Standardize an RMSSD sample against this baseline.
    pub fn z_score(&self, rmssd: f64) -> f64 {
        (rmssd - self.mean) / self.std
    }
}

/// Collecting -> Closed state machine over incoming RMSSD samples.
#[derive(Debug)]
pub struct BaselineCalibrator {
    duration_s: f64,
    samples: Vec<f64>,
    closed: Option<Baseline>,
}

impl BaselineCalibrator {
    pub fn new(duration_s: f64) -> Self {
        Self {
            duration_s,
            samples: Vec::new(),
            closed: None,
        }
    }

    /// Feed one RMSSD sample observed `elapsed_s` after calibration start.
    ///
    /// While collecting, the sample is accumulated and `None` is returned:
    /// nothing flows downstream during calibration. The baseline closes on
    /// the first sample where the elapsed time has reached the configured
    /// duration AND at least [`MIN_BASELINE_SAMPLES`] have accumulated, so
    /// the closing sample itself is still part of the baseline. If too few
    /// samples ever arrive, the calibrator simply never closes.
    pub fn ingest(&mut self, rmssd: f64, elapsed_s: f64) -> Option<Baseline> {
        if self.closed.is_some() {
            return self.closed;
        }

        self.samples.push(rmssd);

        if elapsed_s >= self.duration_s && self.samples.len() >= MIN_BASELINE_SAMPLES {
            let mean = Statistics::mean(&self.samples);
            let std = Statistics::population_std_dev(&self.samples).max(STD_FLOOR);
            let baseline = Baseline { mean, std };

            tracing::info!(
                elapsed_s = format_args!("{elapsed_s:.0}"),
                mean_ms = format_args!("{:.1}", mean * 1000.0),
                std_ms = format_args!("{:.1}", std * 1000.0),
                samples = self.samples.len(),
                "baseline closed"
            );
            self.closed = Some(baseline);
        }

        self.closed
    }

    /// The frozen baseline, if calibration has finished.
    pub fn baseline(&self) -> Option<Baseline> {
        self.closed
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_some()
    }

    /// Number of samples accumulated so far.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_closes_below_min_samples() {
        let mut cal = BaselineCalibrator::new(10.0);
        // Two samples, both well past the time threshold.
        assert!(cal.ingest(0.05, 50.0).is_none());
        assert!(cal.ingest(0.06, 60.0).is_none());
        assert!(!cal.is_closed());
    }

    #[test]
    fn test_never_closes_before_duration() {
        let mut cal = BaselineCalibrator::new(60.0);
        for i in 0..10 {
            assert!(cal.ingest(0.05, i as f64).is_none());
        }
        assert!(!cal.is_closed());
    }

    #[test]
    fn test_closes_on_sample_satisfying_both() {
        let mut cal = BaselineCalibrator::new(60.0);
        assert!(cal.ingest(0.04, 20.0).is_none());
        assert!(cal.ingest(0.05, 40.0).is_none());

        // This sample satisfies both conditions and is itself included.
        let baseline = cal.ingest(0.06, 60.0).unwrap();
        assert!((baseline.mean - 0.05).abs() < 1e-12);
        assert_eq!(cal.sample_count(), 3);
    }

    #[test]
    fn test_zero_std_is_floored() {
        let mut cal = BaselineCalibrator::new(60.0);
        for elapsed in [10.0, 25.0, 40.0, 55.0, 70.0] {
            let _ = cal.ingest(0.05, elapsed);
        }

        let baseline = cal.baseline().unwrap();
        assert_eq!(baseline.std, STD_FLOOR);
        assert!(baseline.z_score(0.05).abs() < 1e-12);
    }

    #[test]
    fn test_closed_baseline_is_immutable() {
        let mut cal = BaselineCalibrator::new(1.0);
        let _ = cal.ingest(0.04, 0.2);
        let _ = cal.ingest(0.05, 0.6);
        let first = cal.ingest(0.06, 1.0).unwrap();

        // Later samples must not move the frozen values.
        let later = cal.ingest(0.50, 99.0).unwrap();
        assert_eq!(first, later);
        assert_eq!(cal.sample_count(), 3);
    }

    #[test]
    fn test_population_std() {
        let mut cal = BaselineCalibrator::new(1.0);
        let _ = cal.ingest(0.02, 0.1);
        let _ = cal.ingest(0.04, 0.5);
        let baseline = cal.ingest(0.06, 1.0).unwrap();

        // Population std of [0.02, 0.04, 0.06] = sqrt(2/3) * 0.02
        let expected = (2.0f64 / 3.0).sqrt() * 0.02;
        assert!((baseline.std - expected).abs() < 1e-12);
    }
}
