//! Bounded beat-interval window and RMSSD computation.
//!
//! The window keeps the most recent beat-to-beat intervals (default 20)
//! and computes the root mean square of successive differences over them.
//! RMSSD is the time-domain HRV metric the rest of the pipeline runs on.

/// Default number of intervals retained for each RMSSD computation.
pub const DEFAULT_WINDOW_CAPACITY: usize = 20;

/// Fewer intervals than this and RMSSD is undefined.
pub const MIN_INTERVALS: usize = 3;

/// Ordered bounded sequence of beat intervals, in milliseconds.
#[derive(Debug, Clone)]
pub struct IntervalWindow {
    capacity: usize,
    intervals_ms: std::collections::VecDeque<f64>,
}

impl IntervalWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            intervals_ms: std::collections::VecDeque::with_capacity(capacity),
        }
    }

    /// Append one interval, evicting the oldest beyond capacity.
    pub fn push(&mut self, interval_ms: f64) {
        self.intervals_ms.push_back(interval_ms);
        while self.intervals_ms.len() > self.capacity {
            self.intervals_ms.pop_front();
        }
    }

    /// Append a batch of intervals in arrival order.
    pub fn extend(&mut self, intervals_ms: &[f64]) {
        for &interval in intervals_ms {
            self.push(interval);
        }
    }

    pub fn len(&self) -> usize {
        self.intervals_ms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals_ms.is_empty()
    }

    /// RMSSD over the current window, in seconds.
    ///
    /// Returns `None` while fewer than [`MIN_INTERVALS`] intervals are
    /// present.
    pub fn rmssd(&self) -> Option<f64> {
        if self.intervals_ms.len() < MIN_INTERVALS {
            return None;
        }

        let mut sum_sq = 0.0;
        let mut count = 0usize;
        let mut prev: Option<f64> = None;
        for &interval in &self.intervals_ms {
            if let Some(p) = prev {
                let diff = interval - p;
                sum_sq += diff * diff;
                count += 1;
            }
            prev = Some(interval);
        }

        let rmssd_ms = (sum_sq / count as f64).sqrt();
        Some(rmssd_ms / 1000.0)
    }
}

impl Default for IntervalWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rmssd_requires_three_intervals() {
        let mut window = IntervalWindow::default();
        assert!(window.rmssd().is_none());
        window.push(900.0);
        window.push(950.0);
        assert!(window.rmssd().is_none());
    }

    #[test]
    fn test_rmssd_known_value() {
        // diffs [50, 50] -> RMSSD 50 ms = 0.05 s
        let mut window = IntervalWindow::default();
        window.extend(&[900.0, 950.0, 1000.0]);

        let rmssd = window.rmssd().unwrap();
        assert!((rmssd - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut window = IntervalWindow::new(3);
        window.extend(&[100.0, 200.0, 300.0, 400.0]);

        assert_eq!(window.len(), 3);
        // Window is now [200, 300, 400]: diffs [100, 100] -> 100 ms.
        let rmssd = window.rmssd().unwrap();
        assert!((rmssd - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_constant_intervals_zero_rmssd() {
        let mut window = IntervalWindow::default();
        window.extend(&[800.0, 800.0, 800.0, 800.0]);
        assert_eq!(window.rmssd().unwrap(), 0.0);
    }
}
