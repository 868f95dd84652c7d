//! Streaming HRV statistics: interval window, RMSSD, baseline
//! calibration, and z-score emission.

pub mod baseline;
pub mod sim;
pub mod stream;
pub mod window;

pub use baseline::{Baseline, BaselineCalibrator, MIN_BASELINE_SAMPLES, STD_FLOOR};
pub use sim::SimulatedZScores;
pub use stream::{SourceRecvError, ZScorePipeline, ZScoreSource, ZScoreStream};
pub use window::{IntervalWindow, DEFAULT_WINDOW_CAPACITY, MIN_INTERVALS};
