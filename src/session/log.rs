//! Flat per-session logs.
//!
//! Two delimited text outputs per run: a per-sample time series written
//! once at session end, and a one-row-per-session summary appended to a
//! cumulative file whose header is written only when the file is created.

use crate::session::phase::SessionSchedule;
use crate::session::record::{SessionSample, SessionSummary};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Cumulative summary file name.
pub const SUMMARY_FILE: &str = "stress_summary.csv";

const SAMPLE_HEADER: &str = "t_rel_s,rmssd_z,tempo,pitch,volume";

const SUMMARY_HEADER: &str = "subject_id,session_label,session_id,t_start_iso,duration_s,\
                              baseline_s,pre_window_s,post_window_s,pre_mean_z,post_mean_z,\
                              delta_z,pre_n,post_n";

/// Log persistence failures.
#[derive(Debug)]
pub enum LogError {
    Io(String),
}

impl std::fmt::Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogError::Io(e) => write!(f, "log IO error: {e}"),
        }
    }
}

impl std::error::Error for LogError {}

impl From<std::io::Error> for LogError {
    fn from(e: std::io::Error) -> Self {
        LogError::Io(e.to_string())
    }
}

/// Write the full sample sequence to `<dir>/session_<id>_samples.csv`.
///
/// Returns the path written.
pub fn write_sample_log(
    dir: &Path,
    session_id: &str,
    samples: &[SessionSample],
) -> Result<PathBuf, LogError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("session_{session_id}_samples.csv"));

    let mut out = String::with_capacity(samples.len() * 48 + SAMPLE_HEADER.len());
    out.push_str(SAMPLE_HEADER);
    out.push('\n');
    for s in samples {
        out.push_str(&format!(
            "{:.3},{:.6},{:.4},{:.4},{:.2}\n",
            s.t_rel, s.z, s.tempo, s.pitch, s.volume
        ));
    }

    std::fs::write(&path, out)?;
    Ok(path)
}

/// Identification fields carried into the summary row.
#[derive(Debug, Clone)]
pub struct SessionIdentity {
    pub subject_id: String,
    pub session_label: String,
    pub session_id: String,
    pub t_start_iso: String,
}

/// Append one summary row, writing the header first if the file is new.
pub fn append_summary_row(
    path: &Path,
    identity: &SessionIdentity,
    schedule: &SessionSchedule,
    summary: &SessionSummary,
) -> Result<(), LogError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let is_new = !path.is_file();
    let mut file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;

    if is_new {
        writeln!(file, "{SUMMARY_HEADER}")?;
    }

    writeln!(
        file,
        "{},{},{},{},{:.3},{:.0},{:.0},{:.0},{:.4},{:.4},{:.4},{},{}",
        identity.subject_id,
        identity.session_label,
        identity.session_id,
        identity.t_start_iso,
        summary.t_last,
        schedule.baseline_s,
        schedule.pre_window_s,
        schedule.post_window_s,
        summary.pre_mean,
        summary.post_mean,
        summary.delta,
        summary.pre_n,
        summary.post_n,
    )?;

    Ok(())
}

/// Read the raw summary rows (header excluded), newest last.
pub fn read_summary_rows(path: &Path) -> Result<Vec<String>, LogError> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect())
}
