//! Integral controller mapping physiological signals to audio parameters.
//!
//! Intent: higher HRV (positive z) reads as calm and eases the music
//! toward slow and soft; lower HRV (negative z) nudges tempo up. The HRV
//! error is integrated into tempo, pitch, and volume with per-parameter
//! gains; the optional secondary signal adds a small proportional
//! coloring to pitch and volume only, never integrated.
//!
//! The controller is a pure state-transition function. The caller owns
//! the [`AudioParams`] state and threads it through every tick. Output
//! clamping is the only anti-windup: a sustained one-sided error parks a
//! parameter at its boundary, and an opposite-sign error must walk back
//! across the whole clamped range before the output moves again. Known
//! limitation, kept as-is.

/// Audio playback parameters carried across ticks.
///
/// `tempo` is a playback-rate factor around 1.0, `pitch` a semitone
/// shift (negative = deeper), `volume` a percentage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioParams {
    pub tempo: f64,
    pub pitch: f64,
    pub volume: f64,
}

impl Default for AudioParams {
    fn default() -> Self {
        Self {
            tempo: 1.0,
            pitch: -2.0,
            volume: 60.0,
        }
    }
}

/// Gains, limits, and the neutral point of the control law.
#[derive(Debug, Clone, Copy)]
pub struct ControlConfig {
    /// Target HRV z-score.
    pub setpoint: f64,
    /// Fractional step toward neutral per tick while no signal is usable.
    pub relax_alpha: f64,
    /// Resting parameters the relax path decays toward.
    pub neutral: AudioParams,
    /// Clamp ranges keeping the output musical.
    pub tempo_range: (f64, f64),
    pub pitch_range: (f64, f64),
    pub volume_range: (f64, f64),
    /// Integral gains per parameter. Tempo reacts opposite in sign to
    /// pitch and volume.
    pub ki_tempo: f64,
    pub ki_pitch: f64,
    pub ki_volume: f64,
    /// Proportional gains for the secondary signal (pitch/volume only).
    pub kp_secondary_pitch: f64,
    pub kp_secondary_volume: f64,
    /// Effective control-loop time step in seconds.
    pub dt: f64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            setpoint: 0.0,
            relax_alpha: 0.02,
            neutral: AudioParams::default(),
            tempo_range: (0.85, 1.15),
            pitch_range: (-6.0, 0.0),
            volume_range: (52.0, 68.0),
            ki_tempo: 0.010,
            ki_pitch: -0.030,
            ki_volume: -0.400,
            kp_secondary_pitch: 0.15,
            kp_secondary_volume: 1.0,
            dt: 1.0,
        }
    }
}

fn clamp(value: f64, range: (f64, f64)) -> f64 {
    value.max(range.0).min(range.1)
}

/// One controller step.
///
/// With `is_baseline` set or no z available, every parameter decays
/// toward neutral by `relax_alpha` per tick — the fail-safe path on
/// signal loss. Otherwise the HRV error is integrated into each
/// parameter, the secondary signal (when present) shifts pitch and
/// volume proportionally, and everything is clamped to its range.
/// Deterministic: the same inputs and starting state always produce the
/// same output.
pub fn update_audio_params(
    config: &ControlConfig,
    prev: &AudioParams,
    hrv_z: Option<f64>,
    secondary_z: Option<f64>,
    is_baseline: bool,
) -> AudioParams {
    let (hrv_z, relax) = match hrv_z {
        Some(z) if !is_baseline => (z, false),
        _ => (0.0, true),
    };

    if relax {
        let a = config.relax_alpha;
        return AudioParams {
            tempo: prev.tempo + a * (config.neutral.tempo - prev.tempo),
            pitch: prev.pitch + a * (config.neutral.pitch - prev.pitch),
            volume: prev.volume + a * (config.neutral.volume - prev.volume),
        };
    }

    // error > 0 when HRV sits below the setpoint.
    let error = config.setpoint - hrv_z;

    let tempo = prev.tempo + config.ki_tempo * error * config.dt;
    let mut pitch = prev.pitch + config.ki_pitch * error * config.dt;
    let mut volume = prev.volume + config.ki_volume * error * config.dt;

    if let Some(s) = secondary_z {
        pitch += config.kp_secondary_pitch * s;
        volume += config.kp_secondary_volume * s;
    }

    AudioParams {
        tempo: clamp(tempo, config.tempo_range),
        pitch: clamp(pitch, config.pitch_range),
        volume: clamp(volume, config.volume_range),
    }
}
