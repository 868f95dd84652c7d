//! Heart Rate Measurement frame decoding.
//!
//! Frames follow the BLE Heart Rate Measurement characteristic layout:
//! a flags byte, a 1- or 2-byte heart-rate field, then zero or more
//! beat-to-beat intervals as little-endian u16 values in units of 1/1024 s.
//! Frames that are too short or carry no intervals are dropped, never
//! surfaced as errors.

/// Flag bit: heart-rate field is a u16 (shifts interval data by one byte).
pub const FLAG_HR_UINT16: u8 = 0x01;

/// Flag bit: beat-to-beat intervals are present in the frame.
pub const FLAG_RR_PRESENT: u8 = 0x10;

/// Smallest frame that can carry an interval-bearing payload.
pub const MIN_FRAME_LEN: usize = 3;

/// Decode the beat intervals of one frame, in milliseconds.
///
/// Returns an empty vector for frames shorter than [`MIN_FRAME_LEN`],
/// frames without [`FLAG_RR_PRESENT`], or frames whose payload contains
/// no complete interval.
pub fn parse_beat_intervals(data: &[u8]) -> Vec<f64> {
    if data.len() < MIN_FRAME_LEN {
        return Vec::new();
    }

    let flags = data[0];
    if flags & FLAG_RR_PRESENT == 0 {
        return Vec::new();
    }

    // Intervals start after the heart-rate field, whose width the flags decide.
    let mut idx = if flags & FLAG_HR_UINT16 != 0 { 3 } else { 2 };

    let mut intervals_ms = Vec::new();
    while idx + 1 < data.len() {
        let raw = u16::from_le_bytes([data[idx], data[idx + 1]]);
        intervals_ms.push(f64::from(raw) / 1024.0 * 1000.0);
        idx += 2;
    }

    intervals_ms
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Encode an interval in ms back to 1/1024 s wire units.
    fn wire(ms: f64) -> [u8; 2] {
        ((ms / 1000.0 * 1024.0).round() as u16).to_le_bytes()
    }

    #[test]
    fn test_short_frame_dropped() {
        assert!(parse_beat_intervals(&[]).is_empty());
        assert!(parse_beat_intervals(&[FLAG_RR_PRESENT, 60]).is_empty());
    }

    #[test]
    fn test_frame_without_rr_flag_dropped() {
        // Valid length, heart rate only, no interval bit set.
        assert!(parse_beat_intervals(&[0x00, 60, 0x00, 0x04]).is_empty());
    }

    #[test]
    fn test_single_interval_u8_hr() {
        // 1024 wire units = exactly 1000 ms.
        let mut frame = vec![FLAG_RR_PRESENT, 60];
        frame.extend_from_slice(&1024u16.to_le_bytes());

        let intervals = parse_beat_intervals(&frame);
        assert_eq!(intervals.len(), 1);
        assert!((intervals[0] - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_u16_hr_shifts_interval_offset() {
        let mut frame = vec![FLAG_RR_PRESENT | FLAG_HR_UINT16, 60, 0];
        frame.extend_from_slice(&wire(900.0));
        frame.extend_from_slice(&wire(950.0));

        let intervals = parse_beat_intervals(&frame);
        assert_eq!(intervals.len(), 2);
        assert!((intervals[0] - 900.0).abs() < 0.5);
        assert!((intervals[1] - 950.0).abs() < 0.5);
    }

    #[test]
    fn test_trailing_odd_byte_ignored() {
        let mut frame = vec![FLAG_RR_PRESENT, 60];
        frame.extend_from_slice(&wire(800.0));
        frame.push(0xFF);

        assert_eq!(parse_beat_intervals(&frame).len(), 1);
    }
}
