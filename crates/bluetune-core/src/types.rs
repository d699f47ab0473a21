//! Scalar protocol types shared by commands and messages

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw volume values are percentages
pub const VOLUME_SCALE: f32 = 100.0;

/// Raw stream positions are fractions scaled by this factor
pub const POSITION_SCALE: f32 = 10000.0;

/// Integer status returned by engine entry points and carried by Nack messages.
///
/// Zero means success. Negative values are engine-defined failure codes; only a
/// handful are named here because the engine owns their meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Status(pub i32);

impl Status {
    pub const SUCCESS: Status = Status(0);
    pub const FAILURE: Status = Status(-1);
    pub const INVALID_PARAMETERS: Status = Status(-2);
    pub const INPUT_NOT_FOUND: Status = Status(-3);
    pub const INVALID_STATE: Status = Status(-4);
    pub const TERMINATED: Status = Status(-5);

    pub fn is_success(self) -> bool {
        self.0 == 0
    }

    pub fn is_failure(self) -> bool {
        !self.is_success()
    }

    pub fn code(self) -> i32 {
        self.0
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::SUCCESS
    }
}

impl From<i32> for Status {
    fn from(code: i32) -> Self {
        Status(code)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Status::SUCCESS => write!(f, "success"),
            Status::FAILURE => write!(f, "failure"),
            Status::INVALID_PARAMETERS => write!(f, "invalid parameters"),
            Status::INPUT_NOT_FOUND => write!(f, "input not found"),
            Status::INVALID_STATE => write!(f, "invalid state"),
            Status::TERMINATED => write!(f, "terminated"),
            Status(code) => write!(f, "error {}", code),
        }
    }
}

/// Decoder state as pushed by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecoderState {
    Stopped,
    Playing,
    Paused,
    EndOfStream,
    Terminated,
}

impl DecoderState {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(DecoderState::Stopped),
            1 => Some(DecoderState::Playing),
            2 => Some(DecoderState::Paused),
            3 => Some(DecoderState::EndOfStream),
            4 => Some(DecoderState::Terminated),
            _ => None,
        }
    }

    pub fn as_raw(self) -> i32 {
        match self {
            DecoderState::Stopped => 0,
            DecoderState::Playing => 1,
            DecoderState::Paused => 2,
            DecoderState::EndOfStream => 3,
            DecoderState::Terminated => 4,
        }
    }

    /// Upper-case label used by console output
    pub fn label(self) -> &'static str {
        match self {
            DecoderState::Stopped => "STOPPED",
            DecoderState::Playing => "PLAYING",
            DecoderState::Paused => "PAUSED",
            DecoderState::EndOfStream => "END OF STREAM",
            DecoderState::Terminated => "TERMINATED",
        }
    }
}

impl fmt::Display for DecoderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stream time code. `f` counts hundredths of a second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TimeCode {
    pub h: u8,
    pub m: u8,
    pub s: u8,
    pub f: u8,
}

impl TimeCode {
    pub fn new(h: u8, m: u8, s: u8, f: u8) -> Self {
        Self { h, m, s, f }
    }

    /// Split a millisecond time stamp. Hours saturate at 255.
    pub fn from_millis(millis: u64) -> Self {
        let seconds = millis / 1000;
        let h = (seconds / 3600).min(u8::MAX as u64) as u8;
        let m = ((seconds / 60) % 60) as u8;
        let s = (seconds % 60) as u8;
        let f = ((millis % 1000) / 10) as u8;
        Self { h, m, s, f }
    }

    pub fn to_millis(self) -> u64 {
        let seconds = self.h as u64 * 3600 + self.m as u64 * 60 + self.s as u64;
        seconds * 1000 + self.f as u64 * 10
    }
}

impl fmt::Display for TimeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}.{:02}", self.h, self.m, self.s, self.f)
    }
}

/// Convert a raw volume percentage (0..=100) to a level in [0.0, 1.0]
pub fn volume_from_raw(raw: i32) -> f32 {
    raw as f32 / VOLUME_SCALE
}

/// Convert a level in [0.0, 1.0] to the raw percentage an engine reports
pub fn volume_to_raw(level: f32) -> i32 {
    (level.clamp(0.0, 1.0) * VOLUME_SCALE).round() as i32
}

/// Convert a raw stream position (scaled by 10000) to a fraction
pub fn position_from_raw(raw: i32) -> f32 {
    raw as f32 / POSITION_SCALE
}

/// Convert a fraction in [0.0, 1.0] to the raw scaled position
pub fn position_to_raw(fraction: f32) -> i32 {
    (fraction.clamp(0.0, 1.0) * POSITION_SCALE).round() as i32
}

/// Normalize an integer slider value against its maximum.
///
/// Returns 0.0 for a non-positive maximum.
pub fn normalize_slider(value: i32, max: i32) -> f32 {
    if max <= 0 {
        return 0.0;
    }
    (value as f32 / max as f32).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_normalization() {
        assert_eq!(volume_from_raw(100), 1.0);
        assert_eq!(volume_from_raw(0), 0.0);
        assert_eq!(volume_from_raw(50), 0.5);
        assert_eq!(volume_to_raw(0.5), 50);
        assert_eq!(volume_to_raw(2.0), 100);
    }

    #[test]
    fn test_position_normalization() {
        assert_eq!(position_from_raw(10000), 1.0);
        assert_eq!(position_from_raw(0), 0.0);
        assert_eq!(position_from_raw(2500), 0.25);
        assert_eq!(position_to_raw(0.25), 2500);
    }

    #[test]
    fn test_normalize_slider() {
        assert_eq!(normalize_slider(50, 100), 0.5);
        assert_eq!(normalize_slider(255, 255), 1.0);
        assert_eq!(normalize_slider(10, 0), 0.0);
        assert_eq!(normalize_slider(-5, 100), 0.0);
    }

    #[test]
    fn test_decoder_state_raw_values() {
        for raw in 0..5 {
            let state = DecoderState::from_raw(raw).unwrap();
            assert_eq!(state.as_raw(), raw);
        }
        assert_eq!(DecoderState::from_raw(5), None);
        assert_eq!(DecoderState::from_raw(-1), None);
    }

    #[test]
    fn test_timecode_from_millis() {
        let tc = TimeCode::from_millis(3_723_450);
        assert_eq!(tc, TimeCode::new(1, 2, 3, 45));
        assert_eq!(tc.to_millis(), 3_723_450);
        assert_eq!(tc.to_string(), "01:02:03.45");
    }

    #[test]
    fn test_status_display() {
        assert!(Status::SUCCESS.is_success());
        assert!(Status(-42).is_failure());
        assert_eq!(Status::INVALID_STATE.to_string(), "invalid state");
        assert_eq!(Status(-42).to_string(), "error -42");
    }
}
