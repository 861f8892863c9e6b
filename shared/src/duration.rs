//! Scene duration-code classification
//!
//! A single byte on the wire describes how quickly a scene should ramp
//! in. The byte is interpreted by range, not as a plain count. Codes in
//! the 128-254 band are reported as that many minutes with the raw byte
//! value used directly; no offset is subtracted.

use std::fmt;

/// Decoded form of a scene duration byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneDuration {
    /// Apply the scene immediately
    Instant,
    /// Ramp over the given number of seconds (1-127)
    Seconds(u8),
    /// Ramp over the given number of minutes (128-254, raw value)
    Minutes(u8),
    /// Use the duration stored in the target device's configuration
    Configured,
}

impl SceneDuration {
    /// Classify a raw duration byte
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => SceneDuration::Instant,
            1..=0x7f => SceneDuration::Seconds(code),
            0x80..=0xfe => SceneDuration::Minutes(code),
            0xff => SceneDuration::Configured,
        }
    }
}

impl fmt::Display for SceneDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneDuration::Instant => write!(f, "now"),
            SceneDuration::Seconds(s) => write!(f, "{} seconds", s),
            SceneDuration::Minutes(m) => write!(f, "{} minutes", m),
            SceneDuration::Configured => write!(f, "via configuration"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        assert_eq!(SceneDuration::from_code(0), SceneDuration::Instant);
        assert_eq!(SceneDuration::from_code(1), SceneDuration::Seconds(1));
        assert_eq!(SceneDuration::from_code(127), SceneDuration::Seconds(127));
        assert_eq!(SceneDuration::from_code(128), SceneDuration::Minutes(128));
        assert_eq!(SceneDuration::from_code(254), SceneDuration::Minutes(254));
        assert_eq!(SceneDuration::from_code(255), SceneDuration::Configured);
    }

    #[test]
    fn test_seconds_band_describes_raw_value() {
        for code in 1..=127u8 {
            assert_eq!(
                SceneDuration::from_code(code).to_string(),
                format!("{} seconds", code)
            );
        }
    }

    #[test]
    fn test_minutes_band_describes_raw_value() {
        for code in 128..=254u8 {
            assert_eq!(
                SceneDuration::from_code(code).to_string(),
                format!("{} minutes", code)
            );
        }
    }

    #[test]
    fn test_endpoint_descriptions() {
        assert_eq!(SceneDuration::from_code(0).to_string(), "now");
        assert_eq!(SceneDuration::from_code(255).to_string(), "via configuration");
    }
}
