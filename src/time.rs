//! Conversions between `HH:MM:SS` strings and microsecond offsets.
//!
//! Everything else in this crate works in microseconds; these are for front-ends that show or
//! read chapter times.

use thiserror::Error;

const MICROS_PER_SECOND: i64 = 1_000_000;

/// Largest offset that still fits `HH:MM:SS`, which is `99:59:59`.
pub const MAX_MICROSECS: i64 = 359_999 * MICROS_PER_SECOND;

/// A time string or offset that cannot be converted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseTimeError {
    /// The string is not exactly `HH:MM:SS`, with minutes and seconds below 60.
    #[error("Invalid time format {0:?}. The valid format is HH:MM:SS, from 00:00:00 to 99:59:59")]
    InvalidFormat(String),

    /// The offset is longer than `99:59:59`.
    #[error("Max absolute value of microsecs is 359999000000, got {0}")]
    OutOfRange(i64),
}

/// Which way a relative seek goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Towards the end of the track.
    #[default]
    Forward,
    /// Towards the start of the track.
    Reverse,
}

impl Direction {
    /// Turn a distance into a signed seek offset.
    pub fn apply(self, microsecs: i64) -> i64 {
        match self {
            Direction::Forward => microsecs,
            Direction::Reverse => -microsecs,
        }
    }
}

fn two_digits(field: &str, max: i64) -> Option<i64> {
    match field.as_bytes() {
        [tens @ b'0'..=b'9', ones @ b'0'..=b'9'] => {
            let value = i64::from(tens - b'0') * 10 + i64::from(ones - b'0');
            Some(value).filter(|&value| value <= max)
        }
        _ => None,
    }
}

/// Parse `HH:MM:SS` into microseconds.
///
/// ```rust
/// use mpris_chapters::time::to_microsecs;
///
/// assert_eq!(to_microsecs("01:02:03"), Ok(3_723_000_000));
/// assert!(to_microsecs("1:02:03").is_err());
/// ```
pub fn to_microsecs(time: &str) -> Result<i64, ParseTimeError> {
    let invalid = || ParseTimeError::InvalidFormat(time.to_owned());

    let mut fields = time.split(':');
    let fields = (fields.next(), fields.next(), fields.next(), fields.next());
    let (hours, minutes, seconds) = match fields {
        (Some(hours), Some(minutes), Some(seconds), None) => (
            two_digits(hours, 99).ok_or_else(invalid)?,
            two_digits(minutes, 59).ok_or_else(invalid)?,
            two_digits(seconds, 59).ok_or_else(invalid)?,
        ),
        _ => return Err(invalid()),
    };

    Ok(((hours * 60 + minutes) * 60 + seconds) * MICROS_PER_SECOND)
}

/// Format microseconds as `HH:MM:SS`, dropping the sign and any fraction of a second.
pub fn to_hhmmss(microsecs: i64) -> Result<String, ParseTimeError> {
    let total = microsecs
        .checked_abs()
        .filter(|&total| total <= MAX_MICROSECS)
        .ok_or(ParseTimeError::OutOfRange(microsecs))?;

    let seconds = total / MICROS_PER_SECOND;
    Ok(format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        seconds / 60 % 60,
        seconds % 60
    ))
}
