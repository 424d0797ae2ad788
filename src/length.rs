//! Session length input.
//!
//! A length is typed either as bare minutes (`"45"`) or as hours and
//! minutes (`"1:30"`). `"0"` (or `"0:00"`) asks for an open-ended
//! stopwatch session.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Timing;

const MAX_MINUTE_DIGITS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidLength {
    #[error("length is empty")]
    Empty,
    #[error("unexpected character {0:?}")]
    InvalidCharacter(char),
    #[error("only one ':' is allowed")]
    TooManySeparators,
    #[error("hours are missing")]
    MissingHours,
    #[error("minutes are missing")]
    MissingMinutes,
    #[error("too many digits")]
    TooManyDigits,
    #[error("minutes must be between 0 and 59, got {0}")]
    MinutesOutOfRange(u64),
    #[error("session must last {min} to {max} minutes, got {minutes}")]
    OutOfRange { minutes: u64, min: u64, max: u64 },
}

/// How the length input is typed and displayed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    #[default]
    #[strum(serialize = "minutes")]
    Minute,
    #[strum(serialize = "hours:minutes")]
    HourMinute,
}

impl InputMode {
    pub fn toggled(self) -> Self {
        match self {
            InputMode::Minute => InputMode::HourMinute,
            InputMode::HourMinute => InputMode::Minute,
        }
    }
}

fn digits(s: &str) -> Result<u64, InvalidLength> {
    // Only ASCII digits reach here, so the only failure is overflow.
    s.parse::<u64>().map_err(|_| InvalidLength::TooManyDigits)
}

/// Parse a length into whole minutes, `0` meaning stopwatch.
pub fn parse_minutes(raw: &str, timing: &Timing) -> Result<u64, InvalidLength> {
    if raw.is_empty() {
        return Err(InvalidLength::Empty);
    }
    if let Some(c) = raw.chars().find(|c| !c.is_ascii_digit() && *c != ':') {
        return Err(InvalidLength::InvalidCharacter(c));
    }

    let minutes = match raw.split_once(':') {
        Some((_, rest)) if rest.contains(':') => return Err(InvalidLength::TooManySeparators),
        Some(("", _)) => return Err(InvalidLength::MissingHours),
        Some((_, "")) => return Err(InvalidLength::MissingMinutes),
        Some((hours, minutes)) => {
            if hours.len() > 1 || minutes.len() > 2 {
                return Err(InvalidLength::TooManyDigits);
            }
            let minutes = digits(minutes)?;
            if minutes > 59 {
                return Err(InvalidLength::MinutesOutOfRange(minutes));
            }
            digits(hours)? * 60 + minutes
        }
        None => {
            if raw.len() > MAX_MINUTE_DIGITS {
                return Err(InvalidLength::TooManyDigits);
            }
            digits(raw)?
        }
    };

    if minutes == 0 || (timing.min_session_len..=timing.max_session_len).contains(&minutes) {
        Ok(minutes)
    } else {
        Err(InvalidLength::OutOfRange {
            minutes,
            min: timing.min_session_len,
            max: timing.max_session_len,
        })
    }
}

/// Parse a length into seconds (ticks), `0` meaning stopwatch.
pub fn parse(raw: &str, timing: &Timing) -> Result<u64, InvalidLength> {
    parse_minutes(raw, timing).map(|m| timing.minutes_to_secs(m))
}

/// Render a minute count the way `mode` expects it to be typed.
pub fn format_minutes(minutes: u64, mode: InputMode) -> String {
    match mode {
        InputMode::Minute => minutes.to_string(),
        InputMode::HourMinute if minutes == 0 => "0".to_string(),
        InputMode::HourMinute => format!("{}:{:02}", minutes / 60, minutes % 60),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t() -> Timing {
        Timing::default()
    }

    #[test]
    fn zero_forms_are_stopwatch() {
        for raw in ["0", "0:0", "0:00", "00", "000"] {
            assert_eq!(parse(raw, &t()), Ok(0), "{raw}");
        }
    }

    #[test]
    fn broken_zero_forms_are_invalid() {
        assert_eq!(parse("0:", &t()), Err(InvalidLength::MissingMinutes));
        assert_eq!(parse("0::", &t()), Err(InvalidLength::TooManySeparators));
        assert_eq!(parse("0:::", &t()), Err(InvalidLength::TooManySeparators));
        assert_eq!(parse("0::0", &t()), Err(InvalidLength::TooManySeparators));
        assert_eq!(parse(":30", &t()), Err(InvalidLength::MissingHours));
    }

    #[test]
    fn every_valid_minute_count_parses_in_both_forms() {
        let timing = t();
        for m in timing.min_session_len..=timing.max_session_len {
            let expected = Ok(m * 60);
            assert_eq!(parse(&m.to_string(), &timing), expected);
            let (h, mm) = (m / 60, m % 60);
            assert_eq!(parse(&format!("{h}:{mm}"), &timing), expected);
            assert_eq!(parse(&format!("{h}:{mm:02}"), &timing), expected);
        }
    }

    #[test]
    fn out_of_range_minutes_are_invalid() {
        for m in [1u64, 2, 3, 4, 121, 300, 999] {
            assert!(parse(&m.to_string(), &t()).is_err(), "{m}");
        }
        for raw in ["0:01", "0:04", "0:1", "0:4", "2:01", "2:59", "3:0", "3:01"] {
            assert!(
                matches!(parse(raw, &t()), Err(InvalidLength::OutOfRange { .. })),
                "{raw}"
            );
        }
    }

    #[test]
    fn minutes_component_must_be_below_sixty() {
        assert_eq!(parse("1:61", &t()), Err(InvalidLength::MinutesOutOfRange(61)));
        assert_eq!(parse("1:60", &t()), Err(InvalidLength::MinutesOutOfRange(60)));
        assert!(parse("12:60", &t()).is_err());
    }

    #[test]
    fn malformed_input_is_invalid() {
        assert_eq!(parse("", &t()), Err(InvalidLength::Empty));
        assert_eq!(parse("abc", &t()), Err(InvalidLength::InvalidCharacter('a')));
        assert_eq!(parse(" 5", &t()), Err(InvalidLength::InvalidCharacter(' ')));
        assert_eq!(parse("-5", &t()), Err(InvalidLength::InvalidCharacter('-')));
        assert_eq!(parse("1:5a", &t()), Err(InvalidLength::InvalidCharacter('a')));
        assert_eq!(parse("1000", &t()), Err(InvalidLength::TooManyDigits));
        assert_eq!(parse("1:005", &t()), Err(InvalidLength::TooManyDigits));
        assert_eq!(parse("10:05", &t()), Err(InvalidLength::TooManyDigits));
    }

    #[test]
    fn debug_minute_scales_seconds() {
        let timing = Timing::debug(Some(1), Some(1));
        assert_eq!(parse("5", &timing), Ok(5));
        assert_eq!(parse("1", &timing), Ok(1));
        assert_eq!(parse("1:00", &timing), Ok(60));
    }

    #[test]
    fn parse_is_idempotent() {
        for raw in ["45", "1:30", "abc", "0"] {
            assert_eq!(parse(raw, &t()), parse(raw, &t()));
        }
    }

    #[test]
    fn format_minutes_per_mode() {
        assert_eq!(format_minutes(45, InputMode::Minute), "45");
        assert_eq!(format_minutes(45, InputMode::HourMinute), "0:45");
        assert_eq!(format_minutes(90, InputMode::HourMinute), "1:30");
        assert_eq!(format_minutes(0, InputMode::HourMinute), "0");
        assert_eq!(
            parse_minutes(&format_minutes(65, InputMode::HourMinute), &t()),
            Ok(65)
        );
    }
}
