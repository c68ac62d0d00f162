use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// A time of day in the canonical wire format `HH:MM:SS` (24-hour, zero-padded).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CanonicalTime(String);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimeFormatError {
    #[error("'{0}' is not a valid time: expected HH:MM")]
    Unrecognized(String),
    #[error("'{0}' is not a valid time: hour must be 0-23")]
    HourOutOfRange(String),
    #[error("'{0}' is not a valid time: minute must be 0-59")]
    MinuteOutOfRange(String),
}

/// Normalizes loosely formatted time-of-day input into [`CanonicalTime`].
///
/// Accepts inputs like `"8.30"`, `"0830"`, `"8:30"` or `"9"`. A `.` is treated
/// as the minute separator and every character other than a digit or `:` is
/// dropped before matching. Seconds are always `00`.
pub fn normalize(raw: &str) -> Result<CanonicalTime, TimeFormatError> {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| if c == '.' { ':' } else { c })
        .filter(|c| c.is_ascii_digit() || *c == ':')
        .collect();

    let unrecognized = || TimeFormatError::Unrecognized(raw.to_string());
    let (hour, minute) = split_hour_minute(&cleaned).ok_or_else(unrecognized)?;

    let hour: u8 = hour.parse().map_err(|_| unrecognized())?;
    let minute: u8 = match minute {
        Some(m) => m.parse().map_err(|_| unrecognized())?,
        None => 0,
    };

    if hour > 23 {
        return Err(TimeFormatError::HourOutOfRange(raw.to_string()));
    }
    if minute > 59 {
        return Err(TimeFormatError::MinuteOutOfRange(raw.to_string()));
    }

    Ok(CanonicalTime(format!("{:02}:{:02}:00", hour, minute)))
}

/// Matches `^(\d{1,2})(?::?(\d{2}))?$` on input that only holds digits and colons.
fn split_hour_minute(s: &str) -> Option<(&str, Option<&str>)> {
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());

    if let Some((hour, minute)) = s.split_once(':') {
        let hour_ok = all_digits(hour) && hour.len() <= 2;
        let minute_ok = all_digits(minute) && minute.len() == 2;
        return (hour_ok && minute_ok).then_some((hour, Some(minute)));
    }

    if !all_digits(s) {
        return None;
    }
    match s.len() {
        1 | 2 => Some((s, None)),
        3 => Some((&s[..1], Some(&s[1..]))),
        4 => Some((&s[..2], Some(&s[2..]))),
        _ => None,
    }
}

impl CanonicalTime {
    /// Parses a value read back from the store.
    ///
    /// Strict `HH:MM:SS` values keep their seconds. Anything else goes through
    /// [`normalize`].
    pub fn parse(value: &str) -> Result<Self, TimeFormatError> {
        let format = time::macros::format_description!("[hour]:[minute]:[second]");
        match time::Time::parse(value, &format) {
            Ok(_) => Ok(Self(value.to_string())),
            Err(_) => normalize(value),
        }
    }

    /// `HH:MM`, as shown in schedule listings.
    pub fn hh_mm(&self) -> &str {
        &self.0[..5]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for CanonicalTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl Deref for CanonicalTime {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for CanonicalTime {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(raw: &str) -> String {
        normalize(raw).unwrap().to_string()
    }

    #[test]
    fn dot_is_minute_separator() {
        assert_eq!(ok("8.30"), "08:30:00");
    }

    #[test]
    fn colon_form_is_accepted() {
        assert_eq!(ok("23:59"), "23:59:00");
        assert_eq!(ok("0:00"), "00:00:00");
    }

    #[test]
    fn bare_hour_defaults_minutes() {
        assert_eq!(ok("9"), "09:00:00");
        assert_eq!(ok("17"), "17:00:00");
    }

    #[test]
    fn compact_digits_split_like_the_pattern() {
        assert_eq!(ok("830"), "08:30:00");
        assert_eq!(ok("0830"), "08:30:00");
        assert_eq!(ok("1245"), "12:45:00");
    }

    #[test]
    fn noise_characters_are_stripped() {
        assert_eq!(ok("  08:30 "), "08:30:00");
        assert_eq!(ok("8 30"), "08:30:00");
        assert_eq!(ok("08h30"), "08:30:00");
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert_eq!(
            normalize("24:00").unwrap_err(),
            TimeFormatError::HourOutOfRange("24:00".to_string())
        );
        assert_eq!(
            normalize("12:60").unwrap_err(),
            TimeFormatError::MinuteOutOfRange("12:60".to_string())
        );
    }

    #[test]
    fn malformed_values_are_rejected() {
        for raw in ["", "   ", ":30", "8:", "8:5", "12345", "1:2:3", "abc"] {
            assert_eq!(
                normalize(raw).unwrap_err(),
                TimeFormatError::Unrecognized(raw.to_string()),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn accepted_output_is_always_canonical() {
        for hour in 0..30 {
            for minute in [0, 5, 30, 59, 60, 75] {
                let raw = format!("{hour}:{minute:02}");
                match normalize(&raw) {
                    Ok(t) => {
                        let bytes = t.as_bytes();
                        assert_eq!(t.len(), 8);
                        assert!(bytes[..2].iter().all(u8::is_ascii_digit));
                        assert_eq!(&t[2..3], ":");
                        assert!(bytes[3..5].iter().all(u8::is_ascii_digit));
                        assert_eq!(&t[5..], ":00");
                        assert!(hour <= 23 && minute <= 59);
                    }
                    Err(_) => assert!(hour > 23 || minute > 59),
                }
            }
        }
    }

    #[test]
    fn stored_values_keep_seconds() {
        let t = CanonicalTime::parse("08:30:15").unwrap();
        assert_eq!(t.as_str(), "08:30:15");
        assert_eq!(t.hh_mm(), "08:30");

        let t = CanonicalTime::parse("15:30").unwrap();
        assert_eq!(t.as_str(), "15:30:00");
    }

    #[test]
    fn deserialize_rejects_garbage() {
        let parsed: Result<CanonicalTime, _> = serde_json::from_str("\"late\"");
        assert!(parsed.is_err());
    }
}
