//! Conversion between chat timestamp text and playback seconds.
//!
//! Replay exports display offsets as `[h:]mm:ss`, with a leading `-` for
//! messages sent before the broadcast started.

use thiserror::Error;

/// Seconds in one hour.
const SECS_PER_HOUR: i64 = 3600;

/// Seconds in one minute.
const SECS_PER_MINUTE: i64 = 60;

/// Errors produced while parsing timestamp text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    /// Text did not split into two or three colon-separated parts
    #[error("Malformed timestamp '{text}': expected [h:]mm:ss")]
    Malformed { text: String },

    /// A component was empty or contained something other than digits
    #[error("Invalid timestamp component '{part}' in '{text}'")]
    InvalidComponent { text: String, part: String },

    /// The value does not fit in an i64 second count
    #[error("Timestamp '{text}' is out of range")]
    OutOfRange { text: String },
}

/// Parse `[-][h:]mm:ss` into signed seconds.
///
/// # Example
/// ```ignore
/// assert_eq!(parse("1:02:03")?, 3723);
/// assert_eq!(parse("-0:05")?, -5);
/// ```
pub fn parse(text: &str) -> Result<i64, TimestampError> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let parts: Vec<&str> = body.split(':').collect();
    let scaled: Vec<(&str, i64)> = match parts.as_slice() {
        [h, m, s] => vec![(*h, SECS_PER_HOUR), (*m, SECS_PER_MINUTE), (*s, 1)],
        [m, s] => vec![(*m, SECS_PER_MINUTE), (*s, 1)],
        _ => {
            return Err(TimestampError::Malformed {
                text: text.to_string(),
            });
        }
    };

    let mut total: i64 = 0;
    for (part, scale) in scaled {
        let value = parse_component(text, part)?;
        total = value
            .checked_mul(scale)
            .and_then(|v| total.checked_add(v))
            .ok_or_else(|| TimestampError::OutOfRange {
                text: text.to_string(),
            })?;
    }

    Ok(if negative { -total } else { total })
}

/// Parse one non-negative base-10 component.
fn parse_component(text: &str, part: &str) -> Result<i64, TimestampError> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimestampError::InvalidComponent {
            text: text.to_string(),
            part: part.to_string(),
        });
    }

    part.parse::<i64>().map_err(|_| TimestampError::OutOfRange {
        text: text.to_string(),
    })
}

/// Format non-negative seconds as `mm:ss`, or `hh:mm:ss` from one hour up.
///
/// Negative input is clamped to zero; only `parse` produces negative offsets.
pub fn format(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / SECS_PER_HOUR;
    let minutes = (seconds % SECS_PER_HOUR) / SECS_PER_MINUTE;
    let secs = seconds % SECS_PER_MINUTE;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minutes_seconds() {
        assert_eq!(parse("01:05").unwrap(), 65);
        assert_eq!(parse("0:00").unwrap(), 0);
        assert_eq!(parse("59:59").unwrap(), 3599);
    }

    #[test]
    fn test_parse_hours() {
        assert_eq!(parse("1:02:03").unwrap(), 3723);
        assert_eq!(parse("10:00:00").unwrap(), 36000);
    }

    #[test]
    fn test_parse_negative() {
        assert_eq!(parse("-0:05").unwrap(), -5);
        assert_eq!(parse("-1:00:01").unwrap(), -3601);
    }

    #[test]
    fn test_parse_unnormalized_components_still_sum() {
        // Exports never produce these, but the arithmetic is well defined
        assert_eq!(parse("0:75").unwrap(), 75);
        assert_eq!(parse("90:00").unwrap(), 5400);
    }

    #[test]
    fn test_parse_malformed_shapes() {
        assert!(matches!(
            parse("42"),
            Err(TimestampError::Malformed { .. })
        ));
        assert!(matches!(
            parse("1:2:3:4"),
            Err(TimestampError::Malformed { .. })
        ));
        assert!(matches!(parse(""), Err(TimestampError::Malformed { .. })));
    }

    #[test]
    fn test_parse_invalid_components() {
        assert!(matches!(
            parse("1:"),
            Err(TimestampError::InvalidComponent { .. })
        ));
        assert!(matches!(
            parse("a:05"),
            Err(TimestampError::InvalidComponent { .. })
        ));
        assert!(matches!(
            parse("+1:05"),
            Err(TimestampError::InvalidComponent { .. })
        ));
        assert!(matches!(
            parse("--1:05"),
            Err(TimestampError::InvalidComponent { .. })
        ));
        assert!(matches!(
            parse(" 1:05"),
            Err(TimestampError::InvalidComponent { .. })
        ));
    }

    #[test]
    fn test_parse_out_of_range() {
        assert!(matches!(
            parse("99999999999999999999:00"),
            Err(TimestampError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_format() {
        assert_eq!(format(0), "00:00");
        assert_eq!(format(65), "01:05");
        assert_eq!(format(3599), "59:59");
        assert_eq!(format(3600), "01:00:00");
        assert_eq!(format(3723), "01:02:03");
    }

    #[test]
    fn test_format_clamps_negative() {
        assert_eq!(format(-30), "00:00");
    }

    #[test]
    fn test_parse_inverts_format() {
        let samples = (0..4000).chain([35_999, 36_000, 86_399, 360_000, 1_234_567]);
        for s in samples {
            assert_eq!(parse(&format(s)).unwrap(), s, "round trip failed for {}", s);
        }
    }
}
