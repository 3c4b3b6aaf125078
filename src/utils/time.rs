use crate::error::{invalid_argument, AgentResult};
use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Offset-carrying formats accepted besides RFC 3339
const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

/// Formats without an offset, read as wall-clock time in the given timezone
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 date or date-time into a UTC instant.
///
/// Strings without an offset are interpreted in `tz`; a bare date means
/// midnight in `tz`.
pub fn parse_instant(input: &str, tz: Tz) -> AgentResult<DateTime<Utc>> {
    let s = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // chrono wants a numeric offset outside RFC 3339
    let normalized = match s.strip_suffix('Z').or_else(|| s.strip_suffix('z')) {
        Some(rest) => format!("{}+00:00", rest),
        None => s.to_string(),
    };
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return localize(&naive, tz, input);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return local_midnight(date, tz);
    }

    Err(invalid_argument(&format!("Unrecognized date: {}", input)))
}

/// Midnight of `date` in `tz`, as UTC
pub fn local_midnight(date: NaiveDate, tz: Tz) -> AgentResult<DateTime<Utc>> {
    let naive = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| invalid_argument("Failed to create datetime"))?;
    localize(&naive, tz, &date.to_string())
}

fn localize(naive: &NaiveDateTime, tz: Tz, original: &str) -> AgentResult<DateTime<Utc>> {
    match tz.from_local_datetime(naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        // Fall-back transition: take the first occurrence
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(invalid_argument(&format!(
            "{} does not exist in timezone {}",
            original,
            tz.name()
        ))),
    }
}
