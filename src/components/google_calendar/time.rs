use super::models::CalendarEvent;
use crate::error::{google_calendar_error, AgentResult};
use crate::scheduling::Event;
use crate::utils::time::local_midnight;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Title used for events without a summary
pub const UNTITLED_EVENT: &str = "(untitled)";

/// Convert a Google event into a scheduler event.
///
/// Returns `Ok(None)` when the event has no start or end at all.
pub fn to_event(event: &CalendarEvent, tz: Tz) -> AgentResult<Option<Event>> {
    let (start, start_all_day) = match event_instant(&event.start_date_time, &event.start_date, tz)? {
        Some(start) => start,
        None => return Ok(None),
    };
    let (end, end_all_day) = match event_instant(&event.end_date_time, &event.end_date, tz)? {
        Some(end) => end,
        None => return Ok(None),
    };

    let mut converted = Event::new(
        event.id.clone(),
        event.summary.clone().unwrap_or_else(|| UNTITLED_EVENT.to_string()),
        start,
        end,
    );
    converted.is_all_day = start_all_day && end_all_day;
    converted.description = event.description.clone();
    converted.location = event.location.clone();
    converted.attendees = event.attendees.clone();
    converted.color = event.color_id.clone();

    Ok(Some(converted))
}

/// Resolve a `dateTime`/`date` pair; the flag is true for date-only values.
/// Google's all-day end dates are exclusive, so local midnight is exact.
fn event_instant(
    date_time: &Option<String>,
    date: &Option<String>,
    tz: Tz,
) -> AgentResult<Option<(DateTime<Utc>, bool)>> {
    if let Some(date_time) = date_time {
        let dt = DateTime::parse_from_rfc3339(date_time)
            .map_err(|e| google_calendar_error(&format!("Failed to parse datetime: {}", e)))?;
        Ok(Some((dt.with_timezone(&Utc), false)))
    } else if let Some(date) = date {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| google_calendar_error(&format!("Failed to parse date: {}", e)))?;
        Ok(Some((local_midnight(date, tz)?, true)))
    } else {
        Ok(None)
    }
}
