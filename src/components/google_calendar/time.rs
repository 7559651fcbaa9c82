use super::models::CalendarEvent;
use crate::utils::time::format_long_date;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

/// Where an event starts
#[derive(Debug, Clone, PartialEq)]
pub enum EventStart {
    Timed(DateTime<Tz>),
    AllDay(NaiveDate),
}

/// Parse a `dateTime` value; offset-less values are taken as local to `tz`
pub fn parse_date_time(value: &str, tz: Tz) -> Option<DateTime<Tz>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&tz));
    }
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").ok()?;
    tz.from_local_datetime(&naive).single()
}

/// Get event start, `None` when missing or unparsable
pub fn get_event_start(event: &CalendarEvent, tz: Tz) -> Option<EventStart> {
    if let Some(start_time) = &event.start_date_time {
        parse_date_time(start_time, tz).map(EventStart::Timed)
    } else if let Some(start_date) = &event.start_date {
        NaiveDate::parse_from_str(start_date, "%Y-%m-%d")
            .ok()
            .map(EventStart::AllDay)
    } else {
        None
    }
}

/// One bullet line describing an event for the model
pub fn format_event_line(event: &CalendarEvent, tz: Tz) -> String {
    let summary = event.summary.as_deref().unwrap_or("No title");

    match get_event_start(event, tz) {
        Some(EventStart::Timed(dt)) => format!(
            "• {} on {}: {}",
            dt.format("%I:%M %p"),
            format_long_date(dt.date_naive()),
            summary
        ),
        Some(EventStart::AllDay(date)) => {
            format!("• All day on {}: {}", format_long_date(date), summary)
        }
        None => {
            let raw = event
                .start_date_time
                .as_deref()
                .or(event.start_date.as_deref())
                .unwrap_or("");
            format!("• {}: {}", raw, summary)
        }
    }
}

/// All events as bullet lines, or a fixed sentence when there are none
pub fn format_event_list(events: &[CalendarEvent], tz: Tz) -> String {
    if events.is_empty() {
        return "No upcoming events found.".to_string();
    }
    events
        .iter()
        .map(|event| format_event_line(event, tz))
        .collect::<Vec<_>>()
        .join("\n")
}
