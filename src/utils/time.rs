use chrono::{DateTime, Datelike, NaiveDate, Offset, Utc};
use chrono_tz::Tz;

/// Current time in the configured zone
pub fn now_in(tz: Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(&tz)
}

/// Long date used in prompts and event lines, e.g. "September 02, 2025"
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

/// UTC offset of `now` rendered as "+HH:MM" / "-HH:MM"
pub fn offset_string(now: &DateTime<Tz>) -> String {
    let seconds = now.offset().fix().local_minus_utc();
    let sign = if seconds < 0 { '-' } else { '+' };
    let seconds = seconds.abs();
    format!("{}{:02}:{:02}", sign, seconds / 3600, (seconds % 3600) / 60)
}

/// An example RFC 3339 timestamp in the current year, used to show the model the expected shape
pub fn example_timestamp(now: &DateTime<Tz>, hour: u32) -> String {
    format!(
        "{}-09-02T{:02}:00:00{}",
        now.year(),
        hour,
        offset_string(now)
    )
}
