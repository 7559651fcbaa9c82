use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Simplified calendar event representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub created: Option<String>,
    pub html_link: Option<String>,
    pub start_date_time: Option<String>,
    pub start_date: Option<String>,
    pub end_date_time: Option<String>,
    pub end_date: Option<String>,
}

impl CalendarEvent {
    /// Build from an event resource returned by the Calendar API
    pub fn from_api(event: &Value) -> Self {
        let text = |key: &str| event.get(key).and_then(|v| v.as_str()).map(|s| s.to_string());
        let nested = |outer: &str, inner: &str| {
            event
                .get(outer)
                .and_then(|o| o.get(inner))
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
        };

        CalendarEvent {
            id: text("id").unwrap_or_default(),
            summary: text("summary"),
            description: text("description"),
            created: text("created"),
            html_link: text("htmlLink"),
            start_date_time: nested("start", "dateTime"),
            start_date: nested("start", "date"),
            end_date_time: nested("end", "dateTime"),
            end_date: nested("end", "date"),
        }
    }

    /// Summary or empty string, as used for matching
    pub fn title(&self) -> &str {
        self.summary.as_deref().unwrap_or("")
    }
}

/// An event to be written to the calendar
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub summary: String,
    pub start_time: String,
    pub end_time: String,
    pub time_zone: String,
}

impl EventDraft {
    /// Request body for `events.insert`
    pub fn to_request_body(&self) -> Value {
        json!({
            "summary": self.summary,
            "start": { "dateTime": self.start_time, "timeZone": self.time_zone },
            "end": { "dateTime": self.end_time, "timeZone": self.time_zone },
        })
    }

    /// Overwrite title and times of a full event resource, keeping everything else
    pub fn apply_to(&self, event: &mut Value) {
        event["summary"] = json!(self.summary);
        for (key, time) in [("start", &self.start_time), ("end", &self.end_time)] {
            if !event.get(key).map(Value::is_object).unwrap_or(false) {
                event[key] = json!({});
            }
            let slot = &mut event[key];
            slot["dateTime"] = json!(time);
            slot["timeZone"] = json!(self.time_zone);
            // An all-day event becomes timed once it has a dateTime
            if let Some(obj) = slot.as_object_mut() {
                obj.remove("date");
            }
        }
    }
}
