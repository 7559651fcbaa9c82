#![allow(dead_code)]

use async_trait::async_trait;
use iris::components::google_calendar::{filter_by_summary, CalendarEvent, EventDraft};
use iris::components::ollama::ChatMessage;
use iris::components::{CalendarService, ChatModel};
use iris::config::{Config, Profile};
use iris::error::{google_calendar_error, language_model_error, IrisResult};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

/// Configuration pointing every file into `dir` and every endpoint at `server_url`
pub fn test_config(dir: &Path, server_url: &str) -> Config {
    Config {
        google_client_id: "test_client_id".to_string(),
        google_client_secret: "test_client_secret".to_string(),
        google_calendar_id: "primary".to_string(),
        token_file: dir.join("token.json"),
        memory_file: dir.join("memory.json"),
        timezone: "America/Edmonton".parse().unwrap(),
        ollama_url: server_url.to_string(),
        ollama_model: "gemma3:4b".to_string(),
        ollama_temperature: 0.1,
        max_upcoming_events: 10,
        oauth_redirect_port: 0,
        calendar_api_url: format!("{}/calendar/v3", server_url),
        auth_url: format!("{}/o/oauth2/v2/auth", server_url),
        token_url: format!("{}/token", server_url),
        profile: Profile {
            user_name: "Ishaan".to_string(),
            ..Profile::default()
        },
    }
}

pub fn event(id: &str, summary: &str, start: &str) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        summary: Some(summary.to_string()),
        start_date_time: Some(start.to_string()),
        html_link: Some(format!("https://calendar.google.com/event?eid={}", id)),
        ..Default::default()
    }
}

/// In-memory calendar recording every write
#[derive(Default)]
pub struct MockCalendar {
    pub events: Mutex<Vec<CalendarEvent>>,
    pub created: Mutex<Vec<EventDraft>>,
    pub updated: Mutex<Vec<(String, EventDraft)>>,
    pub deleted: Mutex<Vec<String>>,
    pub unavailable: bool,
}

impl MockCalendar {
    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        Self {
            events: Mutex::new(events),
            ..Default::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    fn check(&self) -> IrisResult<()> {
        if self.unavailable {
            return Err(google_calendar_error("HTTP 503 - backend unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl CalendarService for MockCalendar {
    async fn list_upcoming(&self, max_results: u32) -> IrisResult<Vec<CalendarEvent>> {
        self.check()?;
        let events = self.events.lock().unwrap();
        Ok(events.iter().take(max_results as usize).cloned().collect())
    }

    async fn search(&self, query: &str) -> IrisResult<Vec<CalendarEvent>> {
        self.check()?;
        let events = self.events.lock().unwrap().clone();
        Ok(filter_by_summary(events, query))
    }

    async fn create(&self, draft: EventDraft) -> IrisResult<CalendarEvent> {
        self.check()?;
        let mut events = self.events.lock().unwrap();
        let created = event(
            &format!("created-{}", events.len() + 1),
            &draft.summary,
            &draft.start_time,
        );
        events.push(created.clone());
        self.created.lock().unwrap().push(draft);
        Ok(created)
    }

    async fn update(&self, event_id: &str, draft: EventDraft) -> IrisResult<CalendarEvent> {
        self.check()?;
        let mut events = self.events.lock().unwrap();
        let target = events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or_else(|| google_calendar_error("HTTP 404 - Not Found"))?;
        target.summary = Some(draft.summary.clone());
        target.start_date_time = Some(draft.start_time.clone());
        target.end_date_time = Some(draft.end_time.clone());
        let updated = target.clone();
        self.updated.lock().unwrap().push((event_id.to_string(), draft));
        Ok(updated)
    }

    async fn delete(&self, event_id: &str) -> IrisResult<()> {
        self.check()?;
        self.events.lock().unwrap().retain(|e| e.id != event_id);
        self.deleted.lock().unwrap().push(event_id.to_string());
        Ok(())
    }
}

/// Model replaying scripted outputs and recording what it was sent
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, String>>>,
    pub requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<&str, &str>>) -> Self {
        Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn last_request(&self) -> Vec<ChatMessage> {
        self.requests.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn chat(&self, messages: &[ChatMessage]) -> IrisResult<String> {
        self.requests.lock().unwrap().push(messages.to_vec());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(e)) => Err(language_model_error(&e)),
            None => Err(language_model_error("no scripted reply left")),
        }
    }
}
