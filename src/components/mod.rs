use crate::error::IrisResult;
use async_trait::async_trait;

// Export components
pub mod google_calendar;
pub mod memory;
pub mod ollama;

use google_calendar::{CalendarEvent, EventDraft};
use ollama::ChatMessage;

/// Calendar operations the assistant relies on
#[async_trait]
pub trait CalendarService: Send + Sync {
    /// Upcoming events, soonest first
    async fn list_upcoming(&self, max_results: u32) -> IrisResult<Vec<CalendarEvent>>;

    /// Upcoming events whose title contains `query`, ignoring case
    async fn search(&self, query: &str) -> IrisResult<Vec<CalendarEvent>>;

    async fn create(&self, draft: EventDraft) -> IrisResult<CalendarEvent>;

    async fn update(&self, event_id: &str, draft: EventDraft) -> IrisResult<CalendarEvent>;

    async fn delete(&self, event_id: &str) -> IrisResult<()>;
}

/// A chat-style language model returning the raw completion text
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn chat(&self, messages: &[ChatMessage]) -> IrisResult<String>;
}
