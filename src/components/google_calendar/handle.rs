use super::actor::{GoogleCalendarActor, GoogleCalendarActorHandle};
use super::models::{CalendarEvent, EventDraft};
use crate::components::CalendarService;
use crate::config::Config;
use crate::error::IrisResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Handle for interacting with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarHandle {
    actor_handle: GoogleCalendarActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl GoogleCalendarHandle {
    /// Create a new GoogleCalendarHandle and spawn the actor
    pub fn new(config: Arc<RwLock<Config>>) -> Self {
        let (mut actor, handle) = GoogleCalendarActor::new(config);

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> IrisResult<()> {
        self.actor_handle.shutdown().await
    }
}

#[async_trait]
impl CalendarService for GoogleCalendarHandle {
    async fn list_upcoming(&self, max_results: u32) -> IrisResult<Vec<CalendarEvent>> {
        self.actor_handle.list_upcoming(max_results).await
    }

    async fn search(&self, query: &str) -> IrisResult<Vec<CalendarEvent>> {
        self.actor_handle.search(query).await
    }

    async fn create(&self, draft: EventDraft) -> IrisResult<CalendarEvent> {
        self.actor_handle.create(draft).await
    }

    async fn update(&self, event_id: &str, draft: EventDraft) -> IrisResult<CalendarEvent> {
        self.actor_handle.update(event_id, draft).await
    }

    async fn delete(&self, event_id: &str) -> IrisResult<()> {
        self.actor_handle.delete(event_id).await
    }
}
