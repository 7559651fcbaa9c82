use super::models::{CalendarEvent, EventDraft};
use super::token::TokenManager;
use crate::config::Config;
use crate::error::{google_calendar_error, IrisResult};
use crate::utils::time::now_in;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info};
use url::Url;

/// The Google Calendar actor that processes messages
pub struct GoogleCalendarActor {
    config: Arc<RwLock<Config>>,
    token_manager: TokenManager,
    client: Client,
    command_rx: mpsc::Receiver<GoogleCalendarCommand>,
}

type Reply<T> = oneshot::Sender<IrisResult<T>>;

/// Commands that can be sent to the Google Calendar actor
pub enum GoogleCalendarCommand {
    ListUpcoming(u32, Reply<Vec<CalendarEvent>>),
    Search(String, Reply<Vec<CalendarEvent>>),
    Create(EventDraft, Reply<CalendarEvent>),
    Update(String, EventDraft, Reply<CalendarEvent>),
    Delete(String, Reply<()>),
    Shutdown,
}

/// Handle for communicating with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarActorHandle {
    command_tx: mpsc::Sender<GoogleCalendarCommand>,
}

impl GoogleCalendarActorHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> GoogleCalendarCommand,
    ) -> IrisResult<T> {
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(build(response_tx))
            .await
            .map_err(|e| google_calendar_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .await
            .map_err(|_| google_calendar_error("Response channel closed"))?
    }

    /// Upcoming events, soonest first
    pub async fn list_upcoming(&self, max_results: u32) -> IrisResult<Vec<CalendarEvent>> {
        self.request(|tx| GoogleCalendarCommand::ListUpcoming(max_results, tx)).await
    }

    /// Upcoming events whose title contains `query`
    pub async fn search(&self, query: &str) -> IrisResult<Vec<CalendarEvent>> {
        let query = query.to_string();
        self.request(|tx| GoogleCalendarCommand::Search(query, tx)).await
    }

    pub async fn create(&self, draft: EventDraft) -> IrisResult<CalendarEvent> {
        self.request(|tx| GoogleCalendarCommand::Create(draft, tx)).await
    }

    pub async fn update(&self, event_id: &str, draft: EventDraft) -> IrisResult<CalendarEvent> {
        let event_id = event_id.to_string();
        self.request(|tx| GoogleCalendarCommand::Update(event_id, draft, tx)).await
    }

    pub async fn delete(&self, event_id: &str) -> IrisResult<()> {
        let event_id = event_id.to_string();
        self.request(|tx| GoogleCalendarCommand::Delete(event_id, tx)).await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> IrisResult<()> {
        let _ = self.command_tx.send(GoogleCalendarCommand::Shutdown).await;
        Ok(())
    }
}

/// Keep events whose summary contains `query`, ignoring case
pub fn filter_by_summary(events: Vec<CalendarEvent>, query: &str) -> Vec<CalendarEvent> {
    let needle = query.to_lowercase();
    events
        .into_iter()
        .filter(|event| event.title().to_lowercase().contains(&needle))
        .collect()
}

impl GoogleCalendarActor {
    /// Create a new actor and return its handle
    pub fn new(config: Arc<RwLock<Config>>) -> (Self, GoogleCalendarActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            config: Arc::clone(&config),
            token_manager: TokenManager::new(config),
            client: Client::new(),
            command_rx,
        };

        let handle = GoogleCalendarActorHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Google Calendar actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                GoogleCalendarCommand::ListUpcoming(max_results, response_tx) => {
                    let result = self.list_events(Some(max_results)).await;
                    let _ = response_tx.send(result);
                }
                GoogleCalendarCommand::Search(query, response_tx) => {
                    let result = self
                        .list_events(None)
                        .await
                        .map(|events| filter_by_summary(events, &query));
                    let _ = response_tx.send(result);
                }
                GoogleCalendarCommand::Create(draft, response_tx) => {
                    let _ = response_tx.send(self.create_event(&draft).await);
                }
                GoogleCalendarCommand::Update(event_id, draft, response_tx) => {
                    let _ = response_tx.send(self.update_event(&event_id, &draft).await);
                }
                GoogleCalendarCommand::Delete(event_id, response_tx) => {
                    let _ = response_tx.send(self.delete_event(&event_id).await);
                }
                GoogleCalendarCommand::Shutdown => {
                    info!("Google Calendar actor shutting down");
                    break;
                }
            }
        }

        info!("Google Calendar actor shut down");
    }

    /// `.../calendars/{id}/events[/{event_id}]`
    async fn events_url(&self, event_id: Option<&str>) -> IrisResult<Url> {
        let (base, calendar_id) = {
            let config_read = self.config.read().await;
            (
                config_read.calendar_api_url.clone(),
                config_read.google_calendar_id.clone(),
            )
        };

        let mut url = Url::parse(&base)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| google_calendar_error("Calendar API URL cannot be a base"))?;
            segments.pop_if_empty().extend(["calendars", calendar_id.as_str(), "events"]);
            if let Some(event_id) = event_id {
                segments.push(event_id);
            }
        }
        Ok(url)
    }

    /// Attach the bearer token and send
    async fn send(&self, request: RequestBuilder, what: &str) -> IrisResult<Response> {
        let access_token = self.token_manager.get_token().await?;

        let response = request
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to {}: {}", what, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to {}: HTTP {} - {}",
                what, status, error_body
            )));
        }

        Ok(response)
    }

    async fn send_json(&self, request: RequestBuilder, what: &str) -> IrisResult<Value> {
        self.send(request, what)
            .await?
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse response ({}): {}", what, e)))
    }

    /// Events from now on, optionally capped
    async fn list_events(&self, max_results: Option<u32>) -> IrisResult<Vec<CalendarEvent>> {
        let tz = self.config.read().await.timezone;
        let mut url = self.events_url(None).await?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("timeMin", &now_in(tz).to_rfc3339())
                .append_pair("singleEvents", "true")
                .append_pair("orderBy", "startTime");
            if let Some(max_results) = max_results {
                query.append_pair("maxResults", &max_results.to_string());
            }
        }

        debug!("Listing events: {}", url);
        let response_data = self
            .send_json(self.client.get(url), "fetch events")
            .await?;

        let events = response_data
            .get("items")
            .and_then(|i| i.as_array())
            .ok_or_else(|| google_calendar_error("No items in response"))?;

        Ok(events.iter().map(CalendarEvent::from_api).collect())
    }

    async fn create_event(&self, draft: &EventDraft) -> IrisResult<CalendarEvent> {
        let url = self.events_url(None).await?;
        let request = self.client.post(url).json(&draft.to_request_body());
        let created = self.send_json(request, "create event").await?;
        info!("Created event '{}'", draft.summary);
        Ok(CalendarEvent::from_api(&created))
    }

    /// Fetch the full resource, patch title and times, write it back
    async fn update_event(&self, event_id: &str, draft: &EventDraft) -> IrisResult<CalendarEvent> {
        let url = self.events_url(Some(event_id)).await?;

        let mut event = self
            .send_json(self.client.get(url.clone()), "fetch event")
            .await?;
        draft.apply_to(&mut event);

        let request = self.client.request(Method::PUT, url).json(&event);
        let updated = self.send_json(request, "update event").await?;
        info!("Updated event {}", event_id);
        Ok(CalendarEvent::from_api(&updated))
    }

    async fn delete_event(&self, event_id: &str) -> IrisResult<()> {
        let url = self.events_url(Some(event_id)).await?;
        self.send(self.client.delete(url), "delete event").await?;
        info!("Deleted event {}", event_id);
        Ok(())
    }
}
