pub mod intent;

use crate::components::google_calendar::time::format_event_list;
use crate::components::google_calendar::{CalendarEvent, EventDraft};
use crate::components::memory::{ConversationMemory, MemoryStore};
use crate::components::ollama::{
    build_system_prompt, parse_model_reply, AssistantReply, CalendarAction, ChatMessage,
};
use crate::components::{CalendarService, ChatModel};
use crate::config::{Config, Profile};
use crate::error::IrisResult;
use crate::utils::time::now_in;
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Context line used when the calendar could not be read
pub const NO_CALENDAR_ACCESS: &str = "No calendar access";

/// Result of one conversational turn
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// What the model said and asked for
    pub reply: AssistantReply,
    /// Status lines from executing the action
    pub notices: Vec<String>,
    /// Event matched for deletion, awaiting the user's confirmation
    pub pending_delete: Option<CalendarEvent>,
}

impl TurnOutcome {
    fn new(reply: AssistantReply) -> Self {
        Self {
            reply,
            notices: Vec::new(),
            pending_delete: None,
        }
    }
}

/// Turn engine: prompt the model with calendar context and apply its action
pub struct Assistant {
    calendar: Arc<dyn CalendarService>,
    model: Arc<dyn ChatModel>,
    store: MemoryStore,
    memory: ConversationMemory,
    profile: Profile,
    timezone: Tz,
    max_upcoming_events: u32,
}

impl Assistant {
    /// Build an assistant with a freshly reset memory file
    pub async fn start(
        config: &Config,
        calendar: Arc<dyn CalendarService>,
        model: Arc<dyn ChatModel>,
    ) -> IrisResult<Self> {
        let store = MemoryStore::new(config.memory_file.clone());
        store.reset().await?;
        let memory = store.load().await?;

        Ok(Self {
            calendar,
            model,
            store,
            memory,
            profile: config.profile.clone(),
            timezone: config.timezone,
            max_upcoming_events: config.max_upcoming_events,
        })
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// Process one user message
    pub async fn handle_turn(&mut self, input: &str) -> IrisResult<TurnOutcome> {
        self.memory.push_user(input);

        let reply = self.query_model().await;

        self.memory.push_assistant(reply.reply.clone());
        self.store.save(&self.memory).await?;

        let mut outcome = TurnOutcome::new(reply);
        match outcome.reply.action {
            CalendarAction::Create => self.create_event(&mut outcome).await?,
            CalendarAction::Update => self.update_event(&mut outcome).await?,
            CalendarAction::Delete => self.find_event_to_delete(&mut outcome).await,
            // The model already answered from the events in the prompt
            CalendarAction::List | CalendarAction::Chat => {}
        }

        Ok(outcome)
    }

    /// Delete `event` if the user's answer confirms it
    pub async fn confirm_delete(&mut self, event: &CalendarEvent, answer: &str) -> IrisResult<String> {
        if !intent::is_confirmation(answer) {
            info!("Deletion of '{}' cancelled", event.title());
            return Ok("Okay, nothing was deleted.".to_string());
        }

        match self.calendar.delete(&event.id).await {
            Ok(()) => {
                self.memory.last_event = None;
                self.store.save(&self.memory).await?;
                Ok("✅ Event deleted.".to_string())
            }
            Err(e) => {
                error!("Failed to delete event {}: {}", event.id, e);
                Ok(format!("❌ Could not delete event: {}", e))
            }
        }
    }

    /// System prompt plus full conversation; failures become chat replies
    async fn query_model(&self) -> AssistantReply {
        let now = now_in(self.timezone);

        let events_text = match self.calendar.list_upcoming(self.max_upcoming_events).await {
            Ok(events) => format_event_list(&events, self.timezone),
            Err(e) => {
                warn!("Could not load upcoming events: {}", e);
                NO_CALENDAR_ACCESS.to_string()
            }
        };

        let mut messages = Vec::with_capacity(self.memory.conversation.len() + 1);
        messages.push(ChatMessage::system(build_system_prompt(
            &self.profile,
            &now,
            &events_text,
        )));
        messages.extend(self.memory.conversation.iter().cloned());

        match self.model.chat(&messages).await {
            Ok(raw) => parse_model_reply(&raw),
            Err(e) => {
                error!("Model request failed: {}", e);
                AssistantReply::chat(format!("Error: {}", e))
            }
        }
    }

    /// Turn the reply into a draft, naming the first missing field
    fn draft_from(&self, reply: &AssistantReply) -> Result<EventDraft, &'static str> {
        let fields = [
            ("summary", &reply.summary),
            ("start_time", &reply.start_time),
            ("end_time", &reply.end_time),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(name);
            }
        }

        Ok(EventDraft {
            summary: reply.summary.trim().to_string(),
            start_time: reply.start_time.trim().to_string(),
            end_time: reply.end_time.trim().to_string(),
            time_zone: self.timezone.name().to_string(),
        })
    }

    /// What gets remembered as `last_event`: the reply with the fields actually sent
    fn remembered(reply: &AssistantReply, draft: &EventDraft) -> AssistantReply {
        AssistantReply {
            summary: draft.summary.clone(),
            start_time: draft.start_time.clone(),
            end_time: draft.end_time.clone(),
            ..reply.clone()
        }
    }

    async fn create_event(&mut self, outcome: &mut TurnOutcome) -> IrisResult<()> {
        let draft = match self.draft_from(&outcome.reply) {
            Ok(draft) => draft,
            Err(field) => {
                outcome
                    .notices
                    .push(format!("❌ Could not create event: missing {}", field));
                return Ok(());
            }
        };

        let remembered = Self::remembered(&outcome.reply, &draft);
        match self.calendar.create(draft).await {
            Ok(created) => {
                outcome.notices.push(format!(
                    "✅ Event created: {}",
                    created.html_link.as_deref().unwrap_or(&created.id)
                ));
                self.memory.last_event = Some(remembered);
                self.store.save(&self.memory).await?;
            }
            Err(e) => {
                error!("Failed to create event: {}", e);
                outcome.notices.push(format!("❌ Could not create event: {}", e));
            }
        }
        Ok(())
    }

    /// Updates target the event created or updated last
    async fn update_event(&mut self, outcome: &mut TurnOutcome) -> IrisResult<()> {
        const NOT_FOUND: &str = "No matching events found for update.";

        let Some(last) = self.memory.last_event.clone() else {
            outcome.notices.push(NOT_FOUND.to_string());
            return Ok(());
        };

        let draft = match self.draft_from(&outcome.reply) {
            Ok(draft) => draft,
            Err(field) => {
                outcome
                    .notices
                    .push(format!("❌ Could not update event: missing {}", field));
                return Ok(());
            }
        };

        let target = match self.calendar.search(last.summary.trim()).await {
            Ok(events) => events.into_iter().next(),
            Err(e) => {
                error!("Failed to search events: {}", e);
                outcome.notices.push(format!("❌ Could not search events: {}", e));
                return Ok(());
            }
        };

        let Some(target) = target else {
            outcome.notices.push(NOT_FOUND.to_string());
            return Ok(());
        };

        let remembered = Self::remembered(&outcome.reply, &draft);
        match self.calendar.update(&target.id, draft).await {
            Ok(updated) => {
                outcome.notices.push(format!(
                    "✅ Event updated: {}",
                    updated.html_link.as_deref().unwrap_or(&updated.id)
                ));
                self.memory.last_event = Some(remembered);
                self.store.save(&self.memory).await?;
            }
            Err(e) => {
                error!("Failed to update event {}: {}", target.id, e);
                outcome.notices.push(format!("❌ Could not update event: {}", e));
            }
        }
        Ok(())
    }

    async fn find_event_to_delete(&self, outcome: &mut TurnOutcome) {
        const NOT_FOUND: &str = "No matching events found for deletion.";

        let query = outcome.reply.summary.trim();
        if query.is_empty() {
            outcome.notices.push(NOT_FOUND.to_string());
            return;
        }

        match self.calendar.search(query).await {
            Ok(events) => match events.into_iter().next() {
                Some(event) => outcome.pending_delete = Some(event),
                None => outcome.notices.push(NOT_FOUND.to_string()),
            },
            Err(e) => {
                error!("Failed to search events: {}", e);
                outcome.notices.push(format!("❌ Could not search events: {}", e));
            }
        }
    }
}
