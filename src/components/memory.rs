use crate::components::ollama::{AssistantReply, ChatMessage};
use crate::error::{memory_error, IrisResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Conversation so far plus the last event the assistant wrote
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationMemory {
    #[serde(default)]
    pub conversation: Vec<ChatMessage>,
    #[serde(default)]
    pub last_event: Option<AssistantReply>,
}

impl ConversationMemory {
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.conversation.push(ChatMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.conversation.push(ChatMessage::assistant(content));
    }
}

/// JSON file backing the conversation memory
#[derive(Debug, Clone)]
pub struct MemoryStore {
    path: PathBuf,
}

impl MemoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start a fresh session, discarding whatever was stored
    pub async fn reset(&self) -> IrisResult<ConversationMemory> {
        let memory = ConversationMemory::default();
        self.save(&memory).await?;
        Ok(memory)
    }

    /// Read the memory file, creating an empty one if needed
    pub async fn load(&self) -> IrisResult<ConversationMemory> {
        if !tokio::fs::try_exists(&self.path).await? {
            return self.reset().await;
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        serde_json::from_str(&content).map_err(|e| {
            memory_error(&format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }

    pub async fn save(&self, memory: &ConversationMemory) -> IrisResult<()> {
        let content = serde_json::to_string_pretty(memory)?;
        tokio::fs::write(&self.path, content).await?;
        debug!(
            "Saved {} messages to {}",
            memory.conversation.len(),
            self.path.display()
        );
        Ok(())
    }
}
