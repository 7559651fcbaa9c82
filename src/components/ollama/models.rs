use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Calendar action requested by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarAction {
    Create,
    Update,
    Delete,
    List,
    #[default]
    Chat,
}

impl CalendarAction {
    /// Unknown labels fall back to plain chat
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "create" => Self::Create,
            "update" => Self::Update,
            "delete" => Self::Delete,
            "list" => Self::List,
            _ => Self::Chat,
        }
    }
}

impl<'de> Deserialize<'de> for CalendarAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value
            .as_ref()
            .and_then(Value::as_str)
            .map(CalendarAction::from_label)
            .unwrap_or_default())
    }
}

/// Strings the model may send as null, numbers or omit entirely
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}

/// Structured reply the model is asked to produce
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssistantReply {
    #[serde(default)]
    pub action: CalendarAction,
    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_time: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub end_time: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub reply: String,
}

impl AssistantReply {
    /// A plain chat answer with no calendar side effect
    pub fn chat(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            ..Default::default()
        }
    }
}

/// Body of `POST /api/chat`
#[derive(Debug, Serialize)]
pub struct OllamaChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub stream: bool,
    pub format: &'a str,
    pub options: OllamaOptions,
}

#[derive(Debug, Serialize)]
pub struct OllamaOptions {
    pub temperature: f64,
}

/// Non-streaming `/api/chat` response
#[derive(Debug, Deserialize)]
pub struct OllamaChatResponse {
    pub message: OllamaResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct OllamaResponseMessage {
    #[serde(default)]
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn messages_serialize_with_lowercase_roles() {
        let value = serde_json::to_value(ChatMessage::assistant("hi")).unwrap();
        assert_eq!(value, json!({ "role": "assistant", "content": "hi" }));
    }

    #[test]
    fn reply_tolerates_nulls_and_odd_actions() {
        let reply: AssistantReply = serde_json::from_value(json!({
            "action": "create|update|delete|list|chat",
            "summary": null,
            "reply": "Sure!"
        }))
        .unwrap();
        assert_eq!(reply.action, CalendarAction::Chat);
        assert_eq!(reply.summary, "");
        assert_eq!(reply.start_time, "");
        assert_eq!(reply.reply, "Sure!");
    }

    #[test]
    fn action_labels_are_trimmed_and_case_folded() {
        assert_eq!(CalendarAction::from_label(" Delete "), CalendarAction::Delete);
        assert_eq!(CalendarAction::from_label("LIST"), CalendarAction::List);
    }
}
