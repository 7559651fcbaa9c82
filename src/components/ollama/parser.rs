use super::models::AssistantReply;
use serde_json::from_str;
use tracing::{debug, warn};

/// Turn raw model output into an `AssistantReply`
///
/// The model is asked for JSON but small models often wrap it in prose or
/// code fences, so the text between the first `{` and the last `}` is
/// decoded. Output without any object becomes a plain chat reply.
pub fn parse_model_reply(raw: &str) -> AssistantReply {
    let (Some(json_start), Some(json_end)) = (raw.find('{'), raw.rfind('}')) else {
        debug!("Model output contains no JSON object, treating as chat");
        return AssistantReply::chat(raw);
    };

    if json_start >= json_end {
        return AssistantReply::chat(raw);
    }

    let json_str = &raw[json_start..=json_end];
    match from_str::<AssistantReply>(json_str) {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Failed to parse JSON from model output: {}", e);
            debug!("JSON string: {}", json_str);
            AssistantReply::chat(format!("Parse error: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ollama::CalendarAction;

    #[test]
    fn parses_clean_json() {
        let reply = parse_model_reply(
            r#"{"action":"create","summary":"Meeting with Alex","start_time":"2025-09-03T14:00:00-06:00","end_time":"2025-09-03T15:00:00-06:00","reply":"Done!"}"#,
        );
        assert_eq!(reply.action, CalendarAction::Create);
        assert_eq!(reply.summary, "Meeting with Alex");
        assert_eq!(reply.end_time, "2025-09-03T15:00:00-06:00");
    }

    #[test]
    fn extracts_json_wrapped_in_prose_and_fences() {
        let raw = "Here you go:\n```json\n{\"action\": \"list\", \"reply\": \"• 02:00 PM on September 02, 2025: Lab\"}\n```\nAnything else?";
        let reply = parse_model_reply(raw);
        assert_eq!(reply.action, CalendarAction::List);
        assert!(reply.reply.contains("Lab"));
    }

    #[test]
    fn text_without_object_becomes_chat() {
        let reply = parse_model_reply("Hello Ishaan! How can I help?");
        assert_eq!(reply.action, CalendarAction::Chat);
        assert_eq!(reply.reply, "Hello Ishaan! How can I help?");
    }

    #[test]
    fn reversed_braces_become_chat() {
        let reply = parse_model_reply("} odd {");
        assert_eq!(reply, AssistantReply::chat("} odd {"));
    }

    #[test]
    fn broken_json_reports_parse_error() {
        let reply = parse_model_reply("{\"action\": \"create\", \"summary\": }");
        assert_eq!(reply.action, CalendarAction::Chat);
        assert!(reply.reply.starts_with("Parse error: "));
    }

    #[test]
    fn missing_fields_default() {
        let reply = parse_model_reply("{}");
        assert_eq!(reply, AssistantReply::default());
    }
}
