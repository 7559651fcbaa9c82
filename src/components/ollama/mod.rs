mod client;
pub mod models;
mod parser;
pub mod prompt;

pub use client::OllamaClient;
pub use models::{AssistantReply, CalendarAction, ChatMessage, Role};
pub use parser::parse_model_reply;
pub use prompt::build_system_prompt;
