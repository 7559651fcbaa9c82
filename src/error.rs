use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(iris::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(iris::config))]
    Config(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(iris::google_calendar))]
    GoogleCalendar(String),

    #[error("Authorization error: {0}")]
    #[diagnostic(
        code(iris::auth),
        help("Run `get_calendar_token` to authorize your Google account")
    )]
    Auth(String),

    #[error("Language model error: {0}")]
    #[diagnostic(code(iris::language_model), help("Is Ollama running and the model pulled?"))]
    LanguageModel(String),

    #[error("Memory error: {0}")]
    #[diagnostic(code(iris::memory))]
    Memory(String),

    #[error(transparent)]
    #[diagnostic(code(iris::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(iris::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(iris::other))]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type IrisResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Invalid value for environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create authorization errors
pub fn auth_error(message: &str) -> Error {
    Error::Auth(message.to_string())
}

/// Helper to create language model errors
pub fn language_model_error(message: &str) -> Error {
    Error::LanguageModel(message.to_string())
}

/// Helper to create memory errors
pub fn memory_error(message: &str) -> Error {
    Error::Memory(message.to_string())
}
