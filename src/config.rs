use crate::error::{config_error, env_error, IrisResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Default time zone used for dates in prompts and new events
pub const DEFAULT_TIMEZONE: &str = "America/Edmonton";
/// Default Ollama model
pub const DEFAULT_OLLAMA_MODEL: &str = "gemma3:4b";
/// Default Ollama server
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_CALENDAR_API_URL: &str = "https://www.googleapis.com/calendar/v3";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Main configuration structure for the assistant
#[derive(Debug, Clone)]
pub struct Config {
    /// Google OAuth client ID
    pub google_client_id: String,
    /// Google OAuth client secret
    pub google_client_secret: String,
    /// Google Calendar ID to manage
    pub google_calendar_id: String,
    /// Where the OAuth token is stored
    pub token_file: PathBuf,
    /// Where the conversation memory is stored
    pub memory_file: PathBuf,
    /// Time zone for dates shown to the model and for new events
    pub timezone: Tz,
    /// Base URL of the Ollama server
    pub ollama_url: String,
    /// Ollama model name
    pub ollama_model: String,
    /// Sampling temperature sent to the model
    pub ollama_temperature: f64,
    /// How many upcoming events are shown to the model
    pub max_upcoming_events: u32,
    /// Port for the OAuth redirect listener, 0 picks a free one
    pub oauth_redirect_port: u16,
    pub calendar_api_url: String,
    pub auth_url: String,
    pub token_url: String,
    /// Who the assistant is and who it talks to
    pub profile: Profile,
}

/// Personalisation loaded from the profile TOML file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub assistant_name: String,
    pub assistant_expansion: String,
    pub user_name: String,
    /// Facts about the user included in the system prompt
    pub about: Vec<String>,
    /// Additional rules appended to the system prompt
    pub extra_rules: Vec<String>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            assistant_name: "IRIS".to_string(),
            assistant_expansion: "Intelligent Response and Insight System".to_string(),
            user_name: "there".to_string(),
            about: Vec::new(),
            extra_rules: Vec::new(),
        }
    }
}

impl Profile {
    /// Load a profile, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> IrisResult<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No profile at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Parse a profile from TOML text
    pub fn parse(content: &str) -> IrisResult<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// OAuth client pair as found in a Google client-secrets file
#[derive(Debug, Clone, Deserialize)]
struct ClientSecretEntry {
    client_id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecretEntry>,
    web: Option<ClientSecretEntry>,
}

/// Read `client_id` and `client_secret` from a downloaded credentials.json
pub fn read_client_secrets(content: &str) -> IrisResult<(String, String)> {
    let file: ClientSecretsFile = serde_json::from_str(content)?;
    let entry = file
        .installed
        .or(file.web)
        .ok_or_else(|| config_error("Credentials file has neither an 'installed' nor a 'web' section"))?;
    Ok((entry.client_id, entry.client_secret))
}

impl Config {
    /// Load configuration from environment, credentials file and profile
    pub fn load() -> IrisResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let (google_client_id, google_client_secret) = Self::load_client_credentials()?;

        let timezone_name = env_or("TIMEZONE", DEFAULT_TIMEZONE);
        let timezone = Tz::from_str(&timezone_name)
            .map_err(|_| config_error(&format!("Unknown time zone: {}", timezone_name)))?;

        let profile_file = PathBuf::from(env_or("PROFILE_FILE", "config/profile.toml"));
        let profile = Profile::load(&profile_file)?;

        let config = Config {
            google_client_id,
            google_client_secret,
            google_calendar_id: env_or("GOOGLE_CALENDAR_ID", "primary"),
            token_file: PathBuf::from(env_or("GOOGLE_TOKEN_FILE", "token.json")),
            memory_file: PathBuf::from(env_or("MEMORY_FILE", "memory.json")),
            timezone,
            ollama_url: env_or("OLLAMA_URL", DEFAULT_OLLAMA_URL),
            ollama_model: env_or("OLLAMA_MODEL", DEFAULT_OLLAMA_MODEL),
            ollama_temperature: parse_env("OLLAMA_TEMPERATURE", 0.1)?,
            max_upcoming_events: parse_env("MAX_UPCOMING_EVENTS", 10)?,
            oauth_redirect_port: parse_env("OAUTH_REDIRECT_PORT", 0)?,
            calendar_api_url: env_or("GOOGLE_CALENDAR_API_URL", DEFAULT_CALENDAR_API_URL),
            auth_url: env_or("GOOGLE_AUTH_URL", DEFAULT_AUTH_URL),
            token_url: env_or("GOOGLE_TOKEN_URL", DEFAULT_TOKEN_URL),
            profile,
        };

        info!(
            "Loaded configuration: calendar={}, model={}, timezone={}",
            config.google_calendar_id, config.ollama_model, config.timezone
        );

        Ok(config)
    }

    /// Environment variables win over the credentials file
    fn load_client_credentials() -> IrisResult<(String, String)> {
        if let (Ok(id), Ok(secret)) = (env::var("GOOGLE_CLIENT_ID"), env::var("GOOGLE_CLIENT_SECRET")) {
            return Ok((id, secret));
        }

        let credentials_file = env_or("GOOGLE_CREDENTIALS_FILE", "credentials.json");
        read_credentials_file(Path::new(&credentials_file))
    }
}

fn read_credentials_file(path: &Path) -> IrisResult<(String, String)> {
    let content = fs::read_to_string(path).map_err(|e| {
        config_error(&format!(
            "Could not read {}: {} (GOOGLE_CLIENT_ID/GOOGLE_CLIENT_SECRET are not set either)",
            path.display(),
            e
        ))
    })?;

    read_client_secrets(&content)
}

fn env_or(var: &str, default: &str) -> String {
    env::var(var).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: FromStr>(var: &str, default: T) -> IrisResult<T> {
    match env::var(var) {
        Ok(value) => value.trim().parse::<T>().map_err(|_| env_error(var)),
        Err(_) => Ok(default),
    }
}
