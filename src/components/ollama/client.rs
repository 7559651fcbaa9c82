use super::models::{ChatMessage, OllamaChatRequest, OllamaChatResponse, OllamaOptions};
use crate::components::ChatModel;
use crate::config::Config;
use crate::error::{language_model_error, IrisResult};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Small local models can take a while on first load
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Client for Ollama's chat endpoint
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    temperature: f64,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, temperature: f64) -> IrisResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| language_model_error(&format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            temperature,
        })
    }

    pub fn from_config(config: &Config) -> IrisResult<Self> {
        Self::new(&config.ollama_url, &config.ollama_model, config.ollama_temperature)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatModel for OllamaClient {
    async fn chat(&self, messages: &[ChatMessage]) -> IrisResult<String> {
        let url = format!("{}/api/chat", self.base_url);
        let request = OllamaChatRequest {
            model: &self.model,
            messages,
            stream: false,
            format: "json",
            options: OllamaOptions {
                temperature: self.temperature,
            },
        };

        debug!("Sending {} messages to {}", messages.len(), self.model);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| language_model_error(&format!("Ollama request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            return Err(language_model_error(&format!(
                "Ollama returned HTTP {} - {}",
                status, error_body
            )));
        }

        let body: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| language_model_error(&format!("Failed to parse Ollama response: {}", e)))?;

        info!("Received response from {}", self.model);
        Ok(body.message.content)
    }
}
