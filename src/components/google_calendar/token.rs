use crate::config::Config;
use crate::error::{auth_error, IrisResult};
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Tokens this close to expiry are refreshed early
const EXPIRY_SKEW_SECS: i64 = 60;

/// OAuth token as persisted in the token file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Unix timestamp in seconds
    pub expires_at: i64,
}

impl StoredToken {
    /// Build from a token endpoint response, stamping `expires_at`
    pub fn from_token_response(response: &Value, previous_refresh: Option<&str>) -> IrisResult<Self> {
        let access_token = response
            .get("access_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| auth_error("Token response missing 'access_token' field"))?
            .to_string();

        let refresh_token = response
            .get("refresh_token")
            .and_then(|v| v.as_str())
            .or(previous_refresh)
            .map(|s| s.to_string());

        let expires_in = response.get("expires_in").and_then(|v| v.as_i64()).unwrap_or(3600);

        Ok(Self {
            access_token,
            refresh_token,
            expires_at: Utc::now().timestamp() + expires_in,
        })
    }

    pub fn is_fresh(&self, now: i64) -> bool {
        self.expires_at - EXPIRY_SKEW_SECS > now
    }
}

#[derive(Clone)]
pub struct TokenManager {
    config: Arc<RwLock<Config>>,
    client: Client,
}

impl TokenManager {
    pub fn new(config: Arc<RwLock<Config>>) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    async fn token_file(&self) -> PathBuf {
        self.config.read().await.token_file.clone()
    }

    /// Read the stored token, `None` when nothing has been saved yet
    pub async fn load_token(&self) -> IrisResult<Option<StoredToken>> {
        let path = self.token_file().await;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                let token = serde_json::from_str(&content).map_err(|e| {
                    auth_error(&format!("Failed to parse token file {}: {}", path.display(), e))
                })?;
                Ok(Some(token))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a valid access token, refreshing it when expired
    pub async fn get_token(&self) -> IrisResult<String> {
        let token = self
            .load_token()
            .await?
            .ok_or_else(|| auth_error("No token found. Authorization required."))?;

        if token.is_fresh(Utc::now().timestamp()) {
            return Ok(token.access_token);
        }

        debug!("Access token expired, refreshing");
        let refreshed = self.refresh_token(&token).await?;
        Ok(refreshed.access_token)
    }

    /// Refresh an expired token
    pub async fn refresh_token(&self, token: &StoredToken) -> IrisResult<StoredToken> {
        let refresh_token = token
            .refresh_token
            .as_deref()
            .ok_or_else(|| auth_error("No refresh token in token data"))?;

        let (client_id, client_secret, token_url) = {
            let config_read = self.config.read().await;
            (
                config_read.google_client_id.clone(),
                config_read.google_client_secret.clone(),
                config_read.token_url.clone(),
            )
        };

        let params = [
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token.to_string()),
            ("grant_type", "refresh_token".to_string()),
        ];

        let response = self
            .client
            .post(&token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| auth_error(&format!("Failed to refresh token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(auth_error(&format!(
                "Failed to refresh token: HTTP {} - {}",
                status, error_body
            )));
        }

        let new_token: Value = response
            .json()
            .await
            .map_err(|e| auth_error(&format!("Failed to parse token response: {}", e)))?;

        // Google usually omits the refresh token on refresh; keep the old one
        let stored = StoredToken::from_token_response(&new_token, Some(refresh_token))?;
        self.set_token(&stored).await?;
        info!("Access token refreshed");

        Ok(stored)
    }

    /// Persist a token to the token file
    pub async fn set_token(&self, token: &StoredToken) -> IrisResult<()> {
        let path = self.token_file().await;
        let content = serde_json::to_string_pretty(token)?;
        tokio::fs::write(&path, content).await?;
        debug!("Token saved to {}", path.display());
        Ok(())
    }
}
