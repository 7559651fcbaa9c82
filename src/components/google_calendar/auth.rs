use super::token::{StoredToken, TokenManager};
use crate::config::Config;
use crate::error::{auth_error, IrisResult};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use url::Url;

/// Full read/write access to the user's calendars
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

/// Outcome of one request hitting the redirect listener
#[derive(Debug, PartialEq)]
pub enum Callback {
    Code(String),
    Denied(String),
    /// Unrelated request such as a favicon fetch
    Ignored,
}

/// Build the Google consent URL
pub fn authorization_url(
    auth_url: &str,
    client_id: &str,
    redirect_uri: &str,
    state: &str,
) -> IrisResult<Url> {
    let mut url = Url::parse(auth_url)
        .map_err(|e| auth_error(&format!("Failed to parse URL: {}", e)))?;

    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent")
        .append_pair("scope", CALENDAR_SCOPE)
        .append_pair("state", state);

    Ok(url)
}

/// Inspect the path and query of a redirect request
pub fn parse_callback(request_path: &str, expected_state: &str) -> IrisResult<Callback> {
    let url = Url::parse(&format!("http://localhost{}", request_path))
        .map_err(|e| auth_error(&format!("Malformed callback URL: {}", e)))?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if code.is_none() && error.is_none() {
        return Ok(Callback::Ignored);
    }

    if state.as_deref() != Some(expected_state) {
        return Err(auth_error("State mismatch in authorization callback"));
    }

    match (code, error) {
        (_, Some(error)) => Ok(Callback::Denied(error)),
        (Some(code), None) => Ok(Callback::Code(code)),
        (None, None) => Ok(Callback::Ignored),
    }
}

/// Exchange an authorization code for tokens
pub async fn exchange_code(
    client: &Client,
    config: &Config,
    code: &str,
    redirect_uri: &str,
) -> IrisResult<StoredToken> {
    let response = client
        .post(&config.token_url)
        .form(&[
            ("client_id", config.google_client_id.as_str()),
            ("client_secret", config.google_client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await
        .map_err(|e| auth_error(&format!("Failed to exchange code: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return Err(auth_error(&format!(
            "Failed to get token: HTTP {} - {}",
            status, error_text
        )));
    }

    let token_data: Value = response
        .json()
        .await
        .map_err(|e| auth_error(&format!("Failed to parse token response: {}", e)))?;

    StoredToken::from_token_response(&token_data, None)
}

/// Run the installed-app flow: open the browser, wait for the redirect, store the token
pub async fn authorize(
    config: Arc<RwLock<Config>>,
    token_manager: &TokenManager,
) -> IrisResult<StoredToken> {
    let config_snapshot = config.read().await.clone();

    let server = tiny_http::Server::http(("127.0.0.1", config_snapshot.oauth_redirect_port))
        .map_err(|e| auth_error(&format!("Failed to start redirect listener: {}", e)))?;
    let port = server
        .server_addr()
        .to_ip()
        .map(|addr| addr.port())
        .ok_or_else(|| auth_error("Redirect listener has no TCP address"))?;
    let redirect_uri = format!("http://127.0.0.1:{}", port);

    // Random state guards against forged callbacks
    let state = uuid::Uuid::new_v4().to_string();
    let auth_url = authorization_url(
        &config_snapshot.auth_url,
        &config_snapshot.google_client_id,
        &redirect_uri,
        &state,
    )?;

    println!("Opening browser for Google Calendar authorization...");
    if let Err(e) = webbrowser::open(auth_url.as_str()) {
        warn!("Could not open browser: {}", e);
    }
    println!("If the browser did not open, visit:\n{}", auth_url);
    println!("Waiting for authorization callback...");

    let code = tokio::task::spawn_blocking(move || wait_for_code(server, &state))
        .await
        .map_err(|e| auth_error(&format!("Callback listener failed: {}", e)))??;

    let token = exchange_code(&Client::new(), &config_snapshot, &code, &redirect_uri).await?;
    token_manager.set_token(&token).await?;
    info!("Google Calendar authorization complete");

    Ok(token)
}

fn wait_for_code(server: tiny_http::Server, state: &str) -> IrisResult<String> {
    loop {
        let request = server.recv()?;
        let outcome = parse_callback(request.url(), state);

        let (body, status, result) = match outcome {
            Ok(Callback::Ignored) => {
                let _ = request.respond(tiny_http::Response::from_string("").with_status_code(404));
                continue;
            }
            Ok(Callback::Code(code)) => (
                "Authorization successful! You can close this window.".to_string(),
                200,
                Ok(code),
            ),
            Ok(Callback::Denied(error)) => (
                format!("Authorization failed: {}", error),
                400,
                Err(auth_error(&format!("Authorization denied: {}", error))),
            ),
            Err(e) => ("Authorization failed: invalid state".to_string(), 400, Err(e)),
        };

        let response = tiny_http::Response::from_string(body).with_status_code(status);
        if let Err(e) = request.respond(response) {
            warn!("Failed to answer browser: {}", e);
        }
        return result;
    }
}
