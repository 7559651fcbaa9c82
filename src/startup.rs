use crate::assistant::Assistant;
use crate::components::google_calendar::{auth, GoogleCalendarHandle, TokenManager};
use crate::components::ollama::OllamaClient;
use crate::config::Config;
use crate::console;
use crate::error::{Error, IrisResult};
use crate::shutdown;
use chrono::Utc;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::sync::{oneshot, RwLock};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
///
/// Logs go to stderr so they never interleave with the chat on stdout.
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,iris=info")),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub async fn load_config() -> miette::Result<Arc<RwLock<Config>>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(RwLock::new(config))),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Make sure a usable Google token exists, running the browser flow if not
pub async fn ensure_authorized(config: Arc<RwLock<Config>>) -> IrisResult<()> {
    let token_manager = TokenManager::new(Arc::clone(&config));

    match token_manager.load_token().await {
        Ok(Some(token)) if token.is_fresh(Utc::now().timestamp()) => return Ok(()),
        Ok(Some(token)) if token.refresh_token.is_some() => {
            match token_manager.refresh_token(&token).await {
                Ok(_) => return Ok(()),
                Err(e) => warn!("Stored token could not be refreshed: {}", e),
            }
        }
        Ok(_) => info!("No usable Google token, starting authorization"),
        Err(e) => warn!("Stored token is unreadable: {}", e),
    }

    auth::authorize(config, &token_manager).await?;
    Ok(())
}

/// Wire the components together and run the interactive session
pub async fn start_assistant(config: Arc<RwLock<Config>>) -> miette::Result<()> {
    ensure_authorized(Arc::clone(&config)).await?;

    let config_snapshot = config.read().await.clone();

    let calendar = GoogleCalendarHandle::new(Arc::clone(&config));
    let model = OllamaClient::from_config(&config_snapshot)?;
    info!("Using Ollama model {}", model.model());

    let mut assistant =
        Assistant::start(&config_snapshot, Arc::new(calendar.clone()), Arc::new(model)).await?;

    // Create shutdown channel
    let (shutdown_send, shutdown_recv) = oneshot::channel();
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_send).await;
    });

    let session = console::run_session(
        &mut assistant,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        async {
            let _ = shutdown_recv.await;
        },
    )
    .await;

    if let Err(e) = calendar.shutdown().await {
        error!("Error shutting down calendar actor: {:?}", e);
    }

    session?;
    Ok(())
}
