use iris::components::google_calendar::{auth, TokenManager};
use iris::config::Config;
use iris::startup;
use std::sync::Arc;
use tokio::sync::RwLock;

#[tokio::main]
async fn main() -> miette::Result<()> {
    startup::init_logging()?;

    // Load configuration
    let config = Config::load()?;
    let token_file = config.token_file.clone();
    let config = Arc::new(RwLock::new(config));

    let token_manager = TokenManager::new(Arc::clone(&config));
    auth::authorize(config, &token_manager).await?;

    println!("Token successfully saved to {}!", token_file.display());

    Ok(())
}
