use iris::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting IRIS");

    // Load configuration
    let config = startup::load_config().await?;

    // Start the assistant
    startup::start_assistant(config).await
}
