use calendar_agent::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting calendar agent tool host");

    // Load configuration
    let config = startup::load_config()?;

    // Serve tool calls
    startup::run(config).await
}
