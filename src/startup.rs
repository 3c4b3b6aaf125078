use crate::components::google_calendar::{GoogleCalendarHandle, GoogleCalendarSettings};
use crate::components::{LocalEventStore, SourceManager};
use crate::config::Config;
use crate::error::{AgentResult, Error};
use crate::host;
use crate::shutdown;
use crate::tools::{ToolContext, ToolRegistry};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration.
///
/// Logs go to stderr; stdout carries tool responses.
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Register the event sources the config enables
pub async fn build_sources(config: &Config) -> AgentResult<SourceManager> {
    let mut sources = SourceManager::new();

    let local = match &config.local_events_path {
        Some(path) => LocalEventStore::load_from_file(path).await?,
        None => LocalEventStore::new(),
    };
    sources.register(local);

    if let Some((calendar_id, access_token)) = config.google_credentials() {
        sources.register(GoogleCalendarHandle::new(GoogleCalendarSettings {
            calendar_id: calendar_id.to_string(),
            access_token: access_token.to_string(),
            api_base: config.google_api_base.clone(),
            timezone: config.tz()?,
        }));
    } else {
        info!("Google Calendar not configured, using local events only");
    }

    Ok(sources)
}

/// Serve tool calls on stdin/stdout until EOF or a termination signal
pub async fn run(config: Config) -> miette::Result<()> {
    let sources = Arc::new(build_sources(&config).await?);
    info!("Event sources: {:?}", sources.names());

    let context = ToolContext::new(Arc::clone(&sources), &config)?;
    let registry = ToolRegistry::with_scheduling_tools(context);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    let outcome = tokio::select! {
        result = host::serve(&registry, stdin, stdout) => result.map(|_| ()),
        result = shutdown::wait_for_signal() => result,
    };

    if let Err(e) = sources.shutdown_all().await {
        error!("Error shutting down event sources: {:?}", e);
    } else {
        info!("All event sources shut down successfully");
    }

    outcome.map_err(Into::into)
}
