use crate::error::AgentResult;
use crate::scheduling::{merge_snapshots, Event, TimeRange};
use async_trait::async_trait;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

// Export components
pub mod google_calendar;
pub mod local_store;

pub use google_calendar::GoogleCalendarHandle;
pub use local_store::LocalEventStore;

/// Where a source's events come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Optimistic, locally edited events
    Local,
    /// Events read from a remote calendar
    Remote,
}

/// A provider of calendar events that the scheduler reads from
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Get the name of the source
    fn name(&self) -> &'static str;

    /// Whether events are local or remote
    fn provenance(&self) -> Provenance;

    /// Events overlapping the window
    async fn events_between(&self, window: &TimeRange) -> AgentResult<Vec<Event>>;

    /// Ids of every event the source holds, inside the window or not.
    /// Local sources use this to shadow stale remote copies.
    async fn owned_ids(&self) -> HashSet<String> {
        HashSet::new()
    }

    /// Release the source's resources
    async fn shutdown(&self) -> AgentResult<()> {
        Ok(())
    }
}

/// Manager for all event sources
#[derive(Default)]
pub struct SourceManager {
    sources: Vec<Arc<dyn EventSource>>,
}

impl fmt::Debug for SourceManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceManager")
            .field("sources", &self.names())
            .finish()
    }
}

impl SourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source
    pub fn register<T: EventSource + 'static>(&mut self, source: T) {
        info!("Registering event source: {}", source.name());
        self.sources.push(Arc::new(source));
    }

    /// Names of the registered sources, in registration order
    pub fn names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Collect one merged snapshot of the window from every source.
    ///
    /// A failing source is logged and left out of the snapshot.
    pub async fn snapshot(&self, window: &TimeRange) -> Vec<Event> {
        let mut local = Vec::new();
        let mut remote = Vec::new();
        let mut shadowed = HashSet::new();

        for source in &self.sources {
            if source.provenance() == Provenance::Local {
                shadowed.extend(source.owned_ids().await);
            }

            match source.events_between(window).await {
                Ok(events) => {
                    debug!("{} returned {} events", source.name(), events.len());
                    match source.provenance() {
                        Provenance::Local => local.extend(events),
                        Provenance::Remote => remote.extend(events),
                    }
                }
                Err(e) => {
                    warn!("Event source {} failed, skipping it: {}", source.name(), e);
                }
            }
        }

        // A local event moved out of the window still hides its remote copy
        remote.retain(|e: &Event| !shadowed.contains(&e.id));
        merge_snapshots(local, remote)
    }

    /// Shutdown all sources
    pub async fn shutdown_all(&self) -> AgentResult<()> {
        info!("Shutting down all event sources");

        for source in &self.sources {
            if let Err(e) = source.shutdown().await {
                // Log error but continue with other sources
                error!("Error shutting down source {}: {:?}", source.name(), e);
            }
        }

        Ok(())
    }
}
