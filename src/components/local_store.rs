use super::{EventSource, Provenance};
use crate::error::AgentResult;
use crate::scheduling::{Event, TimeRange};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Shared container for locally known (optimistic) events.
///
/// Clones share the same underlying list.
#[derive(Debug, Clone, Default)]
pub struct LocalEventStore {
    events: Arc<RwLock<Vec<Event>>>,
}

impl LocalEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with events
    pub fn with_events(events: Vec<Event>) -> Self {
        Self {
            events: Arc::new(RwLock::new(events)),
        }
    }

    /// Load a JSON array of events from disk
    pub async fn load_from_file(path: &Path) -> AgentResult<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let events: Vec<Event> = serde_json::from_str(&content)?;
        info!("Loaded {} local events from {}", events.len(), path.display());
        Ok(Self::with_events(events))
    }

    /// Insert an event, replacing any event with the same id
    pub async fn upsert(&self, event: Event) {
        let mut events = self.events.write().await;
        match events.iter_mut().find(|e| e.id == event.id) {
            Some(existing) => *existing = event,
            None => events.push(event),
        }
    }

    /// Remove an event by id, returning it if present
    pub async fn remove(&self, id: &str) -> Option<Event> {
        let mut events = self.events.write().await;
        let index = events.iter().position(|e| e.id == id)?;
        Some(events.remove(index))
    }

    /// Copy of every stored event
    pub async fn snapshot(&self) -> Vec<Event> {
        self.events.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[async_trait]
impl EventSource for LocalEventStore {
    fn name(&self) -> &'static str {
        "local"
    }

    fn provenance(&self) -> Provenance {
        Provenance::Local
    }

    async fn events_between(&self, window: &TimeRange) -> AgentResult<Vec<Event>> {
        let events = self.events.read().await;
        Ok(events
            .iter()
            .filter(|e| e.range().overlaps(window))
            .cloned()
            .collect())
    }

    async fn owned_ids(&self) -> HashSet<String> {
        self.events.read().await.iter().map(|e| e.id.clone()).collect()
    }
}
