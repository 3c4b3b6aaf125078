use super::actor::{GoogleCalendarActor, GoogleCalendarActorHandle};
use super::models::GoogleCalendarSettings;
use crate::components::{EventSource, Provenance};
use crate::error::AgentResult;
use crate::scheduling::{Event, TimeRange};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for interacting with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarHandle {
    actor_handle: GoogleCalendarActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl GoogleCalendarHandle {
    /// Create a new GoogleCalendarHandle and spawn the actor
    pub fn new(settings: GoogleCalendarSettings) -> Self {
        let (mut actor, handle) = GoogleCalendarActor::new(settings);

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Get events overlapping the window from the calendar
    pub async fn get_events_between(&self, window: TimeRange) -> AgentResult<Vec<Event>> {
        self.actor_handle.fetch_events(window).await
    }
}

#[async_trait]
impl EventSource for GoogleCalendarHandle {
    fn name(&self) -> &'static str {
        "google_calendar"
    }

    fn provenance(&self) -> Provenance {
        Provenance::Remote
    }

    async fn events_between(&self, window: &TimeRange) -> AgentResult<Vec<Event>> {
        self.get_events_between(*window).await
    }

    async fn shutdown(&self) -> AgentResult<()> {
        self.actor_handle.shutdown().await
    }
}
