use super::models::{CalendarEvent, GoogleCalendarSettings};
use super::time::to_event;
use crate::error::{google_calendar_error, AgentResult};
use crate::scheduling::{Event, TimeRange};
use reqwest::Client;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use url::Url;

/// Upper bound on result pages followed per fetch
const MAX_PAGES: usize = 10;

/// The Google Calendar actor that processes messages
pub struct GoogleCalendarActor {
    settings: GoogleCalendarSettings,
    client: Client,
    command_rx: mpsc::Receiver<GoogleCalendarCommand>,
}

/// Commands that can be sent to the Google Calendar actor
pub enum GoogleCalendarCommand {
    FetchEvents(TimeRange, mpsc::Sender<AgentResult<Vec<Event>>>),
    Shutdown,
}

/// Handle for communicating with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarActorHandle {
    command_tx: mpsc::Sender<GoogleCalendarCommand>,
}

impl GoogleCalendarActorHandle {
    /// Fetch events overlapping the window
    pub async fn fetch_events(&self, window: TimeRange) -> AgentResult<Vec<Event>> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(GoogleCalendarCommand::FetchEvents(window, response_tx))
            .await
            .map_err(|e| google_calendar_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| google_calendar_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AgentResult<()> {
        let _ = self.command_tx.send(GoogleCalendarCommand::Shutdown).await;
        Ok(())
    }
}

impl GoogleCalendarActor {
    /// Create a new actor and return its handle
    pub fn new(settings: GoogleCalendarSettings) -> (Self, GoogleCalendarActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            settings,
            client: Client::new(),
            command_rx,
        };

        (actor, GoogleCalendarActorHandle { command_tx })
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Google Calendar actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                GoogleCalendarCommand::FetchEvents(window, response_tx) => {
                    let result = self.fetch_events(&window).await;
                    let _ = response_tx.send(result).await;
                }
                GoogleCalendarCommand::Shutdown => {
                    info!("Google Calendar actor shutting down");
                    break;
                }
            }
        }

        info!("Google Calendar actor shut down");
    }

    /// Fetch and convert every event overlapping the window
    async fn fetch_events(&self, window: &TimeRange) -> AgentResult<Vec<Event>> {
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let page = self.fetch_page(window, page_token.as_deref()).await?;

            for item in parse_items(&page)? {
                match to_event(&item, self.settings.timezone) {
                    Ok(Some(event)) => events.push(event),
                    Ok(None) => warn!("Skipping Google event {} without start or end", item.id),
                    Err(e) => warn!("Skipping Google event {}: {}", item.id, e),
                }
            }

            page_token = page
                .get("nextPageToken")
                .and_then(|t| t.as_str())
                .map(|t| t.to_string());
            if page_token.is_none() {
                debug!("Fetched {} Google Calendar events", events.len());
                return Ok(events);
            }
        }

        // A partial list would show busy time as free
        warn!("Google Calendar still had pages after {} requests", MAX_PAGES);
        Err(google_calendar_error(&format!(
            "Event list exceeded {} pages; narrow the time window",
            MAX_PAGES
        )))
    }

    async fn fetch_page(&self, window: &TimeRange, page_token: Option<&str>) -> AgentResult<Value> {
        let url = events_url(&self.settings, window, page_token)?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.settings.access_token)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to fetch events: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to fetch events: HTTP {} - {}",
                status, error_body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse events response: {}", e)))
    }
}

/// Build the events list URL for one page of the window
fn events_url(
    settings: &GoogleCalendarSettings,
    window: &TimeRange,
    page_token: Option<&str>,
) -> AgentResult<Url> {
    let mut url = Url::parse(&settings.api_base)
        .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;

    url.path_segments_mut()
        .map_err(|_| google_calendar_error("API base URL cannot have a path"))?
        .pop_if_empty()
        .push("calendars")
        .push(&settings.calendar_id)
        .push("events");

    {
        let mut query = url.query_pairs_mut();
        query.append_pair("timeMin", &window.start.to_rfc3339());
        query.append_pair("timeMax", &window.end.to_rfc3339());
        query.append_pair("singleEvents", "true");
        query.append_pair("orderBy", "startTime");
        if let Some(token) = page_token {
            query.append_pair("pageToken", token);
        }
    }

    Ok(url)
}

/// Pull the `items` array of an events response into `CalendarEvent`s
fn parse_items(response: &Value) -> AgentResult<Vec<CalendarEvent>> {
    let items = response
        .get("items")
        .and_then(|i| i.as_array())
        .ok_or_else(|| google_calendar_error("No items in response"))?;

    Ok(items
        .iter()
        .filter(|event| text(event, "status").as_deref() != Some("cancelled"))
        .map(|event| {
            let start = event.get("start").cloned().unwrap_or(Value::Null);
            let end = event.get("end").cloned().unwrap_or(Value::Null);
            let attendees = event
                .get("attendees")
                .and_then(|a| a.as_array())
                .map(|list| list.iter().filter_map(|a| text(a, "email")).collect())
                .unwrap_or_default();

            CalendarEvent {
                id: text(event, "id").unwrap_or_default(),
                summary: text(event, "summary"),
                description: text(event, "description"),
                location: text(event, "location"),
                color_id: text(event, "colorId"),
                attendees,
                start_date_time: text(&start, "dateTime"),
                start_date: text(&start, "date"),
                end_date_time: text(&end, "dateTime"),
                end_date: text(&end, "date"),
            }
        })
        .collect())
}

fn text(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}
