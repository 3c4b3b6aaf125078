use calendar_agent::components::google_calendar::{GoogleCalendarHandle, GoogleCalendarSettings};
use calendar_agent::components::{EventSource, LocalEventStore, SourceManager};
use calendar_agent::config::Config;
use calendar_agent::scheduling::{Event, TimeRange};
use calendar_agent::tools::{ToolContext, ToolRegistry};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, hour, minute, 0).unwrap()
}

fn workday() -> TimeRange {
    TimeRange::new(at(9, 0), at(17, 0))
}

fn settings(server: &MockServer) -> GoogleCalendarSettings {
    GoogleCalendarSettings {
        calendar_id: "primary".to_string(),
        access_token: "test-token".to_string(),
        api_base: server.uri(),
        timezone: chrono_tz::Tz::UTC,
    }
}

/// Test that events are fetched across pages and converted
#[tokio::test]
async fn test_fetches_all_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .and(header("authorization", "Bearer test-token"))
        .and(query_param("singleEvents", "true"))
        .and(query_param("orderBy", "startTime"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "g1",
                "summary": "Client call",
                "start": {"dateTime": "2025-01-15T10:00:00Z"},
                "end": {"dateTime": "2025-01-15T11:00:00Z"}
            }],
            "nextPageToken": "page-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "id": "g2",
                    "start": {"date": "2025-01-15"},
                    "end": {"date": "2025-01-16"}
                },
                {
                    "id": "broken",
                    "start": {"dateTime": "yesterday"},
                    "end": {"dateTime": "2025-01-15T11:00:00Z"}
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let handle = GoogleCalendarHandle::new(settings(&server));
    let events = handle.events_between(&workday()).await.unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].id, "g1");
    assert_eq!(events[0].start_date, at(10, 0));
    assert!(!events[0].is_all_day);
    assert_eq!(events[1].id, "g2");
    assert!(events[1].is_all_day);
    assert_eq!(events[1].title, "(untitled)");

    handle.shutdown().await.unwrap();
}

/// Test that HTTP failures surface as errors carrying the status
#[tokio::test]
async fn test_http_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid credentials"))
        .mount(&server)
        .await;

    let handle = GoogleCalendarHandle::new(settings(&server));
    let err = handle.events_between(&workday()).await.unwrap_err();

    let message = err.to_string();
    assert!(message.contains("401"), "{}", message);
    assert!(message.contains("invalid credentials"), "{}", message);
}

/// Test that a calendar which never runs out of pages is an error, not a partial list
#[tokio::test]
async fn test_endless_paging_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "repeat",
                "start": {"dateTime": "2025-01-15T10:00:00Z"},
                "end": {"dateTime": "2025-01-15T11:00:00Z"}
            }],
            "nextPageToken": "more"
        })))
        .expect(10)
        .mount(&server)
        .await;

    let handle = GoogleCalendarHandle::new(settings(&server));
    let err = handle.events_between(&workday()).await.unwrap_err();
    assert!(err.to_string().contains("10 pages"), "{}", err);

    handle.shutdown().await.unwrap();
}

/// Test that a failing remote source leaves the local snapshot usable
#[tokio::test]
async fn test_snapshot_survives_remote_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut sources = SourceManager::new();
    sources.register(LocalEventStore::with_events(vec![Event::new(
        "local-1",
        "Dentist",
        at(13, 0),
        at(14, 0),
    )]));
    sources.register(GoogleCalendarHandle::new(settings(&server)));

    let snapshot = sources.snapshot(&workday()).await;
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, "local-1");

    sources.shutdown_all().await.unwrap();
}

/// Test that local edits shadow the remote copy of the same event
#[tokio::test]
async fn test_local_events_shadow_remote_copies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "id": "shared",
                    "summary": "Old slot",
                    "start": {"dateTime": "2025-01-15T10:00:00Z"},
                    "end": {"dateTime": "2025-01-15T11:00:00Z"}
                },
                {
                    "id": "remote-only",
                    "summary": "Board meeting",
                    "start": {"dateTime": "2025-01-15T15:00:00Z"},
                    "end": {"dateTime": "2025-01-15T16:00:00Z"}
                }
            ]
        })))
        .mount(&server)
        .await;

    let mut sources = SourceManager::new();
    sources.register(GoogleCalendarHandle::new(settings(&server)));
    sources.register(LocalEventStore::with_events(vec![Event::new(
        "shared",
        "Moved slot",
        at(12, 0),
        at(13, 0),
    )]));

    let snapshot = sources.snapshot(&workday()).await;
    let ids: Vec<&str> = snapshot.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["shared", "remote-only"]);
    assert_eq!(snapshot[0].title, "Moved slot");
}

/// Test that a local event moved out of the window still hides its remote copy
#[tokio::test]
async fn test_local_copy_outside_window_hides_remote_copy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "shared",
                "summary": "Old slot",
                "start": {"dateTime": "2025-01-15T10:00:00Z"},
                "end": {"dateTime": "2025-01-15T11:00:00Z"}
            }]
        })))
        .mount(&server)
        .await;

    let mut sources = SourceManager::new();
    sources.register(GoogleCalendarHandle::new(settings(&server)));
    sources.register(LocalEventStore::with_events(vec![Event::new(
        "shared",
        "Moved slot",
        at(15, 0),
        at(16, 0),
    )]));
    let sources = Arc::new(sources);

    let morning = TimeRange::new(at(9, 0), at(12, 0));
    assert!(sources.snapshot(&morning).await.is_empty());

    let context = ToolContext::new(sources.clone(), &Config::default()).unwrap();
    let registry = ToolRegistry::with_scheduling_tools(context);

    let free = registry
        .dispatch(
            "find_free_time",
            json!({"startDate": "2025-01-15T09:00:00Z", "endDate": "2025-01-15T12:00:00Z"}),
        )
        .await;
    assert_eq!(free["success"], true);
    let slots = free["freeSlots"].as_array().unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0]["durationMinutes"], 180);

    let conflicts = registry
        .dispatch(
            "check_conflicts",
            json!({"startDate": "2025-01-15T10:00:00Z", "endDate": "2025-01-15T11:00:00Z"}),
        )
        .await;
    assert_eq!(conflicts["success"], true);
    assert_eq!(conflicts["hasConflicts"], false);

    sources.shutdown_all().await.unwrap();
}
