mod common;

use chrono::Utc;
use common::test_config;
use iris::components::google_calendar::{EventDraft, GoogleCalendarHandle, StoredToken, TokenManager};
use iris::components::CalendarService;
use iris::config::Config;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EVENTS_PATH: &str = "/calendar/v3/calendars/primary/events";

async fn setup(server: &MockServer, dir: &tempfile::TempDir, token: StoredToken) -> Arc<RwLock<Config>> {
    let config = Arc::new(RwLock::new(test_config(dir.path(), &server.uri())));
    TokenManager::new(Arc::clone(&config))
        .set_token(&token)
        .await
        .unwrap();
    config
}

fn fresh_token() -> StoredToken {
    StoredToken {
        access_token: "test-access".to_string(),
        refresh_token: Some("test-refresh".to_string()),
        expires_at: Utc::now().timestamp() + 3600,
    }
}

fn draft(summary: &str) -> EventDraft {
    EventDraft {
        summary: summary.to_string(),
        start_time: "2025-09-03T14:00:00-06:00".to_string(),
        end_time: "2025-09-03T15:00:00-06:00".to_string(),
        time_zone: "America/Edmonton".to_string(),
    }
}

fn items() -> serde_json::Value {
    json!({
        "items": [
            {
                "id": "evt1",
                "summary": "Team Meeting",
                "start": { "dateTime": "2025-09-02T10:00:00-06:00" },
                "end": { "dateTime": "2025-09-02T11:00:00-06:00" }
            },
            {
                "id": "evt2",
                "summary": "Labour Day",
                "start": { "date": "2025-09-01" },
                "end": { "date": "2025-09-02" }
            }
        ]
    })
}

#[tokio::test]
async fn lists_upcoming_events_with_bearer_token() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = setup(&server, &dir, fresh_token()).await;

    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .and(header("Authorization", "Bearer test-access"))
        .and(query_param("singleEvents", "true"))
        .and(query_param("orderBy", "startTime"))
        .and(query_param("maxResults", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items()))
        .expect(1)
        .mount(&server)
        .await;

    let calendar = GoogleCalendarHandle::new(config);
    let events = calendar.list_upcoming(10).await.unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].id, "evt1");
    assert_eq!(events[1].start_date.as_deref(), Some("2025-09-01"));
    calendar.shutdown().await.unwrap();
}

#[tokio::test]
async fn search_filters_by_summary() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = setup(&server, &dir, fresh_token()).await;

    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(items()))
        .mount(&server)
        .await;

    let calendar = GoogleCalendarHandle::new(config);
    let found = calendar.search("meeting").await.unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "evt1");
}

#[tokio::test]
async fn creates_event_in_configured_zone() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = setup(&server, &dir, fresh_token()).await;

    Mock::given(method("POST"))
        .and(path(EVENTS_PATH))
        .and(body_partial_json(json!({
            "summary": "Meeting with Alex",
            "start": { "dateTime": "2025-09-03T14:00:00-06:00", "timeZone": "America/Edmonton" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "new1",
            "summary": "Meeting with Alex",
            "htmlLink": "https://calendar.google.com/event?eid=new1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let calendar = GoogleCalendarHandle::new(config);
    let created = calendar.create(draft("Meeting with Alex")).await.unwrap();

    assert_eq!(created.id, "new1");
    assert_eq!(created.html_link.as_deref(), Some("https://calendar.google.com/event?eid=new1"));
}

#[tokio::test]
async fn update_fetches_then_puts_full_event() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = setup(&server, &dir, fresh_token()).await;
    let event_path = format!("{}/evt1", EVENTS_PATH);

    Mock::given(method("GET"))
        .and(path(event_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "evt1",
            "summary": "Team Meeting",
            "location": "Room 4",
            "start": { "dateTime": "2025-09-02T10:00:00-06:00" },
            "end": { "dateTime": "2025-09-02T11:00:00-06:00" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(event_path.as_str()))
        .and(body_partial_json(json!({
            "summary": "Team Sync",
            "location": "Room 4",
            "end": { "dateTime": "2025-09-03T15:00:00-06:00" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "evt1",
            "summary": "Team Sync",
            "htmlLink": "https://calendar.google.com/event?eid=evt1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let calendar = GoogleCalendarHandle::new(config);
    let updated = calendar.update("evt1", draft("Team Sync")).await.unwrap();

    assert_eq!(updated.summary.as_deref(), Some("Team Sync"));
}

#[tokio::test]
async fn deletes_event() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = setup(&server, &dir, fresh_token()).await;

    Mock::given(method("DELETE"))
        .and(path(format!("{}/evt2", EVENTS_PATH).as_str()))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let calendar = GoogleCalendarHandle::new(config);
    calendar.delete("evt2").await.unwrap();
}

#[tokio::test]
async fn api_errors_carry_status_and_body() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = setup(&server, &dir, fresh_token()).await;

    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("insufficientPermissions"))
        .mount(&server)
        .await;

    let calendar = GoogleCalendarHandle::new(config);
    let err = calendar.list_upcoming(10).await.unwrap_err().to_string();

    assert!(err.contains("403"), "unexpected error: {err}");
    assert!(err.contains("insufficientPermissions"));
}

#[tokio::test]
async fn expired_token_is_refreshed_before_calling_api() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let expired = StoredToken {
        access_token: "stale".to_string(),
        refresh_token: Some("test-refresh".to_string()),
        expires_at: Utc::now().timestamp() - 10,
    };
    let config = setup(&server, &dir, expired).await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=test-refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "refreshed",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .and(header("Authorization", "Bearer refreshed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let calendar = GoogleCalendarHandle::new(Arc::clone(&config));
    assert!(calendar.list_upcoming(5).await.unwrap().is_empty());

    let stored = TokenManager::new(config).load_token().await.unwrap().unwrap();
    assert_eq!(stored.access_token, "refreshed");
    assert_eq!(stored.refresh_token.as_deref(), Some("test-refresh"));
}

#[tokio::test]
async fn missing_token_is_an_authorization_error() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = Arc::new(RwLock::new(test_config(dir.path(), &server.uri())));

    let err = TokenManager::new(config).get_token().await.unwrap_err();

    assert!(matches!(err, iris::error::Error::Auth(_)));
}
