//! `/event` routes.
//!
//! Endpoints:
//! - GET /event - List events
//! - POST /event - Create an event (id generated server-side)
//! - PUT /event - Update an event, id in the body
//! - DELETE /event/{id} - Clear an event's row

use lambda_http::{Body, Request, Response};
use tracing::{error, info, warn};

use crate::http::{error_response, json_response, message_response};
use crate::models::EventPayload;
use crate::sheets::GridBackend;
use crate::store::EventStore;
use crate::Error;

const MISSING_FIELDS: &str = "Missing required fields";

/// Dispatch one API Gateway request against the store.
pub async fn route<B: GridBackend>(
    store: &EventStore<B>,
    event: Request,
) -> Result<Response<Body>, lambda_http::Error> {
    let method = event.method().as_str();
    let raw_path = event.uri().path();
    // Strip /api stage prefix if present
    let path = raw_path.strip_prefix("/api").unwrap_or(raw_path);

    info!("Event request: {} {}", method, path);

    match (method, path) {
        ("GET", "/event") => match store.list().await {
            Ok(events) => json_response(200, &events),
            Err(e) => failure(e, &format!("Failed to fetch {}", store.sheet())),
        },

        ("POST", "/event") => {
            let payload: EventPayload = crate::parse_body!(event.body());
            match store.create(payload).await {
                Ok(_) => message_response("Event added successfully"),
                Err(e) => failure(e, "Failed to add event"),
            }
        }

        ("PUT", "/event") => {
            let payload: EventPayload = crate::parse_body!(event.body());
            match store.update(payload).await {
                Ok(_) => message_response("Event updated successfully"),
                Err(e) => failure(e, "Failed to update event"),
            }
        }

        ("DELETE", _) if path == "/event" || path.starts_with("/event/") => {
            let id = last_segment(path);
            match store.delete(&id).await {
                Ok(_) => message_response("Event deleted successfully"),
                Err(e) => failure(e, "Failed to delete event"),
            }
        }

        _ => error_response(404, "Not found"),
    }
}

/// Percent-decoded id segment of `/event/{id}`; empty when absent.
fn last_segment(path: &str) -> String {
    let Some(rest) = path.strip_prefix("/event/") else {
        return String::new();
    };
    let segment = rest.rsplit('/').next().unwrap_or_default();
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

/// Map a store error to its response; backend details are logged, not returned.
fn failure(err: Error, generic: &str) -> Result<Response<Body>, lambda_http::Error> {
    match err {
        Error::MissingFields(ref fields) => {
            warn!(?fields, "Rejected request");
            error_response(400, MISSING_FIELDS)
        }
        Error::Validation(message) => {
            warn!("Rejected request: {}", message);
            error_response(400, message)
        }
        Error::NotFound(message) => error_response(404, message),
        other => {
            error!(error = %other, "{}", generic);
            error_response(500, generic)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::canonical_header;
    use crate::memory::MemoryGrid;
    use serde_json::{json, Value};

    const SHEET: &str = "work05_sche";

    fn store_with(rows: Vec<Vec<&str>>) -> EventStore<MemoryGrid> {
        let grid = rows
            .into_iter()
            .map(|r| r.into_iter().map(String::from).collect())
            .collect();
        EventStore::new(MemoryGrid::new(SHEET, grid), SHEET)
    }

    fn standup_store() -> EventStore<MemoryGrid> {
        store_with(vec![
            vec!["id", "title", "day", "h1", "m1", "h2", "m2", "category"],
            vec!["t1", "Standup", "Mon", "09", "00", "09", "15", "work"],
        ])
    }

    fn request(method: &str, uri: &str, body: Option<Value>) -> Request {
        let body = match body {
            Some(json) => Body::from(json.to_string()),
            None => Body::Empty,
        };
        lambda_http::http::Request::builder()
            .method(method)
            .uri(uri)
            .body(body)
            .unwrap()
    }

    async fn call(
        store: &EventStore<MemoryGrid>,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (u16, Value) {
        let response = route(store, request(method, uri, body)).await.unwrap();
        let status = response.status().as_u16();
        let json = serde_json::from_slice(response.body().as_ref()).unwrap();
        (status, json)
    }

    fn full_event(id: Option<&str>, title: &str) -> Value {
        let mut body = json!({
            "title": title, "day": "Mon", "h1": "09", "m1": "00",
            "h2": "09", "m2": "15", "category": "work"
        });
        if let Some(id) = id {
            body["id"] = json!(id);
        }
        body
    }

    #[tokio::test]
    async fn test_get_lists_events() {
        let store = standup_store();
        let (status, body) = call(&store, "GET", "/api/event", None).await;
        assert_eq!(status, 200);
        assert_eq!(
            body,
            json!([{
                "id": "t1", "title": "Standup", "day": "Mon", "h1": "09",
                "m1": "00", "h2": "09", "m2": "15", "category": "work"
            }])
        );
    }

    #[tokio::test]
    async fn test_get_empty_sheet() {
        let store = store_with(vec![]);
        let (status, body) = call(&store, "GET", "/event", None).await;
        assert_eq!(status, 404);
        assert_eq!(body, json!({"error": "No data found"}));
    }

    #[tokio::test]
    async fn test_post_creates_event() {
        let store = store_with(vec![canonical_header().iter().map(String::as_str).collect()]);
        let (status, body) = call(&store, "POST", "/event", Some(full_event(None, "Standup"))).await;
        assert_eq!(status, 200);
        assert_eq!(body, json!({"message": "Event added successfully"}));

        let (_, listed) = call(&store, "GET", "/event", None).await;
        assert_eq!(listed[0]["title"], "Standup");
        assert!(listed[0]["id"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_post_missing_fields() {
        let store = standup_store();
        let (status, body) = call(&store, "POST", "/event", Some(json!({"title": "x"}))).await;
        assert_eq!(status, 400);
        assert_eq!(body, json!({"error": "Missing required fields"}));
    }

    #[tokio::test]
    async fn test_post_invalid_json() {
        let store = standup_store();
        let response = route(
            &store,
            lambda_http::http::Request::builder()
                .method("POST")
                .uri("/event")
                .body(Body::from("{oops"))
                .unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), 400);
    }

    #[tokio::test]
    async fn test_put_updates_event() {
        let store = standup_store();
        let (status, body) = call(&store, "PUT", "/event", Some(full_event(Some("t1"), "Sync"))).await;
        assert_eq!(status, 200);
        assert_eq!(body, json!({"message": "Event updated successfully"}));

        let (_, listed) = call(&store, "GET", "/event", None).await;
        assert_eq!(listed[0]["title"], "Sync");
    }

    #[tokio::test]
    async fn test_put_errors() {
        let store = standup_store();
        let (status, _) = call(&store, "PUT", "/event", Some(full_event(None, "Sync"))).await;
        assert_eq!(status, 400);

        let (status, body) = call(&store, "PUT", "/event", Some(full_event(Some("t9"), "Sync"))).await;
        assert_eq!(status, 404);
        assert_eq!(body, json!({"error": "Event not found"}));
    }

    #[tokio::test]
    async fn test_put_with_field_column_past_h() {
        let store = store_with(vec![
            vec!["id", "notes", "title", "day", "h1", "m1", "h2", "m2", "category"],
            vec!["t1", "", "Standup", "Mon", "09", "00", "09", "15", "work"],
        ]);
        let (status, body) = call(&store, "PUT", "/event", Some(full_event(Some("t1"), "Sync"))).await;
        assert_eq!(status, 500);
        assert_eq!(body, json!({"error": "Failed to update event"}));

        let (_, listed) = call(&store, "GET", "/event", None).await;
        assert_eq!(listed[0]["title"], "Standup");
    }

    #[tokio::test]
    async fn test_delete_event() {
        let store = standup_store();
        let (status, body) = call(&store, "DELETE", "/api/event/t1", None).await;
        assert_eq!(status, 200);
        assert_eq!(body, json!({"message": "Event deleted successfully"}));

        let (status, _) = call(&store, "GET", "/event", None).await;
        assert_eq!(status, 404);
    }

    #[tokio::test]
    async fn test_delete_decodes_timestamp_id() {
        let store = store_with(vec![
            vec!["id", "title"],
            vec!["2024-05-06T09:15:00.123Z", "Standup"],
        ]);
        let (status, _) = call(&store, "DELETE", "/event/2024-05-06T09%3A15%3A00.123Z", None).await;
        assert_eq!(status, 200);
    }

    #[tokio::test]
    async fn test_delete_errors() {
        let store = standup_store();
        let (status, body) = call(&store, "DELETE", "/event/", None).await;
        assert_eq!(status, 400);
        assert_eq!(body, json!({"error": "Missing event ID"}));

        let (status, body) = call(&store, "DELETE", "/event/t9", None).await;
        assert_eq!(status, 404);
        assert_eq!(body, json!({"error": "Event not found"}));
    }

    #[tokio::test]
    async fn test_backend_failures_are_genericized() {
        let store = standup_store();
        store.backend().set_unavailable(true);

        let (status, body) = call(&store, "GET", "/event", None).await;
        assert_eq!(status, 500);
        assert_eq!(body, json!({"error": "Failed to fetch work05_sche"}));

        let (status, body) = call(&store, "POST", "/event", Some(full_event(None, "x"))).await;
        assert_eq!(status, 500);
        assert_eq!(body, json!({"error": "Failed to add event"}));

        let (_, body) = call(&store, "PUT", "/event", Some(full_event(Some("t1"), "x"))).await;
        assert_eq!(body, json!({"error": "Failed to update event"}));

        let (_, body) = call(&store, "DELETE", "/event/t1", None).await;
        assert_eq!(body, json!({"error": "Failed to delete event"}));
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let store = standup_store();
        let (status, body) = call(&store, "PATCH", "/event", None).await;
        assert_eq!(status, 404);
        assert_eq!(body, json!({"error": "Not found"}));
    }
}
