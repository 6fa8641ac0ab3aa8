// src/server/routes.rs
// =============================================================================
// Request handlers for the HTTP API.
//
// Both routes take the same body: {"domain": "example.com"}.
//
// Errors:
// - Body isn't JSON           -> 400 "Invalid JSON"
// - domain missing, null or blank -> 400 "Domain is required"
// - domain fails format check -> 400 "Invalid domain format"
// (/api/search wraps the last two in a JSON body; /api/stream sends them as
// plain text because the client expects an event stream, not JSON.)
//
// Rust concepts:
// - Extractors: axum builds handler arguments (State, Json) from the request
// - Result<Json<T>, JsonRejection>: catch a bad body ourselves instead of
//   letting axum answer with its own error text
// - Streams: the SSE response is a Stream of events, sent as they are ready
// =============================================================================

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::AppState;
use crate::domain::TargetDomain;
use crate::engine::{StreamEvent, SubdomainResult};

/// Payload of the final SSE frame
pub const COMPLETE_MESSAGE: &str = r#"{"message": "Search completed"}"#;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    // Missing and null both land here as None
    #[serde(default)]
    pub domain: Option<String>,
}

impl SearchRequest {
    fn domain(&self) -> &str {
        self.domain.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub domain: String,
    pub subdomains: Vec<SubdomainResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResponse {
    fn error(message: impl ToString) -> Self {
        Self {
            domain: String::new(),
            subdomains: Vec::new(),
            error: Some(message.to_string()),
        }
    }
}

/// POST /api/search: run every source, answer once with all results
pub async fn search_handler(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Response {
    // Body must at least be a JSON object
    let Ok(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Invalid JSON").into_response();
    };

    // Empty or malformed domains get a JSON error body
    let target = match TargetDomain::parse(request.domain()) {
        Ok(target) => target,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(SearchResponse::error(e))).into_response(),
    };

    // Blocks until every source is done (or hit the run timeout)
    let subdomains = state.discovery.discover(&target).await;

    Json(SearchResponse {
        domain: target.to_string(),
        subdomains,
        error: None,
    })
    .into_response()
}

/// POST /api/stream: relay results as Server-Sent Events while they arrive
///
/// Each result becomes `data: {"subdomain": ..., "source": ...}`. After the
/// last source finishes, one `event: complete` frame closes the stream.
pub async fn stream_handler(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Invalid JSON").into_response();
    };

    // Plain text here: the response isn't an event stream yet
    let target = match TargetDomain::parse(request.domain()) {
        Ok(target) => target,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    debug!(domain = %target, "starting streaming discovery");

    // One SSE frame per engine event; a json_data() error is handed to axum
    let events = state
        .discovery
        .discover_streaming(&target)
        .map(|event| match event {
            StreamEvent::Discovered(result) => Event::default().json_data(&result),
            StreamEvent::Complete => Ok(Event::default().event("complete").data(COMPLETE_MESSAGE)),
        });

    // Comment frames keep idle connections open during a long DNS sweep
    Sse::new(events).keep_alive(KeepAlive::default()).into_response()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is Server-Sent Events (SSE)?
//    - A plain HTTP response that stays open and sends "data: ..." frames
//    - Browsers read it with EventSource; each frame is one result
//
// 2. Why take Result<Json<T>, JsonRejection> instead of Json<T>?
//    - With Json<T>, axum rejects bad bodies with its own message
//    - Taking the Result lets us answer "Invalid JSON" like the UI expects
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Discovery, SourceKind};
    use crate::server::router;
    use crate::testutil::ScriptedSource;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app() -> axum::Router {
        let ct = ScriptedSource::new(
            SourceKind::CertificateTransparency,
            &["www.example.com", "api.example.com"],
        );
        let dns = ScriptedSource::new(SourceKind::DnsEnumeration, &["www.example.com", "mail.example.com"]);
        let discovery = Discovery::new(vec![Arc::new(ct), Arc::new(dns)], Duration::from_secs(5), 100);

        router(AppState {
            discovery: Arc::new(discovery),
        })
    }

    fn post(uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_search_returns_all_results() {
        let response = app()
            .oneshot(post("/api/search", r#"{"domain": " Example.com "}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: SearchResponse = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body.domain, "example.com");
        assert_eq!(body.subdomains.len(), 3);
        assert!(body.error.is_none());
    }

    #[tokio::test]
    async fn test_search_rejects_bad_domains() {
        let response = app()
            .oneshot(post("/api/search", r#"{"domain": "not a domain"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: SearchResponse = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body.error.as_deref(), Some("Invalid domain format"));

        let response = app().oneshot(post("/api/search", r#"{}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: SearchResponse = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body.error.as_deref(), Some("Domain is required"));
    }

    #[tokio::test]
    async fn test_null_domain_is_treated_as_missing() {
        let response = app()
            .oneshot(post("/api/search", r#"{"domain": null}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: SearchResponse = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body.error.as_deref(), Some("Domain is required"));

        let response = app()
            .oneshot(post("/api/stream", r#"{"domain": null}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Domain is required");
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let response = app().oneshot(post("/api/search", "{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Invalid JSON");
    }

    #[tokio::test]
    async fn test_stream_emits_frames_then_complete() {
        let response = app()
            .oneshot(post("/api/stream", r#"{"domain": "example.com"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/event-stream"
        );

        let body = body_text(response).await;
        let data_frames = body.matches("data: {\"subdomain\"").count();
        assert_eq!(data_frames, 3);
        assert!(body.contains(r#""source":"Certificate Transparency""#));
        assert!(body.ends_with("event: complete\ndata: {\"message\": \"Search completed\"}\n\n"));
    }

    #[tokio::test]
    async fn test_stream_rejects_bad_domain_as_text() {
        let response = app()
            .oneshot(post("/api/stream", r#"{"domain": ""}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Domain is required");
    }
}
