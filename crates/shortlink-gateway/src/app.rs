use std::any::Any;

use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::{error, Level};

use crate::error::AppError;
use crate::handlers::{health_handler, info_handler, redirect_handler, shorten_handler};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .nest(
                "/api",
                Router::new()
                    .route("/shorten", post(shorten_handler))
                    .route("/info", get(info_handler)),
            )
            .route("/{short_code}", get(redirect_handler))
            .with_state(state)
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .latency_unit(LatencyUnit::Millis),
                    ),
            )
    }
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    error!(panic = detail, "recovered from panic in handler");

    AppError::Internal("internal server error".to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use shortlink_core::{ShortCode, Shortener, ShortenerError, UrlDetail};
    use shortlink_shortener::ShortenerService;
    use shortlink_storage::InMemoryStore;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct TestResponse {
        status: StatusCode,
        location: Option<String>,
        body: Value,
    }

    fn test_router() -> Router {
        let shortener = ShortenerService::new(InMemoryStore::new());
        App::router(AppState::new(Arc::new(shortener)))
    }

    async fn send(app: &Router, request: Request<Body>) -> TestResponse {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        TestResponse {
            status,
            location,
            body,
        }
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn shorten(url: &str, ttl: i64) -> Request<Body> {
        post_json(
            "/api/shorten",
            &json!({ "url": url, "expiration_in_minutes": ttl }).to_string(),
        )
    }

    /// Fails every call as if the store were down.
    struct UnavailableShortener;

    #[async_trait]
    impl Shortener for UnavailableShortener {
        async fn shorten(&self, _: &str, _: i64) -> Result<ShortCode, ShortenerError> {
            Err(ShortenerError::StoreUnavailable("connection refused".into()))
        }

        async fn unshorten(&self, _: &str) -> Result<String, ShortenerError> {
            Err(ShortenerError::StoreUnavailable("connection refused".into()))
        }

        async fn short_link_info(&self, _: &str) -> Result<UrlDetail, ShortenerError> {
            Err(ShortenerError::StoreUnavailable("connection refused".into()))
        }
    }

    struct PanickingShortener;

    #[async_trait]
    impl Shortener for PanickingShortener {
        async fn shorten(&self, _: &str, _: i64) -> Result<ShortCode, ShortenerError> {
            panic!("boom")
        }

        async fn unshorten(&self, _: &str) -> Result<String, ShortenerError> {
            panic!("boom")
        }

        async fn short_link_info(&self, _: &str) -> Result<UrlDetail, ShortenerError> {
            panic!("boom")
        }
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = test_router();

        let response = send(&app, get_request("/health")).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn shorten_redirect_and_info() {
        let app = test_router();

        let created = send(&app, shorten("https://www.example.com", 60)).await;
        assert_eq!(created.status, StatusCode::CREATED);
        assert_eq!(created.body, json!({ "short_link": "1" }));

        let redirect = send(&app, get_request("/1")).await;
        assert_eq!(redirect.status, StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(redirect.location.as_deref(), Some("https://www.example.com"));

        let info = send(&app, get_request("/api/info?shortlink=1")).await;
        assert_eq!(info.status, StatusCode::OK);
        assert_eq!(info.body["url"], "https://www.example.com");
        assert_eq!(info.body["expiration_in_minutes"], 60);
        let created_at = info.body["created_at"].as_str().unwrap();
        assert!(created_at.parse::<jiff::Timestamp>().is_ok());
    }

    #[tokio::test]
    async fn repeated_url_returns_same_short_link() {
        let app = test_router();

        let first = send(&app, shorten("https://www.example.com", 60)).await;
        let second = send(&app, shorten("https://www.example.com", 5)).await;
        assert_eq!(first.body, second.body);

        let other = send(&app, shorten("https://other.example.com", 5)).await;
        assert_eq!(other.body, json!({ "short_link": "2" }));
    }

    #[tokio::test]
    async fn missing_ttl_defaults_to_never() {
        let app = test_router();

        let request = post_json("/api/shorten", r#"{"url":"https://a.example"}"#);
        let created = send(&app, request).await;
        assert_eq!(created.status, StatusCode::CREATED);

        let info = send(&app, get_request("/api/info?shortlink=1")).await;
        assert_eq!(info.body["expiration_in_minutes"], 0);
    }

    #[tokio::test]
    async fn invalid_shorten_requests_are_bad_requests() {
        let app = test_router();

        let cases = [
            post_json("/api/shorten", "{not json"),
            post_json("/api/shorten", r#"{"expiration_in_minutes":5}"#),
            shorten("", 5),
            shorten("https://www.example.com", -1),
        ];

        for request in cases {
            let response = send(&app, request).await;
            assert_eq!(response.status, StatusCode::BAD_REQUEST);
            assert!(response.body["error"].is_string());
        }
    }

    #[tokio::test]
    async fn info_requires_shortlink_parameter() {
        let app = test_router();

        for uri in ["/api/info", "/api/info?shortlink="] {
            let response = send(&app, get_request(uri)).await;
            assert_eq!(response.status, StatusCode::BAD_REQUEST);
            assert_eq!(response.body["error"], "missing shortlink parameter");
        }
    }

    #[tokio::test]
    async fn unknown_codes_are_not_found() {
        let app = test_router();

        for uri in ["/zz", "/doesNotExist", "/api/info?shortlink=zz"] {
            let response = send(&app, get_request(uri)).await;
            assert_eq!(response.status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(response.body, json!({ "error": "unknown short url" }));
        }
    }

    #[tokio::test]
    async fn store_outage_is_service_unavailable() {
        let app = App::router(AppState::new(Arc::new(UnavailableShortener)));

        let shortened = send(&app, shorten("https://www.example.com", 5)).await;
        assert_eq!(shortened.status, StatusCode::SERVICE_UNAVAILABLE);

        let redirect = send(&app, get_request("/abc")).await;
        assert_eq!(redirect.status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(redirect.body["error"]
            .as_str()
            .unwrap()
            .contains("connection refused"));
    }

    #[tokio::test]
    async fn panics_become_internal_server_errors() {
        let app = App::router(AppState::new(Arc::new(PanickingShortener)));

        let response = send(&app, get_request("/abc")).await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body, json!({ "error": "internal server error" }));

        // the router keeps serving after a panic
        let health = send(&app, get_request("/health")).await;
        assert_eq!(health.status, StatusCode::OK);
    }
}
