//! HTTP request/response tracing middleware.

use tower_http::LatencyUnit;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Creates a tracing middleware for HTTP requests.
///
/// # Logging Behavior
///
/// **On Request:**
/// - Creates a span at `INFO` level with method, URI (including the `domain`
///   query) and HTTP version
///
/// **On Response:**
/// - Logs status code and latency in milliseconds at `INFO` level
/// - 5xx responses (upstream or store failures) are logged again at `ERROR`
///
/// # Example Logs
///
/// ```text
/// INFO request{method=GET uri=/api/traffic?domain=example.com version=HTTP/1.1}: finished processing request latency=240 ms status=200
/// ERROR request{method=GET uri=/api/traffic?domain=example.com version=HTTP/1.1}: response failed classification=Status code: 500 Internal Server Error latency=31 ms
/// ```
pub fn layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
        .on_failure(
            DefaultOnFailure::new()
                .level(Level::ERROR)
                .latency_unit(LatencyUnit::Millis),
        )
}
