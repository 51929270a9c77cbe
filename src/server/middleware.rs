use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Logging middleware for HTTP requests.
///
/// Reuses the caller's `x-request-id` when it is a sane header value,
/// otherwise assigns a fresh UUID, and echoes it on the response.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request_id(&request);
    let start_time = Instant::now();

    let mut response = next.run(request).await;
    let duration = start_time.elapsed();

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER.clone(), value);
    }

    info!(
        request_id = %request_id,
        "{} {} -- {} (served in {:.3}ms)",
        method,
        uri.path(),
        response.status(),
        duration.as_secs_f64() * 1000.0,
    );

    response
}

fn request_id(request: &Request<Body>) -> String {
    request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= 64)
        .filter(|v| v.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'))
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// CORS middleware setup
pub fn cors_layer() -> tower_http::cors::CorsLayer {
    tower_http::cors::CorsLayer::permissive()
}
