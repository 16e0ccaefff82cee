//! HTTP request metrics middleware

use std::time::Instant;

use axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response};
use metrics::{counter, histogram};

/// Label used for requests that matched no route
const UNMATCHED_PATH: &str = "unmatched";

/// Records `ocpi_http_requests_total{method,path,status}` and
/// `ocpi_http_request_duration_seconds{method,path}`.
///
/// `path` is the route template (`/ocpi/{version}/details`), never the raw
/// URI, so label cardinality stays bounded.
pub async fn http_metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_PATH.to_string());

    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed().as_secs_f64();

    let status = response.status().as_u16().to_string();
    counter!(
        "ocpi_http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status
    )
    .increment(1);
    histogram!("ocpi_http_request_duration_seconds", "method" => method, "path" => path)
        .record(elapsed);

    response
}
