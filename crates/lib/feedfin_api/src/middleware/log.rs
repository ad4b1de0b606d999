//! Request/response logging.
//!
//! Bodies are not logged: login and user creation carry passwords.

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::info;

/// Axum middleware: logs method, path and query on the way in and the
/// status on the way out.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    match request.uri().query() {
        Some(query) => info!(%method, %path, query, "request"),
        None => info!(%method, %path, "request"),
    }

    let response = next.run(request).await;

    info!(%method, %path, status = response.status().as_u16(), "response");
    response
}
