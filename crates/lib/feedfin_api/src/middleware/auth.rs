//! Authentication middleware: credential extraction and token verification.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use feedfin_core::auth::gate::AuthDecision;
use feedfin_core::models::auth::Identity;
use tracing::warn;

use crate::AppState;
use crate::error::AppError;
use crate::services::cookies;

/// Key used to store the caller's identity in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

/// The credential a request presents.
///
/// `Authorization: Bearer <token>` first, then a bare `Authorization` value,
/// then the `token` cookie.
pub fn presented_credential<'a>(headers: &'a HeaderMap, jar: &'a CookieJar) -> Option<&'a str> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match header {
        Some(value) => Some(value.strip_prefix("Bearer ").unwrap_or(value)),
        None => cookies::current_token(jar),
    }
}

/// Axum middleware: runs the auth gate over the presented credential and
/// injects `AuthenticatedUser` into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let decision = state
        .sessions
        .gate()
        .authenticate(presented_credential(request.headers(), &jar));

    match decision {
        AuthDecision::Authenticated(identity) => {
            request.extensions_mut().insert(AuthenticatedUser(identity));
            Ok(next.run(request).await)
        }
        AuthDecision::Unauthenticated(reason) => {
            warn!(reason = %reason, path = %request.uri().path(), "unauthenticated request");
            Err(AppError::from(reason))
        }
    }
}
