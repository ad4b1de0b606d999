//! Session request handlers: refresh, login and logout on `/auth`.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use feedfin_core::session::{SessionDirective, SessionStatus};
use tracing::debug;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{CredentialsRequest, TokenResponse};
use crate::services::cookies;

/// `GET /auth`: validate the token cookie, issuing a fresh token if valid.
pub async fn refresh_handler(State(state): State<AppState>, jar: CookieJar) -> AppResult<Response> {
    let directive = state.sessions.refresh(cookies::current_token(&jar))?;
    Ok(respond(jar, directive, secure_cookies(&state)))
}

/// `POST /auth`: check username + password, issuing a token if they match.
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> AppResult<Response> {
    let body = body.map(|Json(b)| b).unwrap_or_else(|rejection| {
        debug!(error = %rejection, "unreadable login body");
        CredentialsRequest::default()
    });

    let directive = state.sessions.login(
        state.registry.as_ref(),
        body.username.as_deref(),
        body.password.as_deref(),
    )?;
    Ok(respond(jar, directive, secure_cookies(&state)))
}

/// `DELETE /auth`: blank the token cookie (log out).
pub async fn logout_handler(State(state): State<AppState>, jar: CookieJar) -> Response {
    respond(jar, state.sessions.logout(), secure_cookies(&state))
}

fn secure_cookies(state: &AppState) -> bool {
    !state.config.dev_mode
}

/// Turn a session directive into a response: cookie update, then body and status.
fn respond(jar: CookieJar, directive: SessionDirective, secure: bool) -> Response {
    let jar = cookies::apply(jar, &directive.credential, secure);
    match (directive.status, directive.token) {
        (SessionStatus::Success, Some(token)) => (jar, Json(TokenResponse { token })).into_response(),
        (SessionStatus::Success, None) => (jar, StatusCode::OK).into_response(),
        (SessionStatus::Rejected(reason), _) => (jar, AppError::from(reason)).into_response(),
    }
}
