//! User listing and registration on `/users`.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use feedfin_core::models::auth::UserSummary;
use tracing::{debug, info};

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::CredentialsRequest;

/// `GET /users`: list registered usernames.
pub async fn list_users_handler(State(state): State<AppState>) -> Json<Vec<UserSummary>> {
    Json(state.registry.list())
}

/// `POST /users`: register a user. Requires authentication.
pub async fn add_user_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(caller)): Extension<AuthenticatedUser>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> AppResult<Json<UserSummary>> {
    let body = body.map(|Json(b)| b).unwrap_or_else(|rejection| {
        debug!(error = %rejection, "unreadable user body");
        CredentialsRequest::default()
    });

    let user = state.registry.add(
        body.username.as_deref().unwrap_or_default(),
        body.password.as_deref().unwrap_or_default(),
    )?;
    info!(username = %user.username, by = %caller.username, "registered user");
    Ok(Json(user))
}
