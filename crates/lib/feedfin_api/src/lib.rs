//! # feedfin_api
//!
//! HTTP API library for Feedfin.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use feedfin_core::auth::tokens::TokenCodec;
use feedfin_core::registry::UserRegistry;
use feedfin_core::session::SessionService;

use crate::config::ApiConfig;
use crate::handlers::{auth, users};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Session operations and the auth gate, sharing one token codec.
    pub sessions: SessionService,
    /// User registry consulted at login.
    pub registry: Arc<dyn UserRegistry>,
    /// API configuration.
    pub config: ApiConfig,
}

impl AppState {
    /// Build the state, binding a token codec to the configured signing context.
    pub fn new(config: ApiConfig, registry: Arc<dyn UserRegistry>) -> Self {
        let codec = Arc::new(TokenCodec::new(
            &config.secret,
            config.algorithm,
            config.token_duration,
        ));
        Self {
            sessions: SessionService::new(codec),
            registry,
            config,
        }
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public = Router::new()
        .route(
            "/auth",
            get(auth::refresh_handler)
                .post(auth::login_handler)
                .delete(auth::logout_handler),
        )
        .route("/users", get(users::list_users_handler));

    // Protected routes (require auth)
    let protected = Router::new()
        .route("/users", post(users::add_user_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(axum::middleware::from_fn(middleware::log::log_requests))
        .with_state(state)
}
