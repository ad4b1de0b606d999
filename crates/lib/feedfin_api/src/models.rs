//! Request and response bodies.

use serde::{Deserialize, Serialize};

/// Error body returned with every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Body returned when a token is issued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// `{username, password}` body for login and user creation.
///
/// Both fields are optional here so that absence is reported as a missing
/// field rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}
