//! Authentication logic.
//!
//! Provides the signed token codec and the gate that turns a presented
//! credential into an authentication decision. Both are shared by the
//! session endpoints and the route guard in `feedfin_api`.

pub mod gate;
pub mod tokens;

use thiserror::Error;

/// Authentication errors.
///
/// `InvalidToken` deliberately carries no detail: forged, malformed and
/// expired tokens are indistinguishable to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("No credential presented")]
    NoCredential,

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid credentials")]
    BadCredentials,

    #[error("Internal error: {0}")]
    Internal(String),
}
