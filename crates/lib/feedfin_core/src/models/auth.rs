//! Authentication domain models.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::tokens::Claims;

/// Claim naming the authenticated principal.
pub const USERNAME_CLAIM: &str = "username";

/// The principal carried by a valid token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
}

impl Identity {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    /// Extract the identity from decoded claims.
    ///
    /// Returns `None` when `username` is absent, not a string, or empty.
    pub fn from_claims(claims: &Claims) -> Option<Self> {
        match claims.get(USERNAME_CLAIM) {
            Some(Value::String(username)) if !username.is_empty() => Some(Self::new(username)),
            _ => None,
        }
    }

    /// The claims a freshly minted token for this identity carries.
    pub fn claims(&self) -> Claims {
        let mut claims = Claims::new();
        claims.insert(USERNAME_CLAIM.into(), Value::from(self.username.clone()));
        claims
    }
}

/// A registered user as exposed outside the registry (no password).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub username: String,
}

/// A registry entry. Passwords are stored as given.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub username: String,
    pub password: String,
}

impl UserRecord {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            username: self.username.clone(),
        }
    }
}
