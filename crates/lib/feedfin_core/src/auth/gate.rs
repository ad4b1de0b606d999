//! Request-level authentication decision.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::AuthError;
use super::tokens::TokenCodec;
use crate::models::auth::Identity;

/// Outcome of checking a presented credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    Authenticated(Identity),
    Unauthenticated(AuthError),
}

impl AuthDecision {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthDecision::Authenticated(_))
    }
}

/// Maps a presented credential to an [`AuthDecision`].
///
/// Holds no mutable state; clones share the same codec.
#[derive(Debug, Clone)]
pub struct AuthGate {
    codec: Arc<TokenCodec>,
}

impl AuthGate {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn authenticate(&self, credential: Option<&str>) -> AuthDecision {
        self.authenticate_at(credential, Utc::now())
    }

    /// Decide as of `now`.
    ///
    /// A token that verifies but names no user is rejected exactly like a
    /// forged one.
    pub fn authenticate_at(&self, credential: Option<&str>, now: DateTime<Utc>) -> AuthDecision {
        let token = match credential.map(str::trim) {
            Some(token) if !token.is_empty() => token,
            _ => return AuthDecision::Unauthenticated(AuthError::NoCredential),
        };

        let claims = match self.codec.decode_at(token, now) {
            Ok(claims) => claims,
            Err(e) => return AuthDecision::Unauthenticated(e),
        };

        match Identity::from_claims(&claims) {
            Some(identity) => AuthDecision::Authenticated(identity),
            None => {
                debug!("token carries no username");
                AuthDecision::Unauthenticated(AuthError::InvalidToken)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use serde_json::json;

    use super::*;
    use crate::auth::tokens::{Claims, SigningAlgorithm};

    fn codec() -> Arc<TokenCodec> {
        Arc::new(TokenCodec::new(
            "porpoises",
            SigningAlgorithm::Hs512,
            Duration::days(1),
        ))
    }

    fn claims(value: serde_json::Value) -> Claims {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn missing_or_blank_credential_is_no_credential() {
        let gate = AuthGate::new(codec());
        for credential in [None, Some(""), Some("   ")] {
            assert_eq!(
                gate.authenticate(credential),
                AuthDecision::Unauthenticated(AuthError::NoCredential)
            );
        }
    }

    #[test]
    fn valid_token_is_authenticated() {
        let codec = codec();
        let gate = AuthGate::new(codec.clone());
        let token = codec.encode(&claims(json!({"username": "jo"}))).unwrap();

        assert_eq!(
            gate.authenticate(Some(&token)),
            AuthDecision::Authenticated(Identity::new("jo"))
        );
    }

    #[test]
    fn incomplete_claims_are_rejected_like_forged_tokens() {
        let codec = codec();
        let gate = AuthGate::new(codec.clone());
        let forger = TokenCodec::new("dolphins", SigningAlgorithm::Hs512, Duration::days(1));

        let empty = codec.encode(&Claims::new()).unwrap();
        let blank = codec.encode(&claims(json!({"username": ""}))).unwrap();
        let forged = forger.encode(&claims(json!({"username": "jo"}))).unwrap();

        let forged_decision = gate.authenticate(Some(&forged));
        assert_eq!(
            forged_decision,
            AuthDecision::Unauthenticated(AuthError::InvalidToken)
        );
        assert_eq!(gate.authenticate(Some(&empty)), forged_decision);
        assert_eq!(gate.authenticate(Some(&blank)), forged_decision);
    }

    #[test]
    fn expired_token_is_invalid() {
        let codec = codec();
        let gate = AuthGate::new(codec.clone());
        let issued = Utc::now() - Duration::days(2);
        let token = codec
            .encode_at(&claims(json!({"username": "jo"})), issued)
            .unwrap();

        assert_eq!(
            gate.authenticate(Some(&token)),
            AuthDecision::Unauthenticated(AuthError::InvalidToken)
        );
    }

    #[test]
    fn gate_is_shareable_across_threads() {
        let codec = codec();
        let gate = AuthGate::new(codec.clone());
        let token = codec.encode(&claims(json!({"username": "jo"}))).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let gate = gate.clone();
                let token = token.clone();
                std::thread::spawn(move || gate.authenticate(Some(&token)).is_authenticated())
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
