//! Session endpoint decision logic: refresh, login and logout.
//!
//! Each operation yields a [`SessionDirective`] describing what the transport
//! layer should do with the stored credential, what token (if any) to return
//! in the body, and whether the request succeeded.

use std::sync::Arc;

use tracing::warn;

use crate::auth::AuthError;
use crate::auth::gate::{AuthDecision, AuthGate};
use crate::auth::tokens::TokenCodec;
use crate::models::auth::Identity;
use crate::registry::UserRegistry;

/// What to do with the client's stored credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialUpdate {
    Unchanged,
    Replace(String),
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Success,
    Rejected(AuthError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDirective {
    pub credential: CredentialUpdate,
    pub token: Option<String>,
    pub status: SessionStatus,
}

impl SessionDirective {
    fn issued(token: String) -> Self {
        Self {
            credential: CredentialUpdate::Replace(token.clone()),
            token: Some(token),
            status: SessionStatus::Success,
        }
    }

    fn rejected(reason: AuthError, credential: CredentialUpdate) -> Self {
        Self {
            credential,
            token: None,
            status: SessionStatus::Rejected(reason),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SessionStatus::Success
    }
}

/// Session operations bound to one token codec.
#[derive(Debug, Clone)]
pub struct SessionService {
    codec: Arc<TokenCodec>,
    gate: AuthGate,
}

impl SessionService {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self {
            gate: AuthGate::new(codec.clone()),
            codec,
        }
    }

    pub fn gate(&self) -> &AuthGate {
        &self.gate
    }

    /// Re-issue the current credential if it is still valid.
    ///
    /// Any rejection clears the stored credential. `Err` is only returned
    /// when signing the replacement token fails.
    pub fn refresh(&self, current: Option<&str>) -> Result<SessionDirective, AuthError> {
        match self.gate.authenticate(current) {
            AuthDecision::Authenticated(identity) => self.issue(&identity),
            AuthDecision::Unauthenticated(reason) => {
                warn!(reason = %reason, "token refresh failed");
                Ok(SessionDirective::rejected(reason, CredentialUpdate::Clear))
            }
        }
    }

    /// Check a username/password pair against `registry` and issue a token.
    ///
    /// Failed logins leave the stored credential untouched.
    pub fn login(
        &self,
        registry: &dyn UserRegistry,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<SessionDirective, AuthError> {
        let (Some(username), Some(password)) = (
            username.filter(|u| !u.is_empty()),
            password.filter(|p| !p.is_empty()),
        ) else {
            return Ok(SessionDirective::rejected(
                AuthError::MissingField("username or password".into()),
                CredentialUpdate::Unchanged,
            ));
        };

        if !registry.verify(username, password) {
            warn!(username, "log in failed");
            return Ok(SessionDirective::rejected(
                AuthError::BadCredentials,
                CredentialUpdate::Unchanged,
            ));
        }

        self.issue(&Identity::new(username))
    }

    /// Blank the stored credential. Always succeeds.
    pub fn logout(&self) -> SessionDirective {
        SessionDirective {
            credential: CredentialUpdate::Clear,
            token: None,
            status: SessionStatus::Success,
        }
    }

    fn issue(&self, identity: &Identity) -> Result<SessionDirective, AuthError> {
        let token = self.codec.encode(&identity.claims())?;
        Ok(SessionDirective::issued(token))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::auth::tokens::{Claims, SigningAlgorithm};
    use crate::registry::InMemoryRegistry;

    fn service() -> SessionService {
        SessionService::new(Arc::new(TokenCodec::new(
            "porpoises",
            SigningAlgorithm::Hs512,
            Duration::days(1),
        )))
    }

    fn registry() -> InMemoryRegistry {
        InMemoryRegistry::with_users([("jo", "beans")])
    }

    fn issued_token(directive: &SessionDirective) -> String {
        match &directive.credential {
            CredentialUpdate::Replace(token) => token.clone(),
            other => panic!("expected a replacement credential, got {other:?}"),
        }
    }

    #[test]
    fn refresh_without_credential_is_unauthorized_and_clears() {
        let directive = service().refresh(None).unwrap();
        assert_eq!(
            directive.status,
            SessionStatus::Rejected(AuthError::NoCredential)
        );
        assert_eq!(directive.credential, CredentialUpdate::Clear);
        assert_eq!(directive.token, None);
    }

    #[test]
    fn refresh_with_garbage_is_invalid_and_clears() {
        let directive = service().refresh(Some("garbage")).unwrap();
        assert_eq!(
            directive.status,
            SessionStatus::Rejected(AuthError::InvalidToken)
        );
        assert_eq!(directive.credential, CredentialUpdate::Clear);
    }

    #[test]
    fn refresh_reissues_for_same_identity() {
        let service = service();
        let login = service
            .login(&registry(), Some("jo"), Some("beans"))
            .unwrap();
        let token = issued_token(&login);

        let refreshed = service.refresh(Some(&token)).unwrap();
        assert!(refreshed.is_success());
        let new_token = issued_token(&refreshed);
        assert_eq!(refreshed.token.as_deref(), Some(new_token.as_str()));
        assert_eq!(
            service.gate().authenticate(Some(&new_token)),
            AuthDecision::Authenticated(Identity::new("jo"))
        );
    }

    #[test]
    fn refresh_rejects_token_without_username() {
        let service = service();
        let token = service.gate().codec().encode(&Claims::new()).unwrap();
        let directive = service.refresh(Some(&token)).unwrap();
        assert_eq!(
            directive.status,
            SessionStatus::Rejected(AuthError::InvalidToken)
        );
        assert_eq!(directive.credential, CredentialUpdate::Clear);
    }

    #[test]
    fn login_success_issues_token() {
        let directive = service()
            .login(&registry(), Some("jo"), Some("beans"))
            .unwrap();
        assert!(directive.is_success());
        assert!(!issued_token(&directive).is_empty());
    }

    #[test]
    fn login_with_wrong_password_is_forbidden_without_mutation() {
        let directive = service()
            .login(&registry(), Some("jo"), Some("wrong"))
            .unwrap();
        assert_eq!(
            directive.status,
            SessionStatus::Rejected(AuthError::BadCredentials)
        );
        assert_eq!(directive.credential, CredentialUpdate::Unchanged);
        assert_eq!(directive.token, None);
    }

    #[test]
    fn login_with_missing_fields_is_missing_field() {
        let service = service();
        for (username, password) in [
            (None, Some("beans")),
            (Some("jo"), None),
            (Some(""), Some("beans")),
            (Some("jo"), Some("")),
        ] {
            let directive = service.login(&registry(), username, password).unwrap();
            assert!(matches!(
                directive.status,
                SessionStatus::Rejected(AuthError::MissingField(_))
            ));
            assert_eq!(directive.credential, CredentialUpdate::Unchanged);
        }
    }

    #[test]
    fn logout_always_succeeds() {
        let directive = service().logout();
        assert!(directive.is_success());
        assert_eq!(directive.credential, CredentialUpdate::Clear);
        assert_eq!(directive.token, None);
    }
}
