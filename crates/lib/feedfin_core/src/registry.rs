//! User registry consulted at login.
//!
//! A placeholder store of username/password pairs. There is no hashing and
//! no persistence.

use std::sync::{PoisonError, RwLock};

use tracing::info;

use crate::auth::AuthError;
use crate::models::auth::{UserRecord, UserSummary};

/// Capability interface over whatever holds the users.
pub trait UserRegistry: Send + Sync {
    /// True iff `username` exists with exactly `password`.
    fn verify(&self, username: &str, password: &str) -> bool;

    /// All users, in registration order.
    fn list(&self) -> Vec<UserSummary>;

    /// Register a user. Empty fields are rejected with `MissingField`.
    fn add(&self, username: &str, password: &str) -> Result<UserSummary, AuthError>;
}

/// Lock-guarded in-memory table.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    users: RwLock<Vec<UserRecord>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry pre-populated with `(username, password)` pairs.
    pub fn with_users<I, U, P>(users: I) -> Self
    where
        I: IntoIterator<Item = (U, P)>,
        U: Into<String>,
        P: Into<String>,
    {
        let users = users
            .into_iter()
            .map(|(username, password)| UserRecord {
                username: username.into(),
                password: password.into(),
            })
            .collect();
        Self {
            users: RwLock::new(users),
        }
    }
}

// The table is append-only, so a writer that panicked cannot have left it
// half-updated; poisoned locks are recovered.
impl UserRegistry for InMemoryRegistry {
    fn verify(&self, username: &str, password: &str) -> bool {
        if username.is_empty() {
            return false;
        }
        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|u| u.username == username && u.password == password)
    }

    fn list(&self) -> Vec<UserSummary> {
        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(UserRecord::summary)
            .collect()
    }

    fn add(&self, username: &str, password: &str) -> Result<UserSummary, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingField("username or password".into()));
        }
        let record = UserRecord {
            username: username.to_string(),
            password: password.to_string(),
        };
        let summary = record.summary();
        self.users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
        info!(username, "user added");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_user_verifies() {
        let registry = InMemoryRegistry::with_users([("jo", "beans")]);
        assert!(registry.verify("jo", "beans"));
        assert!(!registry.verify("jo", "wrong"));
        assert!(!registry.verify("sam", "beans"));
        assert!(!registry.verify("", ""));
    }

    #[test]
    fn added_users_are_listed_in_order() {
        let registry = InMemoryRegistry::with_users([("jo", "beans")]);
        let added = registry.add("sam", "toast").unwrap();
        assert_eq!(added.username, "sam");

        let names: Vec<String> = registry.list().into_iter().map(|u| u.username).collect();
        assert_eq!(names, ["jo", "sam"]);
        assert!(registry.verify("sam", "toast"));
    }

    #[test]
    fn empty_fields_are_missing() {
        let registry = InMemoryRegistry::new();
        assert!(matches!(
            registry.add("", "toast"),
            Err(AuthError::MissingField(_))
        ));
        assert!(matches!(
            registry.add("sam", ""),
            Err(AuthError::MissingField(_))
        ));
        assert!(registry.list().is_empty());
    }
}
