//! Operator login gate.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::AuthSettings;

/// Environment variable holding the operator password.
pub const PASSWORD_ENV: &str = "OBS_PASSWORD";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("login required: pass --user and set {PASSWORD_ENV}")]
    MissingCredentials,

    #[error("invalid user name or password")]
    InvalidCredentials,
}

/// Checks operator credentials.
pub trait CredentialStore {
    /// Whether any user is configured. A disabled store lets everyone in.
    fn is_enabled(&self) -> bool;

    fn verify(&self, user: &str, password: &str) -> bool;
}

/// Lowercase hex SHA-256 of a password.
pub fn password_digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Users with SHA-256 password digests, as kept in the settings file.
#[derive(Debug, Clone, Default)]
pub struct Sha256Store {
    users: BTreeMap<String, String>,
}

impl Sha256Store {
    pub fn new(users: BTreeMap<String, String>) -> Self {
        Self { users }
    }

    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self::new(settings.users.clone())
    }
}

impl CredentialStore for Sha256Store {
    fn is_enabled(&self) -> bool {
        !self.users.is_empty()
    }

    fn verify(&self, user: &str, password: &str) -> bool {
        self.users
            .get(user)
            .is_some_and(|expected| expected.trim().eq_ignore_ascii_case(&password_digest(password)))
    }
}

/// Runs the login gate.
///
/// Returns the authenticated user, or `None` when the gate is disabled.
pub fn authenticate(
    store: &dyn CredentialStore,
    user: Option<&str>,
    password: Option<&str>,
) -> Result<Option<String>, AuthError> {
    if !store.is_enabled() {
        return Ok(None);
    }
    let (Some(user), Some(password)) = (user, password) else {
        return Err(AuthError::MissingCredentials);
    };
    if store.verify(user, password) {
        info!(user, "operator authenticated");
        Ok(Some(user.to_string()))
    } else {
        warn!(user, "login rejected");
        Err(AuthError::InvalidCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Sha256Store {
        Sha256Store::new(BTreeMap::from([(
            "gestor".to_string(),
            password_digest("s3nha"),
        )]))
    }

    #[test]
    fn test_digest_is_hex_sha256() {
        assert_eq!(
            password_digest("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_verify() {
        let store = store();
        assert!(store.verify("gestor", "s3nha"));
        assert!(!store.verify("gestor", "senha"));
        assert!(!store.verify("outro", "s3nha"));
    }

    #[test]
    fn test_disabled_gate_lets_everyone_in() {
        let store = Sha256Store::default();
        assert_eq!(authenticate(&store, None, None), Ok(None));
    }

    #[test]
    fn test_authenticate() {
        let store = store();
        assert_eq!(
            authenticate(&store, Some("gestor"), Some("s3nha")),
            Ok(Some("gestor".to_string()))
        );
        assert_eq!(
            authenticate(&store, Some("gestor"), None),
            Err(AuthError::MissingCredentials)
        );
        assert_eq!(
            authenticate(&store, Some("gestor"), Some("x")),
            Err(AuthError::InvalidCredentials)
        );
    }
}
