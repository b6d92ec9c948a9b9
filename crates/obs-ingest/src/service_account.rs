//! Service-account credentials for the Drive source.
//!
//! The JSON key issued for a service account is turned into a short-lived
//! access token with the OAuth 2.0 JWT-bearer grant: a signed assertion is
//! posted to the key's `token_uri` and the returned `access_token` is used as
//! the bearer token for listing and downloads.

use std::fs;
use std::path::{Path, PathBuf};

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode, get_current_timestamp};
use serde::{Deserialize, Serialize};

use crate::drive::TokenProvider;
use crate::error::{IngestError, Result};
use crate::http::HttpClient;

/// Read-only access to Drive files.
pub const DRIVE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime of a signed assertion. The token endpoint accepts at most an hour.
const ASSERTION_LIFETIME_SECS: u64 = 3600;

/// The fields of a service-account key file this crate needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| IngestError::unavailable(path.display(), e))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            IngestError::unavailable(path.display(), format!("invalid service account key: {e}"))
        })
    }

    /// Signs a JWT-bearer assertion for `scope`, issued at `issued_at`
    /// (seconds since the Unix epoch).
    pub fn assertion(&self, scope: &str, issued_at: u64) -> Result<String> {
        let claims = Claims {
            iss: &self.client_email,
            scope,
            aud: &self.token_uri,
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid.clone_from(&self.private_key_id);

        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| self.credential_error(e))?;
        encode(&header, &claims, &key).map_err(|e| self.credential_error(e))
    }

    fn credential_error(&self, reason: impl std::fmt::Display) -> IngestError {
        IngestError::unavailable(format!("service account {}", self.client_email), reason)
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchanges a service-account key for an access token on every load.
#[derive(Debug, Clone)]
pub struct ServiceAccountToken {
    key_file: PathBuf,
    scope: String,
}

impl ServiceAccountToken {
    /// A provider for read-only Drive access.
    pub fn new(key_file: impl Into<PathBuf>) -> Self {
        Self {
            key_file: key_file.into(),
            scope: DRIVE_READONLY_SCOPE.to_string(),
        }
    }
}

impl TokenProvider for ServiceAccountToken {
    fn bearer_token(&self, client: &dyn HttpClient) -> Result<String> {
        let key = ServiceAccountKey::from_file(&self.key_file)?;
        let assertion = key.assertion(&self.scope, get_current_timestamp())?;

        let body = client.post_form(
            &key.token_uri,
            &[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())],
        )?;
        let response: TokenResponse = serde_json::from_slice(&body)
            .map_err(|e| key.credential_error(format!("invalid token response: {e}")))?;

        tracing::debug!(client_email = %key.client_email, "obtained drive access token");
        Ok(response.access_token)
    }
}
