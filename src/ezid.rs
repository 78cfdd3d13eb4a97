//! Persistent identifier registration client.
//!
//! A thin wrapper over the EZID API: it points an existing identifier at a new
//! target URL and looks up an identifier's registered metadata. The API
//! authenticates with HTTP basic auth, so the client only ever speaks HTTPS.
//! Construction rejects any other scheme and the underlying `reqwest` client
//! is built with `https_only(true)`.
//!
//! # Examples
//!
//! ```ignore
//! use etdsaf::ezid::{Credentials, EzidClient};
//!
//! let client = EzidClient::new()?;
//! let creds = Credentials::new("apiuser", "secret");
//! if !client.update_target("ark:/99999/fk4test", "https://example.org/item/1", &creds) {
//!     eprintln!("target update failed");
//! }
//! # Ok::<(), etdsaf::SafError>(())
//! ```

use std::fmt;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::error::{Result, SafError};

/// EZID identifier endpoint.
pub const EZID_API_HOST: &str = "https://ezid.cdlib.org/id/";

/// Basic-auth credentials for the registration service.
#[derive(Clone)]
pub struct Credentials {
    /// Account name
    pub username: String,
    /// Account password
    pub password: String,
}

impl Credentials {
    /// Create credentials from a username and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Request body that changes an identifier's `_target`.
#[must_use]
pub fn target_update_body(target: &str) -> String {
    format!("_target: {target}")
}

/// HTTPS-only client for the identifier registration service.
#[derive(Debug, Clone)]
pub struct EzidClient {
    base_url: String,
    http: Client,
}

impl EzidClient {
    /// Create a client for the public EZID endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SafError::Registration`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_base_url(EZID_API_HOST)
    }

    /// Create a client for another EZID-compatible endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SafError::Registration`] if `base_url` is not an `https://`
    /// URL or the HTTP client cannot be built.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        if !base_url.to_ascii_lowercase().starts_with("https://") {
            return Err(SafError::Registration(format!(
                "refusing non-HTTPS endpoint {base_url}"
            )));
        }
        let http = Client::builder()
            .https_only(true)
            .build()
            .map_err(|e| SafError::Registration(e.to_string()))?;
        let mut base_url = base_url.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(EzidClient { base_url, http })
    }

    /// Full URL of an identifier.
    #[must_use]
    pub fn identifier_url(&self, identifier: &str) -> String {
        format!("{}{identifier}", self.base_url)
    }

    /// Point `identifier` at `target`. Returns whether the service accepted it.
    pub fn update_target(&self, identifier: &str, target: &str, credentials: &Credentials) -> bool {
        let url = self.identifier_url(identifier);
        let response = self
            .http
            .post(&url)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .header(CONTENT_TYPE, "text/plain; charset=UTF-8")
            .body(target_update_body(target))
            .send();
        match response {
            Ok(resp) if resp.status() == StatusCode::OK => {
                debug!(%identifier, %target, "target updated");
                true
            },
            Ok(resp) => {
                warn!(%identifier, status = %resp.status(), "target update rejected");
                false
            },
            Err(e) => {
                warn!(%identifier, error = %e, "target update failed");
                false
            },
        }
    }

    /// Fetch the registered metadata of `identifier`, or `None` on any failure.
    #[must_use]
    pub fn lookup(&self, identifier: &str) -> Option<String> {
        let resp = self
            .http
            .get(self.identifier_url(identifier))
            .send()
            .map_err(|e| warn!(%identifier, error = %e, "lookup failed"))
            .ok()?;
        if resp.status() != StatusCode::OK {
            warn!(%identifier, status = %resp.status(), "lookup rejected");
            return None;
        }
        resp.text().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_plain_http() {
        let err = EzidClient::with_base_url("http://ezid.cdlib.org/id/").unwrap_err();
        assert!(matches!(err, SafError::Registration(_)));
    }

    #[test]
    fn test_identifier_url() {
        let client = EzidClient::with_base_url("https://ezid.example.org/id").expect("client");
        assert_eq!(
            client.identifier_url("ark:/99999/fk4"),
            "https://ezid.example.org/id/ark:/99999/fk4"
        );
    }

    #[test]
    fn test_default_endpoint() {
        let client = EzidClient::new().expect("client");
        assert!(client.identifier_url("doi:10.1/x").starts_with(EZID_API_HOST));
    }

    #[test]
    fn test_target_update_body() {
        assert_eq!(
            target_update_body("https://knowledge.uchicago.edu/record/1"),
            "_target: https://knowledge.uchicago.edu/record/1"
        );
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::new("apiuser", "hunter2");
        let shown = format!("{creds:?}");
        assert!(shown.contains("apiuser"));
        assert!(!shown.contains("hunter2"));
    }
}
