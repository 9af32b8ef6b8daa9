//! Types and client for the authorization server's admin API.
//!
//! The authorization server (ORY Hydra or compatible) owns login and consent
//! challenges; portale only fetches the request descriptor for a challenge and
//! accepts it, receiving the URL the end user must be redirected to.

pub mod client;

pub use self::client::{HydraAdmin, HydraClient};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Admin API configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct HydraConfig {
    admin_url: Url,
    timeout: Duration,
}

impl HydraConfig {
    /// Parse and validate the admin base URL.
    ///
    /// # Errors
    /// Returns an error for unparsable URLs or schemes other than http/https.
    pub fn new(admin_url: &str) -> Result<Self> {
        let url = Url::parse(admin_url)?;

        match url.scheme() {
            "http" | "https" => {}
            scheme => return Err(anyhow!("unsupported scheme: {scheme}")),
        }

        if url.host().is_none() {
            return Err(anyhow!("no host specified"));
        }

        Ok(Self {
            admin_url: url,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn admin_url(&self) -> &Url {
        &self.admin_url
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Failures talking to the admin API.
#[derive(Debug, Error)]
pub enum HydraError {
    /// Transport-level failure, the authorization server could not be reached.
    #[error("authorization server unreachable: {0}")]
    Unavailable(#[source] reqwest::Error),

    /// The server answered, but not with the expected shape or status.
    #[error("unexpected authorization server response: {0}")]
    Protocol(String),
}

/// Login request descriptor, fetched per challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub challenge: String,
    pub skip: bool,
    #[serde(default)]
    pub subject: Option<String>,
}

impl LoginRequest {
    /// Accept payload for the skip path: the subject is kept as-is and
    /// `remember` is only set when the server had not already skipped.
    #[must_use]
    pub fn accept_payload(&self) -> AcceptLoginPayload {
        AcceptLoginPayload {
            remember: !self.skip,
            remember_for: 0,
            subject: self.subject.clone(),
        }
    }
}

/// Consent request descriptor, fetched per challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentRequest {
    pub challenge: String,
    pub skip: bool,
    #[serde(default)]
    pub requested_scope: Vec<String>,
}

impl ConsentRequest {
    /// Accept payload granting the requested scopes verbatim.
    #[must_use]
    pub fn accept_payload(&self) -> AcceptConsentPayload {
        AcceptConsentPayload {
            remember: !self.skip,
            remember_for: 0,
            grant_scope: self.requested_scope.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptLoginPayload {
    pub remember: bool,
    pub remember_for: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl AcceptLoginPayload {
    /// Accept payload for a successful form submission: always remembered,
    /// with the authenticated email as subject.
    #[must_use]
    pub fn remembered(subject: String) -> Self {
        Self {
            remember: true,
            remember_for: 0,
            subject: Some(subject),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptConsentPayload {
    pub remember: bool,
    pub remember_for: i64,
    pub grant_scope: Vec<String>,
}

/// Where to send the end user next; returned by every accept call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Redirect {
    pub redirect_to: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_rejects_bad_urls() {
        assert!(HydraConfig::new("hydra.tld:4445").is_err());
        assert!(HydraConfig::new("ftp://hydra.tld").is_err());
        assert!(HydraConfig::new("").is_err());

        let config = HydraConfig::new("https://hydra.tld:4445").unwrap();
        assert_eq!(config.admin_url().as_str(), "https://hydra.tld:4445/");
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_login_accept_payload_skip_semantics() {
        let skipped = LoginRequest {
            challenge: "c1".to_string(),
            skip: true,
            subject: Some("a@b.com".to_string()),
        };
        let payload = skipped.accept_payload();
        assert!(!payload.remember);
        assert_eq!(payload.remember_for, 0);
        assert_eq!(payload.subject.as_deref(), Some("a@b.com"));

        let fresh = LoginRequest {
            challenge: "c1".to_string(),
            skip: false,
            subject: None,
        };
        assert!(fresh.accept_payload().remember);
    }

    #[test]
    fn test_consent_accept_payload_grants_requested_scope() {
        let request = ConsentRequest {
            challenge: "x".to_string(),
            skip: false,
            requested_scope: vec!["openid".to_string(), "email".to_string()],
        };
        let payload = request.accept_payload();
        assert!(payload.remember);
        assert_eq!(payload.remember_for, 0);
        assert_eq!(payload.grant_scope, vec!["openid", "email"]);
    }

    #[test]
    fn test_remembered_payload() {
        let payload = AcceptLoginPayload::remembered("a@b.com".to_string());
        assert!(payload.remember);
        assert_eq!(payload.remember_for, 0);
        assert_eq!(payload.subject.as_deref(), Some("a@b.com"));
    }

    #[test]
    fn test_wire_shapes() {
        let descriptor: LoginRequest =
            serde_json::from_str(r#"{"challenge":"abc","skip":false,"subject":null}"#).unwrap();
        assert_eq!(descriptor.challenge, "abc");
        assert!(descriptor.subject.is_none());

        // requested_scope is absent on login requests, present on consent
        let consent: ConsentRequest =
            serde_json::from_str(r#"{"challenge":"x","skip":true}"#).unwrap();
        assert!(consent.requested_scope.is_empty());

        let body = serde_json::to_value(AcceptLoginPayload {
            remember: false,
            remember_for: 0,
            subject: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"remember": false, "remember_for": 0}));

        let redirect: Redirect =
            serde_json::from_str(r#"{"redirect_to":"https://rp.tld/cb"}"#).unwrap();
        assert_eq!(redirect.redirect_to, "https://rp.tld/cb");
    }
}
