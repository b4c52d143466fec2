//! SAML AuthnRequest types.
//!
//! The original authentication request, kept for correlation checks against
//! the response's InResponseTo attribute.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SAML_VERSION;

/// SAML Authentication Request.
///
/// Only the parts of the request consulted during response validation are
/// modeled; request construction and encoding live elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthnRequest {
    /// Unique identifier for this request.
    pub id: String,

    /// Version of the SAML protocol (always "2.0").
    #[serde(default = "default_version")]
    pub version: String,

    /// Timestamp when this request was issued.
    pub issue_instant: DateTime<Utc>,

    /// The entity ID of the service provider that issued this request.
    pub issuer: String,

    /// The IdP endpoint the request was sent to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    /// The URL where the response should be delivered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertion_consumer_service_url: Option<String>,
}

fn default_version() -> String {
    SAML_VERSION.to_string()
}

impl AuthnRequest {
    /// Creates a new authentication request.
    #[must_use]
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            id: format!("_id{}", uuid::Uuid::new_v4()),
            version: SAML_VERSION.to_string(),
            issue_instant: Utc::now(),
            issuer: issuer.into(),
            destination: None,
            assertion_consumer_service_url: None,
        }
    }

    /// Sets the destination endpoint.
    #[must_use]
    pub fn with_destination(mut self, url: impl Into<String>) -> Self {
        self.destination = Some(url.into());
        self
    }

    /// Sets the assertion consumer service URL.
    #[must_use]
    pub fn with_acs_url(mut self, url: impl Into<String>) -> Self {
        self.assertion_consumer_service_url = Some(url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authn_request_creation() {
        let request = AuthnRequest::new("https://sp.example.com")
            .with_destination("https://idp.example.com/sso")
            .with_acs_url("https://sp.example.com/acs");

        assert!(!request.id.is_empty());
        assert_eq!(request.version, SAML_VERSION);
        assert_eq!(request.destination.as_deref(), Some("https://idp.example.com/sso"));
    }
}
