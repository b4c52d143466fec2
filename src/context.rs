//! The validation context carrier.
//!
//! A [`ValidationContext`] is an opaque, caller-populated bag of static
//! parameters consumed by every check, plus the ordered failure messages the
//! checks produce. One context is created per inbound message and lives for
//! a single validation pass; it is never shared between concurrent
//! validations.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::signature::CriteriaSet;
use crate::types::{AuthnRequest, EntityDescriptor};

/// Recognized parameter keys.
///
/// All keys are namespaced under [`params::STD_PREFIX`] so that a context
/// shared with an unrelated validation framework cannot collide.
pub mod params {
    /// The standard prefix for all SAML 2 parameter keys defined here.
    pub const STD_PREFIX: &str = "saml2";

    /// Carries a boolean telling whether validation is strict.
    pub const STRICT_VALIDATION: &str = "saml2.StrictValidation";

    /// Carries the entity ID of the expected issuer of an element.
    pub const EXPECTED_ISSUER: &str = "saml2.ExpectedIssuer";

    /// Carries a duration holding the maximum age of a received message.
    pub const MAX_AGE_RECEIVED_MESSAGE: &str = "saml2.MaxAgeReceivedMessage";

    /// Carries the timestamp for when the message being validated was received.
    pub const RECEIVE_INSTANT: &str = "saml2.ReceiveInstant";

    /// Carries the URL on which the message was received.
    pub const RECEIVE_URL: &str = "saml2.ReceiveURL";

    /// Carries the `AuthnRequest` that was sent to obtain the response.
    pub const AUTHN_REQUEST: &str = "saml2.AuthnRequest";

    /// Carries the ID attribute of the corresponding `AuthnRequest`.
    pub const AUTHN_REQUEST_ID: &str = "saml2.AuthnRequestID";

    /// Carries the SP metadata.
    pub const SP_METADATA: &str = "saml2.SpMetadata";

    /// Carries the IdP metadata.
    pub const IDP_METADATA: &str = "saml2.IdpMetadata";

    /// Carries a boolean telling whether a signature is required.
    pub const SIGNATURE_REQUIRED: &str = "saml2.SignatureRequired";

    /// Carries a criteria set overriding the issuer-derived trust criteria.
    pub const SIGNATURE_VALIDATION_CRITERIA_SET: &str = "saml2.SignatureValidationCriteriaSet";

    /// Carries a duration holding the maximum accepted clock skew.
    pub const ALLOWED_CLOCK_SKEW: &str = "saml2.AllowedClockSkew";

    /// Carries the issue instant of the response that contained the
    /// assertion being validated.
    pub const RESPONSE_ISSUE_INSTANT: &str = "saml2.ResponseIssueInstant";
}

/// Default maximum age of a received message, in seconds (3 minutes).
pub const DEFAULT_MAX_AGE_RECEIVED_MESSAGE_SECS: i64 = 180;

/// Default allowed clock skew, in seconds.
pub const DEFAULT_ALLOWED_CLOCK_SKEW_SECS: i64 = 30;

/// A typed parameter value stored in a [`ValidationContext`].
#[derive(Debug, Clone)]
pub enum ParameterValue {
    /// A boolean flag.
    Bool(bool),

    /// A string value.
    String(String),

    /// A duration.
    Duration(Duration),

    /// A point in time.
    Instant(DateTime<Utc>),

    /// A reference to the correlated authentication request.
    AuthnRequest(Arc<AuthnRequest>),

    /// A reference to a party's metadata.
    Metadata(Arc<EntityDescriptor>),

    /// A signature trust criteria set.
    Criteria(CriteriaSet),
}

/// Per-message validation parameters and accumulated failure messages.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    static_params: HashMap<String, ParameterValue>,
    failures: Vec<String>,
}

impl ValidationContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a builder for assembling a context.
    #[must_use]
    pub fn builder() -> ValidationContextBuilder {
        ValidationContextBuilder::default()
    }

    /// Inserts a static parameter, replacing any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: ParameterValue) {
        self.static_params.insert(key.into(), value);
    }

    /// Looks up a static parameter by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParameterValue> {
        self.static_params.get(key)
    }

    /// Appends a failure message. Messages are kept in insertion order and
    /// never cleared during a validation pass.
    pub fn add_failure(&mut self, message: impl Into<String>) {
        self.failures.push(message.into());
    }

    /// Returns the accumulated failure messages in order.
    #[must_use]
    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    /// Whether strict validation was requested. Defaults to `false`.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.bool_param(params::STRICT_VALIDATION).unwrap_or(false)
    }

    /// The expected issuer entity ID, if set.
    #[must_use]
    pub fn expected_issuer(&self) -> Option<&str> {
        self.string_param(params::EXPECTED_ISSUER)
    }

    /// The maximum tolerated age of a received message.
    ///
    /// Defaults to [`DEFAULT_MAX_AGE_RECEIVED_MESSAGE_SECS`].
    #[must_use]
    pub fn max_age_received_message(&self) -> Duration {
        self.duration_param(params::MAX_AGE_RECEIVED_MESSAGE)
            .unwrap_or_else(|| Duration::seconds(DEFAULT_MAX_AGE_RECEIVED_MESSAGE_SECS))
    }

    /// The maximum accepted clock skew.
    ///
    /// Defaults to [`DEFAULT_ALLOWED_CLOCK_SKEW_SECS`].
    #[must_use]
    pub fn allowed_clock_skew(&self) -> Duration {
        self.duration_param(params::ALLOWED_CLOCK_SKEW)
            .unwrap_or_else(|| Duration::seconds(DEFAULT_ALLOWED_CLOCK_SKEW_SECS))
    }

    /// When the message being validated was received, if known.
    #[must_use]
    pub fn receive_instant(&self) -> Option<DateTime<Utc>> {
        self.instant_param(params::RECEIVE_INSTANT)
    }

    /// The URL on which the message was received, if known.
    #[must_use]
    pub fn receive_url(&self) -> Option<&str> {
        self.string_param(params::RECEIVE_URL)
    }

    /// The correlated authentication request, if supplied.
    #[must_use]
    pub fn authn_request(&self) -> Option<&AuthnRequest> {
        match self.static_params.get(params::AUTHN_REQUEST) {
            Some(ParameterValue::AuthnRequest(request)) => Some(request),
            _ => None,
        }
    }

    /// The ID to correlate a response's InResponseTo against.
    ///
    /// Falls back to the ID of the supplied
    /// [`AuthnRequest`](params::AUTHN_REQUEST) object when the
    /// [`AuthnRequestID`](params::AUTHN_REQUEST_ID) key is not set.
    #[must_use]
    pub fn authn_request_id(&self) -> Option<&str> {
        self.string_param(params::AUTHN_REQUEST_ID)
            .or_else(|| self.authn_request().map(|request| request.id.as_str()))
    }

    /// The service provider's metadata, if supplied.
    #[must_use]
    pub fn sp_metadata(&self) -> Option<&EntityDescriptor> {
        self.metadata_param(params::SP_METADATA)
    }

    /// The identity provider's metadata, if supplied.
    #[must_use]
    pub fn idp_metadata(&self) -> Option<&EntityDescriptor> {
        self.metadata_param(params::IDP_METADATA)
    }

    /// Whether the object under validation must be signed. Defaults to `false`.
    #[must_use]
    pub fn signature_required(&self) -> bool {
        self.bool_param(params::SIGNATURE_REQUIRED).unwrap_or(false)
    }

    /// The caller-supplied signature trust criteria, if any.
    #[must_use]
    pub fn signature_validation_criteria(&self) -> Option<&CriteriaSet> {
        match self.static_params.get(params::SIGNATURE_VALIDATION_CRITERIA_SET) {
            Some(ParameterValue::Criteria(criteria)) => Some(criteria),
            _ => None,
        }
    }

    /// The issue instant of the response containing the assertion being
    /// validated, if set.
    #[must_use]
    pub fn response_issue_instant(&self) -> Option<DateTime<Utc>> {
        self.instant_param(params::RESPONSE_ISSUE_INSTANT)
    }

    fn bool_param(&self, key: &str) -> Option<bool> {
        match self.static_params.get(key) {
            Some(ParameterValue::Bool(value)) => Some(*value),
            _ => None,
        }
    }

    fn string_param(&self, key: &str) -> Option<&str> {
        match self.static_params.get(key) {
            Some(ParameterValue::String(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    fn duration_param(&self, key: &str) -> Option<Duration> {
        match self.static_params.get(key) {
            Some(ParameterValue::Duration(value)) => Some(*value),
            _ => None,
        }
    }

    fn instant_param(&self, key: &str) -> Option<DateTime<Utc>> {
        match self.static_params.get(key) {
            Some(ParameterValue::Instant(value)) => Some(*value),
            _ => None,
        }
    }

    fn metadata_param(&self, key: &str) -> Option<&EntityDescriptor> {
        match self.static_params.get(key) {
            Some(ParameterValue::Metadata(metadata)) => Some(metadata),
            _ => None,
        }
    }
}

/// Fluent builder for [`ValidationContext`] objects.
#[derive(Debug, Clone, Default)]
pub struct ValidationContextBuilder {
    params: HashMap<String, ParameterValue>,
}

impl ValidationContextBuilder {
    /// Tells whether strict validation should be performed.
    #[must_use]
    pub fn strict_validation(mut self, strict: bool) -> Self {
        self.params
            .insert(params::STRICT_VALIDATION.to_string(), ParameterValue::Bool(strict));
        self
    }

    /// Sets the expected issuer entity ID.
    #[must_use]
    pub fn expected_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.params.insert(
            params::EXPECTED_ISSUER.to_string(),
            ParameterValue::String(issuer.into()),
        );
        self
    }

    /// Sets the maximum tolerated age of a received message.
    #[must_use]
    pub fn max_age_received_message(mut self, max_age: Duration) -> Self {
        self.params.insert(
            params::MAX_AGE_RECEIVED_MESSAGE.to_string(),
            ParameterValue::Duration(max_age),
        );
        self
    }

    /// Sets the maximum accepted clock skew.
    #[must_use]
    pub fn allowed_clock_skew(mut self, skew: Duration) -> Self {
        self.params.insert(
            params::ALLOWED_CLOCK_SKEW.to_string(),
            ParameterValue::Duration(skew),
        );
        self
    }

    /// Sets the timestamp for when the message was received.
    #[must_use]
    pub fn receive_instant(mut self, instant: DateTime<Utc>) -> Self {
        self.params.insert(
            params::RECEIVE_INSTANT.to_string(),
            ParameterValue::Instant(instant),
        );
        self
    }

    /// Sets the URL on which the message was received.
    #[must_use]
    pub fn receive_url(mut self, url: impl Into<String>) -> Self {
        self.params.insert(
            params::RECEIVE_URL.to_string(),
            ParameterValue::String(url.into()),
        );
        self
    }

    /// Sets the correlated authentication request.
    #[must_use]
    pub fn authn_request(mut self, request: impl Into<Arc<AuthnRequest>>) -> Self {
        self.params.insert(
            params::AUTHN_REQUEST.to_string(),
            ParameterValue::AuthnRequest(request.into()),
        );
        self
    }

    /// Sets the ID of the corresponding authentication request.
    #[must_use]
    pub fn authn_request_id(mut self, id: impl Into<String>) -> Self {
        self.params.insert(
            params::AUTHN_REQUEST_ID.to_string(),
            ParameterValue::String(id.into()),
        );
        self
    }

    /// Sets the service provider's metadata.
    #[must_use]
    pub fn sp_metadata(mut self, metadata: impl Into<Arc<EntityDescriptor>>) -> Self {
        self.params.insert(
            params::SP_METADATA.to_string(),
            ParameterValue::Metadata(metadata.into()),
        );
        self
    }

    /// Sets the identity provider's metadata.
    #[must_use]
    pub fn idp_metadata(mut self, metadata: impl Into<Arc<EntityDescriptor>>) -> Self {
        self.params.insert(
            params::IDP_METADATA.to_string(),
            ParameterValue::Metadata(metadata.into()),
        );
        self
    }

    /// Tells whether the object under validation must be signed.
    #[must_use]
    pub fn signature_required(mut self, required: bool) -> Self {
        self.params.insert(
            params::SIGNATURE_REQUIRED.to_string(),
            ParameterValue::Bool(required),
        );
        self
    }

    /// Sets the signature trust criteria, overriding the issuer-derived default.
    #[must_use]
    pub fn signature_validation_criteria(mut self, criteria: CriteriaSet) -> Self {
        self.params.insert(
            params::SIGNATURE_VALIDATION_CRITERIA_SET.to_string(),
            ParameterValue::Criteria(criteria),
        );
        self
    }

    /// Sets the issue instant of the response containing the assertion
    /// being validated.
    #[must_use]
    pub fn response_issue_instant(mut self, instant: DateTime<Utc>) -> Self {
        self.params.insert(
            params::RESPONSE_ISSUE_INSTANT.to_string(),
            ParameterValue::Instant(instant),
        );
        self
    }

    /// Inserts an arbitrary static parameter.
    #[must_use]
    pub fn static_parameter(mut self, key: impl Into<String>, value: ParameterValue) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// Builds the context.
    #[must_use]
    pub fn build(self) -> ValidationContext {
        ValidationContext {
            static_params: self.params,
            failures: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let context = ValidationContext::new();
        assert!(!context.is_strict());
        assert!(!context.signature_required());
        assert_eq!(
            context.max_age_received_message(),
            Duration::seconds(DEFAULT_MAX_AGE_RECEIVED_MESSAGE_SECS)
        );
        assert_eq!(
            context.allowed_clock_skew(),
            Duration::seconds(DEFAULT_ALLOWED_CLOCK_SKEW_SECS)
        );
        assert!(context.expected_issuer().is_none());
        assert!(context.receive_instant().is_none());
    }

    #[test]
    fn builder_populates_typed_accessors() {
        let now = Utc::now();
        let context = ValidationContext::builder()
            .strict_validation(true)
            .expected_issuer("https://idp.example.com")
            .receive_instant(now)
            .receive_url("https://sp.example.com/acs")
            .max_age_received_message(Duration::minutes(10))
            .build();

        assert!(context.is_strict());
        assert_eq!(context.expected_issuer(), Some("https://idp.example.com"));
        assert_eq!(context.receive_instant(), Some(now));
        assert_eq!(context.receive_url(), Some("https://sp.example.com/acs"));
        assert_eq!(context.max_age_received_message(), Duration::minutes(10));
    }

    #[test]
    fn authn_request_id_falls_back_to_request_object() {
        let request = AuthnRequest::new("https://sp.example.com");
        let request_id = request.id.clone();

        let context = ValidationContext::builder().authn_request(request).build();
        assert_eq!(context.authn_request_id(), Some(request_id.as_str()));

        let context = ValidationContext::builder()
            .authn_request(AuthnRequest::new("https://sp.example.com"))
            .authn_request_id("_explicit")
            .build();
        assert_eq!(context.authn_request_id(), Some("_explicit"));
    }

    #[test]
    fn failures_accumulate_in_order() {
        let mut context = ValidationContext::new();
        context.add_failure("first");
        context.add_failure("second");
        assert_eq!(context.failures(), ["first", "second"]);
    }

    #[test]
    fn keys_are_namespaced() {
        assert!(params::EXPECTED_ISSUER.starts_with(params::STD_PREFIX));
        assert!(params::RECEIVE_INSTANT.starts_with(params::STD_PREFIX));
    }
}
