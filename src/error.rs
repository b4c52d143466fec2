//! Error types for SAML validation.
//!
//! Provides the exception taxonomy for validation outcomes, signature trust
//! evaluation, scope extraction and replay checking.

use thiserror::Error;

use crate::validation::Validity;

/// Error wrapping a non-valid [`Validity`].
///
/// Used by callers that need the specific enumerated outcome of a validation
/// rather than a free-text message. Cannot represent a valid outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationResultError {
    /// The validation returned an active INVALID finding.
    #[error("validation result was INVALID")]
    Invalid,

    /// The validation could not be evaluated.
    #[error("validation result was INDETERMINATE")]
    Indeterminate,
}

impl ValidationResultError {
    /// Creates an error from a validity, or `None` for [`Validity::Valid`].
    #[must_use]
    pub fn from_validity(validity: Validity) -> Option<Self> {
        match validity {
            Validity::Valid => None,
            Validity::Invalid => Some(Self::Invalid),
            Validity::Indeterminate => Some(Self::Indeterminate),
        }
    }

    /// Returns the wrapped validation result.
    #[must_use]
    pub const fn validity(&self) -> Validity {
        match self {
            Self::Invalid => Validity::Invalid,
            Self::Indeterminate => Validity::Indeterminate,
        }
    }
}

/// Validation failure carrying the rejected object.
///
/// Raised by the composite validators so that error handlers can log or
/// inspect the exact rejected input without re-parsing it. The accumulated
/// failure messages are kept in the order the checks produced them.
#[derive(Debug, Error)]
#[error("{object_name} validation failed ({validity}): {}", self.message())]
pub struct ValidationError<T: std::fmt::Debug> {
    validity: Validity,
    messages: Vec<String>,
    object_name: &'static str,
    object: Box<T>,
}

/// Validation error for a rejected [`Response`](crate::types::Response).
pub type ResponseValidationError = ValidationError<crate::types::Response>;

/// Validation error for a rejected [`Assertion`](crate::types::Assertion).
pub type AssertionValidationError = ValidationError<crate::types::Assertion>;

impl<T: std::fmt::Debug> ValidationError<T> {
    /// Creates a new validation error.
    ///
    /// `validity` must not be [`Validity::Valid`].
    #[must_use]
    pub fn new(
        validity: Validity,
        messages: Vec<String>,
        object_name: &'static str,
        object: T,
    ) -> Self {
        debug_assert!(validity != Validity::Valid);
        Self {
            validity,
            messages,
            object_name,
            object: Box::new(object),
        }
    }

    /// Returns the overall validation verdict.
    #[must_use]
    pub const fn validity(&self) -> Validity {
        self.validity
    }

    /// Returns the collected failure messages in check order.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Returns the rejected object.
    #[must_use]
    pub fn object(&self) -> &T {
        &self.object
    }

    /// Consumes the error, returning the rejected object.
    #[must_use]
    pub fn into_object(self) -> T {
        *self.object
    }

    /// Returns the failure messages joined into a single line.
    #[must_use]
    pub fn message(&self) -> String {
        self.messages.join(" - ")
    }
}

/// Signature trust engine errors.
///
/// A trust engine error means the trust of a signature could not be
/// evaluated; the signature check reports this as INDETERMINATE rather
/// than INVALID.
#[derive(Debug, Clone, Error)]
pub enum TrustEngineError {
    /// No verification credentials could be resolved for the signer.
    #[error("no credentials could be resolved for '{0}'")]
    CredentialNotFound(String),

    /// The credential resolver failed.
    #[error("credential resolver failure: {0}")]
    Resolver(String),
}

/// Structural signature profile errors.
///
/// Raised by the signature prevalidator before any trust evaluation is
/// attempted; a profile error always renders the signed object INVALID.
#[derive(Debug, Clone, Error)]
pub enum SignatureProfileError {
    /// The digest algorithm is not acceptable.
    #[error("unsupported digest algorithm: {0}")]
    UnsupportedDigestAlgorithm(String),

    /// The signature algorithm is not acceptable.
    #[error("unsupported signature algorithm: {0}")]
    UnsupportedSignatureAlgorithm(String),

    /// The signature reference does not point at the signed object.
    #[error("invalid signature reference: {0}")]
    InvalidReference(String),

    /// Any other violation of the signature profile.
    #[error("invalid signature profile: {0}")]
    Profile(String),
}

/// Metadata processing errors.
#[derive(Debug, Clone, Error)]
pub enum MetadataError {
    /// An extension element claimed to be a Scope declaration but could not
    /// be read as one. This indicates a deployment/integration bug, not an
    /// authorization outcome.
    #[error("not a valid Scope extension: {0}")]
    InvalidScopeExtension(String),
}

/// A message ID was replayed within its replay window.
#[derive(Debug, Clone, Error)]
#[error("message replay check of ID '{0}' failed")]
pub struct MessageReplayError(String);

impl MessageReplayError {
    /// Creates a new replay error for the given message ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the replayed message ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_result_error_from_validity() {
        assert!(ValidationResultError::from_validity(Validity::Valid).is_none());
        assert_eq!(
            ValidationResultError::from_validity(Validity::Invalid),
            Some(ValidationResultError::Invalid)
        );
        assert_eq!(
            ValidationResultError::from_validity(Validity::Indeterminate)
                .map(|e| e.validity()),
            Some(Validity::Indeterminate)
        );
    }

    #[test]
    fn validation_error_joins_messages() {
        let err = ValidationError::new(
            Validity::Invalid,
            vec!["first failure".to_string(), "second failure".to_string()],
            "Response",
            (),
        );
        assert_eq!(err.message(), "first failure - second failure");
        assert_eq!(err.messages().len(), 2);
        assert_eq!(err.validity(), Validity::Invalid);
    }
}
