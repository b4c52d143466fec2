//! Signature trust contracts.
//!
//! This crate does not implement XML canonicalization or signature
//! cryptography. It defines the contracts of the external collaborators that
//! do - a trust engine evaluating whether a signature chains to a trusted
//! credential, and a prevalidator checking the signature's structure against
//! the XML signature profile - together with the [`Signature`] data those
//! collaborators consume.

use serde::{Deserialize, Serialize};

use crate::error::{SignatureProfileError, TrustEngineError};

/// XML signature algorithm URIs.
pub mod algorithms {
    /// RSA with SHA-256.
    pub const RSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";

    /// RSA with SHA-512.
    pub const RSA_SHA512: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha512";

    /// ECDSA with SHA-256.
    pub const ECDSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha256";

    /// SHA-256 digest.
    pub const SHA256: &str = "http://www.w3.org/2001/04/xmlenc#sha256";
}

/// An XML signature attached to a SAML object.
///
/// An opaque blob produced by the external XML layer; this crate never
/// interprets the cryptographic material, it only hands the signature to the
/// trust collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signature {
    /// The signature algorithm URI.
    pub algorithm: String,

    /// The digest algorithm URI.
    pub digest_algorithm: String,

    /// URI of the reference to the signed element.
    pub reference_uri: String,

    /// Base64 encoded digest value.
    pub digest_value: String,

    /// Base64 encoded signature value.
    pub signature_value: String,

    /// Base64 encoded X.509 certificate embedded in the KeyInfo, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x509_certificate: Option<String>,
}

impl Signature {
    /// Creates a new signature referencing the given element ID.
    #[must_use]
    pub fn new(reference_uri: impl Into<String>) -> Self {
        Self {
            algorithm: algorithms::RSA_SHA256.to_string(),
            digest_algorithm: algorithms::SHA256.to_string(),
            reference_uri: reference_uri.into(),
            digest_value: String::new(),
            signature_value: String::new(),
            x509_certificate: None,
        }
    }

    /// Sets the signature algorithm URI.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    /// Sets the embedded certificate.
    #[must_use]
    pub fn with_certificate(mut self, certificate_b64: impl Into<String>) -> Self {
        self.x509_certificate = Some(certificate_b64.into());
        self
    }
}

/// Key usage qualifier for credential resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyUsage {
    /// The credential is used for signing.
    Signing,

    /// The credential is used for encryption.
    Encryption,
}

/// Criteria guiding the trust engine's credential resolution.
///
/// Built by the signature check from the signed object's declared issuer and
/// a signing key-usage qualifier, unless the caller supplied a criteria set
/// through the validation context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriteriaSet {
    entity_id: Option<String>,
    usage: Option<KeyUsage>,
}

impl CriteriaSet {
    /// Creates an empty criteria set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity ID criterion.
    #[must_use]
    pub fn entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Adds a key usage criterion.
    #[must_use]
    pub const fn usage(mut self, usage: KeyUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Returns the entity ID criterion, if set.
    #[must_use]
    pub fn get_entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Returns the key usage criterion, if set.
    #[must_use]
    pub const fn get_usage(&self) -> Option<KeyUsage> {
        self.usage
    }
}

/// Trust evaluation of XML signatures.
///
/// Implementations resolve verification credentials for the criteria and
/// decide whether the signature chains to a trusted credential. They are
/// shared, read-only configuration and must be safe for concurrent use.
pub trait SignatureTrustEngine: Send + Sync {
    /// Evaluates the trust of a signature.
    ///
    /// Returns `Ok(true)` for a trusted signature, `Ok(false)` for a broken
    /// or untrusted one.
    ///
    /// # Errors
    ///
    /// Returns a [`TrustEngineError`] when trust could not be evaluated at
    /// all, e.g. because no credentials could be resolved.
    fn validate(&self, signature: &Signature, criteria: &CriteriaSet)
        -> Result<bool, TrustEngineError>;
}

/// Structural prevalidation of XML signatures.
///
/// Checks that a signature conforms to the SAML signature profile (digest
/// algorithm, reference shape) before any trust evaluation is attempted.
pub trait SignaturePrevalidator: Send + Sync {
    /// Validates the structure of a signature.
    ///
    /// # Errors
    ///
    /// Returns a [`SignatureProfileError`] describing the structural defect.
    fn validate(&self, signature: &Signature) -> Result<(), SignatureProfileError>;
}
