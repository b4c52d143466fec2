//! SAML 2.0 constants.

/// The SAML protocol version handled by this crate.
pub const SAML_VERSION: &str = "2.0";

/// XML namespace URIs.
pub mod namespaces {
    /// SAML 2.0 protocol namespace.
    pub const PROTOCOL: &str = "urn:oasis:names:tc:SAML:2.0:protocol";

    /// SAML 2.0 assertion namespace.
    pub const ASSERTION: &str = "urn:oasis:names:tc:SAML:2.0:assertion";

    /// SAML 2.0 metadata namespace.
    pub const METADATA: &str = "urn:oasis:names:tc:SAML:2.0:metadata";

    /// Shibboleth metadata extension namespace (carries the Scope element).
    pub const SHIBBOLETH_METADATA: &str = "urn:mace:shibboleth:metadata:1.0";
}

/// SAML 2.0 status code URIs.
pub mod status_codes {
    /// The request succeeded.
    pub const SUCCESS: &str = "urn:oasis:names:tc:SAML:2.0:status:Success";

    /// The request could not be performed due to an error on the requester.
    pub const REQUESTER: &str = "urn:oasis:names:tc:SAML:2.0:status:Requester";

    /// The request could not be performed due to an error on the responder.
    pub const RESPONDER: &str = "urn:oasis:names:tc:SAML:2.0:status:Responder";

    /// The responder does not support the requested SAML version.
    pub const VERSION_MISMATCH: &str = "urn:oasis:names:tc:SAML:2.0:status:VersionMismatch";

    /// The responding provider was unable to authenticate the principal.
    pub const AUTHN_FAILED: &str = "urn:oasis:names:tc:SAML:2.0:status:AuthnFailed";
}
