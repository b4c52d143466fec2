//! SAML metadata types.
//!
//! Read-only metadata snapshots for the two federation parties, provided by
//! the caller per validation. Only the pieces consulted by validation and
//! scope extraction are modeled; metadata resolution lives elsewhere.

use serde::{Deserialize, Serialize};

use crate::scope::Scope;

use super::constants::namespaces;

/// SAML metadata for a single entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDescriptor {
    /// The entity ID.
    pub entity_id: String,

    /// The IdP role descriptor, if the entity acts as an identity provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idp_sso_descriptor: Option<IdpSsoDescriptor>,

    /// The SP role descriptor, if the entity acts as a service provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sp_sso_descriptor: Option<SpSsoDescriptor>,
}

impl EntityDescriptor {
    /// Creates metadata for the given entity ID, with no roles.
    #[must_use]
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            idp_sso_descriptor: None,
            sp_sso_descriptor: None,
        }
    }

    /// Sets the IdP role descriptor.
    #[must_use]
    pub fn with_idp_descriptor(mut self, descriptor: IdpSsoDescriptor) -> Self {
        self.idp_sso_descriptor = Some(descriptor);
        self
    }

    /// Sets the SP role descriptor.
    #[must_use]
    pub fn with_sp_descriptor(mut self, descriptor: SpSsoDescriptor) -> Self {
        self.sp_sso_descriptor = Some(descriptor);
        self
    }
}

/// IdP role descriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdpSsoDescriptor {
    /// Whether the IdP requires signed authentication requests.
    #[serde(default)]
    pub want_authn_requests_signed: bool,

    /// Extension elements in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<MetadataExtension>,

    /// Single sign-on service endpoints.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub single_sign_on_services: Vec<Endpoint>,
}

impl IdpSsoDescriptor {
    /// Creates an empty IdP role descriptor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an extension element.
    #[must_use]
    pub fn with_extension(mut self, extension: MetadataExtension) -> Self {
        self.extensions.push(extension);
        self
    }

    /// Adds a Scope extension declaration.
    #[must_use]
    pub fn with_scope(self, scope: Scope) -> Self {
        self.with_extension(MetadataExtension::Scope(scope))
    }

    /// Adds a single sign-on endpoint.
    #[must_use]
    pub fn with_sso_service(mut self, endpoint: Endpoint) -> Self {
        self.single_sign_on_services.push(endpoint);
        self
    }
}

/// SP role descriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpSsoDescriptor {
    /// Whether the SP requires signed assertions.
    #[serde(default)]
    pub want_assertions_signed: bool,

    /// Assertion consumer service endpoints.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertion_consumer_services: Vec<Endpoint>,
}

impl SpSsoDescriptor {
    /// Creates an empty SP role descriptor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an assertion consumer endpoint.
    #[must_use]
    pub fn with_acs(mut self, endpoint: Endpoint) -> Self {
        self.assertion_consumer_services.push(endpoint);
        self
    }
}

/// A protocol endpoint declared in metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    /// The binding URI.
    pub binding: String,

    /// The endpoint location URL.
    pub location: String,
}

impl Endpoint {
    /// Creates a new endpoint.
    #[must_use]
    pub fn new(binding: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            binding: binding.into(),
            location: location.into(),
        }
    }
}

/// An extension element in a role descriptor's Extensions block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MetadataExtension {
    /// A Shibboleth Scope declaration.
    Scope(Scope),

    /// Any other extension element, kept as an uninterpreted XML element.
    Other(GenericXmlElement),
}

/// An uninterpreted XML element from a foreign object model.
///
/// Extension content this crate has no typed representation for. A generic
/// element carrying the Shibboleth Scope name can still participate in scope
/// matching through [`ScopeInfo`](crate::scope::ScopeInfo).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericXmlElement {
    /// The element's namespace URI.
    pub namespace: String,

    /// The element's local name.
    pub local_name: String,

    /// The element's text content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// The element's attributes in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, String)>,
}

impl GenericXmlElement {
    /// Creates a new element with the given name and no content.
    #[must_use]
    pub fn new(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local_name: local_name.into(),
            value: None,
            attributes: Vec::new(),
        }
    }

    /// Sets the text content.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Looks up an attribute value by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if this element carries the Shibboleth Scope name.
    #[must_use]
    pub fn is_scope_element(&self) -> bool {
        self.namespace == namespaces::SHIBBOLETH_METADATA && self.local_name == "Scope"
    }
}
