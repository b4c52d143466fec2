//! Scoped attribute authorization.
//!
//! An identity provider declares the scopes (security domains) it is
//! authoritative for through Shibboleth `Scope` extension elements in its
//! metadata. A scoped attribute value of the form `local@domain` is
//! authorized when its domain part matches one of those declarations, either
//! literally or as a regular expression.
//!
//! Matching is deliberately conservative: a blank value, a value without a
//! `@`, a blank scope declaration or a malformed regular expression all
//! answer "not authorized" - never an error.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::MetadataError;
use crate::types::{Attribute, EntityDescriptor, GenericXmlElement, MetadataExtension};

/// A Shibboleth Scope declaration from IdP metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    /// The scope value, a domain or a regular expression over domains.
    pub value: String,

    /// Whether the value is a regular expression.
    #[serde(default)]
    pub regexp: bool,
}

impl Scope {
    /// Creates a literal scope declaration.
    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            regexp: false,
        }
    }

    /// Creates a regular-expression scope declaration.
    #[must_use]
    pub fn regexp(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            regexp: true,
        }
    }
}

/// Anything that can act as a scope declaration.
///
/// Implemented by the typed [`Scope`] and by [`GenericXmlElement`]s carrying
/// the Shibboleth Scope element name, so that metadata whose extensions were
/// not unmarshalled into typed objects still participates in matching.
pub trait ScopeInfo {
    /// Whether the scope value is a regular expression.
    fn is_regexp(&self) -> bool;

    /// The scope value. `None` when the declaration carries no value.
    fn value(&self) -> Option<&str>;
}

impl ScopeInfo for Scope {
    fn is_regexp(&self) -> bool {
        self.regexp
    }

    fn value(&self) -> Option<&str> {
        Some(&self.value)
    }
}

impl ScopeInfo for GenericXmlElement {
    fn is_regexp(&self) -> bool {
        matches!(self.attribute("regexp"), Some("true") | Some("1"))
    }

    fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// Extracts the scope declarations from an entity's IdP metadata.
///
/// Returns an empty list when the entity has no IdP role or declares no
/// scopes. Generic extension elements carrying the Scope element name are
/// converted to typed [`Scope`]s.
///
/// # Errors
///
/// Returns [`MetadataError::InvalidScopeExtension`] when an element named
/// Scope carries no value. This indicates broken metadata, not a negative
/// authorization outcome.
pub fn scope_declarations(metadata: &EntityDescriptor) -> Result<Vec<Scope>, MetadataError> {
    let Some(idp) = metadata.idp_sso_descriptor.as_ref() else {
        return Ok(Vec::new());
    };
    let mut scopes = Vec::new();
    for extension in &idp.extensions {
        match extension {
            MetadataExtension::Scope(scope) => scopes.push(scope.clone()),
            MetadataExtension::Other(element) if element.is_scope_element() => {
                let value = element.value().filter(|v| !v.trim().is_empty()).ok_or_else(|| {
                    MetadataError::InvalidScopeExtension(format!(
                        "Scope element of '{}' has no value",
                        metadata.entity_id
                    ))
                })?;
                scopes.push(Scope {
                    value: value.to_string(),
                    regexp: element.is_regexp(),
                });
            }
            MetadataExtension::Other(_) => {}
        }
    }
    Ok(scopes)
}

/// Tells whether a scoped attribute value matches a scope declaration.
///
/// The value is split at its first `@`; the remainder is the domain part,
/// which is compared against the declaration. A regular expression
/// declaration must match the entire domain part. A value without a `@`, a
/// blank value or scope, or a malformed pattern never match.
pub fn is_match<S: ScopeInfo + ?Sized>(scope: &S, value: &str) -> bool {
    if value.trim().is_empty() {
        return false;
    }
    let Some((_, domain)) = value.split_once('@') else {
        tracing::info!(%value, "attribute value is not a scoped value");
        return false;
    };
    let Some(scope_value) = scope.value().filter(|v| !v.trim().is_empty()) else {
        return false;
    };
    if scope.is_regexp() {
        // Anchor the pattern so that it must cover the whole domain part.
        match Regex::new(&format!("^(?:{scope_value})$")) {
            Ok(pattern) => pattern.is_match(domain),
            Err(error) => {
                tracing::warn!(pattern = %scope_value, %error, "invalid regexp in Scope declaration");
                false
            }
        }
    } else {
        domain == scope_value
    }
}

/// Tells whether a single scoped value is authorized under any of the given
/// scope declarations.
pub fn is_value_authorized<S: ScopeInfo>(value: &str, scopes: &[S]) -> bool {
    scopes.iter().any(|scope| is_match(scope, value))
}

/// Tells whether all values of a scoped attribute are authorized under the
/// given scope declarations.
///
/// Every value must match at least one declaration. An attribute with no
/// values is never authorized.
pub fn is_authorized<S: ScopeInfo>(attribute: &Attribute, scopes: &[S]) -> bool {
    if attribute.values.is_empty() {
        tracing::info!(attribute = %attribute.name, "attribute has no values to authorize");
        return false;
    }
    attribute
        .values
        .iter()
        .all(|value| is_value_authorized(value, scopes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{namespaces, IdpSsoDescriptor};

    #[test]
    fn literal_match() {
        let scope = Scope::literal("example.com");
        assert!(is_match(&scope, "kalle@example.com"));
        assert!(!is_match(&scope, "kalle@examples.com"));
        assert!(!is_match(&scope, "kalle@sub.example.com"));
    }

    #[test]
    fn value_splits_at_first_at_sign() {
        // The domain part of "kalle@example@.com" is "example@.com".
        let scope = Scope::literal("example@.com");
        assert!(is_match(&scope, "kalle@example@.com"));
        assert!(!is_match(&Scope::literal("example.com"), "kalle@example@.com"));
    }

    #[test]
    fn unscoped_and_blank_values_never_match() {
        let scope = Scope::literal("example.com");
        assert!(!is_match(&scope, "example.com"));
        assert!(!is_match(&scope, ""));
        assert!(!is_match(&scope, "   "));
    }

    #[test]
    fn regexp_match_covers_whole_domain() {
        let scope = Scope::regexp(r"example\.(com|org)");
        assert!(is_match(&scope, "kalle@example.com"));
        assert!(is_match(&scope, "kalle@example.org"));
        assert!(!is_match(&scope, "kalle@example.net"));
        // Partial matches do not count.
        assert!(!is_match(&scope, "kalle@sub.example.com"));
        assert!(!is_match(&scope, "kalle@example.com.evil.net"));
    }

    #[test]
    fn self_anchored_regexp_still_matches() {
        // Declarations written with their own anchors keep working under
        // the full-string wrapper.
        let scope = Scope::regexp(r"^.*\.com$");
        assert!(is_match(&scope, "kalle@example.com"));
        assert!(!is_match(&scope, "kalle@example.se"));
    }

    #[test]
    fn malformed_regexp_never_matches() {
        let scope = Scope::regexp(r"example\.(com");
        assert!(!is_match(&scope, "kalle@example.com"));
        assert!(!is_match(&Scope::regexp("("), "kalle@example.com"));
    }

    #[test]
    fn blank_scope_never_matches() {
        assert!(!is_match(&Scope::literal(""), "kalle@example.com"));
        let no_value = GenericXmlElement::new(namespaces::SHIBBOLETH_METADATA, "Scope");
        assert!(!is_match(&no_value, "kalle@example.com"));
    }

    #[test]
    fn generic_element_as_scope() {
        let element = GenericXmlElement::new(namespaces::SHIBBOLETH_METADATA, "Scope")
            .with_value(r"example\.(com|org)")
            .with_attribute("regexp", "true");
        assert!(element.is_regexp());
        assert!(is_match(&element, "kalle@example.org"));

        let literal = GenericXmlElement::new(namespaces::SHIBBOLETH_METADATA, "Scope")
            .with_value("example.com")
            .with_attribute("regexp", "false");
        assert!(!literal.is_regexp());
        assert!(is_match(&literal, "kalle@example.com"));
    }

    #[test]
    fn attribute_authorization() {
        let scopes = vec![Scope::literal("example.com"), Scope::literal("example.org")];

        let single = Attribute::single("eppn", "kalle@example.com");
        assert!(is_authorized(&single, &scopes));

        // All values must be covered.
        let mixed = Attribute::multi(
            "eppn",
            vec!["kalle@example.com".to_string(), "kalle@evil.com".to_string()],
        );
        assert!(!is_authorized(&mixed, &scopes));

        let both = Attribute::multi(
            "eppn",
            vec!["kalle@example.com".to_string(), "kalle@example.org".to_string()],
        );
        assert!(is_authorized(&both, &scopes));

        let empty = Attribute::multi("eppn", Vec::new());
        assert!(!is_authorized(&empty, &scopes));
    }

    #[test]
    fn declarations_from_metadata() {
        let metadata = EntityDescriptor::new("https://idp.example.com").with_idp_descriptor(
            IdpSsoDescriptor::new()
                .with_scope(Scope::literal("example.com"))
                .with_extension(MetadataExtension::Other(
                    GenericXmlElement::new(namespaces::SHIBBOLETH_METADATA, "Scope")
                        .with_value(r"example\.(se|no)")
                        .with_attribute("regexp", "true"),
                ))
                .with_extension(MetadataExtension::Other(GenericXmlElement::new(
                    "urn:example:other",
                    "Unrelated",
                ))),
        );

        let scopes = scope_declarations(&metadata).unwrap();
        assert_eq!(scopes.len(), 2);
        assert_eq!(scopes[0], Scope::literal("example.com"));
        assert_eq!(scopes[1], Scope::regexp(r"example\.(se|no)"));
    }

    #[test]
    fn no_idp_role_yields_no_declarations() {
        let metadata = EntityDescriptor::new("https://sp.example.com");
        assert!(scope_declarations(&metadata).unwrap().is_empty());
    }

    #[test]
    fn scope_element_without_value_is_an_error() {
        let metadata = EntityDescriptor::new("https://idp.example.com").with_idp_descriptor(
            IdpSsoDescriptor::new().with_extension(MetadataExtension::Other(
                GenericXmlElement::new(namespaces::SHIBBOLETH_METADATA, "Scope"),
            )),
        );

        let err = scope_declarations(&metadata).unwrap_err();
        assert!(matches!(err, MetadataError::InvalidScopeExtension(_)));
    }
}
