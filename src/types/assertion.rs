//! SAML Assertion types.
//!
//! Assertions contain statements about a subject made by an issuer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::signature::Signature;

use super::SAML_VERSION;

/// SAML Assertion.
///
/// A package of information that supplies one or more statements made
/// by a SAML authority (the issuer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assertion {
    /// Unique identifier for this assertion.
    pub id: String,

    /// Version of the SAML protocol (always "2.0").
    #[serde(default = "default_version")]
    pub version: String,

    /// Timestamp when this assertion was issued.
    pub issue_instant: DateTime<Utc>,

    /// The entity ID of the identity provider that issued this assertion.
    pub issuer: String,

    /// Conditions that must be evaluated for the assertion to be valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Conditions>,

    /// Attribute statement containing attributes about the subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_statement: Option<AttributeStatement>,

    /// The XML signature covering this assertion, if it is signed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<Signature>,
}

fn default_version() -> String {
    SAML_VERSION.to_string()
}

impl Assertion {
    /// Creates a new assertion.
    #[must_use]
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            id: format!("_id{}", uuid::Uuid::new_v4()),
            version: SAML_VERSION.to_string(),
            issue_instant: Utc::now(),
            issuer: issuer.into(),
            conditions: None,
            attribute_statement: None,
            signature: None,
        }
    }

    /// Sets the issue instant.
    #[must_use]
    pub fn with_issue_instant(mut self, instant: DateTime<Utc>) -> Self {
        self.issue_instant = instant;
        self
    }

    /// Sets the conditions.
    #[must_use]
    pub fn with_conditions(mut self, conditions: Conditions) -> Self {
        self.conditions = Some(conditions);
        self
    }

    /// Sets the attribute statement.
    #[must_use]
    pub fn with_attribute_statement(mut self, statement: AttributeStatement) -> Self {
        self.attribute_statement = Some(statement);
        self
    }

    /// Attaches a signature to this assertion.
    #[must_use]
    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }
}

/// Conditions for assertion validity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conditions {
    /// Time before which the assertion is not valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_before: Option<DateTime<Utc>>,

    /// Time at or after which the assertion is not valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_on_or_after: Option<DateTime<Utc>>,
}

impl Conditions {
    /// Creates conditions bounded to the given validity window.
    #[must_use]
    pub fn between(not_before: DateTime<Utc>, not_on_or_after: DateTime<Utc>) -> Self {
        Self {
            not_before: Some(not_before),
            not_on_or_after: Some(not_on_or_after),
        }
    }
}

/// Attribute statement.
///
/// Contains attributes about the subject.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttributeStatement {
    /// List of attributes.
    pub attributes: Vec<Attribute>,
}

impl AttributeStatement {
    /// Creates a new empty attribute statement.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            attributes: Vec::new(),
        }
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, attr: Attribute) -> Self {
        self.attributes.push(attr);
        self
    }

    /// Finds an attribute by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// SAML Attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    /// The attribute name (typically a URI).
    pub name: String,

    /// A human-readable name for the attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,

    /// URI describing how the attribute name is interpreted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_format: Option<String>,

    /// The attribute values.
    pub values: Vec<String>,
}

impl Attribute {
    /// Creates a new attribute with a single value.
    #[must_use]
    pub fn single(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            friendly_name: None,
            name_format: None,
            values: vec![value.into()],
        }
    }

    /// Creates a new attribute with multiple values.
    #[must_use]
    pub fn multi(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            friendly_name: None,
            name_format: None,
            values,
        }
    }

    /// Sets the friendly name.
    #[must_use]
    pub fn with_friendly_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }

    /// Returns the string values of this attribute.
    #[must_use]
    pub fn string_values(&self) -> &[String] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn assertion_creation() {
        let now = Utc::now();
        let assertion = Assertion::new("https://idp.example.com")
            .with_conditions(Conditions::between(now, now + Duration::minutes(5)));

        assert!(!assertion.id.is_empty());
        assert_eq!(assertion.issuer, "https://idp.example.com");
        assert!(assertion.conditions.is_some());
        assert!(assertion.signature.is_none());
    }

    #[test]
    fn attribute_statement_lookup() {
        let stmt = AttributeStatement::new()
            .with_attribute(
                Attribute::single("urn:oid:0.9.2342.19200300.100.1.3", "user@example.com")
                    .with_friendly_name("mail"),
            )
            .with_attribute(Attribute::multi(
                "urn:oid:1.3.6.1.4.1.5923.1.1.1.9",
                vec!["member@example.com".to_string(), "staff@example.com".to_string()],
            ));

        assert_eq!(stmt.attributes.len(), 2);
        let eppn = stmt.attribute("urn:oid:1.3.6.1.4.1.5923.1.1.1.9");
        assert_eq!(eppn.map(|a| a.string_values().len()), Some(2));
    }
}
