//! Composite validation of SAML objects.
//!
//! A validator runs a fixed, ordered list of checks against one object. In
//! strict mode the run aborts at the first check that is not valid; otherwise
//! all checks run and their failures accumulate in the context, with the
//! overall verdict being the worst individual outcome.

mod assertion;
mod checks;
mod response;

pub use assertion::AssertionValidator;
pub use response::ResponseValidator;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::ValidationContext;
use crate::signature::Signature;
use crate::types::{Assertion, Response};

/// The enumerated outcome of a validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Validity {
    /// The validation succeeded.
    Valid,

    /// The validation found an active violation.
    Invalid,

    /// The validation could not be evaluated, typically because required
    /// context information was absent.
    Indeterminate,
}

impl fmt::Display for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Valid => "VALID",
            Self::Invalid => "INVALID",
            Self::Indeterminate => "INDETERMINATE",
        })
    }
}

/// The outcome of a single check.
///
/// Non-valid outcomes carry the human-readable reason; the orchestrating
/// validator appends it to the context's failure list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
    /// The check passed.
    Valid,

    /// The check found an active violation.
    Invalid(String),

    /// The check could not be evaluated.
    Indeterminate(String),
}

impl CheckResult {
    /// Creates an invalid result with the given reason.
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid(reason.into())
    }

    /// Creates an indeterminate result with the given reason.
    #[must_use]
    pub fn indeterminate(reason: impl Into<String>) -> Self {
        Self::Indeterminate(reason.into())
    }

    /// Creates an invalid result in strict mode, indeterminate otherwise.
    ///
    /// Used by checks whose violation is the absence of context information
    /// rather than a property of the message itself.
    #[must_use]
    pub fn soft_failure(context: &ValidationContext, reason: impl Into<String>) -> Self {
        if context.is_strict() {
            Self::Invalid(reason.into())
        } else {
            Self::Indeterminate(reason.into())
        }
    }

    /// Returns the validity of this result.
    #[must_use]
    pub const fn validity(&self) -> Validity {
        match self {
            Self::Valid => Validity::Valid,
            Self::Invalid(_) => Validity::Invalid,
            Self::Indeterminate(_) => Validity::Indeterminate,
        }
    }
}

/// Records a check's outcome in the context and folds it into the running
/// verdict. INVALID dominates INDETERMINATE, which dominates VALID.
fn record(context: &mut ValidationContext, verdict: Validity, result: CheckResult) -> Validity {
    match result {
        CheckResult::Valid => verdict,
        CheckResult::Invalid(reason) => {
            tracing::info!(%reason, "validation check failed");
            context.add_failure(reason);
            Validity::Invalid
        }
        CheckResult::Indeterminate(reason) => {
            tracing::debug!(%reason, "validation check could not be evaluated");
            context.add_failure(reason);
            if verdict == Validity::Invalid {
                Validity::Invalid
            } else {
                Validity::Indeterminate
            }
        }
    }
}

/// A signed SAML object subject to the common checks.
///
/// Both [`Response`] and [`Assertion`] expose the same core attributes; the
/// common checks are written once against this trait.
pub trait SignableObject {
    /// The object's ID attribute. Empty when the attribute was missing.
    fn id(&self) -> &str;

    /// The object's SAML version attribute.
    fn version(&self) -> &str;

    /// The object's issue instant.
    fn issue_instant(&self) -> DateTime<Utc>;

    /// The entity ID of the object's issuer.
    fn issuer(&self) -> &str;

    /// The signature covering the object, if it is signed.
    fn signature(&self) -> Option<&Signature>;

    /// The object's element name, used in failure messages.
    fn object_name() -> &'static str;
}

impl SignableObject for Response {
    fn id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn issue_instant(&self) -> DateTime<Utc> {
        self.issue_instant
    }

    fn issuer(&self) -> &str {
        &self.issuer
    }

    fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    fn object_name() -> &'static str {
        "Response"
    }
}

impl SignableObject for Assertion {
    fn id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn issue_instant(&self) -> DateTime<Utc> {
        self.issue_instant
    }

    fn issuer(&self) -> &str {
        &self.issuer
    }

    fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    fn object_name() -> &'static str {
        "Assertion"
    }
}
